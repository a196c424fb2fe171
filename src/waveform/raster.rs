use super::render::{Rgba, Surface};

/// In-memory RGBA `Surface`.
///
/// The logical width is fixed at construction; the backing store is
/// `ceil(width * ratio) x ceil(height * ratio)` device pixels and is
/// reallocated by every `begin_frame`.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    logical_width: f64,
    ratio: f64,
    width_px: usize,
    height_px: usize,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    pub fn new(logical_width: f64, pixel_ratio: f64) -> Self {
        let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        Self {
            logical_width: logical_width.max(0.0),
            ratio,
            width_px: 0,
            height_px: 0,
            pixels: Vec::new(),
        }
    }

    /// Backing store size in device pixels.
    #[cfg(test)]
    pub fn device_size(&self) -> (usize, usize) {
        (self.width_px, self.height_px)
    }

    /// Color at device pixel `(x, y)`, `None` outside the buffer.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width_px || y >= self.height_px {
            return None;
        }
        self.pixels.get(y * self.width_px + x).copied()
    }

    /// Color under logical point `(x, y)`.
    pub fn sample(&self, x: f64, y: f64) -> Option<Rgba> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let ratio = self.pixel_ratio();
        self.pixel((x * ratio) as usize, (y * ratio) as usize)
    }
}

fn device_len(logical: f64, ratio: f64) -> usize {
    if logical.is_finite() && logical > 0.0 {
        (logical * ratio).ceil() as usize
    } else {
        0
    }
}

/// Whether `(px, py)` is inside the rounded rect `(x, y, w, h)` with corner
/// radius `r`. All in device pixels.
fn inside_rounded(px: f64, py: f64, x: f64, y: f64, w: f64, h: f64, r: f64) -> bool {
    if px < x || px > x + w || py < y || py > y + h {
        return false;
    }
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    let cx = px.clamp(x + r, x + w - r);
    let cy = py.clamp(y + r, y + h - r);
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy <= r * r
}

impl Surface for PixelBuffer {
    fn width(&self) -> f64 {
        self.logical_width
    }

    fn pixel_ratio(&self) -> f64 {
        self.ratio
    }

    fn begin_frame(&mut self, height: f64) {
        self.width_px = device_len(self.logical_width, self.ratio);
        self.height_px = device_len(height, self.ratio);
        self.pixels.clear();
        self.pixels
            .resize(self.width_px * self.height_px, Rgba::TRANSPARENT);
    }

    fn fill_rounded_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64, color: Rgba) {
        if w <= 0.0 || h <= 0.0 || self.pixels.is_empty() {
            return;
        }
        let s = self.ratio;
        let (x, y, w, h, r) = (x * s, y * s, w * s, h * s, radius * s);

        let x0 = x.floor().max(0.0) as usize;
        let y0 = y.floor().max(0.0) as usize;
        let x1 = ((x + w).ceil() as usize).min(self.width_px);
        let y1 = ((y + h).ceil() as usize).min(self.height_px);

        for py in y0..y1 {
            for px in x0..x1 {
                // Pixel centers decide coverage.
                if inside_rounded(px as f64 + 0.5, py as f64 + 0.5, x, y, w, h, r) {
                    self.pixels[py * self.width_px + px] = color;
                }
            }
        }
    }
}

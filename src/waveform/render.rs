//! Bar-chart waveform rendering in logical pixels.
//!
//! The renderer never touches device pixels: a `Surface` owns its backing
//! store and scales logical coordinates by its own pixel ratio.

use serde::Deserialize;

use super::summary::{normalize, resample};

pub const BAR_WIDTH: f64 = 2.0;
pub const BAR_GAP: f64 = 1.0;
pub const BAR_RADIUS: f64 = 1.0;
pub const MIN_BAR_HEIGHT: f64 = 2.0;
/// Vertical space kept free around the tallest bar.
pub const VERTICAL_PADDING: f64 = 4.0;

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xff)
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        let a = if hex.len() == 8 { byte(6)? } else { 0xff };
        Some(Self::new(byte(0)?, byte(2)?, byte(4)?, a))
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgba::from_hex(&value).ok_or_else(|| format!("invalid color {value:?}, expected #rrggbb"))
    }
}

/// Something the renderer can draw rounded bars onto.
pub trait Surface {
    /// Logical width in pixels.
    fn width(&self) -> f64;

    /// Device pixels per logical pixel.
    fn pixel_ratio(&self) -> f64;

    /// Start a frame `height` logical pixels tall: size the backing store to
    /// `logical * pixel_ratio` and clear it.
    fn begin_frame(&mut self, height: f64);

    fn fill_rounded_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64, color: Rgba);
}

/// One bar of the chart, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub played: bool,
}

fn clamp_fraction(f: f64) -> f64 {
    if f.is_finite() { f.clamp(0.0, 1.0) } else { 0.0 }
}

/// Number of bars that fit in `width` logical pixels.
pub fn bar_count(width: f64) -> usize {
    if !width.is_finite() || width <= 0.0 {
        return 0;
    }
    (width / (BAR_WIDTH + BAR_GAP)).floor() as usize
}

/// Pure geometry: where every bar goes and whether it counts as played.
pub fn layout(summary: &[f32], progress: f64, width: f64, height: f64) -> Vec<Bar> {
    let bars = bar_count(width);
    if summary.is_empty() || bars == 0 {
        return Vec::new();
    }

    let amplitudes = resample(&normalize(summary), bars);
    let split = clamp_fraction(progress) * width;
    let usable = (height - VERTICAL_PADDING).max(0.0);

    amplitudes
        .iter()
        .enumerate()
        .map(|(i, amp)| {
            let x = i as f64 * (BAR_WIDTH + BAR_GAP);
            let bar_height = (f64::from(*amp) * usable).max(MIN_BAR_HEIGHT);
            Bar {
                x,
                y: (height - bar_height) / 2.0,
                width: BAR_WIDTH,
                height: bar_height,
                played: x < split,
            }
        })
        .collect()
}

/// Draw `summary` onto `surface` with everything left of `progress` in
/// `played`. Returns the number of bars drawn.
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    summary: &[f32],
    progress: f64,
    height: f64,
    unplayed: Rgba,
    played: Rgba,
) -> usize {
    surface.begin_frame(height);

    let bars = layout(summary, progress, surface.width(), height);
    for bar in &bars {
        let color = if bar.played { played } else { unplayed };
        surface.fill_rounded_rect(bar.x, bar.y, bar.width, bar.height, BAR_RADIUS, color);
    }
    bars.len()
}

/// Map a horizontal position to a seek fraction in `[0, 1]`.
pub fn seek_fraction(x: f64, width: f64) -> f64 {
    if !width.is_finite() || width <= 0.0 {
        return 0.0;
    }
    clamp_fraction(x / width)
}

/// Interaction wrapper around a rendered waveform.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveformView {
    pub interactive: bool,
}

impl WaveformView {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    /// Handle a click at `x`. Calls `on_seek` with the seek fraction and
    /// returns `true` only when the view is interactive and the click landed
    /// inside `[0, width]`.
    pub fn click(&self, x: f64, width: f64, on_seek: impl FnOnce(f64)) -> bool {
        if !self.interactive || !x.is_finite() || width <= 0.0 || x < 0.0 || x > width {
            return false;
        }
        on_seek(seek_fraction(x, width));
        true
    }
}

//! Amplitude summaries: short vectors of loudness values in `[0, 1]`.

use std::f64::consts::PI;

/// Number of values synthesized per track when none are provided.
pub const DEFAULT_SUMMARY_LEN: usize = 100;

const LCG_MUL: u32 = 1_103_515_245;
const LCG_INC: u32 = 12_345;
const LCG_MASK: u32 = 0x7fff_ffff;

/// 31-bit linear congruential generator. Only reproducibility matters here.
struct Lcg {
    state: u32,
}

impl Lcg {
    fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC) & LCG_MASK;
        f64::from(self.state) / f64::from(LCG_MASK)
    }
}

/// Synthesize a summary of `length` values from `seed`.
///
/// Three layered sines shaped by a half-sine envelope, plus a little noise.
/// The output depends only on `(length, seed)` and every value lies in
/// `[0.1, 1.0]`.
pub fn generate(length: usize, seed: u32) -> Vec<f32> {
    let mut rng = Lcg::new(seed);
    let phase = f64::from(seed);

    (0..length)
        .map(|i| {
            let t = i as f64 / length as f64;
            let waves = (t * PI * 4.0 + phase).sin() * 0.3
                + (t * PI * 8.0 + phase * 2.0).sin() * 0.2
                + (t * PI * 16.0 + phase * 3.0).sin() * 0.1;
            let noise = (rng.next_f64() - 0.5) * 0.4;
            let envelope = (t * PI).sin();
            ((0.5 + waves + noise) * envelope).clamp(0.1, 1.0) as f32
        })
        .collect()
}

/// Seed derived from a track id: the sum of its character codes.
pub fn seed_for_id(id: &str) -> u32 {
    id.chars().fold(0u32, |acc, c| acc.wrapping_add(c as u32))
}

/// Scale `summary` so its maximum becomes 1.
///
/// A non-positive or non-finite maximum is treated as 1, leaving the values
/// as they are.
pub fn normalize(summary: &[f32]) -> Vec<f32> {
    let max = summary
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    let max = if max.is_finite() && max > 0.0 { max } else { 1.0 };

    summary
        .iter()
        .map(|v| if v.is_finite() { v / max } else { 0.0 })
        .collect()
}

/// Average `values` into exactly `bars` buckets.
///
/// Bucket `i` covers `floor(i*n/bars) .. floor((i+1)*n/bars)`; an empty
/// bucket (more bars than values) yields 0.
pub fn resample(values: &[f32], bars: usize) -> Vec<f32> {
    let n = values.len();
    (0..bars)
        .map(|i| {
            let start = i * n / bars;
            let end = (i + 1) * n / bars;
            let slice = &values[start..end];
            if slice.is_empty() {
                0.0
            } else {
                slice.iter().sum::<f32>() / slice.len() as f32
            }
        })
        .collect()
}

/// Peak-per-bucket summary of interleaved PCM.
///
/// Frames (one sample per channel) are split into `buckets` proportional
/// slices; each value is the largest absolute sample in its slice.
pub fn from_samples(samples: &[f32], channels: u16, buckets: usize) -> Vec<f32> {
    let channels = usize::from(channels.max(1));
    let frames = samples.len() / channels;
    if buckets == 0 {
        return Vec::new();
    }

    (0..buckets)
        .map(|i| {
            let start = i * frames / buckets * channels;
            let end = (i + 1) * frames / buckets * channels;
            samples[start..end]
                .iter()
                .filter(|s| s.is_finite())
                .fold(0.0f32, |peak, s| peak.max(s.abs()))
        })
        .collect()
}

//! Drifting cloud background
//!
//! Each channel owns a small set of soft-windowed "clouds" drifting around
//! the circular strip index space. Cloud centers advance by real elapsed
//! time, lengths breathe on per-cloud phases so the set never synchronizes,
//! and the palette index for every pixel comes from three independently
//! phased sine waves summed together, which keeps the color flow organic and
//! non-repeating. The field renders before any events so hits draw on top.

use embassy_time::Instant;
use libm::{fabsf, fmaxf, powf, sinf};

use crate::color::Rgb;
use crate::math8::{hash, sin8};
use crate::palette::PaletteRamp;

pub const CLOUD_COUNT: usize = 4;

const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
const MAX_STEP_SECONDS: f32 = 0.3;

/// One soft-edged drifting window
#[derive(Debug, Clone, Copy)]
pub struct Cloud {
    /// Wraps modulo strip length
    pub center: f32,
    /// Window length including the soft edges
    pub length: f32,
    /// Pixels per second, signed
    pub speed: f32,
    /// Per-cloud breathing phase in radians
    pub phase: f32,
}

/// Cloud sizing and motion parameters
#[derive(Debug, Clone, Copy)]
pub struct AmbientTuning {
    pub min_length: f32,
    pub max_length: f32,
    /// Soft edge width in pixels (bigger = softer)
    pub edge: f32,
    /// Breathing depth, 0..~0.3
    pub breathe: f32,
    /// Base drift speed in pixels per second, signed per channel
    pub base_speed: f32,
}

impl AmbientTuning {
    /// Defaults proportional to strip length
    #[allow(clippy::cast_precision_loss)]
    pub fn for_strip(strip_len: usize, base_speed: f32) -> Self {
        let len = strip_len as f32;
        Self {
            min_length: len * 0.30,
            max_length: len * 0.47,
            edge: len / 12.0,
            breathe: 0.1,
            base_speed,
        }
    }
}

/// Shortest distance between two positions on the circular strip
fn wrap_dist(a: f32, b: f32, len: f32) -> f32 {
    let d = fabsf(a - b);
    if d <= len - d { d } else { len - d }
}

/// Soft window weight: 1 inside, 0 outside, cubic falloff in the edge band
fn soft_step(distance: f32, half_len: f32, edge: f32) -> f32 {
    let inner = fmaxf(0.0, half_len - edge);
    if distance >= half_len {
        return 0.0;
    }
    if distance <= inner {
        return 1.0;
    }
    let t = (distance - inner) / fmaxf(1e-6, half_len - inner);
    1.0 - (t * t * (3.0 - 2.0 * t))
}

/// Background brightness for a scene level, saturating gently
///
/// The sub-linear power keeps quiet rooms dim without letting loud passages
/// blow the background out.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scene_brightness(scene: f32) -> u8 {
    let curved = powf(scene.clamp(0.0, 1.0), 0.8);
    (18.0 + (210.0 - 18.0) * curved) as u8
}

/// Drift speed multiplier for a scene level (0.6x quiet -> 1.6x loud)
pub fn scene_motion(scene: f32) -> f32 {
    0.6 + 1.0 * scene.clamp(0.0, 1.0)
}

/// The cloud set for one output channel
#[derive(Debug, Clone)]
pub struct AmbientField {
    tuning: AmbientTuning,
    clouds: [Cloud; CLOUD_COUNT],
    last_tick: Option<Instant>,
}

impl AmbientField {
    /// Deterministically seeded cloud set
    ///
    /// Hash-derived placement stands in for an RNG: centers scatter across
    /// the strip, speeds vary about ±30% around the base, and phases spread
    /// so the breathing never locks in step.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(tuning: AmbientTuning, strip_len: usize, seed: u64) -> Self {
        let len = strip_len as f32;
        let mut clouds = [Cloud {
            center: 0.0,
            length: tuning.min_length,
            speed: tuning.base_speed,
            phase: 0.0,
        }; CLOUD_COUNT];

        for (i, cloud) in clouds.iter_mut().enumerate() {
            let i = i as u64;
            let frac = |salt: u64| -> f32 {
                f32::from((hash(seed ^ (i << 8) ^ salt) & 0xFFFF) as u16) / 65535.0
            };
            cloud.center = frac(1) * len;
            cloud.length = tuning.min_length + frac(2) * (tuning.max_length - tuning.min_length);
            cloud.speed = tuning.base_speed * (0.7 + frac(3) * 0.6);
            cloud.phase = frac(4) * core::f32::consts::TAU;
        }

        Self {
            tuning,
            clouds,
            last_tick: None,
        }
    }

    pub const fn clouds(&self) -> &[Cloud; CLOUD_COUNT] {
        &self.clouds
    }

    /// Drift and breathe the clouds by the real elapsed time
    #[allow(clippy::cast_precision_loss)]
    pub fn advance(&mut self, now: Instant, strip_len: usize, motion: f32) {
        let len = strip_len as f32;
        let dt = match self.last_tick {
            None => 0.0,
            Some(last) => {
                let micros = now.duration_since(last).as_micros();
                (micros as f32 / 1_000_000.0).min(MAX_STEP_SECONDS)
            }
        };
        self.last_tick = Some(now);

        let breath_t = now.as_millis() as f32 * 0.0015;
        for cloud in &mut self.clouds {
            cloud.center += cloud.speed * motion * dt;
            while cloud.center < 0.0 {
                cloud.center += len;
            }
            while cloud.center >= len {
                cloud.center -= len;
            }

            let breath = 1.0 + self.tuning.breathe * sinf(breath_t + cloud.phase);
            cloud.length = (cloud.length * breath)
                .clamp(self.tuning.min_length, self.tuning.max_length);
        }
    }

    /// Paint the cloud field over a black baseline
    ///
    /// `reverse` renders the channel mirrored with a +64 palette offset so
    /// the two channels read as related but not identical.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn render(
        &self,
        now: Instant,
        buf: &mut [Rgb],
        reverse: bool,
        ramp: &PaletteRamp,
        base_v: u8,
    ) {
        let strip_len = buf.len();
        let len = strip_len as f32;
        buf.fill(BLACK);
        if strip_len == 0 {
            return;
        }

        let t = now.as_millis();
        for i in 0..strip_len {
            let iu = i as u64;
            // Three slow waves, independently phased, summed and averaged
            let idx1 = sin8((iu * 2 + t / 20) as u8);
            let idx2 = sin8((iu * 3 + t / 18) as u8);
            let idx3 = sin8((iu + t / 27) as u8);
            let color_index = idx1 / 3 + idx2 / 3 + idx3 / 3;

            let mut weight = 0.0f32;
            for cloud in &self.clouds {
                let d = wrap_dist(i as f32, cloud.center, len);
                let w = soft_step(d, cloud.length * 0.5, self.tuning.edge);
                if w > weight {
                    weight = w;
                }
            }
            if weight <= 0.001 {
                continue; // stays black outside every cloud
            }

            #[allow(clippy::cast_sign_loss)]
            let v = (f32::from(base_v) * weight) as u8;
            let ci = if reverse {
                color_index.wrapping_add(64)
            } else {
                color_index
            };
            let pos = if reverse { strip_len - 1 - i } else { i };
            buf[pos] = ramp.color_at(ci, v);
        }
    }
}

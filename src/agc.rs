//! Per-band automatic gain control
//!
//! Raw spectrum magnitudes arrive on a fixed 0-900 scale but their absolute
//! level depends on the room, the mixer, and the microphone gain. Each band
//! tracks a fast envelope, an adaptive noise floor, and an adaptive crest
//! (recent peak headroom); the normalized output is "how loud right now,
//! relative to recent quiet and recent peak" on a 0-255 scale, with a
//! square-root compander so low-level hits still read as punchy.

use libm::sqrtf;

pub const BAND_COUNT: usize = 7;

/// Upper end of the raw magnitude scale
pub const RAW_FULL_SCALE: f32 = 900.0;

const FLOOR_MAX: f32 = 880.0;
const CREST_MIN_HEADROOM: f32 = 10.0;
const QUIET_LEVEL: u8 = 10;

/// Smoothing and deadband parameters for the AGC
#[derive(Debug, Clone, Copy)]
pub struct AgcTuning {
    /// Fast envelope attack weight
    pub alpha_fast: f32,
    /// Floor rise rate (very slow: stale loudness decays over hundreds of ticks)
    pub floor_up: f32,
    /// Floor fall rate (fast: quiet scenes recover quickly)
    pub floor_down: f32,
    /// Crest decay rate toward the floor
    pub crest_decay: f32,
    /// Deadband above the floor, in raw units
    pub margin: f32,
}

impl Default for AgcTuning {
    fn default() -> Self {
        Self {
            alpha_fast: 0.35,
            floor_up: 0.002,
            floor_down: 0.20,
            crest_decay: 0.0025,
            margin: 20.0,
        }
    }
}

/// Adaptive state for one frequency band
#[derive(Debug, Clone, Copy)]
pub struct BandState {
    /// Fast envelope of the raw signal
    pub fast: f32,
    /// Adaptive quiet baseline, clamped to [0, 880]
    pub floor: f32,
    /// Adaptive peak headroom, never below floor + 10
    pub crest: f32,
    /// Normalized loudness 0-255
    pub normalized: u8,
}

impl BandState {
    const fn new() -> Self {
        Self {
            fast: 0.0,
            floor: 0.0,
            crest: CREST_MIN_HEADROOM,
            normalized: 0,
        }
    }
}

/// Normalizes all seven bands each tick
#[derive(Debug, Clone)]
pub struct BandNormalizer {
    tuning: AgcTuning,
    bands: [BandState; BAND_COUNT],
    peak: u8,
    quiet: bool,
}

impl BandNormalizer {
    pub fn new(tuning: AgcTuning) -> Self {
        Self {
            tuning,
            bands: [BandState::new(); BAND_COUNT],
            peak: 0,
            quiet: true,
        }
    }

    /// Feed one raw sample and update every band
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn update(&mut self, raw: &[u16; BAND_COUNT]) {
        let t = self.tuning;
        let mut peak = 0u8;
        let mut all_near_floor = true;

        for (band, &sample) in self.bands.iter_mut().zip(raw.iter()) {
            let value = f32::from(sample).min(RAW_FULL_SCALE);

            // Fast envelope
            band.fast += t.alpha_fast * (value - band.fast);

            // Adaptive floor: creeps up slowly, drops quickly
            if band.fast > band.floor {
                band.floor += t.floor_up * (band.fast - band.floor);
            } else {
                band.floor += t.floor_down * (band.fast - band.floor);
            }
            band.floor = band.floor.clamp(0.0, FLOOR_MAX);

            // Adaptive crest: instant rise, slow decay toward the floor
            if band.fast > band.crest {
                band.crest = band.fast;
            } else {
                band.crest -= t.crest_decay * (band.crest - band.floor);
            }
            if band.crest < band.floor + CREST_MIN_HEADROOM {
                band.crest = band.floor + CREST_MIN_HEADROOM;
            }

            // Normalize above the floor deadband, sqrt-companded
            let numerator = band.fast - (band.floor + t.margin);
            let denominator = band.crest - (band.floor + t.margin);
            band.normalized = if denominator > 5.0 && numerator > 0.0 {
                let x = sqrtf((numerator / denominator).clamp(0.0, 1.0));
                (x * 255.0 + 0.5) as u8
            } else {
                0
            };

            peak = peak.max(band.normalized);
            if band.normalized > QUIET_LEVEL {
                all_near_floor = false;
            }
        }

        self.peak = peak;
        self.quiet = all_near_floor;
    }

    pub const fn bands(&self) -> &[BandState; BAND_COUNT] {
        &self.bands
    }

    pub const fn normalized(&self, band: usize) -> u8 {
        self.bands[band].normalized
    }

    /// Max normalized loudness over all bands this tick
    pub const fn peak(&self) -> u8 {
        self.peak
    }

    /// True when every band sits near its floor
    pub const fn is_quiet(&self) -> bool {
        self.quiet
    }
}

/// Smoothed overall loudness in [0, 1]
///
/// Attack is asymmetric: the smoothing weight itself grows with the target,
/// so the level rises quickly on loud passages and settles gently.
#[derive(Debug, Clone, Copy)]
pub struct SceneLevel {
    level: f32,
}

impl SceneLevel {
    pub const fn new() -> Self {
        Self { level: 0.0 }
    }

    pub fn update(&mut self, peak: u8) {
        let target = f32::from(peak) / 255.0;
        let alpha = 0.10 + 0.15 * target;
        self.level = (1.0 - alpha) * self.level + alpha * target;
    }

    pub const fn get(&self) -> f32 {
        self.level
    }
}

impl Default for SceneLevel {
    fn default() -> Self {
        Self::new()
    }
}

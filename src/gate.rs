//! Gate detection: turns normalized loudness into spawn requests
//!
//! A gate trigger fires when the sensitivity-scaled band value crosses the
//! category threshold and the category's debounce interval has elapsed.
//! Hit strength is measured as sqrt-companded overshoot above the gate and
//! shapes both the event's peak intensity and its length. Each category owns
//! a spatial cursor (bass walks forward, treble backward, both wrapping) so
//! consecutive hits land on different parts of the strip.

use embassy_time::{Duration, Instant};
use libm::sqrtf;

use crate::math8::scale8;

/// Event category a gate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Bass,
    Treble,
}

/// Gate thresholds and debounce intervals
///
/// Thresholds live in the raw 0-900 domain so they match the scale an
/// external UI displays; they are converted to the normalized 0-255 domain
/// at comparison time.
#[derive(Debug, Clone, Copy)]
pub struct GateConfig {
    pub bass_gate: u16,
    pub treble_gate: u16,
    pub laser_gate: u16,
    /// Multiplicative sensitivity applied to normalized values (255 = unity)
    pub sensitivity: u8,
    pub bass_debounce: Duration,
    pub treble_debounce: Duration,
    pub laser_debounce: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            bass_gate: 150,
            treble_gate: 150,
            laser_gate: 700,
            sensitivity: 170,
            bass_debounce: Duration::from_millis(80),
            treble_debounce: Duration::from_millis(80),
            laser_debounce: Duration::from_millis(150),
        }
    }
}

/// Spatial distribution and sizing of spawned events
#[derive(Debug, Clone, Copy)]
pub struct SpawnTuning {
    pub bass_length: u16,
    pub bass_boost: u16,
    pub bass_step: u16,
    pub treble_length: u16,
    pub treble_boost: u16,
    pub treble_step: u16,
    /// Overshoot (0-1) above which a hit also spawns a ring
    pub ring_threshold: f32,
}

impl SpawnTuning {
    /// Defaults proportional to strip length
    #[allow(clippy::cast_possible_truncation)]
    pub fn for_strip(strip_len: usize) -> Self {
        let len = strip_len as u16;
        Self {
            bass_length: (len / 15).max(3),
            bass_boost: (len / 21).max(2),
            bass_step: (len * 28 / 600).max(5),
            treble_length: (len / 23).max(2),
            treble_boost: (len / 37).max(1),
            treble_step: (len * 19 / 600).max(3),
            ring_threshold: 0.55,
        }
    }
}

/// One gate trigger, ready to become a pool event
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub category: Category,
    /// Start index on channel 1, already wrapped
    pub origin: u16,
    pub length: u16,
    /// Per-hit max brightness, 130-255
    pub peak: u8,
    /// Sqrt-companded overshoot above the gate, 0-1
    pub over: f32,
}

/// Convert a raw-domain threshold to the normalized 0-255 domain
#[allow(clippy::cast_possible_truncation)]
pub fn gate_to_norm(threshold: u16) -> u8 {
    let clamped = u32::from(threshold.min(900));
    ((clamped * 255 + 450) / 900) as u8
}

/// How far above the gate a value sits, 0-1, sqrt-companded for punch
pub fn over_gate01(n: u8, gate: u8) -> f32 {
    if n <= gate || gate == 255 {
        return 0.0;
    }
    let ratio = f32::from(n - gate) / f32::from(255 - gate);
    sqrtf(ratio.clamp(0.0, 1.0))
}

/// Per-hit peak brightness: 130 at the gate, 255 at full overshoot
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hit_intensity(over: f32) -> u8 {
    (130.0 + over * 125.0 + 0.5).clamp(130.0, 255.0) as u8
}

/// Event length scaled by hit strength, never zero
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scaled_length(over: f32, base: u16, boost: u16) -> u16 {
    (base + (over * f32::from(boost) + 0.5) as u16).max(1)
}

/// Tracks debounce timers and spawn cursors for all gates
#[derive(Debug)]
pub struct GateDetector {
    config: GateConfig,
    tuning: SpawnTuning,
    strip_len: u16,
    last_bass: Option<Instant>,
    last_treble: Option<Instant>,
    last_laser: Option<Instant>,
    bass_cursor: u16,
    treble_cursor: u16,
}

impl GateDetector {
    pub fn new(config: GateConfig, tuning: SpawnTuning, strip_len: usize) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let strip_len = strip_len as u16;
        Self {
            config,
            tuning,
            strip_len,
            last_bass: None,
            last_treble: None,
            last_laser: None,
            bass_cursor: 0,
            treble_cursor: strip_len.saturating_sub(1),
        }
    }

    pub const fn config(&self) -> &GateConfig {
        &self.config
    }

    pub const fn config_mut(&mut self) -> &mut GateConfig {
        &mut self.config
    }

    pub const fn tuning_mut(&mut self) -> &mut SpawnTuning {
        &mut self.tuning
    }

    /// Last trigger time for a category (None before the first trigger)
    pub const fn last_trigger(&self, category: Category) -> Option<Instant> {
        match category {
            Category::Bass => self.last_bass,
            Category::Treble => self.last_treble,
        }
    }

    fn debounced(last: Option<Instant>, interval: Duration, now: Instant) -> bool {
        match last {
            None => true,
            Some(at) => now.duration_since(at) > interval,
        }
    }

    /// Check one category against its gate; returns a hit on trigger
    ///
    /// `normalized` is the AGC output for the category's band; sensitivity
    /// scaling happens here so callers pass values straight through.
    pub fn check(&mut self, category: Category, normalized: u8, now: Instant) -> Option<Hit> {
        let n = scale8(normalized, self.config.sensitivity);
        let (gate, debounce, last) = match category {
            Category::Bass => (
                self.config.bass_gate,
                self.config.bass_debounce,
                self.last_bass,
            ),
            Category::Treble => (
                self.config.treble_gate,
                self.config.treble_debounce,
                self.last_treble,
            ),
        };

        let gate_n = gate_to_norm(gate);
        if n < gate_n || !Self::debounced(last, debounce, now) {
            return None;
        }

        let over = over_gate01(n, gate_n);
        let peak = hit_intensity(over);
        let (origin, length) = match category {
            Category::Bass => {
                let length = scaled_length(over, self.tuning.bass_length, self.tuning.bass_boost);
                let origin = self.bass_cursor;
                self.bass_cursor = (self.bass_cursor + self.tuning.bass_step) % self.strip_len;
                self.last_bass = Some(now);
                (origin, length)
            }
            Category::Treble => {
                let length =
                    scaled_length(over, self.tuning.treble_length, self.tuning.treble_boost);
                // Treble segments grow backward from the cursor
                let back = (length - 1) % self.strip_len;
                let origin = (self.treble_cursor + self.strip_len - back) % self.strip_len;
                let step = self.tuning.treble_step % self.strip_len;
                self.treble_cursor =
                    (self.treble_cursor + self.strip_len - step) % self.strip_len;
                self.last_treble = Some(now);
                (origin, length)
            }
        };

        Some(Hit {
            category,
            origin,
            length,
            peak,
            over,
        })
    }

    /// True when the hit is strong enough to also spawn a ring
    pub fn wants_ring(&self, hit: &Hit) -> bool {
        hit.over >= self.tuning.ring_threshold
    }

    /// Laser gate: fires on overall peak loudness, no event payload
    pub fn check_laser(&mut self, peak: u8, now: Instant) -> bool {
        let n = scale8(peak, self.config.sensitivity);
        if n < gate_to_norm(self.config.laser_gate)
            || !Self::debounced(self.last_laser, self.config.laser_debounce, now)
        {
            return false;
        }
        self.last_laser = Some(now);
        true
    }
}

//! 16-stop color ramps and the time-based ramp cross-fader
//!
//! Every color the renderers produce comes from a [`PaletteRamp`]: a cyclic
//! 16-stop gradient sampled by an 8-bit index. Palette switches never snap;
//! the [`PaletteBlender`] interpolates the whole ramp toward the new target
//! over a configurable duration.

use embassy_time::{Duration, Instant};

use crate::color::{Rgb, blend_colors, rgb_from_u32, scale_color_video};
use crate::math8::{blend8, progress8};

pub const RAMP_STOPS: usize = 16;

/// Create a ramp from a list of hex colors (0xRRGGBB format)
macro_rules! hex_ramp {
    ($($color:expr),* $(,)?) => {
        PaletteRamp::new([
            $(rgb_from_u32($color)),*
        ])
    };
}

/// A cyclic 16-stop color gradient
///
/// Lookup follows the classic 16-entry palette convention: the high nibble
/// of the index selects a stop, the low nibble blends toward the next stop,
/// and stop 15 wraps back to stop 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteRamp {
    stops: [Rgb; RAMP_STOPS],
}

impl PaletteRamp {
    pub const fn new(stops: [Rgb; RAMP_STOPS]) -> Self {
        Self { stops }
    }

    /// A ramp holding one solid color in every stop
    pub const fn solid(color: Rgb) -> Self {
        Self {
            stops: [color; RAMP_STOPS],
        }
    }

    pub const fn stops(&self) -> &[Rgb; RAMP_STOPS] {
        &self.stops
    }

    /// Sample the ramp at a cyclic 8-bit index, scaled to `brightness`
    pub fn color_at(&self, index: u8, brightness: u8) -> Rgb {
        let stop = usize::from(index >> 4);
        let next = (stop + 1) % RAMP_STOPS;
        // Low nibble spans the gap between adjacent stops (0, 17, 34, .. 255).
        let frac = (index & 0x0F) * 17;

        let color = blend_colors(self.stops[stop], self.stops[next], frac);
        if brightness == 255 {
            color
        } else {
            scale_color_video(color, brightness)
        }
    }
}

/// Selectable preset ramps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PaletteId {
    TealMagenta = 0,
    MoltenAurora = 1,
    NeonWave = 2,
    Ember = 3,
    Ocean = 4,
}

pub const PALETTE_COUNT: u8 = 5;

impl PaletteId {
    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::TealMagenta,
            1 => Self::MoltenAurora,
            2 => Self::NeonWave,
            3 => Self::Ember,
            4 => Self::Ocean,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TealMagenta => "teal_magenta",
            Self::MoltenAurora => "molten_aurora",
            Self::NeonWave => "neon_wave",
            Self::Ember => "ember",
            Self::Ocean => "ocean",
        }
    }

    pub const fn ramp(self) -> &'static PaletteRamp {
        match self {
            Self::TealMagenta => &TEAL_MAGENTA,
            Self::MoltenAurora => &MOLTEN_AURORA,
            Self::NeonWave => &NEON_WAVE,
            Self::Ember => &EMBER,
            Self::Ocean => &OCEAN,
        }
    }

    /// Accent color used for bass hits on this palette
    pub const fn bass_accent(self) -> Rgb {
        match self {
            Self::TealMagenta => rgb_from_u32(0x4B0082), // indigo
            Self::MoltenAurora => rgb_from_u32(0x0000FF),
            Self::NeonWave => rgb_from_u32(0x8A2BE2), // blue violet
            Self::Ember => rgb_from_u32(0x0000FF),
            Self::Ocean => rgb_from_u32(0x4B0082),
        }
    }

    /// Accent color used for treble hits on this palette
    pub const fn treble_accent(self) -> Rgb {
        match self {
            Self::Ember => rgb_from_u32(0xEE82EE), // violet
            _ => rgb_from_u32(0xFF0000),
        }
    }
}

#[allow(clippy::unreadable_literal)]
pub static TEAL_MAGENTA: PaletteRamp = hex_ramp![
    0x008080, 0x008080, 0x00FFFF, 0x00FFFF, 0x00CED1, 0x00CED1, 0x00BFFF, 0x00BFFF,
    0x0000FF, 0x0000FF, 0xC71585, 0xC71585, 0xFF00FF, 0xFF00FF, 0xFF1493, 0xFF1493,
];

#[allow(clippy::unreadable_literal)]
pub static MOLTEN_AURORA: PaletteRamp = hex_ramp![
    0x000000, 0x8B0000, 0x8B0000, 0x800000, 0xDC143C, 0xFF4500, 0xFF8C00, 0xFFD700,
    0x00CED1, 0x008080, 0x4B0082, 0x00008B, 0x000000, 0x8B0000, 0xFF4500, 0xFFD700,
];

#[allow(clippy::unreadable_literal)]
pub static NEON_WAVE: PaletteRamp = hex_ramp![
    0x000000, 0xFF1493, 0xFF00FF, 0x8A2BE2, 0x00008B, 0x00FFFF, 0x00FFFF, 0x32CD32,
    0x7FFF00, 0xFFFF00, 0xFFA500, 0xFF0000, 0x000000, 0xFF1493, 0x00FFFF, 0xFFFF00,
];

#[allow(clippy::unreadable_literal)]
pub static EMBER: PaletteRamp = hex_ramp![
    0x000000, 0x330000, 0x660000, 0x990000, 0xCC0000, 0xFF0000, 0xFF3300, 0xFF6600,
    0xFF9900, 0xFFCC00, 0xFFFF00, 0xFFFF33, 0xFFFF66, 0xFFFF99, 0xFFFFCC, 0xFFFFFF,
];

#[allow(clippy::unreadable_literal)]
pub static OCEAN: PaletteRamp = hex_ramp![
    0x000033, 0x000066, 0x000099, 0x0000CC, 0x0033CC, 0x0066CC, 0x0099CC, 0x00CCCC,
    0x00CC99, 0x00CC66, 0x009966, 0x006666, 0x003366, 0x002266, 0x001155, 0x000044,
];

/// Mono-accent ramps used when the renderer runs in [`crate::envelope::ColorMode::MonoAccent`]
pub static MONO_BASS: PaletteRamp = PaletteRamp::solid(rgb_from_u32(0x4B0082));
pub static MONO_TREBLE: PaletteRamp = PaletteRamp::solid(rgb_from_u32(0xFF0000));

/// Time-based cross-fade between two ramps
///
/// Interpolates all 16 stops channelwise. A zero duration is a hard cut.
/// Once progress reaches 1.0 the blender is idle and `step` is a no-op.
#[derive(Debug, Clone)]
pub struct PaletteBlender {
    current: PaletteRamp,
    start: PaletteRamp,
    target: Option<PaletteRamp>,
    start_time: Instant,
    duration: Duration,
}

impl PaletteBlender {
    pub const fn new(initial: PaletteRamp) -> Self {
        Self {
            current: initial,
            start: initial,
            target: None,
            start_time: Instant::from_millis(0),
            duration: Duration::from_millis(0),
        }
    }

    /// The ramp as of the last `step`
    pub const fn current(&self) -> &PaletteRamp {
        &self.current
    }

    pub const fn is_blending(&self) -> bool {
        self.target.is_some()
    }

    /// Begin a cross-fade from the current ramp toward `ramp`
    pub fn set_target(&mut self, ramp: PaletteRamp, duration: Duration, now: Instant) {
        self.start_time = now;
        if duration.as_millis() == 0 {
            // Hard cut
            self.current = ramp;
            self.start = ramp;
            self.target = None;
            self.duration = Duration::from_millis(0);
        } else {
            self.start = self.current;
            self.target = Some(ramp);
            self.duration = duration;
        }
    }

    /// Advance the cross-fade; call once per tick
    pub fn step(&mut self, now: Instant) {
        let Some(target) = self.target else {
            return;
        };

        let elapsed = now.duration_since(self.start_time);
        if elapsed >= self.duration {
            self.current = target;
            self.start = target;
            self.target = None;
            return;
        }

        let progress = progress8(elapsed, self.duration);
        let mut stops = *self.start.stops();
        for (stop, goal) in stops.iter_mut().zip(target.stops()) {
            stop.r = blend8(stop.r, goal.r, progress);
            stop.g = blend8(stop.g, goal.g, progress);
            stop.b = blend8(stop.b, goal.b, progress);
        }
        self.current = PaletteRamp::new(stops);
    }
}

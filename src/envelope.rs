//! Multi-phase envelope rendering of pool events
//!
//! Every event runs a flash -> hold -> fade envelope against real elapsed
//! time. Segments are the primary hit indicator: they overwrite the ambient
//! background during flash and hold, then alpha-blend during fade so the
//! background reasserts itself as the event dies. Rings and pulses are
//! secondary overlays and always blend.
//!
//! Both channels render the same event mirrored: channel 2's pixel for
//! position `p` is `strip_len - 1 - p`.

use embassy_time::{Duration, Instant};

use crate::color::{Rgb, WHITE, blend_colors, scale_color_video};
use crate::events::{EventPool, Pulse, Ring, Segment};
use crate::gate::Category;
use crate::math8::{hash, progress8, scale8, scale8_video};
use crate::palette::{MONO_BASS, MONO_TREBLE, PaletteId, PaletteRamp};

/// Durations of the three envelope phases
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeTimings {
    pub flash: Duration,
    pub hold: Duration,
    pub fade: Duration,
}

impl EnvelopeTimings {
    /// Total visible lifetime of a segment event
    pub const fn total(&self) -> Duration {
        Duration::from_millis(
            self.flash.as_millis() + self.hold.as_millis() + self.fade.as_millis(),
        )
    }
}

impl Default for EnvelopeTimings {
    fn default() -> Self {
        Self {
            flash: Duration::from_millis(60),
            hold: Duration::from_millis(250),
            fade: Duration::from_millis(260),
        }
    }
}

/// Envelope phase for a given event age
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Flash,
    Hold,
    /// Fade with remaining brightness 255 -> 0
    Fade { fade_v: u8 },
}

/// Phase for `age`, or None once the lifetime has fully elapsed
pub fn phase_at(age: Duration, timings: &EnvelopeTimings) -> Option<Phase> {
    if age < timings.flash {
        return Some(Phase::Flash);
    }
    let hold_end = Duration::from_millis(timings.flash.as_millis() + timings.hold.as_millis());
    if age < hold_end {
        return Some(Phase::Hold);
    }
    if age >= timings.total() {
        return None;
    }
    let fade_age = age - hold_end;
    Some(Phase::Fade {
        fade_v: 255 - progress8(fade_age, timings.fade),
    })
}

/// Ring expansion and fade parameters
#[derive(Debug, Clone, Copy)]
pub struct RingTuning {
    /// Radius growth in pixels per millisecond
    pub speed: f32,
    pub fade: Duration,
    /// Ring thickness in pixels
    pub width: u16,
}

impl Default for RingTuning {
    fn default() -> Self {
        Self {
            speed: 0.18,
            fade: Duration::from_millis(900),
            width: 10,
        }
    }
}

/// Traveling speckle-burst parameters
#[derive(Debug, Clone, Copy)]
pub struct PulseTuning {
    pub lifetime: Duration,
    /// Travel speed in pixels per second
    pub speed: u16,
    /// Window length in pixels
    pub length: u16,
    /// Blend strength of the speckle texture
    pub intensity: u8,
}

impl Default for PulseTuning {
    fn default() -> Self {
        Self {
            lifetime: Duration::from_millis(850),
            speed: 200,
            length: 20,
            intensity: 100,
        }
    }
}

/// Where event base colors come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Active cross-fading ramp, pushed toward the category accent
    Blended,
    /// Fixed solid ramp per category
    MonoAccent,
}

const FADE_BLEND: u8 = 200; // ~78% mix while a segment dies
const RING_BLEND: u8 = 224;
const ACCENT_PUSH: u8 = 180;

/// Paints active pool events onto both channels
#[derive(Debug, Clone)]
pub struct EnvelopeRenderer {
    pub timings: EnvelopeTimings,
    pub ring: RingTuning,
    pub pulse: PulseTuning,
    pub color_mode: ColorMode,
    /// Force the first/last pixel of a segment to white during flash/hold
    pub edge_white: bool,
}

impl Default for EnvelopeRenderer {
    fn default() -> Self {
        Self {
            timings: EnvelopeTimings::default(),
            ring: RingTuning::default(),
            pulse: PulseTuning::default(),
            color_mode: ColorMode::Blended,
            edge_white: true,
        }
    }
}

/// Shortest distance between two indices on the circular strip
fn wrap_dist(a: u16, b: u16, len: u16) -> u16 {
    let d = a.abs_diff(b);
    d.min(len - d)
}

impl EnvelopeRenderer {
    fn base_color(
        &self,
        ramp: &PaletteRamp,
        palette: PaletteId,
        category: Category,
        index: u8,
    ) -> Rgb {
        match self.color_mode {
            ColorMode::MonoAccent => match category {
                Category::Bass => MONO_BASS.color_at(index, 255),
                Category::Treble => MONO_TREBLE.color_at(index, 255),
            },
            ColorMode::Blended => {
                let accent = match category {
                    Category::Bass => palette.bass_accent(),
                    Category::Treble => palette.treble_accent(),
                };
                blend_colors(ramp.color_at(index, 255), accent, ACCENT_PUSH)
            }
        }
    }

    /// Render all active segments
    #[allow(clippy::cast_possible_truncation)]
    pub fn render_segments<const N: usize>(
        &self,
        now: Instant,
        pool: &EventPool<Segment, N>,
        ramp: &PaletteRamp,
        palette: PaletteId,
        ch1: &mut [Rgb],
        ch2: &mut [Rgb],
    ) {
        let strip_len = ch1.len() as u16;
        if strip_len == 0 {
            return;
        }

        for (seg, started) in pool.iter_active() {
            let age = now.duration_since(started);
            let Some(phase) = phase_at(age, &self.timings) else {
                continue;
            };
            let age_ms = age.as_millis();
            let lane_bias: u8 = match seg.category {
                Category::Bass => 24,
                Category::Treble => 160,
            };

            for o in 0..seg.length {
                let p1 = (seg.origin + o) % strip_len;
                let p2 = strip_len - 1 - p1;

                // Texture jitter drives the palette index
                let jitter = ((u64::from(p1) * 7 + (age_ms >> 2)) & 0x1F) as u8;
                let idx1 = (p1 as u8)
                    .wrapping_mul(2)
                    .wrapping_add(lane_bias)
                    .wrapping_add(jitter);
                let idx2 = (p2 as u8)
                    .wrapping_mul(2)
                    .wrapping_add(lane_bias)
                    .wrapping_add(jitter);

                let base1 = self.base_color(ramp, palette, seg.category, idx1);
                let base2 = self.base_color(ramp, palette, seg.category, idx2);

                let apply = |c: Rgb| match phase {
                    Phase::Flash => {
                        // Bigger hits flash whiter
                        blend_colors(c, WHITE, scale8(200, seg.peak))
                    }
                    Phase::Hold => scale_color_video(c, seg.peak),
                    Phase::Fade { fade_v } => {
                        // Fade down from the per-hit peak, not a fixed max
                        scale_color_video(c, scale8_video(fade_v, seg.peak))
                    }
                };
                let mut pop1 = apply(base1);
                let mut pop2 = apply(base2);

                let in_attack = matches!(phase, Phase::Flash | Phase::Hold);
                if self.edge_white && in_attack && (o == 0 || o == seg.length - 1) {
                    pop1 = WHITE;
                    pop2 = WHITE;
                }

                // Overwrite while attacking, blend while dying
                if in_attack {
                    ch1[usize::from(p1)] = pop1;
                    ch2[usize::from(p2)] = pop2;
                } else {
                    let d1 = ch1[usize::from(p1)];
                    let d2 = ch2[usize::from(p2)];
                    ch1[usize::from(p1)] = blend_colors(d1, pop1, FADE_BLEND);
                    ch2[usize::from(p2)] = blend_colors(d2, pop2, FADE_BLEND);
                }
            }
        }
    }

    /// Render all active rings
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn render_rings<const N: usize>(
        &self,
        now: Instant,
        pool: &EventPool<Ring, N>,
        ramp: &PaletteRamp,
        palette: PaletteId,
        ch1: &mut [Rgb],
        ch2: &mut [Rgb],
    ) {
        let strip_len = ch1.len() as u16;
        if strip_len == 0 {
            return;
        }
        // Shared flicker seed, advanced on a ~28ms cadence
        let seed = (hash(now.as_millis() / 28) & 0xFF) as u8;

        for (ring, started) in pool.iter_active() {
            let age = now.duration_since(started);
            if age >= self.ring.fade {
                continue;
            }
            let age_ms = age.as_millis();
            let life = 255 - progress8(age, self.ring.fade);
            let radius = (age_ms as f32 * self.ring.speed) as u16;

            let accent = match ring.category {
                Category::Bass => palette.bass_accent(),
                Category::Treble => palette.treble_accent(),
            };
            let bias: u8 = match ring.category {
                Category::Bass => 0,
                Category::Treble => 96,
            };

            let falloff = 255 / (self.ring.width + 1);
            for i in 0..strip_len {
                let d = wrap_dist(i, ring.center, strip_len);
                let band = d.abs_diff(radius);
                if band > self.ring.width {
                    continue;
                }

                // Sharper toward the leading edge, dimmer with age
                let ring_v = scale8((255 - band * falloff) as u8, life);
                let ring_v = scale8(ring_v, ring.peak);

                let idx = ((u64::from(i) * 3 + (age_ms >> 2)) & 0xFF) as u8;
                let idx = idx.wrapping_add(bias).wrapping_add(seed & 0x1F);
                let base = ramp.color_at(idx, ring_v);

                // Jittered accent push keeps rings lively but distinct
                let mix =
                    96 + ((u64::from(i) * 13 + u64::from(seed) * 71 + (age_ms >> 3)) & 0x3F) as u8;
                let c = blend_colors(base, accent, mix);

                let p1 = usize::from(i);
                let p2 = usize::from(strip_len - 1 - i);
                ch1[p1] = blend_colors(ch1[p1], c, RING_BLEND);
                ch2[p2] = blend_colors(ch2[p2], c, RING_BLEND);
            }
        }
    }

    /// Render all active pulses
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn render_pulses<const N: usize>(
        &self,
        now: Instant,
        pool: &EventPool<Pulse, N>,
        ramp: &PaletteRamp,
        ch1: &mut [Rgb],
        ch2: &mut [Rgb],
    ) {
        let strip_len = ch1.len() as i32;
        if strip_len == 0 {
            return;
        }

        // Speckle sparsity from intensity and window length: dimmer or longer
        // windows get sparser specks so totals stay reasonable.
        let sparse_base = 1 + (255 - self.pulse.intensity) / 36;
        let len_bias = 1 + (self.pulse.length.saturating_sub(12) / 36) as u8;
        let sparse_mod = (sparse_base + len_bias).min(8);

        for (pulse, started) in pool.iter_active() {
            let age = now.duration_since(started);
            if age >= self.pulse.lifetime {
                continue;
            }
            let age_ms = age.as_millis();
            let life = 255 - progress8(age, self.pulse.lifetime);

            let dist = (i64::from(self.pulse.speed) * age_ms as i64 / 1000) as i32;
            let center = if pulse.forward {
                i32::from(pulse.origin) + dist
            } else {
                i32::from(pulse.origin) - dist
            };
            let half = i32::from(self.pulse.length / 2);

            let buf: &mut [Rgb] = if pulse.channel == 0 { ch1 } else { ch2 };
            for p in (center - half)..=(center + half) {
                if p < 0 || p >= strip_len {
                    continue;
                }
                let pu = p as u64;

                // Hash noise stands in for smooth gradient noise here; the
                // window is small and short-lived enough that it reads as
                // static either way.
                let noise = (hash(pu * 11 ^ (age_ms * 8)) & 0xFF) as u8;
                let speck = ((pu * 131 + age_ms * 17) as u8) % sparse_mod == 0;

                let v = scale8(scale8(noise, self.pulse.intensity), life);
                let mut c = ramp.color_at(((pu * 3 + age_ms) & 0xFF) as u8, v);
                if speck {
                    c = blend_colors(c, WHITE, 96);
                }

                let idx = p as usize;
                buf[idx] = blend_colors(buf[idx], c, v);
            }
        }
    }
}

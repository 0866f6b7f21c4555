//! The tick orchestrator
//!
//! One [`Engine::tick`] call turns a raw 7-band spectrum sample into two
//! fully rendered pixel channels. The order inside a tick is fixed: drain
//! control intents, run the AGC, check the gates and spawn events, advance
//! the palette cross-fade, retire dead events, then paint ambient clouds
//! and event envelopes into both channel buffers.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::agc::{AgcTuning, BAND_COUNT, BandNormalizer, SceneLevel};
use crate::ambient::{AmbientField, AmbientTuning, scene_brightness, scene_motion};
use crate::color::Rgb;
use crate::control::{ControlIntent, ControlReceiver};
use crate::envelope::{ColorMode, EnvelopeRenderer, EnvelopeTimings};
use crate::events::{EventPool, Pulse, Ring, Segment};
use crate::gate::{Category, GateConfig, GateDetector, Hit, SpawnTuning};
use crate::math8::hash;
use crate::palette::{PaletteBlender, PaletteId, PaletteRamp};

/// Band index feeding the bass gate
pub const BASS_BAND: usize = 1;
/// Band index feeding the treble gate
pub const TREBLE_BAND: usize = 5;

pub const SEGMENT_POOL_SIZE: usize = 8;
pub const RING_POOL_SIZE: usize = 10;
pub const PULSE_POOL_SIZE: usize = 6;

const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Initial engine configuration
///
/// Everything here can also be changed at runtime through the control
/// channel, except the ambient drift speeds and the noise seed.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub agc: AgcTuning,
    pub gate: GateConfig,
    pub envelope: EnvelopeTimings,
    pub color_mode: ColorMode,
    /// White endpoint markers on segment attacks
    pub edge_white: bool,
    pub palette: PaletteId,
    /// Duration of runtime palette cross-fades
    pub palette_blend: Duration,
    /// Channel 1 cloud drift in pixels per second
    pub ambient_speed_ch1: f32,
    /// Channel 2 cloud drift in pixels per second (negative = opposite way)
    pub ambient_speed_ch2: f32,
    /// Seed for deterministic cloud placement and pulse jitter
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            agc: AgcTuning::default(),
            gate: GateConfig::default(),
            envelope: EnvelopeTimings::default(),
            color_mode: ColorMode::Blended,
            edge_white: true,
            palette: PaletteId::TealMagenta,
            palette_blend: Duration::from_millis(250),
            ambient_speed_ch1: 8.0,
            ambient_speed_ch2: -4.0,
            seed: 0x5EED_1D,
        }
    }
}

/// What one tick did, for logging and host-side status
#[derive(Debug, Clone, Copy)]
pub struct FrameSummary {
    pub active_segments: usize,
    pub active_rings: usize,
    pub active_pulses: usize,
    pub palette: PaletteId,
    /// Smoothed overall loudness in [0, 1]
    pub scene_level: f32,
    pub laser_fired: bool,
    pub quiet: bool,
}

/// Audio-reactive renderer for two mirrored pixel channels
pub struct Engine<'a, const NUM_LEDS: usize, const CONTROL_SIZE: usize> {
    controls: ControlReceiver<'a, CONTROL_SIZE>,

    normalizer: BandNormalizer,
    scene: SceneLevel,
    detector: GateDetector,

    segments: EventPool<Segment, SEGMENT_POOL_SIZE>,
    rings: EventPool<Ring, RING_POOL_SIZE>,
    pulses: EventPool<Pulse, PULSE_POOL_SIZE>,

    blender: PaletteBlender,
    palette: PaletteId,
    palette_blend: Duration,
    renderer: EnvelopeRenderer,

    ambient1: AmbientField,
    ambient2: AmbientField,

    ch1: [Rgb; NUM_LEDS],
    ch2: [Rgb; NUM_LEDS],

    seed: u64,
    pulse_flip: bool,
}

impl<'a, const NUM_LEDS: usize, const CONTROL_SIZE: usize> Engine<'a, NUM_LEDS, CONTROL_SIZE> {
    pub fn new(controls: ControlReceiver<'a, CONTROL_SIZE>, config: &EngineConfig) -> Self {
        let spawn = SpawnTuning::for_strip(NUM_LEDS);
        let ambient = |speed: f32, salt: u64| {
            AmbientField::new(
                AmbientTuning::for_strip(NUM_LEDS, speed),
                NUM_LEDS,
                config.seed ^ salt,
            )
        };
        Self {
            controls,
            normalizer: BandNormalizer::new(config.agc),
            scene: SceneLevel::new(),
            detector: GateDetector::new(config.gate, spawn, NUM_LEDS),
            segments: EventPool::new(),
            rings: EventPool::new(),
            pulses: EventPool::new(),
            blender: PaletteBlender::new(*config.palette.ramp()),
            palette: config.palette,
            palette_blend: config.palette_blend,
            renderer: EnvelopeRenderer {
                timings: config.envelope,
                color_mode: config.color_mode,
                edge_white: config.edge_white,
                ..EnvelopeRenderer::default()
            },
            ambient1: ambient(config.ambient_speed_ch1, 0x01),
            ambient2: ambient(config.ambient_speed_ch2, 0x02),
            ch1: [BLACK; NUM_LEDS],
            ch2: [BLACK; NUM_LEDS],
            seed: config.seed,
            pulse_flip: false,
        }
    }

    /// The rendered channel buffers as of the last tick
    pub const fn channels(&self) -> (&[Rgb; NUM_LEDS], &[Rgb; NUM_LEDS]) {
        (&self.ch1, &self.ch2)
    }

    pub const fn palette(&self) -> PaletteId {
        self.palette
    }

    /// The cross-fading ramp as of the last tick
    pub const fn current_ramp(&self) -> &PaletteRamp {
        self.blender.current()
    }

    pub const fn renderer(&self) -> &EnvelopeRenderer {
        &self.renderer
    }

    pub const fn gate_config(&self) -> &GateConfig {
        self.detector.config()
    }

    /// Process one spectrum sample and render both channels
    #[allow(clippy::cast_possible_truncation)]
    pub fn tick(&mut self, now: Instant, raw: &[u16; BAND_COUNT]) -> FrameSummary {
        self.process_intents(now);

        self.normalizer.update(raw);
        self.scene.update(self.normalizer.peak());

        if let Some(hit) = self
            .detector
            .check(Category::Bass, self.normalizer.normalized(BASS_BAND), now)
        {
            self.spawn_hit(&hit, now);
        }
        if let Some(hit) =
            self.detector
                .check(Category::Treble, self.normalizer.normalized(TREBLE_BAND), now)
        {
            self.spawn_hit(&hit, now);
        }
        let laser_fired = self.detector.check_laser(self.normalizer.peak(), now);
        if laser_fired {
            self.spawn_pulse(now);
        }

        self.blender.step(now);

        self.segments
            .retire_expired(now, self.renderer.timings.total());
        self.rings.retire_expired(now, self.renderer.ring.fade);
        self.pulses.retire_expired(now, self.renderer.pulse.lifetime);

        self.render(now);

        FrameSummary {
            active_segments: self.segments.active_count(),
            active_rings: self.rings.active_count(),
            active_pulses: self.pulses.active_count(),
            palette: self.palette,
            scene_level: self.scene.get(),
            laser_fired,
            quiet: self.normalizer.is_quiet(),
        }
    }

    fn spawn_hit(&mut self, hit: &Hit, now: Instant) {
        self.segments.spawn(
            Segment {
                origin: hit.origin,
                length: hit.length,
                category: hit.category,
                peak: hit.peak,
            },
            now,
        );
        if self.detector.wants_ring(hit) {
            #[allow(clippy::cast_possible_truncation)]
            let center = (hit.origin + hit.length / 2) % NUM_LEDS as u16;
            self.rings.spawn(
                Ring {
                    center,
                    category: hit.category,
                    peak: hit.peak,
                },
                now,
            );
        }
    }

    /// Launch a pulse near the strip midpoint, alternating channel and
    /// direction so consecutive laser hits do not stack
    #[allow(clippy::cast_possible_truncation)]
    fn spawn_pulse(&mut self, now: Instant) {
        let strip_len = NUM_LEDS as u16;
        let jitter_span = (strip_len / 8).max(1);
        let jitter = (hash(self.seed ^ now.as_millis()) as u16) % jitter_span;
        let origin = (strip_len / 2 + jitter).min(strip_len.saturating_sub(1));

        self.pulses.spawn(
            Pulse {
                origin,
                forward: self.pulse_flip,
                channel: u8::from(self.pulse_flip),
            },
            now,
        );
        self.pulse_flip = !self.pulse_flip;
    }

    fn render(&mut self, now: Instant) {
        let scene = self.scene.get();
        let base_v = scene_brightness(scene);
        let motion = scene_motion(scene);
        let ramp = *self.blender.current();

        self.ambient1.advance(now, NUM_LEDS, motion);
        self.ambient2.advance(now, NUM_LEDS, motion);
        self.ambient1.render(now, &mut self.ch1, false, &ramp, base_v);
        self.ambient2.render(now, &mut self.ch2, true, &ramp, base_v);

        self.renderer.render_segments(
            now,
            &self.segments,
            &ramp,
            self.palette,
            &mut self.ch1,
            &mut self.ch2,
        );
        self.renderer.render_rings(
            now,
            &self.rings,
            &ramp,
            self.palette,
            &mut self.ch1,
            &mut self.ch2,
        );
        self.renderer
            .render_pulses(now, &self.pulses, &ramp, &mut self.ch1, &mut self.ch2);
    }

    /// Drain pending control intents (non-blocking) and apply them in order
    fn process_intents(&mut self, now: Instant) {
        while let Ok(intent) = self.controls.try_receive() {
            self.apply_intent(intent, now);
        }
    }

    fn apply_intent(&mut self, intent: ControlIntent, now: Instant) {
        match intent {
            ControlIntent::SetPalette { id, blend } => {
                if id != self.palette {
                    let blend = blend.unwrap_or(self.palette_blend);
                    #[cfg(feature = "esp32-log")]
                    println!("palette -> {} ({}ms)", id.as_str(), blend.as_millis());
                    self.palette = id;
                    self.blender.set_target(*id.ramp(), blend, now);
                }
            }
            ControlIntent::SetGate {
                category,
                threshold,
            } => {
                let threshold = threshold.min(900);
                let config = self.detector.config_mut();
                match category {
                    Category::Bass => config.bass_gate = threshold,
                    Category::Treble => config.treble_gate = threshold,
                }
            }
            ControlIntent::SetLaserGate { threshold } => {
                self.detector.config_mut().laser_gate = threshold.min(900);
            }
            ControlIntent::SetSensitivity { value } => {
                self.detector.config_mut().sensitivity = value;
            }
            ControlIntent::SetDebounce { category, interval } => {
                // A zero interval would retrigger every tick
                let interval = interval.max(Duration::from_millis(1));
                let config = self.detector.config_mut();
                match category {
                    Category::Bass => config.bass_debounce = interval,
                    Category::Treble => config.treble_debounce = interval,
                }
            }
            ControlIntent::SetEnvelope { timings } => {
                self.renderer.timings = timings;
            }
            ControlIntent::SetColorMode { mode } => {
                self.renderer.color_mode = mode;
            }
            ControlIntent::SetEdgeWhite { enabled } => {
                self.renderer.edge_white = enabled;
            }
        }
    }

    /// Default cross-fade used when a caller has no preference
    pub const fn palette_blend(&self) -> Duration {
        self.palette_blend
    }
}

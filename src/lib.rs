#![no_std]

pub mod agc;
pub mod ambient;
pub mod color;
pub mod control;
pub mod engine;
pub mod envelope;
pub mod events;
pub mod frame_scheduler;
pub mod gate;
pub mod math8;
pub mod palette;

pub use agc::{AgcTuning, BAND_COUNT, BandNormalizer, SceneLevel};
pub use ambient::{AmbientField, AmbientTuning};
pub use control::{
    ControlChannel, ControlIntent, ControlReceiver, ControlSender, TryReceiveError, TrySendError,
};
pub use engine::{Engine, EngineConfig, FrameSummary};
pub use envelope::{ColorMode, EnvelopeRenderer, EnvelopeTimings};
pub use events::EventPool;
pub use frame_scheduler::FrameScheduler;
pub use gate::{Category, GateConfig, GateDetector, SpawnTuning};
pub use palette::{PALETTE_COUNT, PaletteBlender, PaletteId, PaletteRamp};

pub use color::Rgb;
pub use embassy_time::{Duration, Instant};

/// Abstract LED driver trait
///
/// Implement this trait to support different hardware platforms.
/// The engine renders both channels every frame; drivers that mirror a
/// single physical strip may ignore the second slice.
pub trait OutputDriver {
    /// Write colors to both LED channels
    fn write(&mut self, channel1: &[Rgb], channel2: &[Rgb]);
}

/// Abstract spectrum input trait
///
/// Implement this over whatever produces the 7-band magnitudes (an MSGEQ7
/// read, an FFT task, a network feed). Values are clamped to the 0-900
/// raw scale downstream.
pub trait SpectrumSource {
    /// Sample the current band magnitudes
    fn sample(&mut self) -> [u16; agc::BAND_COUNT];
}

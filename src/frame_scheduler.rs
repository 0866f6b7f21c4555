//! Frame scheduling and timing utilities.
//!
//! Provides portable frame pacing without async/await or platform-specific
//! timers. Each frame pulls one spectrum sample from the source, runs the
//! engine, and pushes both channels to the output driver. The caller is
//! responsible for sleeping/waiting between frames.

use embassy_time::{Duration, Instant};

use crate::engine::{Engine, FrameSummary};
use crate::{OutputDriver, SpectrumSource};

/// Default target frame rate (90 FPS).
pub const DEFAULT_FPS: u32 = 90;

/// Default frame duration based on target FPS.
pub const DEFAULT_FRAME_DURATION: Duration = Duration::from_millis(1000 / DEFAULT_FPS as u64);

/// Result of a frame tick operation.
#[derive(Debug, Clone, Copy)]
pub struct FrameResult {
    /// The deadline for the next frame.
    pub next_deadline: Instant,
    /// How long to wait until the next frame (may be zero if behind schedule).
    pub sleep_duration: Duration,
    /// What the engine did this frame.
    pub summary: FrameSummary,
}

/// Portable frame scheduler that manages timing without async.
///
/// This scheduler:
/// - Tracks frame timing with drift correction
/// - Samples the spectrum source and runs the engine
/// - Writes both channels to the output driver
/// - Returns timing info so the caller can sleep appropriately
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = FrameScheduler::new(engine, source, driver);
///
/// loop {
///     let now = get_current_time_ms();
///     let result = scheduler.tick(Instant::from_millis(now));
///
///     // Platform-specific sleep
///     sleep_ms(result.sleep_duration.as_millis() as u64);
/// }
/// ```
pub struct FrameScheduler<
    'a,
    S: SpectrumSource,
    O: OutputDriver,
    const NUM_LEDS: usize,
    const CONTROL_SIZE: usize,
> {
    source: S,
    output: O,
    engine: Engine<'a, NUM_LEDS, CONTROL_SIZE>,
    next_frame: Instant,
    frame_duration: Duration,
}

impl<'a, S: SpectrumSource, O: OutputDriver, const NUM_LEDS: usize, const CONTROL_SIZE: usize>
    FrameScheduler<'a, S, O, NUM_LEDS, CONTROL_SIZE>
{
    /// Create a new frame scheduler.
    ///
    /// Uses `DEFAULT_FRAME_DURATION` (90 FPS) for frame timing.
    pub fn new(engine: Engine<'a, NUM_LEDS, CONTROL_SIZE>, source: S, driver: O) -> Self {
        Self::with_frame_duration(engine, source, driver, DEFAULT_FRAME_DURATION)
    }

    /// Create a new frame scheduler with custom frame duration.
    pub fn with_frame_duration(
        engine: Engine<'a, NUM_LEDS, CONTROL_SIZE>,
        source: S,
        driver: O,
        frame_duration: Duration,
    ) -> Self {
        Self {
            source,
            output: driver,
            engine,
            next_frame: Instant::from_millis(0),
            frame_duration,
        }
    }

    /// Process one frame and return timing information.
    ///
    /// This method:
    /// 1. Applies drift correction if we've fallen too far behind
    /// 2. Samples the spectrum and runs the engine
    /// 3. Writes both channels to the output driver
    /// 4. Returns the deadline for the next frame
    ///
    /// The caller is responsible for waiting until `next_deadline` before
    /// calling `tick` again.
    pub fn tick(&mut self, now: Instant) -> FrameResult {
        // Drift correction: if we've fallen too far behind, reset to now
        // This prevents catch-up bursts after long stalls
        let max_drift_ms = self.frame_duration.as_millis() * 2;
        if now.as_millis() > self.next_frame.as_millis() + max_drift_ms {
            self.next_frame = now;
        }

        // Sample, render, output
        let raw = self.source.sample();
        let summary = self.engine.tick(now, &raw);
        let (ch1, ch2) = self.engine.channels();
        self.output.write(ch1, ch2);

        // Calculate next frame deadline
        self.next_frame += self.frame_duration;

        // Calculate sleep duration (may be zero if we're behind)
        let sleep_duration = if self.next_frame.as_millis() > now.as_millis() {
            Duration::from_millis(self.next_frame.as_millis() - now.as_millis())
        } else {
            Duration::from_millis(0)
        };

        FrameResult {
            next_deadline: self.next_frame,
            sleep_duration,
            summary,
        }
    }

    /// Get a reference to the engine.
    pub const fn engine(&self) -> &Engine<'a, NUM_LEDS, CONTROL_SIZE> {
        &self.engine
    }

    /// Get a mutable reference to the engine.
    pub const fn engine_mut(&mut self) -> &mut Engine<'a, NUM_LEDS, CONTROL_SIZE> {
        &mut self.engine
    }
}

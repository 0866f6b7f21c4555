//! Runtime control plane
//!
//! A bounded, `no_std`-friendly channel built on `critical-section` and
//! `heapless::Deque` carries [`ControlIntent`] values from any context (task,
//! interrupt, network handler) into the engine. The engine drains the queue
//! at the start of every tick and applies intents in arrival order, clamping
//! values to their valid ranges as it goes.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_time::Duration;
use heapless::Deque;

use crate::envelope::{ColorMode, EnvelopeTimings};
use crate::gate::Category;
use crate::palette::PaletteId;

/// Error returned when trying to send to a full channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrySendError<T>(pub T);

/// Error returned when trying to receive from an empty channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryReceiveError;

/// A bounded, thread-safe channel.
///
/// Uses critical sections for synchronization, making it suitable for
/// embedded environments. Backed by a fixed-size `heapless::Deque`.
pub struct Channel<T, const SIZE: usize> {
    inner: Mutex<RefCell<Deque<T, SIZE>>>,
}

impl<T, const SIZE: usize> Channel<T, SIZE> {
    /// Create a new empty channel.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Get a sender handle for this channel.
    ///
    /// Multiple senders can coexist; they share access to the same queue.
    pub const fn sender(&self) -> Sender<'_, T, SIZE> {
        Sender { channel: self }
    }

    /// Get a receiver handle for this channel.
    pub const fn receiver(&self) -> Receiver<'_, T, SIZE> {
        Receiver { channel: self }
    }

    /// Try to send a value into the channel.
    ///
    /// Returns `Err(TrySendError(value))` if the channel is full.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(value).map_err(TrySendError)
        })
    }

    /// Try to receive a value from the channel.
    ///
    /// Returns `Err(TryReceiveError)` if the channel is empty.
    pub fn try_receive(&self) -> Result<T, TryReceiveError> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.pop_front().ok_or(TryReceiveError)
        })
    }
}

impl<T, const SIZE: usize> Default for Channel<T, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// A sender handle for a [`Channel`].
#[derive(Clone, Copy)]
pub struct Sender<'a, T, const SIZE: usize> {
    channel: &'a Channel<T, SIZE>,
}

impl<T, const SIZE: usize> Sender<'_, T, SIZE> {
    /// Try to send a value into the channel.
    ///
    /// Returns `Err(TrySendError(value))` if the channel is full.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        self.channel.try_send(value)
    }
}

/// A receiver handle for a [`Channel`].
#[derive(Clone, Copy)]
pub struct Receiver<'a, T, const SIZE: usize> {
    channel: &'a Channel<T, SIZE>,
}

impl<T, const SIZE: usize> Receiver<'_, T, SIZE> {
    /// Try to receive a value from the channel.
    ///
    /// Returns `Err(TryReceiveError)` if the channel is empty.
    pub fn try_receive(&self) -> Result<T, TryReceiveError> {
        self.channel.try_receive()
    }
}

/// A runtime adjustment request for the engine
#[derive(Debug, Clone, Copy)]
pub enum ControlIntent {
    /// Cross-fade to a different palette; `None` uses the engine's configured
    /// default blend, zero means hard cut
    SetPalette {
        id: PaletteId,
        blend: Option<Duration>,
    },
    /// Raw-domain gate threshold (clamped to 0-900) for one category
    SetGate { category: Category, threshold: u16 },
    /// Raw-domain threshold for the laser gate (clamped to 0-900)
    SetLaserGate { threshold: u16 },
    /// Multiplicative sensitivity applied before gating (255 = unity)
    SetSensitivity { value: u8 },
    /// Minimum interval between triggers for one category
    SetDebounce { category: Category, interval: Duration },
    /// Flash/hold/fade durations for segment events
    SetEnvelope { timings: EnvelopeTimings },
    /// How event colors are derived from the palette
    SetColorMode { mode: ColorMode },
    /// Toggle the white endpoint marker on segment attacks
    SetEdgeWhite { enabled: bool },
}

/// Type alias for control senders
pub type ControlSender<'a, const SIZE: usize> = Sender<'a, ControlIntent, SIZE>;

/// Type alias for control receivers
pub type ControlReceiver<'a, const SIZE: usize> = Receiver<'a, ControlIntent, SIZE>;

/// Type alias for the control channel
pub type ControlChannel<const SIZE: usize> = Channel<ControlIntent, SIZE>;

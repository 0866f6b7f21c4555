//! Transient visual events and their fixed-capacity pools
//!
//! Events are spawned on gate triggers, age against the tick clock, and
//! self-terminate when their lifetime elapses. Pools never allocate: a spawn
//! into a full pool silently evicts the oldest active event, so sustained
//! over-triggering drops the longest-running visual instead of the newest.

use embassy_time::{Duration, Instant};

use crate::gate::Category;

/// A fixed-length lit block starting at `origin` on channel 1
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub origin: u16,
    pub length: u16,
    pub category: Category,
    /// Per-hit max brightness, 130-255
    pub peak: u8,
}

/// An expanding ring of fixed width around `center`
#[derive(Debug, Clone, Copy)]
pub struct Ring {
    pub center: u16,
    pub category: Category,
    pub peak: u8,
}

/// A traveling speckle burst
#[derive(Debug, Clone, Copy)]
pub struct Pulse {
    pub origin: u16,
    pub forward: bool,
    /// Which output channel the pulse travels on
    pub channel: u8,
}

#[derive(Debug, Clone, Copy)]
struct ActiveSlot<T: Copy> {
    payload: T,
    started: Instant,
}

/// Fixed-capacity slot manager with evict-oldest backpressure
///
/// At most one pool owns any given event; slots are reused in place and the
/// array never grows.
#[derive(Debug)]
pub struct EventPool<T: Copy, const N: usize> {
    slots: [Option<ActiveSlot<T>>; N],
}

impl<T: Copy, const N: usize> EventPool<T, N> {
    pub const fn new() -> Self {
        Self { slots: [None; N] }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Place an event in a free slot, evicting the oldest active one if full
    pub fn spawn(&mut self, payload: T, now: Instant) {
        let slot = ActiveSlot {
            payload,
            started: now,
        };

        if let Some(free) = self.slots.iter_mut().find(|s| s.is_none()) {
            *free = Some(slot);
            return;
        }

        // Full: overwrite the slot with the greatest age
        let oldest = self
            .slots
            .iter_mut()
            .min_by_key(|s| s.map_or(Instant::MAX, |a| a.started));
        if let Some(victim) = oldest {
            *victim = Some(slot);
        }
    }

    /// Free every slot whose age meets or exceeds `lifetime`
    pub fn retire_expired(&mut self, now: Instant, lifetime: Duration) {
        for slot in &mut self.slots {
            if let Some(active) = slot {
                if now.duration_since(active.started) >= lifetime {
                    *slot = None;
                }
            }
        }
    }

    /// Active events with their start times
    pub fn iter_active(&self) -> impl Iterator<Item = (&T, Instant)> {
        self.slots
            .iter()
            .flatten()
            .map(|slot| (&slot.payload, slot.started))
    }
}

impl<T: Copy, const N: usize> Default for EventPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

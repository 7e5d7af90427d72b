//! Real-time sources used for action pacing and animation gating.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::types::EntityId;

pub trait Clock {
    /// Monotonic time elapsed since the clock was created.
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock advanced explicitly by the caller. Used by replays and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationHandle(pub u64);

/// Presentation-side animation playback, consulted only to gate monster pacing.
pub trait AnimationGate {
    fn start_attack_animation(&mut self, attacker: EntityId, target: EntityId) -> AnimationHandle;
    fn is_playing(&self, handle: AnimationHandle) -> bool;
}

/// Headless gate: animations finish instantly.
#[derive(Debug, Default)]
pub struct NoAnimations {
    next: u64,
}

impl AnimationGate for NoAnimations {
    fn start_attack_animation(&mut self, _attacker: EntityId, _target: EntityId) -> AnimationHandle {
        self.next += 1;
        AnimationHandle(self.next)
    }

    fn is_playing(&self, _handle: AnimationHandle) -> bool {
        false
    }
}

/// Every attack animation plays for a fixed duration measured on a shared clock.
pub struct TimedAnimations<'a> {
    clock: &'a dyn Clock,
    duration: Duration,
    next: u64,
    started: Vec<(AnimationHandle, Duration)>,
}

impl<'a> TimedAnimations<'a> {
    pub fn new(clock: &'a dyn Clock, duration: Duration) -> Self {
        Self { clock, duration, next: 0, started: Vec::new() }
    }
}

impl AnimationGate for TimedAnimations<'_> {
    fn start_attack_animation(&mut self, _attacker: EntityId, _target: EntityId) -> AnimationHandle {
        let now = self.clock.now();
        self.started.retain(|(_, at)| now.saturating_sub(*at) < self.duration);
        self.next += 1;
        let handle = AnimationHandle(self.next);
        self.started.push((handle, now));
        handle
    }

    fn is_playing(&self, handle: AnimationHandle) -> bool {
        let now = self.clock.now();
        self.started
            .iter()
            .any(|(h, at)| *h == handle && now.saturating_sub(*at) < self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_animation_stops_playing_after_its_duration() {
        let clock = ManualClock::new();
        let mut gate = TimedAnimations::new(&clock, Duration::from_millis(300));
        let handle = gate.start_attack_animation(EntityId::default(), EntityId::default());
        assert!(gate.is_playing(handle));
        clock.advance(Duration::from_millis(299));
        assert!(gate.is_playing(handle));
        clock.advance(Duration::from_millis(1));
        assert!(!gate.is_playing(handle));
    }

    #[test]
    fn headless_gate_never_blocks() {
        let mut gate = NoAnimations::default();
        let handle = gate.start_attack_animation(EntityId::default(), EntityId::default());
        assert!(!gate.is_playing(handle));
    }
}

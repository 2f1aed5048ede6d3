//! Fake height state shared between the command controller and the resize
//! orchestrator.
//!
//! Each field is its own atomic. There is no multi-field atomicity: a resize
//! racing a commit sees either the old or the new value of each field, and the
//! resize signal sent after every commit converges the PTY on the latest state.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

/// Smallest absolute height that can be reported
pub const MIN_HEIGHT: i32 = 1;
/// Largest absolute height that can be reported
pub const MAX_HEIGHT: i32 = 9999;
/// Largest magnitude a delta may have
pub const MAX_DELTA: i32 = 9999;

/// Where the effective height currently comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightSource {
    Real,
    Delta(i32),
    Fixed(u16),
}

/// A point-in-time copy of the height state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightSnapshot {
    pub absolute: u16,
    pub delta: i32,
    pub use_real_size: bool,
}

impl HeightSnapshot {
    pub fn source(&self) -> HeightSource {
        if self.use_real_size {
            HeightSource::Real
        } else if self.delta != 0 {
            HeightSource::Delta(self.delta)
        } else {
            HeightSource::Fixed(self.absolute)
        }
    }

    /// Row count to report to the child given the real terminal height.
    pub fn effective_height(&self, real_rows: u16) -> u16 {
        match self.source() {
            HeightSource::Real => real_rows,
            HeightSource::Delta(delta) => {
                let rows = (i32::from(real_rows) + delta).max(1);
                u16::try_from(rows).unwrap_or(u16::MAX)
            }
            HeightSource::Fixed(rows) => rows,
        }
    }
}

/// Shared, concurrently mutated height state.
#[derive(Debug)]
pub struct HeightState {
    absolute: AtomicI32,
    delta: AtomicI32,
    use_real_size: AtomicBool,
    default_absolute: i32,
    default_delta: i32,
}

fn clamp_height(rows: i32) -> i32 {
    rows.clamp(MIN_HEIGHT, MAX_HEIGHT)
}

fn clamp_delta(delta: i32) -> i32 {
    delta.clamp(-MAX_DELTA, MAX_DELTA)
}

impl HeightState {
    /// Create the state with its process-start defaults.
    pub fn new(absolute: u16, delta: i32) -> Self {
        let absolute = clamp_height(i32::from(absolute));
        let delta = clamp_delta(delta);
        Self {
            absolute: AtomicI32::new(absolute),
            delta: AtomicI32::new(delta),
            use_real_size: AtomicBool::new(false),
            default_absolute: absolute,
            default_delta: delta,
        }
    }

    pub fn absolute(&self) -> u16 {
        // Always stored clamped to 1..=9999
        self.absolute.load(Ordering::Acquire) as u16
    }

    pub fn delta(&self) -> i32 {
        self.delta.load(Ordering::Acquire)
    }

    pub fn use_real_size(&self) -> bool {
        self.use_real_size.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> HeightSnapshot {
        HeightSnapshot {
            absolute: self.absolute(),
            delta: self.delta(),
            use_real_size: self.use_real_size(),
        }
    }

    /// Set a new absolute height. Clears any active delta.
    pub fn set_absolute(&self, rows: u16) {
        self.absolute
            .store(clamp_height(i32::from(rows)), Ordering::Release);
        self.delta.store(0, Ordering::Release);
    }

    pub fn set_delta(&self, delta: i32) {
        self.delta.store(clamp_delta(delta), Ordering::Release);
    }

    /// Flip the real-size bypass. Returns the new value.
    pub fn toggle_real_size(&self) -> bool {
        !self.use_real_size.fetch_xor(true, Ordering::AcqRel)
    }

    /// Restore the process-start height and delta and turn the bypass off.
    pub fn reset(&self) {
        self.absolute.store(self.default_absolute, Ordering::Release);
        self.delta.store(self.default_delta, Ordering::Release);
        self.use_real_size.store(false, Ordering::Release);
    }

    /// Adjust whichever of delta or absolute height is active by `amount`.
    ///
    /// The controller is the only writer, so load-then-store does not lose
    /// updates.
    pub fn step(&self, amount: i32) {
        let delta = self.delta();
        if delta != 0 {
            self.delta
                .store(clamp_delta(delta + amount), Ordering::Release);
        } else {
            let absolute = self.absolute.load(Ordering::Acquire);
            self.absolute
                .store(clamp_height(absolute + amount), Ordering::Release);
        }
    }

    pub fn effective_height(&self, real_rows: u16) -> u16 {
        self.snapshot().effective_height(real_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_defaults() {
        let state = HeightState::new(0, 20_000);
        assert_eq!(state.absolute(), 1);
        assert_eq!(state.delta(), MAX_DELTA);
    }

    #[test]
    fn test_set_absolute_clears_delta() {
        let state = HeightState::new(100, 10);
        state.set_absolute(50);
        assert_eq!(state.absolute(), 50);
        assert_eq!(state.delta(), 0);
        assert_eq!(state.effective_height(24), 50);
    }

    #[test]
    fn test_delta_takes_precedence_over_absolute() {
        let state = HeightState::new(100, 0);
        state.set_delta(10);
        assert_eq!(state.effective_height(24), 34);
        assert_eq!(state.absolute(), 100);
    }

    #[test]
    fn test_negative_delta_floors_at_one() {
        let state = HeightState::new(100, -50);
        assert_eq!(state.effective_height(24), 1);
    }

    #[test]
    fn test_real_size_bypasses_everything_without_clearing() {
        let state = HeightState::new(100, 5);
        assert!(state.toggle_real_size());
        assert_eq!(state.effective_height(24), 24);
        assert_eq!(state.delta(), 5);
        assert!(!state.toggle_real_size());
        assert_eq!(state.effective_height(24), 29);
    }

    #[test]
    fn test_step_clamps_absolute() {
        let state = HeightState::new(9990, 0);
        for _ in 0..10 {
            state.step(1);
        }
        assert_eq!(state.absolute(), 9999);
        state.set_absolute(3);
        state.step(-200);
        assert_eq!(state.absolute(), 1);
    }

    #[test]
    fn test_step_moves_delta_when_active() {
        let state = HeightState::new(100, 4);
        state.step(20);
        assert_eq!(state.delta(), 24);
        assert_eq!(state.absolute(), 100);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let state = HeightState::new(100, 0);
        state.set_delta(-3);
        state.toggle_real_size();
        state.reset();
        assert_eq!(
            state.snapshot(),
            HeightSnapshot {
                absolute: 100,
                delta: 0,
                use_real_size: false
            }
        );
    }

    #[test]
    fn test_snapshot_source() {
        let snap = HeightSnapshot {
            absolute: 100,
            delta: 0,
            use_real_size: false,
        };
        assert_eq!(snap.source(), HeightSource::Fixed(100));
        assert_eq!(
            HeightSnapshot { delta: -2, ..snap }.source(),
            HeightSource::Delta(-2)
        );
        assert_eq!(
            HeightSnapshot {
                use_real_size: true,
                ..snap
            }
            .source(),
            HeightSource::Real
        );
    }
}

//! Single-flight gate for poll ticks.

use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollerState {
    Idle,
    Running,
}

/// Shared {Idle, Running} state. A tick may only start from `Idle`.
#[derive(Clone)]
pub(crate) struct SingleFlight {
    state: Arc<Mutex<PollerState>>,
}

impl SingleFlight {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(PollerState::Idle)),
        }
    }

    pub(crate) fn state(&self) -> PollerState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Move to `Running` and return a guard, or `None` if already running.
    pub(crate) fn try_begin(&self) -> Option<FlightGuard> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match *state {
            PollerState::Running => None,
            PollerState::Idle => {
                *state = PollerState::Running;
                Some(FlightGuard {
                    state: Arc::clone(&self.state),
                })
            }
        }
    }
}

/// Returns the gate to `Idle` when dropped, including on cancellation.
pub(crate) struct FlightGuard {
    state: Arc<Mutex<PollerState>>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = PollerState::Idle;
    }
}

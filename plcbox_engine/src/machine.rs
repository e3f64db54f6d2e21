//! Engine lifecycle transitions.
//!
//! Idle → Running → Stopped. Stopped is terminal: an engine runs at most
//! once, and a new run needs a new engine.

use std::fmt;

/// Lifecycle state of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineLifecycle {
    /// Constructed, not yet started.
    #[default]
    Idle,
    /// Control loop executing.
    Running,
    /// Finished (terminal).
    Stopped,
}

impl fmt::Display for EngineLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// Event that can trigger a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Control loop about to enter its first cycle.
    Start,
    /// Running flag cleared by the owner.
    StopRequested,
    /// Board read or write failed.
    HardwareFault,
}

/// Result of a lifecycle transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded, new state.
    Ok(EngineLifecycle),
    /// Transition rejected, reason.
    Rejected(&'static str),
}

/// Lifecycle manager holding the current state.
#[derive(Debug, Clone, Default)]
pub struct LifecycleMachine {
    state: EngineLifecycle,
}

impl LifecycleMachine {
    /// Create a machine in Idle.
    pub const fn new() -> Self {
        Self {
            state: EngineLifecycle::Idle,
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> EngineLifecycle {
        self.state
    }

    /// Attempt a transition given an event.
    pub fn handle_event(&mut self, event: LifecycleEvent) -> TransitionResult {
        use EngineLifecycle::*;
        use LifecycleEvent::*;

        let next = match (self.state, event) {
            (Idle, Start) => Running,
            // A stop before the first cycle still ends the engine.
            (Idle, StopRequested) => Stopped,
            (Running, StopRequested | HardwareFault) => Stopped,
            (Stopped, _) => return TransitionResult::Rejected("Stopped is terminal"),
            (Running, Start) => return TransitionResult::Rejected("already running"),
            (Idle, HardwareFault) => {
                return TransitionResult::Rejected("Idle: no board activity yet");
            }
        };

        self.state = next;
        TransitionResult::Ok(next)
    }

    /// True while the control loop may execute cycles.
    #[inline]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, EngineLifecycle::Running)
    }
}

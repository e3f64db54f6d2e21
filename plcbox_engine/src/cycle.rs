//! Fixed-period control loop: read → step → write.
//!
//! [`ControlLoop::run`] executes cycles on the calling thread until the
//! running flag is cleared or the board fails; [`ControlLoop::start`] moves
//! the loop onto a dedicated thread and returns an [`EngineHandle`].
//!
//! ## Pacing
//! Ticks are scheduled on absolute instants (`start + n * cycle_time`). An
//! overrunning cycle resynchronizes the schedule instead of bursting to
//! catch up.
//!
//! ## Shutdown
//! Runs exactly once per engine, whatever ended the loop: outputs are
//! cleared if the board is still present, then `Stopped` is emitted.

use crate::error::EngineError;
use crate::events::{EngineEvent, EventSink, TracingSink};
use crate::machine::{EngineLifecycle, LifecycleEvent, LifecycleMachine, TransitionResult};
use crate::snapshot::{SnapshotCell, StatusSnapshot};
use crate::state::{CycleOutput, EngineState};
use plcbox_common::board::{BoardDriver, BoardError, BoardInputs};
use plcbox_common::config::EngineSection;
use plcbox_common::consts::DEFAULT_CYCLE_TIME_MS;
use plcbox_common::rules::RuleSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Per-cycle timing statistics. O(1) per update.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration.
    pub last_cycle: Duration,
    /// Minimum cycle duration.
    pub min_cycle: Duration,
    /// Maximum cycle duration.
    pub max_cycle: Duration,
    /// Running sum for average computation.
    pub total_cycle: Duration,
    /// Cycles that took longer than the period.
    pub overruns: u64,
}

impl CycleStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle: Duration::ZERO,
            min_cycle: Duration::MAX,
            max_cycle: Duration::ZERO,
            total_cycle: Duration::ZERO,
            overruns: 0,
        }
    }

    /// Record a cycle duration. Returns true if it overran `budget`.
    #[inline]
    pub fn record(&mut self, duration: Duration, budget: Duration) -> bool {
        self.cycle_count += 1;
        self.last_cycle = duration;
        self.min_cycle = self.min_cycle.min(duration);
        self.max_cycle = self.max_cycle.max(duration);
        self.total_cycle = self.total_cycle.saturating_add(duration);
        let overrun = duration > budget;
        if overrun {
            self.overruns += 1;
        }
        overrun
    }

    /// Average cycle time (zero if no cycles).
    #[inline]
    pub fn avg_cycle(&self) -> Duration {
        match u32::try_from(self.cycle_count) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_cycle / n,
            Err(_) => Duration::from_secs_f64(
                self.total_cycle.as_secs_f64() / self.cycle_count as f64,
            ),
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Options ────────────────────────────────────────────────────────

/// Loop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Tick period.
    pub cycle_time: Duration,
    /// Publish a status snapshot every N cycles (0 = only on state changes).
    pub snapshot_every: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            cycle_time: Duration::from_millis(DEFAULT_CYCLE_TIME_MS),
            snapshot_every: 1,
        }
    }
}

impl From<&EngineSection> for EngineOptions {
    fn from(section: &EngineSection) -> Self {
        Self {
            cycle_time: section.cycle_time(),
            snapshot_every: section.snapshot_every,
        }
    }
}

// ─── Control Loop ───────────────────────────────────────────────────

/// One engine bound to one board.
pub struct ControlLoop<B: BoardDriver> {
    board: B,
    rules: RuleSet,
    options: EngineOptions,
    sink: Box<dyn EventSink>,
    running: Arc<AtomicBool>,
    machine: LifecycleMachine,
    stats: CycleStats,
    snapshot: SnapshotCell,
}

impl<B: BoardDriver> ControlLoop<B> {
    /// Create an Idle engine logging through [`TracingSink`].
    pub fn new(board: B, rules: RuleSet, options: EngineOptions) -> Self {
        Self {
            board,
            rules,
            options,
            sink: Box::new(TracingSink),
            running: Arc::new(AtomicBool::new(true)),
            machine: LifecycleMachine::new(),
            stats: CycleStats::new(),
            snapshot: SnapshotCell::new(),
        }
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Flag checked once per cycle; store `false` to stop the loop.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Slot the loop publishes status into.
    pub fn snapshot_cell(&self) -> SnapshotCell {
        self.snapshot.clone()
    }

    /// Lifecycle state.
    pub fn state(&self) -> EngineLifecycle {
        self.machine.state()
    }

    /// Timing statistics of the run so far.
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// The driven board.
    pub fn board(&self) -> &B {
        &self.board
    }

    /// Execute cycles until stopped or until the board fails.
    ///
    /// # Errors
    /// - `EngineError::AlreadyStarted` if this engine has run before
    /// - `EngineError::Board` if a read or write failed; shutdown cleanup
    ///   has already run when this is returned
    pub fn run(&mut self) -> Result<(), EngineError> {
        if let TransitionResult::Rejected(reason) = self.machine.handle_event(LifecycleEvent::Start)
        {
            warn!("Engine start rejected: {reason}");
            return Err(EngineError::AlreadyStarted(self.machine.state()));
        }

        let board_id = self.board.board_id();
        let cycle_time = self.options.cycle_time;
        self.snapshot.set_state(EngineLifecycle::Running);
        self.sink.emit(&EngineEvent::Started {
            board_id,
            rule_count: self.rules.len(),
        });
        info!(
            "Control loop running on board {} via '{}' (cycle_time={}ms)",
            board_id,
            self.board.name(),
            cycle_time.as_millis()
        );

        let mut state = EngineState::new();
        let mut next_tick = Instant::now();

        let outcome = loop {
            if !self.running.load(Ordering::SeqCst) {
                break Ok(());
            }

            let cycle_start = Instant::now();
            let (inputs, output) = match self.cycle(&mut state, cycle_start) {
                Ok(result) => result,
                Err(error) => {
                    self.sink.emit(&EngineEvent::BoardLost {
                        board_id,
                        error: error.clone(),
                    });
                    break Err(error);
                }
            };

            let elapsed = cycle_start.elapsed();
            if self.stats.record(elapsed, cycle_time) {
                let overruns = self.stats.overruns;
                if overruns <= 10 || overruns % 1000 == 0 {
                    warn!(
                        "Cycle overrun #{}: cycle took {}us (target {}us)",
                        overruns,
                        elapsed.as_micros(),
                        cycle_time.as_micros()
                    );
                }
            }

            let every = u64::from(self.options.snapshot_every);
            if every > 0 && self.stats.cycle_count % every == 0 {
                self.publish(&state, inputs, &output);
            }

            if self.stats.cycle_count % 1000 == 0 {
                debug!(
                    "Control loop: {} cycles, avg={}us, max={}us, overruns={}",
                    self.stats.cycle_count,
                    self.stats.avg_cycle().as_micros(),
                    self.stats.max_cycle.as_micros(),
                    self.stats.overruns
                );
            }

            next_tick += cycle_time;
            let now = Instant::now();
            if next_tick > now {
                thread::sleep(next_tick - now);
            } else {
                next_tick = now;
            }
        };

        let event = match outcome {
            Ok(()) => LifecycleEvent::StopRequested,
            Err(_) => LifecycleEvent::HardwareFault,
        };
        self.machine.handle_event(event);
        self.shutdown_cleanup(board_id);

        outcome.map_err(EngineError::from)
    }

    /// One cycle against the board. No write happens after a failed read.
    fn cycle(
        &mut self,
        state: &mut EngineState,
        now: Instant,
    ) -> Result<(BoardInputs, CycleOutput), BoardError> {
        let inputs = self.board.read_all()?;
        let output = state.step(&self.rules, &inputs, now, self.sink.as_ref());

        self.board.write_digital(output.command.digital)?;
        if output.analog_changed {
            self.board
                .write_analog(output.command.analog1, output.command.analog2)?;
        }
        Ok((inputs, output))
    }

    fn publish(&self, state: &EngineState, inputs: BoardInputs, output: &CycleOutput) {
        self.snapshot.publish(StatusSnapshot {
            state: self.machine.state(),
            cycle_count: self.stats.cycle_count,
            inputs,
            outputs: output.command,
            latched: state.latched(),
            active_blinkers: state.blinks().len(),
            pending_timers: state.delays().len(),
        });
    }

    fn shutdown_cleanup(&mut self, board_id: u8) {
        if self.board.is_present() {
            match self.board.clear_all() {
                Ok(()) => debug!("Outputs cleared on board {board_id}"),
                Err(e) => warn!("Failed to clear outputs on board {board_id}: {e}"),
            }
        } else {
            warn!("Board {board_id} not present, outputs left as they were");
        }

        self.snapshot.set_state(EngineLifecycle::Stopped);
        self.sink.emit(&EngineEvent::Stopped {
            board_id,
            cycles: self.stats.cycle_count,
        });
        info!(
            "Control loop stopped after {} cycles (avg={}us, max={}us, overruns={})",
            self.stats.cycle_count,
            self.stats.avg_cycle().as_micros(),
            self.stats.max_cycle.as_micros(),
            self.stats.overruns
        );
    }
}

impl<B: BoardDriver + 'static> ControlLoop<B> {
    /// Run the loop on a dedicated thread.
    pub fn start(self) -> Result<EngineHandle, EngineError> {
        let running = self.running_flag();
        let snapshot = self.snapshot_cell();
        let board_id = self.board.board_id();

        let mut engine = self;
        let thread = thread::Builder::new()
            .name(format!("plcbox-engine-{board_id}"))
            .spawn(move || engine.run())
            .map_err(EngineError::Spawn)?;

        Ok(EngineHandle {
            board_id,
            running,
            snapshot,
            thread,
        })
    }
}

// ─── Handle ─────────────────────────────────────────────────────────

/// Owner-side handle of an engine running on its own thread.
#[derive(Debug)]
pub struct EngineHandle {
    board_id: u8,
    running: Arc<AtomicBool>,
    snapshot: SnapshotCell,
    thread: JoinHandle<Result<(), EngineError>>,
}

impl EngineHandle {
    /// Board the engine drives.
    pub fn board_id(&self) -> u8 {
        self.board_id
    }

    /// Ask the loop to stop; it exits within one tick.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Flag shared with the loop, for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Latest published status.
    pub fn snapshot(&self) -> StatusSnapshot {
        self.snapshot.get()
    }

    /// True once the loop has returned.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the loop to return.
    pub fn join(self) -> Result<(), EngineError> {
        self.thread.join().map_err(|_| EngineError::Panicked)?
    }
}

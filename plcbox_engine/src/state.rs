//! Per-run engine state and the cycle computation.
//!
//! [`EngineState::step`] turns one input sample into one output command. It
//! never touches hardware, so every timing and ordering property of the
//! engine can be tested by feeding it inputs and instants directly.
//!
//! ## Cycle order
//! 1. Aggregate = inputs + last commanded output
//! 2. Digital accumulator seeded from the latch mask, analogs from last command
//! 3. Blink overlay
//! 4. Delayed action firings
//! 5. Enabled rules in store order: apply actions, then one-shots on a rising edge
//! 6. Edge memory replaced by this cycle's true set
//! 7. Result recorded as the last commanded output

use crate::actions;
use crate::blink::BlinkScheduler;
use crate::delay::DelayScheduler;
use crate::edge::EdgeTracker;
use crate::evaluate::{evaluate, AggregateState};
use crate::events::{EngineEvent, EventSink};
use plcbox_common::board::{BoardInputs, DigitalOutputs, OutputCommand};
use plcbox_common::rules::{Rule, RuleSet};
use std::time::Instant;

/// Result of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutput {
    /// Levels to command this cycle.
    pub command: OutputCommand,
    /// True if either analog level differs from the previous command.
    pub analog_changed: bool,
    /// Number of enabled rules that held.
    pub rules_true: usize,
    /// Number of timers that fired.
    pub timers_fired: usize,
}

/// Mutable state of one engine run. Never persisted; a run starts fresh.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    latched: DigitalOutputs,
    blinks: BlinkScheduler,
    delays: DelayScheduler,
    edges: EdgeTracker,
    last_commanded: OutputCommand,
}

impl EngineState {
    /// Fresh state: nothing latched, nothing pending, all outputs off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the output for one input sample at `now`.
    pub fn step(
        &mut self,
        rules: &RuleSet,
        inputs: &BoardInputs,
        now: Instant,
        sink: &dyn EventSink,
    ) -> CycleOutput {
        let aggregate = AggregateState::new(*inputs, self.last_commanded);

        let mut command = OutputCommand {
            digital: self.latched,
            ..self.last_commanded
        };
        command.digital = self.blinks.advance(now, command.digital);
        let timers_fired = self
            .delays
            .advance(now, &mut command, &mut self.latched, sink);

        let mut rules_true = 0;
        for rule in rules.enabled() {
            if !evaluate(rule, &aggregate) {
                continue;
            }
            rules_true += 1;
            actions::apply(&rule.actions, &mut command, &mut self.latched);
            if self.edges.observe_true(rule.id) {
                sink.emit(&EngineEvent::RuleTriggered {
                    name: rule.name.clone(),
                });
                self.fire_one_shots(rule, now, sink);
            }
        }
        self.edges.commit();

        let analog_changed = command.analog_differs(&self.last_commanded);
        self.last_commanded = command;

        CycleOutput {
            command,
            analog_changed,
            rules_true,
            timers_fired,
        }
    }

    fn fire_one_shots(&mut self, rule: &Rule, now: Instant, sink: &dyn EventSink) {
        for (port, interval, duration) in rule.blinks() {
            self.blinks.start(port, interval, duration, now);
            sink.emit(&EngineEvent::BlinkStarted {
                port,
                interval,
                duration,
            });
        }
        for delayed in &rule.delayed_actions {
            let scheduled = self
                .delays
                .schedule(delayed.delay, delayed.actions.clone(), now);
            if let Some(id) = scheduled {
                sink.emit(&EngineEvent::TimerStarted {
                    id,
                    delay: delayed.delay,
                });
            }
        }
    }

    /// Sticky latch mask.
    pub fn latched(&self) -> DigitalOutputs {
        self.latched
    }

    /// Output commanded by the last step.
    pub fn last_commanded(&self) -> OutputCommand {
        self.last_commanded
    }

    /// Active blinkers.
    pub fn blinks(&self) -> &BlinkScheduler {
        &self.blinks
    }

    /// Pending delayed actions.
    pub fn delays(&self) -> &DelayScheduler {
        &self.delays
    }

    /// Rising edge memory.
    pub fn edges(&self) -> &EdgeTracker {
        &self.edges
    }
}

//! Delayed action scheduling.
//!
//! Each scheduled action set gets a [`TimerId`] from a monotonically
//! increasing counter. Timers fire at most once, in id order, on the first
//! `advance` with `now >= fire_time`, and are removed as they fire.

use crate::actions;
use crate::events::{EngineEvent, EventSink};
use plcbox_common::board::{DigitalOutputs, OutputCommand};
use plcbox_common::rules::Action;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::warn;

/// Identifier of a scheduled delayed action set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// A scheduled action set.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTimer {
    /// When the actions fire.
    pub fire_time: Instant,
    /// Actions applied on firing.
    pub actions: Vec<Action>,
}

/// Owner of all pending timers of one engine run.
#[derive(Debug, Clone, Default)]
pub struct DelayScheduler {
    next_id: u64,
    pending: BTreeMap<TimerId, PendingTimer>,
}

impl DelayScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `actions` to fire `delay` after `now`.
    ///
    /// Returns `None` for a delay beyond the clock's range; nothing is
    /// stored and no id is consumed.
    pub fn schedule(
        &mut self,
        delay: Duration,
        actions: Vec<Action>,
        now: Instant,
    ) -> Option<TimerId> {
        let Some(fire_time) = now.checked_add(delay) else {
            warn!(
                "Delayed action dropped: delay of {:.0}s is out of range",
                delay.as_secs_f64()
            );
            return None;
        };

        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, PendingTimer { fire_time, actions });
        Some(id)
    }

    /// Fire every due timer into the accumulator. Returns how many fired.
    pub fn advance(
        &mut self,
        now: Instant,
        accumulator: &mut OutputCommand,
        latched: &mut DigitalOutputs,
        sink: &dyn EventSink,
    ) -> usize {
        let due: Vec<TimerId> = self
            .pending
            .iter()
            .filter(|(_, timer)| timer.fire_time <= now)
            .map(|(&id, _)| id)
            .collect();

        for id in &due {
            if let Some(timer) = self.pending.remove(id) {
                actions::apply(&timer.actions, accumulator, latched);
                sink.emit(&EngineEvent::TimerFired { id: *id });
            }
        }
        due.len()
    }

    /// A pending timer by id.
    pub fn get(&self, id: TimerId) -> Option<&PendingTimer> {
        self.pending.get(&id)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use plcbox_common::rules::DigitalMode;

    fn set(port: u8, on: bool) -> Action {
        Action::DigitalOut {
            port,
            mode: DigitalMode::SetState(on),
        }
    }

    #[test]
    fn fires_once_at_deadline() {
        let sink = RecordingSink::new();
        let t0 = Instant::now();
        let mut delays = DelayScheduler::new();
        let id = delays
            .schedule(Duration::from_secs(1), vec![set(5, true)], t0)
            .unwrap();

        let mut latched = DigitalOutputs::empty();
        let mut acc = OutputCommand::OFF;
        assert_eq!(
            delays.advance(t0 + Duration::from_millis(999), &mut acc, &mut latched, &sink),
            0
        );
        assert!(acc.digital.is_empty());

        assert_eq!(
            delays.advance(t0 + Duration::from_secs(1), &mut acc, &mut latched, &sink),
            1
        );
        assert_eq!(acc.digital, DigitalOutputs::OUT5);
        assert_eq!(sink.events(), vec![EngineEvent::TimerFired { id }]);

        let mut acc = OutputCommand::OFF;
        assert_eq!(
            delays.advance(t0 + Duration::from_secs(5), &mut acc, &mut latched, &sink),
            0
        );
        assert!(acc.digital.is_empty());
        assert!(delays.is_empty());
    }

    #[test]
    fn ids_increase_and_fire_in_order() {
        let sink = RecordingSink::new();
        let t0 = Instant::now();
        let mut delays = DelayScheduler::new();
        let a = delays
            .schedule(Duration::from_millis(200), vec![set(1, true)], t0)
            .unwrap();
        let b = delays
            .schedule(Duration::from_millis(100), vec![set(1, false)], t0)
            .unwrap();
        assert!(b > a);

        let mut latched = DigitalOutputs::empty();
        let mut acc = OutputCommand::OFF;
        delays.advance(t0 + Duration::from_secs(1), &mut acc, &mut latched, &sink);

        // Insertion order wins over deadline order: a (on) then b (off).
        assert!(acc.digital.is_empty());
        assert_eq!(
            sink.events(),
            vec![
                EngineEvent::TimerFired { id: a },
                EngineEvent::TimerFired { id: b },
            ]
        );
    }

    #[test]
    fn zero_delay_fires_on_same_instant() {
        let sink = RecordingSink::new();
        let t0 = Instant::now();
        let mut delays = DelayScheduler::new();
        delays.schedule(Duration::ZERO, vec![set(2, true)], t0);

        let mut latched = DigitalOutputs::empty();
        let mut acc = OutputCommand::OFF;
        assert_eq!(delays.advance(t0, &mut acc, &mut latched, &sink), 1);
    }

    #[test]
    fn out_of_range_delay_is_not_scheduled() {
        let t0 = Instant::now();
        let mut delays = DelayScheduler::new();
        assert_eq!(delays.schedule(Duration::MAX, vec![set(1, true)], t0), None);
        assert!(delays.is_empty());

        let next = delays.schedule(Duration::from_secs(1), vec![], t0);
        assert_eq!(next, Some(TimerId(0)));
        assert_eq!(delays.len(), 1);
    }
}

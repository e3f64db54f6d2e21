//! Integration test: editor rule documents driven through `EngineState`.
//!
//! Simulates a 50 ms control loop by stepping the state with synthetic
//! instants, so the timing assertions are exact.

use plcbox_common::board::{BoardInputs, DigitalInputs, DigitalOutputs};
use plcbox_common::rules::{parse_rules, RuleSet};
use plcbox_engine::{CycleOutput, EngineEvent, EngineState, RecordingSink};
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(50);

struct Bench {
    rules: RuleSet,
    state: EngineState,
    sink: RecordingSink,
    t0: Instant,
    cycle: u32,
}

impl Bench {
    fn new(json: &str) -> Self {
        Self {
            rules: parse_rules(json).unwrap(),
            state: EngineState::new(),
            sink: RecordingSink::new(),
            t0: Instant::now(),
            cycle: 0,
        }
    }

    /// Run one cycle; returns the output and the cycle's offset from t0.
    fn tick(&mut self, inputs: BoardInputs) -> (CycleOutput, Duration) {
        let offset = TICK * self.cycle;
        self.cycle += 1;
        let out = self
            .state
            .step(&self.rules, &inputs, self.t0 + offset, &self.sink);
        (out, offset)
    }
}

fn digital(bits: DigitalInputs) -> BoardInputs {
    BoardInputs {
        digital: bits,
        ..BoardInputs::default()
    }
}

#[test]
fn alarm_blinks_then_latches_after_delay() {
    let mut bench = Bench::new(
        r#"[{
            "name": "Alarm",
            "conditions": [{ "type": "analog_in", "port": 1, "operator": ">", "value": 200 }],
            "actions": [
                { "type": "digital_out", "action_type": "blink", "output": 8, "interval": 0.5, "duration": 2.0 }
            ],
            "delayed_actions": [{ "delay": 1.0, "actions": [
                { "type": "digital_out", "action_type": "latch_on", "output": 7 }
            ] }]
        }]"#,
    );
    let hot = BoardInputs {
        analog1: 230,
        ..BoardInputs::default()
    };

    // Cycle 0 starts the blinker; the overlay of cycle 1 switches it on.
    let (out, _) = bench.tick(hot);
    assert!(out.command.digital.is_empty());

    let mut blink_on = Vec::new();
    let mut latch_seen_at = None;
    for _ in 1..60 {
        let (out, offset) = bench.tick(hot);
        blink_on.push((offset, out.command.digital.is_on(8)));
        if latch_seen_at.is_none() && out.command.digital.is_on(7) {
            latch_seen_at = Some(offset);
        }
    }

    // On for 500 ms starting at 50 ms, off for 500 ms, and so on.
    let phase = |ms: u64| {
        blink_on
            .iter()
            .find(|(o, _)| *o == Duration::from_millis(ms))
            .map(|(_, on)| *on)
    };
    assert_eq!(phase(50), Some(true));
    assert_eq!(phase(500), Some(true));
    assert_eq!(phase(550), Some(false));
    assert_eq!(phase(1000), Some(false));
    assert_eq!(phase(1050), Some(true));
    assert_eq!(phase(2000), Some(false));
    assert!(blink_on
        .iter()
        .filter(|(o, _)| *o >= Duration::from_secs(2))
        .all(|(_, on)| !on));

    // The latch is set by the timer at 1.0 s and shows from the next cycle.
    assert_eq!(latch_seen_at, Some(Duration::from_millis(1050)));
    assert_eq!(bench.state.latched(), DigitalOutputs::OUT7);

    // Sustained condition: one trigger, one blink, one timer.
    assert_eq!(bench.sink.triggered(), vec!["Alarm".to_string()]);
    assert_eq!(
        bench
            .sink
            .count(|e| matches!(e, EngineEvent::TimerFired { .. })),
        1
    );
}

#[test]
fn reset_rule_clears_latched_output() {
    let mut bench = Bench::new(
        r#"[
            {
                "name": "Start",
                "conditions": [{ "type": "digital_in", "port": 1, "state": 1 }],
                "actions": [{ "type": "digital_out", "action_type": "latch_on", "output": 1 }]
            },
            {
                "name": "Stop",
                "conditions": [{ "type": "digital_in", "port": 2, "state": 1 }],
                "actions": [{ "type": "digital_out", "action_type": "set_state", "output": 1, "state": 0 }]
            },
            {
                "name": "Running lamp",
                "conditions": [{ "type": "digital_out", "port": 1, "state": 1 }],
                "actions": [{ "type": "digital_out", "output": 5, "state": 1 }]
            }
        ]"#,
    );

    bench.tick(digital(DigitalInputs::IN1));
    let (out, _) = bench.tick(digital(DigitalInputs::empty()));
    assert_eq!(out.command.digital, DigitalOutputs::OUT1);
    let (out, _) = bench.tick(digital(DigitalInputs::empty()));
    assert_eq!(out.command.digital, DigitalOutputs::OUT1 | DigitalOutputs::OUT5);

    // Press stop: latch and transient bit cleared in the same cycle.
    let (out, _) = bench.tick(digital(DigitalInputs::IN2));
    assert!(!out.command.digital.is_on(1));
    assert!(bench.state.latched().is_empty());

    let (out, _) = bench.tick(digital(DigitalInputs::empty()));
    assert!(out.command.digital.is_empty());
}

#[test]
fn or_rule_with_analog_window() {
    let mut bench = Bench::new(
        r#"[{
            "name": "Out of band",
            "conditions_logic": "OR",
            "conditions": [
                { "type": "analog_in", "port": 2, "operator": "<", "value": 20 },
                { "type": "analog_in", "port": 2, "operator": ">", "value": 220 }
            ],
            "actions": [
                { "type": "digital_out", "output": 3, "state": 1 },
                { "type": "analog_out", "output": 2, "value": 255 }
            ]
        }]"#,
    );
    let at = |level: u8| BoardInputs {
        analog2: level,
        ..BoardInputs::default()
    };

    let (out, _) = bench.tick(at(100));
    assert!(out.command.digital.is_empty());
    assert!(!out.analog_changed);

    let (out, _) = bench.tick(at(10));
    assert!(out.command.digital.is_on(3));
    assert!(out.analog_changed);
    assert_eq!(out.command.analog2, 255);

    let (out, _) = bench.tick(at(240));
    assert!(out.command.digital.is_on(3));
    assert!(!out.analog_changed);

    assert_eq!(bench.sink.triggered().len(), 1);
}

#[test]
fn disabled_rule_is_inert() {
    let mut bench = Bench::new(
        r#"[{
            "name": "Off",
            "enabled": false,
            "conditions": [{ "type": "digital_in", "port": 1, "state": 1 }],
            "actions": [{ "type": "digital_out", "output": 1, "state": 1 }],
            "delayed_actions": [{ "delay": 0.0, "actions": [
                { "type": "digital_out", "output": 2, "state": 1 }
            ] }]
        }]"#,
    );
    for _ in 0..5 {
        let (out, _) = bench.tick(digital(DigitalInputs::IN1));
        assert!(out.command.digital.is_empty());
    }
    assert!(bench.sink.events().is_empty());
}

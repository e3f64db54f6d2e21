//! Integration test: threaded control loop against a simulated board.

use super::wait_until;
use plcbox_common::board::{BoardDriver, DigitalOutputs, OutputCommand};
use plcbox_common::rules::{parse_rules, RuleSet};
use plcbox_engine::{
    ControlLoop, EngineError, EngineEvent, EngineLifecycle, EngineOptions, RecordingSink,
};
use plcbox_hal::drivers::simulation::BoardWrite;
use plcbox_hal::{SharedBoard, SimulatedBoard};
use std::sync::atomic::Ordering;
use std::time::Duration;

// ── Helpers ─────────────────────────────────────────────────────────

const WAIT: Duration = Duration::from_secs(2);

fn fast() -> EngineOptions {
    EngineOptions {
        cycle_time: Duration::from_millis(2),
        snapshot_every: 1,
    }
}

fn r1() -> RuleSet {
    parse_rules(
        r#"[{
            "name": "R1",
            "conditions": [{ "type": "digital_in", "port": 1, "state": 1, "operator": "==" }],
            "actions": [{ "type": "digital_out", "action_type": "set_state", "output": 2, "state": 1 }]
        }]"#,
    )
    .unwrap()
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn level_triggered_rule_end_to_end() {
    let board = SimulatedBoard::new(0);
    let sim = board.handle();
    let sink = RecordingSink::new();
    let engine = ControlLoop::new(board, r1(), fast())
        .with_sink(sink.clone())
        .start()
        .unwrap();

    assert!(wait_until(WAIT, || engine.snapshot().cycle_count >= 2));
    assert!(sim.outputs().digital.is_empty());

    sim.set_digital_input(1, true);
    assert!(wait_until(WAIT, || sim.outputs().digital == DigitalOutputs::OUT2));

    sim.set_digital_input(1, false);
    assert!(wait_until(WAIT, || sim.outputs().digital.is_empty()));

    engine.stop();
    engine.join().unwrap();

    assert_eq!(sim.writes().last(), Some(&BoardWrite::ClearAll));
    assert_eq!(sim.outputs(), OutputCommand::OFF);
    assert_eq!(sink.triggered(), vec!["R1".to_string()]);

    let events = sink.events();
    assert!(matches!(events.first(), Some(EngineEvent::Started { rule_count: 1, .. })));
    assert!(matches!(events.last(), Some(EngineEvent::Stopped { .. })));
}

#[test]
fn snapshot_tracks_lifecycle() {
    let board = SimulatedBoard::new(1);
    let sim = board.handle();
    sim.set_analog_input(2, 99);
    let engine = ControlLoop::new(board, RuleSet::default(), fast())
        .with_sink(RecordingSink::new())
        .start()
        .unwrap();

    assert!(wait_until(WAIT, || engine.snapshot().cycle_count >= 3));
    let snap = engine.snapshot();
    assert_eq!(snap.state, EngineLifecycle::Running);
    assert_eq!(snap.inputs.analog2, 99);
    assert_eq!(engine.board_id(), 1);

    let flag = engine.running_flag();
    flag.store(false, Ordering::SeqCst);
    assert!(wait_until(WAIT, || engine.is_finished()));
    let final_snapshot = engine.snapshot();
    engine.join().unwrap();
    assert_eq!(final_snapshot.state, EngineLifecycle::Stopped);
}

#[test]
fn stop_before_first_cycle_still_cleans_up() {
    let board = SimulatedBoard::new(0);
    let sim = board.handle();
    let sink = RecordingSink::new();
    let mut engine = ControlLoop::new(board, r1(), fast()).with_sink(sink.clone());
    engine.running_flag().store(false, Ordering::SeqCst);

    engine.run().unwrap();

    assert_eq!(engine.state(), EngineLifecycle::Stopped);
    assert_eq!(sim.read_count(), 0);
    assert_eq!(sim.clear_attempts(), 1);
    assert_eq!(
        sink.count(|e| matches!(e, EngineEvent::Stopped { cycles: 0, .. })),
        1
    );
}

#[test]
fn engine_runs_only_once() {
    let board = SimulatedBoard::new(0);
    let sim = board.handle();
    let mut engine =
        ControlLoop::new(board, RuleSet::default(), fast()).with_sink(RecordingSink::new());
    engine.running_flag().store(false, Ordering::SeqCst);

    engine.run().unwrap();
    let err = engine.run().unwrap_err();
    assert!(matches!(err, EngineError::AlreadyStarted(EngineLifecycle::Stopped)));
    assert_eq!(sim.clear_attempts(), 1);
}

#[test]
fn analog_written_only_on_change() {
    let rules = parse_rules(
        r#"[{
            "name": "Dim",
            "conditions": [{ "type": "digital_in", "port": 2, "state": 1 }],
            "actions": [{ "type": "analog_out", "output": 1, "value": 180 }]
        }]"#,
    )
    .unwrap();
    let board = SimulatedBoard::new(0);
    let sim = board.handle();
    sim.set_digital_input(2, true);
    let engine = ControlLoop::new(board, rules, fast())
        .with_sink(RecordingSink::new())
        .start()
        .unwrap();

    assert!(wait_until(WAIT, || engine.snapshot().cycle_count >= 10));
    engine.stop();
    engine.join().unwrap();

    let analog: Vec<_> = sim
        .writes()
        .into_iter()
        .filter(|w| matches!(w, BoardWrite::Analog(..)))
        .collect();
    assert_eq!(analog, vec![BoardWrite::Analog(180, 0)]);
    let digital_writes = sim
        .writes()
        .iter()
        .filter(|w| matches!(w, BoardWrite::Digital(_)))
        .count();
    assert!(digital_writes >= 10, "digital is written every cycle");
}

#[test]
fn shared_board_poller_alongside_engine() {
    let board = SimulatedBoard::new(0);
    let sim = board.handle();
    let shared = SharedBoard::new(Box::new(board));
    let mut poller = shared.clone();

    let engine = ControlLoop::new(shared, r1(), fast())
        .with_sink(RecordingSink::new())
        .start()
        .unwrap();

    sim.set_digital_input(1, true);
    for _ in 0..50 {
        let inputs = poller.read_all().unwrap();
        assert!(inputs.digital.is_on(1));
    }
    assert!(wait_until(WAIT, || engine.snapshot().outputs.digital.is_on(2)));

    engine.stop();
    engine.join().unwrap();
    assert_eq!(sim.outputs(), OutputCommand::OFF);
}

//! Integration test: board failures end the run exactly once.
//!
//! Validates the fault path:
//! 1. Read or write failure → critical event → Stopped
//! 2. Outputs cleared once if the board is still present
//! 3. No clear attempt on an unplugged board

use super::wait_until;
use plcbox_common::board::BoardError;
use plcbox_common::rules::RuleSet;
use plcbox_engine::{
    ControlLoop, EngineError, EngineEvent, EngineLifecycle, EngineOptions, RecordingSink,
};
use plcbox_hal::SimulatedBoard;
use plcbox_hal::drivers::simulation::BoardWrite;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

fn options() -> EngineOptions {
    EngineOptions {
        cycle_time: Duration::from_millis(2),
        snapshot_every: 1,
    }
}

fn critical_count(sink: &RecordingSink) -> usize {
    sink.count(EngineEvent::is_critical)
}

fn stopped_count(sink: &RecordingSink) -> usize {
    sink.count(|e| matches!(e, EngineEvent::Stopped { .. }))
}

#[test]
fn read_failure_mid_run() {
    let board = SimulatedBoard::new(0);
    let sim = board.handle();
    let sink = RecordingSink::new();
    let engine = ControlLoop::new(board, RuleSet::default(), options())
        .with_sink(sink.clone())
        .start()
        .unwrap();

    assert!(wait_until(WAIT, || engine.snapshot().cycle_count >= 3));
    sim.fail_reads(true);
    assert!(wait_until(WAIT, || engine.is_finished()));

    let result = engine.join();
    assert!(matches!(
        result,
        Err(EngineError::Board(BoardError::ReadFailed(_)))
    ));
    assert_eq!(stopped_count(&sink), 1);
    assert_eq!(critical_count(&sink), 1);
    assert_eq!(sim.clear_attempts(), 1);

    // Nothing but the cleanup clear follows the failed read.
    let writes = sim.writes();
    assert_eq!(writes.last(), Some(&BoardWrite::ClearAll));
    assert_eq!(
        writes.iter().filter(|w| **w == BoardWrite::ClearAll).count(),
        1
    );
    let lost_at = sink.events().iter().position(EngineEvent::is_critical);
    let stopped_at = sink
        .events()
        .iter()
        .position(|e| matches!(e, EngineEvent::Stopped { .. }));
    assert!(lost_at < stopped_at);
}

#[test]
fn unplugged_board_is_not_cleared() {
    let board = SimulatedBoard::new(2);
    let sim = board.handle();
    let sink = RecordingSink::new();
    let engine = ControlLoop::new(board, RuleSet::default(), options())
        .with_sink(sink.clone())
        .start()
        .unwrap();

    assert!(wait_until(WAIT, || engine.snapshot().cycle_count >= 1));
    sim.set_present(false);

    let result = engine.join();
    assert!(matches!(
        result,
        Err(EngineError::Board(BoardError::Disconnected(2)))
    ));
    assert_eq!(sim.clear_attempts(), 0);
    assert_eq!(critical_count(&sink), 1);
    assert_eq!(stopped_count(&sink), 1);

    let lost = sink
        .events()
        .into_iter()
        .find(|e| e.is_critical());
    assert_eq!(
        lost,
        Some(EngineEvent::BoardLost {
            board_id: 2,
            error: BoardError::Disconnected(2),
        })
    );
}

#[test]
fn write_failure_is_a_hardware_fault() {
    let board = SimulatedBoard::new(0);
    let sim = board.handle();
    sim.fail_writes(true);
    let sink = RecordingSink::new();
    let mut engine =
        ControlLoop::new(board, RuleSet::default(), options()).with_sink(sink.clone());

    let result = engine.run();
    assert!(matches!(
        result,
        Err(EngineError::Board(BoardError::WriteFailed(_)))
    ));
    assert_eq!(engine.state(), EngineLifecycle::Stopped);
    assert_eq!(engine.stats().cycle_count, 0);
    // Board still present: one clear attempt, which fails too.
    assert_eq!(sim.clear_attempts(), 1);
    assert!(sim.writes().is_empty());
    assert_eq!(critical_count(&sink), 1);
}

//! Property tests for the evaluator, applier and timing primitives.

use plcbox_common::board::{BoardInputs, DigitalInputs, DigitalOutputs, OutputCommand};
use plcbox_common::rules::{
    Action, Comparison, Condition, ConditionLogic, DelayedAction, DigitalMode, Rule, RuleId,
    RuleSet,
};
use plcbox_engine::actions::apply;
use plcbox_engine::blink::BlinkScheduler;
use plcbox_engine::evaluate::{evaluate, AggregateState};
use plcbox_engine::{EngineEvent, EngineState, RecordingSink};
use proptest::prelude::*;
use std::time::{Duration, Instant};

// ── Strategies ──────────────────────────────────────────────────────

fn arb_condition() -> impl Strategy<Value = Condition> {
    prop_oneof![
        (1u8..=5, any::<bool>()).prop_map(|(port, expected)| Condition::DigitalIn { port, expected }),
        (1u8..=2, 0usize..3, -10i64..=300).prop_map(|(port, op, threshold)| {
            let op = [Comparison::Greater, Comparison::Less, Comparison::Equal][op];
            Condition::AnalogIn { port, op, threshold }
        }),
        (1u8..=8, any::<bool>()).prop_map(|(port, expected)| Condition::DigitalOut { port, expected }),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (1u8..=8, any::<bool>()).prop_map(|(port, on)| Action::DigitalOut {
            port,
            mode: DigitalMode::SetState(on)
        }),
        (1u8..=8).prop_map(|port| Action::DigitalOut {
            port,
            mode: DigitalMode::LatchOn
        }),
        (1u8..=2, any::<u8>()).prop_map(|(port, value)| Action::AnalogOut { port, value }),
    ]
}

fn arb_aggregate() -> impl Strategy<Value = AggregateState> {
    (0u8..32, any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(di, a1, a2, out)| {
        AggregateState::new(
            BoardInputs::from_raw(di, a1, a2, 0, 0),
            OutputCommand {
                digital: DigitalOutputs::from_bits_retain(out),
                ..OutputCommand::OFF
            },
        )
    })
}

fn rule(logic: ConditionLogic, conditions: Vec<Condition>) -> Rule {
    Rule {
        id: RuleId(0),
        name: "P".to_string(),
        enabled: true,
        logic,
        conditions,
        actions: Vec::new(),
        delayed_actions: Vec::new(),
    }
}

// ── Properties ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn empty_rule_never_holds(state in arb_aggregate()) {
        prop_assert!(!evaluate(&rule(ConditionLogic::And, vec![]), &state));
        prop_assert!(!evaluate(&rule(ConditionLogic::Or, vec![]), &state));
    }

    #[test]
    fn and_implies_or(
        conditions in proptest::collection::vec(arb_condition(), 1..6),
        state in arb_aggregate(),
    ) {
        let all = evaluate(&rule(ConditionLogic::And, conditions.clone()), &state);
        let any = evaluate(&rule(ConditionLogic::Or, conditions), &state);
        prop_assert!(!all || any);
    }

    #[test]
    fn set_off_always_clears_both_masks(
        actions in proptest::collection::vec(arb_action(), 0..10),
        port in 1u8..=8,
        acc_bits in any::<u8>(),
        latch_bits in any::<u8>(),
    ) {
        let mut acc = OutputCommand { digital: DigitalOutputs::from_bits_retain(acc_bits), ..OutputCommand::OFF };
        let mut latched = DigitalOutputs::from_bits_retain(latch_bits);
        let mut actions = actions;
        actions.push(Action::DigitalOut { port, mode: DigitalMode::SetState(false) });

        apply(&actions, &mut acc, &mut latched);
        prop_assert!(!acc.digital.is_on(port));
        prop_assert!(!latched.is_on(port));
    }

    #[test]
    fn blink_overlay_only_adds_bits(
        base in any::<u8>(),
        port in 1u8..=8,
        interval_ms in 1u64..500,
        duration_ms in 1u64..3000,
        ticks in proptest::collection::vec(0u64..4000, 1..40),
    ) {
        let t0 = Instant::now();
        let mut blinks = BlinkScheduler::new();
        blinks.start(port, Duration::from_millis(interval_ms), Duration::from_millis(duration_ms), t0);

        let mut ticks = ticks;
        ticks.sort_unstable();
        let digital = DigitalOutputs::from_bits_retain(base);
        for at in ticks {
            let now = t0 + Duration::from_millis(at);
            let out = blinks.advance(now, digital);
            prop_assert!(out.contains(digital));
            prop_assert!((out - digital).bits() & !DigitalOutputs::port(port).bits() == 0);
            if at >= duration_ms {
                prop_assert_eq!(out, digital);
            }
        }
    }

    #[test]
    fn rule_triggers_once_per_rising_edge(levels in proptest::collection::vec(any::<bool>(), 1..60)) {
        let mut r = rule(ConditionLogic::And, vec![Condition::DigitalIn { port: 1, expected: true }]);
        r.delayed_actions = vec![DelayedAction { delay: Duration::from_secs(3600), actions: vec![] }];
        let rules = RuleSet::new(vec![r]);
        let sink = RecordingSink::new();
        let mut state = EngineState::new();
        let t0 = Instant::now();

        let mut expected = 0;
        let mut previous = false;
        for (i, &level) in levels.iter().enumerate() {
            if level && !previous {
                expected += 1;
            }
            previous = level;
            let digital = if level { DigitalInputs::IN1 } else { DigitalInputs::empty() };
            let inputs = BoardInputs { digital, ..BoardInputs::default() };
            state.step(&rules, &inputs, t0 + Duration::from_millis(50 * i as u64), &sink);
        }

        prop_assert_eq!(sink.triggered().len(), expected);
        prop_assert_eq!(sink.count(|e| matches!(e, EngineEvent::TimerStarted { .. })), expected);
        prop_assert_eq!(state.delays().len(), expected);
    }
}

//! Condition evaluation.
//!
//! Pure functions of a rule and the aggregate state the loop assembled at
//! the start of the cycle.

use plcbox_common::board::{BoardInputs, OutputCommand};
use plcbox_common::rules::{Condition, ConditionLogic, Rule};

/// Everything a condition may look at: the physical inputs sampled this
/// cycle and the outputs commanded last cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateState {
    /// Inputs read this cycle.
    pub inputs: BoardInputs,
    /// Outputs commanded on the previous cycle.
    pub commanded: OutputCommand,
}

impl AggregateState {
    /// Combine fresh inputs with the last commanded output.
    pub const fn new(inputs: BoardInputs, commanded: OutputCommand) -> Self {
        Self { inputs, commanded }
    }
}

/// Evaluate a single condition.
#[inline]
pub fn condition_holds(condition: &Condition, state: &AggregateState) -> bool {
    match *condition {
        Condition::DigitalIn { port, expected } => state.inputs.digital.is_on(port) == expected,
        Condition::AnalogIn {
            port,
            op,
            threshold,
        } => op.holds(i64::from(state.inputs.analog(port)), threshold),
        Condition::DigitalOut { port, expected } => {
            state.commanded.digital.is_on(port) == expected
        }
    }
}

/// Evaluate a rule's conditions under its logic. An empty list is false.
pub fn evaluate(rule: &Rule, state: &AggregateState) -> bool {
    if rule.conditions.is_empty() {
        return false;
    }
    let mut conditions = rule.conditions.iter();
    match rule.logic {
        ConditionLogic::And => conditions.all(|c| condition_holds(c, state)),
        ConditionLogic::Or => conditions.any(|c| condition_holds(c, state)),
    }
}

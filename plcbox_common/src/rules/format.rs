//! JSON interchange records for rule files.
//!
//! The rule editor writes loosely typed records: a `type` tag plus optional
//! fields whose meaning depends on the tag. These structs mirror that shape
//! one-to-one for `serde`; [`RuleRecord::into_rule`] validates a record into
//! the closed [`Rule`] model and `From<&Rule>` writes it back.
//!
//! # Example
//!
//! ```json
//! [
//!   {
//!     "name": "Door alarm",
//!     "enabled": true,
//!     "conditions_logic": "AND",
//!     "conditions": [{ "type": "digital_in", "port": 1, "state": 1, "operator": "==" }],
//!     "actions": [{ "type": "digital_out", "action_type": "blink", "output": 8,
//!                   "interval": 0.5, "duration": 10.0 }],
//!     "delayed_actions": [{ "delay": 5.0, "actions": [
//!         { "type": "digital_out", "action_type": "latch_on", "output": 1 }] }]
//!   }
//! ]
//! ```

use super::model::{
    Action, Comparison, Condition, ConditionLogic, DelayedAction, DigitalMode, Rule, RuleId,
};
use crate::consts::{ANALOG_CHANNEL_COUNT, ANALOG_MAX, DIGITAL_INPUT_COUNT, DIGITAL_OUTPUT_COUNT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TYPE_DIGITAL_IN: &str = "digital_in";
const TYPE_ANALOG_IN: &str = "analog_in";
const TYPE_DIGITAL_OUT: &str = "digital_out";
const TYPE_ANALOG_OUT: &str = "analog_out";

const MODE_SET_STATE: &str = "set_state";
const MODE_LATCH_ON: &str = "latch_on";
const MODE_BLINK: &str = "blink";

fn default_true() -> bool {
    true
}

fn default_name() -> String {
    "Unnamed".to_string()
}

fn default_logic() -> String {
    ConditionLogic::And.as_str().to_string()
}

/// One rule as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// Display name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Missing means enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// `"AND"` or `"OR"`, case-insensitive; missing means `"AND"`.
    #[serde(default = "default_logic")]
    pub conditions_logic: String,
    /// Conditions.
    #[serde(default)]
    pub conditions: Vec<ConditionRecord>,
    /// Immediate actions.
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
    /// Delayed actions.
    #[serde(default)]
    pub delayed_actions: Vec<DelayedActionRecord>,
}

/// Condition record (`digital_in`, `analog_in`, `digital_out`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRecord {
    /// Variant tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// 1-indexed port.
    pub port: i64,
    /// Expected digital state (0 or 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<i64>,
    /// Analog operator (`>`, `<`, `==`); digital records carry `==`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Analog threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

/// Action record (`digital_out` with a mode, or `analog_out`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Variant tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Digital mode (`set_state`, `latch_on`, `blink`); missing means `set_state`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    /// 1-indexed output port.
    pub output: i64,
    /// Target state for `set_state` (0 or 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<i64>,
    /// Blink toggle interval in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
    /// Blink duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Analog level (0..=255).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

/// Delayed action record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayedActionRecord {
    /// Delay in seconds.
    #[serde(default)]
    pub delay: f64,
    /// Actions fired when the delay expires.
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
}

impl RuleRecord {
    /// Validate this record into a [`Rule`] with the given id.
    ///
    /// # Errors
    /// Returns a human-readable reason naming the offending field.
    pub fn into_rule(self, id: RuleId) -> Result<Rule, String> {
        let logic = parse_logic(&self.conditions_logic)?;

        let conditions = self
            .conditions
            .iter()
            .enumerate()
            .map(|(i, c)| c.to_condition().map_err(|e| format!("condition {}: {e}", i + 1)))
            .collect::<Result<Vec<_>, _>>()?;

        let actions = self
            .actions
            .iter()
            .enumerate()
            .map(|(i, a)| a.to_action().map_err(|e| format!("action {}: {e}", i + 1)))
            .collect::<Result<Vec<_>, _>>()?;

        let delayed_actions = self
            .delayed_actions
            .iter()
            .enumerate()
            .map(|(i, d)| {
                d.to_delayed_action()
                    .map_err(|e| format!("delayed action {}: {e}", i + 1))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Rule {
            id,
            name: self.name,
            enabled: self.enabled,
            logic,
            conditions,
            actions,
            delayed_actions,
        })
    }
}

impl ConditionRecord {
    fn to_condition(&self) -> Result<Condition, String> {
        match self.kind.as_str() {
            TYPE_DIGITAL_IN => Ok(Condition::DigitalIn {
                port: check_port(self.port, DIGITAL_INPUT_COUNT, "digital input")?,
                expected: check_state(self.state)?,
            }),
            TYPE_ANALOG_IN => Ok(Condition::AnalogIn {
                port: check_port(self.port, ANALOG_CHANNEL_COUNT, "analog input")?,
                op: parse_operator(self.operator.as_deref())?,
                threshold: self.value.ok_or("analog condition needs a 'value'")?,
            }),
            TYPE_DIGITAL_OUT => Ok(Condition::DigitalOut {
                port: check_port(self.port, DIGITAL_OUTPUT_COUNT, "digital output")?,
                expected: check_state(self.state)?,
            }),
            other => Err(format!("unsupported condition type '{other}'")),
        }
    }
}

impl ActionRecord {
    fn to_action(&self) -> Result<Action, String> {
        match self.kind.as_str() {
            TYPE_DIGITAL_OUT => {
                let port = check_port(self.output, DIGITAL_OUTPUT_COUNT, "digital output")?;
                let mode = match self.action_type.as_deref().unwrap_or(MODE_SET_STATE) {
                    MODE_SET_STATE => DigitalMode::SetState(check_state(self.state)?),
                    MODE_LATCH_ON => DigitalMode::LatchOn,
                    MODE_BLINK => DigitalMode::Blink {
                        interval: check_positive_secs(self.interval, "interval")?,
                        duration: check_positive_secs(self.duration, "duration")?,
                    },
                    other => return Err(format!("unknown action_type '{other}'")),
                };
                Ok(Action::DigitalOut { port, mode })
            }
            TYPE_ANALOG_OUT => {
                let port = check_port(self.output, ANALOG_CHANNEL_COUNT, "analog output")?;
                let raw = self.value.ok_or("analog action needs a 'value'")?;
                let value = u8::try_from(raw)
                    .map_err(|_| format!("analog value {raw} outside 0..={ANALOG_MAX}"))?;
                Ok(Action::AnalogOut { port, value })
            }
            other => Err(format!("unsupported action type '{other}'")),
        }
    }
}

impl DelayedActionRecord {
    fn to_delayed_action(&self) -> Result<DelayedAction, String> {
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(format!("delay must be a non-negative number, got {}", self.delay));
        }
        let delay = Duration::try_from_secs_f64(self.delay).map_err(|e| e.to_string())?;
        let actions = self
            .actions
            .iter()
            .map(ActionRecord::to_action)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DelayedAction { delay, actions })
    }
}

fn parse_logic(raw: &str) -> Result<ConditionLogic, String> {
    if raw.eq_ignore_ascii_case("AND") {
        Ok(ConditionLogic::And)
    } else if raw.eq_ignore_ascii_case("OR") {
        Ok(ConditionLogic::Or)
    } else {
        Err(format!("conditions_logic must be AND or OR, got '{raw}'"))
    }
}

fn parse_operator(raw: Option<&str>) -> Result<Comparison, String> {
    match raw {
        Some(">") => Ok(Comparison::Greater),
        Some("<") => Ok(Comparison::Less),
        Some("==") => Ok(Comparison::Equal),
        Some(other) => Err(format!("unknown operator '{other}'")),
        None => Err("analog condition needs an 'operator'".to_string()),
    }
}

fn check_port(port: i64, count: u8, what: &str) -> Result<u8, String> {
    match u8::try_from(port) {
        Ok(p) if (1..=count).contains(&p) => Ok(p),
        _ => Err(format!("{what} port {port} outside 1..={count}")),
    }
}

fn check_state(state: Option<i64>) -> Result<bool, String> {
    match state {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        Some(other) => Err(format!("state must be 0 or 1, got {other}")),
        None => Err("missing 'state'".to_string()),
    }
}

fn check_positive_secs(secs: Option<f64>, field: &str) -> Result<Duration, String> {
    let secs = secs.ok_or_else(|| format!("blink needs '{field}'"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("{field} must be greater than 0, got {secs}"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{field}: {e}"))
}

// ─── Model → record ─────────────────────────────────────────────────

impl From<&Rule> for RuleRecord {
    fn from(rule: &Rule) -> Self {
        Self {
            name: rule.name.clone(),
            enabled: rule.enabled,
            conditions_logic: rule.logic.as_str().to_string(),
            conditions: rule.conditions.iter().map(ConditionRecord::from).collect(),
            actions: rule.actions.iter().map(ActionRecord::from).collect(),
            delayed_actions: rule
                .delayed_actions
                .iter()
                .map(DelayedActionRecord::from)
                .collect(),
        }
    }
}

impl From<&Condition> for ConditionRecord {
    fn from(condition: &Condition) -> Self {
        match *condition {
            Condition::DigitalIn { port, expected } => Self {
                kind: TYPE_DIGITAL_IN.to_string(),
                port: port.into(),
                state: Some(expected.into()),
                operator: Some(Comparison::Equal.symbol().to_string()),
                value: None,
            },
            Condition::AnalogIn {
                port,
                op,
                threshold,
            } => Self {
                kind: TYPE_ANALOG_IN.to_string(),
                port: port.into(),
                state: None,
                operator: Some(op.symbol().to_string()),
                value: Some(threshold),
            },
            Condition::DigitalOut { port, expected } => Self {
                kind: TYPE_DIGITAL_OUT.to_string(),
                port: port.into(),
                state: Some(expected.into()),
                operator: Some(Comparison::Equal.symbol().to_string()),
                value: None,
            },
        }
    }
}

impl From<&Action> for ActionRecord {
    fn from(action: &Action) -> Self {
        let empty = |kind: &str, output: u8| Self {
            kind: kind.to_string(),
            action_type: None,
            output: output.into(),
            state: None,
            interval: None,
            duration: None,
            value: None,
        };

        match *action {
            Action::DigitalOut { port, mode } => {
                let mut record = empty(TYPE_DIGITAL_OUT, port);
                match mode {
                    DigitalMode::SetState(on) => {
                        record.action_type = Some(MODE_SET_STATE.to_string());
                        record.state = Some(on.into());
                    }
                    DigitalMode::LatchOn => {
                        record.action_type = Some(MODE_LATCH_ON.to_string());
                    }
                    DigitalMode::Blink { interval, duration } => {
                        record.action_type = Some(MODE_BLINK.to_string());
                        record.interval = Some(interval.as_secs_f64());
                        record.duration = Some(duration.as_secs_f64());
                    }
                }
                record
            }
            Action::AnalogOut { port, value } => {
                let mut record = empty(TYPE_ANALOG_OUT, port);
                record.value = Some(value.into());
                record
            }
        }
    }
}

impl From<&DelayedAction> for DelayedActionRecord {
    fn from(delayed: &DelayedAction) -> Self {
        Self {
            delay: delayed.delay.as_secs_f64(),
            actions: delayed.actions.iter().map(ActionRecord::from).collect(),
        }
    }
}

//! Validated rule model.
//!
//! Rules reach the engine only in this form: closed enums with checked
//! ports and values, so the control loop never inspects optional or
//! untyped fields. Conversion from the loose interchange records lives in
//! [`super::format`].

use std::time::Duration;

/// Stable identifier of a rule within one loaded rule set.
///
/// Assigned sequentially at load time; used for edge tracking only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(pub usize);

/// How a rule combines its conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionLogic {
    /// All conditions must hold.
    #[default]
    And,
    /// At least one condition must hold.
    Or,
}

impl ConditionLogic {
    /// Interchange spelling (`"AND"` / `"OR"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Comparison operator of an analog condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `value > threshold`
    Greater,
    /// `value < threshold`
    Less,
    /// `value == threshold`
    Equal,
}

impl Comparison {
    /// Apply the operator.
    #[inline]
    pub const fn holds(self, value: i64, threshold: i64) -> bool {
        match self {
            Self::Greater => value > threshold,
            Self::Less => value < threshold,
            Self::Equal => value == threshold,
        }
    }

    /// Interchange spelling (`">"`, `"<"`, `"=="`).
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Greater => ">",
            Self::Less => "<",
            Self::Equal => "==",
        }
    }
}

/// A single rule condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Physical digital input (port 1..=5) equals the expected state.
    DigitalIn {
        /// Input port.
        port: u8,
        /// Expected state (true = on).
        expected: bool,
    },
    /// Physical analog input (port 1..=2) compared against a threshold.
    AnalogIn {
        /// Input port.
        port: u8,
        /// Operator.
        op: Comparison,
        /// Threshold.
        threshold: i64,
    },
    /// Last commanded digital output (port 1..=8) equals the expected state.
    DigitalOut {
        /// Output port.
        port: u8,
        /// Expected state (true = on).
        expected: bool,
    },
}

/// What a digital output action does to its port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DigitalMode {
    /// Drive the port on or off while the rule holds. Off also clears the latch.
    SetState(bool),
    /// Set the sticky latch bit of the port.
    LatchOn,
    /// On the rule's rising edge, blink the port for `duration`.
    Blink {
        /// Time between phase toggles.
        interval: Duration,
        /// Total blink time.
        duration: Duration,
    },
}

/// An output action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Digital output (port 1..=8).
    DigitalOut {
        /// Output port.
        port: u8,
        /// Mode.
        mode: DigitalMode,
    },
    /// Analog output (port 1..=2).
    AnalogOut {
        /// Output port.
        port: u8,
        /// Level.
        value: u8,
    },
}

/// Actions fired once, `delay` after the owning rule's rising edge.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayedAction {
    /// Delay from the rising edge.
    pub delay: Duration,
    /// Actions to apply when the delay expires.
    pub actions: Vec<Action>,
}

/// A validated rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Identifier assigned at load.
    pub id: RuleId,
    /// Display name.
    pub name: String,
    /// Disabled rules are skipped entirely.
    pub enabled: bool,
    /// Condition combination policy.
    pub logic: ConditionLogic,
    /// Conditions; an empty list never holds.
    pub conditions: Vec<Condition>,
    /// Level-triggered actions (plus blink one-shots).
    pub actions: Vec<Action>,
    /// Edge-triggered delayed actions.
    pub delayed_actions: Vec<DelayedAction>,
}

impl Rule {
    /// Blink one-shots among the immediate actions as `(port, interval, duration)`.
    pub fn blinks(&self) -> impl Iterator<Item = (u8, Duration, Duration)> + '_ {
        self.actions.iter().filter_map(|action| match *action {
            Action::DigitalOut {
                port,
                mode: DigitalMode::Blink { interval, duration },
            } => Some((port, interval, duration)),
            _ => None,
        })
    }
}

/// Ordered, immutable collection of rules for one engine run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build a rule set, reassigning ids to store order.
    pub fn new(rules: Vec<Rule>) -> Self {
        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(index, mut rule)| {
                rule.id = RuleId(index);
                rule
            })
            .collect();
        Self { rules }
    }

    /// Rules in priority (store) order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Enabled rules in priority order.
    pub fn enabled(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|rule| rule.enabled)
    }

    /// Look up a rule by id.
    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

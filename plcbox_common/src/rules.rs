//! Rule model and rule file handling.
//!
//! - [`model`] - Validated, strongly typed rules consumed by the engine
//! - [`format`] - Loose JSON interchange records written by the editor
//! - [`store`] - Loading and saving rule files
//! - [`error`] - `RuleError`

pub mod error;
pub mod format;
pub mod model;
pub mod store;

pub use error::RuleError;
pub use model::{
    Action, Comparison, Condition, ConditionLogic, DelayedAction, DigitalMode, Rule, RuleId,
    RuleSet,
};
pub use store::{load_rules, load_rules_for_board, parse_rules, save_rules};

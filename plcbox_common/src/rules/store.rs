//! Loading and saving rule files.
//!
//! A rules file is a JSON array of [`RuleRecord`]s. Loading validates every
//! record and assigns sequential [`RuleId`]s; any invalid record rejects the
//! whole file so an engine never starts on half a rule set.

use super::error::RuleError;
use super::format::RuleRecord;
use super::model::{RuleId, RuleSet};
use crate::consts::rules_file_name;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Parse and validate a rules document.
///
/// # Errors
/// - `RuleError::Parse` if the text is not JSON or a record has the wrong shape
/// - `RuleError::NotAList` if the top level is not an array
/// - `RuleError::Invalid` if a record fails validation
pub fn parse_rules(json: &str) -> Result<RuleSet, RuleError> {
    let document: serde_json::Value = serde_json::from_str(json)?;
    if !document.is_array() {
        return Err(RuleError::NotAList);
    }

    let records: Vec<RuleRecord> = serde_json::from_value(document)?;
    RuleSet::from_records(records)
}

/// Read, parse and validate a rules file.
pub fn load_rules(path: &Path) -> Result<RuleSet, RuleError> {
    let content = fs::read_to_string(path).map_err(|source| RuleError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = parse_rules(&content)?;
    info!("Loaded {} rules from {}", rules.len(), path.display());
    Ok(rules)
}

/// Load `rules_board_{id}.json` from `dir`.
///
/// A missing file yields an empty rule set; a malformed one is an error.
pub fn load_rules_for_board(dir: &Path, board_id: u8) -> Result<RuleSet, RuleError> {
    let path = dir.join(rules_file_name(board_id));
    if !path.exists() {
        debug!("No rules file at {}, starting empty", path.display());
        return Ok(RuleSet::default());
    }
    load_rules(&path)
}

/// Write a rule set in the interchange format (4-space indented JSON).
pub fn save_rules(path: &Path, rules: &RuleSet) -> Result<(), RuleError> {
    let json = to_pretty_json(&rules.to_records())?;
    fs::write(path, json).map_err(|source| RuleError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved {} rules to {}", rules.len(), path.display());
    Ok(())
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, RuleError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

impl RuleSet {
    /// Validate interchange records into a rule set.
    pub fn from_records(records: Vec<RuleRecord>) -> Result<Self, RuleError> {
        let rules = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let name = record.name.clone();
                record
                    .into_rule(RuleId(index))
                    .map_err(|reason| RuleError::Invalid {
                        index,
                        name,
                        reason,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    /// Convert back to interchange records.
    pub fn to_records(&self) -> Vec<RuleRecord> {
        self.iter().map(RuleRecord::from).collect()
    }
}

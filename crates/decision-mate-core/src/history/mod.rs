//! Per-user decision history.
//!
//! The engine itself is stateless; saved decisions go through the
//! [`DecisionHistory`] capability so the storage backend can be swapped.
//! Records are append-only and listed in insertion order.

pub mod json_file;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::business::evaluator::FinancialSummary;
use crate::business::inputs::ProjectInputs;
use crate::error::DecisionError;
use crate::personal::scoring::{OptionComparison, PersonalDecision};
use crate::DecisionResult;

pub use json_file::JsonFileHistory;
pub use memory::InMemoryHistory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub saved_at: DateTime<Utc>,
    pub inputs: ProjectInputs,
    pub summary: FinancialSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub saved_at: DateTime<Utc>,
    pub decision: PersonalDecision,
    pub comparison: OptionComparison,
}

/// One saved decision, tagged by the module that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "module")]
pub enum DecisionRecord {
    Personal(PersonalRecord),
    Business(BusinessRecord),
}

impl DecisionRecord {
    pub fn business(inputs: ProjectInputs, summary: FinancialSummary, saved_at: DateTime<Utc>) -> Self {
        DecisionRecord::Business(BusinessRecord {
            saved_at,
            inputs,
            summary,
        })
    }

    pub fn personal(
        decision: PersonalDecision,
        comparison: OptionComparison,
        saved_at: DateTime<Utc>,
    ) -> Self {
        DecisionRecord::Personal(PersonalRecord {
            saved_at,
            decision,
            comparison,
        })
    }

    pub fn module(&self) -> &'static str {
        match self {
            DecisionRecord::Personal(_) => "Personal",
            DecisionRecord::Business(_) => "Business",
        }
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        match self {
            DecisionRecord::Personal(r) => r.saved_at,
            DecisionRecord::Business(r) => r.saved_at,
        }
    }
}

/// Append-only store of decision records, keyed by user name.
pub trait DecisionHistory {
    fn append(&mut self, user: &str, record: DecisionRecord) -> DecisionResult<()>;

    /// All records for `user`, oldest first. Unknown users have no records.
    fn list(&self, user: &str) -> DecisionResult<Vec<DecisionRecord>>;
}

pub(crate) fn check_user(user: &str) -> DecisionResult<&str> {
    let trimmed = user.trim();
    if trimmed.is_empty() {
        return Err(DecisionError::invalid(
            "user",
            "A user name is required to view or save decisions",
        ));
    }
    Ok(trimmed)
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::DecisionError;
use crate::types::{with_metadata, ComputationOutput, Score};
use crate::DecisionResult;

pub const MIN_SCORE: Score = 1;
pub const MAX_SCORE: Score = 10;

/// Criteria offered by the life & career form.
pub const DEFAULT_CRITERIA: [&str; 4] = ["Time impact", "Financial gain", "Stress level", "Flexibility"];

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Swot {
    #[serde(default)]
    pub strengths: String,
    #[serde(default)]
    pub weaknesses: String,
    #[serde(default)]
    pub opportunities: String,
    #[serde(default)]
    pub threats: String,
}

impl Swot {
    pub fn is_empty(&self) -> bool {
        [&self.strengths, &self.weaknesses, &self.opportunities, &self.threats]
            .iter()
            .all(|s| s.trim().is_empty())
    }
}

/// Free-text prompts answered before committing to a choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    /// Why is this decision hard?
    #[serde(default)]
    pub why_hard: String,
    /// What would you regret not doing?
    #[serde(default)]
    pub regret: String,
    #[serde(default)]
    pub gut_feeling: String,
}

impl Reflection {
    pub fn is_empty(&self) -> bool {
        [&self.why_hard, &self.regret, &self.gut_feeling]
            .iter()
            .all(|s| s.trim().is_empty())
    }
}

fn default_criteria() -> Vec<String> {
    DEFAULT_CRITERIA.iter().map(|c| c.to_string()).collect()
}

/// A two-option personal decision scored against shared criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalDecision {
    pub option_a: String,
    pub option_b: String,
    #[serde(default = "default_criteria")]
    pub criteria: Vec<String>,
    /// One score per criterion, 1..=10
    pub scores_a: Vec<Score>,
    pub scores_b: Vec<Score>,
    #[serde(default)]
    pub swot: Swot,
    #[serde(default)]
    pub reflection: Reflection,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    OptionA,
    OptionB,
    Tie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionComparison {
    pub criterion: String,
    pub score_a: Score,
    pub score_b: Score,
    /// `score_a - score_b`
    pub difference: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionComparison {
    pub option_a: String,
    pub option_b: String,
    pub criteria: Vec<CriterionComparison>,
    pub total_a: u32,
    pub total_b: u32,
    pub average_a: Decimal,
    pub average_b: Decimal,
    pub preferred: Preference,
    /// Label of the preferred option, or "Tie"
    pub preferred_label: String,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Score both options across the criteria and pick the higher total.
pub fn compare_options(decision: &PersonalDecision) -> DecisionResult<ComputationOutput<OptionComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_decision(decision)?;

    let criteria: Vec<CriterionComparison> = decision
        .criteria
        .iter()
        .zip(decision.scores_a.iter().zip(decision.scores_b.iter()))
        .map(|(criterion, (&a, &b))| CriterionComparison {
            criterion: criterion.clone(),
            score_a: a,
            score_b: b,
            difference: a as i16 - b as i16,
        })
        .collect();

    let total_a: u32 = decision.scores_a.iter().map(|&s| s as u32).sum();
    let total_b: u32 = decision.scores_b.iter().map(|&s| s as u32).sum();
    let count = Decimal::from(decision.criteria.len() as u64);

    let preferred = match total_a.cmp(&total_b) {
        std::cmp::Ordering::Greater => Preference::OptionA,
        std::cmp::Ordering::Less => Preference::OptionB,
        std::cmp::Ordering::Equal => Preference::Tie,
    };
    let preferred_label = match preferred {
        Preference::OptionA => decision.option_a.trim().to_string(),
        Preference::OptionB => decision.option_b.trim().to_string(),
        Preference::Tie => "Tie".to_string(),
    };

    if decision.swot.is_empty() {
        warnings.push("SWOT analysis is empty".into());
    }
    if decision.reflection.is_empty() {
        warnings.push("No reflection answers recorded".into());
    }

    let output = OptionComparison {
        option_a: decision.option_a.trim().to_string(),
        option_b: decision.option_b.trim().to_string(),
        criteria,
        total_a,
        total_b,
        average_a: Decimal::from(total_a) / count,
        average_b: Decimal::from(total_b) / count,
        preferred,
        preferred_label,
    };

    Ok(with_metadata(
        "Unweighted priority scoring of two options",
        &serde_json::json!({
            "criteria": decision.criteria,
            "score_range": format!("{MIN_SCORE}-{MAX_SCORE}"),
            "weighting": "equal",
        }),
        warnings,
        start,
        output,
    ))
}

fn validate_decision(decision: &PersonalDecision) -> DecisionResult<()> {
    if decision.option_a.trim().is_empty() {
        return Err(DecisionError::invalid("option_a", "Both options must be named"));
    }
    if decision.option_b.trim().is_empty() {
        return Err(DecisionError::invalid("option_b", "Both options must be named"));
    }
    if decision.criteria.is_empty() {
        return Err(DecisionError::invalid("criteria", "At least one criterion is required"));
    }

    for (field, scores) in [("scores_a", &decision.scores_a), ("scores_b", &decision.scores_b)] {
        if scores.len() != decision.criteria.len() {
            return Err(DecisionError::invalid(
                field,
                format!(
                    "Expected {} scores, got {}",
                    decision.criteria.len(),
                    scores.len()
                ),
            ));
        }
        if let Some(bad) = scores.iter().find(|s| !(MIN_SCORE..=MAX_SCORE).contains(*s)) {
            return Err(DecisionError::invalid(
                field,
                format!("Score {bad} is outside {MIN_SCORE}..={MAX_SCORE}"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn job_change() -> PersonalDecision {
        PersonalDecision {
            option_a: "Stay in current job".into(),
            option_b: "Accept new job offer".into(),
            criteria: default_criteria(),
            scores_a: vec![6, 4, 7, 5],
            scores_b: vec![5, 9, 4, 8],
            swot: Swot {
                strengths: "Higher salary".into(),
                ..Swot::default()
            },
            reflection: Reflection {
                gut_feeling: "Go".into(),
                ..Reflection::default()
            },
        }
    }

    #[test]
    fn test_totals_and_preference() {
        let result = compare_options(&job_change()).unwrap();
        let out = &result.result;
        assert_eq!(out.total_a, 22);
        assert_eq!(out.total_b, 26);
        assert_eq!(out.average_b, dec!(6.5));
        assert_eq!(out.preferred, Preference::OptionB);
        assert_eq!(out.preferred_label, "Accept new job offer");
        assert_eq!(out.criteria[1].difference, -5);
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_tie() {
        let mut decision = job_change();
        decision.scores_a = vec![5; 4];
        decision.scores_b = vec![5; 4];
        let out = compare_options(&decision).unwrap().result;
        assert_eq!(out.preferred, Preference::Tie);
        assert_eq!(out.preferred_label, "Tie");
    }

    #[test]
    fn test_blank_option_rejected() {
        let mut decision = job_change();
        decision.option_b = "   ".into();
        assert!(matches!(
            compare_options(&decision),
            Err(DecisionError::InvalidInput { ref field, .. }) if field == "option_b"
        ));
    }

    #[test]
    fn test_score_out_of_range() {
        let mut decision = job_change();
        decision.scores_a[2] = 11;
        assert!(compare_options(&decision).is_err());
        decision.scores_a[2] = 0;
        assert!(compare_options(&decision).is_err());
    }

    #[test]
    fn test_score_count_mismatch() {
        let mut decision = job_change();
        decision.scores_b.pop();
        assert!(matches!(
            compare_options(&decision),
            Err(DecisionError::InvalidInput { ref field, .. }) if field == "scores_b"
        ));
    }

    #[test]
    fn test_empty_swot_and_reflection_warn() {
        let mut decision = job_change();
        decision.swot = Swot::default();
        decision.reflection = Reflection::default();
        let result = compare_options(&decision).unwrap();
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_default_criteria_from_json() {
        let json = r#"{
            "option_a": "Rent",
            "option_b": "Buy",
            "scores_a": [5, 5, 5, 5],
            "scores_b": [6, 6, 6, 6]
        }"#;
        let decision: PersonalDecision = serde_json::from_str(json).unwrap();
        assert_eq!(decision.criteria.len(), 4);
        assert_eq!(decision.criteria[0], "Time impact");
        assert!(decision.swot.is_empty());
    }
}

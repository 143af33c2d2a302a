use chrono::Utc;
use clap::{Args, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::Path;

use decision_mate_core::business::evaluator;
use decision_mate_core::history::{DecisionHistory, DecisionRecord, JsonFileHistory};
use decision_mate_core::personal::scoring;

use super::business::ProjectArgs;
use super::personal::PersonalArgs;

/// Arguments for saving a decision
#[derive(Args)]
pub struct SaveArgs {
    /// Name the decision is saved under
    #[arg(long, env = "DECISION_MATE_USER")]
    pub user: String,

    #[command(subcommand)]
    pub record: SaveTarget,
}

#[derive(Subcommand)]
pub enum SaveTarget {
    /// Save a business case (CAPEX / OPEX / NPV)
    Business(ProjectArgs),
    /// Save a personal option comparison
    Personal(PersonalArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModuleFilter {
    Business,
    Personal,
}

/// Arguments for listing saved decisions
#[derive(Args)]
pub struct HistoryArgs {
    /// Whose decisions to list
    #[arg(long, env = "DECISION_MATE_USER")]
    pub user: String,

    /// Only list one kind of decision
    #[arg(long)]
    pub module: Option<ModuleFilter>,

    /// Show at most this many records
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn run_save(args: SaveArgs, history_file: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let record = match args.record {
        SaveTarget::Business(project) => {
            let inputs = project.resolve()?;
            let summary = evaluator::evaluate(&inputs)?;
            DecisionRecord::business(inputs, summary, Utc::now())
        }
        SaveTarget::Personal(personal) => {
            let decision = personal.resolve()?;
            let comparison = scoring::compare_options(&decision)?.result;
            DecisionRecord::personal(decision, comparison, Utc::now())
        }
    };

    let mut history = JsonFileHistory::new(history_file);
    history.append(&args.user, record.clone())?;
    let count = history.list(&args.user)?.len();

    Ok(serde_json::json!({
        "saved": true,
        "user": args.user.trim(),
        "module": record.module(),
        "record_count": count,
        "history_file": history.path().display().to_string(),
        "record": record,
    }))
}

pub fn run_history(args: HistoryArgs, history_file: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let history = JsonFileHistory::new(history_file);
    let records = history.list(&args.user)?;
    let total = records.len();

    let selected: Vec<(usize, DecisionRecord)> = records
        .into_iter()
        .enumerate()
        .rev()
        .filter(|(_, r)| match args.module {
            Some(ModuleFilter::Business) => matches!(r, DecisionRecord::Business(_)),
            Some(ModuleFilter::Personal) => matches!(r, DecisionRecord::Personal(_)),
            None => true,
        })
        .take(args.limit.unwrap_or(usize::MAX))
        .collect();

    let results: Vec<Value> = selected
        .iter()
        .map(|(i, record)| {
            serde_json::json!({
                "number": i + 1,
                "module": record.module(),
                "saved_at": record.saved_at().format("%Y-%m-%d %H:%M:%S").to_string(),
                "headline": headline(record),
            })
        })
        .collect();
    let full: Vec<&DecisionRecord> = selected.iter().map(|(_, r)| r).collect();

    Ok(serde_json::json!({
        "user": args.user.trim(),
        "total": total,
        "count": results.len(),
        "results": results,
        "records": full,
    }))
}

/// One-line description of a saved decision.
fn headline(record: &DecisionRecord) -> String {
    match record {
        DecisionRecord::Business(b) => {
            let irr = match b.summary.irr {
                Some(rate) => format!("{:.2}%", rate * rust_decimal_macros::dec!(100)),
                None => "Not computable".to_string(),
            };
            format!("NPV {:.2}, IRR {}", b.summary.npv, irr)
        }
        DecisionRecord::Personal(p) => format!(
            "{} vs {}: {}",
            p.comparison.option_a, p.comparison.option_b, p.comparison.preferred_label
        ),
    }
}

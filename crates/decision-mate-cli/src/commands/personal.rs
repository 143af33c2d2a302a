use clap::Args;
use serde_json::Value;

use decision_mate_core::personal::scoring::{self, PersonalDecision};

use crate::input;

/// Arguments for personal option scoring
#[derive(Args)]
pub struct PersonalArgs {
    /// Path to a JSON or YAML file with both options, scores, SWOT and reflection
    #[arg(long)]
    pub input: Option<String>,
}

impl PersonalArgs {
    pub fn resolve(&self) -> Result<PersonalDecision, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            input::file::read_input(path)
        } else if let Some(decision) = input::stdin::read_stdin()? {
            Ok(decision)
        } else {
            Err("--input file is required for a personal decision".into())
        }
    }
}

pub fn run_personal(args: PersonalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let decision = args.resolve()?;
    let result = scoring::compare_options(&decision)?;
    Ok(serde_json::to_value(result)?)
}

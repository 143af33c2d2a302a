use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use decision_mate_core::business::evaluator;
use decision_mate_core::business::inputs::MAX_YEARS;
use decision_mate_core::business::sensitivity::{self, CashFlowMode, SensitivityConfig};
use decision_mate_core::ProjectInputs;

use crate::input;

/// Project parameters shared by every business command. Defaults mirror the
/// business-case form.
#[derive(Args)]
pub struct ProjectArgs {
    /// Initial investment (CAPEX)
    #[arg(long, default_value = "100000", allow_hyphen_values = true)]
    pub capex: Decimal,

    /// Annual operating cost (OPEX)
    #[arg(long, default_value = "20000", allow_hyphen_values = true)]
    pub opex: Decimal,

    /// Project duration in years (defaults to the number of --inflow values, else 5)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_YEARS as i64))]
    pub years: Option<u32>,

    /// Discount rate (e.g. 0.10 for 10%)
    #[arg(long, default_value = "0.10", allow_hyphen_values = true)]
    pub discount_rate: Decimal,

    /// Gross inflow for one year; repeat once per year, year 1 first
    #[arg(long = "inflow", allow_hyphen_values = true)]
    pub inflows: Vec<Decimal>,

    /// Same gross inflow for every year [default: 40000]
    #[arg(long, conflicts_with = "inflows", allow_hyphen_values = true)]
    pub uniform_inflow: Option<Decimal>,

    /// Path to a JSON or YAML file with the project inputs (overrides flags)
    #[arg(long)]
    pub input: Option<String>,
}

impl ProjectArgs {
    pub fn resolve(&self) -> Result<ProjectInputs, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return input::file::read_input(path);
        }
        if let Some(inputs) = input::stdin::read_stdin::<ProjectInputs>()? {
            return Ok(inputs);
        }

        if self.inflows.is_empty() {
            let years = self.years.unwrap_or(5);
            return Ok(ProjectInputs::uniform(
                self.capex,
                self.opex,
                years,
                self.discount_rate,
                self.uniform_inflow.unwrap_or(dec!(40000)),
            ));
        }

        Ok(ProjectInputs {
            capex: self.capex,
            opex: self.opex,
            years: self.years.unwrap_or(self.inflows.len() as u32),
            discount_rate: self.discount_rate,
            gross_inflows: self.inflows.clone(),
        })
    }
}

/// Tornado tuning flags
#[derive(Args)]
pub struct TornadoArgs {
    /// Relative perturbation applied up and down (0.1 = ±10%)
    #[arg(long, default_value = "0.1")]
    pub delta: Decimal,

    /// Derive the downside cash-flow case as net·(1-δ) instead of the
    /// compounded net·(1+δ)(1-2δ)
    #[arg(long)]
    pub symmetric_cash_flow: bool,
}

impl TornadoArgs {
    fn config(&self) -> SensitivityConfig {
        SensitivityConfig {
            delta: self.delta,
            cash_flow_mode: if self.symmetric_cash_flow {
                CashFlowMode::Symmetric
            } else {
                CashFlowMode::Compounded
            },
        }
    }
}

/// Arguments for a full business-case appraisal
#[derive(Args)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub tornado: TornadoArgs,
}

/// Arguments for the tornado on its own
#[derive(Args)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub tornado: TornadoArgs,
}

pub fn run_evaluate(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = args.project.resolve()?;
    let result = evaluator::analyse_project(&inputs, &args.tornado.config())?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = args.project.resolve()?;
    let report = sensitivity::sensitivity_with(&inputs, &args.tornado.config())?;

    let results: Vec<Value> = report
        .ranked()
        .into_iter()
        .map(|bar| {
            serde_json::json!({
                "parameter": bar.parameter.label(),
                "npv_high": rounded(bar.npv_high),
                "npv_low": rounded(bar.npv_low),
                "impact": rounded(bar.impact),
            })
        })
        .collect();

    Ok(serde_json::json!({
        "base_npv": report.base_npv.round_dp(2).to_string(),
        "delta": report.delta.to_string(),
        "cash_flow_mode": report.cash_flow_mode,
        "results": results,
    }))
}

/// Two-decimal string, or `null` for a scenario that is not computable.
fn rounded(value: Option<Decimal>) -> Value {
    match value {
        Some(v) => Value::String(v.round_dp(2).to_string()),
        None => Value::Null,
    }
}

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::business::inputs::{cumulative_cash_flows, ProjectInputs};
use crate::business::sensitivity::{sensitivity_with, SensitivityConfig, SensitivityReport};
use crate::error::DecisionError;
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::DecisionResult;

const IRR_GUESS: Rate = dec!(0.10);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Headline metrics for one set of project inputs.
///
/// `None` means the metric is not computable (IRR, ROI) or the outlay is not
/// recovered within the horizon (payback). Serialises as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub npv: Money,
    pub irr: Option<Rate>,
    pub payback_period: Option<u32>,
    pub roi: Option<Rate>,
}

/// One row of the cash-flow schedule. Period 0 is the initial outlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowRow {
    pub period: u32,
    pub label: String,
    pub net_cash_flow: Money,
    pub discounted_cash_flow: Money,
    pub cumulative_cash_flow: Money,
}

/// Full business case: summary, schedule and tornado.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub inputs: ProjectInputs,
    pub summary: FinancialSummary,
    pub schedule: Vec<CashFlowRow>,
    pub sensitivity: SensitivityReport,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// `-capex + Σ net[i-1] / (1 + rate)^i`, first flow discounted one period.
pub fn compute_npv(capex: Money, net_cash_flows: &[Money], discount_rate: Rate) -> DecisionResult<Money> {
    let pv = time_value::present_value(discount_rate, net_cash_flows)?;
    pv.checked_sub(capex).ok_or_else(|| DecisionError::NotComputable {
        metric: "NPV".into(),
        reason: "arithmetic overflow netting the initial outlay".into(),
    })
}

/// IRR of `[-capex, net...]`, or `None` when there is no real root or the
/// solver fails numerically.
pub fn compute_irr(cash_flows: &[Money]) -> Option<Rate> {
    match time_value::irr(cash_flows, IRR_GUESS) {
        Ok(rate) => Some(rate),
        Err(e) => {
            tracing::debug!(error = %e, "IRR not computable");
            None
        }
    }
}

/// Smallest index whose cumulative cash flow is non-negative. Whole years
/// only; `None` if the outlay is never recovered.
pub fn compute_payback_period(cumulative_cash_flows: &[Money]) -> Option<u32> {
    cumulative_cash_flows
        .iter()
        .position(|c| *c >= Decimal::ZERO)
        .map(|i| i as u32)
}

/// `(Σ net - capex) / capex`, or `None` when capex is zero.
pub fn compute_roi(net_cash_flows: &[Money], capex: Money) -> Option<Rate> {
    if capex.is_zero() {
        return None;
    }
    net_cash_flows
        .iter()
        .try_fold(Decimal::ZERO, |acc, cf| acc.checked_add(*cf))
        .and_then(|total| total.checked_sub(capex))
        .and_then(|gain| gain.checked_div(capex))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate the inputs and derive the headline metrics. Pure: identical
/// inputs always produce identical summaries.
pub fn evaluate(inputs: &ProjectInputs) -> DecisionResult<FinancialSummary> {
    inputs.validate()?;

    let net = inputs.net_cash_flows()?;
    let npv = compute_npv(inputs.capex, &net, inputs.discount_rate)?;
    let irr = compute_irr(&inputs.project_cash_flows()?);
    let payback_period = compute_payback_period(&cumulative_cash_flows(inputs.capex, &net)?);
    let roi = compute_roi(&net, inputs.capex);

    Ok(FinancialSummary {
        npv,
        irr,
        payback_period,
        roi,
    })
}

/// Evaluate the project and attach its cash-flow schedule and tornado.
pub fn analyse_project(
    inputs: &ProjectInputs,
    config: &SensitivityConfig,
) -> DecisionResult<ComputationOutput<ProjectAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let summary = evaluate(inputs)?;
    let schedule = build_schedule(inputs)?;
    let sensitivity = sensitivity_with(inputs, config)?;

    if summary.irr.is_none() {
        warnings.push("IRR is not computable for this cash-flow profile".into());
    }
    if summary.payback_period.is_none() {
        warnings.push(format!(
            "Initial investment is not recovered within {} years",
            inputs.years
        ));
    }
    if summary.npv < Decimal::ZERO {
        let rate = match inputs.discount_rate.checked_mul(dec!(100)) {
            Some(pct) => format!("{pct:.1}%"),
            None => inputs.discount_rate.to_string(),
        };
        warnings.push(format!(
            "NPV of {:.2} is negative at a {} discount rate",
            summary.npv, rate
        ));
    }
    if inputs.discount_rate < Decimal::ZERO {
        warnings.push("Negative discount rate amplifies future cash flows".into());
    }
    for bar in sensitivity.bars.iter().filter(|b| b.impact.is_none()) {
        warnings.push(format!(
            "{} sensitivity is incomplete: a perturbed scenario is not computable",
            bar.parameter.label()
        ));
    }

    tracing::debug!(npv = %summary.npv, years = inputs.years, "project evaluated");

    let output = ProjectAnalysis {
        inputs: inputs.clone(),
        summary,
        schedule,
        sensitivity,
    };

    Ok(with_metadata(
        "Single-outlay project appraisal (NPV, IRR, payback, ROI) with one-at-a-time tornado",
        &serde_json::json!({
            "capex": inputs.capex.to_string(),
            "opex": inputs.opex.to_string(),
            "years": inputs.years,
            "discount_rate": inputs.discount_rate.to_string(),
            "discounting": "end of year, first flow discounted one period",
            "payback": "whole years, no interpolation",
            "sensitivity_delta": config.delta.to_string(),
        }),
        warnings,
        start,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_schedule(inputs: &ProjectInputs) -> DecisionResult<Vec<CashFlowRow>> {
    let net = inputs.net_cash_flows()?;
    let factors = time_value::discount_factors(inputs.discount_rate, net.len())?;
    let cumulative = cumulative_cash_flows(inputs.capex, &net)?;

    let mut rows = Vec::with_capacity(net.len() + 1);
    rows.push(CashFlowRow {
        period: 0,
        label: "Initial".into(),
        net_cash_flow: -inputs.capex,
        discounted_cash_flow: -inputs.capex,
        cumulative_cash_flow: cumulative[0],
    });

    for (i, (cf, factor)) in net.iter().zip(factors.iter()).enumerate() {
        let year = i as u32 + 1;
        let discounted = cf.checked_mul(*factor).ok_or_else(|| {
            DecisionError::overflow("discounted cash flow", format!("in year {year}"))
        })?;
        rows.push(CashFlowRow {
            period: year,
            label: format!("Year {year}"),
            net_cash_flow: *cf,
            discounted_cash_flow: discounted,
            cumulative_cash_flow: cumulative[i + 1],
        });
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DecisionError;
use crate::types::{Money, Rate};
use crate::DecisionResult;

/// Longest horizon accepted, in years.
pub const MAX_YEARS: u32 = 100;

/// Investment parameters for a single-outlay project.
///
/// One upfront capital expenditure, followed by `years` gross inflows that
/// are each netted against the same annual operating cost and discounted at
/// one flat rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInputs {
    /// Upfront capital expenditure, paid at t = 0
    pub capex: Money,
    /// Annual operating cost, netted against every year's gross inflow
    pub opex: Money,
    /// Project horizon in years
    pub years: u32,
    /// Flat discount rate (decimal, e.g. 0.10 = 10%)
    pub discount_rate: Rate,
    /// One gross inflow per year, year 1 first
    pub gross_inflows: Vec<Money>,
}

impl ProjectInputs {
    /// Inputs where every year receives the same gross inflow.
    ///
    /// At most [`MAX_YEARS`] inflows are allocated; a longer horizon is
    /// rejected by [`validate`](Self::validate) on the `years` field.
    pub fn uniform(capex: Money, opex: Money, years: u32, discount_rate: Rate, inflow: Money) -> Self {
        ProjectInputs {
            capex,
            opex,
            years,
            discount_rate,
            gross_inflows: vec![inflow; years.min(MAX_YEARS) as usize],
        }
    }

    pub fn validate(&self) -> DecisionResult<()> {
        if self.years == 0 {
            return Err(DecisionError::invalid("years", "Project horizon must be at least one year"));
        }
        if self.years > MAX_YEARS {
            return Err(DecisionError::invalid(
                "years",
                format!("Project horizon is capped at {MAX_YEARS} years"),
            ));
        }
        if self.gross_inflows.len() != self.years as usize {
            return Err(DecisionError::invalid(
                "gross_inflows",
                format!(
                    "Expected {} yearly inflows, got {}",
                    self.years,
                    self.gross_inflows.len()
                ),
            ));
        }
        if self.discount_rate <= dec!(-1) {
            return Err(DecisionError::invalid(
                "discount_rate",
                "Discount rate must be greater than -100%",
            ));
        }
        if self.capex < Decimal::ZERO {
            return Err(DecisionError::invalid(
                "capex",
                "Capital expenditure is an outflow amount and cannot be negative",
            ));
        }
        Ok(())
    }

    /// Gross inflow less operating cost, one entry per year.
    pub fn net_cash_flows(&self) -> DecisionResult<Vec<Money>> {
        self.gross_inflows
            .iter()
            .enumerate()
            .map(|(i, g)| {
                g.checked_sub(self.opex).ok_or_else(|| {
                    DecisionError::overflow("net cash flow", format!("in year {}", i + 1))
                })
            })
            .collect()
    }

    /// The full project series `[-capex, net_1, ..., net_n]`.
    pub fn project_cash_flows(&self) -> DecisionResult<Vec<Money>> {
        let net = self.net_cash_flows()?;
        Ok(std::iter::once(-self.capex).chain(net).collect())
    }
}

/// Running total of the project series; index 0 is the initial outlay.
pub fn cumulative_cash_flows(capex: Money, net_cash_flows: &[Money]) -> DecisionResult<Vec<Money>> {
    let mut running = -capex;
    let mut cumulative = Vec::with_capacity(net_cash_flows.len() + 1);
    cumulative.push(running);
    for (i, cf) in net_cash_flows.iter().enumerate() {
        running = running
            .checked_add(*cf)
            .ok_or_else(|| {
                DecisionError::overflow("cumulative cash flow", format!("in year {}", i + 1))
            })?;
        cumulative.push(running);
    }
    Ok(cumulative)
}

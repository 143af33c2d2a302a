use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::business::evaluator::compute_npv;
use crate::business::inputs::ProjectInputs;
use crate::error::DecisionError;
use crate::time_value;
use crate::types::{Money, Rate};
use crate::DecisionResult;

/// Parameters flexed by the tornado, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SensitivityParameter {
    #[serde(rename = "CAPEX")]
    Capex,
    #[serde(rename = "OPEX")]
    Opex,
    #[serde(rename = "Cash Flow")]
    CashFlow,
    #[serde(rename = "Discount Rate")]
    DiscountRate,
}

impl SensitivityParameter {
    pub const ALL: [SensitivityParameter; 4] = [
        SensitivityParameter::Capex,
        SensitivityParameter::Opex,
        SensitivityParameter::CashFlow,
        SensitivityParameter::DiscountRate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SensitivityParameter::Capex => "CAPEX",
            SensitivityParameter::Opex => "OPEX",
            SensitivityParameter::CashFlow => "Cash Flow",
            SensitivityParameter::DiscountRate => "Discount Rate",
        }
    }
}

/// How the downside Cash Flow scenario is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowMode {
    /// Downside is `(1 - 2δ)` applied to the already uplifted series, i.e.
    /// `net · (1 + δ)(1 - 2δ)`.
    #[default]
    Compounded,
    /// Downside is `net · (1 - δ)`, matching the other parameters.
    Symmetric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityConfig {
    /// Relative perturbation applied in each direction (0.1 = ±10%)
    pub delta: Rate,
    pub cash_flow_mode: CashFlowMode,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        SensitivityConfig {
            delta: dec!(0.1),
            cash_flow_mode: CashFlowMode::Compounded,
        }
    }
}

/// NPV under the favourable and unfavourable perturbation of one parameter.
///
/// A side is `None` when its scenario is not computable, e.g. a perturbed
/// discount rate at or below -100%. The other bars are unaffected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TornadoBar {
    pub parameter: SensitivityParameter,
    pub npv_high: Option<Money>,
    pub npv_low: Option<Money>,
    /// `|npv_high - npv_low|`, present only when both sides are
    pub impact: Option<Money>,
}

impl TornadoBar {
    fn from_scenarios(
        parameter: SensitivityParameter,
        high: DecisionResult<Money>,
        low: DecisionResult<Money>,
    ) -> Self {
        let npv_high = computable(parameter, "high", high);
        let npv_low = computable(parameter, "low", low);
        let impact = npv_high
            .zip(npv_low)
            .and_then(|(h, l)| h.checked_sub(l))
            .map(|swing| swing.abs());
        TornadoBar {
            parameter,
            npv_high,
            npv_low,
            impact,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.impact.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub base_npv: Money,
    pub delta: Rate,
    pub cash_flow_mode: CashFlowMode,
    /// One bar per parameter, in [`SensitivityParameter::ALL`] order
    pub bars: Vec<TornadoBar>,
}

impl SensitivityReport {
    pub fn impact(&self, parameter: SensitivityParameter) -> Option<Money> {
        self.bars
            .iter()
            .find(|b| b.parameter == parameter)
            .and_then(|b| b.impact)
    }

    /// Impact of every parameter whose bar is complete.
    pub fn impacts(&self) -> BTreeMap<SensitivityParameter, Money> {
        self.bars
            .iter()
            .filter_map(|b| b.impact.map(|impact| (b.parameter, impact)))
            .collect()
    }

    /// Bars sorted by descending impact (tornado order). Incomplete bars go
    /// last; ties keep display order.
    pub fn ranked(&self) -> Vec<&TornadoBar> {
        let mut bars: Vec<&TornadoBar> = self.bars.iter().collect();
        bars.sort_by(|a, b| b.impact.cmp(&a.impact));
        bars
    }
}

/// One-at-a-time ±10% tornado.
pub fn sensitivity(inputs: &ProjectInputs) -> DecisionResult<SensitivityReport> {
    sensitivity_with(inputs, &SensitivityConfig::default())
}

pub fn sensitivity_with(
    inputs: &ProjectInputs,
    config: &SensitivityConfig,
) -> DecisionResult<SensitivityReport> {
    inputs.validate()?;
    if config.delta <= Decimal::ZERO || config.delta >= Decimal::ONE {
        return Err(DecisionError::invalid(
            "delta",
            "Perturbation must be strictly between 0 and 1",
        ));
    }

    let net = inputs.net_cash_flows()?;
    let pv_net = time_value::present_value(inputs.discount_rate, &net)?;
    let base_npv = compute_npv(inputs.capex, &net, inputs.discount_rate)?;

    let bars = SensitivityParameter::ALL
        .iter()
        .map(|&parameter| {
            let (high, low) = match parameter {
                SensitivityParameter::Capex => flex_capex(inputs.capex, pv_net, config.delta),
                SensitivityParameter::Opex => flex_opex(inputs, &net, config.delta),
                SensitivityParameter::CashFlow => flex_cash_flow(inputs, &net, config),
                SensitivityParameter::DiscountRate => flex_rate(inputs, &net, config.delta),
            };
            TornadoBar::from_scenarios(parameter, high, low)
        })
        .collect();

    Ok(SensitivityReport {
        base_npv,
        delta: config.delta,
        cash_flow_mode: config.cash_flow_mode,
        bars,
    })
}

// ---------------------------------------------------------------------------
// Per-parameter perturbations
// ---------------------------------------------------------------------------

type Scenarios = (DecisionResult<Money>, DecisionResult<Money>);

fn computable(
    parameter: SensitivityParameter,
    side: &str,
    npv: DecisionResult<Money>,
) -> Option<Money> {
    match npv {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(parameter = parameter.label(), side, error = %e, "scenario not computable");
            None
        }
    }
}

fn scaled(value: Money, factor: Rate, metric: &str) -> DecisionResult<Money> {
    value
        .checked_mul(factor)
        .ok_or_else(|| DecisionError::overflow(metric, "in sensitivity scenario"))
}

fn scale_all(values: &[Money], factor: Rate, metric: &str) -> DecisionResult<Vec<Money>> {
    values.iter().map(|v| scaled(*v, factor, metric)).collect()
}

/// The capex term is replaced by the signed variations
/// `[-capex(1+δ), -capex(1-δ)]`; the smaller outlay is the high case.
fn flex_capex(capex: Money, pv_net: Money, delta: Rate) -> Scenarios {
    let with_outlay = |factor: Rate| -> DecisionResult<Money> {
        let outlay = scaled(capex, factor, "CAPEX")?;
        pv_net
            .checked_sub(outlay)
            .ok_or_else(|| DecisionError::overflow("CAPEX", "in sensitivity scenario"))
    };
    (
        with_outlay(Decimal::ONE - delta),
        with_outlay(Decimal::ONE + delta),
    )
}

/// Each year's flow has the base opex added back and the flexed opex taken off.
fn flex_opex(inputs: &ProjectInputs, net: &[Money], delta: Rate) -> Scenarios {
    let with_opex = |factor: Rate| -> DecisionResult<Money> {
        let flexed = scaled(inputs.opex, factor, "OPEX")?;
        let adjusted = net
            .iter()
            .map(|cf| {
                cf.checked_add(inputs.opex)
                    .and_then(|v| v.checked_sub(flexed))
                    .ok_or_else(|| DecisionError::overflow("OPEX", "in sensitivity scenario"))
            })
            .collect::<DecisionResult<Vec<Money>>>()?;
        compute_npv(inputs.capex, &adjusted, inputs.discount_rate)
    };
    (
        with_opex(Decimal::ONE - delta),
        with_opex(Decimal::ONE + delta),
    )
}

fn flex_cash_flow(inputs: &ProjectInputs, net: &[Money], config: &SensitivityConfig) -> Scenarios {
    let delta = config.delta;
    let uplift = Decimal::ONE + delta;
    let high = scale_all(net, uplift, "Cash Flow");
    let low = match config.cash_flow_mode {
        CashFlowMode::Compounded => scale_all(net, uplift, "Cash Flow")
            .and_then(|up| scale_all(&up, Decimal::ONE - dec!(2) * delta, "Cash Flow")),
        CashFlowMode::Symmetric => scale_all(net, Decimal::ONE - delta, "Cash Flow"),
    };

    let npv = |flows: Vec<Money>| compute_npv(inputs.capex, &flows, inputs.discount_rate);
    (high.and_then(&npv), low.and_then(&npv))
}

/// The lower rate is the high case. A perturbed rate at or below -100% makes
/// only that side not computable.
fn flex_rate(inputs: &ProjectInputs, net: &[Money], delta: Rate) -> Scenarios {
    let at_rate = |factor: Rate| -> DecisionResult<Money> {
        let rate = scaled(inputs.discount_rate, factor, "Discount Rate")?;
        compute_npv(inputs.capex, net, rate)
    };
    (
        at_rate(Decimal::ONE - delta),
        at_rate(Decimal::ONE + delta),
    )
}

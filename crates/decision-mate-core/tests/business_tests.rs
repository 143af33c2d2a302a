use decision_mate_core::business::evaluator::{self, compute_irr, compute_npv};
use decision_mate_core::business::inputs::ProjectInputs;
use decision_mate_core::business::sensitivity::{self, SensitivityConfig, SensitivityParameter};
use decision_mate_core::DecisionError;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Evaluator known answers
// ===========================================================================

#[test]
fn test_default_business_case() {
    // Form defaults: capex 100k, opex 20k, 5 years at 10%, 40k inflows
    let input = ProjectInputs::uniform(dec!(100000), dec!(20000), 5, dec!(0.10), dec!(40000));
    let summary = evaluator::evaluate(&input).unwrap();

    assert!(
        (summary.npv - dec!(-24184.26)).abs() < dec!(0.01),
        "Expected NPV ≈ -24184.26, got {}",
        summary.npv
    );
    assert!(summary.irr.unwrap().abs() < dec!(0.000001));
    assert_eq!(summary.payback_period, Some(5));
    assert_eq!(summary.roi, Some(Decimal::ZERO));
}

#[test]
fn test_profitable_project() {
    // Net 30k a year for 5 years against 100k: IRR ≈ 15.24%
    let input = ProjectInputs::uniform(dec!(100000), dec!(10000), 5, dec!(0.08), dec!(40000));
    let summary = evaluator::evaluate(&input).unwrap();

    assert!(summary.npv > Decimal::ZERO);
    let irr = summary.irr.unwrap();
    assert!((irr - dec!(0.1524)).abs() < dec!(0.0001), "IRR was {irr}");
    // Cumulative: -100k, -70k, -40k, -10k, +20k
    assert_eq!(summary.payback_period, Some(4));
    assert_eq!(summary.roi, Some(dec!(0.5)));
}

#[test]
fn test_uneven_inflows_payback() {
    let input = ProjectInputs {
        capex: dec!(500),
        opex: dec!(50),
        years: 4,
        discount_rate: dec!(0.05),
        gross_inflows: vec![dec!(550), dec!(0), dec!(0), dec!(0)],
    };
    let summary = evaluator::evaluate(&input).unwrap();
    // Year 1 nets 500, exactly repaying the outlay
    assert_eq!(summary.payback_period, Some(1));
}

#[test]
fn test_negative_rate_accepted() {
    let input = ProjectInputs::uniform(dec!(1000), dec!(0), 2, dec!(-0.5), dec!(100));
    let summary = evaluator::evaluate(&input).unwrap();
    // -1000 + 100/0.5 + 100/0.25 = -400
    assert_eq!(summary.npv, dec!(-400));
}

#[test]
fn test_capex_zero_roi_not_computable() {
    let input = ProjectInputs::uniform(Decimal::ZERO, dec!(100), 3, dec!(0.1), dec!(50));
    let summary = evaluator::evaluate(&input).unwrap();
    assert_eq!(summary.roi, None);
}

#[test]
fn test_summary_serialises_sentinels_as_null() {
    let input = ProjectInputs::uniform(Decimal::ZERO, dec!(0), 3, dec!(0.1), dec!(50));
    let summary = evaluator::evaluate(&input).unwrap();
    let json = serde_json::to_value(&summary).unwrap();
    assert!(json["irr"].is_null());
    assert!(json["roi"].is_null());
    assert_eq!(json["payback_period"], 0);
}

#[test]
fn test_overflowing_net_flow_is_an_error_not_a_panic() {
    let input = ProjectInputs {
        capex: dec!(1),
        opex: dec!(-1),
        years: 1,
        discount_rate: dec!(0.1),
        gross_inflows: vec![Decimal::MAX],
    };
    assert!(matches!(
        evaluator::evaluate(&input),
        Err(DecisionError::NotComputable { .. })
    ));
    assert!(matches!(
        sensitivity::sensitivity(&input),
        Err(DecisionError::NotComputable { .. })
    ));
}

#[test]
fn test_irr_found_just_above_minus_one() {
    let irr = compute_irr(&[dec!(-100), dec!(0.5)]).unwrap();
    assert!((irr - dec!(-0.995)).abs() < dec!(0.000001), "IRR was {irr}");
}

#[test]
fn test_horizon_beyond_cap_rejected() {
    let input = ProjectInputs::uniform(dec!(100), dec!(0), 10_000, dec!(0.1), dec!(10));
    assert!(matches!(
        evaluator::evaluate(&input),
        Err(DecisionError::InvalidInput { ref field, .. }) if field == "years"
    ));
}

// ===========================================================================
// Sensitivity
// ===========================================================================

#[test]
fn test_steep_negative_rate_keeps_report() {
    // Valid rate; only the r(1 + δ) = -1.045 scenario has no discount factor
    let input = ProjectInputs::uniform(dec!(1000), dec!(0), 3, dec!(-0.95), dec!(100));
    let summary = evaluator::evaluate(&input).unwrap();
    let report = sensitivity::sensitivity(&input).unwrap();

    assert_eq!(report.base_npv, summary.npv);
    assert_eq!(report.bars.len(), 4);
    assert_eq!(report.impact(SensitivityParameter::DiscountRate), None);
    assert!(report.impact(SensitivityParameter::Capex).is_some());
    assert!(report.impact(SensitivityParameter::CashFlow).is_some());

    let analysis = evaluator::analyse_project(&input, &SensitivityConfig::default()).unwrap();
    assert_eq!(analysis.result.summary, summary);
}

#[test]
fn test_capex_bar_uses_signed_variations() {
    let input = ProjectInputs::uniform(dec!(100000), dec!(20000), 5, dec!(0.10), dec!(40000));
    let report = sensitivity::sensitivity(&input).unwrap();
    let pv = report.base_npv + dec!(100000);

    let bar = &report.bars[0];
    assert_eq!(bar.parameter, SensitivityParameter::Capex);
    assert!((bar.npv_high.unwrap() - (dec!(-90000) + pv)).abs() < dec!(0.0001));
    assert!((bar.npv_low.unwrap() - (dec!(-110000) + pv)).abs() < dec!(0.0001));
}

#[test]
fn test_every_parameter_reported() {
    let input = ProjectInputs::uniform(dec!(250000), dec!(35000), 8, dec!(0.07), dec!(90000));
    let report = sensitivity::sensitivity(&input).unwrap();
    let impacts = report.impacts();
    assert_eq!(impacts.len(), 4);
    for parameter in SensitivityParameter::ALL {
        assert!(impacts[&parameter] >= Decimal::ZERO);
    }
}

// ===========================================================================
// Properties
// ===========================================================================

/// Any representable Decimal, including the extremes.
fn any_decimal() -> impl Strategy<Value = Decimal> {
    (any::<u32>(), any::<u32>(), any::<u32>(), any::<bool>(), 0u32..=28)
        .prop_map(|(lo, mid, hi, negative, scale)| Decimal::from_parts(lo, mid, hi, negative, scale))
}

/// Mostly realistic amounts, with extremes mixed in.
fn amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        3 => (-1_000_000_000i64..1_000_000_000).prop_map(|c| Decimal::new(c, 2)),
        1 => any_decimal(),
    ]
}

fn rate() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        3 => (-9_999i64..50_000).prop_map(|bp| Decimal::new(bp, 4)),
        1 => any_decimal(),
    ]
}

proptest! {
    #[test]
    fn prop_extreme_inputs_never_panic(
        capex in amount(),
        opex in amount(),
        discount_rate in rate(),
        gross_inflows in prop::collection::vec(amount(), 1..30),
        symmetric in any::<bool>(),
    ) {
        let input = ProjectInputs {
            capex: capex.abs(),
            opex,
            years: gross_inflows.len() as u32,
            discount_rate,
            gross_inflows,
        };
        let config = SensitivityConfig {
            cash_flow_mode: if symmetric {
                sensitivity::CashFlowMode::Symmetric
            } else {
                sensitivity::CashFlowMode::Compounded
            },
            ..SensitivityConfig::default()
        };

        let summary = evaluator::evaluate(&input);
        let report = sensitivity::sensitivity_with(&input, &config);
        let _ = evaluator::analyse_project(&input, &config);

        if let Ok(summary) = summary {
            let report = report.unwrap();
            prop_assert_eq!(report.base_npv, summary.npv);
            prop_assert_eq!(report.bars.len(), 4);
        }
    }

    #[test]
    fn prop_npv_decreases_with_rate(
        capex in 1_000u32..1_000_000,
        inflow in 1u32..500_000,
        years in 1u32..20,
        rate_bp in 0u32..4_000,
        step_bp in 1u32..1_000,
    ) {
        let net = vec![Decimal::from(inflow); years as usize];
        let capex = Decimal::from(capex);
        let low_rate = Decimal::new(rate_bp as i64, 4);
        let high_rate = Decimal::new((rate_bp + step_bp) as i64, 4);

        let npv_low_rate = compute_npv(capex, &net, low_rate).unwrap();
        let npv_high_rate = compute_npv(capex, &net, high_rate).unwrap();
        prop_assert!(npv_high_rate < npv_low_rate);
    }

    #[test]
    fn prop_irr_zeroes_npv(
        capex in 1_000u32..1_000_000,
        inflows in prop::collection::vec(0u32..400_000, 1..15),
    ) {
        let input = ProjectInputs {
            capex: Decimal::from(capex),
            opex: Decimal::ZERO,
            years: inflows.len() as u32,
            discount_rate: dec!(0.1),
            gross_inflows: inflows.iter().map(|&i| Decimal::from(i)).collect(),
        };
        let summary = evaluator::evaluate(&input).unwrap();
        if let Some(irr) = summary.irr {
            let at_irr = compute_npv(input.capex, &input.net_cash_flows().unwrap(), irr).unwrap();
            prop_assert!(at_irr.abs() < dec!(0.000001), "NPV at IRR {} was {}", irr, at_irr);
        }
    }

    #[test]
    fn prop_payback_is_first_recovery(
        capex in 0u32..10_000,
        inflows in prop::collection::vec(-2_000i32..5_000, 1..12),
    ) {
        let input = ProjectInputs {
            capex: Decimal::from(capex),
            opex: Decimal::ZERO,
            years: inflows.len() as u32,
            discount_rate: dec!(0.05),
            gross_inflows: inflows.iter().map(|&i| Decimal::from(i)).collect(),
        };
        let summary = evaluator::evaluate(&input).unwrap();

        let mut cumulative = -input.capex;
        let mut expected = if cumulative >= Decimal::ZERO { Some(0) } else { None };
        for (i, cf) in input.net_cash_flows().unwrap().iter().enumerate() {
            cumulative += cf;
            if expected.is_none() && cumulative >= Decimal::ZERO {
                expected = Some(i as u32 + 1);
            }
        }
        prop_assert_eq!(summary.payback_period, expected);
    }

    #[test]
    fn prop_roi_none_iff_capex_zero(
        capex in 0u32..1_000,
        inflow in 0u32..1_000,
    ) {
        let input = ProjectInputs::uniform(Decimal::from(capex), Decimal::ZERO, 3, dec!(0.1), Decimal::from(inflow));
        let summary = evaluator::evaluate(&input).unwrap();
        prop_assert_eq!(summary.roi.is_none(), capex == 0);
    }
}

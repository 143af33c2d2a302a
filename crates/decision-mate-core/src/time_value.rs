use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::DecisionError;
use crate::types::{Money, Rate};
use crate::DecisionResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const MAX_BISECTION_ITERATIONS: u32 = 200;
const RATE_FLOOR: Decimal = dec!(-0.999999);
const RATE_CEILING: Decimal = dec!(100);

/// Candidate rates scanned for a sign change when Newton-Raphson fails.
const BRACKET_GRID: [Decimal; 15] = [
    RATE_FLOOR,
    dec!(-0.999),
    dec!(-0.99),
    dec!(-0.9),
    dec!(-0.5),
    dec!(-0.2),
    dec!(0),
    dec!(0.1),
    dec!(0.2),
    dec!(0.5),
    dec!(1),
    dec!(2),
    dec!(5),
    dec!(10),
    dec!(100),
];

fn check_rate(rate: Rate) -> DecisionResult<()> {
    if rate <= dec!(-1) {
        return Err(DecisionError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    Ok(())
}

fn overflow(function: &str, period: usize) -> DecisionError {
    DecisionError::overflow(function, format_args!("at period {period}"))
}

fn growth(rate: Rate, function: &str) -> DecisionResult<Decimal> {
    Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| overflow(function, 0))
}

/// Sum of `cash_flows` discounted at `rate`, where the first flow sits at
/// `first_period` (0 = undiscounted, 1 = one full period).
fn discounted_sum(
    rate: Rate,
    cash_flows: &[Money],
    first_period: usize,
    function: &str,
) -> DecisionResult<Money> {
    check_rate(rate)?;

    let one_plus_r = growth(rate, function)?;
    let mut discount = Decimal::ONE;
    let mut total = Decimal::ZERO;

    for (i, cf) in cash_flows.iter().enumerate() {
        let t = i + first_period;
        if t > 0 {
            discount = discount
                .checked_mul(one_plus_r)
                .ok_or_else(|| overflow(function, t))?;
        }
        if discount.is_zero() {
            return Err(DecisionError::DivisionByZero {
                context: format!("{function} discount factor at period {t}"),
            });
        }
        let pv = cf.checked_div(discount).ok_or_else(|| overflow(function, t))?;
        total = total.checked_add(pv).ok_or_else(|| overflow(function, t))?;
    }

    Ok(total)
}

/// Net Present Value of a series of cash flows. The first flow is at t = 0
/// and is not discounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> DecisionResult<Money> {
    discounted_sum(rate, cash_flows, 0, "NPV")
}

/// Present value of end-of-year flows: `Σ cf[i-1] / (1 + rate)^i` for i = 1..n.
pub fn present_value(rate: Rate, cash_flows: &[Money]) -> DecisionResult<Money> {
    discounted_sum(rate, cash_flows, 1, "PV")
}

/// Discount factors `1 / (1 + rate)^t` for t = 1..=periods.
pub fn discount_factors(rate: Rate, periods: usize) -> DecisionResult<Vec<Rate>> {
    check_rate(rate)?;

    let one_plus_r = growth(rate, "discount factor")?;
    let mut compounded = Decimal::ONE;
    let mut factors = Vec::with_capacity(periods);

    for t in 1..=periods {
        compounded = compounded
            .checked_mul(one_plus_r)
            .ok_or_else(|| overflow("discount factor", t))?;
        let factor = Decimal::ONE
            .checked_div(compounded)
            .ok_or_else(|| DecisionError::DivisionByZero {
                context: format!("discount factor at period {t}"),
            })?;
        factors.push(factor);
    }

    Ok(factors)
}

/// NPV and its derivative with respect to the rate, both at `rate`.
fn npv_with_derivative(rate: Rate, cash_flows: &[Money]) -> DecisionResult<(Money, Decimal)> {
    let one_plus_r = growth(rate, "IRR")?;
    let mut discount = Decimal::ONE;
    let mut value = Decimal::ZERO;
    let mut derivative = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount
                .checked_mul(one_plus_r)
                .ok_or_else(|| overflow("IRR", t))?;
        }
        if discount.is_zero() {
            return Err(DecisionError::DivisionByZero {
                context: format!("IRR discount factor at period {t}"),
            });
        }
        let term = cf.checked_div(discount).ok_or_else(|| overflow("IRR", t))?;
        value = value.checked_add(term).ok_or_else(|| overflow("IRR", t))?;

        if t > 0 {
            let t_dec = Decimal::from(t as i64);
            let slope = discount
                .checked_mul(one_plus_r)
                .zip(t_dec.checked_mul(*cf))
                .and_then(|(d, weighted)| weighted.checked_div(d))
                .ok_or_else(|| overflow("IRR", t))?;
            derivative = derivative
                .checked_sub(slope)
                .ok_or_else(|| overflow("IRR", t))?;
        }
    }

    Ok((value, derivative))
}

/// Internal Rate of Return.
///
/// Newton-Raphson from `guess`, falling back to bisection over a scanned
/// bracket. Cash flows without a sign change have no real root and are
/// rejected with [`DecisionError::FinancialImpossibility`]. Every other
/// failure is a numerical one (convergence, overflow, vanishing discount
/// factor). The solver never panics: all arithmetic is checked.
pub fn irr(cash_flows: &[Money], guess: Rate) -> DecisionResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(DecisionError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let has_inflow = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    let has_outflow = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    if !(has_inflow && has_outflow) {
        return Err(DecisionError::FinancialImpossibility(
            "IRR undefined: cash flows never change sign".into(),
        ));
    }

    match newton_raphson(cash_flows, guess) {
        Ok(rate) => Ok(rate),
        Err(e) => {
            tracing::debug!(error = %e, "Newton-Raphson failed, falling back to bisection");
            bisection(cash_flows)
        }
    }
}

fn newton_raphson(cash_flows: &[Money], guess: Rate) -> DecisionResult<Rate> {
    let mut rate = guess.clamp(RATE_FLOOR, RATE_CEILING);
    let mut last_delta = Decimal::MAX;

    for i in 0..MAX_IRR_ITERATIONS {
        let (value, derivative) = npv_with_derivative(rate, cash_flows)?;

        if value.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if derivative.is_zero() {
            return Err(DecisionError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: value,
            });
        }

        let step = value
            .checked_div(derivative)
            .ok_or_else(|| overflow("IRR", 0))?;
        rate = rate
            .checked_sub(step)
            .unwrap_or(if step > Decimal::ZERO { RATE_FLOOR } else { RATE_CEILING })
            .clamp(RATE_FLOOR, RATE_CEILING);
        last_delta = value;
    }

    Err(DecisionError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta,
    })
}

fn bisection(cash_flows: &[Money]) -> DecisionResult<Rate> {
    let mut bracket = None;
    let mut previous: Option<(Rate, Money)> = None;

    for &rate in BRACKET_GRID.iter() {
        let value = match npv(rate, cash_flows) {
            Ok(v) => v,
            Err(_) => {
                previous = None;
                continue;
            }
        };
        if value.is_zero() {
            return Ok(rate);
        }
        if let Some((prev_rate, prev_value)) = previous {
            if prev_value.is_sign_negative() != value.is_sign_negative() {
                bracket = Some((prev_rate, prev_value, rate));
                break;
            }
        }
        previous = Some((rate, value));
    }

    let (mut low, mut low_value, mut high) = bracket.ok_or(DecisionError::ConvergenceFailure {
        function: "IRR bisection".into(),
        iterations: 0,
        last_delta: Decimal::ZERO,
    })?;

    let mut mid_value = Decimal::MAX;
    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = (low + high) / dec!(2);
        mid_value = npv(mid, cash_flows)?;

        if mid_value.abs() < CONVERGENCE_THRESHOLD {
            return Ok(mid);
        }

        if mid_value.is_sign_negative() == low_value.is_sign_negative() {
            low = mid;
            low_value = mid_value;
        } else {
            high = mid;
        }
    }

    Err(DecisionError::ConvergenceFailure {
        function: "IRR bisection".into(),
        iterations: MAX_BISECTION_ITERATIONS,
        last_delta: mid_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // -1000 + 300/1.1 + 400/1.21 + 500/1.331 ≈ -21.04
        assert!((result - dec!(-21.04)).abs() < dec!(0.01));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        assert_eq!(npv(dec!(0.0), &cfs).unwrap(), dec!(50));
    }

    #[test]
    fn test_present_value_discounts_first_flow() {
        let result = present_value(dec!(0.10), &[dec!(110)]).unwrap();
        assert_eq!(result, dec!(100));
    }

    #[test]
    fn test_negative_rate_amplifies() {
        let result = present_value(dec!(-0.5), &[dec!(100)]).unwrap();
        assert_eq!(result, dec!(200));
    }

    #[test]
    fn test_rate_of_minus_one_rejected() {
        let err = present_value(dec!(-1), &[dec!(100)]).unwrap_err();
        assert!(matches!(err, DecisionError::InvalidInput { .. }));
    }

    #[test]
    fn test_overflow_is_not_computable() {
        let flows = vec![dec!(1); 30];
        let err = present_value(dec!(99), &flows).unwrap_err();
        assert!(matches!(err, DecisionError::NotComputable { .. }));
    }

    #[test]
    fn test_discount_factors() {
        let factors = discount_factors(dec!(0.25), 2).unwrap();
        assert_eq!(factors, vec![dec!(0.8), dec!(0.64)]);
    }

    #[test]
    fn test_irr_basic() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let result = irr(&cfs, dec!(0.10)).unwrap();
        // IRR ≈ 9.7%
        assert!((result - dec!(0.097)).abs() < dec!(0.001));
        assert!(npv(result, &cfs).unwrap().abs() < dec!(0.000001));
    }

    #[test]
    fn test_irr_no_sign_change() {
        let err = irr(&[dec!(100), dec!(50), dec!(50)], dec!(0.1)).unwrap_err();
        assert!(matches!(err, DecisionError::FinancialImpossibility(_)));

        let err = irr(&[dec!(-100), dec!(-50), dec!(0)], dec!(0.1)).unwrap_err();
        assert!(matches!(err, DecisionError::FinancialImpossibility(_)));
    }

    #[test]
    fn test_irr_requires_two_flows() {
        let err = irr(&[dec!(-100)], dec!(0.1)).unwrap_err();
        assert!(matches!(err, DecisionError::InsufficientData(_)));
    }

    #[test]
    fn test_bisection_matches_newton() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let newton = irr(&cfs, dec!(0.10)).unwrap();
        let bisected = bisection(&cfs).unwrap();
        assert!((newton - bisected).abs() < dec!(0.000001));
    }

    #[test]
    fn test_irr_root_just_above_minus_one() {
        // -100 + 0.5 / (1 + r) = 0  =>  r = -0.995
        let cfs = vec![dec!(-100), dec!(0.5)];
        let result = irr(&cfs, dec!(0.10)).unwrap();
        assert!((result - dec!(-0.995)).abs() < dec!(0.000001), "IRR was {result}");

        let bisected = bisection(&cfs).unwrap();
        assert!((bisected - dec!(-0.995)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_huge_rate_is_not_computable() {
        let err = present_value(Decimal::MAX, &[dec!(1)]).unwrap_err();
        assert!(matches!(err, DecisionError::NotComputable { .. }));
    }

    #[test]
    fn test_irr_from_extreme_guess() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let result = irr(&cfs, dec!(100)).unwrap();
        assert!(npv(result, &cfs).unwrap().abs() < dec!(0.000001));
    }
}

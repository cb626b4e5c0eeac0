use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::decimal::{Money, Rate, MAX_SCALE};
use crate::errors::{LoanError, Result};
use crate::interest::discount_factor;
use crate::types::TermResolution;

/// slack allowed on the logarithmic term before rounding up
const TERM_TOLERANCE: f64 = 1e-9;

/// fixed installment that retires `principal` over `n` periods
///
/// The annuity amount is kept at full internal precision and rounded up in its
/// last digit, so it always retires the loan within `n` periods. Round with
/// `Money::round_minor` before presenting it as a billable amount.
pub fn compute_installment(principal: Money, rate: Rate, n: u32) -> Result<Money> {
    if n == 0 {
        return Err(LoanError::InvalidTerm { periods: n });
    }
    if !principal.is_positive() {
        return Err(LoanError::InvalidPrincipal { principal });
    }
    if rate.is_negative() {
        return Err(LoanError::InvalidInterestRate { rate });
    }

    let installment = Money::from_decimal_ceil(exact_installment(principal, rate, n)?);
    if rate.is_zero() {
        return Ok(installment);
    }

    // the annuity always exceeds one period's interest, even when the
    // discount factor is too small to show up in the quotient
    let interest = Money::from_decimal_ceil(periodic_interest(principal, rate)?);
    Ok(installment.max(interest + Money::from_minor(1, MAX_SCALE)))
}

/// unrounded annuity amount P * r / (1 - (1 + r)^-n)
pub fn exact_installment(principal: Money, rate: Rate, n: u32) -> Result<Decimal> {
    if n == 0 {
        return Err(LoanError::InvalidTerm { periods: n });
    }
    if rate.is_zero() {
        return Ok(principal.as_decimal() / Decimal::from(n));
    }

    let interest = periodic_interest(principal, rate)?;
    interest
        .checked_div(Decimal::ONE - discount_factor(rate, n))
        .ok_or_else(|| LoanError::CalculationError {
            message: format!("installment undefined for rate {} over {} periods", rate, n),
        })
}

fn periodic_interest(principal: Money, rate: Rate) -> Result<Decimal> {
    principal
        .as_decimal()
        .checked_mul(rate.as_decimal())
        .ok_or_else(|| LoanError::CalculationError {
            message: format!("interest overflow for principal {}", principal),
        })
}

/// number of periods needed to retire `principal` with a fixed `installment`
pub fn compute_term(principal: Money, rate: Rate, installment: Money) -> Result<TermResolution> {
    if !installment.is_positive() {
        return Err(LoanError::InvalidInstallment { installment });
    }
    if !principal.is_positive() {
        return Err(LoanError::InvalidPrincipal { principal });
    }
    if rate.is_negative() {
        return Err(LoanError::InvalidInterestRate { rate });
    }

    if rate.is_zero() {
        let periods = (principal.as_decimal() / installment.as_decimal())
            .round_dp_with_strategy(0, RoundingStrategy::ToPositiveInfinity);
        return to_periods(periods.to_f64());
    }

    // interest alone consumes the installment
    if installment <= principal.accrue(rate) {
        return Ok(TermResolution::Unbounded);
    }

    let r = to_f64(rate.as_decimal())?;
    let coverage = to_f64(principal.as_decimal() * rate.as_decimal() / installment.as_decimal())?;
    let periods = -(-coverage).ln_1p() / r.ln_1p();
    if !periods.is_finite() {
        return Ok(TermResolution::Unbounded);
    }

    to_periods(Some((periods - TERM_TOLERANCE).ceil().max(1.0)))
}

fn to_f64(value: Decimal) -> Result<f64> {
    value.to_f64().ok_or_else(|| LoanError::CalculationError {
        message: format!("{} is not representable as f64", value),
    })
}

fn to_periods(periods: Option<f64>) -> Result<TermResolution> {
    match periods {
        Some(p) if p >= 1.0 && p <= f64::from(u32::MAX) => Ok(TermResolution::Finite(p as u32)),
        Some(p) if p > f64::from(u32::MAX) => Ok(TermResolution::Unbounded),
        _ => Err(LoanError::CalculationError {
            message: format!("term {:?} out of range", periods),
        }),
    }
}

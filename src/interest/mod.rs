use rust_decimal::{Decimal, MathematicalOps};

use crate::decimal::Rate;
use crate::errors::{LoanError, Result};

/// convert an annual percentage rate into the rate for one period
pub fn periodic_rate(annual_rate_percent: Decimal, periods_per_year: u32) -> Result<Rate> {
    if periods_per_year == 0 {
        return Err(LoanError::InvalidConfiguration {
            message: "periods per year must be positive".to_string(),
        });
    }
    let annual = Rate::from_percent(annual_rate_percent);
    if annual.is_negative() {
        return Err(LoanError::InvalidInterestRate { rate: annual });
    }

    Ok(Rate::from_decimal(annual.as_decimal() / Decimal::from(periods_per_year)))
}

/// compound growth factor (1 + rate)^n
pub fn growth_factor(rate: Rate, n: u32) -> Result<Decimal> {
    if rate.is_zero() {
        return Ok(Decimal::ONE);
    }

    (Decimal::ONE + rate.as_decimal())
        .checked_powu(u64::from(n))
        .ok_or_else(|| LoanError::CalculationError {
            message: format!("growth factor overflow for rate {} over {} periods", rate, n),
        })
}

/// present-value factor (1 + rate)^-n
///
/// Once (1 + rate)^n leaves the decimal range the factor is held at the
/// smallest positive decimal instead of failing.
pub fn discount_factor(rate: Rate, n: u32) -> Decimal {
    if rate.is_zero() {
        return Decimal::ONE;
    }

    let smallest = Decimal::new(1, 28);
    (Decimal::ONE + rate.as_decimal())
        .checked_powu(u64::from(n))
        .and_then(|g| Decimal::ONE.checked_div(g))
        .map_or(smallest, |v| v.max(smallest))
}

/// effective annual rate (APY) for a nominal annual percentage compounded per period
pub fn effective_annual_rate(annual_rate_percent: Decimal, periods_per_year: u32) -> Result<Rate> {
    let rate = periodic_rate(annual_rate_percent, periods_per_year)?;
    let factor = growth_factor(rate, periods_per_year)?;
    Ok(Rate::from_decimal(factor - Decimal::ONE))
}

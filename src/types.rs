use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LoanError, Result};

/// nominal day of month on which payments fall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorDay {
    /// fixed day, clamped to the month length in short months
    Day(u8),
    /// last calendar day of every month
    LastDay,
}

impl AnchorDay {
    /// validated constructor for a fixed day
    pub fn day(day: u8) -> Result<Self> {
        let anchor = AnchorDay::Day(day);
        anchor.validate()?;
        Ok(anchor)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            AnchorDay::Day(day) if !(1..=31).contains(&day) => {
                Err(LoanError::InvalidAnchorDay { day })
            }
            _ => Ok(()),
        }
    }
}

/// outcome of inverting the installment formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermResolution {
    /// number of whole periods, a partial final period counts as one
    Finite(u32),
    /// installment never exceeds accruing interest
    Unbounded,
}

impl TermResolution {
    pub fn periods(&self) -> Option<u32> {
        match self {
            TermResolution::Finite(n) => Some(*n),
            TermResolution::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, TermResolution::Unbounded)
    }
}

/// loan inputs as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// annual rate in percent, 12 means 12%
    pub annual_rate_percent: Decimal,
    pub term_periods: Option<u32>,
    /// when set, authoritative over `term_periods`
    pub periodic_installment: Option<Money>,
    pub anchor_day: AnchorDay,
    pub start_date: NaiveDate,
    /// display label only
    #[serde(default)]
    pub currency: String,
}

/// one row of an amortization schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub sequence_number: u32,
    pub due_date: NaiveDate,
    pub total_payment: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub remaining_principal_after: Money,
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::nth_cycle_date_every;
use crate::decimal::{Money, Rate, DEFAULT_MINOR_UNITS};
use crate::errors::{LoanError, Result};
use crate::types::{AnchorDay, Installment};

/// knobs shared by every schedule build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    pub minor_units: u32,
    pub months_per_period: u32,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            minor_units: DEFAULT_MINOR_UNITS,
            months_per_period: 1,
        }
    }
}

/// amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub principal: Money,
    pub rate: Rate,
    /// nominal installment; the final row may differ
    pub installment: Money,
    pub start_date: NaiveDate,
    pub anchor_day: AnchorDay,
    /// rounding and cycle length the rows were built with
    #[serde(default)]
    pub options: ScheduleOptions,
    pub installments: Vec<Installment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl Schedule {
    /// build a monthly schedule with two minor units
    pub fn build(
        principal: Money,
        rate: Rate,
        term_periods: u32,
        installment: Money,
        start_date: NaiveDate,
        anchor_day: AnchorDay,
    ) -> Result<Self> {
        Self::build_with(
            principal,
            rate,
            term_periods,
            installment,
            start_date,
            anchor_day,
            ScheduleOptions::default(),
        )
    }

    /// build a schedule, splitting each installment into principal and interest
    ///
    /// Interest is rounded half-up to `options.minor_units` every period. The
    /// final row retires whatever balance is left, so principal components sum
    /// to `principal` exactly and the final payment may differ from
    /// `installment`. Should the balance reach zero early, the remaining rows
    /// carry zero amounts.
    pub fn build_with(
        principal: Money,
        rate: Rate,
        term_periods: u32,
        installment: Money,
        start_date: NaiveDate,
        anchor_day: AnchorDay,
        options: ScheduleOptions,
    ) -> Result<Self> {
        if term_periods == 0 {
            return Err(LoanError::InvalidTerm { periods: term_periods });
        }
        if !principal.is_positive() {
            return Err(LoanError::InvalidPrincipal { principal });
        }
        if !installment.is_positive() {
            return Err(LoanError::InvalidInstallment { installment });
        }
        if rate.is_negative() {
            return Err(LoanError::InvalidInterestRate { rate });
        }
        anchor_day.validate()?;

        let first_interest = principal.accrue_rounded(rate, options.minor_units);
        if term_periods > 1 && installment <= first_interest {
            return Err(LoanError::NonAmortizingSchedule {
                period: 1,
                installment,
                interest: first_interest,
            });
        }

        let mut installments = Vec::with_capacity(term_periods as usize);
        let mut balance = principal;

        for k in 1..=term_periods {
            let due_date = nth_cycle_date_every(start_date, anchor_day, k, options.months_per_period)?;
            let interest_component = balance.accrue_rounded(rate, options.minor_units);

            let principal_component = if k == term_periods {
                balance
            } else {
                let portion = installment - interest_component;
                if !portion.is_positive() {
                    return Err(LoanError::NonAmortizingSchedule {
                        period: k,
                        installment,
                        interest: interest_component,
                    });
                }
                portion.min(balance)
            };

            balance = (balance - principal_component).max(Money::ZERO);

            installments.push(Installment {
                sequence_number: k,
                due_date,
                total_payment: principal_component + interest_component,
                principal_component,
                interest_component,
                remaining_principal_after: balance,
            });
        }

        let total_interest = installments.iter().map(|i| i.interest_component).sum();
        let total_payment = installments.iter().map(|i| i.total_payment).sum();

        Ok(Self {
            principal,
            rate,
            installment,
            start_date,
            anchor_day,
            options,
            installments,
            total_interest,
            total_payment,
        })
    }

    pub fn term_periods(&self) -> u32 {
        self.installments.len() as u32
    }

    /// get installment by 1-based sequence number
    pub fn get(&self, sequence_number: u32) -> Option<&Installment> {
        sequence_number
            .checked_sub(1)
            .and_then(|idx| self.installments.get(idx as usize))
    }

    /// remaining principal after the given installment, principal before the first
    pub fn balance_after(&self, sequence_number: u32) -> Money {
        if sequence_number == 0 {
            return self.principal;
        }
        self.get(sequence_number)
            .or_else(|| self.installments.last())
            .map(|i| i.remaining_principal_after)
            .unwrap_or(self.principal)
    }

    /// first installment due on or after `as_of`
    pub fn next_due(&self, as_of: NaiveDate) -> Option<&Installment> {
        self.installments.iter().find(|i| i.due_date >= as_of)
    }

    /// number of installments falling due strictly before `as_of`
    pub fn paid_through(&self, as_of: NaiveDate) -> u32 {
        self.installments.iter().take_while(|i| i.due_date < as_of).count() as u32
    }

    /// principal still owed on `as_of` if every earlier installment was paid
    pub fn outstanding_as_of(&self, as_of: NaiveDate) -> Money {
        self.balance_after(self.paid_through(as_of))
    }

    pub fn total_principal(&self) -> Money {
        self.installments.iter().map(|i| i.principal_component).sum()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LoanError::CalculationError {
            message: e.to_string(),
        })
    }
}

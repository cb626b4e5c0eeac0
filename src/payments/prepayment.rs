use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::TermResolution;

use super::amortization::Schedule;
use super::solver::{compute_installment, compute_term};

/// how a lump-sum prepayment reshapes the rest of the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrepaymentStrategy {
    /// keep the remaining term, lower the installment
    ReduceInstallment,
    /// keep the installment, shorten the term
    ReduceTerm,
}

/// outcome of a prepayment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentResult {
    pub strategy: PrepaymentStrategy,
    /// portion of the prepayment that reduced principal
    pub amount_applied: Money,
    pub after_installment: u32,
    pub old_installment: Money,
    pub new_installment: Option<Money>,
    pub old_remaining_periods: u32,
    pub new_remaining_periods: u32,
    pub interest_saved: Money,
    /// rows replacing everything after `after_installment`; `None` once settled
    pub remainder: Option<Schedule>,
}

impl PrepaymentResult {
    pub fn is_settled(&self) -> bool {
        self.remainder.is_none()
    }
}

/// apply `amount` against principal right after installment `after` and rebuild the rest
///
/// The remainder keeps the rounding and cycle length of `schedule`.
pub fn apply_prepayment(
    schedule: &Schedule,
    after: u32,
    amount: Money,
    strategy: PrepaymentStrategy,
) -> Result<PrepaymentResult> {
    if !amount.is_positive() {
        return Err(LoanError::InvalidPrepayment { amount });
    }
    let term = schedule.term_periods();
    if after >= term {
        return Err(LoanError::InvalidTerm { periods: after });
    }

    let old_remaining_periods = term - after;
    let old_interest: Money = schedule.installments[after as usize..]
        .iter()
        .map(|i| i.interest_component)
        .sum();
    let balance = schedule.balance_after(after);

    if amount >= balance {
        return Ok(PrepaymentResult {
            strategy,
            amount_applied: balance,
            after_installment: after,
            old_installment: schedule.installment,
            new_installment: None,
            old_remaining_periods,
            new_remaining_periods: 0,
            interest_saved: old_interest,
            remainder: None,
        });
    }

    let options = schedule.options;
    let new_balance = balance - amount;
    let (installment, periods) = match strategy {
        PrepaymentStrategy::ReduceInstallment => {
            let installment = compute_installment(new_balance, schedule.rate, old_remaining_periods)?
                .round_billable(options.minor_units);
            (installment, old_remaining_periods)
        }
        PrepaymentStrategy::ReduceTerm => {
            let periods = match compute_term(new_balance, schedule.rate, schedule.installment)? {
                TermResolution::Finite(n) => n.min(old_remaining_periods),
                TermResolution::Unbounded => {
                    return Err(LoanError::UnboundedTerm {
                        principal: new_balance,
                        installment: schedule.installment,
                    });
                }
            };
            (schedule.installment, periods)
        }
    };

    // the remainder restarts its cycle count at the next unpaid due date
    let next_due = schedule.installments[after as usize].due_date;
    let mut remainder = Schedule::build_with(
        new_balance,
        schedule.rate,
        periods,
        installment,
        next_due,
        schedule.anchor_day,
        options,
    )?;
    for row in remainder.installments.iter_mut() {
        row.sequence_number += after;
    }

    Ok(PrepaymentResult {
        strategy,
        amount_applied: amount,
        after_installment: after,
        old_installment: schedule.installment,
        new_installment: Some(installment),
        old_remaining_periods,
        new_remaining_periods: periods,
        interest_saved: old_interest - remainder.total_interest,
        remainder: Some(remainder),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::payments::ScheduleOptions;
    use crate::types::AnchorDay;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn schedule(term: u32) -> Schedule {
        let principal = Money::from_major(100_000);
        let rate = Rate::from_decimal(dec!(0.01));
        let installment = compute_installment(principal, rate, term).unwrap().round_minor(2);
        Schedule::build(
            principal,
            rate,
            term,
            installment,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            AnchorDay::Day(1),
        ).unwrap()
    }

    #[test]
    fn test_reduce_installment() {
        let original = schedule(24);
        let result = apply_prepayment(
            &original,
            6,
            Money::from_major(20_000),
            PrepaymentStrategy::ReduceInstallment,
        ).unwrap();

        let new_installment = result.new_installment.unwrap();
        assert!(new_installment < original.installment);
        assert_eq!(result.new_remaining_periods, 18);
        assert!(result.interest_saved.is_positive());

        let remainder = result.remainder.unwrap();
        assert_eq!(remainder.installments.len(), 18);
        assert_eq!(remainder.installments[0].sequence_number, 7);
        assert_eq!(remainder.installments[0].due_date, original.installments[6].due_date);
        assert_eq!(remainder.installments.last().unwrap().due_date, original.installments[23].due_date);
        assert_eq!(remainder.principal, original.balance_after(6) - Money::from_major(20_000));
        assert_eq!(remainder.total_principal(), remainder.principal);
    }

    #[test]
    fn test_reduce_term() {
        let original = schedule(24);
        let result = apply_prepayment(
            &original,
            6,
            Money::from_major(20_000),
            PrepaymentStrategy::ReduceTerm,
        ).unwrap();

        assert_eq!(result.new_installment, Some(original.installment));
        assert!(result.new_remaining_periods < 18);
        assert!(result.interest_saved.is_positive());

        let remainder = result.remainder.unwrap();
        assert_eq!(remainder.term_periods(), result.new_remaining_periods);
        assert_eq!(remainder.installments.last().unwrap().remaining_principal_after, Money::ZERO);
    }

    #[test]
    fn test_prepayment_settles_loan() {
        let original = schedule(12);
        let balance = original.balance_after(3);
        let result = apply_prepayment(
            &original,
            3,
            balance + Money::from_major(50),
            PrepaymentStrategy::ReduceTerm,
        ).unwrap();

        assert!(result.is_settled());
        assert_eq!(result.amount_applied, balance);
        assert_eq!(result.new_remaining_periods, 0);
        let remaining_interest: Money = original.installments[3..].iter().map(|i| i.interest_component).sum();
        assert_eq!(result.interest_saved, remaining_interest);
    }

    #[test]
    fn test_invalid_prepayment() {
        let original = schedule(12);
        assert_eq!(
            apply_prepayment(&original, 3, Money::ZERO, PrepaymentStrategy::ReduceTerm),
            Err(LoanError::InvalidPrepayment { amount: Money::ZERO })
        );
        assert_eq!(
            apply_prepayment(&original, 12, Money::from_major(10), PrepaymentStrategy::ReduceTerm),
            Err(LoanError::InvalidTerm { periods: 12 })
        );
    }

    #[test]
    fn test_remainder_keeps_quarterly_cycle() {
        let options = ScheduleOptions { minor_units: 2, months_per_period: 3 };
        let original = Schedule::build_with(
            Money::from_major(8_000),
            Rate::from_decimal(dec!(0.02)),
            8,
            Money::from_major(1_100),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            AnchorDay::Day(15),
            options,
        ).unwrap();

        let result = apply_prepayment(&original, 2, Money::from_major(1_000), PrepaymentStrategy::ReduceInstallment).unwrap();
        let remainder = result.remainder.unwrap();
        assert_eq!(remainder.options, options);
        let dates: Vec<NaiveDate> = remainder.installments.iter().map(|i| i.due_date).collect();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2024, 10, 15).unwrap());
        assert_eq!(remainder.installments.last().unwrap().due_date, original.installments[7].due_date);
    }

    #[test]
    fn test_reduce_installment_leaving_cents() {
        let original = Schedule::build(
            Money::from_major(1_200),
            Rate::ZERO,
            12,
            Money::from_major(100),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            AnchorDay::Day(1),
        ).unwrap();

        let result = apply_prepayment(
            &original,
            0,
            Money::from_decimal(dec!(1199.95)),
            PrepaymentStrategy::ReduceInstallment,
        ).unwrap();

        assert_eq!(result.new_installment, Some(Money::from_minor(1, 2)));
        let remainder = result.remainder.unwrap();
        assert_eq!(remainder.installments.len(), 12);
        assert_eq!(remainder.total_principal(), Money::from_minor(5, 2));
        assert_eq!(remainder.installments.last().unwrap().remaining_principal_after, Money::ZERO);
    }
}

//! payment date resolution for anchor days
//!
//! Every billing cycle falls on the anchor day of its target month. Anchor days
//! past the end of a short month clamp to that month's last day, and the
//! `LastDay` sentinel always resolves to the month length.

use chrono::{Datelike, Months, NaiveDate};

use crate::errors::{LoanError, Result};
use crate::types::AnchorDay;

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

/// day of month the anchor falls on in the given month
pub fn effective_day(anchor: AnchorDay, year: i32, month: u32) -> Result<u32> {
    anchor.validate()?;
    let length = days_in_month(year, month);
    Ok(match anchor {
        AnchorDay::LastDay => length,
        AnchorDay::Day(day) => u32::from(day).min(length),
    })
}

/// resolved payment date in the month containing `date`
pub fn cycle_date_in_month(date: NaiveDate, anchor: AnchorDay) -> Result<NaiveDate> {
    let day = effective_day(anchor, date.year(), date.month())?;
    NaiveDate::from_ymd_opt(date.year(), date.month(), day).ok_or_else(|| LoanError::InvalidDate {
        message: format!("no day {} in {}-{:02}", day, date.year(), date.month()),
    })
}

/// due date of the n-th billing cycle, cycle 1 falling in the start month
pub fn nth_cycle_date(start_date: NaiveDate, anchor: AnchorDay, n: u32) -> Result<NaiveDate> {
    nth_cycle_date_every(start_date, anchor, n, 1)
}

/// due date of the n-th cycle when cycles are `months_per_cycle` months apart
pub fn nth_cycle_date_every(
    start_date: NaiveDate,
    anchor: AnchorDay,
    n: u32,
    months_per_cycle: u32,
) -> Result<NaiveDate> {
    if n == 0 {
        return Err(LoanError::InvalidTerm { periods: n });
    }
    if months_per_cycle == 0 {
        return Err(LoanError::InvalidConfiguration {
            message: "months per cycle must be positive".to_string(),
        });
    }

    let offset = (n - 1)
        .checked_mul(months_per_cycle)
        .ok_or_else(|| LoanError::InvalidDate {
            message: format!("cycle {} is out of range", n),
        })?;
    let target = first_of_month(start_date)
        .checked_add_months(Months::new(offset))
        .ok_or_else(|| LoanError::InvalidDate {
            message: format!("cycle {} after {} is out of range", n, start_date),
        })?;

    cycle_date_in_month(target, anchor)
}

/// first payment date on or after `reference_date`
///
/// A reference date that is itself a due date resolves to that date. Callers
/// wanting the next cycle strictly after a due date pass the following day.
pub fn next_cycle_date(reference_date: NaiveDate, anchor: AnchorDay) -> Result<NaiveDate> {
    let this_month = cycle_date_in_month(reference_date, anchor)?;
    if reference_date <= this_month {
        return Ok(this_month);
    }

    let next_month = first_of_month(reference_date)
        .checked_add_months(Months::new(1))
        .ok_or_else(|| LoanError::InvalidDate {
            message: format!("no month after {}", reference_date),
        })?;
    cycle_date_in_month(next_month, anchor)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

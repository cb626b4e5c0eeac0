use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::calendar::next_cycle_date;
use crate::config::{EngineConfig, ReminderConfig};
use crate::errors::{LoanError, Result};
use crate::payments::Schedule;
use crate::types::AnchorDay;

/// reminder request for one due date
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderSpec<Tz: TimeZone> {
    pub due_date: NaiveDate,
    pub lead_days: u32,
    pub time_of_day: NaiveTime,
    pub zone: Tz,
}

impl<Tz: TimeZone> ReminderSpec<Tz> {
    pub fn instant(&self) -> Result<DateTime<Utc>> {
        reminder_instant(self.due_date, self.lead_days, self.time_of_day, &self.zone)
    }
}

/// next reminder to fire and the due date it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingReminder {
    pub due_date: NaiveDate,
    pub instant: DateTime<Utc>,
}

/// absolute instant of `time_of_day` in `zone`, `lead_days` before `due_date`
///
/// Nothing is compared against the current time here. A local time repeated by
/// a DST fold maps to its earliest instant; a local time skipped by a DST gap
/// is rejected.
pub fn reminder_instant<Tz: TimeZone>(
    due_date: NaiveDate,
    lead_days: u32,
    time_of_day: NaiveTime,
    zone: &Tz,
) -> Result<DateTime<Utc>> {
    let day = due_date
        .checked_sub_days(Days::new(u64::from(lead_days)))
        .ok_or_else(|| LoanError::InvalidDate {
            message: format!("{} days before {} is out of range", lead_days, due_date),
        })?;
    let local = day.and_time(time_of_day);

    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(LoanError::InvalidDate {
            message: format!("{} does not exist in the reminder time zone", local),
        }),
    }
}

/// first reminder strictly after `now` for a loan paid on `anchor`
///
/// The search starts from the due date resolved for the zone-local date of
/// `now`. When that reminder is already due or past, including a payment due
/// today, it rolls forward cycle by cycle.
pub fn next_reminder<Tz: TimeZone>(
    now: DateTime<Utc>,
    anchor: AnchorDay,
    lead_days: u32,
    time_of_day: NaiveTime,
    zone: &Tz,
) -> Result<UpcomingReminder> {
    let today = now.with_timezone(zone).date_naive();
    let mut due_date = next_cycle_date(today, anchor)?;

    // every pass moves at least one month forward
    let max_passes = lead_days / 28 + 2;
    for _ in 0..=max_passes {
        let instant = reminder_instant(due_date, lead_days, time_of_day, zone)?;
        if instant > now {
            return Ok(UpcomingReminder { due_date, instant });
        }
        let following = due_date.succ_opt().ok_or_else(|| LoanError::InvalidDate {
            message: format!("no day after {}", due_date),
        })?;
        due_date = next_cycle_date(following, anchor)?;
    }

    Err(LoanError::CalculationError {
        message: format!("no reminder found after {} with {} lead days", now, lead_days),
    })
}

/// computes reminders against an injectable clock
pub struct ReminderPlanner<'a, Tz: TimeZone> {
    time: &'a SafeTimeProvider,
    zone: Tz,
    config: ReminderConfig,
}

impl<'a, Tz: TimeZone> ReminderPlanner<'a, Tz> {
    pub fn new(time: &'a SafeTimeProvider, zone: Tz, config: ReminderConfig) -> Self {
        Self { time, zone, config }
    }

    /// planner using the reminder defaults of `config`
    pub fn from_config(time: &'a SafeTimeProvider, zone: Tz, config: &EngineConfig) -> Self {
        Self::new(time, zone, config.reminder.clone())
    }

    /// next reminder for a loan anchored on `anchor`
    pub fn next_for_anchor(&self, anchor: AnchorDay) -> Result<UpcomingReminder> {
        let now = self.time.now();
        let upcoming = next_reminder(
            now,
            anchor,
            self.config.lead_days,
            self.config.time_of_day,
            &self.zone,
        )?;
        log::debug!(
            "next reminder for {:?}: due {} fires at {}",
            anchor,
            upcoming.due_date,
            upcoming.instant
        );
        Ok(upcoming)
    }

    /// next reminder among the remaining installments of `schedule`
    ///
    /// Returns `None` once every installment's reminder lies in the past.
    pub fn next_for_schedule(&self, schedule: &Schedule) -> Result<Option<UpcomingReminder>> {
        let now = self.time.now();
        for row in &schedule.installments {
            let instant = reminder_instant(
                row.due_date,
                self.config.lead_days,
                self.config.time_of_day,
                &self.zone,
            )?;
            if instant > now {
                log::debug!("installment {} reminder fires at {}", row.sequence_number, instant);
                return Ok(Some(UpcomingReminder { due_date: row.due_date, instant }));
            }
        }
        log::trace!("no reminders left after {}", now);
        Ok(None)
    }
}

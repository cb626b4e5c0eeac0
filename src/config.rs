use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::decimal::{DEFAULT_MINOR_UNITS, MAX_SCALE};
use crate::errors::{LoanError, Result};
use crate::payments::ScheduleOptions;

/// billing frequency, always a whole number of months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentFrequency {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl PaymentFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::SemiAnnual => 2,
            PaymentFrequency::Annual => 1,
        }
    }

    pub fn months_per_period(&self) -> u32 {
        12 / self.periods_per_year()
    }
}

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub frequency: PaymentFrequency,
    /// digits after the decimal point for billable amounts
    pub minor_units: u32,
    pub reminder: ReminderConfig,
}

/// defaults for reminder scheduling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderConfig {
    pub lead_days: u32,
    pub time_of_day: NaiveTime,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            lead_days: 1,
            time_of_day: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::monthly()
    }
}

impl EngineConfig {
    /// monthly billing with two minor units
    pub fn monthly() -> Self {
        Self {
            frequency: PaymentFrequency::Monthly,
            minor_units: DEFAULT_MINOR_UNITS,
            reminder: ReminderConfig::default(),
        }
    }

    /// quarterly billing with two minor units
    pub fn quarterly() -> Self {
        Self {
            frequency: PaymentFrequency::Quarterly,
            ..Self::monthly()
        }
    }

    pub fn with_minor_units(mut self, minor_units: u32) -> Self {
        self.minor_units = minor_units;
        self
    }

    pub fn with_reminder(mut self, lead_days: u32, time_of_day: NaiveTime) -> Self {
        self.reminder = ReminderConfig { lead_days, time_of_day };
        self
    }

    /// load from json, validating the result
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json).map_err(|e| LoanError::InvalidConfiguration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LoanError::InvalidConfiguration {
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        // billable amounts cannot be finer than the internal money scale
        if self.minor_units > MAX_SCALE {
            return Err(LoanError::InvalidConfiguration {
                message: format!("minor units {} exceeds {}", self.minor_units, MAX_SCALE),
            });
        }
        Ok(())
    }

    pub fn schedule_options(&self) -> ScheduleOptions {
        ScheduleOptions {
            minor_units: self.minor_units,
            months_per_period: self.frequency.months_per_period(),
        }
    }
}

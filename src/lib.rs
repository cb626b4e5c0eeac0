pub mod calendar;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod interest;
pub mod loan;
pub mod payments;
pub mod reminders;
pub mod types;

// re-export key types
pub use calendar::{next_cycle_date, nth_cycle_date};
pub use config::{EngineConfig, PaymentFrequency, ReminderConfig};
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use interest::{discount_factor, effective_annual_rate, growth_factor, periodic_rate};
pub use loan::{LoanPlan, LoanTermsBuilder};
pub use payments::{
    apply_prepayment, compute_installment, compute_term, PrepaymentResult, PrepaymentStrategy,
    Schedule, ScheduleOptions,
};
pub use reminders::{next_reminder, reminder_instant, ReminderPlanner, ReminderSpec, UpcomingReminder};
pub use types::{AnchorDay, Installment, LoanTerms, TermResolution};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;

use chrono::{Datelike, NaiveDate};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::interest::periodic_rate;
use crate::payments::{apply_prepayment, compute_installment, compute_term, PrepaymentResult, PrepaymentStrategy, Schedule};
use crate::types::{AnchorDay, LoanTerms, TermResolution};

/// fully resolved loan: rate, installment, term and schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPlan {
    pub terms: LoanTerms,
    pub rate: Rate,
    pub installment: Money,
    pub term_periods: u32,
    pub schedule: Schedule,
}

impl LoanTerms {
    pub fn builder() -> LoanTermsBuilder {
        LoanTermsBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(LoanError::InvalidPrincipal { principal: self.principal });
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(LoanError::InvalidInterestRate {
                rate: Rate::from_percent(self.annual_rate_percent),
            });
        }
        if let Some(installment) = self.periodic_installment {
            if !installment.is_positive() {
                return Err(LoanError::InvalidInstallment { installment });
            }
        } else {
            match self.term_periods {
                Some(0) | None => {
                    return Err(LoanError::InvalidTerm {
                        periods: self.term_periods.unwrap_or(0),
                    });
                }
                Some(_) => {}
            }
        }
        self.anchor_day.validate()
    }

    /// term implied by the terms, `Unbounded` when the installment never retires the loan
    ///
    /// A chosen installment must also beat the first period's interest once
    /// rounded to the configured minor units, the same test a schedule build
    /// applies, so this agrees with [`LoanTerms::resolve`].
    pub fn resolve_term(&self, config: &EngineConfig) -> Result<TermResolution> {
        config.validate()?;
        self.validate()?;
        let rate = periodic_rate(self.annual_rate_percent, config.frequency.periods_per_year())?;
        match (self.periodic_installment, self.term_periods) {
            (Some(installment), _) => self.term_for_installment(rate, installment, config),
            (None, Some(n)) => Ok(TermResolution::Finite(n)),
            (None, None) => Err(LoanError::InvalidTerm { periods: 0 }),
        }
    }

    fn term_for_installment(&self, rate: Rate, installment: Money, config: &EngineConfig) -> Result<TermResolution> {
        let term = compute_term(self.principal, rate, installment)?;
        match term {
            TermResolution::Finite(n) if n > 1 => {
                let first_interest = self.principal.accrue_rounded(rate, config.minor_units);
                if installment <= first_interest {
                    log::trace!(
                        "installment {} only covers rounded interest {}",
                        installment,
                        first_interest
                    );
                    return Ok(TermResolution::Unbounded);
                }
                Ok(term)
            }
            _ => Ok(term),
        }
    }

    /// compute installment, term and schedule
    ///
    /// A caller-supplied installment is authoritative and the term is derived
    /// from it; otherwise the installment is solved from the term and rounded
    /// half-up to the configured minor units, never down to zero.
    pub fn resolve(&self, config: &EngineConfig) -> Result<LoanPlan> {
        config.validate()?;
        self.validate()?;
        let rate = periodic_rate(self.annual_rate_percent, config.frequency.periods_per_year())?;

        let (installment, term_periods) = match self.periodic_installment {
            Some(installment) => match self.term_for_installment(rate, installment, config)? {
                TermResolution::Finite(n) => (installment, n),
                TermResolution::Unbounded => {
                    log::debug!(
                        "installment {} never retires principal {} at {}",
                        installment,
                        self.principal,
                        rate
                    );
                    return Err(LoanError::UnboundedTerm {
                        principal: self.principal,
                        installment,
                    });
                }
            },
            None => {
                let n = self.term_periods.unwrap_or(0);
                let installment = compute_installment(self.principal, rate, n)?.round_billable(config.minor_units);
                (installment, n)
            }
        };

        let schedule = Schedule::build_with(
            self.principal,
            rate,
            term_periods,
            installment,
            self.start_date,
            self.anchor_day,
            config.schedule_options(),
        )?;
        log::debug!(
            "resolved loan of {} {}: {} periods of {}, total interest {}",
            self.principal,
            self.currency,
            term_periods,
            installment,
            schedule.total_interest
        );

        Ok(LoanPlan {
            terms: self.clone(),
            rate,
            installment,
            term_periods,
            schedule,
        })
    }
}

impl LoanPlan {
    /// prepay right after installment `after`, see [`apply_prepayment`]
    pub fn prepay(&self, after: u32, amount: Money, strategy: PrepaymentStrategy) -> Result<PrepaymentResult> {
        apply_prepayment(&self.schedule, after, amount, strategy)
    }

    /// json representation of the plan
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LoanError::CalculationError {
            message: e.to_string(),
        })
    }

    /// short alias for json output
    pub fn json(&self) -> String {
        self.to_json_pretty().unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

/// builder for loan terms
#[derive(Debug, Clone, Default)]
pub struct LoanTermsBuilder {
    principal: Option<Money>,
    annual_rate_percent: Option<Decimal>,
    term_periods: Option<u32>,
    periodic_installment: Option<Money>,
    anchor_day: Option<AnchorDay>,
    start_date: Option<NaiveDate>,
    currency: Option<String>,
}

impl LoanTermsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn annual_rate_percent(mut self, percent: Decimal) -> Self {
        self.annual_rate_percent = Some(percent);
        self
    }

    pub fn term_periods(mut self, periods: u32) -> Self {
        self.term_periods = Some(periods);
        self
    }

    pub fn installment(mut self, installment: Money) -> Self {
        self.periodic_installment = Some(installment);
        self
    }

    pub fn anchor_day(mut self, anchor: AnchorDay) -> Self {
        self.anchor_day = Some(anchor);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// build, defaulting the start date to today's system date
    pub fn build(self) -> Result<LoanTerms> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.build_with_time(&time)
    }

    /// build with an explicit clock for the default start date
    ///
    /// The anchor day defaults to the start date's day of month.
    pub fn build_with_time(self, time_provider: &SafeTimeProvider) -> Result<LoanTerms> {
        let principal = self.principal.ok_or(LoanError::InvalidConfiguration {
            message: "principal is required".to_string(),
        })?;
        let start_date = self.start_date.unwrap_or_else(|| time_provider.now().date_naive());
        let anchor_day = match self.anchor_day {
            Some(anchor) => anchor,
            None => AnchorDay::day(start_date.day() as u8)?,
        };

        let terms = LoanTerms {
            principal,
            annual_rate_percent: self.annual_rate_percent.unwrap_or(Decimal::ZERO),
            term_periods: self.term_periods,
            periodic_installment: self.periodic_installment,
            anchor_day,
            start_date,
            currency: self.currency.unwrap_or_default(),
        };
        terms.validate()?;
        Ok(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn standard_terms() -> LoanTerms {
        LoanTerms::builder()
            .principal(Money::from_major(100_000))
            .annual_rate_percent(dec!(12))
            .term_periods(12)
            .anchor_day(AnchorDay::Day(5))
            .start_date(date(2024, 1, 5))
            .currency("EUR")
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_from_term() {
        let plan = standard_terms().resolve(&EngineConfig::default()).unwrap();
        assert_eq!(plan.rate, Rate::from_decimal(dec!(0.01)));
        assert_eq!(plan.installment, Money::from_decimal(dec!(8884.88)));
        assert_eq!(plan.term_periods, 12);
        assert_eq!(plan.schedule.installments.len(), 12);
        assert_eq!(plan.schedule.installments[11].remaining_principal_after, Money::ZERO);
        assert_eq!(plan.schedule.total_principal(), Money::from_major(100_000));
    }

    #[test]
    fn test_installment_is_authoritative() {
        let mut terms = standard_terms();
        terms.term_periods = Some(60);
        terms.periodic_installment = Some(Money::from_major(10_000));

        let plan = terms.resolve(&EngineConfig::default()).unwrap();
        assert_eq!(plan.term_periods, 11);
        assert_eq!(plan.installment, Money::from_major(10_000));
        let last = plan.schedule.installments.last().unwrap();
        assert!(last.total_payment < Money::from_major(10_000));
        assert_eq!(last.remaining_principal_after, Money::ZERO);
    }

    #[test]
    fn test_unbounded_installment() {
        let terms = LoanTerms::builder()
            .principal(Money::from_major(100_000))
            .annual_rate_percent(dec!(24))
            .installment(Money::from_major(1_500))
            .start_date(date(2024, 1, 1))
            .build()
            .unwrap();

        assert_eq!(terms.resolve_term(&EngineConfig::default()).unwrap(), TermResolution::Unbounded);
        assert_eq!(
            terms.resolve(&EngineConfig::default()),
            Err(LoanError::UnboundedTerm {
                principal: Money::from_major(100_000),
                installment: Money::from_major(1_500),
            })
        );
    }

    #[test]
    fn test_zero_rate_plan() {
        let terms = LoanTerms::builder()
            .principal(Money::from_major(1_200))
            .term_periods(12)
            .anchor_day(AnchorDay::LastDay)
            .start_date(date(2023, 1, 10))
            .build()
            .unwrap();

        let plan = terms.resolve(&EngineConfig::default()).unwrap();
        assert_eq!(plan.installment, Money::from_major(100));
        assert!(plan.schedule.installments.iter().all(|i| i.interest_component.is_zero()));
        assert_eq!(plan.schedule.installments[1].due_date, date(2023, 2, 28));
    }

    #[test]
    fn test_tiny_principal_keeps_a_billable_installment() {
        let terms = LoanTerms::builder()
            .principal(Money::from_decimal(dec!(0.05)))
            .term_periods(12)
            .start_date(date(2024, 1, 1))
            .build()
            .unwrap();

        let plan = terms.resolve(&EngineConfig::default()).unwrap();
        assert_eq!(plan.installment, Money::from_minor(1, 2));
        assert_eq!(plan.schedule.installments.len(), 12);
        assert_eq!(plan.schedule.total_principal(), Money::from_decimal(dec!(0.05)));
        assert_eq!(plan.schedule.installments[4].remaining_principal_after, Money::ZERO);
        assert_eq!(plan.schedule.installments[11].total_payment, Money::ZERO);
    }

    #[test]
    fn test_term_agrees_with_rounded_first_interest() {
        // 1000.25 * 2% = 20.005, which bills as 20.01
        let terms = LoanTerms::builder()
            .principal(Money::from_decimal(dec!(1000.25)))
            .annual_rate_percent(dec!(24))
            .installment(Money::from_decimal(dec!(20.01)))
            .start_date(date(2024, 1, 1))
            .build()
            .unwrap();
        let config = EngineConfig::default();

        assert_eq!(terms.resolve_term(&config).unwrap(), TermResolution::Unbounded);
        assert_eq!(
            terms.resolve(&config),
            Err(LoanError::UnboundedTerm {
                principal: Money::from_decimal(dec!(1000.25)),
                installment: Money::from_decimal(dec!(20.01)),
            })
        );

        // one cent more amortizes, and both agree on the term
        let mut terms = terms;
        terms.periodic_installment = Some(Money::from_decimal(dec!(20.02)));
        let term = terms.resolve_term(&config).unwrap();
        let plan = terms.resolve(&config).unwrap();
        assert_eq!(term, TermResolution::Finite(plan.term_periods));
    }

    #[test]
    fn test_quarterly_plan() {
        let terms = LoanTerms::builder()
            .principal(Money::from_major(10_000))
            .annual_rate_percent(dec!(8))
            .term_periods(8)
            .anchor_day(AnchorDay::Day(1))
            .start_date(date(2024, 1, 1))
            .build()
            .unwrap();

        let plan = terms.resolve(&EngineConfig::quarterly()).unwrap();
        assert_eq!(plan.rate, Rate::from_decimal(dec!(0.02)));
        assert_eq!(plan.schedule.installments[1].due_date, date(2024, 4, 1));
        assert_eq!(plan.schedule.installments[7].due_date, date(2025, 10, 1));

        let result = plan
            .prepay(2, Money::from_major(1_000), PrepaymentStrategy::ReduceTerm)
            .unwrap();
        let remainder = result.remainder.unwrap();
        assert_eq!(remainder.installments[0].due_date, date(2024, 7, 1));
        assert_eq!(remainder.installments[1].due_date, date(2024, 10, 1));
    }

    #[test]
    fn test_builder_defaults_from_clock() {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 7, 31, 12, 0, 0).unwrap()));
        let terms = LoanTerms::builder()
            .principal(Money::from_major(500))
            .term_periods(5)
            .build_with_time(&time)
            .unwrap();

        assert_eq!(terms.start_date, date(2024, 7, 31));
        assert_eq!(terms.anchor_day, AnchorDay::Day(31));
        assert_eq!(terms.annual_rate_percent, Decimal::ZERO);
    }

    #[test]
    fn test_builder_validation() {
        assert!(matches!(
            LoanTerms::builder().term_periods(12).build(),
            Err(LoanError::InvalidConfiguration { .. })
        ));
        assert_eq!(
            LoanTerms::builder().principal(Money::from_major(100)).start_date(date(2024, 1, 1)).build(),
            Err(LoanError::InvalidTerm { periods: 0 })
        );
        assert!(matches!(
            LoanTerms::builder()
                .principal(Money::from_major(100))
                .annual_rate_percent(dec!(-1))
                .term_periods(12)
                .start_date(date(2024, 1, 1))
                .build(),
            Err(LoanError::InvalidInterestRate { .. })
        ));
    }

    #[test]
    fn test_plan_prepay() {
        let plan = standard_terms().resolve(&EngineConfig::default()).unwrap();
        let result = plan
            .prepay(3, Money::from_major(10_000), PrepaymentStrategy::ReduceInstallment)
            .unwrap();
        assert_eq!(result.new_remaining_periods, 9);
        assert!(result.new_installment.unwrap() < plan.installment);
    }

    #[test]
    fn test_plan_json() {
        let plan = standard_terms().resolve(&EngineConfig::default()).unwrap();
        let json = plan.json();
        assert!(json.contains("\"currency\": \"EUR\""));
        let parsed: LoanPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, plan);
    }
}

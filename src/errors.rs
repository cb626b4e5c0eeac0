use thiserror::Error;

use crate::decimal::{Money, Rate};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoanError {
    #[error("invalid principal: {principal}")]
    InvalidPrincipal {
        principal: Money,
    },

    #[error("invalid term: {periods} periods")]
    InvalidTerm {
        periods: u32,
    },

    #[error("invalid installment: {installment}")]
    InvalidInstallment {
        installment: Money,
    },

    #[error("non-amortizing schedule: installment {installment} does not exceed interest {interest} in period {period}")]
    NonAmortizingSchedule {
        period: u32,
        installment: Money,
        interest: Money,
    },

    #[error("term is unbounded: installment {installment} never retires principal {principal}")]
    UnboundedTerm {
        principal: Money,
        installment: Money,
    },

    #[error("invalid anchor day: {day}")]
    InvalidAnchorDay {
        day: u8,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("invalid prepayment: {amount}")]
    InvalidPrepayment {
        amount: Money,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LoanError>;

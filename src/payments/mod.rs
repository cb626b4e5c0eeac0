pub mod amortization;
pub mod prepayment;
pub mod solver;

pub use amortization::{Schedule, ScheduleOptions};
pub use prepayment::{apply_prepayment, PrepaymentResult, PrepaymentStrategy};
pub use solver::{compute_installment, compute_term, exact_installment};

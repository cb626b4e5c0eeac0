/// quick start - resolve a loan and print its schedule
use loan_engine::chrono::NaiveDate;
use loan_engine::{AnchorDay, EngineConfig, LoanTerms, Money};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // a 12 month personal loan at 12% a year, paid on the 5th
    let terms = LoanTerms::builder()
        .principal(Money::from_major(100_000))
        .annual_rate_percent(dec!(12))
        .term_periods(12)
        .anchor_day(AnchorDay::Day(5))
        .start_date(NaiveDate::from_ymd_opt(2024, 1, 5).ok_or("bad date")?)
        .currency("USD")
        .build()?;

    let plan = terms.resolve(&EngineConfig::default())?;

    println!("installment: {} {}", plan.installment, terms.currency);
    for row in &plan.schedule.installments {
        println!(
            "{:>3} {}  pay {:>10}  principal {:>10}  interest {:>8}  left {:>10}",
            row.sequence_number,
            row.due_date,
            row.total_payment,
            row.principal_component,
            row.interest_component,
            row.remaining_principal_after,
        );
    }
    println!("total interest: {}", plan.schedule.total_interest);

    Ok(())
}

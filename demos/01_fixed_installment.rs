/// fixed installment - derive the term from a chosen payment, then prepay
use loan_engine::chrono::NaiveDate;
use loan_engine::{
    AnchorDay, EngineConfig, LoanError, LoanTerms, Money, PrepaymentStrategy, TermResolution,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::default();
    let start = NaiveDate::from_ymd_opt(2024, 1, 31).ok_or("bad date")?;

    let terms = LoanTerms::builder()
        .principal(Money::from_major(20_000))
        .annual_rate_percent(dec!(9.5))
        .installment(Money::from_major(650))
        .anchor_day(AnchorDay::LastDay)
        .start_date(start)
        .build()?;

    match terms.resolve_term(&config)? {
        TermResolution::Finite(n) => println!("paying 650 a month takes {} months", n),
        TermResolution::Unbounded => println!("650 a month never pays this off"),
    }

    let plan = terms.resolve(&config)?;
    let last = plan.schedule.installments.last().ok_or("empty schedule")?;
    println!("final payment {} on {}", last.total_payment, last.due_date);

    // prepay 5,000 after the 6th installment and keep the payment
    let result = plan.prepay(6, Money::from_major(5_000), PrepaymentStrategy::ReduceTerm)?;
    println!(
        "term shrinks from {} to {} remaining months, saving {} interest",
        result.old_remaining_periods, result.new_remaining_periods, result.interest_saved
    );

    // an installment below the monthly interest is reported, not looped on
    let hopeless = LoanTerms::builder()
        .principal(Money::from_major(100_000))
        .annual_rate_percent(dec!(24))
        .installment(Money::from_major(1_500))
        .start_date(start)
        .build()?;
    match hopeless.resolve(&config) {
        Err(LoanError::UnboundedTerm { .. }) => println!("1500 a month never retires 100000 at 24%"),
        other => println!("unexpected: {:?}", other.map(|p| p.term_periods)),
    }

    Ok(())
}

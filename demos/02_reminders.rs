/// reminders - compute notification instants with controlled time
use loan_engine::chrono::{Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use loan_engine::{AnchorDay, EngineConfig, ReminderPlanner, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 2, 27, 6, 0, 0).single().ok_or("bad time")?,
    ));
    let controller = time.test_control().expect("should be in test mode");

    let zone = FixedOffset::east_opt(3600).ok_or("bad offset")?;
    let config = EngineConfig::monthly()
        .with_reminder(2, NaiveTime::from_hms_opt(9, 0, 0).ok_or("bad time of day")?);
    let planner = ReminderPlanner::from_config(&time, zone, &config);

    for _ in 0..4 {
        let upcoming = planner.next_for_anchor(AnchorDay::LastDay)?;
        println!(
            "now {}: payment due {}, remind at {}",
            time.now().format("%Y-%m-%d %H:%M"),
            upcoming.due_date,
            upcoming.instant.with_timezone(&zone)
        );
        controller.advance(Duration::days(10));
    }

    Ok(())
}

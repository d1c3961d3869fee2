use haulplan::shared::{Duration, Time};

#[test]
fn valid_time_test_1() {
    let time = Time::parse("2025-03-03T00:00:00Z").unwrap();
    assert_eq!(time.to_dmy_hms_string(), "03/03/2025 00:00:00");
}

#[test]
fn valid_time_test_2() {
    let time = Time::parse("2025-03-03 17:45:30").unwrap();
    assert_eq!(time.to_dmy_hms_string(), "03/03/2025 17:45:30");
}

#[test]
fn valid_time_test_3() {
    // Crossing midnight keeps the driver's own offset
    let time = Time::parse("2025-03-03T22:00:00-07:00").unwrap() + Duration::from_hours(10);
    assert_eq!(time.to_dmy_hms_string(), "04/03/2025 08:00:00");
}

#[test]
fn invalid_time_test_1() {
    assert!(Time::parse("2025-13-03T00:00:00Z").is_none())
}

#[test]
fn invalid_time_test_2() {
    assert!(Time::parse("00:00").is_none())
}

#[test]
fn duration_test() {
    let total: Duration = [
        Duration::from_hours(8),
        Duration::from_minutes(30),
        Duration::from_seconds(90),
    ]
    .into_iter()
    .sum();
    assert_eq!(total.as_seconds(), 8 * 3600 + 30 * 60 + 90);
    assert_eq!(total.to_string(), "08:31:30");
    assert_eq!(total.as_minutes(), 511.5);
}

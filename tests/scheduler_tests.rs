use haulplan::{
    hos::Limits,
    prelude::*,
    scheduler::{self, DutyStatus, Reason},
};

const CHICAGO: (f64, f64) = (41.8781, -87.6298);
const GARY: (f64, f64) = (41.5934, -87.3464);

fn departure() -> Time {
    Time::parse("2025-03-03T06:00:00Z").unwrap()
}

fn leg(from: (f64, f64), to: (f64, f64), miles: f64, minutes: u32) -> RouteLeg {
    RouteLeg::straight(
        from.into(),
        to.into(),
        Distance::from_miles(miles),
        Duration::from_minutes(minutes),
    )
}

/// No driving to the pickup, the truck is already there.
fn parked_at(point: (f64, f64)) -> RouteLeg {
    leg(point, point, 0.0, 0)
}

fn reasons(timeline: &Timeline) -> Vec<Reason> {
    timeline.stops().iter().map(|stop| stop.reason).collect()
}

fn minutes(d: Duration) -> u32 {
    d.as_seconds() / 60
}

/// Replays the timeline independently of `Timeline::audit`.
fn assert_compliant(timeline: &Timeline) {
    let stops = timeline.stops();
    for pair in stops.windows(2) {
        assert_eq!(pair[0].end, pair[1].start, "timeline has a gap or overlap");
        let worked = match pair[1].reason {
            Reason::Break30 | Reason::Rest10h => Duration::ZERO,
            _ => pair[1].duration,
        };
        assert_eq!(
            pair[1].cycle_used,
            pair[0].cycle_used + worked,
            "cycle time at the end of entry {:?} is off",
            pair[1].reason
        );
    }
    let mut since_break = 0;
    let mut since_rest = 0;
    let mut window = 0;
    for stop in stops {
        let d = minutes(stop.duration);
        match stop.reason {
            Reason::Break30 => {
                since_break = 0;
                window += d;
            }
            Reason::Rest10h => {
                since_break = 0;
                since_rest = 0;
                window = 0;
            }
            Reason::None => {
                since_break += d;
                since_rest += d;
                window += d;
            }
            _ => window += d,
        }
        assert!(since_break <= 480, "drove {since_break} min without a break");
        assert!(since_rest <= 660, "drove {since_rest} min in one shift");
        assert!(window <= 840, "duty window of {window} min");
        assert!(minutes(stop.cycle_used) <= 4200);
    }
}

#[test]
fn ten_hours_of_driving_takes_one_break() {
    let to_pickup = parked_at(CHICAGO);
    let to_destination = leg(CHICAGO, (39.7392, -104.9903), 550.0, 600);
    let timeline = Scheduler::new(&to_pickup, &to_destination, departure())
        .solve()
        .unwrap();

    assert_eq!(
        reasons(&timeline),
        vec![
            Reason::PickupPoint,
            Reason::None,
            Reason::Break30,
            Reason::None,
            Reason::DropoffPoint,
        ]
    );
    assert_eq!(timeline.count(Reason::Break30), 1);
    assert_eq!(timeline.count(Reason::Rest10h), 0);
    assert_eq!(timeline.shifts(), 1);

    let stops = timeline.stops();
    assert_eq!(stops[1].duration, Duration::from_hours(8));
    assert_eq!(stops[2].status, DutyStatus::OffDuty);
    assert_eq!(stops[2].duration, Duration::from_minutes(30));
    assert_eq!(stops[3].duration, Duration::from_hours(2));
    assert_eq!(timeline.driving_time(), Duration::from_hours(10));
    assert_eq!(
        timeline.arrival().unwrap().to_dmy_hms_string(),
        "03/03/2025 18:30:00"
    );
    assert_compliant(&timeline);
}

#[test]
fn short_hop_only_has_waypoints() {
    let to_pickup = leg(CHICAGO, GARY, 25.0, 30);
    let to_destination = leg(GARY, (41.6764, -86.2520), 50.0, 60);
    let timeline = Scheduler::new(&to_pickup, &to_destination, departure())
        .cycle_hours(20.0)
        .solve()
        .unwrap();

    assert_eq!(
        reasons(&timeline),
        vec![
            Reason::None,
            Reason::PickupPoint,
            Reason::None,
            Reason::DropoffPoint,
        ]
    );
    assert_eq!(timeline.shifts(), 1);
    let pickup = &timeline.stops()[1];
    assert_eq!(pickup.status, DutyStatus::OnDuty);
    assert_eq!(pickup.location, Coordinate::from(GARY));
    assert_eq!(pickup.duration, Duration::from_hours(1));
    // 20 h before, plus 1.5 h driving and 2 h of cargo handling
    assert_eq!(timeline.stops()[3].cycle_used, Duration::from_minutes(23 * 60 + 30));
}

#[test]
fn dropoff_can_end_exactly_on_the_cycle_cap() {
    let to_pickup = parked_at(CHICAGO);
    let to_destination = leg(CHICAGO, GARY, 25.0, 30);
    let timeline = Scheduler::new(&to_pickup, &to_destination, departure())
        .cycle_hours(67.5)
        .solve()
        .unwrap();

    assert_eq!(
        reasons(&timeline),
        vec![Reason::PickupPoint, Reason::None, Reason::DropoffPoint]
    );
    let [pickup, drive, dropoff] = timeline.stops() else {
        panic!("expected three entries");
    };
    assert_eq!(pickup.cycle_used, Duration::from_minutes(68 * 60 + 30));
    assert_eq!(drive.cycle_used, Duration::from_hours(69));
    assert_eq!(dropoff.cycle_used, Duration::from_hours(70));
    assert_compliant(&timeline);
}

#[test]
fn cross_country_trip_stays_compliant() {
    let to_pickup = leg(CHICAGO, (41.2565, -95.9345), 470.0, 7 * 60 + 10);
    let to_destination = leg((41.2565, -95.9345), (34.0522, -118.2437), 1_550.0, 24 * 60 + 20);
    let timeline = Scheduler::new(&to_pickup, &to_destination, departure())
        .cycle_hours(10.0)
        .solve()
        .unwrap();

    assert_compliant(&timeline);
    assert!(timeline.count(Reason::Rest10h) >= 2);
    assert_eq!(timeline.count(Reason::Fueling), 2);
    assert_eq!(timeline.count(Reason::PickupPoint), 1);
    assert_eq!(timeline.count(Reason::DropoffPoint), 1);
    assert_eq!(
        timeline.shifts() as usize,
        timeline.count(Reason::Rest10h) + 1
    );
    assert_eq!(timeline.driving_time(), Duration::from_minutes(31 * 60 + 30));
    assert!((timeline.driven_distance().as_miles() - 2_020.0).abs() < 0.01);
    assert_eq!(timeline.stops().last().unwrap().reason, Reason::DropoffPoint);
}

#[test]
fn rests_close_their_shift() {
    let to_pickup = parked_at(CHICAGO);
    let to_destination = leg(CHICAGO, (34.0522, -118.2437), 1_000.0, 18 * 60);
    let timeline = Scheduler::new(&to_pickup, &to_destination, departure())
        .solve()
        .unwrap();

    let stops = timeline.stops();
    let rest = stops
        .iter()
        .position(|stop| stop.reason == Reason::Rest10h)
        .unwrap();
    assert_eq!(stops[rest].status, DutyStatus::SleeperBerth);
    assert_eq!(stops[rest].shift, 1);
    assert_eq!(stops[rest + 1].shift, 2);
    assert_eq!(timeline.shifts(), 2);
    assert_compliant(&timeline);
}

#[test]
fn hos_stop_goes_before_fueling_at_the_same_spot() {
    // 125 mph puts the 1,000 mile fuel mark exactly on the eighth hour
    let to_pickup = parked_at((40.0, -100.0));
    let to_destination = leg((40.0, -100.0), (40.0, -90.0), 1_250.0, 600);
    let timeline = Scheduler::new(&to_pickup, &to_destination, departure())
        .solve()
        .unwrap();

    assert_eq!(
        reasons(&timeline),
        vec![
            Reason::PickupPoint,
            Reason::None,
            Reason::Break30,
            Reason::Fueling,
            Reason::None,
            Reason::DropoffPoint,
        ]
    );
    let stops = timeline.stops();
    assert_eq!(stops[2].location, stops[3].location);
    assert!((stops[2].location.longitude + 92.0).abs() < 1e-6);
    assert_eq!(stops[3].status, DutyStatus::OnDuty);
    assert_compliant(&timeline);
}

#[test]
fn pickup_goes_before_a_break_due_on_arrival() {
    let to_pickup = leg(CHICAGO, (41.2565, -95.9345), 440.0, 8 * 60);
    let to_destination = leg((41.2565, -95.9345), (40.8136, -96.7026), 55.0, 60);
    let timeline = Scheduler::new(&to_pickup, &to_destination, departure())
        .solve()
        .unwrap();

    assert_eq!(
        reasons(&timeline),
        vec![
            Reason::None,
            Reason::PickupPoint,
            Reason::Break30,
            Reason::None,
            Reason::DropoffPoint,
        ]
    );
    assert_compliant(&timeline);
}

#[test]
fn pickup_goes_before_a_rest_due_on_arrival() {
    let to_pickup = leg(CHICAGO, (40.7608, -111.8910), 605.0, 11 * 60);
    let to_destination = leg((40.7608, -111.8910), (40.5, -112.0), 55.0, 60);
    let timeline = Scheduler::new(&to_pickup, &to_destination, departure())
        .solve()
        .unwrap();

    assert_eq!(
        reasons(&timeline),
        vec![
            Reason::None,
            Reason::Break30,
            Reason::None,
            Reason::PickupPoint,
            Reason::Rest10h,
            Reason::None,
            Reason::DropoffPoint,
        ]
    );
    assert_eq!(timeline.shifts(), 2);
    assert_compliant(&timeline);
}

#[test]
fn full_duty_window_rests_before_loading() {
    let limits = Limits {
        driving_before_break: Duration::from_hours(20),
        driving_per_shift: Duration::from_hours(20),
        ..Default::default()
    };
    let to_pickup = leg(CHICAGO, (40.0, -100.0), 770.0, 14 * 60);
    let to_destination = leg((40.0, -100.0), (40.0, -101.0), 55.0, 60);
    let timeline = Scheduler::new(&to_pickup, &to_destination, departure())
        .with_limits(limits)
        .solve()
        .unwrap();

    assert_eq!(
        reasons(&timeline),
        vec![
            Reason::None,
            Reason::Rest10h,
            Reason::PickupPoint,
            Reason::None,
            Reason::DropoffPoint,
        ]
    );
    assert_eq!(timeline.stops()[1].location, Coordinate::new(40.0, -100.0));
    assert!(timeline.audit(&limits).is_ok());
}

#[test]
fn nearly_spent_cycle_is_unreachable() {
    let to_pickup = parked_at(CHICAGO);
    let to_destination = leg(CHICAGO, GARY, 25.0, 30);
    let result = Scheduler::new(&to_pickup, &to_destination, departure())
        .cycle_hours(68.0)
        .solve();
    match result {
        Err(scheduler::Error::ComplianceUnreachable { needed, available }) => {
            assert!((needed - 70.5).abs() < 1e-9);
            assert!((available - 70.0).abs() < 1e-9);
        }
        other => panic!("expected ComplianceUnreachable, got {other:?}"),
    }
}

#[test]
fn spent_cycle_cannot_even_load() {
    let to_pickup = parked_at(CHICAGO);
    let to_destination = parked_at(CHICAGO);
    let result = Scheduler::new(&to_pickup, &to_destination, departure())
        .cycle_hours(70.0)
        .solve();
    assert!(matches!(
        result,
        Err(scheduler::Error::ComplianceUnreachable { .. })
    ));
}

#[test]
fn cycle_hours_are_validated() {
    let to_pickup = parked_at(CHICAGO);
    let to_destination = leg(CHICAGO, GARY, 25.0, 30);
    for hours in [-0.5, 70.5, f64::NAN, f64::INFINITY] {
        let result = Scheduler::new(&to_pickup, &to_destination, departure())
            .cycle_hours(hours)
            .solve();
        assert!(
            matches!(result, Err(scheduler::Error::InvalidCycle { .. })),
            "{hours} was accepted"
        );
    }
}

#[test]
fn broken_leg_is_rejected() {
    let to_pickup = leg(CHICAGO, GARY, 25.0, 0);
    let to_destination = leg(GARY, CHICAGO, 25.0, 30);
    let result = Scheduler::new(&to_pickup, &to_destination, departure()).solve();
    assert!(matches!(
        result,
        Err(scheduler::Error::InvalidRoute { leg: 0, .. })
    ));
}

#[test]
fn same_input_same_timeline() {
    let to_pickup = leg(CHICAGO, (41.2565, -95.9345), 470.0, 7 * 60 + 10);
    let to_destination = leg((41.2565, -95.9345), (34.0522, -118.2437), 1_550.0, 24 * 60 + 20);
    let solve = || {
        Scheduler::new(&to_pickup, &to_destination, departure())
            .cycle_hours(33.25)
            .labels("Chicago, IL", "Omaha, NE", "Los Angeles, CA")
            .solve()
            .unwrap()
    };
    assert_eq!(solve(), solve());
}

#[test]
fn labels_land_on_waypoints() {
    let to_pickup = leg(CHICAGO, GARY, 25.0, 30);
    let to_destination = leg(GARY, (41.6764, -86.2520), 50.0, 60);
    let timeline = Scheduler::new(&to_pickup, &to_destination, departure())
        .labels("Chicago, IL", "Gary, IN", "South Bend, IN")
        .solve()
        .unwrap();
    let addresses: Vec<_> = timeline
        .stops()
        .iter()
        .map(|stop| stop.address.as_deref())
        .collect();
    assert_eq!(
        addresses,
        vec![
            Some("Chicago, IL"),
            Some("Gary, IN"),
            Some("Gary, IN"),
            Some("South Bend, IN"),
        ]
    );
}

#[test]
fn custom_settings_change_stop_lengths() {
    let settings = Settings {
        pickup_duration: Duration::from_minutes(45),
        dropoff_duration: Duration::from_minutes(90),
        ..Default::default()
    };
    let to_pickup = leg(CHICAGO, GARY, 25.0, 30);
    let to_destination = leg(GARY, (41.6764, -86.2520), 50.0, 60);
    let timeline = Scheduler::new(&to_pickup, &to_destination, departure())
        .with_settings(settings)
        .solve()
        .unwrap();
    let stops = timeline.stops();
    assert_eq!(stops[1].duration, Duration::from_minutes(45));
    assert_eq!(stops[3].duration, Duration::from_minutes(90));
}

#[test]
fn zero_fuel_interval_is_rejected() {
    let settings = Settings {
        fuel_interval: Distance::ZERO,
        ..Default::default()
    };
    let to_pickup = parked_at(CHICAGO);
    let to_destination = leg(CHICAGO, GARY, 25.0, 30);
    let result = Scheduler::new(&to_pickup, &to_destination, departure())
        .with_settings(settings)
        .solve();
    assert!(matches!(result, Err(scheduler::Error::InvalidSettings(_))));
}

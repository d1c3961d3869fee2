use haulplan::shared::{Coordinate, Distance};

#[test]
fn distance_test() {
    let paris = Coordinate {
        latitude: 48.85800943005911,
        longitude: 2.3514350059357927,
    };
    let london = Coordinate {
        latitude: 51.5052389927712,
        longitude: -0.12495407345099824,
    };
    let d = paris.great_circle_distance(&london);
    assert!((d.as_kilometers() - 343.0).abs() < 5.0);
}

#[test]
fn network_distance_is_longer() {
    let chicago = Coordinate::new(41.8781, -87.6298);
    let gary = Coordinate::new(41.5934, -87.3464);
    let straight = chicago.great_circle_distance(&gary);
    let road = chicago.network_distance(&gary);
    assert!((road / straight - 1.3).abs() < 1e-9);
}

#[test]
fn distance_miles_test() {
    let dist_a = Distance::from_miles(1.0);
    let dist_b = Distance::from_meters(1_609.344);
    assert_eq!(dist_a, dist_b)
}

#[test]
fn distance_cmp_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(0.5);
    assert!(dist_a > dist_b)
}

#[test]
fn coordinate_validity_test() {
    assert!(Coordinate::new(41.0, -87.0).is_valid());
    assert!(!Coordinate::new(91.0, 0.0).is_valid());
    assert!(!Coordinate::new(0.0, f64::NAN).is_valid());
}

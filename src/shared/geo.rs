use std::{
    cmp,
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Sub},
};

use serde::{Deserialize, Serialize};

pub const METERS_PER_MILE: f64 = 1_609.344;
pub(crate) const EARTH_RADIUS_KM: f64 = 6371.0;
/// Roads are longer than the straight line between their ends.
pub const CIRCUITY_FACTOR: f64 = 1.3;

#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Distance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}

impl Sub for Distance {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Distance {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div for Distance {
    type Output = f64;
    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}

impl Sum for Distance {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|distance| distance.0).sum())
    }
}

impl Distance {
    pub const ZERO: Distance = Distance(0.0);

    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn from_miles(distance: f64) -> Self {
        Self(distance * METERS_PER_MILE)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0 / 1000.0
    }

    pub const fn as_miles(&self) -> f64 {
        self.0 / METERS_PER_MILE
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:.5}, {:.5}", self.latitude, self.longitude))
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.latitude, value.longitude)
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(value: Coordinate) -> Self {
        [value.latitude, value.longitude]
    }
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Haversine distance over the earth's surface.
    pub fn great_circle_distance(&self, coord: &Self) -> Distance {
        let dist_lat = f64::to_radians(coord.latitude - self.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.latitude))
                * f64::cos(f64::to_radians(coord.latitude))
                * f64::sin(dist_lon / 2.0)
                * f64::sin(dist_lon / 2.0);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        Distance::from_kilometers(EARTH_RADIUS_KM * c)
    }

    /// Rough road distance estimate when no road network is at hand.
    pub fn network_distance(&self, coord: &Self) -> Distance {
        self.great_circle_distance(coord) * CIRCUITY_FACTOR
    }

    /// Linear interpolation between two points, `fraction` in `[0, 1]`.
    /// Good enough for the short segments of a route polyline.
    pub fn lerp(&self, coord: &Self, fraction: f64) -> Self {
        let fraction = fraction.clamp(0.0, 1.0);
        Self {
            latitude: self.latitude + (coord.latitude - self.latitude) * fraction,
            longitude: self.longitude + (coord.longitude - self.longitude) * fraction,
        }
    }
}

#[test]
fn distance_test() {
    // Chicago to Denver is roughly 1,480 km as the crow flies
    let chicago = Coordinate::new(41.8781, -87.6298);
    let denver = Coordinate::new(39.7392, -104.9903);
    let d = chicago.great_circle_distance(&denver);
    assert!((d.as_kilometers() - 1_480.0).abs() < 20.0);
}

#[test]
fn distance_eq_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(1.0);
    assert_eq!(dist_a, dist_b)
}

#[test]
fn distance_cmp_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(0.5);
    assert!(dist_a > dist_b)
}

#[test]
fn miles_test() {
    let dist = Distance::from_miles(1.0);
    assert!((dist.as_meters() - METERS_PER_MILE).abs() < f64::EPSILON);
    assert!((Distance::from_meters(METERS_PER_MILE * 50.0).as_miles() - 50.0).abs() < 1e-9);
}

#[test]
fn network_distance_is_longer() {
    let a = Coordinate::new(41.8781, -87.6298);
    let b = Coordinate::new(41.5, -87.0);
    assert!(a.network_distance(&b) > a.great_circle_distance(&b));
}

#[test]
fn lerp_test() {
    let a = Coordinate::new(0.0, 0.0);
    let b = Coordinate::new(10.0, -20.0);
    assert_eq!(a.lerp(&b, 0.5), Coordinate::new(5.0, -10.0));
    assert_eq!(a.lerp(&b, 2.0), b);
}

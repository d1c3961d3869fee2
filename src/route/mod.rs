mod polyline;

pub use polyline::*;

use crate::shared::{
    geo::{Coordinate, Distance},
    time::Duration,
};

/// One leg of the base route as the mapping provider drove it:
/// origin→pickup or pickup→destination.
///
/// Within a leg the truck is assumed to cover distance at a constant pace,
/// so elapsed driving time maps linearly onto distance and onto the
/// polyline's arc length.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub start: Coordinate,
    pub end: Coordinate,
    pub polyline: Polyline,
    pub distance: Distance,
    pub duration: Duration,
}

impl RouteLeg {
    pub fn new(
        start: Coordinate,
        end: Coordinate,
        polyline: Polyline,
        distance: Distance,
        duration: Duration,
    ) -> Self {
        Self {
            start,
            end,
            polyline,
            distance,
            duration,
        }
    }

    /// A leg without provider geometry, drawn as a straight line.
    pub fn straight(start: Coordinate, end: Coordinate, distance: Distance, duration: Duration) -> Self {
        Self::new(start, end, Polyline::new(vec![start, end]), distance, duration)
    }

    pub fn is_empty(&self) -> bool {
        self.duration.is_zero()
    }

    /// Distance covered after driving `elapsed` of this leg.
    pub fn distance_after(&self, elapsed: Duration) -> Distance {
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.distance;
        }
        self.distance * (elapsed.as_seconds() as f64 / self.duration.as_seconds() as f64)
    }

    /// Driving time needed to cover `distance` of this leg, rounded up to
    /// the next second and capped at the leg's duration.
    pub fn time_to_cover(&self, distance: Distance) -> Duration {
        if distance >= self.distance || self.distance <= Distance::ZERO {
            return self.duration;
        }
        if distance <= Distance::ZERO {
            return Duration::ZERO;
        }
        let seconds = (self.duration.as_seconds() as f64 * (distance / self.distance)).ceil();
        Duration::from_seconds_f64(seconds).min(self.duration)
    }

    /// Where the truck is after driving `elapsed` of this leg.
    pub fn position_after(&self, elapsed: Duration) -> Coordinate {
        if elapsed.is_zero() {
            return self.start;
        }
        if elapsed >= self.duration {
            return self.end;
        }
        let fraction = elapsed.as_seconds() as f64 / self.duration.as_seconds() as f64;
        self.polyline
            .point_at_fraction(fraction)
            .unwrap_or_else(|| self.start.lerp(&self.end, fraction))
    }

    /// Checks the numbers a provider handed back before anything is scheduled on them.
    pub fn check(&self) -> Result<(), String> {
        if !self.start.is_valid() || !self.end.is_valid() {
            return Err("leg endpoints are not valid coordinates".into());
        }
        if !self.distance.is_finite() || self.distance < Distance::ZERO {
            return Err(format!("leg distance {} m is not usable", self.distance.as_meters()));
        }
        if self.duration.is_zero() && self.distance > Distance::from_meters(1.0) {
            return Err(format!(
                "leg covers {:.1} mi but takes no time",
                self.distance.as_miles()
            ));
        }
        Ok(())
    }
}

/// The two legs of a trip: current location to pickup, pickup to destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub to_pickup: RouteLeg,
    pub to_destination: RouteLeg,
}

impl Route {
    pub fn new(to_pickup: RouteLeg, to_destination: RouteLeg) -> Self {
        Self {
            to_pickup,
            to_destination,
        }
    }

    pub fn legs(&self) -> [&RouteLeg; 2] {
        [&self.to_pickup, &self.to_destination]
    }

    pub fn distance(&self) -> Distance {
        self.to_pickup.distance + self.to_destination.distance
    }

    pub fn duration(&self) -> Duration {
        self.to_pickup.duration + self.to_destination.duration
    }

    /// Geometry of both legs joined at the pickup, without repeated points.
    pub fn points(&self) -> Vec<Coordinate> {
        let mut points: Vec<_> = self
            .legs()
            .into_iter()
            .flat_map(|leg| leg.polyline.points().iter().copied())
            .collect();
        points.dedup();
        points
    }
}

#[test]
fn distance_after_is_linear() {
    let leg = RouteLeg::straight(
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 1.0),
        Distance::from_miles(100.0),
        Duration::from_hours(2),
    );
    let half = leg.distance_after(Duration::from_hours(1));
    assert!((half.as_miles() - 50.0).abs() < 1e-9);
    assert_eq!(leg.distance_after(Duration::from_hours(5)), leg.distance);
}

#[test]
fn time_to_cover_rounds_up() {
    let leg = RouteLeg::straight(
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 1.0),
        Distance::from_meters(3.0),
        Duration::from_seconds(10),
    );
    // 1 m of 3 m is 3.33 s
    assert_eq!(leg.time_to_cover(Distance::from_meters(1.0)).as_seconds(), 4);
    assert_eq!(leg.time_to_cover(Distance::from_meters(30.0)), leg.duration);
    assert_eq!(leg.time_to_cover(Distance::ZERO), Duration::ZERO);
}

#[test]
fn position_follows_polyline() {
    let start = Coordinate::new(0.0, 0.0);
    let end = Coordinate::new(0.0, 2.0);
    let leg = RouteLeg::straight(start, end, Distance::from_miles(138.0), Duration::from_hours(2));
    assert_eq!(leg.position_after(Duration::ZERO), start);
    assert_eq!(leg.position_after(Duration::from_hours(3)), end);
    let mid = leg.position_after(Duration::from_hours(1));
    assert!((mid.longitude - 1.0).abs() < 1e-6);
}

#[test]
fn check_rejects_instant_travel() {
    let leg = RouteLeg::straight(
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 2.0),
        Distance::from_miles(138.0),
        Duration::ZERO,
    );
    assert!(leg.check().is_err());
}

#[test]
fn route_points_share_the_pickup() {
    let pickup = Coordinate::new(0.0, 1.0);
    let route = Route::new(
        RouteLeg::straight(
            Coordinate::new(0.0, 0.0),
            pickup,
            Distance::from_miles(69.0),
            Duration::from_hours(1),
        ),
        RouteLeg::straight(
            pickup,
            Coordinate::new(0.0, 2.0),
            Distance::from_miles(69.0),
            Duration::from_hours(1),
        ),
    );
    assert_eq!(route.points().len(), 3);
    assert_eq!(route.duration(), Duration::from_hours(2));
}

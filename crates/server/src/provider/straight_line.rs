use async_trait::async_trait;
use haulplan::prelude::*;

use crate::provider::{Error, RouteProvider};

/// Router for when no routing engine is configured: great circle distance
/// times the road circuity factor, driven at a flat average speed.
#[derive(Debug, Clone, Copy)]
pub struct StraightLineRouter {
    average_speed_mph: f64,
    /// Longest gap between two points of the drawn line.
    max_segment: Distance,
}

impl Default for StraightLineRouter {
    fn default() -> Self {
        Self {
            average_speed_mph: 55.0,
            max_segment: Distance::from_miles(10.0),
        }
    }
}

impl StraightLineRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leg(&self, from: Coordinate, to: Coordinate) -> RouteLeg {
        let distance = from.network_distance(&to);
        let hours = distance.as_miles() / self.average_speed_mph;
        let segments = (from.great_circle_distance(&to) / self.max_segment).ceil().max(1.0) as usize;
        let mut points: Vec<_> = (0..segments)
            .map(|i| from.lerp(&to, i as f64 / segments as f64))
            .collect();
        points.push(to);
        RouteLeg::new(
            from,
            to,
            Polyline::new(points),
            distance,
            Duration::from_seconds_f64(hours * 3600.0),
        )
    }
}

#[async_trait]
impl RouteProvider for StraightLineRouter {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<RouteLeg, Error> {
        Ok(self.leg(from, to))
    }

    fn name(&self) -> &'static str {
        "straight-line"
    }
}

#[test]
fn chicago_to_denver_is_a_long_day() {
    let chicago = Coordinate::new(41.8781, -87.6298);
    let denver = Coordinate::new(39.7392, -104.9903);
    let leg = StraightLineRouter::new().leg(chicago, denver);
    // ~920 mi as the crow flies, ~1,200 mi on the road
    assert!((1_150.0..1_250.0).contains(&leg.distance.as_miles()));
    assert!((20.0..23.0).contains(&leg.duration.as_hours()));
    assert!(leg.polyline.points().len() > 90);
    assert_eq!(leg.polyline.first(), Some(chicago));
    assert_eq!(leg.polyline.last(), Some(denver));
    assert!(leg.check().is_ok());
}

#[test]
fn same_place_is_an_empty_leg() {
    let here = Coordinate::new(41.8781, -87.6298);
    let leg = StraightLineRouter::new().leg(here, here);
    assert!(leg.is_empty());
    assert_eq!(leg.polyline.points().len(), 2);
}

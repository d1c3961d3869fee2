use crate::shared::geo::{Coordinate, Distance};

/// Route geometry with its arc length parameterization.
///
/// `cumulative[i]` is the distance along the line from the first point to
/// point `i`, so locating the segment that contains a given distance is a
/// binary search instead of a rescan of the whole line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    points: Box<[Coordinate]>,
    cumulative: Box<[Distance]>,
}

impl From<Vec<Coordinate>> for Polyline {
    fn from(value: Vec<Coordinate>) -> Self {
        Self::new(value)
    }
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = Distance::ZERO;
        for (i, point) in points.iter().enumerate() {
            if i > 0 {
                total += points[i - 1].great_circle_distance(point);
            }
            cumulative.push(total);
        }
        Self {
            points: points.into(),
            cumulative: cumulative.into(),
        }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Coordinate> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }

    /// Length of the line measured point to point.
    pub fn length(&self) -> Distance {
        self.cumulative.last().copied().unwrap_or_default()
    }

    /// The point `distance` along the line, clamped to its ends.
    pub fn point_at_distance(&self, distance: Distance) -> Option<Coordinate> {
        let first = self.first()?;
        if distance <= Distance::ZERO || self.points.len() == 1 {
            return Some(first);
        }
        if distance >= self.length() {
            return self.last();
        }

        // First index whose cumulative distance reaches `distance`, never 0 here
        let end = self.cumulative.partition_point(|d| *d < distance);
        let start = end - 1;
        let segment = self.cumulative[end] - self.cumulative[start];
        if segment <= Distance::ZERO {
            return Some(self.points[end]);
        }
        let fraction = (distance - self.cumulative[start]) / segment;
        Some(self.points[start].lerp(&self.points[end], fraction))
    }

    /// The point at `fraction` (0 to 1) of the line's length.
    pub fn point_at_fraction(&self, fraction: f64) -> Option<Coordinate> {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.point_at_distance(self.length() * fraction)
    }
}

#[test]
fn empty_polyline() {
    let line = Polyline::new(vec![]);
    assert!(line.is_empty());
    assert_eq!(line.length(), Distance::ZERO);
    assert_eq!(line.point_at_fraction(0.5), None);
}

#[test]
fn single_point_polyline() {
    let point = Coordinate::new(41.0, -87.0);
    let line = Polyline::new(vec![point]);
    assert_eq!(line.point_at_fraction(0.7), Some(point));
}

#[test]
fn cumulative_length_matches_segments() {
    let a = Coordinate::new(0.0, 0.0);
    let b = Coordinate::new(0.0, 1.0);
    let c = Coordinate::new(0.0, 3.0);
    let line = Polyline::new(vec![a, b, c]);
    let expected = a.great_circle_distance(&b) + b.great_circle_distance(&c);
    assert!((line.length().as_meters() - expected.as_meters()).abs() < 1e-6);
}

#[test]
fn interpolates_inside_the_right_segment() {
    // Equator: one degree of longitude per segment, the second twice as long
    let line = Polyline::new(vec![
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 1.0),
        Coordinate::new(0.0, 3.0),
    ]);
    let halfway = line.point_at_fraction(0.5).unwrap();
    assert!((halfway.longitude - 1.5).abs() < 1e-6);
    let sixth = line.point_at_fraction(1.0 / 6.0).unwrap();
    assert!((sixth.longitude - 0.5).abs() < 1e-6);
}

#[test]
fn clamps_to_the_ends() {
    let a = Coordinate::new(10.0, 10.0);
    let b = Coordinate::new(11.0, 10.0);
    let line = Polyline::new(vec![a, b]);
    assert_eq!(line.point_at_fraction(-1.0), Some(a));
    assert_eq!(line.point_at_fraction(3.0), Some(b));
    assert_eq!(line.point_at_fraction(f64::NAN), Some(a));
}

#[test]
fn duplicate_points_do_not_divide_by_zero() {
    let a = Coordinate::new(10.0, 10.0);
    let b = Coordinate::new(10.5, 10.0);
    let line = Polyline::new(vec![a, a, b, b]);
    let mid = line.point_at_fraction(0.5).unwrap();
    assert!(mid.latitude.is_finite());
    assert!((mid.latitude - 10.25).abs() < 1e-6);
}

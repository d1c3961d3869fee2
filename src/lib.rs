//! Hours-of-Service aware trip planning.
//!
//! The crate takes the two legs of a truck trip (current location to
//! pickup, pickup to destination) and lays out a timeline of driving,
//! cargo handling, fuel stops, 30-minute breaks and 10-hour rests that
//! keeps the driver inside the 70-hour/8-day property-carrying rules.
//! Fetching the legs from a mapping provider is left to the caller.

pub mod hos;
pub mod route;
pub mod scheduler;
pub mod shared;

pub mod prelude {
    pub use crate::{
        hos::{HosClock, HosState, Limits, StopDecision},
        route::{Polyline, Route, RouteLeg},
        scheduler::{DutyStatus, Reason, Scheduler, Settings, Stop, Timeline},
        shared::{Coordinate, Distance, Duration, Time},
    };
}

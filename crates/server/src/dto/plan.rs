use haulplan::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryDto {
    pub total_miles: f64,
    /// Hours.
    pub predicted_driving_time: f64,
    pub total_shifts: u32,
    pub total_estimated_arrival: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntryDto {
    #[serde(rename = "type")]
    pub status: String,
    pub reason: String,
    pub location: Coordinate,
    pub address: String,
    pub start_time: String,
    pub end_time: String,
    /// Minutes.
    pub duration: f64,
    pub shift: u32,
    /// Miles driven, zero for stops.
    pub distance: f64,
    /// Cycle hours used once the entry is over.
    pub cycle_used: f64,
}

impl TimelineEntryDto {
    pub fn from(stop: &Stop) -> Self {
        Self {
            status: status_label(stop.status).to_string(),
            reason: reason_label(stop.reason).to_string(),
            location: stop.location,
            address: stop
                .address
                .as_deref()
                .map(str::to_string)
                .unwrap_or_else(|| stop.location.to_string()),
            start_time: stop.start.to_dmy_hms_string(),
            end_time: stop.end.to_dmy_hms_string(),
            duration: round(stop.duration.as_minutes(), 2),
            shift: stop.shift,
            distance: round(stop.distance.as_miles(), 1),
            cycle_used: round(stop.cycle_used.as_hours(), 2),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlanDto {
    pub summary: SummaryDto,
    pub timeline: Vec<TimelineEntryDto>,
    /// `[latitude, longitude]` pairs of both legs.
    pub polyline: Vec<[f64; 2]>,
}

impl TripPlanDto {
    pub fn from(route: &Route, timeline: &Timeline, departure: Time) -> Self {
        let arrival = timeline.arrival().unwrap_or(departure);
        Self {
            summary: SummaryDto {
                total_miles: round(route.distance().as_miles(), 1),
                predicted_driving_time: round(timeline.driving_time().as_hours(), 1),
                total_shifts: timeline.shifts(),
                total_estimated_arrival: arrival.to_dmy_hms_string(),
            },
            timeline: timeline.stops().iter().map(TimelineEntryDto::from).collect(),
            polyline: route.points().into_iter().map(<[f64; 2]>::from).collect(),
        }
    }
}

/// Labels the dashboard picks icons by.
pub fn status_label(status: DutyStatus) -> &'static str {
    match status {
        DutyStatus::OnDuty => "On Duty",
        DutyStatus::OffDuty => "Off Duty",
        DutyStatus::SleeperBerth => "Sleeper Berth",
        DutyStatus::Driving => "Driving",
    }
}

pub fn reason_label(reason: Reason) -> &'static str {
    match reason {
        Reason::Break30 => "30 Min Break",
        Reason::Rest10h => "10 Hour Rest",
        Reason::Fueling => "Fueling",
        Reason::PickupPoint => "Pickup Point",
        Reason::DropoffPoint => "Dropoff Point",
        Reason::None => "",
    }
}

fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

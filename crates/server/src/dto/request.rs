use haulplan::shared::Time;
use serde::Deserialize;

/// `currentCycle` as forms send it, a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CycleDto {
    Hours(f64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequestDto {
    pub origin: Option<String>,
    pub pickup: Option<String>,
    pub destination: Option<String>,
    pub current_cycle: Option<CycleDto>,
    pub time: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub origin: String,
    pub pickup: String,
    pub destination: String,
    pub current_cycle: f64,
    pub departure: Time,
}

impl TripRequestDto {
    pub fn validate(self, max_cycle: f64) -> Result<TripRequest, String> {
        let origin = required("origin", self.origin)?;
        let pickup = required("pickup", self.pickup)?;
        let destination = required("destination", self.destination)?;

        let current_cycle = match self.current_cycle {
            Some(CycleDto::Hours(hours)) => hours,
            Some(CycleDto::Text(text)) => text
                .trim()
                .parse()
                .map_err(|_| format!("currentCycle must be a number of hours, got \"{text}\""))?,
            None => return Err("currentCycle is required".into()),
        };
        if !current_cycle.is_finite() || !(0.0..=max_cycle).contains(&current_cycle) {
            return Err(format!("currentCycle must be between 0 and {max_cycle} hours"));
        }

        let time = required("time", self.time)?;
        let departure = Time::parse(&time)
            .ok_or_else(|| format!("time must be an ISO-8601 timestamp, got \"{time}\""))?;

        Ok(TripRequest {
            origin,
            pickup,
            destination,
            current_cycle,
            departure,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| format!("{field} is required"))
}

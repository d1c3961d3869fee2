use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use futures_util::{StreamExt, stream};
use haulplan::prelude::*;
use std::{sync::Arc, time::Instant};
use tracing::{info, warn};

use crate::{
    dto::{TripPlanDto, TripRequest, TripRequestDto},
    error::ApiError,
    provider::{self, Place},
    state::AppState,
};

pub async fn plan_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TripRequestDto>, JsonRejection>,
) -> Result<Json<TripPlanDto>, ApiError> {
    let Json(dto) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let request = dto
        .validate(state.limits.cycle_cap.as_hours())
        .map_err(ApiError::Validation)?;
    info!(
        "Planning {} -> {} -> {} with {}h on the cycle",
        request.origin, request.pickup, request.destination, request.current_cycle
    );
    let now = Instant::now();
    let plan = plan_trip(&state, &request).await?;
    info!(
        "Planned {:.1} mi over {} shifts in {:?}",
        plan.summary.total_miles,
        plan.summary.total_shifts,
        now.elapsed()
    );
    Ok(Json(plan))
}

/// Geocodes the three places, routes both legs, schedules the stops and
/// dresses the result up for the dashboard.
pub async fn plan_trip(state: &AppState, request: &TripRequest) -> Result<TripPlanDto, ApiError> {
    let (origin, pickup, destination) = tokio::try_join!(
        geocode(state, &request.origin),
        geocode(state, &request.pickup),
        geocode(state, &request.destination),
    )?;
    let (to_pickup, to_destination) = tokio::try_join!(
        route(state, origin.coordinate, pickup.coordinate),
        route(state, pickup.coordinate, destination.coordinate),
    )?;
    let route = Route::new(to_pickup, to_destination);

    let mut timeline = Scheduler::for_route(&route, request.departure)
        .cycle_hours(request.current_cycle)
        .with_settings(state.settings)
        .with_limits(state.limits)
        .labels(origin.label, pickup.label, destination.label)
        .solve()?;

    if state.reverse_geocode {
        fill_addresses(state, &mut timeline).await;
    }
    Ok(TripPlanDto::from(&route, &timeline, request.departure))
}

async fn geocode(state: &AppState, query: &str) -> Result<Place, provider::Error> {
    let geocoder = &state.geocoder;
    state
        .policy
        .run(geocoder.name(), || geocoder.geocode(query))
        .await
}

async fn route(state: &AppState, from: Coordinate, to: Coordinate) -> Result<RouteLeg, provider::Error> {
    let router = &state.router;
    state.policy.run(router.name(), || router.route(from, to)).await
}

/// Names the stops that did not come with one. Each distinct location is
/// looked up once, and a failed lookup leaves the stop unnamed.
async fn fill_addresses(state: &AppState, timeline: &mut Timeline) {
    let mut pending: Vec<Coordinate> = Vec::new();
    for stop in timeline.stops() {
        if stop.address.is_none() && !pending.contains(&stop.location) {
            pending.push(stop.location);
        }
    }
    if pending.is_empty() {
        return;
    }

    let geocoder = &state.geocoder;
    let resolved: Vec<(Coordinate, Option<Arc<str>>)> = stream::iter(pending)
        .map(|coordinate| async move {
            let address = state
                .policy
                .run(geocoder.name(), || geocoder.reverse(coordinate))
                .await
                .unwrap_or_else(|err| {
                    warn!("No address for {coordinate}: {err}");
                    None
                });
            (coordinate, address.map(Arc::<str>::from))
        })
        .buffered(state.reverse_geocode_concurrency.max(1))
        .collect()
        .await;

    for stop in timeline.stops_mut() {
        if stop.address.is_none() {
            stop.address = resolved
                .iter()
                .find(|(coordinate, _)| *coordinate == stop.location)
                .and_then(|(_, address)| address.clone());
        }
    }
}

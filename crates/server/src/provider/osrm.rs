use async_trait::async_trait;
use haulplan::prelude::*;
use serde::Deserialize;
use tracing::debug;

use crate::provider::{Error, RouteProvider, decode_polyline};

const SERVICE: &str = "osrm";

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
    geometry: String,
}

/// Router backed by an OSRM `route` service.
#[derive(Debug, Clone)]
pub struct OsrmRouter {
    config: OsrmConfig,
    client: reqwest::Client,
}

impl OsrmRouter {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl RouteProvider for OsrmRouter {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<RouteLeg, Error> {
        let url = format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=polyline",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            from.longitude,
            from.latitude,
            to.longitude,
            to.latitude
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| Error::from_reqwest(SERVICE, err))?;
        // OSRM answers NoRoute and friends with a 400 and a JSON body
        let status = response.status();
        if status.is_server_error() {
            return Err(Error::Upstream {
                service: SERVICE,
                message: format!("status {status}"),
            });
        }
        let body: OsrmRouteResponse = response
            .json()
            .await
            .map_err(|err| Error::from_reqwest(SERVICE, err))?;
        let leg = leg_from_response(from, to, body)?;
        debug!(
            "Routed {from} to {to}: {:.1} mi in {}",
            leg.distance.as_miles(),
            leg.duration
        );
        Ok(leg)
    }

    fn name(&self) -> &'static str {
        SERVICE
    }
}

fn leg_from_response(from: Coordinate, to: Coordinate, body: OsrmRouteResponse) -> Result<RouteLeg, Error> {
    match body.code.as_str() {
        "Ok" => {}
        "NoRoute" | "NoSegment" => {
            return Err(Error::NotFound(format!("a driving route from {from} to {to}")));
        }
        code => {
            return Err(Error::Upstream {
                service: SERVICE,
                message: format!("{code}: {}", body.message.unwrap_or_default()),
            });
        }
    }
    let route = body.routes.into_iter().next().ok_or_else(|| Error::Decode {
        service: SERVICE,
        message: "no routes in an Ok response".into(),
    })?;
    let mut points = decode_polyline(&route.geometry, 5)?;
    if points.len() < 2 {
        points = vec![from, to];
    }
    Ok(RouteLeg::new(
        from,
        to,
        Polyline::new(points),
        Distance::from_meters(route.distance),
        Duration::from_seconds_f64(route.duration),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> OsrmRouteResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn ok_response_becomes_a_leg() {
        let from = Coordinate::new(38.5, -120.2);
        let to = Coordinate::new(43.252, -126.453);
        let leg = leg_from_response(
            from,
            to,
            body(r#"{"code": "Ok", "routes": [{"distance": 804672.0, "duration": 30600.4, "geometry": "_p~iF~ps|U_ulLnnqC_mqNvxq`@"}]}"#),
        )
        .unwrap();
        assert_eq!(leg.polyline.points().len(), 3);
        assert!((leg.distance.as_miles() - 500.0).abs() < 1e-6);
        assert_eq!(leg.duration, Duration::from_seconds(30600));
        assert_eq!(leg.start, from);
        assert_eq!(leg.end, to);
    }

    #[test]
    fn no_route_is_not_found() {
        let result = leg_from_response(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 1.0),
            body(r#"{"code": "NoRoute", "message": "Impossible route between points"}"#),
        );
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn other_codes_are_upstream_failures() {
        let result = leg_from_response(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 1.0),
            body(r#"{"code": "TooBig", "message": "Too many coordinates"}"#),
        );
        assert!(matches!(result, Err(Error::Upstream { .. })));
    }

    #[test]
    fn single_point_geometry_falls_back_to_endpoints() {
        let here = Coordinate::new(41.0, -87.0);
        let leg = leg_from_response(
            here,
            here,
            body(r#"{"code": "Ok", "routes": [{"distance": 0.0, "duration": 0.0, "geometry": ""}]}"#),
        )
        .unwrap();
        assert_eq!(leg.polyline.points(), &[here, here]);
        assert!(leg.is_empty());
    }
}

use async_trait::async_trait;
use haulplan::shared::Coordinate;
use serde::Deserialize;
use tracing::debug;

use crate::provider::{Error, Geocoder, Place};

const SERVICE: &str = "nominatim";

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResult {
    display_name: Option<String>,
}

/// Geocoder backed by a Nominatim instance.
pub struct NominatimGeocoder {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str, timeout: std::time::Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, Error> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| Error::from_reqwest(SERVICE, err))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                service: SERVICE,
                message: format!("status {status}: {body}"),
            });
        }
        response
            .json()
            .await
            .map_err(|err| Error::from_reqwest(SERVICE, err))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Place, Error> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );
        let results: Vec<SearchResult> = self.get(&url).await?;
        let place = parse_search(results).ok_or_else(|| Error::NotFound(query.to_string()))??;
        debug!("Geocoded \"{query}\" to {}", place.coordinate);
        Ok(place)
    }

    async fn reverse(&self, coordinate: Coordinate) -> Result<Option<String>, Error> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&zoom=14",
            self.base_url, coordinate.latitude, coordinate.longitude
        );
        let result: ReverseResult = self.get(&url).await?;
        Ok(result.display_name.filter(|name| !name.trim().is_empty()))
    }

    fn name(&self) -> &'static str {
        SERVICE
    }
}

/// The first hit, if any. A hit with unreadable coordinates is a decode error.
fn parse_search(results: Vec<SearchResult>) -> Option<Result<Place, Error>> {
    let result = results.into_iter().next()?;
    let coordinate = match (result.lat.parse(), result.lon.parse()) {
        (Ok(latitude), Ok(longitude)) => Coordinate::new(latitude, longitude),
        _ => {
            return Some(Err(Error::Decode {
                service: SERVICE,
                message: format!("bad coordinates {}, {}", result.lat, result.lon),
            }));
        }
    };
    if !coordinate.is_valid() {
        return Some(Err(Error::Decode {
            service: SERVICE,
            message: format!("coordinates out of range: {coordinate}"),
        }));
    }
    Some(Ok(Place {
        coordinate,
        label: result.display_name,
    }))
}

#[test]
fn search_takes_first_hit() {
    let body = r#"[
        {"lat": "41.8755616", "lon": "-87.6244212", "display_name": "Chicago, Cook County, Illinois, United States"},
        {"lat": "41.0", "lon": "-87.0", "display_name": "Somewhere else"}
    ]"#;
    let results: Vec<SearchResult> = serde_json::from_str(body).unwrap();
    let place = parse_search(results).unwrap().unwrap();
    assert_eq!(place.coordinate, Coordinate::new(41.8755616, -87.6244212));
    assert!(place.label.starts_with("Chicago"));
}

#[test]
fn empty_search_is_no_hit() {
    assert!(parse_search(Vec::new()).is_none());
}

#[test]
fn garbage_coordinates_are_decode_errors() {
    let results = vec![SearchResult {
        lat: "north".into(),
        lon: "-87.0".into(),
        display_name: "Nowhere".into(),
    }];
    assert!(matches!(
        parse_search(results),
        Some(Err(Error::Decode { .. }))
    ));
}

#[test]
fn reverse_without_match_is_none() {
    let result: ReverseResult = serde_json::from_str(r#"{"error": "Unable to geocode"}"#).unwrap();
    assert!(result.display_name.is_none());
}

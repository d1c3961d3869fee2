use anyhow::{Context, Result};
use haulplan::prelude::*;
use std::sync::Arc;
use tracing::info;

use crate::{
    config::Config,
    provider::{
        CallPolicy, Geocoder, NominatimGeocoder, OsrmConfig, OsrmRouter, RouteProvider,
        StraightLineRouter,
    },
};

pub struct AppState {
    pub geocoder: Arc<dyn Geocoder>,
    pub router: Arc<dyn RouteProvider>,
    pub policy: CallPolicy,
    pub reverse_geocode: bool,
    pub reverse_geocode_concurrency: usize,
    pub settings: Settings,
    pub limits: Limits,
}

impl AppState {
    pub fn new(geocoder: Arc<dyn Geocoder>, router: Arc<dyn RouteProvider>) -> Self {
        Self {
            geocoder,
            router,
            policy: CallPolicy::default(),
            reverse_geocode: true,
            reverse_geocode_concurrency: 4,
            settings: Settings::default(),
            limits: Limits::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let geocoder = NominatimGeocoder::new(
            &config.nominatim_url,
            &config.user_agent,
            config.provider_timeout,
        )
        .context("Failed to build the geocoding client")?;
        info!("Geocoding with {}", config.nominatim_url);

        let router: Arc<dyn RouteProvider> = match &config.osrm_url {
            Some(url) => {
                let router = OsrmRouter::new(OsrmConfig {
                    base_url: url.clone(),
                    timeout_secs: config.provider_timeout.as_secs(),
                    ..Default::default()
                })
                .context("Failed to build the routing client")?;
                info!("Routing with OSRM at {url}");
                Arc::new(router)
            }
            None => {
                info!("No OSRM_URL set, estimating legs as straight lines");
                Arc::new(StraightLineRouter::new())
            }
        };

        Ok(Self {
            policy: CallPolicy {
                timeout: config.provider_timeout,
                backoff: config.retry_backoff,
            },
            reverse_geocode: config.reverse_geocode,
            reverse_geocode_concurrency: config.reverse_geocode_concurrency,
            ..Self::new(Arc::new(geocoder), router)
        })
    }
}

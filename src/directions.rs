use async_std::task;
use log::*;
use reqwest::blocking::Client;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, ConfigError, UpstreamError};

pub const ENGINE: &str = "google_maps_directions";
pub const ORIGIN: &str = "current location";

/**
 * Read-through proxy to the directions search service
 *
 * Requests are made with reqwest's blocking client on async-std's blocking pool, the client
 * carries the configured timeout so a stuck upstream fails the request instead of hanging it.
 */
#[derive(Clone, Debug)]
pub struct DirectionsProxy {
    client: Arc<Client>,
    endpoint: String,
    api_key: Option<String>,
}

impl DirectionsProxy {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.directions_timeout)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            endpoint: config.directions_url.clone(),
            api_key: config.serpapi_key.clone(),
        })
    }

    /**
     * Directions from the resident's current location to `lat,lng`
     *
     * Returns the upstream body untouched.
     */
    pub async fn directions(&self, lat: Option<&str>, lng: Option<&str>) -> Result<String, AppError> {
        let present = |v: Option<&str>| v.filter(|v| !v.is_empty()).map(str::to_string);
        let (lat, lng) = match (present(lat), present(lng)) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => return Err(AppError::MissingCoordinates),
        };

        let params = self.query(&lat, &lng);
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        debug!("Fetching directions to {},{}", lat, lng);
        task::spawn_blocking(move || fetch(&client, &endpoint, &params))
            .await
            .map_err(|err| {
                error!("Error fetching directions: {}", err);
                AppError::Upstream(err)
            })
    }

    fn query(&self, lat: &str, lng: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("engine", ENGINE.to_string()),
            ("origin", ORIGIN.to_string()),
            ("destination", format!("{},{}", lat, lng)),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }
}

fn fetch(client: &Client, endpoint: &str, params: &[(&str, String)]) -> Result<String, UpstreamError> {
    let response = client.get(endpoint).query(params).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status.as_u16()));
    }
    Ok(response.text()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn proxy(endpoint: &str, key: Option<&str>) -> DirectionsProxy {
        let config = Config {
            directions_url: endpoint.to_string(),
            serpapi_key: key.map(str::to_string),
            directions_timeout: Duration::from_secs(2),
            ..Config::default()
        };
        DirectionsProxy::from_config(&config).unwrap()
    }

    #[test]
    fn query_carries_destination_and_key() {
        let params = proxy("http://localhost/search", Some("k3y")).query("30.26", "-97.74");
        assert_eq!(
            params,
            vec![
                ("engine", "google_maps_directions".to_string()),
                ("origin", "current location".to_string()),
                ("destination", "30.26,-97.74".to_string()),
                ("api_key", "k3y".to_string()),
            ]
        );
    }

    #[test]
    fn query_without_key() {
        let params = proxy("http://localhost/search", None).query("1", "2");
        assert!(params.iter().all(|(name, _)| *name != "api_key"));
    }

    #[async_std::test]
    async fn missing_coordinates() {
        let proxy = proxy("http://127.0.0.1:9/search", None);
        for (lat, lng) in &[(None, Some("1")), (Some("1"), None), (Some(""), Some("1")), (None, None)] {
            let result = proxy.directions(*lat, *lng).await;
            assert!(matches!(result, Err(AppError::MissingCoordinates)));
        }
    }

    #[async_std::test]
    async fn unreachable_upstream_is_an_upstream_error() {
        // nothing listens on the discard port
        let proxy = proxy("http://127.0.0.1:9/search", None);
        let result = proxy.directions(Some("30.26"), Some("-97.74")).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }
}

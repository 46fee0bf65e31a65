//! HTTP transport for the popup lookups.

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use gloo_net::http::Request;
use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::model::{Flight, GeographicCoordinate, LocationAttributes, NearFlightsResponse};
use crate::state::requests::InfoClient;

pub fn near_flights_url(flight_id: &str, location: GeographicCoordinate, time: f64) -> String {
    format!(
        "/flights/{}/near?lon={}&lat={}&time={}",
        flight_id, location.lon, location.lat, time
    )
}

pub fn mapitems_url(api_base_url: &str, location: GeographicCoordinate) -> String {
    format!(
        "{}/mapitems?lon={}&lat={}",
        api_base_url.trim_end_matches('/'),
        location.lon,
        location.lat
    )
}

async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, FetchError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;
    if !resp.ok() {
        return Err(FetchError::Status(resp.status()));
    }
    let text = resp
        .text()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Loads a list of flights in the nearby-answer shape from `url`.
pub async fn load_tracks(url: &str) -> Result<Vec<Flight>, FetchError> {
    let body: NearFlightsResponse = fetch_json(url).await?;
    Ok(body.flights.into_iter().map(Flight::from_record).collect())
}

#[derive(Clone, Debug)]
pub struct HttpInfoClient {
    api_base_url: String,
}

impl HttpInfoClient {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
        }
    }
}

impl InfoClient for HttpInfoClient {
    fn nearby_flights(
        &self,
        flight_id: &str,
        location: GeographicCoordinate,
        time: f64,
    ) -> LocalBoxFuture<'static, Result<Vec<Flight>, FetchError>> {
        let url = near_flights_url(flight_id, location, time);
        async move { load_tracks(&url).await }.boxed_local()
    }

    fn location_attributes(
        &self,
        location: GeographicCoordinate,
    ) -> LocalBoxFuture<'static, Result<LocationAttributes, FetchError>> {
        let url = mapitems_url(&self.api_base_url, location);
        async move { fetch_json::<LocationAttributes>(&url).await }.boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_url_carries_position_and_time() {
        let url = near_flights_url("1234", GeographicCoordinate::new(7.5, 50.25), 1_500_000_000.0);
        assert_eq!(url, "/flights/1234/near?lon=7.5&lat=50.25&time=1500000000");
    }

    #[test]
    fn mapitems_url_joins_base_once() {
        let at = GeographicCoordinate::new(-1.0, 45.0);
        assert_eq!(mapitems_url("/api", at), "/api/mapitems?lon=-1&lat=45");
        assert_eq!(
            mapitems_url("https://maps.example.org/", at),
            "https://maps.example.org/mapitems?lon=-1&lat=45"
        );
    }
}

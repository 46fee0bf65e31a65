//! Core data types for the map overlay.
//! Coordinates, tracked flights and the JSON payloads of the info endpoints.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A point in the map projection (EPSG:3857, metres).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectedCoordinate {
    pub x: f64,
    pub y: f64,
}

impl ProjectedCoordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Longitude/latitude in degrees (EPSG:4326).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeographicCoordinate {
    pub lon: f64,
    pub lat: f64,
}

impl GeographicCoordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Screen position relative to the map canvas, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// One user click on the map. Produced once per gesture and never mutated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClickEvent {
    pub point: ProjectedCoordinate,
    pub pixel: Pixel,
}

/// One recorded fix of a track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub coordinate: ProjectedCoordinate,
    /// Seconds, as delivered by the tracking backend.
    pub time: f64,
}

/// Fallback badge colour for flights that arrive without one.
pub const DEFAULT_FLIGHT_COLOR: &str = "#004bbd";

/// A tracked flight as drawn on the map.
#[derive(Clone, Debug, PartialEq)]
pub struct Flight {
    pub id: String,
    pub registration: Option<String>,
    pub color: String,
    pub path: Vec<TrackPoint>,
}

/// What the popup shows for a flight that was hit.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureBadge {
    pub label: String,
    pub color: String,
}

/// Closest point of the hit feature to a click.
#[derive(Clone, Debug, PartialEq)]
pub struct ClosestPointResult {
    pub point: ProjectedCoordinate,
    pub timestamp: f64,
    pub feature_id: String,
}

// Wire types

/// Body of `GET /flights/{id}/near`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct NearFlightsResponse {
    #[serde(default)]
    pub flights: Vec<FlightRecord>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FlightRecord {
    #[serde(deserialize_with = "id_string")]
    pub sfid: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub registration: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub color: Option<String>,
    /// `[lon, lat, time]` fixes.
    #[serde(default)]
    pub points: Vec<[f64; 3]>,
}

/// Body of `GET {api}/mapitems`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LocationAttributes {
    #[serde(default, deserialize_with = "opt_list")]
    pub airspaces: Vec<Airspace>,
    #[serde(default, deserialize_with = "opt_list")]
    pub waves: Vec<MountainWave>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Airspace {
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "text")]
    pub class: String,
    #[serde(default, deserialize_with = "text")]
    pub base: String,
    #[serde(default, deserialize_with = "text")]
    pub top: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MountainWave {
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub main_wind_direction: Option<String>,
}

impl MountainWave {
    pub fn wind_direction(&self) -> &str {
        match self.main_wind_direction.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => "Unknown",
        }
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(value_to_string(Value::deserialize(d)?))
}

fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(value_to_string(Value::deserialize(d)?).unwrap_or_default())
}

fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    value_to_string(Value::deserialize(d)?)
        .ok_or_else(|| serde::de::Error::custom("flight id must not be null"))
}

fn opt_list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_without_wind_direction_reads_unknown() {
        let attrs: LocationAttributes =
            serde_json::from_str(r#"{"waves":[{"name":"Ridge A"}]}"#).unwrap();
        assert_eq!(attrs.waves.len(), 1);
        assert_eq!(attrs.waves[0].name, "Ridge A");
        assert_eq!(attrs.waves[0].wind_direction(), "Unknown");
        assert!(attrs.airspaces.is_empty());
    }

    #[test]
    fn numeric_ids_and_directions_become_text() {
        let near: NearFlightsResponse = serde_json::from_str(
            r#"{"flights":[{"sfid":42,"points":[[7.0,51.0,36000.0]]}]}"#,
        )
        .unwrap();
        assert_eq!(near.flights[0].sfid, "42");
        assert_eq!(near.flights[0].registration, None);

        let attrs: LocationAttributes = serde_json::from_str(
            r#"{"airspaces":null,"waves":[{"name":"Lee","main_wind_direction":270}]}"#,
        )
        .unwrap();
        assert!(attrs.airspaces.is_empty());
        assert_eq!(attrs.waves[0].wind_direction(), "270");
    }

    #[test]
    fn empty_payload_is_empty_attributes() {
        let attrs: LocationAttributes = serde_json::from_str("{}").unwrap();
        assert_eq!(attrs, LocationAttributes::default());
    }

    #[test]
    fn missing_sfid_is_rejected() {
        let err = serde_json::from_str::<FlightRecord>(r#"{"registration":"D-1234"}"#);
        assert!(err.is_err());
    }
}

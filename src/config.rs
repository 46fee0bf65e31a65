//! Overlay configuration.
//!
//! Read once at start-up from `<meta>` tags in the host page, either a full
//! JSON document in `overlay-config` or one tag per field.

use serde::{Deserialize, Serialize};

use crate::error::OverlayError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Offer flight hit-testing and the "load nearby flights" action.
    pub flight_info: bool,
    /// Offer the "get location info" action.
    pub location_info: bool,
    /// Base URL of the map-items API, without trailing slash.
    pub api_base_url: String,
    /// Flights to show when the map starts (same shape as the nearby answer).
    pub tracks_url: Option<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            flight_info: true,
            location_info: true,
            api_base_url: "/api".to_string(),
            tracks_url: None,
        }
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

impl OverlayConfig {
    pub fn from_json(raw: &str) -> Result<Self, OverlayError> {
        serde_json::from_str(raw).map_err(|e| OverlayError::Config(e.to_string()))
    }

    /// Applies per-field overrides looked up through `lookup(meta name)`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("overlay-flight-info").as_deref().and_then(parse_flag) {
            self.flight_info = v;
        }
        if let Some(v) = lookup("overlay-location-info").as_deref().and_then(parse_flag) {
            self.location_info = v;
        }
        if let Some(url) = lookup("overlay-api-url") {
            self.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("overlay-tracks-url") {
            self.tracks_url = Some(url).filter(|u| !u.is_empty());
        }
        self
    }

    pub fn from_document(document: &web_sys::Document) -> Self {
        let lookup = |name: &str| {
            document
                .query_selector(&format!("meta[name=\"{name}\"]"))
                .ok()
                .flatten()
                .and_then(|el| el.get_attribute("content"))
        };
        let base = match lookup("overlay-config") {
            Some(raw) => Self::from_json(&raw).unwrap_or_else(|e| {
                log::warn!("{e}, falling back to defaults");
                Self::default()
            }),
            None => Self::default(),
        };
        base.with_overrides(lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_everything() {
        let c = OverlayConfig::default();
        assert!(c.flight_info && c.location_info);
        assert_eq!(c.api_base_url, "/api");
        assert_eq!(c.tracks_url, None);
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let raw = r#"{"location_info": false, "api_base_url": "https://api.example.org"}"#;
        let c = OverlayConfig::from_json(raw).unwrap();
        assert!(c.flight_info);
        assert!(!c.location_info);
        assert_eq!(c.api_base_url, "https://api.example.org");
    }

    #[test]
    fn bad_json_is_a_config_error() {
        assert!(matches!(
            OverlayConfig::from_json("{flight_info: yes"),
            Err(OverlayError::Config(_))
        ));
    }

    #[test]
    fn meta_overrides_apply() {
        let c = OverlayConfig::default().with_overrides(|name| match name {
            "overlay-flight-info" => Some("0".into()),
            "overlay-location-info" => Some("maybe".into()),
            "overlay-api-url" => Some("https://api.example.org/".into()),
            "overlay-tracks-url" => Some("/tracks.json".into()),
            _ => None,
        });
        assert!(!c.flight_info);
        assert!(c.location_info, "unparseable flag keeps the default");
        assert_eq!(c.api_base_url, "https://api.example.org");
        assert_eq!(c.tracks_url.as_deref(), Some("/tracks.json"));
    }
}

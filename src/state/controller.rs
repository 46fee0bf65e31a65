//! Click overlay controller.
//!
//! Owns the popup and the location marker and decides, per click, whether to
//! open a new popup or close the current one. Async answers come back
//! through [`ClickOverlayController::apply_nearby`] and
//! [`ClickOverlayController::apply_location`], which drop anything issued
//! for a generation that is no longer current.

use log::{debug, warn};

use crate::config::OverlayConfig;
use crate::model::{ClickEvent, DEFAULT_FLIGHT_COLOR, FeatureBadge, Flight, ProjectedCoordinate};
use crate::state::animator::{AnimatorState, OverlayAnimator, RingFrame};
use crate::state::camera::ViewTransform;
use crate::state::features::{FeatureSource, FeatureStore, HasIdentity};
use crate::state::layers::LayerRegistry;
use crate::state::locator::nearest_feature;
use crate::state::projection::{CoordinateTransform, WebMercator};
use crate::state::requests::{
    LocationRequest, LocationResponse, NearbyRequest, NearbyResponse, Ticket,
    build_location_report, merge_new_features,
};
use crate::state::session::{
    AutoDismiss, FlightTarget, Generation, PopupContent, PopupSession, PopupState,
};

/// Marker fade after a nearby-flights lookup finished.
pub const NEARBY_FADE_MS: f64 = 1000.0;
/// How long the "no data" placeholder stays fully visible.
pub const NO_DATA_HOLD_MS: f64 = 1500.0;
pub const NO_DATA_FADE_MS: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    Opened { anchor: ProjectedCoordinate, hit: bool },
    Closed,
}

/// What the map has to draw for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameOutput {
    pub ring: Option<RingFrame>,
    pub popup_opacity: Option<f64>,
}

pub struct ClickOverlayController<M, S> {
    map: M,
    features: S,
    config: OverlayConfig,
    popup: PopupState,
    generation: Generation,
    animator: OverlayAnimator,
}

impl<M, S> ClickOverlayController<M, S>
where
    M: ViewTransform + LayerRegistry,
    S: FeatureSource,
{
    pub fn new(map: M, features: S, config: OverlayConfig) -> Self {
        Self {
            map,
            features,
            config,
            popup: PopupState::Closed,
            generation: Generation::default(),
            animator: OverlayAnimator::new(),
        }
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn features(&self) -> &S {
        &self.features
    }

    #[cfg(test)]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn popup(&self) -> &PopupState {
        &self.popup
    }

    #[cfg(test)]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[cfg(test)]
    pub fn animator(&self) -> &OverlayAnimator {
        &self.animator
    }

    pub fn is_open(&self) -> bool {
        self.popup.is_open()
    }

    /// Open on a closed map, close on an open one. A click that closes
    /// never opens a new popup in the same pass.
    pub fn handle_click(&mut self, click: &ClickEvent) -> ClickOutcome {
        if self.is_open() {
            self.dismiss();
            return ClickOutcome::Closed;
        }

        let hit = if self.config.flight_info {
            nearest_feature(click, &self.features, &self.map)
        } else {
            None
        };

        let mut anchor = click.point;
        let mut flight = None;
        if let Some(hit) = hit {
            let badge = self
                .features
                .get(&hit.feature_id)
                .map(|f| f.badge())
                .unwrap_or_else(|| FeatureBadge {
                    label: String::new(),
                    color: DEFAULT_FLIGHT_COLOR.to_string(),
                });
            flight = Some(FlightTarget {
                feature_id: hit.feature_id,
                badge,
                location: WebMercator.to_geographic(hit.point),
                time: hit.timestamp,
            });
            anchor = hit.point;
        }
        let location = self
            .config
            .location_info
            .then(|| WebMercator.to_geographic(anchor));

        let hit = flight.is_some();
        self.generation = self.generation.next();
        self.popup = PopupState::Open(PopupSession::new(
            self.generation,
            anchor,
            PopupContent::Actions { flight, location },
        ));
        self.animator.show(anchor);
        debug!(
            "popup opened at ({:.0}, {:.0}), generation {}, hit {hit}",
            anchor.x,
            anchor.y,
            self.generation.value()
        );
        ClickOutcome::Opened { anchor, hit }
    }

    /// Closes the popup and removes the marker on the next frame.
    pub fn dismiss(&mut self) {
        if self.close_popup() {
            self.animator.hide(0.0);
        }
    }

    /// Closes the popup without touching the marker. Closing a closed popup
    /// does nothing; returns whether a session was closed.
    pub fn close_popup(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.popup = PopupState::Closed;
        self.generation = self.generation.next();
        debug!("popup closed, generation {}", self.generation.value());
        true
    }

    /// "Load nearby flights": closes the popup and hands back the request
    /// to run. The marker stays until the answer arrives.
    pub fn load_nearby(&mut self) -> Option<NearbyRequest> {
        let target = match self.popup.session() {
            Some(PopupSession {
                content: PopupContent::Actions { flight: Some(target), .. },
                ..
            }) => target.clone(),
            _ => return None,
        };
        self.close_popup();
        Some(NearbyRequest {
            ticket: Ticket::new(self.generation),
            flight_id: target.feature_id,
            location: target.location,
            time: target.time,
        })
    }

    /// "Get location info": the popup stays open to receive the answer and
    /// shows a loading state until then. Only one lookup per session.
    pub fn request_location_info(&mut self) -> Option<LocationRequest> {
        let PopupState::Open(session) = &mut self.popup else {
            return None;
        };
        let PopupContent::Actions {
            location: Some(location),
            ..
        } = session.content
        else {
            return None;
        };
        session.content = PopupContent::Loading;
        Some(LocationRequest {
            ticket: Ticket::new(session.generation),
            location,
        })
    }

    /// Applies a location answer to the popup it was requested from.
    /// Returns false when the answer was stale and dropped.
    pub fn apply_location(&mut self, response: LocationResponse) -> bool {
        let current = self.generation;
        let PopupState::Open(session) = &mut self.popup else {
            debug!("location answer for closed popup dropped");
            return false;
        };
        if response.ticket.generation() != current || session.content != PopupContent::Loading {
            debug!(
                "stale location answer (generation {}, live {}) dropped",
                response.ticket.generation().value(),
                current.value()
            );
            return false;
        }

        let report = match response.result {
            Ok(attrs) => build_location_report(&attrs, &self.map),
            Err(e) => {
                warn!("location info request failed: {e}");
                None
            }
        };
        match report {
            Some(report) => {
                session.content = PopupContent::Location(report);
                session.dismiss = None;
                session.opacity = 1.0;
            }
            None => {
                session.content = PopupContent::NoData;
                session.dismiss = Some(AutoDismiss::new(NO_DATA_HOLD_MS, NO_DATA_FADE_MS));
                self.animator.hide(NO_DATA_FADE_MS);
            }
        }
        true
    }

    /// Advances the marker and the popup fade to frame time `now` (ms).
    pub fn on_frame(&mut self, now: f64) -> FrameOutput {
        let was_expired = self.animator.state() == AnimatorState::Expired;
        let ring = self.animator.tick(now);
        if !was_expired && self.animator.state() == AnimatorState::Expired {
            debug!("marker expired at {now:.0}");
        }
        let mut popup_opacity = None;
        let mut finished = false;
        if let PopupState::Open(session) = &mut self.popup {
            match session.dismiss.as_mut().map(|d| d.advance(now)) {
                Some(None) => finished = true,
                Some(Some(opacity)) => session.opacity = opacity,
                None => {}
            }
            popup_opacity = Some(session.opacity);
        }
        if finished {
            self.close_popup();
            popup_opacity = None;
        }
        FrameOutput {
            ring,
            popup_opacity,
        }
    }

    pub fn needs_frames(&self) -> bool {
        self.animator.needs_frames()
            || self
                .popup
                .session()
                .is_some_and(|s| s.dismiss.is_some())
    }
}

impl<M, S> ClickOverlayController<M, S>
where
    M: ViewTransform + LayerRegistry,
    S: FeatureStore<Item = Flight>,
{
    pub fn features_mut(&mut self) -> &mut S {
        &mut self.features
    }

    /// Applies a nearby-flights answer. Returns the number of flights added.
    pub fn apply_nearby(&mut self, response: NearbyResponse) -> usize {
        if response.ticket.generation() != self.generation {
            debug!(
                "stale nearby answer (generation {}, live {}) dropped",
                response.ticket.generation().value(),
                self.generation.value()
            );
            return 0;
        }
        let added = match response.result {
            Ok(flights) => merge_new_features(&mut self.features, flights),
            Err(e) => {
                warn!("nearby flights request failed: {e}");
                0
            }
        };
        self.animator.hide(NEARBY_FADE_MS);
        added
    }
}

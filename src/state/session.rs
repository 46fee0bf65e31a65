use crate::model::{Airspace, FeatureBadge, GeographicCoordinate, MountainWave, ProjectedCoordinate};

/// Identifies the live popup session. Bumped on every open and close so
/// that answers to requests from an older session can be recognised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Everything the "load nearby" action needs, captured when the popup opens.
#[derive(Clone, Debug, PartialEq)]
pub struct FlightTarget {
    pub feature_id: String,
    pub badge: FeatureBadge,
    pub location: GeographicCoordinate,
    pub time: f64,
}

/// Location items that passed the layer-visibility filter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationReport {
    pub airspaces: Vec<Airspace>,
    pub waves: Vec<MountainWave>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PopupContent {
    /// Freshly opened: optional flight badge with "load nearby", optional
    /// "get location info".
    Actions {
        flight: Option<FlightTarget>,
        location: Option<GeographicCoordinate>,
    },
    /// A location lookup is in flight; further actions are disabled.
    Loading,
    Location(LocationReport),
    NoData,
}

/// Hold-then-fade removal of a popup. `start` binds to the first frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoDismiss {
    pub hold: f64,
    pub fade: f64,
    pub start: Option<f64>,
}

impl AutoDismiss {
    pub fn new(hold: f64, fade: f64) -> Self {
        Self { hold, fade, start: None }
    }

    /// Opacity at frame time `now`, or `None` once the fade has finished.
    pub fn advance(&mut self, now: f64) -> Option<f64> {
        let start = *self.start.get_or_insert(now);
        let elapsed = now - start;
        if elapsed < self.hold {
            return Some(1.0);
        }
        let faded = elapsed - self.hold;
        if faded >= self.fade {
            return None;
        }
        Some(1.0 - faded / self.fade)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PopupSession {
    pub generation: Generation,
    /// Where the popup is pinned on the map.
    pub anchor: ProjectedCoordinate,
    pub content: PopupContent,
    pub dismiss: Option<AutoDismiss>,
    pub opacity: f64,
}

impl PopupSession {
    pub fn new(generation: Generation, anchor: ProjectedCoordinate, content: PopupContent) -> Self {
        Self {
            generation,
            anchor,
            content,
            dismiss: None,
            opacity: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum PopupState {
    #[default]
    Closed,
    Open(PopupSession),
}

impl PopupState {
    pub fn session(&self) -> Option<&PopupSession> {
        match self {
            PopupState::Open(s) => Some(s),
            PopupState::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, PopupState::Open(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generations_increase() {
        let g = Generation::default();
        assert!(g.next() > g);
        assert_eq!(g.next().next().value(), 2);
    }

    #[test]
    fn dismiss_holds_then_fades() {
        let mut d = AutoDismiss::new(1500.0, 1000.0);
        assert_eq!(d.advance(100.0), Some(1.0));
        assert_eq!(d.start, Some(100.0));
        assert_eq!(d.advance(1500.0), Some(1.0));
        assert_eq!(d.advance(2100.0), Some(0.5));
        assert_eq!(d.advance(2600.0), None);
    }
}

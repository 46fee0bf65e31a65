//! Location marker: a ring drawn at the clicked spot that shrinks away when
//! hidden. Driven by the map's frame clock; the start time of every phase is
//! bound lazily to the first frame that observes it.

use crate::model::ProjectedCoordinate;

/// Ring radius in map units.
pub const RING_RADIUS: f64 = 1000.0;
/// Stroke width of a freshly shown ring, in pixels.
pub const RING_WIDTH: f64 = 3.0;
pub const RING_COLOR: &str = "#f4bd33";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerAnimation {
    pub center: ProjectedCoordinate,
    pub radius: f64,
    /// Frame time the current phase started, bound on the next tick.
    pub start: Option<f64>,
    /// Fade duration in ms; `None` holds the ring until it is hidden.
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatorState {
    Idle,
    Active,
    Running { start: f64 },
    Expired,
}

/// What to draw for the marker on one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingFrame {
    pub center: ProjectedCoordinate,
    pub radius: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayAnimator {
    marker: Option<MarkerAnimation>,
    expired: bool,
}

impl OverlayAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AnimatorState {
        match self.marker {
            None if self.expired => AnimatorState::Expired,
            None => AnimatorState::Idle,
            Some(MarkerAnimation { start: None, .. }) => AnimatorState::Active,
            Some(MarkerAnimation { start: Some(start), .. }) => AnimatorState::Running { start },
        }
    }

    #[cfg(test)]
    pub fn marker(&self) -> Option<&MarkerAnimation> {
        self.marker.as_ref()
    }

    /// Shows the ring at `center`, replacing whatever was animating.
    pub fn show(&mut self, center: ProjectedCoordinate) {
        self.marker = Some(MarkerAnimation {
            center,
            radius: RING_RADIUS,
            start: None,
            duration: None,
        });
        self.expired = false;
    }

    /// Lets the ring fade out over `fade_ms`, starting at the next frame.
    /// Does nothing when no ring is displayed.
    pub fn hide(&mut self, fade_ms: f64) {
        if let Some(marker) = self.marker.as_mut() {
            marker.duration = Some(fade_ms);
            marker.start = None;
        }
    }

    /// Whether another frame would change the marker.
    pub fn needs_frames(&self) -> bool {
        matches!(
            self.marker,
            Some(MarkerAnimation { start: None, .. })
                | Some(MarkerAnimation {
                    duration: Some(_),
                    ..
                })
        )
    }

    /// Advances to frame time `now` (ms) and returns what to draw.
    pub fn tick(&mut self, now: f64) -> Option<RingFrame> {
        let marker = self.marker.as_mut()?;
        let start = *marker.start.get_or_insert(now);
        let (center, radius) = (marker.center, marker.radius);
        let width = match marker.duration {
            None => RING_WIDTH,
            Some(duration) => {
                if duration <= 0.0 || now > start + duration {
                    self.marker = None;
                    self.expired = true;
                    return None;
                }
                let delta = (now - start) % duration;
                (RING_WIDTH - delta / (duration / 3.0)).max(0.0)
            }
        };
        Some(RingFrame {
            center,
            radius,
            width,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: ProjectedCoordinate = ProjectedCoordinate::new(10.0, 20.0);

    #[test]
    fn show_then_first_tick_binds_start() {
        let mut a = OverlayAnimator::new();
        assert_eq!(a.state(), AnimatorState::Idle);
        a.show(C);
        assert_eq!(a.state(), AnimatorState::Active);
        let frame = a.tick(500.0).unwrap();
        assert_eq!(a.state(), AnimatorState::Running { start: 500.0 });
        assert_eq!(frame.width, RING_WIDTH);
        assert_eq!(frame.radius, RING_RADIUS);
        assert_eq!(frame.center, C);
    }

    #[test]
    fn shown_ring_holds_until_hidden() {
        let mut a = OverlayAnimator::new();
        a.show(C);
        a.tick(0.0);
        assert!(!a.needs_frames());
        assert_eq!(a.tick(1e9).unwrap().width, RING_WIDTH);
    }

    #[test]
    fn fade_expires_after_duration() {
        let mut a = OverlayAnimator::new();
        a.show(C);
        a.tick(100.0);
        a.hide(1000.0);
        assert_eq!(a.state(), AnimatorState::Active);
        a.tick(2000.0);
        assert_eq!(a.state(), AnimatorState::Running { start: 2000.0 });
        assert!(a.tick(3000.0).is_some());
        assert!(a.tick(2000.0 + 1000.0 + 1.0).is_none());
        assert_eq!(a.state(), AnimatorState::Expired);
        assert!(a.marker().is_none());
        assert!(!a.needs_frames());
    }

    #[test]
    fn width_shrinks_linearly_over_the_fade() {
        let mut a = OverlayAnimator::new();
        a.show(C);
        a.hide(900.0);
        assert_eq!(a.tick(0.0).unwrap().width, 3.0);
        assert!((a.tick(300.0).unwrap().width - 2.0).abs() < 1e-9);
        assert!((a.tick(600.0).unwrap().width - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_fade_removes_on_next_frame() {
        let mut a = OverlayAnimator::new();
        a.show(C);
        a.tick(10.0);
        a.hide(0.0);
        assert!(a.needs_frames());
        assert!(a.tick(11.0).is_none());
        assert_eq!(a.state(), AnimatorState::Expired);
    }

    #[test]
    fn hide_without_ring_is_noop() {
        let mut a = OverlayAnimator::new();
        a.hide(1000.0);
        assert_eq!(a.state(), AnimatorState::Idle);
        a.show(C);
        a.hide(0.0);
        a.tick(1.0);
        a.hide(1000.0);
        assert_eq!(a.state(), AnimatorState::Expired);
    }

    #[test]
    fn show_replaces_running_fade() {
        let mut a = OverlayAnimator::new();
        a.show(C);
        a.hide(1000.0);
        a.tick(0.0);
        let other = ProjectedCoordinate::new(-5.0, -5.0);
        a.show(other);
        assert_eq!(a.state(), AnimatorState::Active);
        let frame = a.tick(5000.0).unwrap();
        assert_eq!(frame.center, other);
        assert_eq!(frame.width, RING_WIDTH);
    }
}

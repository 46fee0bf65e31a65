//! Feature capabilities and the live set of flights shown on the map.

use crate::model::{
    DEFAULT_FLIGHT_COLOR, FeatureBadge, Flight, FlightRecord, GeographicCoordinate,
    ProjectedCoordinate, TrackPoint,
};
use crate::state::index_search::next_smaller_index;
use crate::state::projection::{CoordinateTransform, WebMercator};

/// Something with a time-stamped path geometry.
pub trait HasGeometry {
    fn geometry(&self) -> &[TrackPoint];

    /// Point of the path closest to `target`, with its time interpolated
    /// along the segment it falls on.
    fn closest_point(&self, target: ProjectedCoordinate) -> Option<TrackPoint> {
        let path = self.geometry();
        let first = *path.first()?;
        let mut best = first;
        let mut best_d2 = first.coordinate.distance_squared(target);
        for pair in path.windows(2) {
            let candidate = closest_on_segment(pair[0], pair[1], target);
            let d2 = candidate.coordinate.distance_squared(target);
            if d2 < best_d2 {
                best = candidate;
                best_d2 = d2;
            }
        }
        Some(best)
    }
}

/// Something with a stable identity token.
pub trait HasIdentity {
    fn id(&self) -> &str;
    fn badge(&self) -> FeatureBadge;
}

pub trait Feature: HasGeometry + HasIdentity {}

impl<T: HasGeometry + HasIdentity> Feature for T {}

/// Spatial lookup over the features currently on the map.
pub trait FeatureSource {
    type Item: Feature;

    fn closest_feature_to(&self, point: ProjectedCoordinate) -> Option<&Self::Item>;
    fn get(&self, id: &str) -> Option<&Self::Item>;

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

pub trait FeatureStore: FeatureSource {
    /// Adds `item` unless a feature with the same identity is present.
    /// Returns whether it was added.
    fn insert(&mut self, item: Self::Item) -> bool;
}

fn closest_on_segment(a: TrackPoint, b: TrackPoint, p: ProjectedCoordinate) -> TrackPoint {
    let dx = b.coordinate.x - a.coordinate.x;
    let dy = b.coordinate.y - a.coordinate.y;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return a;
    }
    let t = (((p.x - a.coordinate.x) * dx + (p.y - a.coordinate.y) * dy) / len2).clamp(0.0, 1.0);
    TrackPoint {
        coordinate: ProjectedCoordinate::new(a.coordinate.x + t * dx, a.coordinate.y + t * dy),
        time: a.time + t * (b.time - a.time),
    }
}

impl HasGeometry for Flight {
    fn geometry(&self) -> &[TrackPoint] {
        &self.path
    }
}

impl HasIdentity for Flight {
    fn id(&self) -> &str {
        &self.id
    }

    fn badge(&self) -> FeatureBadge {
        FeatureBadge {
            label: self.registration.clone().unwrap_or_default(),
            color: self.color.clone(),
        }
    }
}

impl Flight {
    /// Position along the track at `time`, interpolated between the two
    /// surrounding fixes. `None` outside the recorded time span.
    pub fn position_at(&self, time: f64) -> Option<TrackPoint> {
        let (first, last) = (self.path.first()?, self.path.last()?);
        if time < first.time || time > last.time {
            return None;
        }
        let times: Vec<f64> = self.path.iter().map(|p| p.time).collect();
        let Ok(i) = next_smaller_index(&times, time) else {
            // single fix, and time already matched it
            return Some(*first);
        };
        let (a, b) = (self.path[i], self.path[(i + 1).min(self.path.len() - 1)]);
        let span = b.time - a.time;
        let t = if span > 0.0 { (time - a.time) / span } else { 0.0 };
        Some(TrackPoint {
            coordinate: ProjectedCoordinate::new(
                a.coordinate.x + t * (b.coordinate.x - a.coordinate.x),
                a.coordinate.y + t * (b.coordinate.y - a.coordinate.y),
            ),
            time,
        })
    }

    /// Builds a flight from its wire form, projecting every fix.
    pub fn from_record(record: FlightRecord) -> Self {
        let path = record
            .points
            .iter()
            .map(|[lon, lat, time]| TrackPoint {
                coordinate: WebMercator.to_projected(GeographicCoordinate::new(*lon, *lat)),
                time: *time,
            })
            .collect();
        Flight {
            id: record.sfid,
            registration: record.registration,
            color: record
                .color
                .unwrap_or_else(|| DEFAULT_FLIGHT_COLOR.to_string()),
            path,
        }
    }
}

/// The flights currently drawn on the map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlightSet {
    flights: Vec<Flight>,
}

impl FlightSet {
    pub fn new(flights: Vec<Flight>) -> Self {
        let mut set = Self::default();
        for f in flights {
            set.insert(f);
        }
        set
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flight> {
        self.flights.iter()
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}

impl FeatureSource for FlightSet {
    type Item = Flight;

    fn closest_feature_to(&self, point: ProjectedCoordinate) -> Option<&Flight> {
        self.flights
            .iter()
            .filter_map(|f| {
                f.closest_point(point)
                    .map(|c| (f, c.coordinate.distance_squared(point)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(f, _)| f)
    }

    fn get(&self, id: &str) -> Option<&Flight> {
        self.flights.iter().find(|f| f.id == id)
    }
}

impl FeatureStore for FlightSet {
    fn insert(&mut self, item: Flight) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.flights.push(item);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tp(x: f64, y: f64, time: f64) -> TrackPoint {
        TrackPoint {
            coordinate: ProjectedCoordinate::new(x, y),
            time,
        }
    }

    fn flight(id: &str, path: Vec<TrackPoint>) -> Flight {
        Flight {
            id: id.to_string(),
            registration: Some(format!("D-{id}")),
            color: "#ff0000".to_string(),
            path,
        }
    }

    #[test]
    fn closest_point_interpolates_time() {
        let f = flight("1", vec![tp(0.0, 0.0, 100.0), tp(100.0, 0.0, 200.0)]);
        let c = f.closest_point(ProjectedCoordinate::new(25.0, 40.0)).unwrap();
        assert_eq!(c.coordinate, ProjectedCoordinate::new(25.0, 0.0));
        assert!((c.time - 125.0).abs() < 1e-9);
    }

    #[test]
    fn closest_point_clamps_to_segment_ends() {
        let f = flight("1", vec![tp(0.0, 0.0, 0.0), tp(10.0, 0.0, 10.0), tp(10.0, 10.0, 20.0)]);
        let c = f.closest_point(ProjectedCoordinate::new(50.0, 50.0)).unwrap();
        assert_eq!(c.coordinate, ProjectedCoordinate::new(10.0, 10.0));
        assert_eq!(c.time, 20.0);
        let before = f.closest_point(ProjectedCoordinate::new(-5.0, 0.0)).unwrap();
        assert_eq!(before.time, 0.0);
    }

    #[test]
    fn degenerate_paths() {
        let single = flight("1", vec![tp(3.0, 4.0, 9.0)]);
        assert_eq!(
            single.closest_point(ProjectedCoordinate::new(0.0, 0.0)),
            Some(tp(3.0, 4.0, 9.0))
        );
        assert_eq!(flight("2", vec![]).closest_point(ProjectedCoordinate::default()), None);
    }

    #[test]
    fn closest_feature_picks_nearest_track() {
        let set = FlightSet::new(vec![
            flight("far", vec![tp(0.0, 1000.0, 0.0), tp(100.0, 1000.0, 1.0)]),
            flight("near", vec![tp(0.0, 10.0, 0.0), tp(100.0, 10.0, 1.0)]),
            flight("empty", vec![]),
        ]);
        let hit = set.closest_feature_to(ProjectedCoordinate::new(50.0, 0.0)).unwrap();
        assert_eq!(hit.id(), "near");
        assert!(FlightSet::default().closest_feature_to(ProjectedCoordinate::default()).is_none());
    }

    #[test]
    fn insert_refuses_duplicate_identity() {
        let mut set = FlightSet::default();
        assert!(set.insert(flight("7", vec![])));
        assert!(!set.insert(flight("7", vec![tp(1.0, 1.0, 1.0)])));
        assert_eq!(set.len(), 1);
        assert!(set.contains("7"));
        assert!(!set.contains("8"));
    }

    #[test]
    fn position_at_interpolates_between_fixes() {
        let f = flight(
            "1",
            vec![tp(0.0, 0.0, 0.0), tp(100.0, 0.0, 10.0), tp(100.0, 50.0, 20.0)],
        );
        assert_eq!(f.position_at(5.0).unwrap().coordinate, ProjectedCoordinate::new(50.0, 0.0));
        assert_eq!(f.position_at(10.0).unwrap().coordinate, ProjectedCoordinate::new(100.0, 0.0));
        assert_eq!(f.position_at(15.0).unwrap().coordinate, ProjectedCoordinate::new(100.0, 25.0));
        assert_eq!(f.position_at(0.0).unwrap().coordinate, ProjectedCoordinate::new(0.0, 0.0));
        assert_eq!(f.position_at(20.0).unwrap().coordinate, ProjectedCoordinate::new(100.0, 50.0));
    }

    #[test]
    fn position_at_outside_track_is_none() {
        let f = flight("1", vec![tp(0.0, 0.0, 10.0), tp(10.0, 0.0, 20.0)]);
        assert_eq!(f.position_at(9.9), None);
        assert_eq!(f.position_at(20.1), None);
        assert_eq!(flight("2", vec![]).position_at(0.0), None);
        let single = flight("3", vec![tp(3.0, 4.0, 7.0)]);
        assert_eq!(single.position_at(7.0), Some(tp(3.0, 4.0, 7.0)));
    }

    #[test]
    fn badge_uses_registration_and_color() {
        let mut f = flight("1", vec![]);
        assert_eq!(f.badge().label, "D-1");
        f.registration = None;
        assert_eq!(f.badge(), FeatureBadge { label: String::new(), color: "#ff0000".into() });
    }

    #[test]
    fn record_conversion_projects_points() {
        let record = FlightRecord {
            sfid: "11".into(),
            registration: None,
            color: None,
            points: vec![[0.0, 0.0, 5.0]],
        };
        let f = Flight::from_record(record);
        assert_eq!(f.color, DEFAULT_FLIGHT_COLOR);
        assert_eq!(f.path.len(), 1);
        assert!(f.path[0].coordinate.x.abs() < 1e-9);
        assert_eq!(f.path[0].time, 5.0);
    }
}

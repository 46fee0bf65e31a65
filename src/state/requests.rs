//! Asynchronous info lookups issued from the popup.
//!
//! Requests are stamped with the popup [`Generation`] current at issue time
//! and resolve to responses that carry the same [`Ticket`]. Applying a
//! response is left to the controller, which checks the ticket against the
//! live session first.

use std::future::Future;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::error::FetchError;
use crate::model::{Flight, GeographicCoordinate, LocationAttributes};
use crate::state::features::FeatureStore;
use crate::state::layers::{AIRSPACE_LAYER, LayerRegistry, MOUNTAIN_WAVE_LAYER};
use crate::state::session::{Generation, LocationReport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    generation: Generation,
}

impl Ticket {
    pub(crate) fn new(generation: Generation) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NearbyRequest {
    pub ticket: Ticket,
    /// Flight the lookup starts from; the server leaves it out of the answer.
    pub flight_id: String,
    pub location: GeographicCoordinate,
    pub time: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocationRequest {
    pub ticket: Ticket,
    pub location: GeographicCoordinate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NearbyResponse {
    pub ticket: Ticket,
    pub result: Result<Vec<Flight>, FetchError>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocationResponse {
    pub ticket: Ticket,
    pub result: Result<LocationAttributes, FetchError>,
}

/// Transport for the two lookups. Futures must not borrow the client.
pub trait InfoClient {
    fn nearby_flights(
        &self,
        flight_id: &str,
        location: GeographicCoordinate,
        time: f64,
    ) -> LocalBoxFuture<'static, Result<Vec<Flight>, FetchError>>;

    fn location_attributes(
        &self,
        location: GeographicCoordinate,
    ) -> LocalBoxFuture<'static, Result<LocationAttributes, FetchError>>;
}

pub struct InfoRequestCoordinator<C> {
    client: Rc<C>,
}

impl<C> Clone for InfoRequestCoordinator<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

impl<C: InfoClient> InfoRequestCoordinator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client: Rc::new(client),
        }
    }

    #[cfg(test)]
    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn fetch_nearby_features(
        &self,
        request: NearbyRequest,
    ) -> impl Future<Output = NearbyResponse> + 'static {
        let pending = self
            .client
            .nearby_flights(&request.flight_id, request.location, request.time);
        let ticket = request.ticket;
        async move {
            NearbyResponse {
                ticket,
                result: pending.await,
            }
        }
    }

    pub fn fetch_location_attributes(
        &self,
        request: LocationRequest,
    ) -> impl Future<Output = LocationResponse> + 'static {
        let pending = self.client.location_attributes(request.location);
        let ticket = request.ticket;
        async move {
            LocationResponse {
                ticket,
                result: pending.await,
            }
        }
    }
}

/// Adds the flights not already in `store`; returns how many were added.
pub fn merge_new_features<S>(store: &mut S, flights: Vec<Flight>) -> usize
where
    S: FeatureStore<Item = Flight>,
{
    let mut added = 0;
    for flight in flights {
        // skip retrieved flight if already on map
        if store.contains(&flight.id) {
            continue;
        }
        if store.insert(flight) {
            added += 1;
        }
    }
    added
}

/// Keeps the items whose layer is visible. `None` means nothing to show.
pub fn build_location_report<L: LayerRegistry + ?Sized>(
    attrs: &LocationAttributes,
    layers: &L,
) -> Option<LocationReport> {
    let mut report = LocationReport::default();
    if !attrs.airspaces.is_empty() && layers.is_visible(AIRSPACE_LAYER) {
        report.airspaces = attrs.airspaces.clone();
    }
    if !attrs.waves.is_empty() && layers.is_visible(MOUNTAIN_WAVE_LAYER) {
        report.waves = attrs.waves.clone();
    }
    if report.airspaces.is_empty() && report.waves.is_empty() {
        None
    } else {
        Some(report)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;

    use futures::FutureExt;
    use futures::executor::block_on;

    use super::*;
    use crate::model::{Airspace, MountainWave};
    use crate::state::features::{FeatureSource, FlightSet};
    use crate::state::layers::MapLayers;

    /// Answers from a script and records what was asked.
    #[derive(Default)]
    pub(crate) struct ScriptedClient {
        pub nearby: RefCell<Vec<Result<Vec<Flight>, FetchError>>>,
        pub location: RefCell<Vec<Result<LocationAttributes, FetchError>>>,
        pub calls: RefCell<Vec<String>>,
    }

    impl InfoClient for ScriptedClient {
        fn nearby_flights(
            &self,
            flight_id: &str,
            location: GeographicCoordinate,
            time: f64,
        ) -> LocalBoxFuture<'static, Result<Vec<Flight>, FetchError>> {
            self.calls.borrow_mut().push(format!(
                "near {flight_id} {:.3} {:.3} {time}",
                location.lon, location.lat
            ));
            let answer = self.nearby.borrow_mut().remove(0);
            async move { answer }.boxed_local()
        }

        fn location_attributes(
            &self,
            location: GeographicCoordinate,
        ) -> LocalBoxFuture<'static, Result<LocationAttributes, FetchError>> {
            self.calls
                .borrow_mut()
                .push(format!("mapitems {:.3} {:.3}", location.lon, location.lat));
            let answer = self.location.borrow_mut().remove(0);
            async move { answer }.boxed_local()
        }
    }

    pub(crate) fn flight(id: &str) -> Flight {
        Flight {
            id: id.to_string(),
            registration: None,
            color: "#123456".to_string(),
            path: Vec::new(),
        }
    }

    fn airspace(name: &str) -> Airspace {
        Airspace {
            name: name.into(),
            class: "C".into(),
            base: "FL 65".into(),
            top: "FL 195".into(),
        }
    }

    fn wave(name: &str) -> MountainWave {
        MountainWave {
            name: name.into(),
            main_wind_direction: None,
        }
    }

    #[test]
    fn responses_carry_their_ticket() {
        let client = ScriptedClient::default();
        client.nearby.borrow_mut().push(Ok(vec![flight("2")]));
        client
            .location
            .borrow_mut()
            .push(Err(FetchError::Status(500)));
        let coordinator = InfoRequestCoordinator::new(client);
        let ticket = Ticket::new(Generation::default().next());
        let at = GeographicCoordinate::new(7.0, 51.0);

        let near = block_on(coordinator.fetch_nearby_features(NearbyRequest {
            ticket,
            flight_id: "1".into(),
            location: at,
            time: 3600.0,
        }));
        assert_eq!(near.ticket, ticket);
        assert_eq!(near.result.unwrap().len(), 1);

        let loc = block_on(coordinator.fetch_location_attributes(LocationRequest {
            ticket,
            location: at,
        }));
        assert_eq!(loc.ticket.generation().value(), 1);
        assert_eq!(loc.result, Err(FetchError::Status(500)));
        assert_eq!(
            *coordinator.client().calls.borrow(),
            vec!["near 1 7.000 51.000 3600".to_string(), "mapitems 7.000 51.000".to_string()]
        );
    }

    #[test]
    fn merge_skips_known_flights() {
        let mut set = FlightSet::new(vec![flight("1")]);
        let incoming = vec![flight("1"), flight("2"), flight("3"), flight("2")];
        let added = merge_new_features(&mut set, incoming);
        assert_eq!(added, 2);
        assert_eq!(set.len(), 3);
        assert!(set.get("3").is_some());
    }

    #[test]
    fn report_respects_layer_visibility() {
        let attrs = LocationAttributes {
            airspaces: vec![airspace("TMA Bremen")],
            waves: vec![wave("Ridge A")],
        };
        let mut layers = MapLayers::with_defaults();
        let full = build_location_report(&attrs, &layers).unwrap();
        assert_eq!(full.airspaces.len(), 1);
        assert_eq!(full.waves.len(), 1);

        layers.set_visible(AIRSPACE_LAYER, false);
        let waves_only = build_location_report(&attrs, &layers).unwrap();
        assert!(waves_only.airspaces.is_empty());
        assert_eq!(waves_only.waves[0].wind_direction(), "Unknown");

        layers.set_visible(MOUNTAIN_WAVE_LAYER, false);
        assert_eq!(build_location_report(&attrs, &layers), None);
    }

    #[test]
    fn report_without_data_or_layers_is_none() {
        let layers = MapLayers::with_defaults();
        assert_eq!(build_location_report(&LocationAttributes::default(), &layers), None);
        let attrs = LocationAttributes {
            airspaces: vec![airspace("CTR")],
            waves: vec![],
        };
        assert_eq!(build_location_report(&attrs, &MapLayers::default()), None);
    }
}

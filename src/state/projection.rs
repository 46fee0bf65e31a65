use std::f64::consts::PI;

use crate::model::{GeographicCoordinate, ProjectedCoordinate};

/// Conversion between the map projection and longitude/latitude.
/// Implementations are pure and total.
pub trait CoordinateTransform {
    fn to_geographic(&self, p: ProjectedCoordinate) -> GeographicCoordinate;
    fn to_projected(&self, g: GeographicCoordinate) -> ProjectedCoordinate;
}

/// Spherical Web Mercator (EPSG:3857 <-> EPSG:4326).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WebMercator;

pub const EARTH_RADIUS: f64 = 6_378_137.0;
/// Half the side of the square projected world.
pub const HALF_EXTENT: f64 = PI * EARTH_RADIUS;

impl CoordinateTransform for WebMercator {
    fn to_geographic(&self, p: ProjectedCoordinate) -> GeographicCoordinate {
        let lon = (p.x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (p.y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        GeographicCoordinate { lon, lat }
    }

    fn to_projected(&self, g: GeographicCoordinate) -> ProjectedCoordinate {
        let x = EARTH_RADIUS * g.lon.to_radians();
        let y = EARTH_RADIUS * (PI / 4.0 + g.lat.to_radians() / 2.0).tan().ln();
        // tan() overflows to +-inf at the poles
        ProjectedCoordinate {
            x,
            y: y.clamp(-HALF_EXTENT, HALF_EXTENT),
        }
    }
}

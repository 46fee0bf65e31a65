// Map host: the view transform plus the layer registry handed to the controller
use crate::model::{Pixel, ProjectedCoordinate};
use crate::state::camera::{Camera, ViewTransform};
use crate::state::layers::{LayerRegistry, MapLayers};

#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    pub camera: Camera,
    pub layers: MapLayers,
}

impl Default for MapState {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            layers: MapLayers::with_defaults(),
        }
    }
}

impl ViewTransform for MapState {
    fn pixel_from_coordinate(&self, coordinate: ProjectedCoordinate) -> Pixel {
        self.camera.pixel_from_coordinate(coordinate)
    }

    fn coordinate_from_pixel(&self, pixel: Pixel) -> ProjectedCoordinate {
        self.camera.coordinate_from_pixel(pixel)
    }
}

impl LayerRegistry for MapState {
    fn layer_visible(&self, name: &str) -> Option<bool> {
        self.layers.layer_visible(name)
    }
}

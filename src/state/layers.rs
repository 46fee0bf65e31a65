use log::debug;

pub const AIRSPACE_LAYER: &str = "Airspace";
pub const MOUNTAIN_WAVE_LAYER: &str = "Mountain Wave Project";

/// Named map layers whose visibility gates what the popup renders.
pub trait LayerRegistry {
    /// `None` when no layer with that name exists.
    fn layer_visible(&self, name: &str) -> Option<bool>;

    /// A missing layer counts as hidden.
    fn is_visible(&self, name: &str) -> bool {
        match self.layer_visible(name) {
            Some(v) => v,
            None => {
                debug!("layer {name:?} not registered, treating as hidden");
                false
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapLayer {
    pub name: String,
    pub visible: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapLayers {
    layers: Vec<MapLayer>,
}

impl MapLayers {
    /// Airspace and mountain-wave layers, both shown.
    pub fn with_defaults() -> Self {
        let mut layers = Self::default();
        layers.register(AIRSPACE_LAYER, true);
        layers.register(MOUNTAIN_WAVE_LAYER, true);
        layers
    }

    pub fn register(&mut self, name: &str, visible: bool) {
        match self.layers.iter_mut().find(|l| l.name == name) {
            Some(l) => l.visible = visible,
            None => self.layers.push(MapLayer {
                name: name.to_string(),
                visible,
            }),
        }
    }

    /// Returns false when the layer does not exist.
    pub fn set_visible(&mut self, name: &str, visible: bool) -> bool {
        match self.layers.iter_mut().find(|l| l.name == name) {
            Some(l) => {
                l.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapLayer> {
        self.layers.iter()
    }
}

impl LayerRegistry for MapLayers {
    fn layer_visible(&self, name: &str) -> Option<bool> {
        self.layers.iter().find(|l| l.name == name).map(|l| l.visible)
    }
}

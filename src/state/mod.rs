pub mod animator;
pub mod camera;
pub mod controller;
pub mod features;
pub mod index_search;
pub mod layers;
pub mod locator;
pub mod map;
pub mod projection;
pub mod requests;
pub mod session;

pub use animator::{RING_COLOR, RingFrame};
pub use camera::{Camera, ViewTransform};
pub use controller::{ClickOverlayController, FrameOutput};
pub use features::FlightSet;
pub use map::MapState;
pub use requests::InfoRequestCoordinator;

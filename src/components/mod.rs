pub mod app;
pub mod camera_controls;
pub mod info_box;
pub mod layer_panel;
pub mod map_view;

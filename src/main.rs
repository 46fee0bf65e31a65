mod api;
mod components;
mod config;
mod error;
mod model;
mod state;
mod util;

use components::app::App;

fn main() {
    console_error_panic_hook::set_once();
    util::init_logging();
    yew::Renderer::<App>::new().render();
}

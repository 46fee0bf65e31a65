use super::map_view::MapView;
use crate::config::OverlayConfig;
use yew::prelude::*;

#[function_component(App)]
pub fn app() -> Html {
    // read once; the host page does not change its meta tags
    let config = use_state(|| {
        web_sys::window()
            .and_then(|win| win.document())
            .map(|doc| OverlayConfig::from_document(&doc))
            .unwrap_or_default()
    });

    {
        let config = config.clone();
        use_effect_with((), move |_| {
            log::info!(
                "overlay ready (flight info: {}, location info: {}, api: {})",
                config.flight_info,
                config.location_info,
                config.api_base_url
            );
            || ()
        });
    }

    html! {
        <div style="position:relative; width:100vw; height:100vh; overflow:hidden; background:#0e1116; color:#c9d1d9; font-family:sans-serif;">
            <MapView config={(*config).clone()} />
        </div>
    }
}

use crate::state::layers::MapLayer;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct LayerRowProps {
    pub layer: MapLayer,
    pub on_toggle: Callback<String>,
}

#[function_component(LayerRow)]
pub fn layer_row(props: &LayerRowProps) -> Html {
    let onchange = {
        let cb = props.on_toggle.clone();
        let name = props.layer.name.clone();
        Callback::from(move |_: Event| cb.emit(name.clone()))
    };
    html! { <label style="display:flex; align-items:center; gap:8px; margin:3px 0; cursor:pointer;">
        <input type="checkbox" checked={props.layer.visible} {onchange} />
        <span>{ &props.layer.name }</span>
    </label> }
}

#[derive(Properties, PartialEq, Clone)]
pub struct LayerPanelProps {
    pub layers: Vec<MapLayer>,
    pub on_toggle: Callback<String>,
    #[prop_or_default]
    pub flight_count: usize,
}

#[function_component]
pub fn LayerPanel(props: &LayerPanelProps) -> Html {
    html! {<div style="position:absolute; right:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; min-width:170px;">
        <div style="font-weight:600; margin-bottom:4px;">{"Layers"}</div>
        <div style="font-size:11px; color:#8b949e; margin-bottom:6px;">{ format!("{} flights on map", props.flight_count) }</div>
        { for props.layers.iter().map(|layer| html! {
            <LayerRow key={layer.name.clone()} layer={layer.clone()} on_toggle={props.on_toggle.clone()} />
        }) }
    </div>}
}

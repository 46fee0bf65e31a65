use yew::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraAction {
    ZoomIn,
    ZoomOut,
    Pan { dx: f64, dy: f64 },
    Reset,
}

/// Screen pixels moved per arrow press.
const PAN_STEP_PX: f64 = 120.0;

#[derive(Properties, PartialEq, Clone)]
pub struct CameraControlsProps {
    pub on_action: Callback<CameraAction>,
    pub zoom: f64,
}

#[function_component(CameraControls)]
pub fn camera_controls(props: &CameraControlsProps) -> Html {
    let button = |label: &'static str, action: CameraAction| {
        let cb = props.on_action.clone();
        html! { <button onclick={Callback::from(move |_| cb.emit(action))}>{ label }</button> }
    };
    html! {<div style="position:absolute; left:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; display:flex; gap:6px; align-items:center;">
        { button("-", CameraAction::ZoomOut) }
        { button("+", CameraAction::ZoomIn) }
        <span style="width:8px;"></span>
        { button("←", CameraAction::Pan { dx: PAN_STEP_PX, dy: 0.0 }) }
        { button("↑", CameraAction::Pan { dx: 0.0, dy: PAN_STEP_PX }) }
        { button("↓", CameraAction::Pan { dx: 0.0, dy: -PAN_STEP_PX }) }
        { button("→", CameraAction::Pan { dx: -PAN_STEP_PX, dy: 0.0 }) }
        <span style="width:8px;"></span>
        { button("Reset", CameraAction::Reset) }
        <span style="font-size:11px; color:#8b949e; margin-left:4px;">{ format!("z{:.1}", props.zoom) }</span>
    </div>}
}

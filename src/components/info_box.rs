use crate::model::{Airspace, FeatureBadge, MountainWave};
use crate::state::session::{LocationReport, PopupContent};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct InfoBoxProps {
    pub content: PopupContent,
    /// Anchor position in canvas pixels; the box sits above it.
    pub left: f64,
    pub top: f64,
    #[prop_or(1.0)]
    pub opacity: f64,
    pub on_load_nearby: Callback<()>,
    pub on_location_info: Callback<()>,
    pub on_close: Callback<()>,
}

fn link(label: &'static str, cb: &Callback<()>) -> Html {
    let cb = cb.clone();
    let onclick = Callback::from(move |e: MouseEvent| {
        e.prevent_default();
        cb.emit(());
    });
    html! { <li><a href="#" {onclick} style="color:#58a6ff;">{ label }</a></li> }
}

fn badge(b: &FeatureBadge) -> Html {
    html! { <div style="margin-bottom:6px;">
        <span style={format!("display:inline-block; padding:1px 6px; border-radius:3px; color:#fff; background:{};", b.color)}>
            { if b.label.is_empty() { "unknown".to_string() } else { b.label.clone() } }
        </span>
    </div> }
}

fn airspace_table(items: &[Airspace]) -> Html {
    html! { <table style="font-size:12px; border-collapse:collapse; margin-bottom:6px;">
        <thead>
            <tr><th colspan="4">{"Airspaces"}</th></tr>
            <tr><th>{"Name"}</th><th>{"Class"}</th><th>{"Base"}</th><th>{"Top"}</th></tr>
        </thead>
        <tbody>
        { for items.iter().map(|a| html! {
            <tr><td>{ &a.name }</td><td>{ &a.class }</td><td>{ &a.base }</td><td>{ &a.top }</td></tr>
        }) }
        </tbody>
    </table> }
}

fn wave_table(items: &[MountainWave]) -> Html {
    html! { <table style="font-size:12px; border-collapse:collapse;">
        <thead>
            <tr><th colspan="2">{"Mountain Waves"}</th></tr>
            <tr><th>{"Name"}</th><th>{"Wind direction"}</th></tr>
        </thead>
        <tbody>
        { for items.iter().map(|w| html! {
            <tr><td>{ &w.name }</td><td>{ w.wind_direction() }</td></tr>
        }) }
        </tbody>
    </table> }
}

fn location_report(report: &LocationReport) -> Html {
    html! { <>
        { if report.airspaces.is_empty() { html!{} } else { airspace_table(&report.airspaces) } }
        { if report.waves.is_empty() { html!{} } else { wave_table(&report.waves) } }
    </> }
}

#[function_component(InfoBox)]
pub fn info_box(props: &InfoBoxProps) -> Html {
    let body = match &props.content {
        PopupContent::Actions { flight, location } => html! { <>
            { flight.as_ref().map(|f| badge(&f.badge)).unwrap_or_default() }
            <ul style="list-style:none; margin:0; padding:0;">
                { if flight.is_some() { link("Load nearby flights", &props.on_load_nearby) } else { html!{} } }
                { if location.is_some() { link("Get location info", &props.on_location_info) } else { html!{} } }
            </ul>
        </> },
        PopupContent::Loading => html! { <div style="color:#8b949e;">{"Loading…"}</div> },
        PopupContent::Location(report) => location_report(report),
        PopupContent::NoData => html! { <div style="color:#8b949e;">{"No data retrieved for this location"}</div> },
    };
    let close = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {<div style={format!("position:absolute; left:{:.0}px; top:{:.0}px; transform:translate(-50%, calc(-100% - 12px)); opacity:{:.3}; background:rgba(22,27,34,0.95); border:1px solid #30363d; border-radius:8px; padding:8px 22px 8px 8px; min-width:160px; pointer-events:auto;", props.left, props.top, props.opacity)}>
        <button onclick={close} style="position:absolute; right:4px; top:4px; background:none; border:none; color:#8b949e; cursor:pointer;">{"×"}</button>
        { body }
    </div>}
}

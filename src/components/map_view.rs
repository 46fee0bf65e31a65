use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use yew::prelude::*;

use super::camera_controls::{CameraAction, CameraControls};
use super::info_box::InfoBox;
use super::layer_panel::LayerPanel;
use crate::api::{self, HttpInfoClient};
use crate::config::OverlayConfig;
use crate::model::{ClickEvent, Pixel};
use crate::state::requests::merge_new_features;
use crate::state::session::PopupContent;
use crate::state::{
    Camera, ClickOverlayController, FlightSet, FrameOutput, InfoRequestCoordinator, MapState,
    RING_COLOR, RingFrame, ViewTransform,
};

type Controller = ClickOverlayController<MapState, FlightSet>;
type SharedController = Rc<RefCell<Controller>>;
type Hook = Rc<RefCell<Option<Rc<dyn Fn()>>>>;

/// Pointer travel (px) above which a press is a drag, not a click.
const CLICK_SLOP_PX: f64 = 4.0;
const TRACK_WIDTH_PX: f64 = 2.0;
/// Radius of the dot marking each flight at the selected time.
const FIX_DOT_PX: f64 = 4.0;

fn call(hook: &Hook) {
    // clone first so the callee may touch the hook itself
    let f = hook.borrow().clone();
    if let Some(f) = f {
        f();
    }
}

fn draw(canvas: &HtmlCanvasElement, controller: &Controller, ring: Option<RingFrame>) {
    if !canvas.is_connected() {
        return;
    }
    let Some(ctx) = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
    else {
        return;
    };
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    let cam = &controller.map().camera;

    ctx.set_fill_style_str("#0e1116");
    ctx.fill_rect(0.0, 0.0, w, h);

    // every flight's position at the moment picked on the clicked track
    let selected_time = controller.popup().session().and_then(|s| match &s.content {
        PopupContent::Actions {
            flight: Some(target),
            ..
        } => Some(target.time),
        _ => None,
    });

    ctx.set_line_width(TRACK_WIDTH_PX);
    for flight in controller.features().iter() {
        let mut points = flight.path.iter().map(|p| cam.pixel_from_coordinate(p.coordinate));
        let Some(first) = points.next() else {
            continue;
        };
        ctx.begin_path();
        ctx.set_stroke_style_str(&flight.color);
        ctx.move_to(first.x, first.y);
        for p in points {
            ctx.line_to(p.x, p.y);
        }
        ctx.stroke();

        if let Some(fix) = selected_time.and_then(|t| flight.position_at(t)) {
            let p = cam.pixel_from_coordinate(fix.coordinate);
            ctx.begin_path();
            ctx.set_fill_style_str(&flight.color);
            if ctx.arc(p.x, p.y, FIX_DOT_PX, 0.0, std::f64::consts::TAU).is_ok() {
                ctx.fill();
            }
        }
    }

    if let Some(ring) = ring.filter(|r| r.width > 0.0) {
        let c = cam.pixel_from_coordinate(ring.center);
        ctx.begin_path();
        ctx.set_stroke_style_str(RING_COLOR);
        ctx.set_line_width(ring.width);
        if ctx
            .arc(c.x, c.y, ring.radius / cam.resolution(), 0.0, std::f64::consts::TAU)
            .is_ok()
        {
            ctx.stroke();
        }
    }
}

fn fit_canvas(canvas: &HtmlCanvasElement, camera: &mut Camera) {
    let (width, height) = match canvas.parent_element() {
        Some(parent) => (parent.client_width() as f64, parent.client_height() as f64),
        None => (camera.width, camera.height),
    };
    canvas.set_width(width.max(0.0) as u32);
    canvas.set_height(height.max(0.0) as u32);
    camera.set_viewport(width, height);
}

struct Wiring {
    controller: SharedController,
    last_frame: Rc<RefCell<FrameOutput>>,
    draw_ref: Hook,
    schedule_ref: Hook,
    update: UseForceUpdateHandle,
    config: OverlayConfig,
}

/// Installs the frame loop and the canvas listeners. Returns the teardown.
fn attach(canvas: HtmlCanvasElement, wiring: Wiring) -> Option<impl FnOnce()> {
    let window = web_sys::window()?;
    let Wiring {
        controller,
        last_frame,
        draw_ref,
        schedule_ref,
        update,
        config,
    } = wiring;

    fit_canvas(&canvas, &mut controller.borrow_mut().map_mut().camera);

    *draw_ref.borrow_mut() = Some({
        let canvas = canvas.clone();
        let controller = controller.clone();
        let last_frame = last_frame.clone();
        Rc::new(move || draw(&canvas, &controller.borrow(), last_frame.borrow().ring))
    });

    // One persistent frame callback; `schedule` only asks it to run.
    let raf_id: Rc<RefCell<Option<i32>>> = Rc::new(RefCell::new(None));
    let closure_cell: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let schedule: Rc<dyn Fn()> = {
        let raf_id = raf_id.clone();
        let closure_cell = closure_cell.clone();
        let window = window.clone();
        Rc::new(move || {
            if raf_id.borrow().is_some() {
                return;
            }
            if let Some(cb) = closure_cell.borrow().as_ref() {
                if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    *raf_id.borrow_mut() = Some(id);
                }
            }
        })
    };
    *closure_cell.borrow_mut() = Some({
        let controller = controller.clone();
        let last_frame = last_frame.clone();
        let draw_ref = draw_ref.clone();
        let schedule = schedule.clone();
        let raf_id = raf_id.clone();
        let update = update.clone();
        Closure::wrap(Box::new(move |now: f64| {
            *raf_id.borrow_mut() = None;
            let (frame, popup_changed, again) = {
                let mut ctl = controller.borrow_mut();
                let before = ctl.popup().session().map(|s| s.opacity);
                let frame = ctl.on_frame(now);
                (frame, before != frame.popup_opacity, ctl.needs_frames())
            };
            *last_frame.borrow_mut() = frame;
            call(&draw_ref);
            if popup_changed {
                update.force_update();
            }
            if again {
                schedule();
            }
        }) as Box<dyn FnMut(f64)>)
    });
    *schedule_ref.borrow_mut() = Some(schedule.clone());
    schedule();

    if let Some(url) = config.tracks_url.clone() {
        let controller = controller.clone();
        let draw_ref = draw_ref.clone();
        let update = update.clone();
        spawn_local(async move {
            match api::load_tracks(&url).await {
                Ok(flights) => {
                    let added = merge_new_features(controller.borrow_mut().features_mut(), flights);
                    log::info!("loaded {added} flights from {url}");
                    call(&draw_ref);
                    update.force_update();
                }
                Err(e) => log::warn!("could not load tracks from {url}: {e}"),
            }
        });
    }

    let wheel_cb = {
        let controller = controller.clone();
        let draw_ref = draw_ref.clone();
        let update = update.clone();
        Closure::wrap(Box::new(move |e: web_sys::WheelEvent| {
            e.prevent_default();
            let factor = (-e.delta_y() * 0.001).exp();
            let anchor = Pixel::new(e.offset_x() as f64, e.offset_y() as f64);
            controller.borrow_mut().map_mut().camera.zoom_at(anchor, factor);
            call(&draw_ref);
            update.force_update();
        }) as Box<dyn FnMut(_)>)
    };
    canvas
        .add_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref())
        .ok()?;

    let mousedown_cb = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
            if e.button() != 0 {
                return;
            }
            let mut ctl = controller.borrow_mut();
            let cam = &mut ctl.map_mut().camera;
            cam.panning = true;
            cam.drag_distance = 0.0;
            cam.last_x = e.client_x() as f64;
            cam.last_y = e.client_y() as f64;
        }) as Box<dyn FnMut(_)>)
    };
    canvas
        .add_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref())
        .ok()?;

    let mousemove_cb = {
        let controller = controller.clone();
        let draw_ref = draw_ref.clone();
        let update = update.clone();
        Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
            let popup_open = {
                let mut ctl = controller.borrow_mut();
                let cam = &mut ctl.map_mut().camera;
                if !cam.panning {
                    return;
                }
                let x = e.client_x() as f64;
                let y = e.client_y() as f64;
                let dx = x - cam.last_x;
                let dy = y - cam.last_y;
                cam.last_x = x;
                cam.last_y = y;
                cam.drag_distance += dx.abs() + dy.abs();
                cam.pan_by(dx, dy);
                ctl.is_open()
            };
            call(&draw_ref);
            if popup_open {
                update.force_update();
            }
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref())
        .ok()?;

    let mouseup_cb = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move |_e: web_sys::MouseEvent| {
            controller.borrow_mut().map_mut().camera.panning = false;
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref())
        .ok()?;

    let click_cb = {
        let controller = controller.clone();
        let schedule = schedule.clone();
        let update = update.clone();
        Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
            {
                let mut ctl = controller.borrow_mut();
                if ctl.map().camera.drag_distance > CLICK_SLOP_PX {
                    return;
                }
                let pixel = Pixel::new(e.offset_x() as f64, e.offset_y() as f64);
                let click = ClickEvent {
                    point: ctl.map().coordinate_from_pixel(pixel),
                    pixel,
                };
                ctl.handle_click(&click);
            }
            schedule();
            update.force_update();
        }) as Box<dyn FnMut(_)>)
    };
    canvas
        .add_event_listener_with_callback("click", click_cb.as_ref().unchecked_ref())
        .ok()?;

    let resize_cb = {
        let canvas = canvas.clone();
        let controller = controller.clone();
        let draw_ref = draw_ref.clone();
        let update = update.clone();
        Closure::wrap(Box::new(move |_e: web_sys::Event| {
            fit_canvas(&canvas, &mut controller.borrow_mut().map_mut().camera);
            call(&draw_ref);
            update.force_update();
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
        .ok()?;

    Some(move || {
        let _ = canvas.remove_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref());
        let _ = canvas
            .remove_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref());
        let _ = canvas.remove_event_listener_with_callback("click", click_cb.as_ref().unchecked_ref());
        let _ = window
            .remove_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref());
        let _ = window.remove_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref());
        let _ = window.remove_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
        if let Some(id) = raf_id.borrow_mut().take() {
            let _ = window.cancel_animation_frame(id);
        }
        // break the frame callback's self reference
        closure_cell.borrow_mut().take();
        schedule_ref.borrow_mut().take();
        draw_ref.borrow_mut().take();
    })
}

#[derive(Properties, PartialEq, Clone)]
pub struct MapViewProps {
    pub config: OverlayConfig,
}

#[function_component(MapView)]
pub fn map_view(props: &MapViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let controller = use_mut_ref(|| {
        ClickOverlayController::new(MapState::default(), FlightSet::default(), props.config.clone())
    });
    let coordinator = use_mut_ref(|| {
        InfoRequestCoordinator::new(HttpInfoClient::new(props.config.api_base_url.clone()))
    });
    let last_frame = use_mut_ref(FrameOutput::default);
    let draw_ref: Hook = use_mut_ref(|| None);
    let schedule_ref: Hook = use_mut_ref(|| None);
    let update = use_force_update();

    {
        let canvas_ref = canvas_ref.clone();
        let wiring = Wiring {
            controller: controller.clone(),
            last_frame: last_frame.clone(),
            draw_ref: draw_ref.clone(),
            schedule_ref: schedule_ref.clone(),
            update: update.clone(),
            config: props.config.clone(),
        };
        use_effect_with((), move |_| {
            let teardown = canvas_ref
                .cast::<HtmlCanvasElement>()
                .and_then(|canvas| attach(canvas, wiring));
            if teardown.is_none() {
                log::error!("map canvas could not be wired up");
            }
            move || {
                if let Some(teardown) = teardown {
                    teardown();
                }
            }
        });
    }

    let on_load_nearby = {
        let controller = controller.clone();
        let coordinator = coordinator.clone();
        let schedule_ref = schedule_ref.clone();
        let update = update.clone();
        Callback::from(move |_: ()| {
            let Some(request) = controller.borrow_mut().load_nearby() else {
                return;
            };
            update.force_update();
            call(&schedule_ref);
            let pending = coordinator.borrow().fetch_nearby_features(request);
            let controller = controller.clone();
            let schedule_ref = schedule_ref.clone();
            spawn_local(async move {
                let response = pending.await;
                let added = controller.borrow_mut().apply_nearby(response);
                if added > 0 {
                    log::info!("added {added} nearby flights");
                }
                call(&schedule_ref);
            });
        })
    };

    let on_location_info = {
        let controller = controller.clone();
        let coordinator = coordinator.clone();
        let schedule_ref = schedule_ref.clone();
        let update = update.clone();
        Callback::from(move |_: ()| {
            let Some(request) = controller.borrow_mut().request_location_info() else {
                return;
            };
            update.force_update();
            let pending = coordinator.borrow().fetch_location_attributes(request);
            let controller = controller.clone();
            let schedule_ref = schedule_ref.clone();
            let update = update.clone();
            spawn_local(async move {
                let response = pending.await;
                if controller.borrow_mut().apply_location(response) {
                    update.force_update();
                    call(&schedule_ref);
                }
            });
        })
    };

    let on_close = {
        let controller = controller.clone();
        let schedule_ref = schedule_ref.clone();
        let update = update.clone();
        Callback::from(move |_: ()| {
            controller.borrow_mut().dismiss();
            call(&schedule_ref);
            update.force_update();
        })
    };

    let on_toggle_layer = {
        let controller = controller.clone();
        let update = update.clone();
        Callback::from(move |name: String| {
            let mut ctl = controller.borrow_mut();
            let layers = &mut ctl.map_mut().layers;
            let visible = layers.iter().any(|l| l.name == name && l.visible);
            layers.set_visible(&name, !visible);
            drop(ctl);
            update.force_update();
        })
    };

    let on_camera = {
        let controller = controller.clone();
        let draw_ref = draw_ref.clone();
        let update = update.clone();
        Callback::from(move |action: CameraAction| {
            {
                let mut ctl = controller.borrow_mut();
                let cam = &mut ctl.map_mut().camera;
                let middle = Pixel::new(cam.width * 0.5, cam.height * 0.5);
                match action {
                    CameraAction::ZoomIn => cam.zoom_at(middle, 2.0),
                    CameraAction::ZoomOut => cam.zoom_at(middle, 0.5),
                    CameraAction::Pan { dx, dy } => cam.pan_by(dx, dy),
                    CameraAction::Reset => {
                        let home = Camera::default();
                        cam.center_on(home.center);
                        cam.zoom = home.zoom;
                    }
                }
            }
            call(&draw_ref);
            update.force_update();
        })
    };

    let ctl = controller.borrow();
    let popup = ctl.popup().session().map(|s| {
        let at = ctl.map().pixel_from_coordinate(s.anchor);
        (s.content.clone(), at, s.opacity)
    });
    let layers: Vec<_> = ctl.map().layers.iter().cloned().collect();
    let flight_count = ctl.features().len();
    let zoom = ctl.map().camera.zoom;
    drop(ctl);

    html! {<div style="position:absolute; inset:0;">
        <canvas ref={canvas_ref} style="display:block; width:100%; height:100%; cursor:crosshair;"></canvas>
        { match popup {
            Some((content, at, opacity)) => html! {
                <InfoBox {content} left={at.x} top={at.y} {opacity}
                    on_load_nearby={on_load_nearby.clone()}
                    on_location_info={on_location_info.clone()}
                    on_close={on_close.clone()} />
            },
            None => html! {},
        } }
        <LayerPanel layers={layers} on_toggle={on_toggle_layer} {flight_count} />
        <CameraControls on_action={on_camera} {zoom} />
    </div>}
}

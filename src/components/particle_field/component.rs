//! Leptos component mounting the particle field on a canvas element.
//!
//! The component creates an HTML canvas, wraps it in a [`CanvasSurface`] and
//! drives the field from `requestAnimationFrame`. Pointer and touch input are
//! normalised into a single pointer state here; window resize, page
//! visibility, the measured frame rate and the Battery Status API are routed
//! to the field through its handle.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, Window};

use super::adapt::{BatteryStatus, FpsMeter};
use super::config::{FieldConfig, PartialConfig};
use super::frame::FrameScheduler;
use super::handle::FieldHandle;
use super::render::CanvasSurface;

type FrameCallback = Closure<dyn FnMut(f64)>;
type Listener = Closure<dyn FnMut()>;

/// An event listener that detaches itself when dropped.
struct Subscription {
	target: EventTarget,
	events: &'static [&'static str],
	callback: Listener,
}

impl Subscription {
	fn listen(target: EventTarget, events: &'static [&'static str], callback: Listener) -> Self {
		for event in events {
			let _ = target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
		}
		Self {
			target,
			events,
			callback,
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		for event in self.events {
			let _ = self
				.target
				.remove_event_listener_with_callback(event, self.callback.as_ref().unchecked_ref());
		}
	}
}

/// The field as mounted in the browser.
pub type CanvasField = FieldHandle<CanvasSurface, RafScheduler>;

/// [`FrameScheduler`] backed by `requestAnimationFrame`.
pub struct RafScheduler {
	callback: Rc<RefCell<Option<FrameCallback>>>,
	pending: Option<i32>,
}

impl FrameScheduler for RafScheduler {
	fn request_frame(&mut self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(ref cb) = *self.callback.borrow() {
			self.pending = window.request_animation_frame(cb.as_ref().unchecked_ref()).ok();
		}
	}

	fn cancel_frame(&mut self) {
		if let (Some(id), Some(window)) = (self.pending.take(), web_sys::window()) {
			let _ = window.cancel_animation_frame(id);
		}
	}
}

/// Size of the area the canvas should cover, in CSS pixels.
fn target_size(window: &Window, canvas: &HtmlCanvasElement, fullscreen: bool) -> (f64, f64) {
	let inner = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	if fullscreen {
		(
			inner(window.inner_width(), 800.0),
			inner(window.inner_height(), 600.0),
		)
	} else {
		canvas
			.parent_element()
			.map(|p| (p.client_width() as f64, p.client_height() as f64))
			.unwrap_or((800.0, 600.0))
	}
}

/// CSS width of the viewport, used for the compact node cap.
fn viewport_width(window: &Window, fallback: f64) -> f64 {
	window
		.inner_width()
		.ok()
		.and_then(|v| v.as_f64())
		.unwrap_or(fallback)
}

/// Position of a client-space point relative to the canvas.
fn local_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		client_x as f64 - rect.left(),
		client_y as f64 - rect.top(),
	)
}

fn read_battery(battery: &JsValue) -> Option<BatteryStatus> {
	let charging = js_sys::Reflect::get(battery, &JsValue::from_str("charging"))
		.ok()?
		.as_bool()?;
	let level = js_sys::Reflect::get(battery, &JsValue::from_str("level"))
		.ok()?
		.as_f64()?;
	Some(BatteryStatus { charging, level })
}

/// Feed Battery Status API readings to the field, if the browser has it.
fn watch_battery(field: CanvasField, subscriptions: Rc<RefCell<Vec<Subscription>>>) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let navigator = window.navigator();
	let Some(get_battery) = js_sys::Reflect::get(&navigator, &JsValue::from_str("getBattery"))
		.ok()
		.and_then(|f| f.dyn_into::<js_sys::Function>().ok())
	else {
		debug!("neural-field: battery status unavailable");
		return;
	};
	let Some(promise) = get_battery
		.call0(&navigator)
		.ok()
		.and_then(|p| p.dyn_into::<js_sys::Promise>().ok())
	else {
		return;
	};

	wasm_bindgen_futures::spawn_local(async move {
		let Ok(battery) = JsFuture::from(promise).await else {
			debug!("neural-field: battery status request rejected");
			return;
		};
		if field.is_destroyed() {
			return;
		}
		let check = {
			let battery = battery.clone();
			move || {
				if let Some(status) = read_battery(&battery) {
					field.report_battery(status);
				}
			}
		};
		check();

		subscriptions.borrow_mut().push(Subscription::listen(
			battery.unchecked_into(),
			&["levelchange", "chargingchange"],
			Closure::new(check),
		));
	});
}

/// Renders the animated particle network on a canvas element.
///
/// Pass configuration via the reactive `config` signal; a change reconfigures
/// the running field. With `fullscreen = true` the canvas covers the viewport
/// and follows window resizes, otherwise it fills its parent.
#[component]
pub fn NeuralBackground(
	#[prop(into)] config: Signal<FieldConfig>,
	#[prop(default = true)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let field: Rc<RefCell<Option<CanvasField>>> = Rc::new(RefCell::new(None));
	let subscriptions: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));
	let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
	let meter = Rc::new(RefCell::new(FpsMeter::default()));
	let (field_init, subs_init, callback_init) =
		(field.clone(), subscriptions.clone(), callback.clone());

	Effect::new(move |_| {
		let next = config.get();
		if let Some(ref running) = *field_init.borrow() {
			let viewport = web_sys::window()
				.map(|win| viewport_width(&win, f64::INFINITY))
				.unwrap_or(f64::INFINITY);
			running.reconfigure(PartialConfig::from(next.fit_viewport(viewport)));
			return;
		}

		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = target_size(&window, &canvas, fullscreen);
		let surface = CanvasSurface::new(canvas.clone(), w, h, window.device_pixel_ratio());
		let viewport = viewport_width(&window, w);

		let scheduler = RafScheduler {
			callback: callback_init.clone(),
			pending: None,
		};
		let handle = FieldHandle::create(surface, scheduler, next.fit_viewport(viewport));
		if handle.is_inert() {
			*field_init.borrow_mut() = Some(handle);
			return;
		}

		let (handle_anim, meter_anim) = (handle.clone(), meter.clone());
		*callback_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			if let Some(fps) = meter_anim.borrow_mut().record(now) {
				handle_anim.report_fps(fps);
			}
			handle_anim.frame(now);
		}));

		let (handle_resize, canvas_resize) = (handle.clone(), canvas.clone());
		let on_resize: Listener = Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = target_size(&win, &canvas_resize, fullscreen);
			handle_resize.resize(nw, nh);
		});
		subs_init.borrow_mut().push(Subscription::listen(
			window.clone().into(),
			&["resize"],
			on_resize,
		));

		if let Some(document) = window.document() {
			let (handle_vis, meter_vis, doc) = (handle.clone(), meter.clone(), document.clone());
			let on_visibility: Listener = Closure::new(move || {
				meter_vis.borrow_mut().reset();
				handle_vis.set_visible(!doc.hidden());
			});
			subs_init.borrow_mut().push(Subscription::listen(
				document.into(),
				&["visibilitychange"],
				on_visibility,
			));
		}

		watch_battery(handle.clone(), subs_init.clone());

		handle.start();
		*field_init.borrow_mut() = Some(handle);
	});

	// The frame closure holds a handle clone, so the slot is emptied to free the field.
	let teardown = StoredValue::new_local((field.clone(), subscriptions, callback));
	on_cleanup(move || {
		teardown.with_value(|(field, subscriptions, callback)| {
			if let Some(running) = field.borrow_mut().take() {
				running.destroy();
			}
			subscriptions.borrow_mut().clear();
			callback.borrow_mut().take();
		});
	});

	let field_mm = field.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_point(&canvas, ev.client_x(), ev.client_y());
		if let Some(ref f) = *field_mm.borrow() {
			f.set_pointer(x, y, true);
		}
	};

	let field_tm = field.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let (Some(canvas), Some(touch)) = (canvas_ref.get(), ev.touches().get(0)) else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_point(&canvas, touch.client_x(), touch.client_y());
		if let Some(ref f) = *field_tm.borrow() {
			f.set_pointer(x, y, true);
		}
	};

	let field_ml = field.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref f) = *field_ml.borrow() {
			f.release_pointer();
		}
	};

	let field_te = field.clone();
	let on_touchend = move |_: TouchEvent| {
		if let Some(ref f) = *field_te.borrow() {
			f.release_pointer();
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="neural-background"
			on:mousemove=on_mousemove
			on:mouseleave=on_mouseleave
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			style="display: block;"
		/>
	}
}

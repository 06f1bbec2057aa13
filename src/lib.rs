//! neural-field: animated neural-network particle background for the web.
//!
//! This crate provides a WASM-based canvas component that renders a drifting
//! particle network with distance-faded connections, pointer interaction and
//! automatic low-power degradation.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

// Selects the JS entropy source behind `rand` on wasm32.
use getrandom as _;

pub mod components;

pub use components::particle_field::{
	BatteryStatus, CanvasField, Color, FieldColors, FieldConfig, FieldHandle, FrameScheduler,
	NeuralBackground, ParticleField, PartialConfig, PerformanceSettings, RunState, Surface,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("neural-field: logging initialized");
}

/// Parse a field configuration from JSON, falling back to defaults.
pub fn parse_field_config(json_text: &str) -> FieldConfig {
	match serde_json::from_str::<FieldConfig>(json_text) {
		Ok(config) => config,
		Err(e) => {
			warn!("neural-field: failed to parse field config: {}", e);
			FieldConfig::default()
		}
	}
}

/// Load the field configuration from a script element with id="field-config".
/// Expected format: JSON with camelCase keys, e.g. `{ "nodeCount": 60 }`.
fn load_field_config() -> Option<FieldConfig> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("field-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;
	Some(parse_field_config(&json_text))
}

/// Main application component.
/// Reads the field configuration from the DOM and mounts the background.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_field_config().unwrap_or_default();
	let config_signal = Signal::derive(move || config.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Neural Field" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="neural-background-layer">
			<NeuralBackground config=config_signal fullscreen=true />
		</div>
	}
}

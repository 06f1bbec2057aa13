//! Field configuration supplied by the host page.

use serde::Deserialize;

use super::theme::FieldColors;

/// Viewports at or below this CSS width are treated as mobile.
pub const COMPACT_VIEWPORT_WIDTH: f64 = 768.0;

/// Node ceiling applied on compact viewports.
pub const COMPACT_NODE_COUNT: usize = 30;

/// Frame-rate and power tunables.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PerformanceSettings {
	/// Frame-rate cap for the render loop.
	#[serde(rename = "maxFPS", alias = "maxFps")]
	pub max_fps: f64,
	/// Particle count used once low-power mode is engaged.
	pub low_power_node_count: usize,
	/// Battery level fraction below which a discharging device goes low-power.
	pub battery_threshold: f64,
}

impl Default for PerformanceSettings {
	fn default() -> Self {
		Self {
			max_fps: 60.0,
			low_power_node_count: 30,
			battery_threshold: 0.2,
		}
	}
}

/// Complete set of field tunables.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
	pub node_count: usize,
	/// Particles closer than this are joined by a line.
	pub connection_distance: f64,
	/// Multiplier applied to particle velocity when integrating position.
	pub animation_speed: f64,
	/// Radius within which the pointer draws lines to, and highlights, particles.
	#[serde(alias = "mouseInfluence")]
	pub pointer_influence: f64,
	pub colors: FieldColors,
	pub performance: PerformanceSettings,
}

impl Default for FieldConfig {
	fn default() -> Self {
		Self {
			node_count: 80,
			connection_distance: 150.0,
			animation_speed: 0.5,
			pointer_influence: 100.0,
			colors: FieldColors::default(),
			performance: PerformanceSettings::default(),
		}
	}
}

impl FieldConfig {
	/// Shallow merge: groups (`colors`, `performance`) are replaced whole.
	pub fn merge(&mut self, partial: PartialConfig) {
		let PartialConfig {
			node_count,
			connection_distance,
			animation_speed,
			pointer_influence,
			colors,
			performance,
		} = partial;
		if let Some(v) = node_count {
			self.node_count = v;
		}
		if let Some(v) = connection_distance {
			self.connection_distance = v;
		}
		if let Some(v) = animation_speed {
			self.animation_speed = v;
		}
		if let Some(v) = pointer_influence {
			self.pointer_influence = v;
		}
		if let Some(v) = colors {
			self.colors = v;
		}
		if let Some(v) = performance {
			self.performance = v;
		}
	}

	/// Caps the node count on phone-sized viewports.
	///
	/// Only the viewport width is checked; the user agent is not sniffed. A
	/// count already below [`COMPACT_NODE_COUNT`] is kept rather than raised.
	pub fn fit_viewport(mut self, viewport_width: f64) -> Self {
		if viewport_width <= COMPACT_VIEWPORT_WIDTH {
			self.node_count = self.node_count.min(COMPACT_NODE_COUNT);
		}
		self
	}
}

/// A subset of [`FieldConfig`] to merge into the running configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialConfig {
	pub node_count: Option<usize>,
	pub connection_distance: Option<f64>,
	pub animation_speed: Option<f64>,
	#[serde(alias = "mouseInfluence")]
	pub pointer_influence: Option<f64>,
	pub colors: Option<FieldColors>,
	pub performance: Option<PerformanceSettings>,
}

impl From<FieldConfig> for PartialConfig {
	fn from(config: FieldConfig) -> Self {
		Self {
			node_count: Some(config.node_count),
			connection_distance: Some(config.connection_distance),
			animation_speed: Some(config.animation_speed),
			pointer_influence: Some(config.pointer_influence),
			colors: Some(config.colors),
			performance: Some(config.performance),
		}
	}
}

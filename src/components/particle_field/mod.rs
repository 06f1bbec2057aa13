//! Animated particle-network background.
//!
//! Renders a drifting field of particles on an HTML canvas with:
//! - Lines between particles that fade with distance
//! - Pointer and touch interaction (repulsion, connection lines, glow)
//! - A frame-rate cap that carries timing remainders forward
//! - Low-power mode driven by measured frame rate and battery level
//! - Pausing while the page is hidden
//!
//! The simulation itself ([`ParticleField`], [`SimulationLoop`]) never touches
//! the DOM; it draws through [`Surface`] and asks for frames through
//! [`FrameScheduler`], which the Leptos component implements with a canvas and
//! `requestAnimationFrame`.
//!
//! # Example
//!
//! ```ignore
//! use neural_field::{FieldConfig, NeuralBackground};
//!
//! let config = FieldConfig { node_count: 50, ..FieldConfig::default() };
//! view! { <NeuralBackground config=Signal::derive(move || config.clone()) /> }
//! ```

mod adapt;
mod component;
pub mod config;
mod frame;
mod handle;
mod particles;
mod render;
mod state;
pub mod theme;

pub use adapt::{BatteryStatus, FpsMeter, LOW_FPS_THRESHOLD};
pub use component::{CanvasField, NeuralBackground, RafScheduler};
pub use config::{FieldConfig, PartialConfig, PerformanceSettings};
pub use frame::{FrameGate, FrameScheduler, RunState, SimulationLoop};
pub use handle::FieldHandle;
pub use particles::{
	HIGHLIGHT_DECAY, MAX_SPEED, PULSE_STEP, Particle, PointerState, REPULSION_RADIUS,
};
pub use render::{CanvasSurface, Surface, render};
pub use state::{CONNECTION_ALPHA, Connection, LOW_POWER_MAX_FPS, ParticleField};
pub use theme::{Color, FieldColors};

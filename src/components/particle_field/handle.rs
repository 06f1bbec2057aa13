//! The host-facing handle to a running field.
//!
//! A handle is cheap to clone; every clone drives the same field. Without a
//! drawing surface the handle is inert and every call is a no-op, so a page
//! without a canvas keeps working.

use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::adapt::{BatteryStatus, LOW_FPS_THRESHOLD};
use super::config::{FieldConfig, PartialConfig};
use super::frame::{FrameScheduler, RunState, SimulationLoop};
use super::render::Surface;
use super::state::ParticleField;

/// Shared handle to a [`SimulationLoop`].
pub struct FieldHandle<S, F> {
	inner: Rc<RefCell<Option<SimulationLoop<S, F>>>>,
}

impl<S, F> Clone for FieldHandle<S, F> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<S: Surface, F: FrameScheduler> FieldHandle<S, F> {
	/// Build a field on `surface`. The field is populated but not started.
	pub fn create(surface: Option<S>, scheduler: F, config: FieldConfig) -> Self {
		Self::create_with_rng(surface, scheduler, config, SmallRng::from_entropy())
	}

	/// As [`FieldHandle::create`], with an explicit random source.
	pub fn create_with_rng(
		surface: Option<S>,
		scheduler: F,
		config: FieldConfig,
		rng: SmallRng,
	) -> Self {
		let Some(surface) = surface else {
			warn!("neural-field: no drawing surface, background disabled");
			return Self::inert();
		};
		let (width, height) = surface.size();
		let field = ParticleField::new(width, height, config, rng);
		info!(
			"neural-field: initialized with {} nodes",
			field.particles().len()
		);
		Self {
			inner: Rc::new(RefCell::new(Some(SimulationLoop::new(
				field, surface, scheduler,
			)))),
		}
	}

	fn inert() -> Self {
		Self {
			inner: Rc::new(RefCell::new(None)),
		}
	}

	fn with<R: Default>(&self, f: impl FnOnce(&mut SimulationLoop<S, F>) -> R) -> R {
		match self.inner.borrow_mut().as_mut() {
			Some(sim) => f(sim),
			None => R::default(),
		}
	}

	pub fn is_inert(&self) -> bool {
		self.inner.borrow().is_none()
	}

	pub fn start(&self) {
		self.with(|sim| sim.start());
	}

	pub fn pause(&self) {
		self.with(|sim| sim.pause());
	}

	pub fn resume(&self) {
		self.with(|sim| sim.resume());
	}

	pub fn destroy(&self) {
		self.with(|sim| {
			if !sim.is_destroyed() {
				sim.destroy();
				info!("neural-field: destroyed");
			}
		});
	}

	/// Scheduler callback; `now` is the host's monotonic timestamp in ms.
	pub fn frame(&self, now: f64) -> bool {
		self.with(|sim| sim.frame(now))
	}

	pub fn set_pointer(&self, x: f64, y: f64, active: bool) {
		self.with(|sim| sim.field.set_pointer(x, y, active));
	}

	pub fn release_pointer(&self) {
		self.with(|sim| sim.field.release_pointer());
	}

	pub fn resize(&self, width: f64, height: f64) {
		self.with(|sim| sim.resize(width, height));
	}

	pub fn reconfigure(&self, partial: PartialConfig) {
		self.with(|sim| sim.field.reconfigure(partial));
	}

	pub fn enable_low_power_mode(&self) {
		self.with(|sim| {
			sim.field.enable_low_power_mode();
		});
	}

	/// Page visibility changed.
	pub fn set_visible(&self, visible: bool) {
		if visible { self.resume() } else { self.pause() }
	}

	/// A measured frame rate from the host.
	pub fn report_fps(&self, fps: u32) {
		if fps < LOW_FPS_THRESHOLD {
			self.enable_low_power_mode();
		}
	}

	/// A battery reading from the host.
	pub fn report_battery(&self, status: BatteryStatus) {
		let low = self.with(|sim| status.is_low(sim.field.config().performance.battery_threshold));
		if low {
			self.enable_low_power_mode();
		}
	}

	pub fn is_destroyed(&self) -> bool {
		self.with(|sim| sim.is_destroyed())
	}

	pub fn run_state(&self) -> RunState {
		self.with(|sim| sim.state())
	}

	pub fn node_count(&self) -> usize {
		self.with(|sim| sim.field.particles().len())
	}

	pub fn is_low_power(&self) -> bool {
		self.with(|sim| sim.field.is_low_power())
	}

	/// Current configuration, `None` when inert.
	pub fn config(&self) -> Option<FieldConfig> {
		self.inner
			.borrow()
			.as_ref()
			.map(|sim| sim.field.config().clone())
	}
}

//! Frame pacing and the run-state machine.
//!
//! The host calls [`SimulationLoop::frame`] from its "before next paint"
//! callback. Only callbacks that clear the frame gate step and render; every
//! callback while running asks the scheduler for the next one.

use log::debug;

use super::render::{Surface, render};
use super::state::ParticleField;

/// Whether the loop is producing frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
	#[default]
	Stopped,
	Running,
	Paused,
}

/// Requests and cancels "next frame" callbacks from the host.
pub trait FrameScheduler {
	/// Ask for one callback before the next paint.
	fn request_frame(&mut self);
	/// Drop the outstanding request, if any.
	fn cancel_frame(&mut self);
}

/// Frame-rate cap that carries the sub-interval remainder forward instead of
/// snapping to the callback time, so jittery callbacks don't drift the rate.
#[derive(Clone, Debug, Default)]
pub struct FrameGate {
	last: f64,
}

impl FrameGate {
	/// Returns the elapsed milliseconds if a frame at `now` should run.
	pub fn admit(&mut self, now: f64, max_fps: f64) -> Option<f64> {
		if max_fps <= 0.0 {
			return None;
		}
		let interval = 1000.0 / max_fps;
		let elapsed = now - self.last;
		if elapsed > interval {
			self.last = now - elapsed % interval;
			Some(elapsed)
		} else {
			None
		}
	}

	pub fn last(&self) -> f64 {
		self.last
	}
}

/// A particle field bound to a surface and a scheduler.
pub struct SimulationLoop<S, F> {
	pub(super) field: ParticleField,
	pub(super) surface: S,
	scheduler: F,
	state: RunState,
	gate: FrameGate,
	destroyed: bool,
}

impl<S: Surface, F: FrameScheduler> SimulationLoop<S, F> {
	pub fn new(field: ParticleField, surface: S, scheduler: F) -> Self {
		Self {
			field,
			surface,
			scheduler,
			state: RunState::Stopped,
			gate: FrameGate::default(),
			destroyed: false,
		}
	}

	pub fn state(&self) -> RunState {
		self.state
	}

	pub fn start(&mut self) {
		if self.destroyed || self.state != RunState::Stopped {
			return;
		}
		self.state = RunState::Running;
		self.scheduler.request_frame();
	}

	pub fn pause(&mut self) {
		if self.state != RunState::Running {
			return;
		}
		self.state = RunState::Paused;
		self.scheduler.cancel_frame();
		debug!("neural-field: paused");
	}

	pub fn resume(&mut self) {
		if self.state != RunState::Paused {
			return;
		}
		self.state = RunState::Running;
		self.scheduler.request_frame();
		debug!("neural-field: resumed");
	}

	/// Stop for good. Later `start`/`resume` calls do nothing.
	pub fn destroy(&mut self) {
		self.scheduler.cancel_frame();
		self.state = RunState::Stopped;
		self.destroyed = true;
		self.field.teardown();
	}

	pub fn is_destroyed(&self) -> bool {
		self.destroyed
	}

	/// Host callback. Returns whether a step and render happened.
	pub fn frame(&mut self, now: f64) -> bool {
		if self.state != RunState::Running {
			return false;
		}
		let max_fps = self.field.config().performance.max_fps;
		let ran = match self.gate.admit(now, max_fps) {
			Some(elapsed) => {
				let speed = self.field.config().animation_speed;
				self.field.step(elapsed, speed);
				render(&mut self.field, &mut self.surface);
				true
			}
			None => false,
		};
		self.scheduler.request_frame();
		ran
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.surface.resize(width, height);
		self.field.resize(width, height);
	}
}

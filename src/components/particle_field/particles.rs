//! Individual field particles and their per-tick motion.

use std::f64::consts::TAU;

use rand::Rng;

/// Speed ceiling, in units per tick.
pub const MAX_SPEED: f64 = 0.5;
/// Radius within which an active pointer pushes particles away.
pub const REPULSION_RADIUS: f64 = 50.0;
/// Scale applied to the repulsion falloff.
pub const REPULSION_STRENGTH: f64 = 0.1;
/// Pulse phase advance per tick, in radians.
pub const PULSE_STEP: f64 = 0.02;
/// Highlight decay per tick.
pub const HIGHLIGHT_DECAY: f64 = 0.05;

// Accumulated float error below this counts as fully decayed.
const DECAY_SETTLED: f64 = 1e-9;

/// Pointer position and whether it is over the field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
	pub x: f64,
	pub y: f64,
	pub active: bool,
}

/// A single node of the network.
#[derive(Clone, Debug)]
pub struct Particle {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub radius: f64,
	pub base_radius: f64,
	pub opacity: f64,
	pub base_opacity: f64,
	pub is_highlighted: bool,
	pub highlight_decay: f64,
	pub pulse_phase: f64,
}

impl Particle {
	/// A particle at a random spot inside `width` x `height`.
	pub fn spawn<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> Self {
		let base_radius = rng.r#gen::<f64>() * 3.0 + 1.0;
		let base_opacity = rng.r#gen::<f64>() * 0.8 + 0.2;

		Self {
			x: rng.r#gen::<f64>() * width,
			y: rng.r#gen::<f64>() * height,
			vx: (rng.r#gen::<f64>() - 0.5) * 2.0,
			vy: (rng.r#gen::<f64>() - 0.5) * 2.0,
			radius: base_radius,
			base_radius,
			opacity: base_opacity,
			base_opacity,
			is_highlighted: false,
			highlight_decay: 0.0,
			pulse_phase: rng.r#gen::<f64>() * TAU,
		}
	}

	pub fn speed(&self) -> f64 {
		(self.vx * self.vx + self.vy * self.vy).sqrt()
	}

	pub fn distance_to(&self, x: f64, y: f64) -> f64 {
		let (dx, dy) = (self.x - x, self.y - y);
		(dx * dx + dy * dy).sqrt()
	}

	/// Advance one tick: pointer repulsion, speed cap, integration and visuals.
	/// Bounds are handled separately by [`Particle::confine`].
	pub fn update(&mut self, pointer: &PointerState, speed: f64) {
		if pointer.active {
			self.repel_from(pointer.x, pointer.y);
		}

		self.cap_speed();

		self.x += self.vx * speed;
		self.y += self.vy * speed;

		self.update_visuals();
	}

	/// Rescale the velocity so `speed() <= MAX_SPEED` holds exactly.
	fn cap_speed(&mut self) {
		let current = self.speed();
		if current <= MAX_SPEED {
			return;
		}
		let scale = MAX_SPEED / current;
		self.vx *= scale;
		self.vy *= scale;
		// Rounding can leave the rescaled speed an ulp or two over.
		while self.speed() > MAX_SPEED {
			self.vx *= 1.0 - f64::EPSILON;
			self.vy *= 1.0 - f64::EPSILON;
		}
	}

	fn repel_from(&mut self, px: f64, py: f64) {
		let (dx, dy) = (self.x - px, self.y - py);
		let distance = (dx * dx + dy * dy).sqrt();
		// A pointer sitting exactly on the particle has no direction to push along.
		if distance <= 0.0 || distance >= REPULSION_RADIUS {
			return;
		}
		let force = (REPULSION_RADIUS - distance) / REPULSION_RADIUS;
		self.vx += dx / distance * force * REPULSION_STRENGTH;
		self.vy += dy / distance * force * REPULSION_STRENGTH;
	}

	/// Reflect off and clamp to `[0, width] x [0, height]`.
	pub fn confine(&mut self, width: f64, height: f64) {
		if self.x < 0.0 || self.x > width {
			self.vx = -self.vx;
		}
		if self.y < 0.0 || self.y > height {
			self.vy = -self.vy;
		}
		self.x = self.x.clamp(0.0, width.max(0.0));
		self.y = self.y.clamp(0.0, height.max(0.0));
	}

	/// Light the particle up; it fades over the following ticks.
	pub fn highlight(&mut self) {
		self.is_highlighted = true;
		self.highlight_decay = 1.0;
	}

	fn update_visuals(&mut self) {
		self.pulse_phase += PULSE_STEP;

		if self.is_highlighted {
			self.highlight_decay -= HIGHLIGHT_DECAY;
			if self.highlight_decay <= DECAY_SETTLED {
				self.highlight_decay = 0.0;
				self.is_highlighted = false;
			}
		}

		let pulse = 1.0 + 0.1 * self.pulse_phase.sin();
		self.radius = self.base_radius * pulse * (1.0 + 0.5 * self.highlight_decay);
		self.opacity = self.base_opacity * (0.7 + 0.3 * self.highlight_decay);
	}
}

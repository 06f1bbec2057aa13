//! Particle field state: the particle collection, its configuration and the
//! pointer snapshot, plus the discrete simulation step.
//!
//! Everything here is host-agnostic; drawing goes through
//! [`render`](super::render::render) and timing through the frame loop.

use log::info;
use rand::rngs::SmallRng;

use super::config::{FieldConfig, PartialConfig};
use super::particles::{Particle, PointerState};

/// Frame-rate cap applied by low-power mode.
pub const LOW_POWER_MAX_FPS: f64 = 30.0;

/// Peak alpha of a particle-to-particle connection.
pub const CONNECTION_ALPHA: f64 = 0.6;

/// A rendered line between two particles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
	pub a: usize,
	pub b: usize,
	pub distance: f64,
	pub alpha: f64,
}

/// Linear falloff: 1 at distance zero, 0 at `threshold`.
pub fn falloff(distance: f64, threshold: f64) -> f64 {
	1.0 - distance / threshold
}

/// The simulated particle network.
pub struct ParticleField {
	particles: Vec<Particle>,
	config: FieldConfig,
	pointer: PointerState,
	width: f64,
	height: f64,
	low_power: bool,
	elapsed_ms: f64,
	rng: SmallRng,
}

impl ParticleField {
	/// Create a field sized `width` x `height` and populate it.
	pub fn new(width: f64, height: f64, config: FieldConfig, rng: SmallRng) -> Self {
		let mut field = Self {
			particles: Vec::new(),
			config,
			pointer: PointerState::default(),
			width,
			height,
			low_power: false,
			elapsed_ms: 0.0,
			rng,
		};
		field.initialize();
		field
	}

	/// Replace every particle with a freshly spawned one.
	pub fn initialize(&mut self) {
		let count = self.target_node_count();
		let (w, h) = (self.width, self.height);
		let rng = &mut self.rng;
		self.particles = (0..count).map(|_| Particle::spawn(&mut *rng, w, h)).collect();
	}

	fn target_node_count(&self) -> usize {
		if self.low_power {
			self.config.performance.low_power_node_count
		} else {
			self.config.node_count
		}
	}

	/// New clamp bounds. Particles outside them are pulled back on their next step.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn set_pointer(&mut self, x: f64, y: f64, active: bool) {
		self.pointer = PointerState { x, y, active };
	}

	/// Mark the pointer as gone while keeping its last position.
	pub fn release_pointer(&mut self) {
		self.pointer.active = false;
	}

	/// Advance every particle one tick. `dt` is the frame time in milliseconds.
	pub fn step(&mut self, dt: f64, speed: f64) {
		self.elapsed_ms += dt;
		let pointer = self.pointer;
		for p in &mut self.particles {
			p.update(&pointer, speed);
			p.confine(self.width, self.height);
		}
	}

	/// Every particle pair closer than the connection distance.
	pub fn connections(&self) -> Vec<Connection> {
		let threshold = self.config.connection_distance;
		let mut out = Vec::new();
		for (i, a) in self.particles.iter().enumerate() {
			for (j, b) in self.particles.iter().enumerate().skip(i + 1) {
				let distance = a.distance_to(b.x, b.y);
				if distance < threshold {
					out.push(Connection {
						a: i,
						b: j,
						distance,
						alpha: CONNECTION_ALPHA * falloff(distance, threshold),
					});
				}
			}
		}
		out
	}

	/// Particles within pointer influence, with their line alpha.
	/// Empty while the pointer is inactive.
	pub fn pointer_links(&self) -> Vec<(usize, f64)> {
		if !self.pointer.active {
			return Vec::new();
		}
		let radius = self.config.pointer_influence;
		self.particles
			.iter()
			.enumerate()
			.filter_map(|(i, p)| {
				let distance = p.distance_to(self.pointer.x, self.pointer.y);
				(distance < radius).then(|| (i, falloff(distance, radius)))
			})
			.collect()
	}

	pub(super) fn highlight(&mut self, index: usize) {
		if let Some(p) = self.particles.get_mut(index) {
			p.highlight();
		}
	}

	/// Fewer particles, half speed, 30 fps. Returns `false` if already engaged.
	pub fn enable_low_power_mode(&mut self) -> bool {
		if self.low_power {
			return false;
		}
		self.low_power = true;
		self.config.animation_speed *= 0.5;
		self.config.performance.max_fps = LOW_POWER_MAX_FPS;
		self.initialize();
		info!(
			"neural-field: low power mode enabled ({} nodes)",
			self.particles.len()
		);
		true
	}

	/// Merge `partial` into the configuration and repopulate.
	///
	/// Low-power mode survives: a supplied speed is halved and the frame-rate
	/// cap stays at [`LOW_POWER_MAX_FPS`] or below.
	pub fn reconfigure(&mut self, partial: PartialConfig) {
		let new_speed = partial.animation_speed.is_some();
		self.config.merge(partial);
		if self.low_power {
			if new_speed {
				self.config.animation_speed *= 0.5;
			}
			let perf = &mut self.config.performance;
			perf.max_fps = perf.max_fps.min(LOW_POWER_MAX_FPS);
		}
		self.initialize();
	}

	pub fn teardown(&mut self) {
		self.particles.clear();
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	pub fn config(&self) -> &FieldConfig {
		&self.config
	}

	pub fn pointer(&self) -> PointerState {
		self.pointer
	}

	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	pub fn is_low_power(&self) -> bool {
		self.low_power
	}

	/// Simulated time accumulated across steps, in milliseconds.
	pub fn elapsed_ms(&self) -> f64 {
		self.elapsed_ms
	}

	#[cfg(test)]
	pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
		&mut self.particles
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::particle_field::config::PerformanceSettings;
	use crate::components::particle_field::particles::{MAX_SPEED, PULSE_STEP};
	use rand::SeedableRng;

	fn field(width: f64, height: f64, config: FieldConfig) -> ParticleField {
		ParticleField::new(width, height, config, SmallRng::seed_from_u64(42))
	}

	fn scenario_config() -> FieldConfig {
		FieldConfig {
			node_count: 10,
			connection_distance: 150.0,
			animation_speed: 1.0,
			..FieldConfig::default()
		}
	}

	fn in_bounds(f: &ParticleField) -> bool {
		let (w, h) = f.size();
		f.particles()
			.iter()
			.all(|p| (0.0..=w).contains(&p.x) && (0.0..=h).contains(&p.y))
	}

	#[test]
	fn initialize_populates_within_bounds() {
		let f = field(800.0, 600.0, scenario_config());
		assert_eq!(f.particles().len(), 10);
		assert!(in_bounds(&f));
	}

	#[test]
	fn one_step_integrates_velocity() {
		let mut f = field(800.0, 600.0, scenario_config());
		// Keep every particle well inside so no reflection happens.
		for (i, p) in f.particles_mut().iter_mut().enumerate() {
			p.x = 100.0 + i as f64 * 50.0;
			p.y = 300.0;
		}
		let before: Vec<Particle> = f.particles().to_vec();
		f.step(16.0, 1.0);

		for (old, new) in before.iter().zip(f.particles()) {
			let scale = (MAX_SPEED / old.speed()).min(1.0);
			assert!((new.x - (old.x + old.vx * scale)).abs() < 1e-9);
			assert!((new.y - (old.y + old.vy * scale)).abs() < 1e-9);
			assert!((new.pulse_phase - (old.pulse_phase + PULSE_STEP)).abs() < 1e-12);
		}
		assert_eq!(f.elapsed_ms(), 16.0);
	}

	#[test]
	fn particles_stay_in_bounds_and_under_speed_cap() {
		let mut f = field(200.0, 150.0, FieldConfig {
			node_count: 60,
			animation_speed: 3.0,
			..FieldConfig::default()
		});
		f.set_pointer(100.0, 75.0, true);
		for i in 0..2000 {
			if i % 100 == 0 {
				f.set_pointer((i % 200) as f64, (i % 150) as f64, i % 300 != 0);
			}
			f.step(16.0, f.config().animation_speed);
			assert!(in_bounds(&f));
			assert!(f.particles().iter().all(|p| p.speed() <= MAX_SPEED));
		}
	}

	#[test]
	fn shrinking_surface_pulls_particles_back_on_next_step() {
		let mut f = field(800.0, 600.0, scenario_config());
		f.resize(10.0, 10.0);
		assert_eq!(f.size(), (10.0, 10.0));
		f.step(16.0, 1.0);
		assert!(in_bounds(&f));
	}

	#[test]
	fn degenerate_inputs_are_legal() {
		let mut empty = field(800.0, 600.0, FieldConfig {
			node_count: 0,
			..FieldConfig::default()
		});
		empty.step(16.0, 1.0);
		assert!(empty.particles().is_empty());
		assert!(empty.connections().is_empty());

		let mut flat = field(0.0, 0.0, scenario_config());
		flat.step(16.0, 1.0);
		assert!(flat.particles().iter().all(|p| p.x == 0.0 && p.y == 0.0));
	}

	#[test]
	fn connection_alpha_falls_off_linearly() {
		let mut f = field(800.0, 600.0, FieldConfig {
			node_count: 3,
			..scenario_config()
		});
		let ps = f.particles_mut();
		(ps[0].x, ps[0].y) = (100.0, 100.0);
		(ps[1].x, ps[1].y) = (160.0, 180.0); // distance 100
		(ps[2].x, ps[2].y) = (100.0, 250.0); // exactly 150 from ps[0]

		let connections = f.connections();
		let first = connections
			.iter()
			.find(|c| (c.a, c.b) == (0, 1))
			.expect("pair within range");
		assert!((first.distance - 100.0).abs() < 1e-9);
		assert!((first.alpha - 0.6 * (1.0 - 100.0 / 150.0)).abs() < 1e-12);
		assert!(!connections.iter().any(|c| (c.a, c.b) == (0, 2)));
	}

	#[test]
	fn pointer_links_require_active_pointer() {
		let mut f = field(800.0, 600.0, FieldConfig {
			node_count: 2,
			..scenario_config()
		});
		let ps = f.particles_mut();
		(ps[0].x, ps[0].y) = (400.0, 300.0);
		(ps[1].x, ps[1].y) = (700.0, 300.0);

		f.set_pointer(350.0, 300.0, false);
		assert!(f.pointer_links().is_empty());

		f.set_pointer(350.0, 300.0, true);
		assert_eq!(f.pointer_links(), vec![(0, 0.5)]);

		f.release_pointer();
		assert!(!f.pointer().active);
		assert!(f.pointer_links().is_empty());
	}

	#[test]
	fn low_power_mode_is_idempotent() {
		let mut f = field(800.0, 600.0, FieldConfig {
			node_count: 80,
			animation_speed: 1.0,
			..FieldConfig::default()
		});
		assert!(f.enable_low_power_mode());
		assert_eq!(f.particles().len(), 30);
		assert_eq!(f.config().animation_speed, 0.5);
		assert_eq!(f.config().performance.max_fps, 30.0);

		assert!(!f.enable_low_power_mode());
		assert_eq!(f.particles().len(), 30);
		assert_eq!(f.config().animation_speed, 0.5);
	}

	#[test]
	fn reconfigure_repopulates_with_new_count() {
		let mut f = field(800.0, 600.0, scenario_config());
		f.reconfigure(PartialConfig {
			node_count: Some(25),
			..Default::default()
		});
		assert_eq!(f.particles().len(), 25);
		assert_eq!(f.config().connection_distance, 150.0);

		f.enable_low_power_mode();
		f.reconfigure(PartialConfig {
			node_count: Some(50),
			..Default::default()
		});
		assert_eq!(f.particles().len(), 30, "low power keeps the reduced count");
	}

	#[test]
	fn full_reconfigure_keeps_low_power_settings() {
		let mut f = field(800.0, 600.0, FieldConfig::default());
		f.enable_low_power_mode();
		f.reconfigure(PartialConfig::from(FieldConfig::default()));

		assert!(f.is_low_power());
		assert_eq!(f.particles().len(), 30);
		assert_eq!(f.config().animation_speed, 0.25);
		assert_eq!(f.config().performance.max_fps, LOW_POWER_MAX_FPS);

		// Untouched speed is not halved a second time; a lower cap is kept.
		f.reconfigure(PartialConfig {
			performance: Some(PerformanceSettings {
				max_fps: 20.0,
				..PerformanceSettings::default()
			}),
			..Default::default()
		});
		assert_eq!(f.config().animation_speed, 0.25);
		assert_eq!(f.config().performance.max_fps, 20.0);
	}

	#[test]
	fn teardown_clears_particles() {
		let mut f = field(800.0, 600.0, scenario_config());
		f.teardown();
		assert!(f.particles().is_empty());
	}
}

//! Performance signals that can push the field into low-power mode.

/// Measured frame rates below this engage low-power mode.
pub const LOW_FPS_THRESHOLD: u32 = 30;

const FPS_WINDOW_MS: f64 = 1000.0;

/// Counts animation callbacks and reports a rate once per second-long window.
#[derive(Clone, Debug, Default)]
pub struct FpsMeter {
	window_start: Option<f64>,
	frames: u32,
}

impl FpsMeter {
	/// Record a callback at `now` (ms). Returns the rate when a window closes.
	pub fn record(&mut self, now: f64) -> Option<u32> {
		let Some(start) = self.window_start else {
			self.window_start = Some(now);
			self.frames = 0;
			return None;
		};
		self.frames += 1;
		let elapsed = now - start;
		if elapsed < FPS_WINDOW_MS {
			return None;
		}
		let fps = (self.frames as f64 * 1000.0 / elapsed).round() as u32;
		self.window_start = Some(now);
		self.frames = 0;
		Some(fps)
	}

	/// Forget the current window, e.g. after the page was hidden.
	pub fn reset(&mut self) {
		self.window_start = None;
		self.frames = 0;
	}
}

/// Snapshot of the device battery.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatteryStatus {
	pub charging: bool,
	/// Charge level, 0.0 to 1.0.
	pub level: f64,
}

impl BatteryStatus {
	pub fn is_low(&self, threshold: f64) -> bool {
		!self.charging && self.level < threshold
	}
}

//! Drawing the field.
//!
//! Rendering goes through the [`Surface`] trait so the frame logic can run
//! against a canvas in the browser and against a recorder in tests.
//! Passes, back to front:
//! 1. Clear to the background color
//! 2. Particle-to-particle connections
//! 3. Pointer connections (and the highlights they trigger)
//! 4. Particles, with a halo on highlighted ones

use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::state::ParticleField;
use super::theme::Color;

const CONNECTION_WIDTH: f64 = 1.0;
const POINTER_CONNECTION_WIDTH: f64 = 2.0;
const HALO_SCALE: f64 = 3.0;
const HALO_ALPHA: f64 = 0.3;

/// Something the field can be drawn onto. Sizes are in CSS pixels.
pub trait Surface {
	/// Current drawable size.
	fn size(&self) -> (f64, f64);
	/// Adopt a new drawable size.
	fn resize(&mut self, width: f64, height: f64);
	/// Wipe the whole surface and fill it with `background`.
	fn clear(&mut self, background: Color);
	/// Stroke a straight line.
	fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Color, width: f64);
	/// Fill a circle.
	fn circle(&mut self, center: (f64, f64), radius: f64, fill: Color);
}

/// Draws one frame. Particles within pointer influence get highlighted here,
/// which is why the field is borrowed mutably.
pub fn render<S: Surface>(field: &mut ParticleField, surface: &mut S) {
	let colors = field.config().colors.clone();

	surface.clear(colors.background);

	for c in field.connections() {
		let (a, b) = (&field.particles()[c.a], &field.particles()[c.b]);
		surface.line(
			(a.x, a.y),
			(b.x, b.y),
			colors.connections.fade(c.alpha),
			CONNECTION_WIDTH,
		);
	}

	let pointer = field.pointer();
	for (index, alpha) in field.pointer_links() {
		let p = &field.particles()[index];
		surface.line(
			(pointer.x, pointer.y),
			(p.x, p.y),
			colors.pointer_connections.fade(alpha),
			POINTER_CONNECTION_WIDTH,
		);
		field.highlight(index);
	}

	for p in field.particles() {
		surface.circle((p.x, p.y), p.radius, colors.nodes.fade(p.opacity));
		if p.is_highlighted {
			surface.circle(
				(p.x, p.y),
				p.radius * HALO_SCALE,
				colors.nodes.fade(p.highlight_decay * HALO_ALPHA),
			);
		}
	}
}

/// A 2D canvas, backing store scaled by the device pixel ratio.
pub struct CanvasSurface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	width: f64,
	height: f64,
	pixel_ratio: f64,
}

impl CanvasSurface {
	/// Wraps `canvas`, or `None` when no 2D context can be had.
	pub fn new(canvas: HtmlCanvasElement, width: f64, height: f64, pixel_ratio: f64) -> Option<Self> {
		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.ok()
			.flatten()?
			.dyn_into()
			.ok()?;

		let mut surface = Self {
			canvas,
			ctx,
			width,
			height,
			pixel_ratio: if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
		};
		surface.fit();
		Some(surface)
	}

	fn fit(&mut self) {
		let dpr = self.pixel_ratio;
		self.canvas.set_width((self.width * dpr) as u32);
		self.canvas.set_height((self.height * dpr) as u32);

		let style = self.canvas.style();
		let _ = style.set_property("width", &format!("{}px", self.width));
		let _ = style.set_property("height", &format!("{}px", self.height));

		// Resizing the backing store resets the context transform.
		let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
	}
}

impl Surface for CanvasSurface {
	fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.fit();
	}

	fn clear(&mut self, background: Color) {
		self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
		if !background.is_transparent() {
			self.ctx.set_fill_style_str(&background.to_css());
			self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
		}
	}

	fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Color, width: f64) {
		self.ctx.set_stroke_style_str(&stroke.to_css());
		self.ctx.set_line_width(width);
		self.ctx.begin_path();
		self.ctx.move_to(from.0, from.1);
		self.ctx.line_to(to.0, to.1);
		self.ctx.stroke();
	}

	fn circle(&mut self, center: (f64, f64), radius: f64, fill: Color) {
		self.ctx.set_fill_style_str(&fill.to_css());
		self.ctx.begin_path();
		let _ = self.ctx.arc(center.0, center.1, radius.max(0.0), 0.0, PI * 2.0);
		self.ctx.fill();
	}
}

#[cfg(test)]
pub(crate) mod testing {
	use super::*;

	/// A drawing operation captured by [`Recorder`].
	#[derive(Clone, Debug, PartialEq)]
	pub enum Op {
		Clear(Color),
		Line {
			from: (f64, f64),
			to: (f64, f64),
			stroke: Color,
			width: f64,
		},
		Circle {
			center: (f64, f64),
			radius: f64,
			fill: Color,
		},
	}

	/// Surface that records instead of drawing.
	#[derive(Default)]
	pub struct Recorder {
		pub ops: Vec<Op>,
		pub size: (f64, f64),
	}

	impl Recorder {
		pub fn sized(width: f64, height: f64) -> Self {
			Self {
				ops: Vec::new(),
				size: (width, height),
			}
		}

		pub fn lines(&self, width: f64) -> Vec<&Op> {
			self.ops
				.iter()
				.filter(|op| matches!(op, Op::Line { width: w, .. } if *w == width))
				.collect()
		}

		pub fn circles(&self) -> usize {
			self.ops.iter().filter(|op| matches!(op, Op::Circle { .. })).count()
		}
	}

	impl Surface for Recorder {
		fn size(&self) -> (f64, f64) {
			self.size
		}

		fn resize(&mut self, width: f64, height: f64) {
			self.size = (width, height);
		}

		fn clear(&mut self, background: Color) {
			self.ops.clear();
			self.ops.push(Op::Clear(background));
		}

		fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Color, width: f64) {
			self.ops.push(Op::Line {
				from,
				to,
				stroke,
				width,
			});
		}

		fn circle(&mut self, center: (f64, f64), radius: f64, fill: Color) {
			self.ops.push(Op::Circle {
				center,
				radius,
				fill,
			});
		}
	}
}

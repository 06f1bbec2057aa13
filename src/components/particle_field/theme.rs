//! Colors for the particle field.
//!
//! Colors arrive as CSS strings in the page configuration and leave as CSS
//! strings for the canvas, with per-draw alpha folded in on the way out.

use serde::{Deserialize, Deserializer, de};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	/// Fully transparent black, what CSS calls `transparent`.
	pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Scale the existing alpha by `factor`, the way `globalAlpha` multiplies
	/// into an `rgba()` fill on a canvas.
	pub fn fade(self, factor: f64) -> Self {
		self.with_alpha((self.a * factor).clamp(0.0, 1.0))
	}

	pub fn is_transparent(self) -> bool {
		self.a <= 0.0
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parses a CSS color string.
	/// Supports `#RGB`, `#RRGGBB`, `rgb()`/`rgba()` and `transparent`.
	pub fn parse(color_str: &str) -> Option<Color> {
		let s = color_str.trim();
		if s.eq_ignore_ascii_case("transparent") {
			return Some(Color::TRANSPARENT);
		}
		if let Some(hex) = s.strip_prefix('#') {
			return parse_hex(hex);
		}
		let lower = s.to_ascii_lowercase();
		let body = lower
			.strip_prefix("rgba(")
			.or_else(|| lower.strip_prefix("rgb("))?
			.strip_suffix(')')?;
		let parts: Vec<&str> = body.split(',').map(str::trim).collect();
		let a = match parts.len() {
			3 => 1.0,
			4 => parts[3].parse::<f64>().ok()?.clamp(0.0, 1.0),
			_ => return None,
		};
		Some(Color::rgba(
			parts[0].parse().ok()?,
			parts[1].parse().ok()?,
			parts[2].parse().ok()?,
			a,
		))
	}
}

fn parse_hex(hex: &str) -> Option<Color> {
	if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
		return None;
	}
	match hex.len() {
		3 => {
			let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
			Some(Color::rgb(digit(0).ok()?, digit(1).ok()?, digit(2).ok()?))
		}
		6 => Some(Color::rgb(
			u8::from_str_radix(&hex[0..2], 16).ok()?,
			u8::from_str_radix(&hex[2..4], 16).ok()?,
			u8::from_str_radix(&hex[4..6], 16).ok()?,
		)),
		_ => None,
	}
}

impl<'de> Deserialize<'de> for Color {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		Color::parse(&s).ok_or_else(|| de::Error::custom(format!("unrecognized color `{s}`")))
	}
}

/// Colors used when drawing the field.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldColors {
	/// Particle fill.
	pub nodes: Color,
	/// Stroke for particle-to-particle connections.
	pub connections: Color,
	/// Stroke for pointer-to-particle connections.
	#[serde(alias = "mouseConnections")]
	pub pointer_connections: Color,
	/// Fill applied when clearing each frame.
	pub background: Color,
}

impl FieldColors {
	/// Gold on transparent.
	pub fn gold() -> Self {
		Self {
			nodes: Color::rgb(255, 215, 0),
			connections: Color::rgba(255, 215, 0, 0.3),
			pointer_connections: Color::rgba(255, 215, 0, 0.6),
			background: Color::TRANSPARENT,
		}
	}
}

impl Default for FieldColors {
	fn default() -> Self {
		Self::gold()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hex_forms() {
		assert_eq!(Color::parse("#FFD700"), Some(Color::rgb(255, 215, 0)));
		assert_eq!(Color::parse("#fff"), Some(Color::rgb(255, 255, 255)));
		assert_eq!(Color::parse("#12345"), None);
		assert_eq!(Color::parse("#zzzzzz"), None);
	}

	#[test]
	fn parses_functional_notation_and_transparent() {
		assert_eq!(
			Color::parse("rgba(255, 215, 0, 0.3)"),
			Some(Color::rgba(255, 215, 0, 0.3))
		);
		assert_eq!(Color::parse("rgb(1,2,3)"), Some(Color::rgb(1, 2, 3)));
		assert_eq!(Color::parse("transparent"), Some(Color::TRANSPARENT));
		assert_eq!(Color::parse("rgb(1,2)"), None);
		assert_eq!(Color::parse("papayawhip"), None);
	}

	#[test]
	fn fade_multiplies_existing_alpha() {
		let c = Color::rgba(255, 215, 0, 0.6).fade(0.5);
		assert!((c.a - 0.3).abs() < 1e-12);
		assert_eq!(c.to_css(), "rgba(255, 215, 0, 0.3)");
		assert_eq!(Color::rgb(255, 215, 0).to_css(), "#ffd700");
	}

	#[test]
	fn colors_deserialize_from_css_strings() {
		let colors: FieldColors =
			serde_json::from_str(r##"{ "nodes": "#00ff00", "mouseConnections": "rgba(0, 0, 255, 0.5)" }"##)
				.unwrap();
		assert_eq!(colors.nodes, Color::rgb(0, 255, 0));
		assert_eq!(colors.pointer_connections, Color::rgba(0, 0, 255, 0.5));
		assert_eq!(colors.background, Color::TRANSPARENT);

		assert!(serde_json::from_str::<FieldColors>(r#"{ "nodes": "nope" }"#).is_err());
	}
}

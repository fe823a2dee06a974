//! Colours and stroke styles for the diagram.

use super::types::PositionedNode;

pub const MALE_BADGE: &str = "#3b82f6";
pub const FEMALE_BADGE: &str = "#ec4899";
pub const DESCENT_STROKE: &str = "#64748b";
pub const MARRIAGE_STROKE: &str = "#dc2626";
pub const TEXT_DARK: &str = "#1e293b";
pub const TEXT_MUTED: &str = "#64748b";
pub const BAND_LABEL: &str = "#475569";

const STROKE_WIDTH: f64 = 2.0;
const HOVER_STROKE_WIDTH: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardColors {
	pub fill: &'static str,
	pub stroke: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
	pub color: &'static str,
	pub blur: f64,
	pub offset_x: f64,
	pub offset_y: f64,
}

const HOVER_SHADOW: Shadow = Shadow {
	color: "rgba(0, 0, 0, 0.2)",
	blur: 8.0,
	offset_x: 0.0,
	offset_y: 4.0,
};

/// How a node card is painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	pub colors: CardColors,
	pub stroke_width: f64,
	pub shadow: Option<Shadow>,
}

pub fn card_colors(is_spouse: bool, male: bool) -> CardColors {
	let (fill, stroke) = match (is_spouse, male) {
		(false, true) => ("#bfdbfe", "#2563eb"),
		(false, false) => ("#f9a8d4", "#db2777"),
		(true, true) => ("#dbeafe", MALE_BADGE),
		(true, false) => ("#fce7f3", FEMALE_BADGE),
	};
	CardColors { fill, stroke }
}

pub fn node_style(node: &PositionedNode, hovered: bool) -> NodeStyle {
	NodeStyle {
		colors: card_colors(node.is_spouse(), node.person.gender),
		stroke_width: if hovered {
			HOVER_STROKE_WIDTH
		} else {
			STROKE_WIDTH
		},
		shadow: hovered.then_some(HOVER_SHADOW),
	}
}

/// Badge colour and glyph for the gender marker.
pub fn gender_badge(male: bool) -> (&'static str, &'static str) {
	if male {
		(MALE_BADGE, "♂")
	} else {
		(FEMALE_BADGE, "♀")
	}
}

/// Bands alternate between two tones by generation parity.
pub fn band_fill(generation: u32) -> &'static str {
	if generation % 2 == 1 {
		"#f8fafc"
	} else {
		"#f1f5f9"
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::family_tree::types::{NodeId, Person};

	fn node(male: bool, spouse_of: Option<NodeId>) -> PositionedNode {
		PositionedNode {
			person: Person {
				gender: male,
				..Person::default()
			},
			x: 0.0,
			y: 0.0,
			depth: 0,
			parent: None,
			spouse_of,
			band: None,
		}
	}

	#[test]
	fn palette_is_keyed_by_spouse_and_gender() {
		let all = [
			card_colors(false, true),
			card_colors(false, false),
			card_colors(true, true),
			card_colors(true, false),
		];
		for (i, a) in all.iter().enumerate() {
			for b in &all[i + 1..] {
				assert_ne!(a.fill, b.fill);
			}
		}
		assert_eq!(
			node_style(&node(true, Some(NodeId(0))), false).colors,
			card_colors(true, true)
		);
	}

	#[test]
	fn hover_thickens_stroke_and_adds_shadow() {
		let n = node(false, None);
		let idle = node_style(&n, false);
		let hovered = node_style(&n, true);
		assert_eq!(idle.stroke_width, 2.0);
		assert_eq!(idle.shadow, None);
		assert_eq!(hovered.stroke_width, 4.0);
		assert!(hovered.shadow.is_some());
		assert_eq!(hovered.colors, idle.colors);
		assert_eq!(node_style(&n, false), idle);
	}

	#[test]
	fn bands_alternate() {
		assert_eq!(band_fill(1), band_fill(3));
		assert_ne!(band_fill(1), band_fill(2));
		assert_eq!(gender_badge(true).1, "♂");
		assert_eq!(gender_badge(false).0, FEMALE_BADGE);
	}
}

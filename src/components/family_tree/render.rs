use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{CARD_HEIGHT, CARD_WIDTH, FamilyTreeState, MARGIN_LEFT, MARGIN_TOP};
use super::style::{self, BAND_LABEL, DESCENT_STROKE, MARRIAGE_STROKE, TEXT_DARK, TEXT_MUTED};
use super::types::{NodeId, PositionedNode};

const BACKGROUND: &str = "#f9fafb";
const BAND_PAD_X: f64 = 200.0;
const BAND_PAD_Y: f64 = 50.0;

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

/// Clears the surface and draws the whole diagram for the current state.
/// An empty tree leaves the surface blank.
pub fn render(state: &FamilyTreeState, ctx: &CanvasRenderingContext2d) {
	if !state.has_diagram() {
		ctx.clear_rect(0.0, 0.0, state.width, state.height);
		return;
	}
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	let (viewport, transform) = (&state.viewport, &state.transform);
	ctx.save();
	let _ = ctx.translate(viewport.offset_x, viewport.offset_y);
	let _ = ctx.scale(viewport.scale, viewport.scale);
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	let _ = ctx.translate(MARGIN_LEFT, MARGIN_TOP);
	draw_bands(state, ctx);
	draw_descent_edges(state, ctx);
	draw_marriage_edges(state, ctx);
	for (i, node) in state.layout.nodes.iter().enumerate() {
		draw_node(node, state.is_hovered(NodeId(i)), ctx);
	}
	ctx.restore();

	draw_legend(state, ctx);
}

fn draw_bands(state: &FamilyTreeState, ctx: &CanvasRenderingContext2d) {
	let Some((min_x, max_x)) = state.layout.x_extent() else {
		return;
	};
	let (left, right) = (min_x - BAND_PAD_X, max_x + BAND_PAD_X);
	for band in &state.bands {
		let (top, bottom) = (band.min_y - BAND_PAD_Y, band.max_y + BAND_PAD_Y);
		ctx.set_global_alpha(0.3);
		ctx.set_fill_style_str(style::band_fill(band.generation));
		rounded_rect(ctx, left, top, right - left, bottom - top, 8.0);
		ctx.fill();
		ctx.set_global_alpha(1.0);

		ctx.set_fill_style_str(BAND_LABEL);
		ctx.set_font("bold 14px sans-serif");
		ctx.set_text_align("left");
		let _ = ctx.fill_text(&format!("Đời {}", band.generation), left + 15.0, top + 25.0);
	}
}

fn draw_descent_edges(state: &FamilyTreeState, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(DESCENT_STROKE);
	ctx.set_line_width(2.0);
	ctx.set_global_alpha(0.6);
	for edge in &state.layout.descent_edges {
		let (from, to) = (state.layout.node(edge.parent), state.layout.node(edge.child));
		let mid_y = (from.y + to.y) / 2.0;
		ctx.begin_path();
		ctx.move_to(from.x, from.y);
		ctx.bezier_curve_to(from.x, mid_y, to.x, mid_y, to.x, to.y);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_marriage_edges(state: &FamilyTreeState, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(MARRIAGE_STROKE);
	ctx.set_line_width(3.0);
	ctx.set_global_alpha(0.8);
	for edge in &state.layout.marriage_edges {
		let (a, b) = (state.layout.node(edge.member), state.layout.node(edge.spouse));
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_node(node: &PositionedNode, hovered: bool, ctx: &CanvasRenderingContext2d) {
	let (x, y) = (node.x, node.y);
	let card = style::node_style(node, hovered);

	ctx.save();
	if let Some(shadow) = card.shadow {
		ctx.set_shadow_color(shadow.color);
		ctx.set_shadow_blur(shadow.blur);
		ctx.set_shadow_offset_x(shadow.offset_x);
		ctx.set_shadow_offset_y(shadow.offset_y);
	}
	rounded_rect(
		ctx,
		x - CARD_WIDTH / 2.0,
		y - CARD_HEIGHT / 2.0,
		CARD_WIDTH,
		CARD_HEIGHT,
		10.0,
	);
	ctx.set_fill_style_str(card.colors.fill);
	ctx.fill();
	ctx.restore();
	ctx.set_stroke_style_str(card.colors.stroke);
	ctx.set_line_width(card.stroke_width);
	ctx.stroke();

	ctx.set_text_align("center");
	ctx.set_fill_style_str(TEXT_DARK);
	ctx.set_font("bold 14px sans-serif");
	let _ = ctx.fill_text(&node.person.full_name, x, y - 15.0);
	ctx.set_fill_style_str(TEXT_MUTED);
	ctx.set_font("12px sans-serif");
	let _ = ctx.fill_text(&node.person.role_family, x, y);
	if let Some(year) = node.person.birth_year() {
		ctx.set_font("11px sans-serif");
		let _ = ctx.fill_text(&format!("Sinh: {year}"), x, y + 18.0);
	}

	let (badge, glyph) = style::gender_badge(node.person.gender);
	ctx.begin_path();
	let _ = ctx.arc(x + 85.0, y - 30.0, 10.0, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(badge);
	ctx.fill();
	ctx.set_stroke_style_str("white");
	ctx.set_line_width(2.0);
	ctx.stroke();
	ctx.set_fill_style_str("white");
	ctx.set_font("bold 12px sans-serif");
	let _ = ctx.fill_text(glyph, x + 85.0, y - 24.0);
}

/// Static key in the top-right corner, drawn in screen space.
fn draw_legend(state: &FamilyTreeState, ctx: &CanvasRenderingContext2d) {
	let (ox, oy) = (state.width - 200.0, 20.0);

	ctx.set_global_alpha(0.95);
	ctx.set_fill_style_str("white");
	rounded_rect(ctx, ox, oy, 180.0, 140.0, 8.0);
	ctx.fill();
	ctx.set_global_alpha(1.0);
	ctx.set_stroke_style_str("#e2e8f0");
	ctx.set_line_width(1.0);
	ctx.stroke();

	ctx.set_text_align("left");
	ctx.set_fill_style_str(TEXT_DARK);
	ctx.set_font("bold 12px sans-serif");
	let _ = ctx.fill_text("Chú thích:", ox + 10.0, oy + 20.0);

	ctx.set_font("11px sans-serif");
	for (male, y, label) in [(true, 30.0, "Nam giới"), (false, 50.0, "Nữ giới")] {
		let colors = style::card_colors(false, male);
		rounded_rect(ctx, ox + 10.0, oy + y, 20.0, 15.0, 3.0);
		ctx.set_fill_style_str(colors.fill);
		ctx.fill();
		ctx.set_stroke_style_str(colors.stroke);
		ctx.stroke();
		ctx.set_fill_style_str(TEXT_DARK);
		let _ = ctx.fill_text(label, ox + 35.0, oy + y + 12.0);
	}

	for (stroke, width, y, label) in [
		(MARRIAGE_STROKE, 3.0, 80.0, "Quan hệ vợ chồng"),
		(DESCENT_STROKE, 2.0, 100.0, "Quan hệ cha con"),
	] {
		ctx.begin_path();
		ctx.move_to(ox + 10.0, oy + y);
		ctx.line_to(ox + 30.0, oy + y);
		ctx.set_stroke_style_str(stroke);
		ctx.set_line_width(width);
		ctx.stroke();
		ctx.set_fill_style_str(TEXT_DARK);
		let _ = ctx.fill_text(label, ox + 35.0, oy + y + 4.0);
	}

	ctx.set_fill_style_str(TEXT_MUTED);
	ctx.set_font("10px sans-serif");
	let _ = ctx.fill_text("Kéo để di chuyển", ox + 10.0, oy + 125.0);
}

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use super::types::{GenerationBand, NodeId, TreeLayout};

/// Logical canvas the diagram is drawn on, independent of pixel size.
pub const VIEWBOX_WIDTH: f64 = 1600.0;
pub const VIEWBOX_HEIGHT: f64 = 1000.0;
pub const MARGIN_LEFT: f64 = 150.0;
pub const MARGIN_TOP: f64 = 60.0;

pub const CARD_WIDTH: f64 = 220.0;
pub const CARD_HEIGHT: f64 = 90.0;

pub const MIN_ZOOM: f64 = 0.3;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_IN_FACTOR: f64 = 1.5;
pub const ZOOM_OUT_FACTOR: f64 = 0.67;
const ZOOM_DURATION: f64 = 0.3;
const RESET_DURATION: f64 = 0.5;

/// Zoom transform in viewbox units, applied as `translate(x, y) scale(k)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn invert(&self, px: f64, py: f64) -> (f64, f64) {
		((px - self.x) / self.k, (py - self.y) / self.k)
	}

	/// Rescale by `factor` keeping the viewbox point `(px, py)` fixed.
	pub fn scaled_about(&self, px: f64, py: f64, factor: f64) -> Self {
		let k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let (wx, wy) = self.invert(px, py);
		Self {
			x: px - wx * k,
			y: py - wy * k,
			k,
		}
	}

	fn lerp(&self, to: &Self, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

/// Uniform "meet" fit of the viewbox into the element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub scale: f64,
	pub offset_x: f64,
	pub offset_y: f64,
}

impl Viewport {
	pub fn fit(width: f64, height: f64) -> Self {
		let scale = (width / VIEWBOX_WIDTH).min(height / VIEWBOX_HEIGHT).max(f64::EPSILON);
		Self {
			scale,
			offset_x: (width - VIEWBOX_WIDTH * scale) / 2.0,
			offset_y: (height - VIEWBOX_HEIGHT * scale) / 2.0,
		}
	}

	pub fn to_viewbox(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.offset_x) / self.scale,
			(sy - self.offset_y) / self.scale,
		)
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Copy, Debug)]
struct ZoomTransition {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

fn ease_cubic_in_out(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

/// Set once when the owning component is torn down; the frame loop checks
/// it before scheduling the next frame.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
	pub fn stop(&self) {
		self.0.store(true, Ordering::Relaxed);
	}

	pub fn is_stopped(&self) -> bool {
		self.0.load(Ordering::Relaxed)
	}
}

/// Everything the canvas needs between frames.
pub struct FamilyTreeState {
	pub layout: TreeLayout,
	pub bands: Vec<GenerationBand>,
	pub transform: ViewTransform,
	pub viewport: Viewport,
	pub pan: PanState,
	pub hover: Option<NodeId>,
	pub width: f64,
	pub height: f64,
	transition: Option<ZoomTransition>,
}

impl FamilyTreeState {
	pub fn new(layout: TreeLayout, width: f64, height: f64) -> Self {
		let bands = layout.generation_bands();
		Self {
			layout,
			bands,
			transform: ViewTransform::default(),
			viewport: Viewport::fit(width, height),
			pan: PanState::default(),
			hover: None,
			width,
			height,
			transition: None,
		}
	}

	/// An empty tree draws nothing at all, not even the legend.
	pub fn has_diagram(&self) -> bool {
		!self.layout.is_empty()
	}

	/// Screen pixels to layout coordinates.
	pub fn screen_to_tree(&self, sx: f64, sy: f64) -> (f64, f64) {
		let (vx, vy) = self.viewport.to_viewbox(sx, sy);
		let (gx, gy) = self.transform.invert(vx, vy);
		(gx - MARGIN_LEFT, gy - MARGIN_TOP)
	}

	/// Topmost card under the pointer. Later nodes are drawn on top.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let (tx, ty) = self.screen_to_tree(sx, sy);
		self.layout
			.nodes
			.iter()
			.enumerate()
			.rev()
			.find(|(_, n)| {
				(tx - n.x).abs() <= CARD_WIDTH / 2.0 && (ty - n.y).abs() <= CARD_HEIGHT / 2.0
			})
			.map(|(i, _)| NodeId(i))
	}

	pub fn set_hover(&mut self, node: Option<NodeId>) {
		self.hover = node;
	}

	pub fn is_hovered(&self, id: NodeId) -> bool {
		self.hover == Some(id)
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.transition = None;
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		let scale = self.viewport.scale;
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x) / scale;
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y) / scale;
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Wheel zoom about the pointer, using d3's wheel delta.
	pub fn wheel_zoom(&mut self, sx: f64, sy: f64, delta_y: f64, delta_mode: u32, ctrl: bool) {
		let unit = match delta_mode {
			0 => 0.002,
			1 => 0.05,
			_ => 1.0,
		};
		let delta = -delta_y * unit * if ctrl { 10.0 } else { 1.0 };
		let (vx, vy) = self.viewport.to_viewbox(sx, sy);
		self.transition = None;
		self.transform = self.transform.scaled_about(vx, vy, delta.exp2());
	}

	/// Animated zoom about the viewbox centre.
	pub fn zoom_by(&mut self, factor: f64) {
		let target = self.transform.scaled_about(
			VIEWBOX_WIDTH / 2.0,
			VIEWBOX_HEIGHT / 2.0,
			factor,
		);
		debug!("Zoom by {factor}: k {} -> {}", self.transform.k, target.k);
		self.animate_to(target, ZOOM_DURATION);
	}

	/// Animated return to the identity transform.
	pub fn reset_zoom(&mut self) {
		debug!("Zoom reset");
		self.animate_to(ViewTransform::default(), RESET_DURATION);
	}

	fn animate_to(&mut self, to: ViewTransform, duration: f64) {
		self.transition = Some(ZoomTransition {
			from: self.transform,
			to,
			elapsed: 0.0,
			duration,
		});
	}

	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	pub fn tick(&mut self, dt: f64) {
		let Some(mut transition) = self.transition else {
			return;
		};
		transition.elapsed += dt;
		let t = (transition.elapsed / transition.duration).min(1.0);
		self.transform = transition.from.lerp(&transition.to, ease_cubic_in_out(t));
		self.transition = (t < 1.0).then_some(transition);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.viewport = Viewport::fit(width, height);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::family_tree::layout::{LayoutConfig, layout};
	use crate::components::family_tree::types::{FamilyMember, Person};

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	fn state() -> FamilyTreeState {
		let root = FamilyMember {
			person: Person {
				id: "1".into(),
				..Person::default()
			},
			children: vec![],
			spouse: Some(Person::default()),
		};
		FamilyTreeState::new(
			layout(Some(&root), &LayoutConfig::default()),
			VIEWBOX_WIDTH,
			VIEWBOX_HEIGHT,
		)
	}

	#[test]
	fn empty_tree_has_no_diagram() {
		let empty = FamilyTreeState::new(
			layout(None, &LayoutConfig::default()),
			VIEWBOX_WIDTH,
			VIEWBOX_HEIGHT,
		);
		assert!(!empty.has_diagram());
		assert!(empty.bands.is_empty());
		assert_eq!(empty.node_at_position(800.0, 60.0), None);
		assert!(state().has_diagram());
	}

	#[test]
	fn stop_signal_is_shared_between_clones() {
		let signal = StopSignal::default();
		let seen_by_loop = signal.clone();
		assert!(!seen_by_loop.is_stopped());
		signal.stop();
		assert!(seen_by_loop.is_stopped());
	}

	#[test]
	fn idle_tick_leaves_transform_alone() {
		let mut s = state();
		assert!(!s.is_animating());
		s.tick(0.5);
		assert_eq!(s.transform, ViewTransform::default());
	}

	#[test]
	fn viewport_meets_and_centres() {
		let v = Viewport::fit(800.0, 1000.0);
		assert!(close(v.scale, 0.5));
		assert!(close(v.offset_x, 0.0));
		assert!(close(v.offset_y, 250.0));
		assert_eq!(v.to_viewbox(400.0, 500.0), (800.0, 500.0));
	}

	#[test]
	fn zoom_is_clamped() {
		let t = ViewTransform::default();
		assert_eq!(t.scaled_about(0.0, 0.0, 100.0).k, MAX_ZOOM);
		assert_eq!(t.scaled_about(0.0, 0.0, 0.001).k, MIN_ZOOM);
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let t = ViewTransform {
			x: 30.0,
			y: -12.0,
			k: 1.2,
		};
		let z = t.scaled_about(400.0, 300.0, 1.5);
		let (ax, ay) = t.invert(400.0, 300.0);
		let (bx, by) = z.invert(400.0, 300.0);
		assert!(close(ax, bx) && close(ay, by));
	}

	#[test]
	fn buttons_animate_to_target() {
		let mut s = state();
		s.zoom_by(ZOOM_IN_FACTOR);
		assert!(s.is_animating());
		s.tick(0.15);
		assert!(s.transform.k > 1.0 && s.transform.k < ZOOM_IN_FACTOR);
		s.tick(0.2);
		assert!(!s.is_animating());
		assert!(close(s.transform.k, ZOOM_IN_FACTOR));

		s.reset_zoom();
		s.tick(1.0);
		assert_eq!(s.transform, ViewTransform::default());
	}

	#[test]
	fn wheel_zoom_matches_d3_delta() {
		let mut s = state();
		s.wheel_zoom(800.0, 500.0, -500.0, 0, false);
		assert!(close(s.transform.k, 2.0));
		s.wheel_zoom(800.0, 500.0, 100.0, 1, true);
		assert_eq!(s.transform.k, MIN_ZOOM);
	}

	#[test]
	fn pan_moves_in_viewbox_units() {
		let mut s = state();
		s.resize(800.0, 500.0);
		s.begin_pan(100.0, 100.0);
		s.pan_to(150.0, 80.0);
		assert_eq!((s.transform.x, s.transform.y), (100.0, -40.0));
		s.end_pan();
		s.pan_to(0.0, 0.0);
		assert_eq!((s.transform.x, s.transform.y), (100.0, -40.0));
	}

	#[test]
	fn hit_test_finds_cards() {
		let s = state();
		// Root at (650, 0), spouse pushed to (930, 0); add the margins.
		assert_eq!(s.node_at_position(800.0, 60.0), Some(NodeId(0)));
		assert_eq!(s.node_at_position(1080.0, 100.0), Some(NodeId(1)));
		assert_eq!(s.node_at_position(800.0, 200.0), None);
	}
}

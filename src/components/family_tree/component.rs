use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::layout::{LayoutConfig, layout};
use super::render;
use super::state::{FamilyTreeState, StopSignal, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use super::types::TreeDocument;

type SharedState = Rc<RefCell<Option<FamilyTreeState>>>;

fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((1600.0, 1000.0))
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Pannable, zoomable family tree drawn on a canvas. Layout and view state
/// are rebuilt from scratch whenever `data` changes.
#[component]
pub fn FamilyTreeCanvas(#[prop(into)] data: Signal<TreeDocument>) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	let stop = StopSignal::default();
	on_cleanup({
		let stop = stop.clone();
		move || stop.stop()
	});

	Effect::new(move |_| {
		let document = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("No window; family tree not drawn");
			return;
		};

		let (w, h) = container_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let tree = layout(document.tree.as_ref(), &LayoutConfig::default());
		info!(
			"Family tree laid out: {} nodes, {} descent edges, {} marriage edges",
			tree.nodes.len(),
			tree.descent_edges.len(),
			tree.marriage_edges.len()
		);
		*state_init.borrow_mut() = Some(FamilyTreeState::new(tree, w, h));

		if resize_cb_init.borrow().is_none() {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let (nw, nh) = container_size(&canvas_resize);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		if animate_init.borrow().is_some() {
			return;
		}
		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.map(|c| c.dyn_into::<CanvasRenderingContext2d>())
		{
			Some(Ok(ctx)) => ctx,
			_ => {
				warn!("2d canvas context unavailable; family tree not drawn");
				return;
			}
		};

		let (state_anim, animate_inner, resize_inner) =
			(state_init.clone(), animate_init.clone(), resize_cb_init.clone());
		let stop = stop.clone();
		let mut last_frame = js_sys::Date::now();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if stop.is_stopped() {
				// Unmounted: detach the resize listener and break the frame loop.
				if let (Some(cb), Some(win)) = (resize_inner.borrow_mut().take(), web_sys::window()) {
					let _ =
						win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				state_anim.borrow_mut().take();
				animate_inner.borrow_mut().take();
				info!("Family tree canvas torn down");
				return;
			}
			let now = js_sys::Date::now();
			let dt = ((now - last_frame) / 1000.0).clamp(0.0, 0.1);
			last_frame = now;
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.is_animating() {
					s.tick(dt);
				}
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.begin_pan(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.pan.active {
				s.pan_to(x, y);
			} else {
				let hovered = s.node_at_position(x, y);
				s.set_hover(hovered);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.end_pan();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.end_pan();
			s.set_hover(None);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel_zoom(x, y, ev.delta_y(), ev.delta_mode(), ev.ctrl_key());
		}
	};

	let (state_in, state_out, state_reset) = (state.clone(), state.clone(), state);
	let on_zoom_in = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_in.borrow_mut() {
			s.zoom_by(ZOOM_IN_FACTOR);
		}
	};
	let on_zoom_out = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_out.borrow_mut() {
			s.zoom_by(ZOOM_OUT_FACTOR);
		}
	};
	let on_reset = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_reset.borrow_mut() {
			s.reset_zoom();
		}
	};

	let overlay_display = move |shown: &'static str| {
		if data.with(|d| d.tree.is_some()) { shown } else { "none" }
	};

	view! {
		<div class="family-tree" style="position: relative; width: 100%; height: 100vh; overflow: hidden;">
			<div class="family-tree-hint" style=move || format!(
				"position: absolute; bottom: 16px; left: 16px; background: white; padding: 8px; border-radius: 8px; color: #4b5563; font-size: 14px; display: {};",
				overlay_display("block"),
			)>
				"💡 Sử dụng chuột để kéo và cuộn để zoom"
			</div>
			<div class="zoom-controls" style=move || format!(
				"position: absolute; top: 20px; left: 20px; display: {}; flex-direction: column; gap: 10px;",
				overlay_display("flex"),
			)>
				<button class="zoom-in" title="Zoom in" on:click=on_zoom_in
					style="width: 40px; height: 40px; border-radius: 5px; border: 1px solid #1e40af; background: #3b82f6; color: white; font-size: 20px; font-weight: bold; cursor: pointer;">
					"+"
				</button>
				<button class="zoom-out" title="Zoom out" on:click=on_zoom_out
					style="width: 40px; height: 40px; border-radius: 5px; border: 1px solid #dc2626; background: #ef4444; color: white; font-size: 20px; font-weight: bold; cursor: pointer;">
					"−"
				</button>
				<button class="zoom-reset" title="Reset zoom" on:click=on_reset
					style="width: 40px; height: 40px; border-radius: 5px; border: 1px solid #4b5563; background: #6b7280; color: white; font-size: 12px; font-weight: bold; cursor: pointer;">
					"⌂"
				</button>
			</div>
			<canvas
				node_ref=canvas_ref
				class="family-tree-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
		</div>
	}
}

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, DragEvent, HtmlCanvasElement, MouseEvent};

use super::render::{self, Frame};
use crate::game::interaction::Mode;
use crate::game::layout;
use crate::game::{InteractionController, Modifiers, NodeId, Position, Session};

/// Data-transfer key a palette card stores its component id under.
pub const COMPONENT_MIME: &str = "application/x-component-id";

#[component]
pub fn ArchitectureCanvas(session: RwSignal<Session>) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let controller = Rc::new(RefCell::new(InteractionController::new()));
	let hover: Rc<Cell<Option<NodeId>>> = Rc::new(Cell::new(None));
	let size = Rc::new(Cell::new((800.0, 600.0)));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (ctl_init, hover_init, size_init, animate_init, resize_cb_init) = (
		controller.clone(),
		hover.clone(),
		size.clone(),
		animate.clone(),
		resize_cb.clone(),
	);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = context_2d(&canvas) else {
			log::error!("canvas has no 2d context");
			return;
		};

		fit_to_parent(&canvas, &size_init);
		let (canvas_resize, size_resize) = (canvas.clone(), size_init.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			fit_to_parent(&canvas_resize, &size_resize);
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (ctl_anim, hover_anim, size_anim, animate_inner) = (
			ctl_init.clone(),
			hover_init.clone(),
			size_init.clone(),
			animate_init.clone(),
		);
		let mut flow_time = 0.0;
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			flow_time += 0.016;
			let (width, height) = size_anim.get();
			let frame = Frame {
				width,
				height,
				flow_time,
				hover: hover_anim.get(),
			};
			session.with_untracked(|s| render::render(&frame, s, &ctl_anim.borrow(), &ctx));
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let pointer = move |ev: &MouseEvent| -> Option<Position> {
		let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some(Position::new(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let ctl_md = controller.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(pos) = pointer(&ev) else {
			return;
		};
		let modifiers = Modifiers {
			connect: ev.shift_key(),
			delete: ev.alt_key(),
		};
		session.update(|s| {
			ctl_md.borrow_mut().pointer_down(&mut s.graph, pos, modifiers);
		});
	};

	let (ctl_mm, hover_mm) = (controller.clone(), hover.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some(pos) = pointer(&ev) else {
			return;
		};
		let mut ctl = ctl_mm.borrow_mut();
		if matches!(ctl.mode(), Mode::Dragging { .. }) {
			session.update(|s| ctl.pointer_move(&mut s.graph, pos));
		} else {
			session.update_untracked(|s| {
				ctl.pointer_move(&mut s.graph, pos);
				hover_mm.set(s.graph.node_at(pos));
			});
		}
	};

	let ctl_mu = controller.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(pos) = pointer(&ev) else {
			return;
		};
		session.update(|s| {
			ctl_mu.borrow_mut().pointer_up(&mut s.graph, pos);
		});
	};

	let (ctl_ml, hover_ml) = (controller.clone(), hover.clone());
	let on_mouseleave = move |_: MouseEvent| {
		ctl_ml.borrow_mut().cancel();
		hover_ml.set(None);
	};

	let ctl_drop = controller.clone();
	let on_drop = move |ev: DragEvent| {
		ev.prevent_default();
		let Some(component_id) = ev
			.data_transfer()
			.and_then(|dt| dt.get_data(COMPONENT_MIME).ok())
			.filter(|id| !id.is_empty())
		else {
			return;
		};
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let rect = canvas.get_bounding_client_rect();
		let drop_point = Position::new(ev.client_x() as f64, ev.client_y() as f64);
		let origin = Position::new(rect.left(), rect.top());
		session.update(|s| {
			let catalog = s.catalog().clone();
			match catalog.component(&component_id) {
				Some(def) => {
					ctl_drop
						.borrow()
						.drop_component(&mut s.graph, def, drop_point, origin);
				}
				None => log::warn!("dropped unknown component `{}`", component_id),
			}
		});
	};

	let size_arrange = size.clone();
	let on_arrange = move |_| {
		let (width, height) = size_arrange.get();
		session.update(|s| layout::arrange(&mut s.graph, width, height));
	};

	view! {
		<div class="architecture-canvas">
			<canvas
				node_ref=canvas_ref
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:dragover=|ev: DragEvent| ev.prevent_default()
				on:drop=on_drop
				style="display: block; cursor: grab;"
			/>
			<div class="canvas-toolbar">
				<span class="canvas-label">"CANVAS_VIEW: ORTHOGONAL"</span>
				<button on:click=on_arrange>"Auto-arrange"</button>
				<button on:click=move |_| session.update(|s| s.reset_canvas())>"Clear"</button>
			</div>
			<div class="canvas-help">
				<p>"Drag: move node"</p>
				<p>"Shift + drag: connect"</p>
				<p>"Alt + click: delete"</p>
			</div>
		</div>
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn fit_to_parent(canvas: &HtmlCanvasElement, size: &Cell<(f64, f64)>) {
	let (w, h) = canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or((800.0, 600.0));
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	size.set((w, h));
}

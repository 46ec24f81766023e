use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::game::canvas::{NODE_HALF_HEIGHT, NODE_HALF_WIDTH};
use crate::game::catalog::Shape;
use crate::game::{InteractionController, NodeId, NodeStatus, PlacedNode, Position, Session, node_status};

const GRID: f64 = 40.0;
const ARROW: f64 = 8.0;

pub struct Frame {
	pub width: f64,
	pub height: f64,
	/// Seconds since the canvas mounted; drives the edge flow animation.
	pub flow_time: f64,
	pub hover: Option<NodeId>,
}

fn status_color(status: NodeStatus) -> &'static str {
	match status {
		NodeStatus::Source => "#00f0ff",
		NodeStatus::Damaged => "#ff003c",
		NodeStatus::Blocking => "#00ff41",
		NodeStatus::Idle => "#e5e7eb",
	}
}

fn glyph(shape: Shape) -> &'static str {
	match shape {
		Shape::Box => "▣",
		Shape::Cloud => "☁",
		Shape::Router => "⇄",
		Shape::Server => "▤",
		Shape::Cylinder => "⛁",
		Shape::Hexagon => "⬡",
		Shape::Shield => "⛨",
		Shape::Sphere => "●",
		Shape::Diamond => "◆",
		Shape::Pyramid => "▲",
	}
}

pub fn render(
	frame: &Frame,
	session: &Session,
	controller: &InteractionController,
	ctx: &CanvasRenderingContext2d,
) {
	ctx.set_fill_style_str("#0a0a0f");
	ctx.fill_rect(0.0, 0.0, frame.width, frame.height);
	draw_grid(frame, ctx);
	draw_edges(frame, session, ctx);
	draw_provisional_edge(session, controller, ctx);
	draw_nodes(frame, session, controller, ctx);
}

fn draw_grid(frame: &Frame, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str("rgba(51, 51, 51, 0.5)");
	ctx.set_line_width(1.0);
	ctx.begin_path();
	let mut x = 0.0;
	while x < frame.width {
		ctx.move_to(x, 0.0);
		ctx.line_to(x, frame.height);
		x += GRID;
	}
	let mut y = 0.0;
	while y < frame.height {
		ctx.move_to(0.0, y);
		ctx.line_to(frame.width, y);
		y += GRID;
	}
	ctx.stroke();
}

/// Start, horizontal to the midpoint, vertical, horizontal to the end.
fn orthogonal_path(ctx: &CanvasRenderingContext2d, from: Position, to: Position) {
	let mid_x = (from.x + to.x) / 2.0;
	ctx.begin_path();
	ctx.move_to(from.x, from.y);
	ctx.line_to(mid_x, from.y);
	ctx.line_to(mid_x, to.y);
	ctx.line_to(to.x, to.y);
}

fn draw_edges(frame: &Frame, session: &Session, ctx: &CanvasRenderingContext2d) {
	let graph = &session.graph;
	let damage = session.simulation().damage_taken;
	let (dash, gap) = (8.0, 4.0);
	let dash_offset = -(frame.flow_time * 30.0) % (dash + gap);

	for node in graph.nodes() {
		for target in node.connections.iter().filter_map(|id| graph.node(*id)) {
			let breach = damage && !node.is_source();
			let color = if breach { "#ef4444" } else { "#4b5563" };
			let dir = if target.position.x >= node.position.x { 1.0 } else { -1.0 };
			let tip = Position::new(target.position.x - dir * NODE_HALF_WIDTH, target.position.y);

			ctx.set_stroke_style_str(color);
			ctx.set_line_width(2.0);
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
			orthogonal_path(ctx, node.position, tip.offset(-dir * ARROW, 0.0));
			ctx.stroke();
			let _ = ctx.set_line_dash(&js_sys::Array::new());

			ctx.set_fill_style_str(color);
			ctx.begin_path();
			ctx.move_to(tip.x, tip.y);
			ctx.line_to(tip.x - dir * ARROW, tip.y - ARROW * 0.5);
			ctx.line_to(tip.x - dir * ARROW, tip.y + ARROW * 0.5);
			ctx.close_path();
			ctx.fill();
		}
	}
}

fn draw_provisional_edge(
	session: &Session,
	controller: &InteractionController,
	ctx: &CanvasRenderingContext2d,
) {
	let Some((source, pointer)) = controller.provisional_edge() else {
		return;
	};
	let Some(source) = session.graph.node(source) else {
		return;
	};
	ctx.set_stroke_style_str("#00f0ff");
	ctx.set_line_width(2.0);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(5.0),
		&JsValue::from_f64(5.0),
	));
	orthogonal_path(ctx, source.position, pointer);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(
	frame: &Frame,
	session: &Session,
	controller: &InteractionController,
	ctx: &CanvasRenderingContext2d,
) {
	let dragged = controller.dragged_node();
	for node in session.graph.nodes() {
		let status = node_status(node, session.simulation());
		let lifted = dragged == Some(node.id);
		let hovered = frame.hover == Some(node.id);
		draw_node(frame, node, status, lifted, hovered, ctx);
	}
}

fn draw_node(
	frame: &Frame,
	node: &PlacedNode,
	status: NodeStatus,
	lifted: bool,
	hovered: bool,
	ctx: &CanvasRenderingContext2d,
) {
	let Position { x, y } = node.position;
	let (left, top) = (x - NODE_HALF_WIDTH, y - NODE_HALF_HEIGHT);
	let (w, h) = (NODE_HALF_WIDTH * 2.0, NODE_HALF_HEIGHT * 2.0);
	let color = status_color(status);

	if matches!(status, NodeStatus::Blocking | NodeStatus::Damaged) {
		let pulse = 0.25 + 0.15 * (frame.flow_time * 4.0).sin();
		ctx.set_global_alpha(pulse);
		ctx.set_fill_style_str(color);
		ctx.fill_rect(left - 6.0, top - 6.0, w + 12.0, h + 12.0);
		ctx.set_global_alpha(1.0);
	}

	ctx.set_global_alpha(if lifted { 0.8 } else { 1.0 });
	ctx.set_fill_style_str("#111827");
	ctx.fill_rect(left, top, w, h);
	ctx.set_stroke_style_str(color);
	ctx.set_line_width(if hovered || lifted { 2.5 } else { 1.5 });
	ctx.stroke_rect(left, top, w, h);

	ctx.set_fill_style_str(color);
	ctx.set_text_baseline("middle");
	ctx.set_text_align("left");
	ctx.set_font("16px sans-serif");
	let _ = ctx.fill_text(glyph(node.component.shape), left + 8.0, y);

	ctx.set_fill_style_str("#f3f4f6");
	ctx.set_font("11px monospace");
	let _ = ctx.fill_text(node.name(), left + 30.0, y - 6.0);
	ctx.set_fill_style_str("#9ca3af");
	ctx.set_font("10px monospace");
	let _ = ctx.fill_text(&format!("${}", node.cost()), left + 30.0, y + 8.0);
	ctx.set_global_alpha(1.0);
}

//! Pointer gestures to graph edits.
//!
//! One pointer, one gesture at a time. Modifier keys read at pointer-down pick
//! the gesture: connect wins over delete, and no modifier starts a drag.

use log::debug;

use super::canvas::{CanvasGraph, ConnectOutcome, NodeId, Position};
use super::catalog::ComponentDef;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
	/// Held to draw a connection (shift).
	pub connect: bool,
	/// Held to delete the clicked node (alt).
	pub delete: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Mode {
	#[default]
	Idle,
	Dragging {
		node: NodeId,
		pointer_origin: Position,
		node_origin: Position,
	},
	Connecting {
		source: NodeId,
		pointer: Position,
	},
}

#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	mode: Mode,
}

impl InteractionController {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn mode(&self) -> Mode {
		self.mode
	}

	/// Source node and pointer of the connection being drawn, if any.
	pub fn provisional_edge(&self) -> Option<(NodeId, Position)> {
		match self.mode {
			Mode::Connecting { source, pointer } => Some((source, pointer)),
			_ => None,
		}
	}

	pub fn dragged_node(&self) -> Option<NodeId> {
		match self.mode {
			Mode::Dragging { node, .. } => Some(node),
			_ => None,
		}
	}

	/// Starts a gesture on whatever node lies under `pointer`. Returns `true`
	/// if the press hit a node.
	pub fn pointer_down(
		&mut self,
		graph: &mut CanvasGraph,
		pointer: Position,
		modifiers: Modifiers,
	) -> bool {
		if self.mode != Mode::Idle {
			return false;
		}
		let Some(id) = graph.node_at(pointer) else {
			return false;
		};

		if modifiers.connect {
			self.mode = Mode::Connecting {
				source: id,
				pointer,
			};
		} else if modifiers.delete {
			graph.delete_node(id);
		} else if let Some(node) = graph.node(id) {
			self.mode = Mode::Dragging {
				node: id,
				pointer_origin: pointer,
				node_origin: node.position,
			};
		}
		true
	}

	pub fn pointer_move(&mut self, graph: &mut CanvasGraph, pointer: Position) {
		match &mut self.mode {
			Mode::Idle => {}
			Mode::Dragging {
				node,
				pointer_origin,
				node_origin,
			} => {
				let (dx, dy) = (pointer.x - pointer_origin.x, pointer.y - pointer_origin.y);
				graph.move_node(*node, node_origin.offset(dx, dy));
			}
			Mode::Connecting { pointer: tip, .. } => *tip = pointer,
		}
	}

	/// Ends the gesture. A connection is made only when released over a
	/// different live node.
	pub fn pointer_up(&mut self, graph: &mut CanvasGraph, pointer: Position) -> Option<NodeId> {
		let mode = std::mem::take(&mut self.mode);
		let Mode::Connecting { source, .. } = mode else {
			return None;
		};
		let target = graph.node_at(pointer)?;
		match graph.connect(source, target) {
			ConnectOutcome::Added | ConnectOutcome::AlreadyConnected => Some(target),
			outcome => {
				debug!("discarded connection {} -> {}: {:?}", source, target, outcome);
				None
			}
		}
	}

	/// Pointer left the canvas; drop whatever was in progress.
	pub fn cancel(&mut self) {
		self.mode = Mode::Idle;
	}

	/// A palette card landed on the canvas. `drop_point` and `canvas_origin`
	/// are both in client coordinates.
	pub fn drop_component(
		&self,
		graph: &mut CanvasGraph,
		definition: &ComponentDef,
		drop_point: Position,
		canvas_origin: Position,
	) -> Option<NodeId> {
		if self.mode != Mode::Idle {
			return None;
		}
		let position = Position::new(drop_point.x - canvas_origin.x, drop_point.y - canvas_origin.y);
		Some(graph.place_node(definition, position))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::game::canvas::SOURCE_POSITION;
	use crate::game::catalog::Catalog;

	const SHIFT: Modifiers = Modifiers {
		connect: true,
		delete: false,
	};
	const ALT: Modifiers = Modifiers {
		connect: false,
		delete: true,
	};

	fn setup() -> (Catalog, CanvasGraph, NodeId) {
		let catalog = Catalog::builtin().unwrap();
		let mut graph = CanvasGraph::new(catalog.source().clone());
		let waf = graph.place_node(catalog.component("waf").unwrap(), Position::new(300.0, 150.0));
		(catalog, graph, waf)
	}

	#[test]
	fn drag_applies_cumulative_delta() {
		let (_, mut graph, waf) = setup();
		let mut ctl = InteractionController::new();
		assert!(ctl.pointer_down(&mut graph, Position::new(310.0, 160.0), Modifiers::default()));
		assert_eq!(ctl.dragged_node(), Some(waf));

		ctl.pointer_move(&mut graph, Position::new(320.0, 160.0));
		ctl.pointer_move(&mut graph, Position::new(360.0, 190.0));
		assert_eq!(graph.node(waf).unwrap().position, Position::new(350.0, 180.0));

		assert_eq!(ctl.pointer_up(&mut graph, Position::new(360.0, 190.0)), None);
		assert_eq!(ctl.mode(), Mode::Idle);
		assert_eq!(graph.node(waf).unwrap().position, Position::new(350.0, 180.0));
	}

	#[test]
	fn press_on_empty_canvas_stays_idle() {
		let (_, mut graph, _) = setup();
		let mut ctl = InteractionController::new();
		assert!(!ctl.pointer_down(&mut graph, Position::new(700.0, 700.0), Modifiers::default()));
		assert_eq!(ctl.mode(), Mode::Idle);
	}

	#[test]
	fn connect_gesture_links_nodes() {
		let (_, mut graph, waf) = setup();
		let mut ctl = InteractionController::new();
		ctl.pointer_down(&mut graph, SOURCE_POSITION, SHIFT);
		ctl.pointer_move(&mut graph, Position::new(200.0, 150.0));
		assert_eq!(
			ctl.provisional_edge(),
			Some((NodeId::SOURCE, Position::new(200.0, 150.0)))
		);
		// Dragging a connection never moves the source.
		assert_eq!(graph.node(NodeId::SOURCE).unwrap().position, SOURCE_POSITION);

		assert_eq!(ctl.pointer_up(&mut graph, Position::new(300.0, 150.0)), Some(waf));
		assert_eq!(graph.node(NodeId::SOURCE).unwrap().connections, vec![waf]);
		assert_eq!(ctl.mode(), Mode::Idle);
	}

	#[test]
	fn connect_released_on_nothing_or_self_is_discarded() {
		let (_, mut graph, waf) = setup();
		let mut ctl = InteractionController::new();

		ctl.pointer_down(&mut graph, Position::new(300.0, 150.0), SHIFT);
		assert_eq!(ctl.pointer_up(&mut graph, Position::new(800.0, 800.0)), None);

		ctl.pointer_down(&mut graph, Position::new(300.0, 150.0), SHIFT);
		assert_eq!(ctl.pointer_up(&mut graph, Position::new(305.0, 150.0)), None);

		assert!(graph.node(waf).unwrap().connections.is_empty());
		assert_eq!(ctl.mode(), Mode::Idle);
	}

	#[test]
	fn delete_modifier_removes_without_changing_mode() {
		let (_, mut graph, waf) = setup();
		graph.connect(NodeId::SOURCE, waf);
		let mut ctl = InteractionController::new();
		assert!(ctl.pointer_down(&mut graph, Position::new(300.0, 150.0), ALT));
		assert_eq!(ctl.mode(), Mode::Idle);
		assert!(graph.node(waf).is_none());
		assert!(graph.node(NodeId::SOURCE).unwrap().connections.is_empty());
	}

	#[test]
	fn connect_modifier_wins_over_delete() {
		let (_, mut graph, waf) = setup();
		let mut ctl = InteractionController::new();
		let both = Modifiers {
			connect: true,
			delete: true,
		};
		ctl.pointer_down(&mut graph, Position::new(300.0, 150.0), both);
		assert!(matches!(ctl.mode(), Mode::Connecting { source, .. } if source == waf));
		assert!(graph.node(waf).is_some());
	}

	#[test]
	fn cancel_discards_gesture() {
		let (_, mut graph, waf) = setup();
		let mut ctl = InteractionController::new();
		ctl.pointer_down(&mut graph, Position::new(300.0, 150.0), SHIFT);
		ctl.cancel();
		assert_eq!(ctl.pointer_up(&mut graph, SOURCE_POSITION), None);
		assert!(graph.node(waf).unwrap().connections.is_empty());
	}

	#[test]
	fn drop_places_relative_to_canvas() {
		let (catalog, mut graph, _) = setup();
		let ctl = InteractionController::new();
		let ids = catalog.component("ids").unwrap();
		let id = ctl
			.drop_component(
				&mut graph,
				ids,
				Position::new(420.0, 380.0),
				Position::new(20.0, 80.0),
			)
			.unwrap();
		let node = graph.node(id).unwrap();
		assert_eq!(node.position, Position::new(400.0, 300.0));
		assert_eq!(node.component.id, "ids");
		assert!(node.connections.is_empty());
	}

	#[test]
	fn drop_ignored_mid_gesture() {
		let (catalog, mut graph, _) = setup();
		let mut ctl = InteractionController::new();
		ctl.pointer_down(&mut graph, Position::new(300.0, 150.0), Modifiers::default());
		let placed = ctl.drop_component(
			&mut graph,
			catalog.component("ids").unwrap(),
			Position::default(),
			Position::default(),
		);
		assert_eq!(placed, None);
		assert_eq!(graph.len(), 2);
	}
}

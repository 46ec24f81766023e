//! The placed-node graph edited on the canvas.
//!
//! Every live node's connection list only ever names other live nodes: targets
//! are checked on connect and stripped from every list on delete.

use std::fmt;

use log::debug;

use super::catalog::ComponentDef;

/// Where the traffic origin sits on a fresh canvas.
pub const SOURCE_POSITION: Position = Position { x: 50.0, y: 150.0 };
/// Half extents of the rectangle a node occupies, centred on its position.
pub const NODE_HALF_WIDTH: f64 = 56.0;
pub const NODE_HALF_HEIGHT: f64 = 22.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn offset(self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + dx, self.y + dy)
	}
}

/// Identifies one placement. Distinct from the component id: two firewalls
/// share a component id but never a `NodeId`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
	pub const SOURCE: NodeId = NodeId(0);
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if *self == Self::SOURCE {
			write!(f, "node-source")
		} else {
			write!(f, "node-{}", self.0)
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedNode {
	pub id: NodeId,
	pub component: ComponentDef,
	pub position: Position,
	/// Outgoing edges, in the order they were drawn.
	pub connections: Vec<NodeId>,
}

impl PlacedNode {
	pub fn name(&self) -> &str {
		&self.component.name
	}

	pub fn cost(&self) -> u32 {
		self.component.cost
	}

	pub fn is_source(&self) -> bool {
		self.id == NodeId::SOURCE
	}

	pub fn contains(&self, point: Position) -> bool {
		(point.x - self.position.x).abs() <= NODE_HALF_WIDTH
			&& (point.y - self.position.y).abs() <= NODE_HALF_HEIGHT
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectOutcome {
	Added,
	AlreadyConnected,
	SelfLoop,
	MissingNode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CanvasGraph {
	/// Placement order; later nodes are drawn on top.
	nodes: Vec<PlacedNode>,
	source: ComponentDef,
	next_id: u64,
}

impl CanvasGraph {
	pub fn new(source: ComponentDef) -> Self {
		let mut graph = Self {
			nodes: Vec::new(),
			source,
			next_id: 1,
		};
		graph.seed_source();
		graph
	}

	fn seed_source(&mut self) {
		self.nodes.push(PlacedNode {
			id: NodeId::SOURCE,
			component: self.source.clone(),
			position: SOURCE_POSITION,
			connections: Vec::new(),
		});
	}

	pub fn nodes(&self) -> &[PlacedNode] {
		&self.nodes
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn node(&self, id: NodeId) -> Option<&PlacedNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	fn node_mut(&mut self, id: NodeId) -> Option<&mut PlacedNode> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	/// Copies `definition` onto the canvas with no connections. Ids are never
	/// reused within a graph, even across `reset`.
	pub fn place_node(&mut self, definition: &ComponentDef, position: Position) -> NodeId {
		let id = NodeId(self.next_id);
		self.next_id += 1;
		self.nodes.push(PlacedNode {
			id,
			component: definition.clone(),
			position,
			connections: Vec::new(),
		});
		debug!("placed {} ({}) at {:?}", id, definition.name, position);
		id
	}

	pub fn move_node(&mut self, id: NodeId, position: Position) {
		if let Some(node) = self.node_mut(id) {
			node.position = position;
		}
	}

	pub fn connect(&mut self, source: NodeId, target: NodeId) -> ConnectOutcome {
		if source == target {
			return ConnectOutcome::SelfLoop;
		}
		if self.node(target).is_none() {
			return ConnectOutcome::MissingNode;
		}
		let Some(node) = self.node_mut(source) else {
			return ConnectOutcome::MissingNode;
		};
		if node.connections.contains(&target) {
			return ConnectOutcome::AlreadyConnected;
		}
		node.connections.push(target);
		debug!("connected {} -> {}", source, target);
		ConnectOutcome::Added
	}

	/// Removes the node and every edge pointing at it. The source node stays
	/// put; deleting it or an unknown id returns `false`.
	pub fn delete_node(&mut self, id: NodeId) -> bool {
		if id == NodeId::SOURCE {
			return false;
		}
		let before = self.nodes.len();
		self.nodes.retain(|n| n.id != id);
		if self.nodes.len() == before {
			return false;
		}
		for node in &mut self.nodes {
			node.connections.retain(|c| *c != id);
		}
		debug!("deleted {}", id);
		true
	}

	pub fn reset(&mut self) {
		self.nodes.clear();
		self.seed_source();
	}

	/// Topmost node whose rectangle contains `point`.
	pub fn node_at(&self, point: Position) -> Option<NodeId> {
		self.nodes.iter().rev().find(|n| n.contains(point)).map(|n| n.id)
	}

	/// Sum of every placed node's cost. The source costs nothing.
	pub fn spent(&self) -> u32 {
		self.nodes.iter().map(PlacedNode::cost).sum()
	}
}

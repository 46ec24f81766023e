//! Auto-arrange: a short force-directed relaxation of the canvas.

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::canvas::{CanvasGraph, NODE_HALF_HEIGHT, NODE_HALF_WIDTH, NodeId, Position};

const STEPS: usize = 240;
const STEP_DT: f32 = 0.016;

/// Spreads the canvas out with a few seconds of force-directed relaxation.
/// The source node is pinned; everything else ends up inside `width` x `height`.
pub fn arrange(graph: &mut CanvasGraph, width: f64, height: f64) {
	if graph.len() < 2 {
		return;
	}
	let mut sim: ForceGraph<NodeId, ()> = ForceGraph::new(SimulationParameters {
		force_charge: 12000.0,
		force_spring: 0.05,
		force_max: 280.0,
		node_speed: 7000.0,
		damping_factor: 0.95,
	});

	let mut handles = Vec::with_capacity(graph.len());
	for (i, node) in graph.nodes().iter().enumerate() {
		// Stacked nodes would sit at zero distance; nudge them apart.
		let jitter = i as f32 * 3.0;
		let idx = sim.add_node(NodeData {
			x: node.position.x as f32 + jitter,
			y: node.position.y as f32 + jitter,
			mass: 10.0,
			is_anchor: node.is_source(),
			user_data: node.id,
		});
		handles.push((node.id, idx));
	}
	let handle = |id: NodeId| handles.iter().find(|(n, _)| *n == id).map(|(_, idx)| *idx);
	for node in graph.nodes() {
		for target in &node.connections {
			if let (Some(src), Some(tgt)) = (handle(node.id), handle(*target)) {
				sim.add_edge(src, tgt, EdgeData::default());
			}
		}
	}

	for _ in 0..STEPS {
		sim.update(STEP_DT);
	}

	let mut settled = Vec::with_capacity(graph.len());
	sim.visit_nodes(|node| settled.push((node.data.user_data, node.x() as f64, node.y() as f64)));
	let (max_x, max_y) = (
		(width - NODE_HALF_WIDTH).max(NODE_HALF_WIDTH),
		(height - NODE_HALF_HEIGHT).max(NODE_HALF_HEIGHT),
	);
	for (id, x, y) in settled {
		if id == NodeId::SOURCE || !x.is_finite() || !y.is_finite() {
			continue;
		}
		let position = Position::new(
			x.clamp(NODE_HALF_WIDTH, max_x),
			y.clamp(NODE_HALF_HEIGHT, max_y),
		);
		graph.move_node(id, position);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::game::canvas::SOURCE_POSITION;
	use crate::game::catalog::Catalog;

	#[test]
	fn keeps_source_and_edges_and_stays_in_bounds() {
		let catalog = Catalog::builtin().unwrap();
		let mut graph = CanvasGraph::new(catalog.source().clone());
		let mut prev = NodeId::SOURCE;
		for id in ["waf", "ips", "database", "backup"] {
			let node = graph.place_node(catalog.component(id).unwrap(), Position::new(200.0, 200.0));
			graph.connect(prev, node);
			prev = node;
		}
		let before: Vec<_> = graph.nodes().iter().map(|n| n.connections.clone()).collect();

		arrange(&mut graph, 800.0, 500.0);

		assert_eq!(graph.node(NodeId::SOURCE).unwrap().position, SOURCE_POSITION);
		let after: Vec<_> = graph.nodes().iter().map(|n| n.connections.clone()).collect();
		assert_eq!(before, after);
		for node in graph.nodes().iter().filter(|n| !n.is_source()) {
			assert!((NODE_HALF_WIDTH..=800.0 - NODE_HALF_WIDTH).contains(&node.position.x));
			assert!((NODE_HALF_HEIGHT..=500.0 - NODE_HALF_HEIGHT).contains(&node.position.y));
		}
	}

	#[test]
	fn lone_source_is_untouched() {
		let catalog = Catalog::builtin().unwrap();
		let mut graph = CanvasGraph::new(catalog.source().clone());
		let before = graph.clone();
		arrange(&mut graph, 800.0, 500.0);
		assert_eq!(graph, before);
	}
}

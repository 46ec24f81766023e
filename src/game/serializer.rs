//! Flattens the canvas into the text an evaluator reads.

use super::canvas::CanvasGraph;
use super::catalog::Mission;

/// Everything an evaluator may look at, captured at submission time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArchitectureSnapshot {
	/// Output of [`serialize`].
	pub inventory: String,
	pub topology: String,
	/// Component ids of every non-source node, in placement order.
	pub component_ids: Vec<String>,
	pub spent: u32,
}

impl ArchitectureSnapshot {
	pub fn capture(graph: &CanvasGraph) -> Self {
		let (inventory, topology) = serialize(graph);
		Self {
			inventory,
			topology,
			component_ids: graph
				.nodes()
				.iter()
				.filter(|n| !n.is_source())
				.map(|n| n.component.id.clone())
				.collect(),
			spent: graph.spent(),
		}
	}

	pub fn component_count(&self) -> usize {
		self.component_ids.len()
	}

	pub fn contains_component(&self, component_id: &str) -> bool {
		self.component_ids.iter().any(|id| id == component_id)
	}
}

/// `(inventory, topology)` text for `graph`. Byte-identical for equal graphs.
///
/// The inventory names every non-source node in placement order, duplicates
/// included. The topology has one `X connects to [A, B]` clause per node with
/// outgoing edges.
pub fn serialize(graph: &CanvasGraph) -> (String, String) {
	let inventory: Vec<&str> = graph
		.nodes()
		.iter()
		.filter(|n| !n.is_source())
		.map(|n| n.name())
		.collect();
	let topology: Vec<String> = graph
		.nodes()
		.iter()
		.filter_map(|node| {
			let to: Vec<&str> = node
				.connections
				.iter()
				.filter_map(|id| graph.node(*id))
				.map(|target| target.name())
				.collect();
			(!to.is_empty()).then(|| format!("{} connects to [{}]", node.name(), to.join(", ")))
		})
		.collect();
	(inventory.join(", "), topology.join(". "))
}

/// The single message sent per submission.
pub fn compose_request(mission: &Mission, snapshot: &ArchitectureSnapshot) -> String {
	[
		format!("MISSION: {}", mission.title),
		format!("CLIENT: {}", mission.client),
		format!("OBJECTIVE: {}", mission.description),
		format!("BUDGET LIMIT: ${}", mission.budget),
		format!("HIDDEN SUCCESS CRITERIA: {}", mission.hidden_criteria),
		format!("Architecture Inventory: {}.", snapshot.inventory),
		format!("Topology: {}.", snapshot.topology),
		format!("Budget Used: {}.", snapshot.spent),
		"Run simulation and evaluate Mission Pass/Fail.".to_string(),
	]
	.join("\n")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::game::canvas::{NodeId, Position};
	use crate::game::catalog::Catalog;

	fn sample() -> (Catalog, CanvasGraph) {
		let catalog = Catalog::builtin().unwrap();
		let mut graph = CanvasGraph::new(catalog.source().clone());
		let waf_a = graph.place_node(catalog.component("waf").unwrap(), Position::default());
		let waf_b = graph.place_node(catalog.component("waf").unwrap(), Position::default());
		let db = graph.place_node(catalog.component("database").unwrap(), Position::default());
		graph.place_node(catalog.component("backup").unwrap(), Position::default());
		graph.connect(NodeId::SOURCE, waf_a);
		graph.connect(NodeId::SOURCE, waf_b);
		graph.connect(waf_a, db);
		(catalog, graph)
	}

	#[test]
	fn inventory_keeps_duplicates_and_skips_source() {
		let (_, graph) = sample();
		let (inventory, _) = serialize(&graph);
		assert_eq!(inventory, "WAF, WAF, Database, Immutable Backup");
	}

	#[test]
	fn topology_lists_only_connected_nodes() {
		let (_, graph) = sample();
		let (_, topology) = serialize(&graph);
		assert_eq!(
			topology,
			"Internet connects to [WAF, WAF]. WAF connects to [Database]"
		);
	}

	#[test]
	fn output_is_deterministic() {
		let (_, graph) = sample();
		let copy = graph.clone();
		assert_eq!(serialize(&graph), serialize(&copy));
	}

	#[test]
	fn snapshot_carries_serialized_text() {
		let (_, graph) = sample();
		let snapshot = ArchitectureSnapshot::capture(&graph);
		let (inventory, topology) = serialize(&graph);
		assert_eq!(snapshot.inventory, inventory);
		assert_eq!(snapshot.topology, topology);
		assert_eq!(snapshot.component_count(), 4);
		assert!(snapshot.contains_component("backup"));
		assert!(!snapshot.contains_component("internet"));
	}

	#[test]
	fn empty_canvas_serializes_to_empty_text() {
		let catalog = Catalog::builtin().unwrap();
		let graph = CanvasGraph::new(catalog.source().clone());
		assert_eq!(serialize(&graph), (String::new(), String::new()));
	}

	#[test]
	fn request_follows_wire_layout() {
		let (catalog, graph) = sample();
		let mission = &catalog.missions()[0];
		let snapshot = ArchitectureSnapshot::capture(&graph);
		let request = compose_request(mission, &snapshot);
		let lines: Vec<&str> = request.lines().collect();
		assert_eq!(lines.len(), 9);
		assert_eq!(lines[0], "MISSION: Startup Launch");
		assert_eq!(lines[1], "CLIENT: Pied Piper");
		assert_eq!(lines[3], "BUDGET LIMIT: $35");
		assert_eq!(lines[5], "Architecture Inventory: WAF, WAF, Database, Immutable Backup.");
		assert_eq!(lines[7], "Budget Used: 27.");
		assert_eq!(lines[8], "Run simulation and evaluate Mission Pass/Fail.");
	}
}

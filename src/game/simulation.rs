//! Game state derived from the latest evaluator report.

use std::collections::BTreeSet;

use super::canvas::PlacedNode;
use super::catalog::Catalog;
use super::report::Report;

pub const FULL_INTEGRITY: u32 = 100;

/// Rebuilt from scratch for every report; never merged with a previous one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulationState {
	/// Display names of components credited with stopping an attack.
	pub blocked: BTreeSet<String>,
	pub damage_taken: bool,
	pub in_flight: bool,
}

impl SimulationState {
	pub fn in_flight() -> Self {
		Self {
			in_flight: true,
			..Self::default()
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
	pub simulation: SimulationState,
	pub success: bool,
	pub reason: Option<String>,
	pub integrity: u32,
}

/// Folds `report` into fresh state. `prior_integrity` survives when the report
/// carries no integrity figure.
pub fn reconcile(report: &Report, catalog: &Catalog, prior_integrity: u32) -> Reconciliation {
	let mut blocked = BTreeSet::new();
	for detail in report.blocked_details() {
		let detail = detail.to_lowercase();
		for component in catalog.components() {
			if detail.contains(&component.name.to_lowercase()) || detail.contains(&component.id) {
				blocked.insert(component.name.clone());
			}
		}
	}

	let (success, reason) = match report.verdict() {
		Some((verdict, reason)) => (verdict.is_success(), Some(reason.to_string())),
		None => (false, None),
	};

	Reconciliation {
		simulation: SimulationState {
			blocked,
			damage_taken: report.has_breach(),
			in_flight: false,
		},
		success,
		reason,
		integrity: report.integrity().unwrap_or(prior_integrity),
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeStatus {
	Source,
	Damaged,
	Blocking,
	Idle,
}

/// How a node should be drawn given the last simulation.
pub fn node_status(node: &PlacedNode, simulation: &SimulationState) -> NodeStatus {
	if node.is_source() {
		return NodeStatus::Source;
	}
	if simulation.damage_taken && node.component.core {
		return NodeStatus::Damaged;
	}
	let name = node.name().to_lowercase();
	let blocking = simulation.blocked.iter().any(|blocked| {
		let blocked = blocked.to_lowercase();
		name.contains(&blocked) || blocked.contains(&node.component.id)
	});
	if blocking {
		NodeStatus::Blocking
	} else {
		NodeStatus::Idle
	}
}

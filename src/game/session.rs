//! One player's run through the mission list.
//!
//! A submission is a two-step affair: `begin_submission` snapshots the canvas
//! and marks a run in flight, and `apply_report` folds the evaluator's answer
//! back in. Between the two the UI awaits the evaluator. Any mission switch,
//! retry or canvas reset bumps the generation, so an answer that arrives late
//! is recognised as stale and dropped.

use std::sync::Arc;

use log::{info, warn};

use super::canvas::CanvasGraph;
use super::catalog::{Catalog, ComponentDef, Mission};
use super::evaluator::{Conversation, EvaluationRequest, EvaluatorError};
use super::report::Report;
use super::serializer::{ArchitectureSnapshot, compose_request};
use super::simulation::{FULL_INTEGRITY, SimulationState, reconcile};

pub const SUBMIT_BANNER: &str = "INITIALIZING SIMULATION PROTOCOLS...";

#[derive(Clone, Debug, PartialEq)]
pub enum LogEntry {
	Operator(String),
	Evaluator(Report),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	Planning,
	Simulating,
	Debrief { cleared: bool },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissionResult {
	pub success: bool,
	pub reason: Option<String>,
}

/// Ticket for one in-flight evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
	pub mission_id: String,
	pub generation: u64,
	pub request: EvaluationRequest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitRejection {
	InFlight,
	OverBudget,
}

#[derive(Clone, Debug)]
pub struct Session {
	catalog: Arc<Catalog>,
	mission_idx: usize,
	pub graph: CanvasGraph,
	simulation: SimulationState,
	integrity: u32,
	verdict: Option<MissionResult>,
	log: Vec<LogEntry>,
	conversation: Conversation,
	generation: u64,
}

impl Session {
	pub fn new(catalog: Arc<Catalog>) -> Self {
		let graph = CanvasGraph::new(catalog.source().clone());
		Self {
			catalog,
			mission_idx: 0,
			graph,
			simulation: SimulationState::default(),
			integrity: FULL_INTEGRITY,
			verdict: None,
			log: Vec::new(),
			conversation: Conversation::default(),
			generation: 0,
		}
	}

	pub fn catalog(&self) -> &Arc<Catalog> {
		&self.catalog
	}

	pub fn mission(&self) -> &Mission {
		&self.catalog.missions()[self.mission_idx]
	}

	pub fn mission_number(&self) -> (usize, usize) {
		(self.mission_idx + 1, self.catalog.missions().len())
	}

	pub fn simulation(&self) -> &SimulationState {
		&self.simulation
	}

	pub fn integrity(&self) -> u32 {
		self.integrity
	}

	pub fn verdict(&self) -> Option<&MissionResult> {
		self.verdict.as_ref()
	}

	pub fn log(&self) -> &[LogEntry] {
		&self.log
	}

	pub fn spent(&self) -> u32 {
		self.graph.spent()
	}

	pub fn budget_remaining(&self) -> i64 {
		i64::from(self.mission().budget) - i64::from(self.spent())
	}

	pub fn over_budget(&self) -> bool {
		self.spent() > self.mission().budget
	}

	/// Advisory: dropping an unaffordable card is still allowed.
	pub fn can_afford(&self, component: &ComponentDef) -> bool {
		self.budget_remaining() >= i64::from(component.cost)
	}

	pub fn can_submit(&self) -> bool {
		!self.simulation.in_flight && !self.over_budget()
	}

	pub fn phase(&self) -> Phase {
		if self.simulation.in_flight {
			return Phase::Simulating;
		}
		match &self.verdict {
			Some(verdict) => Phase::Debrief {
				cleared: verdict.success,
			},
			None => Phase::Planning,
		}
	}

	pub fn next_mission(&mut self) {
		let len = self.catalog.missions().len();
		self.mission_idx = (self.mission_idx + 1) % len;
		self.reset_canvas();
	}

	pub fn previous_mission(&mut self) {
		let len = self.catalog.missions().len();
		self.mission_idx = (self.mission_idx + len - 1) % len;
		self.reset_canvas();
	}

	/// Fresh canvas and a clean slate for the current mission.
	pub fn reset_canvas(&mut self) {
		self.graph.reset();
		self.retry();
	}

	/// Keeps the architecture, forgets every result.
	pub fn retry(&mut self) {
		self.generation += 1;
		self.log.clear();
		self.integrity = FULL_INTEGRITY;
		self.simulation = SimulationState::default();
		self.verdict = None;
		self.conversation.clear();
	}

	pub fn begin_submission(&mut self) -> Result<Submission, SubmitRejection> {
		if self.simulation.in_flight {
			return Err(SubmitRejection::InFlight);
		}
		if self.over_budget() {
			return Err(SubmitRejection::OverBudget);
		}
		let mission = self.mission().clone();
		let snapshot = ArchitectureSnapshot::capture(&self.graph);
		let prompt = compose_request(&mission, &snapshot);

		self.log.push(LogEntry::Operator(SUBMIT_BANNER.to_string()));
		self.simulation = SimulationState::in_flight();
		self.verdict = None;
		info!("submitting {} with {} components", mission.id, snapshot.component_count());

		Ok(Submission {
			mission_id: mission.id.clone(),
			generation: self.generation,
			request: EvaluationRequest {
				mission,
				snapshot,
				prompt,
				conversation: self.conversation.clone(),
			},
		})
	}

	/// Folds an evaluator answer into the session. Returns `false` when the
	/// answer belongs to a run that has since been abandoned. A failed call
	/// shows up as a one-line report but never enters the conversation.
	pub fn apply_report(
		&mut self,
		submission: &Submission,
		reply: Result<Report, EvaluatorError>,
	) -> bool {
		if submission.generation != self.generation || submission.mission_id != self.mission().id {
			warn!(
				"discarding stale report for {} (generation {})",
				submission.mission_id, submission.generation
			);
			return false;
		}
		let report = match reply {
			Ok(report) => {
				self.conversation
					.record(submission.request.prompt.clone(), report.raw().to_string());
				report
			}
			Err(err) => {
				warn!("evaluator failed for {}: {}", submission.mission_id, err);
				Report::from_error(&err)
			}
		};
		let outcome = reconcile(&report, &self.catalog, self.integrity);
		self.simulation = outcome.simulation;
		self.integrity = outcome.integrity;
		self.verdict = Some(MissionResult {
			success: outcome.success,
			reason: outcome.reason,
		});
		info!(
			"mission {}: success={} integrity={}",
			submission.mission_id, outcome.success, self.integrity
		);
		self.log.push(LogEntry::Evaluator(report));
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::game::canvas::{NodeId, Position};
	use crate::game::evaluator::{EvaluatorError, RuleEvaluator};

	fn session() -> Session {
		Session::new(Arc::new(Catalog::builtin().unwrap()))
	}

	fn place(session: &mut Session, id: &str) -> NodeId {
		let def = session.catalog().component(id).unwrap().clone();
		session.graph.place_node(&def, Position::default())
	}

	#[test]
	fn mission_navigation_wraps_both_ways() {
		let mut s = session();
		let (_, total) = s.mission_number();
		s.previous_mission();
		assert_eq!(s.mission_number(), (total, total));
		s.next_mission();
		assert_eq!(s.mission_number(), (1, total));
		assert_eq!(s.mission().id, "m1");
	}

	#[test]
	fn mission_change_resets_everything() {
		let mut s = session();
		place(&mut s, "waf");
		let sub = s.begin_submission().unwrap();
		s.apply_report(&sub, Ok(Report::parse("STATS :: INTEGRITY :: 40\n[BREACH] :: x :: y")));
		assert_eq!(s.integrity(), 40);

		s.next_mission();
		assert_eq!(s.graph.len(), 1);
		assert_eq!(s.integrity(), FULL_INTEGRITY);
		assert!(s.log().is_empty());
		assert_eq!(s.simulation(), &SimulationState::default());
		assert_eq!(s.phase(), Phase::Planning);
	}

	#[test]
	fn budget_boundary_is_not_overrun() {
		let mut s = session();
		// m1 budget 35: 5 WAFs = 30, + Load Balancer = 35.
		for _ in 0..5 {
			place(&mut s, "waf");
		}
		place(&mut s, "elb");
		assert_eq!(s.spent(), 35);
		assert!(!s.over_budget());
		assert!(s.can_submit());

		let one_more = place(&mut s, "backup");
		assert!(s.over_budget());
		assert_eq!(s.budget_remaining(), -5);
		assert_eq!(s.begin_submission(), Err(SubmitRejection::OverBudget));

		s.graph.delete_node(one_more);
		assert!(!s.over_budget());
	}

	#[test]
	fn affordability_tracks_remaining_budget() {
		let mut s = session();
		let quantum = s.catalog().component("quantum_shield").unwrap().clone();
		assert!(s.can_afford(&quantum));
		place(&mut s, "edr");
		assert!(!s.can_afford(&quantum));
	}

	#[test]
	fn second_submission_rejected_while_in_flight() {
		let mut s = session();
		let sub = s.begin_submission().unwrap();
		assert_eq!(s.phase(), Phase::Simulating);
		assert!(!s.can_submit());
		assert_eq!(s.begin_submission(), Err(SubmitRejection::InFlight));
		assert_eq!(s.log().len(), 1);

		assert!(s.apply_report(&sub, Ok(Report::parse("STATUS :: [MISSION COMPLETE] :: ok"))));
		assert!(s.can_submit());
		assert_eq!(s.phase(), Phase::Debrief { cleared: true });
	}

	#[test]
	fn stale_report_after_mission_switch_is_discarded() {
		let mut s = session();
		let sub = s.begin_submission().unwrap();
		s.next_mission();
		assert!(s.can_submit());
		assert!(!s.apply_report(&sub, Ok(Report::parse("STATS :: INTEGRITY :: 5"))));
		assert_eq!(s.integrity(), FULL_INTEGRITY);
		assert!(s.log().is_empty());
	}

	#[test]
	fn stale_report_after_retry_is_discarded() {
		let mut s = session();
		let sub = s.begin_submission().unwrap();
		s.retry();
		assert!(!s.apply_report(&sub, Ok(Report::parse("[BREACH] :: a :: b"))));
		assert!(!s.simulation().damage_taken);
	}

	#[test]
	fn retry_keeps_graph_but_clears_results() {
		let mut s = session();
		let waf = place(&mut s, "waf");
		s.graph.connect(NodeId::SOURCE, waf);
		let sub = s.begin_submission().unwrap();
		s.apply_report(&sub, Ok(Report::parse("[BREACH] :: a :: b\nSTATS :: INTEGRITY :: 10")));

		s.retry();
		assert_eq!(s.graph.len(), 2);
		assert_eq!(s.graph.node(NodeId::SOURCE).unwrap().connections, vec![waf]);
		assert_eq!(s.integrity(), FULL_INTEGRITY);
		assert!(s.log().is_empty());
		assert_eq!(s.verdict(), None);
	}

	#[test]
	fn missing_integrity_keeps_previous_value() {
		let mut s = session();
		let sub = s.begin_submission().unwrap();
		s.apply_report(&sub, Ok(Report::parse("STATS :: INTEGRITY :: 55")));
		let sub = s.begin_submission().unwrap();
		s.apply_report(&sub, Ok(Report::parse("STATUS :: [MISSION FAILED] :: meh")));
		assert_eq!(s.integrity(), 55);
	}

	#[test]
	fn each_report_replaces_blocked_set() {
		let mut s = session();
		let sub = s.begin_submission().unwrap();
		s.apply_report(&sub, Ok(Report::parse("[BLOCKED] :: a :: WAF held")));
		assert!(s.simulation().blocked.contains("WAF"));
		let sub = s.begin_submission().unwrap();
		s.apply_report(&sub, Ok(Report::parse("[BLOCKED] :: b :: SIEM caught it")));
		assert!(!s.simulation().blocked.contains("WAF"));
		assert!(s.simulation().blocked.contains("SIEM"));
	}

	#[test]
	fn evaluator_failure_degrades_to_empty_state() {
		let mut s = session();
		let sub = s.begin_submission().unwrap();
		assert!(s.apply_report(&sub, Err(EvaluatorError::MissingCredential)));
		assert_eq!(s.simulation(), &SimulationState::default());
		assert_eq!(s.integrity(), FULL_INTEGRITY);
		assert_eq!(s.phase(), Phase::Debrief { cleared: false });
		assert!(s.can_submit());
	}

	#[test]
	fn conversation_carries_between_runs() {
		let mut s = session();
		let first = s.begin_submission().unwrap();
		assert!(first.request.conversation.turns().is_empty());
		s.apply_report(&first, Ok(Report::parse("STATS :: INTEGRITY :: 90")));
		let second = s.begin_submission().unwrap();
		assert_eq!(second.request.conversation.turns().len(), 1);
		assert_eq!(second.request.conversation.turns()[0].prompt, first.request.prompt);
	}

	#[test]
	fn failed_call_stays_out_of_conversation() {
		let mut s = session();
		let sub = s.begin_submission().unwrap();
		let err = EvaluatorError::Transport("HTTP 503".into());
		assert!(s.apply_report(&sub, Err(err)));
		assert!(matches!(
			s.log().last(),
			Some(LogEntry::Evaluator(r)) if r.raw() == "Error: Simulation link severed (HTTP 503)."
		));

		let next = s.begin_submission().unwrap();
		assert!(next.request.conversation.turns().is_empty());
	}

	#[test]
	fn conversation_keeps_reply_verbatim() {
		let mut s = session();
		let reply = "!!! MISSION REPORT !!!\n\nSTATS :: INTEGRITY :: 90%\n";
		let sub = s.begin_submission().unwrap();
		s.apply_report(&sub, Ok(Report::parse(reply)));
		let next = s.begin_submission().unwrap();
		assert_eq!(next.request.conversation.turns()[0].reply, reply);
	}

	#[test]
	fn full_round_with_rule_evaluator() {
		let mut s = session();
		let judge = RuleEvaluator::new(s.catalog().clone());
		let waf = place(&mut s, "waf");
		s.graph.connect(NodeId::SOURCE, waf);

		let sub = s.begin_submission().unwrap();
		assert!(sub.request.prompt.contains("Topology: Internet connects to [WAF]."));
		let report = judge.judge(&sub.request.mission, &sub.request.snapshot);
		assert!(s.apply_report(&sub, Ok(report)));
		assert_eq!(s.phase(), Phase::Debrief { cleared: true });
		assert_eq!(s.integrity(), FULL_INTEGRITY);
		assert!(matches!(s.log(), [LogEntry::Operator(_), LogEntry::Evaluator(_)]));
	}
}

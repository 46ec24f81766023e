//! Judges a submitted architecture and narrates the attacks.
//!
//! `RuleEvaluator` decides locally from capability tags. `RemoteEvaluator`
//! forwards the request to a hosted text model and trusts whatever comes back.

use std::future::Future;
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::{AttackDef, Catalog, ComponentDef, Mission};
use super::config::EvaluatorChoice;
use super::report::{Report, ReportLine, Stat, Verdict};
use super::serializer::ArchitectureSnapshot;
use super::simulation::FULL_INTEGRITY;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EvaluatorError {
	#[error("Error: API Key is missing.")]
	MissingCredential,
	#[error("Error: Simulation link severed ({0}).")]
	Transport(String),
	#[error("No response from simulation core.")]
	EmptyResponse,
}

/// One prompt/reply exchange with a remote evaluator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
	pub prompt: String,
	pub reply: String,
}

/// Conversation history for evaluators that keep context between runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Conversation {
	turns: Vec<Turn>,
}

impl Conversation {
	pub fn turns(&self) -> &[Turn] {
		&self.turns
	}

	pub fn record(&mut self, prompt: String, reply: String) {
		self.turns.push(Turn { prompt, reply });
	}

	pub fn clear(&mut self) {
		self.turns.clear();
	}
}

/// Everything captured when the player pressed run.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationRequest {
	pub mission: Mission,
	pub snapshot: ArchitectureSnapshot,
	/// The wire text, see `serializer::compose_request`.
	pub prompt: String,
	pub conversation: Conversation,
}

pub trait Evaluator {
	fn evaluate(
		&self,
		request: &EvaluationRequest,
	) -> impl Future<Output = Result<Report, EvaluatorError>>;
}

/// Deterministic judge computed from the catalog.
#[derive(Clone, Debug)]
pub struct RuleEvaluator {
	catalog: Arc<Catalog>,
}

impl RuleEvaluator {
	pub fn new(catalog: Arc<Catalog>) -> Self {
		Self { catalog }
	}

	pub fn judge(&self, mission: &Mission, snapshot: &ArchitectureSnapshot) -> Report {
		let placed: Vec<&ComponentDef> = snapshot
			.component_ids
			.iter()
			.filter_map(|id| self.catalog.component(id))
			.collect();
		let threats: Vec<&AttackDef> = mission
			.threats
			.iter()
			.filter_map(|id| self.catalog.attack(id))
			.collect();

		let mut attack_lines = Vec::with_capacity(threats.len());
		let mut damage = 0u32;
		let mut first_breach = None;
		for attack in &threats {
			let blocker = placed.iter().find(|c| self.catalog.mitigates(c, attack));
			match blocker {
				Some(component) => attack_lines.push(ReportLine::Blocked {
					attack: attack.name.clone(),
					detail: format!("Mitigated by {}", component.name),
				}),
				None => {
					damage += attack.damage;
					first_breach.get_or_insert(*attack);
					attack_lines.push(ReportLine::Breach {
						attack: attack.name.clone(),
						detail: format!("No countermeasure in place (-{} Damage)", attack.damage),
					});
				}
			}
		}

		let integrity = FULL_INTEGRITY.saturating_sub(damage);
		let verdict = self.verdict(mission, snapshot, integrity);
		let result = if integrity > 0 { "SURVIVED" } else { "COMPROMISED" };

		let mut lines = vec![ReportLine::Header, verdict];
		lines.extend(attack_lines);
		lines.push(ReportLine::Stat(Stat::Integrity(integrity)));
		lines.push(ReportLine::Stat(Stat::Damage(damage)));
		lines.push(ReportLine::Stat(Stat::Result(result.to_string())));
		lines.push(ReportLine::Advice(self.advice(first_breach, snapshot)));
		Report::from_lines(lines)
	}

	fn verdict(&self, mission: &Mission, snapshot: &ArchitectureSnapshot, integrity: u32) -> ReportLine {
		let unmet = mission
			.requirements
			.iter()
			.find(|group| !group.iter().any(|id| snapshot.contains_component(id)));

		let (verdict, reason) = if let Some(group) = unmet {
			let names: Vec<&str> = group
				.iter()
				.map(|id| self.catalog.component(id).map_or(id.as_str(), |c| c.name.as_str()))
				.collect();
			(
				Verdict::Failed("[MISSION FAILED]".to_string()),
				format!("Mission requires {}.", names.join(" or ")),
			)
		} else if integrity < mission.min_integrity {
			(
				Verdict::Failed("[MISSION FAILED]".to_string()),
				format!(
					"System integrity fell to {integrity}%, below the {}% the client demands.",
					mission.min_integrity
				),
			)
		} else {
			(Verdict::Complete, "All client criteria satisfied.".to_string())
		};
		ReportLine::Status { verdict, reason }
	}

	fn advice(&self, breach: Option<&AttackDef>, snapshot: &ArchitectureSnapshot) -> String {
		let Some(attack) = breach else {
			return "Architecture holds. Consider redundancy on critical paths.".to_string();
		};
		let cheapest = self
			.catalog
			.palette()
			.filter(|c| self.catalog.mitigates(c, attack) && !snapshot.contains_component(&c.id))
			.min_by_key(|c| c.cost);
		match cheapest {
			Some(c) => format!("Install {} (${}) to stop {}.", c.name, c.cost, attack.name),
			None => format!("Nothing in the catalog stops {}.", attack.name),
		}
	}
}

impl Evaluator for RuleEvaluator {
	async fn evaluate(&self, request: &EvaluationRequest) -> Result<Report, EvaluatorError> {
		Ok(self.judge(&request.mission, &request.snapshot))
	}
}

/// Where and how to reach the hosted model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteSettings {
	pub api_key: Option<String>,
	pub model: String,
	pub endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
	system_instruction: Content<'a>,
	contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
	#[serde(skip_serializing_if = "Option::is_none")]
	role: Option<&'static str>,
	parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
	text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
	#[serde(default)]
	candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
	content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
	#[serde(default)]
	parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
	#[serde(default)]
	text: String,
}

/// Hosted generative model acting as game master.
#[derive(Clone, Debug)]
pub struct RemoteEvaluator {
	settings: RemoteSettings,
	instruction: String,
}

impl RemoteEvaluator {
	pub fn new(settings: RemoteSettings, catalog: &Catalog) -> Self {
		Self {
			settings,
			instruction: system_instruction(catalog),
		}
	}

	fn url(&self, key: &str) -> String {
		format!(
			"{}/models/{}:generateContent?key={}",
			self.settings.endpoint.trim_end_matches('/'),
			self.settings.model,
			key
		)
	}

	fn body(&self, request: &EvaluationRequest) -> Result<String, EvaluatorError> {
		let mut contents = Vec::with_capacity(request.conversation.turns().len() * 2 + 1);
		for turn in request.conversation.turns() {
			contents.push(Content {
				role: Some("user"),
				parts: vec![Part { text: &turn.prompt }],
			});
			contents.push(Content {
				role: Some("model"),
				parts: vec![Part { text: &turn.reply }],
			});
		}
		contents.push(Content {
			role: Some("user"),
			parts: vec![Part {
				text: &request.prompt,
			}],
		});
		let body = GenerateRequest {
			system_instruction: Content {
				role: None,
				parts: vec![Part {
					text: &self.instruction,
				}],
			},
			contents,
		};
		serde_json::to_string(&body).map_err(|e| EvaluatorError::Transport(e.to_string()))
	}
}

fn reply_text(raw: &str) -> Result<String, EvaluatorError> {
	let response: GenerateResponse =
		serde_json::from_str(raw).map_err(|e| EvaluatorError::Transport(e.to_string()))?;
	let text: String = response
		.candidates
		.into_iter()
		.filter_map(|c| c.content)
		.flat_map(|c| c.parts)
		.map(|p| p.text)
		.collect();
	if text.trim().is_empty() {
		Err(EvaluatorError::EmptyResponse)
	} else {
		Ok(text)
	}
}

impl Evaluator for RemoteEvaluator {
	async fn evaluate(&self, request: &EvaluationRequest) -> Result<Report, EvaluatorError> {
		let Some(key) = self.settings.api_key.as_deref() else {
			warn!("remote evaluator has no credential");
			return Err(EvaluatorError::MissingCredential);
		};
		let body = self.body(request)?;
		info!("sending mission {} to {}", request.mission.id, self.settings.model);
		let raw = http::post_json(&self.url(key), &body).await?;
		Ok(Report::parse(&reply_text(&raw)?))
	}
}

/// Whichever evaluator the build was configured with.
#[derive(Clone, Debug)]
pub enum EvaluatorBackend {
	Local(RuleEvaluator),
	Remote(RemoteEvaluator),
}

impl EvaluatorBackend {
	pub fn from_choice(choice: &EvaluatorChoice, catalog: Arc<Catalog>) -> Self {
		match choice {
			EvaluatorChoice::Local => EvaluatorBackend::Local(RuleEvaluator::new(catalog)),
			EvaluatorChoice::Remote(settings) => {
				EvaluatorBackend::Remote(RemoteEvaluator::new(settings.clone(), &catalog))
			}
		}
	}
}

impl Evaluator for EvaluatorBackend {
	async fn evaluate(&self, request: &EvaluationRequest) -> Result<Report, EvaluatorError> {
		match self {
			EvaluatorBackend::Local(e) => e.evaluate(request).await,
			EvaluatorBackend::Remote(e) => e.evaluate(request).await,
		}
	}
}

/// Game-master brief sent with every remote request.
fn system_instruction(catalog: &Catalog) -> String {
	let defenses: Vec<String> = catalog
		.palette()
		.enumerate()
		.map(|(i, c)| {
			let blocks: Vec<&str> = catalog
				.attacks()
				.iter()
				.filter(|a| catalog.mitigates(c, a))
				.map(|a| a.name.as_str())
				.collect();
			let blocks = if blocks.is_empty() {
				"infrastructure only".to_string()
			} else {
				format!("blocks {}", blocks.join(", "))
			};
			format!("  {}. {} (${}) - {}", i + 1, c.name, c.cost, blocks)
		})
		.collect();

	format!(
		"You are the CYBER DEFENSE SIMULATOR GAME engine.

GAME MECHANICS:
- Defenses & Capabilities:
{}

SCORING:
- System Integrity starts at {FULL_INTEGRITY}%.
- Damage reduces integrity 1:1.

RESPONSE FORMAT (STRICT FORMAT REQUIRED, NO MARKDOWN):
!!! MISSION REPORT !!!
STATUS :: [MISSION COMPLETE] or [MISSION FAILED] :: one line reason based on the hidden criteria
Then 10-15 attacks, one per line:
[BLOCKED] :: ATTACK NAME :: which defense stopped it
[BREACH] :: ATTACK NAME :: what it damaged (-N Damage)
Then one stat per line:
STATS :: INTEGRITY :: <0-100>
STATS :: DAMAGE :: <total>
STATS :: RESULT :: SURVIVED or COMPROMISED
Finally one line:
ADVICE :: <what to install next>",
		defenses.join("\n")
	)
}

#[cfg(target_arch = "wasm32")]
mod http {
	use wasm_bindgen::JsCast;
	use wasm_bindgen::JsValue;
	use wasm_bindgen_futures::JsFuture;
	use web_sys::{Request, RequestInit, RequestMode, Response};

	use super::EvaluatorError;

	fn transport(err: JsValue) -> EvaluatorError {
		EvaluatorError::Transport(err.as_string().unwrap_or_else(|| format!("{err:?}")))
	}

	pub async fn post_json(url: &str, body: &str) -> Result<String, EvaluatorError> {
		let opts = RequestInit::new();
		opts.set_method("POST");
		opts.set_mode(RequestMode::Cors);
		opts.set_body(&JsValue::from_str(body));
		let request = Request::new_with_str_and_init(url, &opts).map_err(transport)?;
		request
			.headers()
			.set("Content-Type", "application/json")
			.map_err(transport)?;

		let window = web_sys::window()
			.ok_or_else(|| EvaluatorError::Transport("no window".to_string()))?;
		let response: Response = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(transport)?
			.dyn_into()
			.map_err(transport)?;
		if !response.ok() {
			return Err(EvaluatorError::Transport(format!("HTTP {}", response.status())));
		}
		let text = JsFuture::from(response.text().map_err(transport)?)
			.await
			.map_err(transport)?;
		text.as_string().ok_or(EvaluatorError::EmptyResponse)
	}
}

#[cfg(not(target_arch = "wasm32"))]
mod http {
	use super::EvaluatorError;

	pub async fn post_json(_url: &str, _body: &str) -> Result<String, EvaluatorError> {
		Err(EvaluatorError::Transport("fetch is only available in the browser".to_string()))
	}
}

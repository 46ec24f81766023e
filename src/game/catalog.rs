//! Immutable reference data: placeable components, attacks and missions.

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../../assets/catalog.json");

/// Broad palette grouping, used for ordering and tinting cards.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	Infrastructure,
	Web3,
	Security,
	Frontier,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
	#[default]
	Box,
	Cloud,
	Router,
	Server,
	Cylinder,
	Hexagon,
	Shield,
	Sphere,
	Diamond,
	Pyramid,
}

/// A catalog entry the player can drop onto the canvas.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ComponentDef {
	pub id: String,
	pub name: String,
	pub cost: u32,
	pub description: String,
	/// Attack ids this component mitigates.
	#[serde(default)]
	pub blocks: Vec<String>,
	pub category: Category,
	#[serde(default)]
	pub shape: Shape,
	/// The traffic origin seeded onto every fresh canvas.
	#[serde(default)]
	pub source: bool,
	/// Marks the asset shown as damaged when any attack gets through.
	#[serde(default)]
	pub core: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AttackDef {
	pub id: String,
	pub name: String,
	pub damage: u32,
	#[serde(default)]
	pub blocked_by: Vec<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
	Rookie,
	Pro,
	Elite,
	Insane,
}

impl fmt::Display for Difficulty {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Difficulty::Rookie => write!(f, "ROOKIE"),
			Difficulty::Pro => write!(f, "PRO"),
			Difficulty::Elite => write!(f, "ELITE"),
			Difficulty::Insane => write!(f, "INSANE"),
		}
	}
}

fn default_min_integrity() -> u32 {
	50
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Mission {
	pub id: String,
	pub title: String,
	pub client: String,
	pub description: String,
	pub budget: u32,
	pub difficulty: Difficulty,
	/// Free-text pass/fail criteria, only ever read by the remote evaluator.
	pub hidden_criteria: String,
	/// Attack ids thrown at the architecture by the local evaluator.
	#[serde(default)]
	pub threats: Vec<String>,
	/// Each group is satisfied by placing any one of its component ids.
	#[serde(default)]
	pub requirements: Vec<Vec<String>>,
	#[serde(default = "default_min_integrity")]
	pub min_integrity: u32,
}

#[derive(Debug, Error)]
pub enum CatalogError {
	#[error("catalog is not valid JSON: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("duplicate {kind} id `{id}`")]
	DuplicateId { kind: &'static str, id: String },
	#[error("catalog must define exactly one source component, found {0}")]
	SourceCount(usize),
	#[error("catalog defines no missions")]
	NoMissions,
	#[error("mission `{mission}` references unknown {kind} `{id}`")]
	UnknownReference {
		mission: String,
		kind: &'static str,
		id: String,
	},
}

#[derive(Deserialize)]
struct RawCatalog {
	components: Vec<ComponentDef>,
	attacks: Vec<AttackDef>,
	missions: Vec<Mission>,
}

/// Validated reference data. Never mutated after load.
#[derive(Clone, Debug)]
pub struct Catalog {
	components: Vec<ComponentDef>,
	attacks: Vec<AttackDef>,
	missions: Vec<Mission>,
	source_idx: usize,
}

impl Catalog {
	/// The catalog compiled into the bundle.
	pub fn builtin() -> Result<Self, CatalogError> {
		Self::from_json(BUILTIN_CATALOG)
	}

	pub fn from_json(json: &str) -> Result<Self, CatalogError> {
		let raw: RawCatalog = serde_json::from_str(json)?;
		Self::validate(raw)
	}

	fn validate(raw: RawCatalog) -> Result<Self, CatalogError> {
		ensure_unique("component", raw.components.iter().map(|c| c.id.as_str()))?;
		ensure_unique("attack", raw.attacks.iter().map(|a| a.id.as_str()))?;
		ensure_unique("mission", raw.missions.iter().map(|m| m.id.as_str()))?;

		let sources: Vec<usize> = raw
			.components
			.iter()
			.enumerate()
			.filter(|(_, c)| c.source)
			.map(|(i, _)| i)
			.collect();
		let &[source_idx] = sources.as_slice() else {
			return Err(CatalogError::SourceCount(sources.len()));
		};
		if raw.missions.is_empty() {
			return Err(CatalogError::NoMissions);
		}

		let component_ids: HashSet<&str> = raw.components.iter().map(|c| c.id.as_str()).collect();
		let attack_ids: HashSet<&str> = raw.attacks.iter().map(|a| a.id.as_str()).collect();
		for mission in &raw.missions {
			if let Some(id) = mission.threats.iter().find(|t| !attack_ids.contains(t.as_str())) {
				return Err(CatalogError::UnknownReference {
					mission: mission.id.clone(),
					kind: "attack",
					id: id.clone(),
				});
			}
			if let Some(id) = mission
				.requirements
				.iter()
				.flatten()
				.find(|c| !component_ids.contains(c.as_str()))
			{
				return Err(CatalogError::UnknownReference {
					mission: mission.id.clone(),
					kind: "component",
					id: id.clone(),
				});
			}
		}

		Ok(Self {
			components: raw.components,
			attacks: raw.attacks,
			missions: raw.missions,
			source_idx,
		})
	}

	pub fn components(&self) -> &[ComponentDef] {
		&self.components
	}

	/// Everything except the source, in catalog order.
	pub fn palette(&self) -> impl Iterator<Item = &ComponentDef> {
		self.components.iter().filter(|c| !c.source)
	}

	pub fn component(&self, id: &str) -> Option<&ComponentDef> {
		self.components.iter().find(|c| c.id == id)
	}

	pub fn source(&self) -> &ComponentDef {
		&self.components[self.source_idx]
	}

	pub fn attacks(&self) -> &[AttackDef] {
		&self.attacks
	}

	pub fn attack(&self, id: &str) -> Option<&AttackDef> {
		self.attacks.iter().find(|a| a.id == id)
	}

	pub fn missions(&self) -> &[Mission] {
		&self.missions
	}

	/// True when `component` mitigates `attack`, either through its capability
	/// tags or the attack's own blocker list.
	pub fn mitigates(&self, component: &ComponentDef, attack: &AttackDef) -> bool {
		component.blocks.iter().any(|tag| *tag == attack.id)
			|| attack.blocked_by.iter().any(|id| *id == component.id)
	}
}

fn ensure_unique<'a>(
	kind: &'static str,
	ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
	let mut seen = HashSet::new();
	for id in ids {
		if !seen.insert(id) {
			return Err(CatalogError::DuplicateId {
				kind,
				id: id.to_string(),
			});
		}
	}
	Ok(())
}

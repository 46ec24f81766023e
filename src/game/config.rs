//! Build-time settings. A CSR bundle has no process environment, so values are
//! baked in with `option_env!` when the wasm is compiled.

use thiserror::Error;

use super::evaluator::RemoteSettings;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvaluatorChoice {
	Local,
	Remote(RemoteSettings),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
	pub evaluator: EvaluatorChoice,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
	#[error("unknown evaluator backend `{0}` (expected `local` or `remote`)")]
	UnknownBackend(String),
}

impl Default for GameConfig {
	fn default() -> Self {
		Self {
			evaluator: EvaluatorChoice::Local,
		}
	}
}

impl GameConfig {
	pub fn from_build_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| {
			match key {
				"CYBERDEF_EVALUATOR" => option_env!("CYBERDEF_EVALUATOR"),
				"CYBERDEF_API_KEY" => option_env!("CYBERDEF_API_KEY"),
				"CYBERDEF_MODEL" => option_env!("CYBERDEF_MODEL"),
				"CYBERDEF_ENDPOINT" => option_env!("CYBERDEF_ENDPOINT"),
				_ => None,
			}
			.map(str::to_string)
		})
	}

	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
		let backend = non_empty("CYBERDEF_EVALUATOR").unwrap_or_else(|| "local".to_string());

		let evaluator = match backend.trim().to_ascii_lowercase().as_str() {
			"local" => EvaluatorChoice::Local,
			"remote" => EvaluatorChoice::Remote(RemoteSettings {
				api_key: non_empty("CYBERDEF_API_KEY"),
				model: non_empty("CYBERDEF_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
				endpoint: non_empty("CYBERDEF_ENDPOINT")
					.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
			}),
			_ => return Err(ConfigError::UnknownBackend(backend)),
		};
		Ok(Self { evaluator })
	}
}

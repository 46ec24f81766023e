use std::sync::Arc;

use leptos::prelude::*;
use thiserror::Error;

use crate::components::architecture_canvas::ArchitectureCanvas;
use crate::components::mission_panel::MissionPanel;
use crate::components::operations_panel::OperationsPanel;
use crate::components::palette::Palette;
use crate::components::report_log::ReportLog;
use crate::game::catalog::CatalogError;
use crate::game::config::{ConfigError, EvaluatorChoice, GameConfig};
use crate::game::{Catalog, EvaluatorBackend, Session};

#[derive(Debug, Error)]
enum StartupError {
	#[error(transparent)]
	Catalog(#[from] CatalogError),
	#[error(transparent)]
	Config(#[from] ConfigError),
}

fn load() -> Result<(Session, EvaluatorBackend), StartupError> {
	let catalog = Arc::new(Catalog::builtin()?);
	let config = GameConfig::from_build_env()?;
	let backend_name = match config.evaluator {
		EvaluatorChoice::Local => "local",
		EvaluatorChoice::Remote(_) => "remote",
	};
	log::info!(
		"loaded {} components and {} missions, {} evaluator",
		catalog.components().len(),
		catalog.missions().len(),
		backend_name
	);
	let backend = EvaluatorBackend::from_choice(&config.evaluator, catalog.clone());
	Ok((Session::new(catalog), backend))
}

/// Mission dashboard: palette, canvas and operations console.
#[component]
pub fn Home() -> impl IntoView {
	let loaded = load().map(|(session, evaluator)| {
		let session = RwSignal::new(session);
		view! {
			<div class="dashboard">
				<MissionPanel session=session />
				<div class="workbench">
					<Palette session=session />
					<ArchitectureCanvas session=session />
					<div class="console">
						<OperationsPanel session=session evaluator=evaluator />
						<ReportLog session=session />
					</div>
				</div>
			</div>
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{loaded}
		</ErrorBoundary>
	}
}

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;

use crate::game::{Evaluator, EvaluatorBackend, Phase, Session};

/// Budget, integrity and the run/debrief controls.
#[component]
pub fn OperationsPanel(session: RwSignal<Session>, evaluator: EvaluatorBackend) -> impl IntoView {
	let on_run = move |_| {
		let submission = match session.try_update(|s| s.begin_submission()) {
			Some(Ok(submission)) => submission,
			Some(Err(rejection)) => {
				warn!("submission rejected: {:?}", rejection);
				return;
			}
			None => return,
		};
		let evaluator = evaluator.clone();
		spawn_local(async move {
			let reply = evaluator.evaluate(&submission.request).await;
			session.try_update(|s| s.apply_report(&submission, reply));
		});
	};

	let spent = move || session.with(|s| s.spent());
	let budget = move || session.with(|s| s.mission().budget);
	let over = move || session.with(|s| s.over_budget());
	let phase = move || session.with(|s| s.phase());

	view! {
		<section class="operations-panel">
			<div class="gauge">
				<span class="gauge-label">"SYSTEM INTEGRITY"</span>
				<span class="gauge-value">{move || format!("{}%", session.with(|s| s.integrity()))}</span>
			</div>
			<div class="gauge" class:overrun=over>
				<span class="gauge-label">"SPENT"</span>
				<span class="gauge-value">{move || format!("${} / ${}", spent(), budget())}</span>
				<span class="gauge-flag">
					{move || if over() { "OVERRUN" } else { "WITHIN LIMIT" }}
				</span>
			</div>
			<button
				class="run-button"
				disabled=move || session.with(|s| !s.can_submit())
				on:click=on_run
			>
				{move || match phase() {
					Phase::Simulating => "SIMULATING...",
					_ => "RUN SIMULATION",
				}}
			</button>
			{move || match phase() {
				Phase::Debrief { cleared } => {
					let reason = session.with(|s| s.verdict().and_then(|v| v.reason.clone()));
					view! {
						<div class="debrief" class:cleared=cleared>
							<p class="debrief-title">
								{if cleared { "MISSION CLEARED" } else { "MISSION FAILED" }}
							</p>
							{reason.map(|r| view! { <p class="debrief-reason">{r}</p> })}
							<Show when=move || cleared>
								<button on:click=move |_| session.update(|s| s.next_mission())>
									"Next Mission"
								</button>
							</Show>
							<button on:click=move |_| session.update(|s| s.retry())>
								{if cleared { "Replay Mission" } else { "Try Again" }}
							</button>
						</div>
					}
					.into_any()
				}
				_ => ().into_any(),
			}}
		</section>
	}
}

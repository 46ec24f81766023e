use leptos::prelude::*;

use crate::game::Session;

/// Current brief with previous/next navigation.
#[component]
pub fn MissionPanel(session: RwSignal<Session>) -> impl IntoView {
	let mission = move || session.with(|s| s.mission().clone());
	let counter = move || {
		let (n, total) = session.with(|s| s.mission_number());
		format!("MISSION {n:02}/{total:02}")
	};

	view! {
		<header class="mission-panel">
			<div class="mission-nav">
				<button on:click=move |_| session.update(|s| s.previous_mission())>"<"</button>
				<span class="mission-counter">{counter}</span>
				<button on:click=move |_| session.update(|s| s.next_mission())>">"</button>
			</div>
			<h2 class="mission-title">{move || mission().title}</h2>
			<p class="mission-client">
				"CLIENT: " {move || mission().client}
				<span class="difficulty">{move || mission().difficulty.to_string()}</span>
			</p>
			<p class="mission-description">{move || mission().description}</p>
			<p class="mission-budget">"BUDGET: $" {move || mission().budget}</p>
		</header>
	}
}

use leptos::prelude::*;
use web_sys::DragEvent;

use super::architecture_canvas::COMPONENT_MIME;
use crate::game::catalog::Category;
use crate::game::{ComponentDef, Session};

const SECTIONS: [(Category, &str); 4] = [
	(Category::Infrastructure, "Infrastructure"),
	(Category::Web3, "Web3"),
	(Category::Security, "Security"),
	(Category::Frontier, "Frontier"),
];

/// Draggable component cards, grouped by category.
#[component]
pub fn Palette(session: RwSignal<Session>) -> impl IntoView {
	let catalog = session.with_untracked(|s| s.catalog().clone());

	let sections = SECTIONS
		.into_iter()
		.map(|(category, title)| {
			let cards = catalog
				.palette()
				.filter(|c| c.category == category)
				.cloned()
				.map(|def| view! { <PaletteCard session=session def=def /> })
				.collect_view();
			view! {
				<section class="palette-section">
					<h3>{title}</h3>
					{cards}
				</section>
			}
		})
		.collect_view();

	view! {
		<aside class="palette">
			<h2>"Components"</h2>
			{sections}
		</aside>
	}
}

#[component]
fn PaletteCard(session: RwSignal<Session>, def: ComponentDef) -> impl IntoView {
	let id = def.id.clone();
	let on_dragstart = move |ev: DragEvent| {
		if let Some(dt) = ev.data_transfer() {
			if dt.set_data(COMPONENT_MIME, &id).is_err() {
				log::warn!("could not start drag for `{}`", id);
			}
			dt.set_effect_allowed("copy");
		}
	};
	let check = def.clone();
	let affordable = move || session.with(|s| s.can_afford(&check));

	view! {
		<div
			class="palette-card"
			class:unaffordable=move || !affordable()
			draggable="true"
			title=def.description.clone()
			on:dragstart=on_dragstart
		>
			<span class="card-name">{def.name.clone()}</span>
			<span class="card-cost">{format!("${}", def.cost)}</span>
		</div>
	}
}

use leptos::prelude::*;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"404: SECTOR NOT FOUND"</h1>
			<a href="/">"Return to command"</a>
		</div>
	}
}

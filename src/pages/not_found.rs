use leptos::prelude::*;

/// 404 page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div style="min-height: 100vh; display: flex; align-items: center; justify-content: center;">
			<h1 style="color: #1e3a8a;">"Uh oh! We couldn't find that page."</h1>
		</div>
	}
}

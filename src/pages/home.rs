use leptos::prelude::*;

use crate::components::family_tree::load::{TREE_DATA_URL, fetch_tree};
use crate::components::family_tree::{FamilyTreeCanvas, LoadError, TreeDocument};

const PAGE_STYLE: &str = "min-height: 100vh; background: #f8fafc;";
const CENTERED: &str = "min-height: 100vh; display: flex; align-items: center; justify-content: center; text-align: center; background: #f8fafc;";

#[component]
fn Loading() -> impl IntoView {
	view! {
		<div style=CENTERED>
			<div>
				<div class="spinner" style="width: 48px; height: 48px; margin: 0 auto 16px; border-radius: 50%; border: 2px solid transparent; border-bottom-color: #1e3a8a; animation: spin 1s linear infinite;" />
				<div style="font-size: 18px; color: #1e3a8a;">"Loading tree data..."</div>
			</div>
		</div>
	}
}

/// Full-page error with a retry that reloads the whole application.
#[component]
fn LoadFailed(error: LoadError) -> impl IntoView {
	let retry = |_: web_sys::MouseEvent| {
		if let Some(window) = web_sys::window() {
			let _ = window.location().reload();
		}
	};

	view! {
		<div style=CENTERED>
			<div>
				<div style="color: #dc2626; font-size: 18px; margin-bottom: 16px;">"Error loading family tree data"</div>
				<div style="color: #4b5563;">{error.to_string()}</div>
				<button
					class="retry"
					on:click=retry
					style="margin-top: 16px; padding: 8px 16px; background: #2563eb; color: white; border: none; border-radius: 4px; cursor: pointer;"
				>
					"Try Again"
				</button>
			</div>
		</div>
	}
}

#[component]
fn Diagram(document: TreeDocument) -> impl IntoView {
	let data = Signal::derive(move || document.clone());

	view! {
		<div style=PAGE_STYLE>
			<h1 style="font-weight: bold; font-size: 30px; text-align: center; padding: 32px 0; margin: 0; color: #1e3a8a;">
				"Gia phả - Family Tree Diagram"
			</h1>
			<FamilyTreeCanvas data=data />
		</div>
	}
}

/// Loads the tree document once and shows the loading, error or diagram state.
#[component]
pub fn Home() -> impl IntoView {
	let tree = LocalResource::new(|| fetch_tree(TREE_DATA_URL));

	view! {
		{move || match tree.get() {
			None => view! { <Loading /> }.into_any(),
			Some(Err(error)) => view! { <LoadFailed error=error /> }.into_any(),
			Some(Ok(document)) => view! { <Diagram document=document /> }.into_any(),
		}}
	}
}

use std::collections::HashSet;

use log::{error, info};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::error::{LoadError, TreeError};
use super::types::{FamilyMember, TreeDocument};

/// Where the tree document is served from.
pub const TREE_DATA_URL: &str = "/data/treefamily.json";

fn network(err: JsValue) -> LoadError {
	LoadError::Network(
		err.as_string()
			.unwrap_or_else(|| format!("{err:?}")),
	)
}

/// Fetch, parse and validate the tree document.
pub async fn fetch_tree(url: &str) -> Result<TreeDocument, LoadError> {
	let result = request(url).await;
	match &result {
		Ok(doc) => info!(
			"Loaded tree data from {url} ({} members)",
			doc.tree.as_ref().map_or(0, count_members)
		),
		Err(err) => error!("Error loading tree data: {err}"),
	}
	result
}

async fn request(url: &str) -> Result<TreeDocument, LoadError> {
	let window = web_sys::window().ok_or(LoadError::NoWindow)?;
	let response: Response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(network)?
		.dyn_into()
		.map_err(network)?;
	if !response.ok() {
		return classify_response(response.status(), "");
	}
	let body = JsFuture::from(response.text().map_err(network)?)
		.await
		.map_err(network)?
		.as_string()
		.ok_or_else(|| LoadError::Parse("response body is not text".into()))?;
	classify_response(response.status(), &body)
}

/// Turn an HTTP status and body into a validated document.
pub fn classify_response(status: u16, body: &str) -> Result<TreeDocument, LoadError> {
	if !(200..300).contains(&status) {
		return Err(LoadError::Status(status));
	}
	parse_document(body)
}

pub fn parse_document(body: &str) -> Result<TreeDocument, LoadError> {
	let doc: TreeDocument = serde_json::from_str(body)?;
	if let Some(root) = &doc.tree {
		validate(root)?;
	}
	Ok(doc)
}

/// Every blood relation needs a non-empty id, unique among blood relations.
/// Spouse records are not checked; the same person may be listed twice.
pub fn validate(root: &FamilyMember) -> Result<(), TreeError> {
	let mut seen = HashSet::new();
	let mut stack = vec![(root, String::from("tree"))];
	while let Some((member, path)) = stack.pop() {
		let id = member.person.id.trim();
		if id.is_empty() {
			return Err(TreeError::EmptyId { path });
		}
		if !seen.insert(id) {
			return Err(TreeError::DuplicateId(id.to_owned()));
		}
		for (i, child) in member.children.iter().enumerate().rev() {
			stack.push((child, format!("{path}.children[{i}]")));
		}
	}
	Ok(())
}

fn count_members(member: &FamilyMember) -> usize {
	1 + member.children.iter().map(count_members).sum::<usize>()
}

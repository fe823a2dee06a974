use std::collections::BTreeMap;

use serde::Deserialize;

/// A person as it appears in the tree document, without any relations.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub full_name: String,
	#[serde(default)]
	pub role_family: String,
	/// `true` for male.
	#[serde(default)]
	pub gender: bool,
	#[serde(default)]
	pub birth_date: Option<String>,
	/// Explicit 1-based generation, which may differ from the tree depth.
	#[serde(default)]
	pub generation: Option<u32>,
}

impl Person {
	/// Year of birth taken from `birth_date`, if it carries a recognisable one.
	pub fn birth_year(&self) -> Option<i32> {
		let date = self.birth_date.as_deref()?.trim();
		let year = if date.contains('/') {
			date.rsplit('/').next()?
		} else {
			date.split(['-', 'T', ' ']).next()?
		};
		if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
			return None;
		}
		year.parse().ok()
	}
}

/// A member of the family hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FamilyMember {
	#[serde(flatten)]
	pub person: Person,
	#[serde(default)]
	pub children: Vec<FamilyMember>,
	/// Spouse record; its own relations are never expanded.
	#[serde(default)]
	pub spouse: Option<Person>,
}

/// Document served at the tree data path.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TreeDocument {
	#[serde(default)]
	pub tree: Option<FamilyMember>,
}

/// Index of a node in [`TreeLayout::nodes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// A node with its final coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedNode {
	pub person: Person,
	pub x: f64,
	pub y: f64,
	pub depth: usize,
	/// Blood-relation parent; spouses share the parent of their carrier.
	pub parent: Option<NodeId>,
	/// Carrier this node was synthesized for. `None` for blood relations.
	pub spouse_of: Option<NodeId>,
	/// Generation band key. Only blood relations are banded.
	pub band: Option<u32>,
}

impl PositionedNode {
	pub fn is_spouse(&self) -> bool {
		self.spouse_of.is_some()
	}
}

/// Parent to child link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescentEdge {
	pub parent: NodeId,
	pub child: NodeId,
}

/// Link between a blood relation and their synthesized spouse node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarriageEdge {
	pub member: NodeId,
	pub spouse: NodeId,
}

/// Vertical extent of one generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationBand {
	pub generation: u32,
	pub min_y: f64,
	pub max_y: f64,
}

/// Output of [`layout`](super::layout::layout).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeLayout {
	pub nodes: Vec<PositionedNode>,
	pub descent_edges: Vec<DescentEdge>,
	pub marriage_edges: Vec<MarriageEdge>,
}

impl TreeLayout {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: NodeId) -> &PositionedNode {
		&self.nodes[id.0]
	}

	/// Horizontal extent over every node, spouses included.
	pub fn x_extent(&self) -> Option<(f64, f64)> {
		let mut nodes = self.nodes.iter();
		let first = nodes.next()?;
		Some(nodes.fold((first.x, first.x), |(lo, hi), n| {
			(lo.min(n.x), hi.max(n.x))
		}))
	}

	/// Blood relations grouped by band key, in ascending generation order.
	pub fn generation_bands(&self) -> Vec<GenerationBand> {
		let mut groups: BTreeMap<u32, (f64, f64)> = BTreeMap::new();
		for node in &self.nodes {
			let Some(generation) = node.band else {
				continue;
			};
			let extent = groups.entry(generation).or_insert((node.y, node.y));
			extent.0 = extent.0.min(node.y);
			extent.1 = extent.1.max(node.y);
		}
		groups
			.into_iter()
			.map(|(generation, (min_y, max_y))| GenerationBand {
				generation,
				min_y,
				max_y,
			})
			.collect()
	}
}

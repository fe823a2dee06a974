//! Property-based invariant tests for the family tree layout.
//!
//! Verifies, over randomly shaped hierarchies:
//! 1. One node per member plus one per spouse reference
//! 2. Same-depth centers are at least the minimum spacing apart
//! 3. Descent edges match parent-child links, marriage edges match spouses
//! 4. Layout is deterministic
//! 5. Band keys follow explicit generation, else depth + 1
//! 6. Spouses sit beside their carrier and never appear in descent edges
//! 7. Depth alone decides y

use std::collections::BTreeMap;

use family_tree_canvas::components::family_tree::types::NodeId;
use family_tree_canvas::components::family_tree::{
	FamilyMember, LayoutConfig, Person, TreeLayout, layout,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_person() -> impl Strategy<Value = Person> {
	(any::<bool>(), proptest::option::of(0u32..8), 0u32..10_000).prop_map(
		|(gender, generation, n)| Person {
			id: format!("p{n}"),
			full_name: format!("Person {n}"),
			role_family: String::new(),
			gender,
			birth_date: None,
			generation,
		},
	)
}

fn arb_member() -> impl Strategy<Value = FamilyMember> {
	let leaf = (arb_person(), proptest::option::of(arb_person())).prop_map(|(person, spouse)| {
		FamilyMember {
			person,
			children: Vec::new(),
			spouse,
		}
	});
	leaf.prop_recursive(5, 48, 4, |inner| {
		(
			arb_person(),
			proptest::option::of(arb_person()),
			proptest::collection::vec(inner, 0..4),
		)
			.prop_map(|(person, spouse, children)| FamilyMember {
				person,
				children,
				spouse,
			})
	})
}

// ── Counting helpers ──────────────────────────────────────────────────

fn members(m: &FamilyMember) -> usize {
	1 + m.children.iter().map(members).sum::<usize>()
}

fn spouses(m: &FamilyMember) -> usize {
	usize::from(m.spouse.is_some()) + m.children.iter().map(spouses).sum::<usize>()
}

fn links(m: &FamilyMember) -> usize {
	m.children.len() + m.children.iter().map(links).sum::<usize>()
}

fn run(root: &FamilyMember) -> TreeLayout {
	layout(Some(root), &LayoutConfig::default())
}

proptest! {
	#[test]
	fn node_count_matches_members_and_spouses(root in arb_member()) {
		let out = run(&root);
		prop_assert_eq!(out.nodes.len(), members(&root) + spouses(&root));
		prop_assert_eq!(
			out.nodes.iter().filter(|n| n.is_spouse()).count(),
			spouses(&root)
		);
	}

	#[test]
	fn same_depth_nodes_respect_min_spacing(root in arb_member()) {
		let min = LayoutConfig::default().min_spacing;
		let out = run(&root);
		let mut levels: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
		for node in &out.nodes {
			levels.entry(node.depth).or_default().push(node.x);
		}
		for xs in levels.values_mut() {
			xs.sort_by(f64::total_cmp);
			for pair in xs.windows(2) {
				prop_assert!(pair[1] - pair[0] >= min - 1e-6, "{:?}", pair);
			}
		}
	}

	#[test]
	fn edge_counts_match_links(root in arb_member()) {
		let out = run(&root);
		prop_assert_eq!(out.descent_edges.len(), links(&root));
		prop_assert_eq!(out.marriage_edges.len(), spouses(&root));
	}

	#[test]
	fn layout_is_deterministic(root in arb_member()) {
		let first = run(&root);
		let second = run(&root.clone());
		prop_assert_eq!(first, second);
	}

	#[test]
	fn band_key_is_generation_or_depth(root in arb_member()) {
		let out = run(&root);
		for node in &out.nodes {
			if node.is_spouse() {
				prop_assert_eq!(node.band, None);
			} else {
				let expected = node
					.person
					.generation
					.filter(|&g| g > 0)
					.unwrap_or(node.depth as u32 + 1);
				prop_assert_eq!(node.band, Some(expected));
			}
		}
	}

	#[test]
	fn spouses_sit_beside_their_carrier(root in arb_member()) {
		let out = run(&root);
		for edge in &out.marriage_edges {
			let (member, spouse) = (out.node(edge.member), out.node(edge.spouse));
			prop_assert!(!member.is_spouse());
			prop_assert_eq!(spouse.spouse_of, Some(edge.member));
			prop_assert_eq!(spouse.depth, member.depth);
			prop_assert_eq!(spouse.y, member.y);
			prop_assert_eq!(spouse.parent, member.parent);
			prop_assert!(spouse.x > member.x);
		}
		for edge in &out.descent_edges {
			prop_assert!(!out.node(edge.parent).is_spouse());
			prop_assert!(!out.node(edge.child).is_spouse());
			prop_assert_eq!(out.node(edge.child).parent, Some(edge.parent));
			prop_assert_eq!(out.node(edge.child).depth, out.node(edge.parent).depth + 1);
		}
	}

	#[test]
	fn y_depends_on_depth_only(root in arb_member()) {
		let out = run(&root);
		let mut by_depth: BTreeMap<usize, f64> = BTreeMap::new();
		for node in &out.nodes {
			let y = *by_depth.entry(node.depth).or_insert(node.y);
			prop_assert_eq!(y, node.y);
		}
		let ys: Vec<f64> = by_depth.values().copied().collect();
		for pair in ys.windows(2) {
			prop_assert!(pair[1] > pair[0]);
		}
	}
}

#[test]
fn empty_input_draws_nothing() {
	let out = layout(None, &LayoutConfig::default());
	assert_eq!(out, TreeLayout::default());
}

#[test]
fn deep_chain_gets_strictly_increasing_y() {
	let mut root = FamilyMember::default();
	for depth in (0..6).rev() {
		root = FamilyMember {
			person: Person {
				id: depth.to_string(),
				..Person::default()
			},
			children: if depth == 5 { vec![] } else { vec![root] },
			spouse: None,
		};
	}
	let out = run(&root);
	assert_eq!(out.nodes.len(), 6);
	assert_eq!(out.nodes[0].person.id, "0");
	assert_eq!(out.node(NodeId(5)).y, 880.0);
}

//! Tree layout for the family diagram.
//!
//! Blood relations are placed with the Buchheim/Walker tidy tree in the form
//! popularised by d3's `tree` layout, then spouse nodes are attached to the
//! right of their carriers and each depth is swept left to right so that no
//! two centers are closer than [`LayoutConfig::min_spacing`].

use std::collections::BTreeMap;

use super::types::{
	DescentEdge, FamilyMember, MarriageEdge, NodeId, PositionedNode, TreeLayout,
};

/// Layout tunables. The defaults reproduce the 1600 x 1000 canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Horizontal extent the tidy tree is scaled into.
	pub width: f64,
	/// Vertical extent; the deepest level lands on this y.
	pub height: f64,
	/// Separation between neighbours sharing a parent, in tidy-tree units.
	pub sibling_separation: f64,
	/// Separation between neighbours with different parents.
	pub cousin_separation: f64,
	/// Horizontal distance from a member to their spouse.
	pub spouse_offset: f64,
	/// Minimum distance between node centers at the same depth.
	pub min_spacing: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			width: 1300.0,
			height: 880.0,
			sibling_separation: 2.0,
			cousin_separation: 3.0,
			spouse_offset: 250.0,
			min_spacing: 280.0,
		}
	}
}

/// A member annotated with its depth, stored in pre-order.
#[derive(Debug)]
struct HierarchyNode<'a> {
	member: &'a FamilyMember,
	level: usize,
	parent: Option<usize>,
	children: Vec<usize>,
	/// Position among siblings.
	number: usize,
}

fn annotate<'a>(
	member: &'a FamilyMember,
	level: usize,
	parent: Option<usize>,
	number: usize,
	arena: &mut Vec<HierarchyNode<'a>>,
) -> usize {
	let idx = arena.len();
	arena.push(HierarchyNode {
		member,
		level,
		parent,
		children: Vec::with_capacity(member.children.len()),
		number,
	});
	for (number, child) in member.children.iter().enumerate() {
		let child_idx = annotate(child, level + 1, Some(idx), number, arena);
		arena[idx].children.push(child_idx);
	}
	idx
}

/// Lay out `root` and its spouses. `None` yields an empty layout.
pub fn layout(root: Option<&FamilyMember>, config: &LayoutConfig) -> TreeLayout {
	let Some(root) = root else {
		return TreeLayout::default();
	};

	let mut arena = Vec::new();
	annotate(root, 0, None, 0, &mut arena);
	let coords = TidyTree::new(&arena, config).run();

	let mut nodes = Vec::with_capacity(arena.len() * 2);
	let mut node_of = vec![NodeId(0); arena.len()];
	let mut marriage_edges = Vec::new();
	for (idx, entry) in arena.iter().enumerate() {
		let (x, y) = coords[idx];
		let id = NodeId(nodes.len());
		node_of[idx] = id;
		let parent = entry.parent.map(|p| node_of[p]);
		nodes.push(PositionedNode {
			person: entry.member.person.clone(),
			x,
			y,
			depth: entry.level,
			parent,
			spouse_of: None,
			band: Some(
				entry
					.member
					.person
					.generation
					.filter(|&g| g > 0)
					.unwrap_or(entry.level as u32 + 1),
			),
		});
		if let Some(spouse) = &entry.member.spouse {
			let spouse_id = NodeId(nodes.len());
			nodes.push(PositionedNode {
				person: spouse.clone(),
				x: x + config.spouse_offset,
				y,
				depth: entry.level,
				parent,
				spouse_of: Some(id),
				band: None,
			});
			marriage_edges.push(MarriageEdge {
				member: id,
				spouse: spouse_id,
			});
		}
	}

	resolve_collisions(&mut nodes, config.min_spacing);

	let descent_edges = arena
		.iter()
		.enumerate()
		.filter_map(|(idx, entry)| {
			entry.parent.map(|p| DescentEdge {
				parent: node_of[p],
				child: node_of[idx],
			})
		})
		.collect();

	TreeLayout {
		nodes,
		descent_edges,
		marriage_edges,
	}
}

/// Single left-to-right sweep per depth. Nodes only ever move right and keep
/// their relative order; ties keep output order.
fn resolve_collisions(nodes: &mut [PositionedNode], min_spacing: f64) {
	let mut levels: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
	for (idx, node) in nodes.iter().enumerate() {
		levels.entry(node.depth).or_default().push(idx);
	}
	for mut level in levels.into_values() {
		level.sort_by(|&a, &b| nodes[a].x.total_cmp(&nodes[b].x));
		let mut shift = 0.0;
		let mut prev: Option<f64> = None;
		for idx in level {
			let mut x = nodes[idx].x + shift;
			if let Some(prev) = prev {
				let required = prev + min_spacing;
				if x < required {
					shift += required - x;
					x = required;
				}
			}
			nodes[idx].x = x;
			prev = Some(x);
		}
	}
}

/// Working state of the tidy tree walk, one slot per hierarchy node.
struct TidyTree<'t, 'a> {
	arena: &'t [HierarchyNode<'a>],
	config: &'t LayoutConfig,
	prelim: Vec<f64>,
	modifier: Vec<f64>,
	change: Vec<f64>,
	shift: Vec<f64>,
	thread: Vec<Option<usize>>,
	ancestor: Vec<usize>,
	default_ancestor: Vec<Option<usize>>,
}

impl<'t, 'a> TidyTree<'t, 'a> {
	fn new(arena: &'t [HierarchyNode<'a>], config: &'t LayoutConfig) -> Self {
		let n = arena.len();
		Self {
			arena,
			config,
			prelim: vec![0.0; n],
			modifier: vec![0.0; n],
			change: vec![0.0; n],
			shift: vec![0.0; n],
			thread: vec![None; n],
			ancestor: (0..n).collect(),
			default_ancestor: vec![None; n],
		}
	}

	/// Returns `(x, y)` per arena slot, scaled into the configured extent.
	fn run(mut self) -> Vec<(f64, f64)> {
		for v in self.post_order() {
			self.first_walk(v);
		}

		// Second walk: the root is re-centred on 0, then each node picks up the
		// accumulated modifier of its parent. Pre-order guarantees the parent
		// is done first.
		let mut x = vec![0.0; self.arena.len()];
		let root_shift = -self.prelim[0];
		x[0] = self.prelim[0] + root_shift;
		self.modifier[0] += root_shift;
		for v in 1..self.arena.len() {
			let Some(p) = self.arena[v].parent else {
				continue;
			};
			x[v] = self.prelim[v] + self.modifier[p];
			self.modifier[v] += self.modifier[p];
		}

		let (mut left, mut right, mut bottom) = (0, 0, 0);
		for v in 0..self.arena.len() {
			if x[v] < x[left] {
				left = v;
			}
			if x[v] > x[right] {
				right = v;
			}
			if self.arena[v].level > self.arena[bottom].level {
				bottom = v;
			}
		}
		let s = if left == right {
			1.0
		} else {
			self.separation(left, right) / 2.0
		};
		let tx = s - x[left];
		let kx = self.config.width / (x[right] + s + tx);
		let ky = self.config.height / self.arena[bottom].level.max(1) as f64;

		x.iter()
			.zip(self.arena)
			.map(|(&x, node)| ((x + tx) * kx, node.level as f64 * ky))
			.collect()
	}

	fn post_order(&self) -> Vec<usize> {
		let mut order = Vec::with_capacity(self.arena.len());
		let mut stack = vec![(0usize, 0usize)];
		while let Some((v, next)) = stack.pop() {
			match self.arena[v].children.get(next) {
				Some(&child) => {
					stack.push((v, next + 1));
					stack.push((child, 0));
				}
				None => order.push(v),
			}
		}
		order
	}

	fn separation(&self, a: usize, b: usize) -> f64 {
		if self.arena[a].parent == self.arena[b].parent {
			self.config.sibling_separation
		} else {
			self.config.cousin_separation
		}
	}

	fn left_sibling(&self, v: usize) -> Option<usize> {
		let node = &self.arena[v];
		let parent = node.parent?;
		node.number
			.checked_sub(1)
			.map(|i| self.arena[parent].children[i])
	}

	fn next_left(&self, v: usize) -> Option<usize> {
		self.arena[v].children.first().copied().or(self.thread[v])
	}

	fn next_right(&self, v: usize) -> Option<usize> {
		self.arena[v].children.last().copied().or(self.thread[v])
	}

	fn first_walk(&mut self, v: usize) {
		let arena = self.arena;
		let w = self.left_sibling(v);
		let children = &arena[v].children;
		if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
			self.execute_shifts(v);
			let midpoint = (self.prelim[first] + self.prelim[last]) / 2.0;
			match w {
				Some(w) => {
					self.prelim[v] = self.prelim[w] + self.separation(v, w);
					self.modifier[v] = self.prelim[v] - midpoint;
				}
				None => self.prelim[v] = midpoint,
			}
		} else if let Some(w) = w {
			self.prelim[v] = self.prelim[w] + self.separation(v, w);
		}

		if let Some(p) = arena[v].parent {
			let fallback = arena[p].children[0];
			let ancestor = self.default_ancestor[p].unwrap_or(fallback);
			self.default_ancestor[p] = Some(self.apportion(v, w, ancestor));
		}
	}

	/// Pushes the subtree at `v` clear of everything to its left, walking the
	/// inner and outer contours of both sides level by level.
	fn apportion(&mut self, v: usize, w: Option<usize>, mut ancestor: usize) -> usize {
		let Some(w) = w else {
			return ancestor;
		};
		let Some(p) = self.arena[v].parent else {
			return ancestor;
		};

		let (mut vip, mut vop, mut vim) = (v, v, w);
		let mut vom = self.arena[p].children[0];
		let mut sip = self.modifier[vip];
		let mut sop = self.modifier[vop];
		let mut sim = self.modifier[vim];
		let mut som = self.modifier[vom];

		let mut next_im;
		let mut next_ip;
		loop {
			next_im = self.next_right(vim);
			next_ip = self.next_left(vip);
			let (Some(im), Some(ip)) = (next_im, next_ip) else {
				break;
			};
			vim = im;
			vip = ip;
			if let Some(om) = self.next_left(vom) {
				vom = om;
			}
			if let Some(op) = self.next_right(vop) {
				vop = op;
			}
			self.ancestor[vop] = v;
			let shift = self.prelim[vim] + sim - self.prelim[vip] - sip
				+ self.separation(vim, vip);
			if shift > 0.0 {
				let wm = self.next_ancestor(vim, v, ancestor);
				self.move_subtree(wm, v, shift);
				sip += shift;
				sop += shift;
			}
			sim += self.modifier[vim];
			sip += self.modifier[vip];
			som += self.modifier[vom];
			sop += self.modifier[vop];
		}

		if let Some(im) = next_im {
			if self.next_right(vop).is_none() {
				self.thread[vop] = Some(im);
				self.modifier[vop] += sim - sop;
			}
		}
		if let Some(ip) = next_ip {
			if self.next_left(vom).is_none() {
				self.thread[vom] = Some(ip);
				self.modifier[vom] += sip - som;
				ancestor = v;
			}
		}
		ancestor
	}

	fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
		let candidate = self.ancestor[vim];
		if self.arena[candidate].parent == self.arena[v].parent {
			candidate
		} else {
			ancestor
		}
	}

	fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
		let subtrees = self.arena[wp].number as f64 - self.arena[wm].number as f64;
		let change = shift / subtrees;
		self.change[wp] -= change;
		self.shift[wp] += shift;
		self.change[wm] += change;
		self.prelim[wp] += shift;
		self.modifier[wp] += shift;
	}

	fn execute_shifts(&mut self, v: usize) {
		let (mut shift, mut change) = (0.0, 0.0);
		for &w in self.arena[v].children.iter().rev() {
			self.prelim[w] += shift;
			self.modifier[w] += shift;
			change += self.change[w];
			shift += self.shift[w] + change;
		}
	}
}

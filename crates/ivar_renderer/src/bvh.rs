//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree of bounding boxes over a primitive slice that the caller
//! owns. Leaves hold one primitive each, referenced by its index in that
//! slice, so the tree never owns geometry and the same slice must be passed
//! back in at traversal time.

use crate::primitive::{Intersection, Primitive};
use crate::EPSILON;
use ivar_math::{Bounds3, Ray, Vec3};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Number of SAH buckets. Candidate split `i` sits at `count * i / SAH_BUCKETS`
/// for `i` in `1..SAH_BUCKETS`.
pub const SAH_BUCKETS: usize = 31;

/// How an interior node chooses where to split its sorted primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SplitMethod {
    /// Split at the median of the centroid-sorted list.
    #[default]
    Naive,
    /// Surface Area Heuristic over equally spaced split indices.
    Sah,
}

/// BVH node - either a branch with two children or a leaf with one primitive.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bounds: Bounds3,
    },
    /// Leaf referencing one primitive by index.
    Leaf { primitive: usize, bounds: Bounds3 },
    /// Empty tree.
    Empty,
}

impl BvhNode {
    /// Bounds of this subtree.
    pub fn bounds(&self) -> Bounds3 {
        match self {
            BvhNode::Empty => Bounds3::EMPTY,
            BvhNode::Leaf { bounds, .. } => *bounds,
            BvhNode::Branch { bounds, .. } => *bounds,
        }
    }

    /// Get the left child (if this is a branch node).
    pub fn left(&self) -> Option<&BvhNode> {
        match self {
            BvhNode::Branch { left, .. } => Some(left.as_ref()),
            _ => None,
        }
    }

    /// Get the right child (if this is a branch node).
    pub fn right(&self) -> Option<&BvhNode> {
        match self {
            BvhNode::Branch { right, .. } => Some(right.as_ref()),
            _ => None,
        }
    }

    fn node_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Per-primitive data needed during construction.
#[derive(Clone, Copy)]
struct BuildItem {
    index: usize,
    bounds: Bounds3,
    centroid: Vec3,
}

/// A built BVH. Immutable once constructed and safe to share between threads.
pub struct Bvh {
    root: BvhNode,
    split_method: SplitMethod,
    primitive_count: usize,
}

impl Bvh {
    /// Build a BVH over `primitives`.
    ///
    /// Construction is deterministic for a given primitive order and split
    /// method. An empty slice yields an empty tree.
    pub fn build<P: Primitive>(primitives: &[P], split_method: SplitMethod) -> Self {
        let start = Instant::now();

        let items: Vec<BuildItem> = primitives
            .iter()
            .enumerate()
            .map(|(index, p)| {
                let bounds = p.bounds();
                BuildItem {
                    index,
                    bounds,
                    centroid: bounds.centroid(),
                }
            })
            .collect();

        let root = if items.is_empty() {
            BvhNode::Empty
        } else {
            build_recursive(items, split_method)
        };

        let bvh = Self {
            root,
            split_method,
            primitive_count: primitives.len(),
        };

        log::debug!(
            "BVH built ({:?}): {} primitives, {} nodes, depth {} in {:?}",
            split_method,
            bvh.primitive_count,
            bvh.node_count(),
            bvh.depth(),
            start.elapsed()
        );

        bvh
    }

    /// Nearest hit along `ray` across the whole tree.
    ///
    /// `primitives` must be the slice the tree was built from. A leaf whose
    /// index falls outside it yields "no hit".
    pub fn intersect<'a, P: Primitive>(&self, primitives: &'a [P], ray: &Ray) -> Intersection<'a> {
        intersect_node(&self.root, primitives, ray, ray.dir_is_neg())
    }

    pub fn root(&self) -> &BvhNode {
        &self.root
    }

    pub fn bounds(&self) -> Bounds3 {
        self.root.bounds()
    }

    pub fn split_method(&self) -> SplitMethod {
        self.split_method
    }

    pub fn primitive_count(&self) -> usize {
        self.primitive_count
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.root, BvhNode::Empty)
    }

    /// Total number of nodes (branches and leaves).
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Number of levels from the root down to the deepest leaf.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

/// Recursive BVH construction.
///
/// Sorts primitives by centroid along the axis of largest centroid spread,
/// then splits the sorted list at the index chosen by `split_method`.
fn build_recursive(mut items: Vec<BuildItem>, split_method: SplitMethod) -> BvhNode {
    match items.len() {
        0 => BvhNode::Empty,
        1 => BvhNode::Leaf {
            primitive: items[0].index,
            bounds: items[0].bounds,
        },
        2 => {
            let right = items.split_off(1);
            branch(
                build_recursive(items, split_method),
                build_recursive(right, split_method),
            )
        }
        count => {
            let axis = centroid_bounds(&items).max_extent();

            // Stable: equal centroids keep input order
            items.sort_by(|a, b| {
                a.centroid[axis]
                    .partial_cmp(&b.centroid[axis])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mid = split_index(&items, split_method);
            debug_assert!(mid > 0 && mid < count);

            let right = items.split_off(mid);
            branch(
                build_recursive(items, split_method),
                build_recursive(right, split_method),
            )
        }
    }
}

fn branch(left: BvhNode, right: BvhNode) -> BvhNode {
    let bounds = left.bounds().union(&right.bounds());
    BvhNode::Branch {
        left: Box::new(left),
        right: Box::new(right),
        bounds,
    }
}

/// Bounds of the centroids of `items`.
fn centroid_bounds(items: &[BuildItem]) -> Bounds3 {
    items
        .iter()
        .fold(Bounds3::EMPTY, |acc, item| acc.union_point(item.centroid))
}

/// Index at which to split a centroid-sorted list of at least three items.
///
/// The SAH variant scores each candidate index by
/// `(left_area / total) * left_count + (right_area / total) * right_count`,
/// where the areas are those of each side's centroid bounds and
/// `total = left_area + right_area`. The list is then cut at the winning
/// index in sort order rather than by per-primitive bucket membership.
/// Candidates with an empty side or a degenerate total area are skipped;
/// if none remain the median is used.
fn split_index(items: &[BuildItem], split_method: SplitMethod) -> usize {
    let count = items.len();
    let median = count / 2;

    if split_method == SplitMethod::Naive {
        return median;
    }

    let mut best = None;
    let mut best_cost = f32::INFINITY;

    for i in 1..SAH_BUCKETS {
        let mid = count * i / SAH_BUCKETS;
        if mid == 0 || mid >= count {
            continue;
        }

        let left_area = centroid_bounds(&items[..mid]).surface_area();
        let right_area = centroid_bounds(&items[mid..]).surface_area();
        let total_area = left_area + right_area;
        if total_area < EPSILON {
            continue;
        }

        let cost = left_area / total_area * mid as f32
            + right_area / total_area * (count - mid) as f32;
        if cost < best_cost {
            best_cost = cost;
            best = Some(mid);
        }
    }

    best.unwrap_or(median)
}

/// Recursive nearest-hit traversal.
///
/// Both children of a branch are always visited; the nearer result wins and
/// ties go to the left child. Subtrees are pruned only by their own box test,
/// never by the best distance found so far.
fn intersect_node<'a, P: Primitive>(
    node: &BvhNode,
    primitives: &'a [P],
    ray: &Ray,
    dir_is_neg: [bool; 3],
) -> Intersection<'a> {
    match node {
        BvhNode::Empty => Intersection::default(),

        BvhNode::Leaf { primitive, bounds } => {
            if !bounds.intersect_p(ray, ray.direction_inv, dir_is_neg) {
                return Intersection::default();
            }
            primitives
                .get(*primitive)
                .map(|p| p.intersect(ray))
                .unwrap_or_default()
        }

        BvhNode::Branch {
            left,
            right,
            bounds,
        } => {
            if !bounds.intersect_p(ray, ray.direction_inv, dir_is_neg) {
                return Intersection::default();
            }
            let hit_left = intersect_node(left, primitives, ray, dir_is_neg);
            let hit_right = intersect_node(right, primitives, ray, dir_is_neg);
            hit_left.nearest(hit_right)
        }
    }
}

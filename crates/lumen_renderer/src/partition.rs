//! Spatial partition tree for nearest-intersection queries.
//!
//! The tree recursively bisects the scene bounds along the longest axis.
//! Shapes are inserted into every child whose box they overlap, so a shape
//! straddling a split plane is referenced from both sides. Nodes live in a
//! flat arena and refer to each other by [`NodeId`].

use lumen_core::Scene;
use lumen_math::{Aabb, Ray};
use serde::{Deserialize, Serialize};

use crate::intersection::{closest, Intersection, ShapeId};
use crate::Shape;

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the partition tree.
#[derive(Debug, Clone)]
pub enum PartitionNode {
    /// Shapes stored in ascending id order.
    Leaf { bbox: Aabb, shapes: Vec<ShapeId> },
    /// Empty children are `None`.
    Interior {
        bbox: Aabb,
        left: Option<NodeId>,
        right: Option<NodeId>,
    },
}

impl PartitionNode {
    pub fn bbox(&self) -> &Aabb {
        match self {
            PartitionNode::Leaf { bbox, .. } | PartitionNode::Interior { bbox, .. } => bbox,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, PartitionNode::Leaf { .. })
    }
}

/// When a leaf is worth splitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitPolicy {
    /// Leaves holding this many shapes or fewer are never split
    pub min_leaf_shapes: usize,
    /// Maximum tree depth (root is depth 0)
    pub max_depth: u32,
    /// Largest accepted fraction of shapes placed in both children
    pub max_duplication: f32,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            min_leaf_shapes: 4,
            max_depth: 24,
            max_duplication: 0.5,
        }
    }
}

/// Summary of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub leaves: usize,
    pub depth: u32,
    /// Total shape references across all leaves
    pub references: usize,
    /// References beyond one per shape
    pub duplicated: usize,
}

/// Immutable partition over a list of shapes.
#[derive(Debug, Clone)]
pub struct PartitionTree {
    shapes: Vec<Shape>,
    nodes: Vec<PartitionNode>,
    policy: SplitPolicy,
}

/// Child contents produced by a tentative split.
struct Split {
    left: (Aabb, Vec<ShapeId>),
    right: (Aabb, Vec<ShapeId>),
}

impl PartitionTree {
    /// Build a tree with the default split policy.
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self::build(shapes, SplitPolicy::default())
    }

    /// Build a tree over `shapes`.
    pub fn build(shapes: Vec<Shape>, policy: SplitPolicy) -> Self {
        let bounds = shapes.iter().fold(Aabb::EMPTY, |mut acc, shape| {
            acc.expand(&shape.bounding_box());
            acc
        });
        let ids = (0..shapes.len()).map(ShapeId).collect();

        let mut tree = Self {
            shapes,
            nodes: Vec::new(),
            policy,
        };
        tree.build_node(ids, bounds, 0);

        let stats = tree.stats();
        log::debug!(
            "Partition tree: {} shapes, {} nodes, {} leaves, depth {}, {} duplicated references",
            tree.shapes.len(),
            stats.nodes,
            stats.leaves,
            stats.depth,
            stats.duplicated
        );

        tree
    }

    /// Convert every scene primitive to a shape and build the tree.
    pub fn from_scene(scene: &Scene, policy: SplitPolicy) -> Self {
        let shapes = scene.primitives().iter().map(Shape::from_primitive).collect();
        Self::build(shapes, policy)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.0)
    }

    pub fn nodes(&self) -> &[PartitionNode] {
        &self.nodes
    }

    /// The root node, present even for an empty scene.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn bounding_box(&self) -> Aabb {
        self.nodes.first().map(|n| *n.bbox()).unwrap_or(Aabb::EMPTY)
    }

    fn build_node(&mut self, shapes: Vec<ShapeId>, bbox: Aabb, depth: u32) -> NodeId {
        let id = NodeId(self.nodes.len());
        // Placeholder, replaced once the children exist
        self.nodes.push(PartitionNode::Leaf {
            bbox,
            shapes: Vec::new(),
        });

        let node = match self.try_split(&shapes, &bbox, depth) {
            None => PartitionNode::Leaf { bbox, shapes },
            Some(Split { left, right }) => {
                let left = (!left.1.is_empty()).then(|| self.build_node(left.1, left.0, depth + 1));
                let right = (!right.1.is_empty()).then(|| self.build_node(right.1, right.0, depth + 1));
                PartitionNode::Interior { bbox, left, right }
            }
        };
        self.nodes[id.0] = node;

        id
    }

    /// Tentatively bisect a leaf, returning `None` if the policy rejects it.
    fn try_split(&self, shapes: &[ShapeId], bbox: &Aabb, depth: u32) -> Option<Split> {
        if shapes.len() <= self.policy.min_leaf_shapes || depth >= self.policy.max_depth {
            return None;
        }

        let left_box = bbox.split_left();
        let right_box = bbox.split_right();
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut both = 0usize;

        for &id in shapes {
            let shape = &self.shapes[id.0];
            match (shape.overlaps(&left_box), shape.overlaps(&right_box)) {
                (true, true) => {
                    left.push(id);
                    right.push(id);
                    both += 1;
                }
                (true, false) => left.push(id),
                (false, true) => right.push(id),
                // Numerical edge: keep the shape reachable from one side
                (false, false) => {
                    let c = shape.centroid();
                    if right_box.contains(c) && !left_box.contains(c) {
                        right.push(id);
                    } else {
                        left.push(id);
                    }
                }
            }
        }

        let n = shapes.len();
        let duplication = both as f32 / n as f32;
        if duplication > self.policy.max_duplication || (left.len() >= n && right.len() >= n) {
            return None;
        }

        Some(Split {
            left: (left_box, left),
            right: (right_box, right),
        })
    }

    /// Find the nearest intersection along the ray.
    ///
    /// Equal distances resolve to the lower shape id, so the result is
    /// identical to [`find_nearest_linear`](Self::find_nearest_linear).
    pub fn find_nearest(&self, ray: &Ray) -> Option<Intersection<'_>> {
        if self.nodes.is_empty() {
            return None;
        }
        self.query(self.root(), ray, f32::INFINITY)
    }

    fn query(&self, id: NodeId, ray: &Ray, limit: f32) -> Option<Intersection<'_>> {
        let node = &self.nodes[id.0];
        let span = node.bbox().slab(ray)?;
        if span.min > limit {
            return None;
        }

        match node {
            PartitionNode::Leaf { shapes, .. } => shapes
                .iter()
                .filter_map(|&sid| self.intersect_shape(sid, ray))
                .fold(None, |best, hit| closest(best, Some(hit))),
            PartitionNode::Interior { left, right, .. } => {
                let left_hit = left.and_then(|child| self.query(child, ray, limit));
                let limit = left_hit.map_or(limit, |hit| hit.distance.min(limit));
                let right_hit = right.and_then(|child| self.query(child, ray, limit));
                closest(left_hit, right_hit)
            }
        }
    }

    /// Brute-force nearest intersection over every shape.
    pub fn find_nearest_linear(&self, ray: &Ray) -> Option<Intersection<'_>> {
        (0..self.shapes.len())
            .filter_map(|i| self.intersect_shape(ShapeId(i), ray))
            .fold(None, |best, hit| closest(best, Some(hit)))
    }

    fn intersect_shape(&self, id: ShapeId, ray: &Ray) -> Option<Intersection<'_>> {
        let shape = self.shapes.get(id.0)?;
        let hit = shape.intersect(ray)?;
        Some(Intersection::new(ray, hit, shape.material(), id))
    }

    /// Node, leaf, depth and reference counts.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            nodes: self.nodes.len(),
            ..Default::default()
        };
        if !self.nodes.is_empty() {
            self.collect_stats(self.root(), 0, &mut stats);
        }
        stats.duplicated = stats.references.saturating_sub(self.shapes.len());
        stats
    }

    fn collect_stats(&self, id: NodeId, depth: u32, stats: &mut TreeStats) {
        stats.depth = stats.depth.max(depth);
        match &self.nodes[id.0] {
            PartitionNode::Leaf { shapes, .. } => {
                stats.leaves += 1;
                stats.references += shapes.len();
            }
            PartitionNode::Interior { left, right, .. } => {
                for child in [left, right].into_iter().flatten() {
                    self.collect_stats(*child, depth + 1, stats);
                }
            }
        }
    }
}

//! Sphere queries over detectable shapes.
//!
//! [`SpatialQuery`] is the broad-phase collaborator the radar talks to.  Hosts
//! with their own physics engine implement it over their colliders; the
//! framework ships [`ShapeIndex`], an R-tree (via `rstar`) over bounding
//! spheres, which the world rebuilds from current entity positions before
//! each pump.

use glam::Vec3;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use st_core::{LayerMask, ShapeId};

// ── Trait ─────────────────────────────────────────────────────────────────────

pub trait SpatialQuery {
    /// Append to `out` every shape on a layer in `mask` whose bounding sphere
    /// overlaps the sphere at `center` with `radius`.  Order is unspecified.
    fn query_sphere(&self, center: Vec3, radius: f32, mask: LayerMask, out: &mut Vec<ShapeId>);
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// A bounding sphere stored in the R-tree.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShapeEntry {
    pub shape:  ShapeId,
    pub center: [f32; 3],
    pub radius: f32,
    pub layer:  LayerMask,
}

impl ShapeEntry {
    pub fn new(shape: ShapeId, center: Vec3, radius: f32, layer: LayerMask) -> Self {
        Self { shape, center: center.to_array(), radius: radius.max(0.0), layer }
    }
}

impl RTreeObject for ShapeEntry {
    type Envelope = AABB<[f32; 3]>;
    fn envelope(&self) -> Self::Envelope {
        let [x, y, z] = self.center;
        let r = self.radius;
        AABB::from_corners([x - r, y - r, z - r], [x + r, y + r, z + r])
    }
}

impl PointDistance for ShapeEntry {
    /// Squared distance from `point` to the sphere's surface; zero inside.
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let gap = (Vec3::from_array(self.center).distance(Vec3::from_array(*point)) - self.radius).max(0.0);
        gap * gap
    }
}

// ── ShapeIndex ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct ShapeIndex {
    tree: RTree<ShapeEntry>,
}

impl ShapeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bulk_load(entries: Vec<ShapeEntry>) -> Self {
        Self { tree: RTree::bulk_load(entries) }
    }

    /// Replace the contents wholesale.  Cheaper than incremental updates when
    /// most shapes moved since the last build.
    pub fn rebuild(&mut self, entries: Vec<ShapeEntry>) {
        self.tree = RTree::bulk_load(entries);
    }

    pub fn insert(&mut self, entry: ShapeEntry) {
        self.tree.insert(entry);
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl SpatialQuery for ShapeIndex {
    fn query_sphere(&self, center: Vec3, radius: f32, mask: LayerMask, out: &mut Vec<ShapeId>) {
        let radius = radius.max(0.0);
        out.extend(
            self.tree
                .locate_within_distance(center.to_array(), radius * radius)
                .filter(|entry| entry.layer.intersects(mask))
                .map(|entry| entry.shape),
        );
    }
}

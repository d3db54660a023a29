//! `Entity`: anything with a position and a bounding sphere.

use glam::Vec3;

use st_core::{EntityId, EntityKind, LayerMask, ShapeId};

/// Smallest radius an entity may have.
pub const MIN_RADIUS: f32 = 0.01;

/// Shared state of agents and obstacles.
///
/// `position()` is the transform position plus a local centre offset; the
/// bounding sphere is centred there.  The squared radius is cached and kept
/// in step by [`Entity::set_radius`].
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id:    EntityId,
    pub shape: ShapeId,
    pub kind:  EntityKind,
    pub layer: LayerMask,
    transform: Vec3,
    center:    Vec3,
    radius:    f32,
    sq_radius: f32,
    forward:   Vec3,
    enabled:   bool,
}

impl Entity {
    pub fn new(id: EntityId, shape: ShapeId, kind: EntityKind, transform: Vec3, radius: f32) -> Self {
        let radius = radius.max(MIN_RADIUS);
        Self {
            id,
            shape,
            kind,
            layer: LayerMask::default(),
            transform,
            center: Vec3::ZERO,
            radius,
            sq_radius: radius * radius,
            forward: Vec3::Z,
            enabled: true,
        }
    }

    /// Centre of the bounding sphere.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.transform + self.center
    }

    #[inline]
    pub fn transform_position(&self) -> Vec3 {
        self.transform
    }

    pub fn set_transform_position(&mut self, position: Vec3) {
        self.transform = position;
    }

    pub(crate) fn translate(&mut self, delta: Vec3) {
        self.transform += delta;
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn squared_radius(&self) -> f32 {
        self.sq_radius
    }

    /// Clamped to at least [`MIN_RADIUS`].
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = if radius.is_nan() { MIN_RADIUS } else { radius.max(MIN_RADIUS) };
        self.sq_radius = self.radius * self.radius;
    }

    /// Unit forward vector.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Zero vectors are ignored; anything else is normalised.
    pub fn set_forward(&mut self, forward: Vec3) {
        let unit = forward.normalize_or_zero();
        if unit != Vec3::ZERO {
            self.forward = unit;
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

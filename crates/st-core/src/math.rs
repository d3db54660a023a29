//! Vector helpers shared by agents and steering behaviors.
//!
//! Everything works on `glam::Vec3`.  "Approximately zero" uses a single
//! framework-wide [`EPSILON`] so the composition pipeline and the behaviors
//! agree on what counts as "no force".

use glam::{Quat, Vec3};

/// Magnitude below which a scalar or vector is treated as zero.
pub const EPSILON: f32 = 1e-5;

#[inline]
pub fn approx_zero(x: f32) -> bool {
    x.abs() < EPSILON
}

#[inline]
pub fn is_zero_vec(v: Vec3) -> bool {
    v.length_squared() < EPSILON * EPSILON
}

/// Shorten `v` to at most `max_len`, keeping its direction.
#[inline]
pub fn clamp_magnitude(v: Vec3, max_len: f32) -> Vec3 {
    let max_len = max_len.max(0.0);
    let len_sq = v.length_squared();
    if len_sq > max_len * max_len {
        v * (max_len / len_sq.sqrt())
    } else {
        v
    }
}

/// Spherical interpolation between two directions.
///
/// Both inputs are normalised first; `t` is clamped to `[0, 1]`.  The
/// anti-parallel case rotates around an arbitrary perpendicular axis.
pub fn slerp_direction(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    if is_zero_vec(from) {
        return to;
    }
    if is_zero_vec(to) {
        return from;
    }
    let rotation = Quat::from_rotation_arc(from, to);
    (Quat::IDENTITY.slerp(rotation, t.clamp(0.0, 1.0)) * from).normalize_or_zero()
}

// ── AxisMask ──────────────────────────────────────────────────────────────────

/// Per-axis movement mask.  A disabled axis receives no position delta and no
/// orientation change along it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisMask {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl AxisMask {
    pub const ALL: AxisMask = AxisMask { x: true, y: true, z: true };
    /// Ground-plane movement: no vertical component.
    pub const PLANAR: AxisMask = AxisMask { x: true, y: false, z: true };

    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(
            if self.x { 1.0 } else { 0.0 },
            if self.y { 1.0 } else { 0.0 },
            if self.z { 1.0 } else { 0.0 },
        )
    }

    /// Zero out the components of `v` along disabled axes.
    #[inline]
    pub fn apply(self, v: Vec3) -> Vec3 {
        v * self.as_vec3()
    }
}

impl Default for AxisMask {
    fn default() -> Self {
        AxisMask::ALL
    }
}

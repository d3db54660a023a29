//! `PathWay`: a polyline with a radius, used for path-constrained movement.
//!
//! # Geometry
//!
//! The pathway volume is the union of a sphere at every waypoint and a
//! cylinder along every segment, all of the same `radius`.  A cyclic pathway
//! virtually repeats its first waypoint at the end, closing the loop.
//!
//! Segment lengths, unit directions and the total length are derived data.
//! They are recomputed from scratch whenever the waypoints or the cyclic flag
//! change; nothing is patched incrementally.
//!
//! ```text
//! points:   p0 ──── p1 ──── p2 ( ──── p0 if cyclic )
//! lengths:   0    |p1-p0| |p2-p1|
//! normals:   0    unit(p1-p0) ...
//! ```

use glam::Vec3;

use crate::{SpatialError, SpatialResult};

/// The nearest point on a pathway to some query point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathProjection {
    /// Nearest point on the centreline.
    pub point:    Vec3,
    /// Distance from the query point to the tube surface.  Negative inside.
    pub outside:  f32,
    /// Unit direction of the segment `point` lies on.
    pub tangent:  Vec3,
    /// Distance along the path from the first waypoint to `point`.
    pub distance: f32,
}

#[derive(Clone, Debug)]
pub struct PathWay {
    /// Waypoints as given, without the virtual closing point.
    waypoints:    Vec<Vec3>,
    /// Waypoints including the closing point when cyclic.
    points:       Vec<Vec3>,
    /// `lengths[i]` is the length of segment `points[i-1] → points[i]`.
    lengths:      Vec<f32>,
    normals:      Vec<Vec3>,
    total_length: f32,
    radius:       f32,
    cyclic:       bool,
}

impl PathWay {
    /// Build a pathway.  Fails if fewer than two waypoints are given.
    pub fn new(waypoints: Vec<Vec3>, radius: f32, cyclic: bool) -> SpatialResult<Self> {
        if waypoints.len() < 2 {
            return Err(SpatialError::TooFewPoints(waypoints.len()));
        }
        let mut path = Self {
            waypoints,
            points:       Vec::new(),
            lengths:      Vec::new(),
            normals:      Vec::new(),
            total_length: 0.0,
            radius:       radius.max(0.0),
            cyclic,
        };
        path.rebuild();
        Ok(path)
    }

    fn rebuild(&mut self) {
        self.points.clear();
        self.points.extend_from_slice(&self.waypoints);
        if self.cyclic {
            self.points.push(self.waypoints[0]);
        }

        let n = self.points.len();
        self.lengths = vec![0.0; n];
        self.normals = vec![Vec3::ZERO; n];
        self.total_length = 0.0;
        for i in 1..n {
            let span = self.points[i] - self.points[i - 1];
            let len = span.length();
            self.lengths[i] = len;
            // Zero-length segments keep a zero normal.
            self.normals[i] = if len > 0.0 { span / len } else { Vec3::ZERO };
            self.total_length += len;
        }
    }

    // ── Accessors / mutation ──────────────────────────────────────────────

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    /// Polyline vertices, including the closing point of a cyclic path.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
    }

    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    /// Replace the waypoints and rebuild.  On error the pathway is unchanged.
    pub fn set_waypoints(&mut self, waypoints: Vec<Vec3>) -> SpatialResult<()> {
        if waypoints.len() < 2 {
            return Err(SpatialError::TooFewPoints(waypoints.len()));
        }
        self.waypoints = waypoints;
        self.rebuild();
        Ok(())
    }

    pub fn set_cyclic(&mut self, cyclic: bool) {
        if self.cyclic != cyclic {
            self.cyclic = cyclic;
            self.rebuild();
        }
    }

    // ── Mapping ───────────────────────────────────────────────────────────

    /// Nearest point on the path to `point`, with its tube distance, tangent
    /// and distance along the path.  Ties go to the earliest segment.
    pub fn map_point_to_path(&self, point: Vec3) -> PathProjection {
        let mut best_dist = f32::MAX;
        let mut best = PathProjection {
            point:    self.points[0],
            outside:  0.0,
            tangent:  Vec3::ZERO,
            distance: 0.0,
        };
        let mut along = 0.0;

        for i in 1..self.points.len() {
            let (on_segment, projection) = self.nearest_on_segment(i, point);
            let d = point.distance(on_segment);
            if d < best_dist {
                best_dist = d;
                best.point = on_segment;
                best.tangent = self.normals[i];
                best.distance = along + projection;
            }
            along += self.lengths[i];
        }

        best.outside = best_dist - self.radius;
        best
    }

    /// Distance along the path of the point nearest to `point`.
    pub fn map_point_to_path_distance(&self, point: Vec3) -> f32 {
        self.map_point_to_path(point).distance
    }

    /// The point `distance` along the path.
    ///
    /// Cyclic paths wrap (negative distances count back from the end);
    /// open paths clamp to their end points.
    pub fn map_path_distance_to_point(&self, distance: f32) -> Vec3 {
        let last = self.points[self.points.len() - 1];
        let mut remaining = distance;
        if self.cyclic {
            if self.total_length <= 0.0 {
                return self.points[0];
            }
            remaining = distance.rem_euclid(self.total_length);
        } else {
            if distance < 0.0 {
                return self.points[0];
            }
            if distance >= self.total_length {
                return last;
            }
        }

        for i in 1..self.points.len() {
            let len = self.lengths[i];
            if len < remaining {
                remaining -= len;
            } else if len <= 0.0 {
                return self.points[i];
            } else {
                return self.points[i - 1].lerp(self.points[i], remaining / len);
            }
        }
        last
    }

    /// Nearest point on segment `i` (ending at `points[i]`) and its offset
    /// from the segment start.
    fn nearest_on_segment(&self, i: usize, point: Vec3) -> (Vec3, f32) {
        let start = self.points[i - 1];
        let projection = self.normals[i].dot(point - start);
        if projection <= 0.0 {
            (start, 0.0)
        } else if projection >= self.lengths[i] {
            (self.points[i], self.lengths[i])
        } else {
            (start + self.normals[i] * projection, projection)
        }
    }
}

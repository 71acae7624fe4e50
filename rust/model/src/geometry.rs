// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point and rectangle primitives shared by every routing phase

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Tolerance used for coordinate comparisons (feet)
pub const GEOM_TOLERANCE: f64 = 1e-6;

/// A 3D point (simplified for serialization)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_nalgebra(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn from_nalgebra(p: &Point3<f64>) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn distance_to(&self, other: &Point3D) -> f64 {
        (self.to_nalgebra() - other.to_nalgebra()).norm()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Axis-aligned rectangle in wall-local (U, V) space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UvRect {
    pub u_min: f64,
    pub u_max: f64,
    pub v_min: f64,
    pub v_max: f64,
}

impl UvRect {
    /// Build a rectangle, normalizing swapped bounds
    pub fn new(u0: f64, u1: f64, v0: f64, v1: f64) -> Self {
        Self {
            u_min: u0.min(u1),
            u_max: u0.max(u1),
            v_min: v0.min(v1),
            v_max: v0.max(v1),
        }
    }

    pub fn width(&self) -> f64 {
        self.u_max - self.u_min
    }

    pub fn height(&self) -> f64 {
        self.v_max - self.v_min
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.u_min + self.u_max) / 2.0,
            (self.v_min + self.v_max) / 2.0,
        )
    }

    /// Point containment, inclusive of the boundary
    pub fn contains(&self, u: f64, v: f64) -> bool {
        u >= self.u_min - GEOM_TOLERANCE
            && u <= self.u_max + GEOM_TOLERANCE
            && v >= self.v_min - GEOM_TOLERANCE
            && v <= self.v_max + GEOM_TOLERANCE
    }

    /// Interior overlap; rectangles that only share an edge do not overlap
    pub fn overlaps(&self, other: &UvRect) -> bool {
        self.u_min < other.u_max - GEOM_TOLERANCE
            && other.u_min < self.u_max - GEOM_TOLERANCE
            && self.v_min < other.v_max - GEOM_TOLERANCE
            && other.v_min < self.v_max - GEOM_TOLERANCE
    }

    pub fn intersection(&self, other: &UvRect) -> Option<UvRect> {
        if !self.overlaps(other) {
            return None;
        }
        Some(UvRect {
            u_min: self.u_min.max(other.u_min),
            u_max: self.u_max.min(other.u_max),
            v_min: self.v_min.max(other.v_min),
            v_max: self.v_max.min(other.v_max),
        })
    }

    /// Grow the rectangle by `amount` on every side
    pub fn inflate(&self, amount: f64) -> UvRect {
        UvRect {
            u_min: self.u_min - amount,
            u_max: self.u_max + amount,
            v_min: self.v_min - amount,
            v_max: self.v_max + amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point3D::new(0.0, 0.0, 0.0);
        let b = Point3D::new(3.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_normalizes_bounds() {
        let r = UvRect::new(4.0, 1.0, 9.0, 0.0);
        assert_eq!(r.u_min, 1.0);
        assert_eq!(r.u_max, 4.0);
        assert_eq!(r.v_min, 0.0);
        assert_eq!(r.v_max, 9.0);
    }

    #[test]
    fn test_shared_edge_is_not_overlap() {
        let left = UvRect::new(0.0, 1.0, 0.0, 9.0);
        let right = UvRect::new(1.0, 2.0, 0.0, 9.0);
        assert!(!left.overlaps(&right));
        assert!(left.intersection(&right).is_none());

        let straddling = UvRect::new(0.5, 1.5, 2.0, 3.0);
        assert!(left.overlaps(&straddling));
        let inter = left.intersection(&straddling).unwrap();
        assert!((inter.width() - 0.5).abs() < 1e-9);
    }
}

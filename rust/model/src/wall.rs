// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Walls as consumed by routing
//!
//! A wall carries a local frame with three orthonormal axes:
//! - U runs along the wall length (from the base plane X axis)
//! - V is world up
//! - W is the face normal; positive W is the interior side
//!
//! V is measured as world Z minus the wall base elevation rather than by a
//! dot product, so walls are assumed plumb.

use crate::error::{Error, Result};
use crate::geometry::{Point3D, GEOM_TOLERANCE};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Minimum axis length accepted before normalization
const MIN_AXIS_NORM: f64 = 1e-6;

/// Wall-local coordinates of a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallLocal {
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

/// Orthonormal wall frame
#[derive(Debug, Clone, PartialEq)]
pub struct WallFrame {
    pub origin: Point3<f64>,
    pub u_axis: Vector3<f64>,
    pub v_axis: Vector3<f64>,
    pub w_axis: Vector3<f64>,
}

impl WallFrame {
    /// Build a frame from a run direction and an optional face normal
    ///
    /// Both axes are flattened to the horizontal plane. A missing or
    /// degenerate normal falls back to `U x Z`, so a wall running along +X
    /// faces -Y.
    pub fn new(
        origin: Point3<f64>,
        direction: Vector3<f64>,
        normal: Option<Vector3<f64>>,
    ) -> Result<Self> {
        if !(origin.x.is_finite() && origin.y.is_finite() && origin.z.is_finite()) {
            return Err(Error::InvalidFrame("origin is not finite".into()));
        }

        let flat = Vector3::new(direction.x, direction.y, 0.0);
        if !(flat.norm() > MIN_AXIS_NORM) {
            return Err(Error::InvalidFrame(
                "x_axis is zero-length or vertical".into(),
            ));
        }
        let u_axis = flat.normalize();
        let v_axis = Vector3::z();

        let w_axis = normal
            .map(|n| {
                let flat_n = Vector3::new(n.x, n.y, 0.0);
                flat_n - u_axis * flat_n.dot(&u_axis)
            })
            .filter(|n| n.norm() > MIN_AXIS_NORM)
            .map(|n| n.normalize())
            .unwrap_or_else(|| u_axis.cross(&v_axis).normalize());

        Ok(Self {
            origin,
            u_axis,
            v_axis,
            w_axis,
        })
    }
}

/// JSON shape of a wall's base plane
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BasePlane {
    pub origin: Point3D,
    pub x_axis: Point3D,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_axis: Option<Point3D>,
}

/// JSON shape of a wall record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WallRecord {
    pub wall_id: String,
    pub wall_length: f64,
    pub wall_height: f64,
    #[serde(default)]
    pub base_elevation: Option<f64>,
    pub base_plane: BasePlane,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
}

/// A validated wall with its local frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WallRecord", into = "WallRecord")]
pub struct Wall {
    pub wall_id: String,
    pub frame: WallFrame,
    pub length: f64,
    pub height: f64,
    pub base_elevation: f64,
    pub thickness: Option<f64>,
}

impl Wall {
    /// Build a wall from a base point and run direction
    pub fn from_direction(
        wall_id: impl Into<String>,
        origin: Point3D,
        direction: Point3D,
        length: f64,
        height: f64,
    ) -> Result<Self> {
        let frame = WallFrame::new(origin.to_nalgebra(), direction.to_vector(), None)?;
        Self::with_frame(wall_id, frame, length, height, origin.z, None)
    }

    /// Build a wall from an existing frame, validating dimensions
    pub fn with_frame(
        wall_id: impl Into<String>,
        frame: WallFrame,
        length: f64,
        height: f64,
        base_elevation: f64,
        thickness: Option<f64>,
    ) -> Result<Self> {
        let wall_id = wall_id.into();
        if wall_id.trim().is_empty() {
            return Err(Error::MissingField("wall_id"));
        }
        check_positive("wall_length", length)?;
        check_positive("wall_height", height)?;
        if !base_elevation.is_finite() {
            return Err(Error::InvalidDimension {
                name: "base_elevation",
                value: base_elevation,
            });
        }
        if let Some(t) = thickness {
            check_positive("thickness", t)?;
        }
        Ok(Self {
            wall_id,
            frame,
            length,
            height,
            base_elevation,
            thickness,
        })
    }

    /// Project a world point into wall-local coordinates
    pub fn to_local(&self, p: &Point3D) -> WallLocal {
        let rel = p.to_nalgebra() - self.frame.origin;
        WallLocal {
            u: rel.dot(&self.frame.u_axis),
            v: p.z - self.base_elevation,
            w: rel.dot(&self.frame.w_axis),
        }
    }

    /// World point on the wall plane (W = 0) at the given (U, V)
    pub fn to_world(&self, u: f64, v: f64) -> Point3D {
        let p = self.frame.origin + self.frame.u_axis * u;
        Point3D::new(p.x, p.y, self.base_elevation + v)
    }

    /// Whether (U, V) lies on the wall face, boundary included
    pub fn contains_uv(&self, u: f64, v: f64) -> bool {
        u >= -GEOM_TOLERANCE
            && u <= self.length + GEOM_TOLERANCE
            && v >= -GEOM_TOLERANCE
            && v <= self.height + GEOM_TOLERANCE
    }
}

impl TryFrom<WallRecord> for Wall {
    type Error = Error;

    fn try_from(record: WallRecord) -> Result<Self> {
        let plane = &record.base_plane;
        let frame = WallFrame::new(
            plane.origin.to_nalgebra(),
            plane.x_axis.to_vector(),
            plane.z_axis.map(|z| z.to_vector()),
        )?;
        let base_elevation = record.base_elevation.unwrap_or(plane.origin.z);
        Wall::with_frame(
            record.wall_id,
            frame,
            record.wall_length,
            record.wall_height,
            base_elevation,
            record.thickness,
        )
    }
}

impl From<Wall> for WallRecord {
    fn from(wall: Wall) -> Self {
        let f = &wall.frame;
        WallRecord {
            wall_id: wall.wall_id,
            wall_length: wall.length,
            wall_height: wall.height,
            base_elevation: Some(wall.base_elevation),
            base_plane: BasePlane {
                origin: Point3D::from_nalgebra(&f.origin),
                x_axis: Point3D::new(f.u_axis.x, f.u_axis.y, f.u_axis.z),
                z_axis: Some(Point3D::new(f.w_axis.x, f.w_axis.y, f.w_axis.z)),
            },
            thickness: wall.thickness,
        }
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidDimension { name, value })
    }
}

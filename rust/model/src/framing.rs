// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Framing members and framing cells in wall-local space
//!
//! Framing generators hand us world-space centerlines; they are projected
//! once into the host wall's (U, V) frame here so that cavity decomposition
//! only ever deals with rectangles.

use crate::error::{Error, Result};
use crate::geometry::{Point3D, UvRect};
use crate::wall::Wall;
use serde::{Deserialize, Serialize};

/// Role of a framing member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Stud,
    KingStud,
    JackStud,
    Cripple,
    BottomPlate,
    TopPlate,
    Header,
    Sill,
    Blocking,
    Other,
}

impl MemberKind {
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        match key.as_str() {
            "stud" | "common_stud" | "end_stud" | "corner_stud" => MemberKind::Stud,
            "king_stud" | "king" => MemberKind::KingStud,
            "jack_stud" | "jack" | "trimmer" | "trimmer_stud" => MemberKind::JackStud,
            "cripple" | "cripple_stud" | "sill_cripple" | "header_cripple" => MemberKind::Cripple,
            "bottom_plate" | "sole_plate" | "sill_plate" => MemberKind::BottomPlate,
            "top_plate" | "cap_plate" | "double_top_plate" => MemberKind::TopPlate,
            "header" | "lintel" => MemberKind::Header,
            "sill" | "rough_sill" | "window_sill" => MemberKind::Sill,
            "blocking" | "fire_blocking" | "row_blocking" | "block" => MemberKind::Blocking,
            _ => MemberKind::Other,
        }
    }

    /// Members a drill bit may pass through
    pub fn is_drillable(&self) -> bool {
        matches!(
            self,
            MemberKind::BottomPlate | MemberKind::TopPlate | MemberKind::Blocking
        )
    }

    pub fn is_plate(&self) -> bool {
        matches!(self, MemberKind::BottomPlate | MemberKind::TopPlate)
    }
}

/// A framing member projected into wall-local space
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FramingMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    pub wall_id: String,
    pub kind: MemberKind,
    /// Body of the member in (U, V)
    pub bounds: UvRect,
    /// Profile dimension lying in the wall plane
    pub width: f64,
    /// True when the centerline runs along V
    pub vertical: bool,
}

impl FramingMember {
    /// Project a world-space centerline onto the host wall
    pub fn from_centerline(
        wall: &Wall,
        kind: MemberKind,
        start: &Point3D,
        end: &Point3D,
        width: f64,
    ) -> Result<Self> {
        if !(width.is_finite() && width > 0.0) {
            return Err(Error::InvalidDimension {
                name: "profile.width",
                value: width,
            });
        }
        if !(start.is_finite() && end.is_finite()) {
            return Err(Error::InvalidField {
                field: "centerline",
                reason: "non-finite coordinates".into(),
            });
        }

        let a = wall.to_local(start);
        let b = wall.to_local(end);
        let vertical = (b.v - a.v).abs() > (b.u - a.u).abs();
        let half = width / 2.0;

        let bounds = if vertical {
            let u = (a.u + b.u) / 2.0;
            UvRect::new(u - half, u + half, a.v, b.v)
        } else {
            let v = (a.v + b.v) / 2.0;
            UvRect::new(a.u, b.u, v - half, v + half)
        };

        Ok(Self {
            element_id: None,
            wall_id: wall.wall_id.clone(),
            kind,
            bounds,
            width,
            vertical,
        })
    }

    /// A vertical member given directly in wall-local coordinates
    pub fn vertical_at(
        wall_id: impl Into<String>,
        kind: MemberKind,
        u_center: f64,
        v_min: f64,
        v_max: f64,
        width: f64,
    ) -> Self {
        let half = width / 2.0;
        Self {
            element_id: None,
            wall_id: wall_id.into(),
            kind,
            bounds: UvRect::new(u_center - half, u_center + half, v_min, v_max),
            width,
            vertical: true,
        }
    }

    /// A horizontal member given directly in wall-local coordinates
    pub fn horizontal_at(
        wall_id: impl Into<String>,
        kind: MemberKind,
        u_min: f64,
        u_max: f64,
        v_center: f64,
        width: f64,
    ) -> Self {
        let half = width / 2.0;
        Self {
            element_id: None,
            wall_id: wall_id.into(),
            kind,
            bounds: UvRect::new(u_min, u_max, v_center - half, v_center + half),
            width,
            vertical: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.element_id = Some(id.into());
        self
    }

    pub fn u_center(&self) -> f64 {
        self.bounds.center().0
    }
}

/// Cell classification from a wall's cell decomposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Plain stud cell
    #[serde(rename = "SC")]
    StudCell,
    /// Window or door opening
    #[serde(rename = "OC")]
    Opening,
    /// Cripples below a sill
    #[serde(rename = "SCC")]
    SillCripple,
    /// Cripples above a header
    #[serde(rename = "HCC")]
    HeaderCripple,
    #[serde(other, rename = "other")]
    Other,
}

impl CellKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().replace(&[' ', '-'][..], "_").as_str() {
            "SC" | "STUD_CELL" => CellKind::StudCell,
            "OC" | "OPENING" | "OPENING_CELL" => CellKind::Opening,
            "SCC" | "SILL_CRIPPLE" | "SILL_CRIPPLE_CELL" => CellKind::SillCripple,
            "HCC" | "HEADER_CRIPPLE" | "HEADER_CRIPPLE_CELL" => CellKind::HeaderCripple,
            _ => CellKind::Other,
        }
    }
}

/// A rectangular cell from the framing generator's decomposition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FramingCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_id: Option<String>,
    pub wall_id: String,
    pub kind: CellKind,
    pub bounds: UvRect,
}

impl FramingCell {
    pub fn new(wall_id: impl Into<String>, kind: CellKind, bounds: UvRect) -> Self {
        Self {
            cell_id: None,
            wall_id: wall_id.into(),
            kind,
            bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wall() -> Wall {
        Wall::from_direction(
            "w1",
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            10.0,
            9.0,
        )
        .unwrap()
    }

    #[test]
    fn test_member_kind_aliases() {
        assert_eq!(MemberKind::parse("King Stud"), MemberKind::KingStud);
        assert_eq!(MemberKind::parse("trimmer"), MemberKind::JackStud);
        assert_eq!(MemberKind::parse("sole-plate"), MemberKind::BottomPlate);
        assert_eq!(MemberKind::parse("mystery"), MemberKind::Other);
        assert!(MemberKind::TopPlate.is_drillable());
        assert!(!MemberKind::Header.is_drillable());
    }

    #[test]
    fn test_vertical_centerline_projection() {
        let stud = FramingMember::from_centerline(
            &wall(),
            MemberKind::Stud,
            &Point3D::new(4.0, 0.0, 0.125),
            &Point3D::new(4.0, 0.0, 8.75),
            0.125,
        )
        .unwrap();
        assert!(stud.vertical);
        assert_relative_eq!(stud.bounds.u_min, 3.9375);
        assert_relative_eq!(stud.bounds.u_max, 4.0625);
        assert_relative_eq!(stud.bounds.v_max, 8.75);
    }

    #[test]
    fn test_horizontal_centerline_projection() {
        let plate = FramingMember::from_centerline(
            &wall(),
            MemberKind::BottomPlate,
            &Point3D::new(0.0, 0.0, 0.0625),
            &Point3D::new(10.0, 0.0, 0.0625),
            0.125,
        )
        .unwrap();
        assert!(!plate.vertical);
        assert_relative_eq!(plate.bounds.v_min, 0.0);
        assert_relative_eq!(plate.bounds.v_max, 0.125);
        assert_relative_eq!(plate.bounds.width(), 10.0);
    }

    #[test]
    fn test_cell_codes() {
        assert_eq!(CellKind::parse("oc"), CellKind::Opening);
        assert_eq!(CellKind::parse("HCC"), CellKind::HeaderCripple);
        assert_eq!(CellKind::parse("sill cripple"), CellKind::SillCripple);
        let kind: CellKind = serde_json::from_str("\"SCC\"").unwrap();
        assert_eq!(kind, CellKind::SillCripple);
    }
}

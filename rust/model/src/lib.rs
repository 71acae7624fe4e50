// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # MEP-Lite Model
//!
//! Typed records shared by the routing phases: fixture connectors, walls with
//! their local (U, V, W) frame, and framing members/cells projected into
//! wall-local space. Everything here is immutable input to routing; the
//! untyped JSON boundary lives in `mep-lite-processing`.

pub mod connector;
pub mod error;
pub mod framing;
pub mod geometry;
pub mod systems;
pub mod wall;

pub use connector::Connector;
pub use error::{Error, Result};
pub use framing::{CellKind, FramingCell, FramingMember, MemberKind};
pub use geometry::{Point3D, UvRect, GEOM_TOLERANCE};
pub use systems::{FixtureType, SystemType};
pub use wall::{BasePlane, Wall, WallFrame, WallLocal, WallRecord};

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixture connectors: the sources of MEP demand

use crate::error::{Error, Result};
use crate::geometry::Point3D;
use crate::systems::{FixtureType, SystemType};
use serde::{Deserialize, Serialize};

/// A point where MEP service enters or leaves a fixture
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connector {
    pub id: String,
    pub origin: Point3D,
    pub system_type: SystemType,
    /// Pipe radius in feet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture_type: Option<FixtureType>,
}

impl Connector {
    pub fn new(id: impl Into<String>, origin: Point3D, system_type: SystemType) -> Self {
        Self {
            id: id.into(),
            origin,
            system_type,
            radius: None,
            fixture_type: None,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_fixture(mut self, fixture: FixtureType) -> Self {
        self.fixture_type = Some(fixture);
        self
    }

    /// Reject records routing cannot reason about
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::MissingField("id"));
        }
        if !self.origin.is_finite() {
            return Err(Error::InvalidField {
                field: "origin",
                reason: format!("non-finite coordinates for connector '{}'", self.id),
            });
        }
        if let Some(radius) = self.radius {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(Error::InvalidDimension {
                    name: "radius",
                    value: radius,
                });
            }
        }
        Ok(())
    }
}

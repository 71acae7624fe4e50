// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Routing configuration
//!
//! All lengths are in feet. Defaults describe residential 2x4 framing at
//! 16" on center with a single bottom plate and a double top plate.

use serde::{Deserialize, Serialize};

/// One inch in feet
pub const INCH: f64 = 1.0 / 12.0;

/// Smallest nominal stud pitch the derived tier will lay out
const MIN_STUD_PITCH: f64 = INCH;

/// Configuration shared by both routing phases
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    /// Maximum perpendicular distance from a connector to an accepted wall
    pub search_radius: f64,
    /// Nominal stud spacing used when no framing has been generated
    pub stud_spacing: f64,
    /// Stud profile width along the wall
    pub stud_width: f64,
    pub bottom_plate_thickness: f64,
    /// Double top plate by default
    pub top_plate_thickness: f64,
    /// Used when a connector carries no radius
    pub default_pipe_radius: f64,
    /// Gap kept between a pipe surface and anything else in the cavity
    pub pipe_clearance: f64,
    /// Vertical run-out before a horizontal jog when a shift at entry height is blocked
    pub jog_offset: f64,
    /// Derived bays narrower than this merge into their neighbor
    pub min_cavity_width: f64,
    /// Route walls on the rayon pool
    pub parallel: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            search_radius: 5.0,
            stud_spacing: 16.0 * INCH,
            stud_width: 1.5 * INCH,
            bottom_plate_thickness: 1.5 * INCH,
            top_plate_thickness: 3.0 * INCH,
            default_pipe_radius: 0.75 * INCH,
            pipe_clearance: 0.25 * INCH,
            jog_offset: 2.0 * INCH,
            min_cavity_width: 1.5 * INCH,
            parallel: true,
        }
    }
}

impl RoutingConfig {
    pub fn with_search_radius(mut self, radius: f64) -> Self {
        self.search_radius = radius;
        self
    }

    /// Stud spacing actually used for derived cavities
    ///
    /// Spacings too tight to leave a `min_cavity_width` bay between studs,
    /// and non-finite or non-positive values, are raised to the smallest
    /// pitch that does.
    pub fn stud_pitch(&self) -> f64 {
        let floor = (self.stud_width + self.min_cavity_width).max(MIN_STUD_PITCH);
        if self.stud_spacing.is_finite() && self.stud_spacing > floor {
            self.stud_spacing
        } else {
            floor
        }
    }

    /// Half-width of the footprint a pipe of `radius` claims
    pub fn pipe_half_width(&self, radius: Option<f64>) -> f64 {
        radius.unwrap_or(self.default_pipe_radius) + self.pipe_clearance
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # MEP-Lite Routing
//!
//! Hierarchical routing of plumbing (and low-voltage) connections into wall
//! cavities.
//!
//! ## Overview
//!
//! - **Phase 1** ([`fixture_router`]): each fixture connector is assigned a
//!   penetration point on the nearest wall face, or on the floor, according
//!   to its [connection profile](profiles)
//! - **Cavity decomposition** ([`cavity`]): each wall is split into stud bays
//!   from nominal spacing, real framing, or framing cells
//! - **Phase 2** ([`wall_router`]): each penetration is routed inside its
//!   cavity to the top or bottom plate, avoiding studs, obstructions and
//!   previously routed pipes
//!
//! Nothing here fails on domain problems. Unassigned connectors and
//! unrouted penetrations come back with reasons and a `needs_input` status.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mep_lite_routing::{route_fixtures_to_walls, route_in_wall, decompose_walls, RoutingConfig};
//!
//! let config = RoutingConfig::default();
//! let phase1 = route_fixtures_to_walls(&connectors, &walls, config.search_radius);
//! let cavities = decompose_walls(&walls, Some(&framing), None, &config);
//! let phase2 = route_in_wall(&phase1, &walls, &cavities, &config);
//!
//! for route in &phase2.routes {
//!     println!("{} -> {:?}", route.connector_id, route.exit_edge);
//! }
//! ```

pub mod cavity;
pub mod config;
pub mod fixture_router;
pub mod occupancy;
pub mod profiles;
pub mod stats;
pub mod wall_router;

pub use cavity::{
    decompose_wall_into_cavities, decompose_walls, CavitiesByWall, Cavity, CavityDecomposition,
    CavityKind, CavitySource, Obstruction, ObstructionKind,
};
pub use config::{RoutingConfig, INCH};
pub use fixture_router::{
    find_nearest_wall, route_fixtures_to_walls, route_fixtures_with_profiles,
    FixtureRoutingResult, PenetrationResult, RoutingStatus, Side, UnassignedConnector,
    FLOOR_TARGET_ID,
};
pub use occupancy::{Occupancy, Segment};
pub use profiles::{lookup, ConnectionProfile, ConnectionProfileTable, RoutingTarget};
pub use stats::{summarize_fixture_routing, summarize_wall_routing, DistanceSummary, RoutingStats};
pub use wall_router::{
    route_in_wall, ExitEdge, RouteKind, UnroutedPenetration, WallRoute, WallRoutingResult,
};

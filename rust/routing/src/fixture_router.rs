// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Phase 1: fixture-to-penetration routing
//!
//! Each connector is projected onto the nearest wall face (or dropped to the
//! floor) according to its connection profile. A fixture-to-wall connection
//! is a single nearest-surface relationship, so this is plain projection:
//!
//! 1. Look up the connection profile for (fixture, system)
//! 2. Floor targets: emit a penetration straight below the connector at the
//!    estimated floor elevation
//! 3. Wall targets: apply the profile's origin drop, project onto every wall
//!    frame, keep projections inside the face and within the search radius,
//!    and pick the smallest perpendicular distance
//! 4. Anything left over is reported as unassigned with a reason

use crate::profiles::{ConnectionProfileTable, RoutingTarget};
use mep_lite_model::{Connector, FixtureType, Point3D, SystemType, Wall};
use serde::{Deserialize, Serialize};

/// `wall_id` used for floor penetrations
pub const FLOOR_TARGET_ID: &str = "floor";

/// Which face of the wall a connector sits on (sign of W)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Interior,
    Exterior,
}

impl Side {
    pub fn from_w(w: f64) -> Self {
        if w > 0.0 {
            Side::Interior
        } else {
            Side::Exterior
        }
    }
}

/// Whether a phase needs user action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStatus {
    Ready,
    NeedsInput,
}

impl RoutingStatus {
    /// `Ready` iff nothing failed
    pub fn from_failures(failures: usize) -> Self {
        if failures == 0 {
            RoutingStatus::Ready
        } else {
            RoutingStatus::NeedsInput
        }
    }
}

/// Where a connector's pipe passes through a wall or floor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PenetrationResult {
    pub connector_id: String,
    pub system_type: SystemType,
    /// Target wall id, or `"floor"`
    pub wall_id: String,
    /// World-space penetration point
    pub location: Point3D,
    /// Wall-local (U, V); plan (X, Y) for floor targets
    pub wall_uv: [f64; 2],
    /// Perpendicular distance from connector to surface
    pub distance: f64,
    pub side: Side,
    pub connector_origin: Point3D,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture_type: Option<FixtureType>,
    pub target: RoutingTarget,
}

impl PenetrationResult {
    pub fn is_floor(&self) -> bool {
        self.target == RoutingTarget::Floor
    }
}

/// A connector no wall or floor target could be found for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnassignedConnector {
    pub connector_id: String,
    pub system_type: SystemType,
    pub origin: Point3D,
    pub reason: String,
}

/// Complete output of Phase 1
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixtureRoutingResult {
    pub penetrations: Vec<PenetrationResult>,
    pub unassigned: Vec<UnassignedConnector>,
    pub status: RoutingStatus,
    /// Actionable guidance, one entry per unassigned connector
    pub needs: Vec<String>,
}

impl FixtureRoutingResult {
    pub fn is_ready(&self) -> bool {
        self.status == RoutingStatus::Ready
    }

    pub fn penetrations_for_wall<'a>(
        &'a self,
        wall_id: &'a str,
    ) -> impl Iterator<Item = &'a PenetrationResult> + 'a {
        self.penetrations.iter().filter(move |p| p.wall_id == wall_id)
    }
}

/// A wall projection that passed the bounds test
#[derive(Debug, Clone, Copy)]
pub struct WallHit<'a> {
    pub wall: &'a Wall,
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

impl WallHit<'_> {
    pub fn distance(&self) -> f64 {
        self.w.abs()
    }
}

/// Outcome of the nearest-wall search
#[derive(Debug, Clone, Copy)]
pub enum WallSearch<'a> {
    Found(WallHit<'a>),
    /// No in-bounds wall within the radius; carries the nearest in-bounds
    /// wall beyond it, if any
    OutOfRange(Option<WallHit<'a>>),
}

/// Project a point onto a wall, accepting it only inside the wall face
pub fn project_onto_wall<'a>(point: &Point3D, wall: &'a Wall) -> Option<WallHit<'a>> {
    let local = wall.to_local(point);
    let inside = local.u >= 0.0
        && local.u <= wall.length
        && local.v >= 0.0
        && local.v <= wall.height;
    inside.then_some(WallHit {
        wall,
        u: local.u,
        v: local.v,
        w: local.w,
    })
}

/// Nearest in-bounds wall by perpendicular distance
///
/// Equal distances keep the first wall in input order.
pub fn find_nearest_wall<'a>(
    point: &Point3D,
    walls: &'a [Wall],
    search_radius: f64,
) -> WallSearch<'a> {
    let mut best: Option<WallHit<'a>> = None;
    let mut nearest_beyond: Option<WallHit<'a>> = None;

    for hit in walls.iter().filter_map(|wall| project_onto_wall(point, wall)) {
        let d = hit.distance();
        if d <= search_radius {
            if best.map_or(true, |b| d < b.distance()) {
                best = Some(hit);
            }
        } else if nearest_beyond.map_or(true, |b| d < b.distance()) {
            nearest_beyond = Some(hit);
        }
    }

    match best {
        Some(hit) => WallSearch::Found(hit),
        None => WallSearch::OutOfRange(nearest_beyond),
    }
}

/// Lowest wall base elevation, or 0.0 without walls
pub fn estimate_floor_elevation(walls: &[Wall]) -> f64 {
    walls
        .iter()
        .map(|w| w.base_elevation)
        .reduce(f64::min)
        .unwrap_or(0.0)
}

/// Route connectors using the standard connection profile table
pub fn route_fixtures_to_walls(
    connectors: &[Connector],
    walls: &[Wall],
    search_radius: f64,
) -> FixtureRoutingResult {
    route_fixtures_with_profiles(
        connectors,
        walls,
        search_radius,
        &ConnectionProfileTable::standard(),
    )
}

/// Route connectors using an explicit profile table
pub fn route_fixtures_with_profiles(
    connectors: &[Connector],
    walls: &[Wall],
    search_radius: f64,
    profiles: &ConnectionProfileTable,
) -> FixtureRoutingResult {
    tracing::info!(
        connectors = connectors.len(),
        walls = walls.len(),
        search_radius,
        "Starting fixture-to-wall routing"
    );

    let floor_elevation = estimate_floor_elevation(walls);
    let mut penetrations = Vec::with_capacity(connectors.len());
    let mut unassigned = Vec::new();
    let mut needs = Vec::new();

    for connector in connectors {
        if let Err(e) = connector.validate() {
            tracing::warn!(connector_id = %connector.id, error = %e, "Skipping malformed connector");
            continue;
        }

        match route_connector(connector, walls, search_radius, floor_elevation, profiles) {
            Ok(penetration) => penetrations.push(penetration),
            Err(miss) => {
                needs.push(need_for(&miss, walls.is_empty()));
                unassigned.push(miss);
            }
        }
    }

    let status = RoutingStatus::from_failures(unassigned.len());
    tracing::info!(
        penetrations = penetrations.len(),
        unassigned = unassigned.len(),
        ?status,
        "Fixture routing complete"
    );

    FixtureRoutingResult {
        penetrations,
        unassigned,
        status,
        needs,
    }
}

fn route_connector(
    connector: &Connector,
    walls: &[Wall],
    search_radius: f64,
    floor_elevation: f64,
    profiles: &ConnectionProfileTable,
) -> Result<PenetrationResult, UnassignedConnector> {
    let profile = profiles.lookup(connector.fixture_type.as_ref(), &connector.system_type);
    let origin = connector.origin;

    if profile.target == RoutingTarget::Floor {
        tracing::debug!(connector_id = %connector.id, floor_elevation, "Routing connector to floor");
        return Ok(PenetrationResult {
            connector_id: connector.id.clone(),
            system_type: connector.system_type.clone(),
            wall_id: FLOOR_TARGET_ID.to_string(),
            location: Point3D::new(origin.x, origin.y, floor_elevation),
            wall_uv: [origin.x, origin.y],
            distance: (origin.z - floor_elevation).abs(),
            side: Side::Interior,
            connector_origin: origin,
            radius: connector.radius,
            fixture_type: connector.fixture_type.clone(),
            target: RoutingTarget::Floor,
        });
    }

    let unassigned = |reason: String| UnassignedConnector {
        connector_id: connector.id.clone(),
        system_type: connector.system_type.clone(),
        origin,
        reason,
    };

    if walls.is_empty() {
        return Err(unassigned("No walls provided".to_string()));
    }

    let dropped = Point3D::new(origin.x, origin.y, origin.z - profile.origin_drop);

    match find_nearest_wall(&dropped, walls, search_radius) {
        WallSearch::Found(hit) => {
            tracing::debug!(
                connector_id = %connector.id,
                wall_id = %hit.wall.wall_id,
                u = hit.u,
                v = hit.v,
                distance = hit.distance(),
                "Selected wall"
            );
            let on_face = hit.wall.to_world(hit.u, hit.v);
            Ok(PenetrationResult {
                connector_id: connector.id.clone(),
                system_type: connector.system_type.clone(),
                wall_id: hit.wall.wall_id.clone(),
                location: on_face,
                wall_uv: [hit.u, hit.v],
                distance: hit.distance(),
                side: Side::from_w(hit.w),
                connector_origin: origin,
                radius: connector.radius,
                fixture_type: connector.fixture_type.clone(),
                target: RoutingTarget::Wall,
            })
        }
        WallSearch::OutOfRange(nearest) => {
            let mut reason = format!("No wall within {:.1} ft", search_radius);
            if let Some(hit) = nearest {
                reason.push_str(&format!(
                    " (nearest wall '{}' is {:.2} ft away)",
                    hit.wall.wall_id,
                    hit.distance()
                ));
            }
            Err(unassigned(reason))
        }
    }
}

fn need_for(miss: &UnassignedConnector, no_walls: bool) -> String {
    let o = &miss.origin;
    let hint = if no_walls {
        "Add walls to the model so wall-mounted connections have a target"
    } else {
        "Increase search_radius or add a wall near this fixture"
    };
    format!(
        "Connector '{}' ({}) at ({:.2}, {:.2}, {:.2}): {}. {}",
        miss.connector_id, miss.system_type, o.x, o.y, o.z, miss.reason, hint
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wall(id: &str, origin: (f64, f64, f64), dir: (f64, f64, f64)) -> Wall {
        Wall::from_direction(
            id,
            Point3D::new(origin.0, origin.1, origin.2),
            Point3D::new(dir.0, dir.1, dir.2),
            10.0,
            9.0,
        )
        .unwrap()
    }

    fn connector(id: &str, x: f64, y: f64, z: f64, system: SystemType) -> Connector {
        Connector::new(id, Point3D::new(x, y, z), system)
    }

    #[test]
    fn test_direct_hit() {
        let walls = vec![wall("w1", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0))];
        let c = connector("c1", 5.0, -1.0, 4.0, SystemType::DomesticColdWater);
        let result = route_fixtures_to_walls(&[c], &walls, 5.0);

        assert_eq!(result.status, RoutingStatus::Ready);
        assert!(result.needs.is_empty());
        let p = &result.penetrations[0];
        assert_eq!(p.wall_id, "w1");
        assert_relative_eq!(p.wall_uv[0], 5.0, epsilon = 0.01);
        assert_relative_eq!(p.wall_uv[1], 4.0, epsilon = 0.01);
        assert_relative_eq!(p.distance, 1.0, epsilon = 0.01);
        assert_eq!(p.side, Side::Interior);
        assert_eq!(p.target, RoutingTarget::Wall);
        assert_relative_eq!(p.location.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_opposite_face_is_exterior() {
        let walls = vec![wall("w1", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0))];
        let c = connector("c1", 5.0, 1.5, 4.0, SystemType::Vent);
        let result = route_fixtures_to_walls(&[c], &walls, 5.0);
        assert_eq!(result.penetrations[0].side, Side::Exterior);
        assert_relative_eq!(result.penetrations[0].distance, 1.5);
    }

    #[test]
    fn test_bounds_rejection() {
        let walls = vec![wall("w1", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0))];
        let outside = vec![
            connector("neg-u", -0.5, -1.0, 4.0, SystemType::Vent),
            connector("big-u", 10.5, -1.0, 4.0, SystemType::Vent),
            connector("neg-v", 5.0, -1.0, -0.5, SystemType::Vent),
            connector("big-v", 5.0, -1.0, 9.5, SystemType::Vent),
        ];
        let result = route_fixtures_to_walls(&outside, &walls, 5.0);
        assert!(result.penetrations.is_empty());
        assert_eq!(result.unassigned.len(), 4);
        assert_eq!(result.needs.len(), 4);
        assert_eq!(result.status, RoutingStatus::NeedsInput);
    }

    #[test]
    fn test_nearest_wall_selection() {
        let walls = vec![
            wall("far", (0.0, -3.0, 0.0), (1.0, 0.0, 0.0)),
            wall("near", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)),
        ];
        let c = connector("c1", 5.0, -1.0, 4.0, SystemType::Vent);
        let result = route_fixtures_to_walls(&[c], &walls, 5.0);
        assert_eq!(result.penetrations[0].wall_id, "near");
        assert_relative_eq!(result.penetrations[0].distance, 1.0);
    }

    #[test]
    fn test_equidistant_walls_keep_first() {
        let walls = vec![
            wall("a", (0.0, -2.0, 0.0), (1.0, 0.0, 0.0)),
            wall("b", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)),
        ];
        let c = connector("c1", 5.0, -1.0, 4.0, SystemType::Vent);
        let result = route_fixtures_to_walls(&[c], &walls, 5.0);
        assert_eq!(result.penetrations[0].wall_id, "a");
    }

    #[test]
    fn test_toilet_drain_routes_to_floor() {
        let walls = vec![wall("w1", (0.0, 0.0, 1.0), (1.0, 0.0, 0.0))];
        let c = connector("wc", 5.0, -0.5, 1.2, SystemType::Sanitary)
            .with_fixture(FixtureType::Toilet);
        let result = route_fixtures_to_walls(&[c], &walls, 5.0);

        assert!(result.unassigned.is_empty());
        let p = &result.penetrations[0];
        assert_eq!(p.wall_id, FLOOR_TARGET_ID);
        assert_eq!(p.target, RoutingTarget::Floor);
        assert_relative_eq!(p.location.z, 1.0);
        assert_eq!(p.wall_uv, [5.0, -0.5]);
        assert_relative_eq!(p.distance, 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_sink_drop_changes_v() {
        let walls = vec![wall("w1", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0))];
        let c = connector("lav", 3.0, -0.75, 2.0, SystemType::Sanitary)
            .with_fixture(FixtureType::Sink);
        let result = route_fixtures_to_walls(&[c], &walls, 5.0);
        let p = &result.penetrations[0];
        assert_relative_eq!(p.wall_uv[1], 1.5);
        assert_relative_eq!(p.location.z, 1.5);
        assert_eq!(p.connector_origin.z, 2.0);
    }

    #[test]
    fn test_out_of_range() {
        let walls = vec![wall("w1", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0))];
        let c = connector("far", 5.0, -50.0, 4.0, SystemType::Vent);
        let result = route_fixtures_to_walls(&[c], &walls, 5.0);
        assert_eq!(result.status, RoutingStatus::NeedsInput);
        assert!(result.unassigned[0].reason.contains("5.0"));
        assert!(result.unassigned[0].reason.contains("'w1'"));
        assert!(result.needs[0].contains("far"));
        assert!(result.needs[0].contains("search_radius"));
    }

    #[test]
    fn test_empty_walls() {
        let c = connector("c1", 1.0, 1.0, 1.0, SystemType::DomesticHotWater);
        let result = route_fixtures_to_walls(&[c], &[], 5.0);
        assert_eq!(result.status, RoutingStatus::NeedsInput);
        assert_eq!(result.unassigned.len(), 1);
        assert_eq!(result.unassigned[0].reason, "No walls provided");
        assert_eq!(result.needs.len(), 1);
    }

    #[test]
    fn test_empty_walls_floor_connector_still_routes() {
        let c = connector("fd", 1.0, 1.0, 0.3, SystemType::Sanitary)
            .with_fixture(FixtureType::FloorDrain);
        let result = route_fixtures_to_walls(&[c], &[], 5.0);
        assert!(result.is_ready());
        assert_eq!(result.penetrations[0].location.z, 0.0);
    }

    #[test]
    fn test_empty_connectors_is_ready() {
        let walls = vec![wall("w1", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0))];
        let result = route_fixtures_to_walls(&[], &walls, 5.0);
        assert_eq!(result.status, RoutingStatus::Ready);
        assert!(result.penetrations.is_empty());
        assert!(result.unassigned.is_empty());
    }

    #[test]
    fn test_malformed_connector_is_skipped() {
        let walls = vec![wall("w1", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0))];
        let bad = connector("bad", f64::NAN, 0.0, 0.0, SystemType::Vent);
        let good = connector("good", 5.0, -1.0, 4.0, SystemType::Vent);
        let result = route_fixtures_to_walls(&[bad, good], &walls, 5.0);
        assert_eq!(result.penetrations.len(), 1);
        assert_eq!(result.penetrations[0].connector_id, "good");
        assert!(result.unassigned.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let walls = vec![wall("w1", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0))];
        let c = connector("c1", 5.0, -1.0, 4.0, SystemType::Vent).with_radius(0.1);
        let result = route_fixtures_to_walls(&[c], &walls, 5.0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["penetrations"][0]["side"], "interior");
        assert_eq!(json["penetrations"][0]["target"], "wall");
        assert_eq!(json["penetrations"][0]["system_type"], "Vent");
        assert_eq!(json["penetrations"][0]["radius"], 0.1);
        assert!(json["penetrations"][0].get("fixture_type").is_none());
    }
}

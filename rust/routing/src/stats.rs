// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Routing statistics
//!
//! Pure summaries of a phase result. Counters are `BTreeMap`s so the JSON
//! output is ordered and stable between runs.

use crate::fixture_router::{FixtureRoutingResult, PenetrationResult};
use crate::profiles::RoutingTarget;
use crate::wall_router::{RouteKind, UnroutedPenetration, WallRoute, WallRoutingResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key used when a record has no fixture type
const NO_FIXTURE: &str = "none";

/// Min/avg/max over a set of lengths; zeros when empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceSummary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl DistanceSummary {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        if count == 0 {
            return Self::default();
        }
        Self {
            min,
            avg: sum / count as f64,
            max,
        }
    }
}

/// Counts and distances for one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingStats {
    pub total: usize,
    /// Assigned (Phase 1) or routed (Phase 2)
    pub succeeded: usize,
    pub failed: usize,
    /// `succeeded / total`, 1.0 when there was nothing to route
    pub success_rate: f64,
    pub by_wall: BTreeMap<String, usize>,
    pub by_system: BTreeMap<String, usize>,
    pub by_target: BTreeMap<String, usize>,
    pub by_fixture: BTreeMap<String, usize>,
    pub distance: DistanceSummary,
    pub jogged: usize,
    pub straight: usize,
    pub floor_passthrough: usize,
}

impl Default for RoutingStats {
    fn default() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            success_rate: 1.0,
            by_wall: BTreeMap::new(),
            by_system: BTreeMap::new(),
            by_target: BTreeMap::new(),
            by_fixture: BTreeMap::new(),
            distance: DistanceSummary::default(),
            jogged: 0,
            straight: 0,
            floor_passthrough: 0,
        }
    }
}

impl RoutingStats {
    fn set_totals(&mut self, succeeded: usize, failed: usize) {
        self.succeeded = succeeded;
        self.failed = failed;
        self.total = succeeded + failed;
        self.success_rate = if self.total == 0 {
            1.0
        } else {
            succeeded as f64 / self.total as f64
        };
    }
}

fn bump(map: &mut BTreeMap<String, usize>, key: &str) {
    *map.entry(key.to_string()).or_insert(0) += 1;
}

/// Summarize Phase 1; distances are perpendicular connector offsets
pub fn summarize_fixture_routing(result: &FixtureRoutingResult) -> RoutingStats {
    let mut stats = RoutingStats::default();
    stats.set_totals(result.penetrations.len(), result.unassigned.len());

    for p in &result.penetrations {
        bump(&mut stats.by_wall, &p.wall_id);
        bump(&mut stats.by_system, p.system_type.as_str());
        bump(&mut stats.by_target, p.target.as_str());
        bump(&mut stats.by_fixture, fixture_key(p));
        if p.is_floor() {
            stats.floor_passthrough += 1;
        }
    }
    stats.distance = DistanceSummary::from_values(result.penetrations.iter().map(|p| p.distance));
    stats
}

fn fixture_key(p: &PenetrationResult) -> &str {
    p.fixture_type.as_ref().map_or(NO_FIXTURE, |f| f.as_str())
}

/// Summarize Phase 2; distances are in-wall route lengths
pub fn summarize_wall_routing(result: &WallRoutingResult) -> RoutingStats {
    summarize_wall_routes(&result.routes, &result.unrouted)
}

pub fn summarize_wall_routes(routes: &[WallRoute], unrouted: &[UnroutedPenetration]) -> RoutingStats {
    let mut stats = RoutingStats::default();
    stats.set_totals(routes.len(), unrouted.len());

    for r in routes {
        bump(&mut stats.by_wall, &r.wall_id);
        bump(&mut stats.by_system, r.system_type.as_str());
        bump(
            &mut stats.by_fixture,
            r.fixture_type.as_ref().map_or(NO_FIXTURE, |f| f.as_str()),
        );
        match r.kind {
            RouteKind::InWall => {
                bump(&mut stats.by_target, RoutingTarget::Wall.as_str());
                if r.jogged {
                    stats.jogged += 1;
                } else {
                    stats.straight += 1;
                }
            }
            RouteKind::FloorPassthrough => {
                bump(&mut stats.by_target, RoutingTarget::Floor.as_str());
                stats.floor_passthrough += 1;
            }
        }
    }
    stats.distance =
        DistanceSummary::from_values(routes.iter().filter(|r| r.is_in_wall()).map(|r| r.length));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture_router::route_fixtures_to_walls;
    use approx::assert_relative_eq;
    use mep_lite_model::{Connector, FixtureType, Point3D, SystemType, Wall};

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
    fn test_empty_is_all_zero() {
        let stats = summarize_wall_routes(&[], &[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.success_rate, 1.0);
        assert_eq!(stats.distance, DistanceSummary::default());
        assert!(stats.by_wall.is_empty());
    }

    #[test]
    fn test_distance_summary() {
        let d = DistanceSummary::from_values([1.0, 2.0, 6.0]);
        assert_relative_eq!(d.min, 1.0);
        assert_relative_eq!(d.avg, 3.0);
        assert_relative_eq!(d.max, 6.0);
    }

    #[test]
    fn test_fixture_routing_counts() {
        let connectors = vec![
            Connector::new("c1", Point3D::new(5.0, -1.0, 4.0), SystemType::DomesticColdWater),
            Connector::new("c2", Point3D::new(3.0, -2.0, 4.0), SystemType::Sanitary)
                .with_fixture(FixtureType::Toilet),
            Connector::new("c3", Point3D::new(5.0, -50.0, 4.0), SystemType::Vent),
        ];
        let result = route_fixtures_to_walls(&connectors, &[wall()], 5.0);
        let stats = summarize_fixture_routing(&result);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 1);
        assert_relative_eq!(stats.success_rate, 2.0 / 3.0);
        assert_eq!(stats.by_wall["w1"], 1);
        assert_eq!(stats.by_wall["floor"], 1);
        assert_eq!(stats.by_target["floor"], 1);
        assert_eq!(stats.by_fixture["toilet"], 1);
        assert_eq!(stats.by_fixture[NO_FIXTURE], 1);
        assert_eq!(stats.floor_passthrough, 1);
        assert_relative_eq!(stats.distance.min, 1.0, epsilon = 1e-9);
        assert_relative_eq!(stats.distance.max, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_phases_share_target_keys() {
        use crate::cavity::CavitiesByWall;
        use crate::config::RoutingConfig;
        use crate::wall_router::route_in_wall;

        let connectors = vec![
            Connector::new("c1", Point3D::new(5.0, -1.0, 4.0), SystemType::DomesticColdWater),
            Connector::new("c2", Point3D::new(3.0, -2.0, 4.0), SystemType::Sanitary)
                .with_fixture(FixtureType::Toilet),
        ];
        let phase1 = route_fixtures_to_walls(&connectors, &[wall()], 5.0);
        let phase2 = route_in_wall(&phase1, &[wall()], &CavitiesByWall::default(), &RoutingConfig::default());

        let fixture_stats = summarize_fixture_routing(&phase1);
        let wall_stats = summarize_wall_routing(&phase2);
        assert_eq!(fixture_stats.by_target, wall_stats.by_target);
        assert_eq!(wall_stats.by_target[RoutingTarget::Wall.as_str()], 1);
        assert_eq!(wall_stats.by_target[RoutingTarget::Floor.as_str()], 1);
    }

    #[test]
    fn test_json_keys_are_sorted() {
        let result = route_fixtures_to_walls(
            &[
                Connector::new("b", Point3D::new(5.0, -1.0, 4.0), SystemType::Vent),
                Connector::new("a", Point3D::new(6.0, -1.0, 4.0), SystemType::Sanitary),
            ],
            &[wall()],
            5.0,
        );
        let json = serde_json::to_string(&summarize_fixture_routing(&result)).unwrap();
        let sanitary = json.find("\"Sanitary\"").unwrap();
        let vent = json.find("\"Vent\"").unwrap();
        assert!(sanitary < vent);
    }
}

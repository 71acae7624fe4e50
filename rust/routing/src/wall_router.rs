// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Phase 2: cavity-based in-wall routing
//!
//! Every wall penetration from Phase 1 gets a path from its entry point to
//! the plate its system exits through. Cavities are narrow vertical
//! corridors, so the search is a straight drop first and a single horizontal
//! jog second:
//!
//! 1. Pick the exit edge from the system type (fixed policy)
//! 2. Find the cavity containing the entry; snap off a stud if the entry
//!    sits outside the cavity's clear range
//! 3. Straight drop when the vertical strip is free
//! 4. Otherwise shift horizontally to the nearest free U in the same cavity
//!    and drop from there; if the shift at entry height is blocked, run out
//!    `jog_offset` toward the exit first
//! 5. Claim the accepted path in the wall's occupancy tracker
//!
//! Walls are independent, so each wall is one unit of rayon work with its
//! own occupancy state.

use crate::cavity::{
    decompose_wall_into_cavities, CavitiesByWall, Cavity, CavityDecomposition, CavityKind,
};
use crate::config::RoutingConfig;
use crate::fixture_router::{
    FixtureRoutingResult, PenetrationResult, RoutingStatus,
};
use crate::occupancy::{free_intervals, Occupancy, Uv};
use crate::stats::{summarize_wall_routes, RoutingStats};
use mep_lite_model::{FixtureType, Point3D, SystemType, Wall, GEOM_TOLERANCE};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::borrow::Cow;

/// Plate a pipe leaves the wall through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitEdge {
    Bottom,
    Top,
}

impl ExitEdge {
    /// Drains and supplies go down, vents and low-voltage/power runs go up
    pub fn for_system(system: &SystemType) -> Self {
        if system.is_vent() || system.is_electrical() {
            ExitEdge::Top
        } else {
            ExitEdge::Bottom
        }
    }

    /// Wall-local V of the exit plate
    pub fn v(&self, wall_height: f64) -> f64 {
        match self {
            ExitEdge::Bottom => 0.0,
            ExitEdge::Top => wall_height,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExitEdge::Bottom => "bottom",
            ExitEdge::Top => "top",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    InWall,
    /// Floor-target penetration carried through unchanged
    FloorPassthrough,
}

/// A routed pipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WallRoute {
    pub connector_id: String,
    pub wall_id: String,
    pub system_type: SystemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture_type: Option<FixtureType>,
    pub radius: f64,
    pub kind: RouteKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_edge: Option<ExitEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cavity_id: Option<String>,
    /// Phase 1 penetration point
    pub penetration: Point3D,
    /// World-space polyline: 2 points for a straight drop, 3 or 4 with a jog
    ///
    /// Starts at `penetration` unless the entry was snapped off a stud, in
    /// which case it starts at the shifted entry.
    pub points: SmallVec<[Point3D; 4]>,
    /// Same polyline in wall-local (U, V); empty for floor passthroughs
    pub points_uv: SmallVec<[[f64; 2]; 4]>,
    pub length: f64,
    pub jogged: bool,
    pub snapped_off_stud: bool,
}

impl WallRoute {
    pub fn is_in_wall(&self) -> bool {
        self.kind == RouteKind::InWall
    }
}

/// A wall penetration that could not be routed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnroutedPenetration {
    pub connector_id: String,
    pub wall_id: String,
    pub system_type: SystemType,
    pub location: Point3D,
    pub reason: String,
}

/// Complete output of Phase 2
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WallRoutingResult {
    pub routes: Vec<WallRoute>,
    pub unrouted: Vec<UnroutedPenetration>,
    pub status: RoutingStatus,
    pub stats: RoutingStats,
}

impl WallRoutingResult {
    pub fn is_ready(&self) -> bool {
        self.status == RoutingStatus::Ready
    }

    pub fn routes_for_wall<'a>(&'a self, wall_id: &'a str) -> impl Iterator<Item = &'a WallRoute> + 'a {
        self.routes.iter().filter(move |r| r.wall_id == wall_id)
    }
}

enum Outcome {
    Routed(WallRoute),
    Unrouted(UnroutedPenetration),
}

/// A wall and its penetrations, tagged with their input index
type WallJob<'a> = (&'a Wall, Vec<(usize, &'a PenetrationResult)>);

/// Route every penetration inside its wall
///
/// `cavities_by_wall` may be partial; walls without an entry use the derived
/// decomposition.
pub fn route_in_wall(
    penetrations: &FixtureRoutingResult,
    walls: &[Wall],
    cavities_by_wall: &CavitiesByWall,
    config: &RoutingConfig,
) -> WallRoutingResult {
    tracing::info!(
        penetrations = penetrations.penetrations.len(),
        walls = walls.len(),
        decomposed = cavities_by_wall.len(),
        "Starting in-wall routing"
    );

    let mut walls_by_id: FxHashMap<&str, &Wall> = FxHashMap::default();
    for wall in walls {
        walls_by_id.entry(wall.wall_id.as_str()).or_insert(wall);
    }

    let mut outcomes: Vec<(usize, Outcome)> = Vec::with_capacity(penetrations.penetrations.len());
    let mut jobs: Vec<WallJob> = Vec::new();
    let mut job_index: FxHashMap<&str, usize> = FxHashMap::default();

    for (i, pen) in penetrations.penetrations.iter().enumerate() {
        if pen.is_floor() {
            outcomes.push((i, Outcome::Routed(floor_passthrough(pen, config))));
            continue;
        }
        match walls_by_id.get(pen.wall_id.as_str()) {
            Some(&wall) => {
                let slot = *job_index.entry(pen.wall_id.as_str()).or_insert_with(|| {
                    jobs.push((wall, Vec::new()));
                    jobs.len() - 1
                });
                jobs[slot].1.push((i, pen));
            }
            None => {
                tracing::warn!(
                    connector_id = %pen.connector_id,
                    wall_id = %pen.wall_id,
                    "Penetration references unknown wall"
                );
                outcomes.push((
                    i,
                    Outcome::Unrouted(unrouted(pen, format!("Wall '{}' not found", pen.wall_id))),
                ));
            }
        }
    }

    let per_wall: Vec<Vec<(usize, Outcome)>> = if config.parallel {
        jobs.par_iter()
            .map(|job| route_job(job, cavities_by_wall, config))
            .collect()
    } else {
        jobs.iter()
            .map(|job| route_job(job, cavities_by_wall, config))
            .collect()
    };
    outcomes.extend(per_wall.into_iter().flatten());
    outcomes.sort_by_key(|(i, _)| *i);

    let mut routes = Vec::new();
    let mut unrouted_list = Vec::new();
    for (_, outcome) in outcomes {
        match outcome {
            Outcome::Routed(r) => routes.push(r),
            Outcome::Unrouted(u) => unrouted_list.push(u),
        }
    }

    let status = RoutingStatus::from_failures(unrouted_list.len());
    let stats = summarize_wall_routes(&routes, &unrouted_list);
    tracing::info!(
        routes = routes.len(),
        unrouted = unrouted_list.len(),
        jogged = stats.jogged,
        ?status,
        "In-wall routing complete"
    );

    WallRoutingResult {
        routes,
        unrouted: unrouted_list,
        status,
        stats,
    }
}

fn route_job(
    (wall, pens): &WallJob<'_>,
    cavities_by_wall: &CavitiesByWall,
    config: &RoutingConfig,
) -> Vec<(usize, Outcome)> {
    let decomposition = match cavities_by_wall.get(&wall.wall_id) {
        Some(d) => Cow::Borrowed(d),
        None => Cow::Owned(decompose_wall_into_cavities(wall, None, None, config)),
    };
    route_wall(wall, &decomposition, pens, config)
}

/// Drains claim space first, then vents, then supplies
fn route_priority(system: &SystemType) -> u8 {
    if system.is_drain() {
        0
    } else if system.is_vent() {
        1
    } else if system.is_supply() {
        2
    } else {
        3
    }
}

fn route_wall(
    wall: &Wall,
    decomposition: &CavityDecomposition,
    pens: &[(usize, &PenetrationResult)],
    config: &RoutingConfig,
) -> Vec<(usize, Outcome)> {
    let mut occupancy = Occupancy::with_obstructions(decomposition.obstructions.iter().map(|o| o.bounds));
    let mut ordered = pens.to_vec();
    ordered.sort_by_key(|(_, pen)| route_priority(&pen.system_type));

    ordered
        .into_iter()
        .map(|(i, pen)| {
            let outcome = match route_penetration(wall, decomposition, &mut occupancy, pen, config) {
                Ok(route) => Outcome::Routed(route),
                Err(reason) => {
                    tracing::debug!(connector_id = %pen.connector_id, wall_id = %wall.wall_id, %reason, "Penetration unrouted");
                    Outcome::Unrouted(unrouted(pen, reason))
                }
            };
            (i, outcome)
        })
        .collect()
}

/// Cavity holding the entry point, preferring a routable one on shared edges
fn entry_cavity<'a>(decomposition: &'a CavityDecomposition, u: f64, v: f64) -> Option<&'a Cavity> {
    decomposition
        .cavities
        .iter()
        .filter(|c| c.bounds.contains(u, v))
        .find(|c| c.is_routable())
        .or_else(|| decomposition.cavity_at(u, v))
}

fn route_penetration(
    wall: &Wall,
    decomposition: &CavityDecomposition,
    occupancy: &mut Occupancy,
    pen: &PenetrationResult,
    config: &RoutingConfig,
) -> Result<WallRoute, String> {
    let [u0, v0] = pen.wall_uv;
    let radius = pen.radius.unwrap_or(config.default_pipe_radius);
    let h = radius + config.pipe_clearance;
    let exit = ExitEdge::for_system(&pen.system_type);
    let v_exit = exit.v(wall.height);

    let cavity = entry_cavity(decomposition, u0, v0)
        .ok_or_else(|| format!("No cavity found at U={:.3}, V={:.3}", u0, v0))?;
    if cavity.kind == CavityKind::Opening {
        return Err(format!(
            "Entry at U={:.3}, V={:.3} falls inside opening cavity {}",
            u0, v0, cavity.cavity_id
        ));
    }

    let lo = cavity.clear.u_min + h;
    let hi = cavity.clear.u_max - h;
    if hi < lo - GEOM_TOLERANCE {
        return Err(format!(
            "Cavity {} is too narrow for a {:.3} ft radius pipe (clear width {:.3} ft)",
            cavity.cavity_id,
            radius,
            cavity.clear.width()
        ));
    }
    let hi = hi.max(lo);

    let mut start_u = u0.clamp(lo, hi);
    let snapped = (start_u - u0).abs() > GEOM_TOLERANCE;

    // An entry on a stud also moves off a claimed strip when one is free
    if snapped {
        let blocked = occupancy.blocked_u_intervals(v0, v_exit, h);
        if let Some(&u) = nearest_free(u0, lo, hi, &blocked).first() {
            start_u = u;
        }
    }

    let entry = Uv::new(start_u, v0);
    let straight = [entry, Uv::new(start_u, v_exit)];

    let (path, jogged): (SmallVec<[Uv; 4]>, bool) = if occupancy.path_is_clear(&straight, h) {
        (SmallVec::from_slice(&straight), false)
    } else {
        match jog_path(occupancy, entry, v_exit, lo, hi, h, config.jog_offset) {
            Some(candidate) => (candidate, true),
            None => {
                return Err(format!(
                    "No collision-free path in cavity {} toward the {} plate",
                    cavity.cavity_id,
                    exit.as_str()
                ))
            }
        }
    };

    occupancy.claim_path(&pen.connector_id, &path, h);

    let length: f64 = path.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    tracing::debug!(
        connector_id = %pen.connector_id,
        cavity_id = %cavity.cavity_id,
        exit = exit.as_str(),
        jogged,
        snapped,
        length,
        "Routed penetration"
    );

    Ok(WallRoute {
        connector_id: pen.connector_id.clone(),
        wall_id: wall.wall_id.clone(),
        system_type: pen.system_type.clone(),
        fixture_type: pen.fixture_type.clone(),
        radius,
        kind: RouteKind::InWall,
        penetration: pen.location,
        exit_edge: Some(exit),
        cavity_id: Some(cavity.cavity_id.clone()),
        points: path.iter().map(|p| wall.to_world(p.x, p.y)).collect(),
        points_uv: path.iter().map(|p| [p.x, p.y]).collect(),
        length,
        jogged,
        snapped_off_stud: snapped,
    })
}

/// Sideways jog to the nearest free U in `[lo, hi]`
///
/// Shifting at the entry height comes first. A run-out of `jog_offset`
/// toward the exit before the shift is the fallback for when the
/// entry-height leg itself is blocked.
fn jog_path(
    occupancy: &Occupancy,
    entry: Uv,
    v_exit: f64,
    lo: f64,
    hi: f64,
    h: f64,
    jog_offset: f64,
) -> Option<SmallVec<[Uv; 4]>> {
    let (u0, v0) = (entry.x, entry.y);

    let blocked = occupancy.blocked_u_intervals(v0, v_exit, h);
    let sideways = nearest_free(u0, lo, hi, &blocked)
        .into_iter()
        .filter(|u| (u - u0).abs() > GEOM_TOLERANCE)
        .map(|u| SmallVec::from_slice(&[entry, Uv::new(u, v0), Uv::new(u, v_exit)]))
        .find(|candidate: &SmallVec<[Uv; 4]>| occupancy.path_is_clear(candidate, h));
    if sideways.is_some() {
        return sideways;
    }

    let vj = if v_exit < v0 {
        (v0 - jog_offset).max(v_exit)
    } else {
        (v0 + jog_offset).min(v_exit)
    };
    let stub = Uv::new(u0, vj);
    let blocked = occupancy.blocked_u_intervals(vj, v_exit, h);
    nearest_free(u0, lo, hi, &blocked)
        .into_iter()
        .filter(|u| (u - u0).abs() > GEOM_TOLERANCE)
        .map(|u| SmallVec::from_slice(&[entry, stub, Uv::new(u, vj), Uv::new(u, v_exit)]))
        .find(|candidate: &SmallVec<[Uv; 4]>| occupancy.path_is_clear(candidate, h))
}

/// Nearest point of each free interval in `[lo, hi]`, closest first
fn nearest_free(target: f64, lo: f64, hi: f64, blocked: &[(f64, f64)]) -> Vec<f64> {
    let mut candidates: Vec<f64> = free_intervals(lo, hi, blocked)
        .into_iter()
        .map(|(a, b)| target.clamp(a, b))
        .collect();
    candidates.sort_by(|a, b| (a - target).abs().total_cmp(&(b - target).abs()));
    candidates
}

fn floor_passthrough(pen: &PenetrationResult, config: &RoutingConfig) -> WallRoute {
    let points: SmallVec<[Point3D; 4]> = SmallVec::from_slice(&[pen.connector_origin, pen.location]);
    WallRoute {
        connector_id: pen.connector_id.clone(),
        wall_id: pen.wall_id.clone(),
        system_type: pen.system_type.clone(),
        fixture_type: pen.fixture_type.clone(),
        radius: pen.radius.unwrap_or(config.default_pipe_radius),
        kind: RouteKind::FloorPassthrough,
        penetration: pen.location,
        exit_edge: None,
        cavity_id: None,
        length: pen.connector_origin.distance_to(&pen.location),
        points,
        points_uv: SmallVec::new(),
        jogged: false,
        snapped_off_stud: false,
    }
}

fn unrouted(pen: &PenetrationResult, reason: String) -> UnroutedPenetration {
    UnroutedPenetration {
        connector_id: pen.connector_id.clone(),
        wall_id: pen.wall_id.clone(),
        system_type: pen.system_type.clone(),
        location: pen.location,
        reason,
    }
}

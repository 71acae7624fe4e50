// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cavity Decomposer
//!
//! Partitions a wall face into rectangular cavities (voids between framing
//! members) that Phase 2 routes pipes through. Precision depends on which
//! data is available:
//!
//! - `Derived`: nominal stud spacing only, before any framing exists
//! - `FromFraming`: exact stud positions and widths from generated framing
//! - `FromCells`: framing (or derived) bays split again at the cell
//!   boundaries of openings and cripple zones
//!
//! Whatever the tier, the cavities partition `[0, length] x [0, height]`:
//! adjacent cavities share an edge, never overlap, and leave no gaps.
//! Partition edges sit on stud centerlines; the routable "clear" rectangle
//! inside each cavity stops at stud faces and plates.

use crate::config::RoutingConfig;
use mep_lite_model::{
    CellKind, FramingCell, FramingMember, MemberKind, UvRect, Wall, GEOM_TOLERANCE,
};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Full-height threshold for vertical members that bound a bay
const FULL_HEIGHT_RATIO: f64 = 0.9;

/// Decompositions keyed by wall id
pub type CavitiesByWall = FxHashMap<String, CavityDecomposition>;

/// Which data tier produced a decomposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CavitySource {
    #[serde(rename = "derived")]
    Derived,
    #[serde(rename = "framing")]
    FromFraming,
    #[serde(rename = "cells")]
    FromCells,
}

impl CavitySource {
    /// Highest tier the available inputs support
    pub fn select(has_framing: bool, has_cells: bool) -> Self {
        match (has_framing, has_cells) {
            (_, true) => CavitySource::FromCells,
            (true, false) => CavitySource::FromFraming,
            (false, false) => CavitySource::Derived,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CavitySource::Derived => "derived",
            CavitySource::FromFraming => "framing",
            CavitySource::FromCells => "cells",
        }
    }
}

/// What occupies a cavity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CavityKind {
    StudBay,
    SillCripple,
    HeaderCripple,
    Opening,
}

impl CavityKind {
    fn from_cell(kind: CellKind) -> Option<Self> {
        match kind {
            CellKind::Opening => Some(CavityKind::Opening),
            CellKind::SillCripple => Some(CavityKind::SillCripple),
            CellKind::HeaderCripple => Some(CavityKind::HeaderCripple),
            CellKind::StudCell => Some(CavityKind::StudBay),
            CellKind::Other => None,
        }
    }

    fn priority(&self) -> u8 {
        match self {
            CavityKind::Opening => 3,
            CavityKind::SillCripple | CavityKind::HeaderCripple => 2,
            CavityKind::StudBay => 1,
        }
    }
}

/// A rectangular void in wall-local space
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cavity {
    pub cavity_id: String,
    pub wall_id: String,
    /// Partition rectangle
    pub bounds: UvRect,
    /// Routable interior between stud faces and plates
    pub clear: UvRect,
    pub kind: CavityKind,
    pub source: CavitySource,
}

impl Cavity {
    pub fn is_routable(&self) -> bool {
        self.kind != CavityKind::Opening && self.clear.width() > GEOM_TOLERANCE
    }
}

/// Origin of an obstruction rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "member")]
pub enum ObstructionKind {
    Member(MemberKind),
    Opening,
}

/// Something a pipe may not pass through inside a cavity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Obstruction {
    pub bounds: UvRect,
    pub kind: ObstructionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Cavities and obstructions for one wall
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CavityDecomposition {
    pub wall_id: String,
    pub obstacle_source: CavitySource,
    /// Sorted by (u_min, v_min)
    pub cavities: Vec<Cavity>,
    pub obstructions: Vec<Obstruction>,
}

impl CavityDecomposition {
    /// Cavity whose partition rectangle contains (u, v)
    ///
    /// Points on a shared edge resolve to the left (then lower) cavity.
    pub fn cavity_at(&self, u: f64, v: f64) -> Option<&Cavity> {
        self.cavities.iter().find(|c| c.bounds.contains(u, v))
    }

    pub fn routable(&self) -> impl Iterator<Item = &Cavity> {
        self.cavities.iter().filter(|c| c.is_routable())
    }

    pub fn len(&self) -> usize {
        self.cavities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cavities.is_empty()
    }
}

/// A stud bay before it becomes a cavity
#[derive(Debug, Clone, Copy)]
struct Bay {
    span: (f64, f64),
    clear: (f64, f64),
}

/// Decompose one wall into cavities
///
/// Framing members and cells belonging to other walls are ignored, so callers
/// may pass whole-model lists.
pub fn decompose_wall_into_cavities(
    wall: &Wall,
    framing_elements: Option<&[FramingMember]>,
    cell_data: Option<&[FramingCell]>,
    config: &RoutingConfig,
) -> CavityDecomposition {
    let members: Vec<&FramingMember> = framing_elements
        .unwrap_or(&[])
        .iter()
        .filter(|m| m.wall_id == wall.wall_id)
        .collect();
    let cells: Vec<&FramingCell> = cell_data
        .unwrap_or(&[])
        .iter()
        .filter(|c| c.wall_id == wall.wall_id && c.bounds.area() > GEOM_TOLERANCE)
        .collect();

    let source = CavitySource::select(!members.is_empty(), !cells.is_empty());
    let base_source = if members.is_empty() {
        CavitySource::Derived
    } else {
        CavitySource::FromFraming
    };

    let (bays, clear_v, mut obstructions) = match base_source {
        CavitySource::FromFraming => framing_bays(wall, &members, config),
        _ => (
            derived_bays(wall, config),
            default_clear_v(wall, config),
            Vec::new(),
        ),
    };

    let mut cavities: Vec<Cavity> = bays
        .iter()
        .map(|bay| Cavity {
            cavity_id: String::new(),
            wall_id: wall.wall_id.clone(),
            bounds: UvRect::new(bay.span.0, bay.span.1, 0.0, wall.height),
            clear: UvRect::new(bay.clear.0, bay.clear.1, clear_v.0, clear_v.1),
            kind: CavityKind::StudBay,
            source,
        })
        .collect();

    if source == CavitySource::FromCells {
        cavities = refine_with_cells(cavities, &cells, &mut obstructions);
    }

    cavities.sort_by(|a, b| {
        a.bounds
            .u_min
            .total_cmp(&b.bounds.u_min)
            .then(a.bounds.v_min.total_cmp(&b.bounds.v_min))
    });
    for (i, cavity) in cavities.iter_mut().enumerate() {
        cavity.cavity_id = format!("{}:c{}", wall.wall_id, i);
    }

    tracing::debug!(
        wall_id = %wall.wall_id,
        source = source.as_str(),
        cavities = cavities.len(),
        obstructions = obstructions.len(),
        "Decomposed wall into cavities"
    );

    CavityDecomposition {
        wall_id: wall.wall_id.clone(),
        obstacle_source: source,
        cavities,
        obstructions,
    }
}

/// Decompose every wall in parallel
pub fn decompose_walls(
    walls: &[Wall],
    framing_elements: Option<&[FramingMember]>,
    cell_data: Option<&[FramingCell]>,
    config: &RoutingConfig,
) -> CavitiesByWall {
    walls
        .par_iter()
        .map(|wall| {
            (
                wall.wall_id.clone(),
                decompose_wall_into_cavities(wall, framing_elements, cell_data, config),
            )
        })
        .collect()
}

fn default_clear_v(wall: &Wall, config: &RoutingConfig) -> (f64, f64) {
    ordered_within(
        config.bottom_plate_thickness,
        wall.height - config.top_plate_thickness,
        0.0,
        wall.height,
    )
}

/// Clamp `(lo, hi)` into `[min, max]`, collapsing inverted ranges to a point
fn ordered_within(lo: f64, hi: f64, min: f64, max: f64) -> (f64, f64) {
    let lo = lo.clamp(min, max);
    let hi = hi.clamp(min, max);
    if hi < lo {
        let mid = (lo + hi) / 2.0;
        (mid, mid)
    } else {
        (lo, hi)
    }
}

/// Tier 1: studs at nominal spacing with end studs flush to the wall ends
fn derived_bays(wall: &Wall, config: &RoutingConfig) -> Vec<Bay> {
    let length = wall.length;
    let w = config.stud_width.min(length / 2.0);
    let pitch = config.stud_pitch();
    let mut studs = vec![(0.0, w)];

    let end_face = length - w;
    let mut k = 1.0;
    loop {
        let center = k * pitch;
        let right_face = center + w / 2.0;
        if !(end_face - right_face >= config.min_cavity_width) {
            break;
        }
        studs.push((center - w / 2.0, right_face));
        k += 1.0;
    }
    studs.push((length - w, length));

    bays_from_obstacles(length, merge_intervals(studs))
}

/// Tier 2: bays bounded by full-height vertical members
fn framing_bays(
    wall: &Wall,
    members: &[&FramingMember],
    config: &RoutingConfig,
) -> (Vec<Bay>, (f64, f64), Vec<Obstruction>) {
    let bottom = members
        .iter()
        .filter(|m| m.kind == MemberKind::BottomPlate)
        .map(|m| m.bounds.v_max)
        .reduce(f64::max)
        .unwrap_or(config.bottom_plate_thickness);
    let top = members
        .iter()
        .filter(|m| m.kind == MemberKind::TopPlate)
        .map(|m| m.bounds.v_min)
        .reduce(f64::min)
        .unwrap_or(wall.height - config.top_plate_thickness);
    let clear_v = ordered_within(bottom, top, 0.0, wall.height);
    let clear_height = clear_v.1 - clear_v.0;

    let mut studs = Vec::new();
    let mut obstructions = Vec::new();

    for member in members {
        let full_height = member.vertical
            && !member.kind.is_plate()
            && member.bounds.height() >= FULL_HEIGHT_RATIO * clear_height;

        if full_height {
            studs.push((
                member.bounds.u_min.max(0.0),
                member.bounds.u_max.min(wall.length),
            ));
        } else if !member.kind.is_drillable() {
            let face = UvRect::new(0.0, wall.length, 0.0, wall.height);
            if let Some(bounds) = member.bounds.intersection(&face) {
                obstructions.push(Obstruction {
                    bounds,
                    kind: ObstructionKind::Member(member.kind),
                    label: member.element_id.clone(),
                });
            }
        }
    }

    studs.retain(|(a, b)| b - a > GEOM_TOLERANCE);
    studs.sort_by(|a, b| a.0.total_cmp(&b.0));
    (
        bays_from_obstacles(wall.length, merge_intervals(studs)),
        clear_v,
        obstructions,
    )
}

/// Merge overlapping or touching intervals; input sorted by start
fn merge_intervals(intervals: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(intervals.len());
    for (a, b) in intervals {
        match merged.last_mut() {
            Some(last) if a <= last.1 + GEOM_TOLERANCE => last.1 = last.1.max(b),
            _ => merged.push((a, b)),
        }
    }
    merged
}

/// Turn merged stud bodies into bays
///
/// Each gap between bodies is a bay's clear range. Bay edges sit at body
/// midpoints, except that bodies touching a wall end extend the bay to the
/// end itself.
fn bays_from_obstacles(length: f64, obstacles: Vec<(f64, f64)>) -> Vec<Bay> {
    let edge = |(a, b): (f64, f64)| -> f64 {
        if a <= GEOM_TOLERANCE {
            0.0
        } else if b >= length - GEOM_TOLERANCE {
            length
        } else {
            (a + b) / 2.0
        }
    };

    let mut bays = Vec::new();
    let mut prev: Option<(f64, f64)> = None;

    for &obstacle in &obstacles {
        let gap_start = prev.map_or(0.0, |p| p.1);
        if obstacle.0 - gap_start > GEOM_TOLERANCE {
            bays.push(Bay {
                span: (prev.map_or(0.0, edge), edge(obstacle)),
                clear: (gap_start, obstacle.0),
            });
        }
        prev = Some(obstacle);
    }

    let tail_start = prev.map_or(0.0, |p| p.1);
    if length - tail_start > GEOM_TOLERANCE {
        bays.push(Bay {
            span: (prev.map_or(0.0, edge), length),
            clear: (tail_start, length),
        });
    }

    if bays.is_empty() {
        // Solid framing across the whole face
        return vec![Bay {
            span: (0.0, length),
            clear: (length / 2.0, length / 2.0),
        }];
    }

    bays
}

/// Tier 3: split bays at cell boundaries and label the pieces
fn refine_with_cells(
    base: Vec<Cavity>,
    cells: &[&FramingCell],
    obstructions: &mut Vec<Obstruction>,
) -> Vec<Cavity> {
    let mut out = Vec::with_capacity(base.len());

    for cavity in base {
        let overlapping: Vec<&FramingCell> = cells
            .iter()
            .copied()
            .filter(|c| c.bounds.overlaps(&cavity.bounds))
            .collect();
        if overlapping.is_empty() {
            out.push(cavity);
            continue;
        }

        let b = cavity.bounds;
        let us = cut_points(
            b.u_min,
            b.u_max,
            overlapping.iter().flat_map(|c| [c.bounds.u_min, c.bounds.u_max]),
        );
        let vs = cut_points(
            b.v_min,
            b.v_max,
            overlapping.iter().flat_map(|c| [c.bounds.v_min, c.bounds.v_max]),
        );

        for uw in us.windows(2) {
            let mut column: Vec<Cavity> = Vec::new();
            for vw in vs.windows(2) {
                let rect = UvRect::new(uw[0], uw[1], vw[0], vw[1]);
                let kind = classify_piece(&rect, &overlapping).unwrap_or(cavity.kind);

                if let Some(last) = column.last_mut().filter(|last| last.kind == kind) {
                    last.bounds.v_max = rect.v_max;
                    continue;
                }
                column.push(Cavity {
                    bounds: rect,
                    kind,
                    ..cavity.clone()
                });
            }

            for piece in &mut column {
                piece.clear = clip_clear(&piece.bounds, &cavity.clear);
                if piece.kind == CavityKind::Opening {
                    obstructions.push(Obstruction {
                        bounds: piece.bounds,
                        kind: ObstructionKind::Opening,
                        label: None,
                    });
                }
            }
            out.extend(column);
        }
    }
    out
}

/// Sorted, deduplicated cut positions including both ends
fn cut_points(lo: f64, hi: f64, candidates: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut cuts: Vec<f64> = candidates
        .filter(|&x| x > lo + GEOM_TOLERANCE && x < hi - GEOM_TOLERANCE)
        .collect();
    cuts.push(lo);
    cuts.push(hi);
    cuts.sort_by(f64::total_cmp);
    cuts.dedup_by(|a, b| (*a - *b).abs() <= GEOM_TOLERANCE);
    cuts
}

/// Highest-priority cell kind covering the piece center
fn classify_piece(rect: &UvRect, cells: &[&FramingCell]) -> Option<CavityKind> {
    let (cu, cv) = rect.center();
    cells
        .iter()
        .filter(|c| c.bounds.contains(cu, cv))
        .filter_map(|c| CavityKind::from_cell(c.kind))
        .max_by_key(|k| k.priority())
}

fn clip_clear(piece: &UvRect, clear: &UvRect) -> UvRect {
    let (u0, u1) = ordered_within(clear.u_min, clear.u_max, piece.u_min, piece.u_max);
    let (v0, v1) = ordered_within(clear.v_min, clear.v_max, piece.v_min, piece.v_max);
    UvRect::new(u0, u1, v0, v1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::INCH;
    use mep_lite_model::Point3D;

    fn wall(length: f64) -> Wall {
        Wall::from_direction(
            "w1",
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            length,
            9.0,
        )
        .unwrap()
    }

    /// Partition invariant: disjoint rectangles whose areas sum to the face
    fn assert_partition(wall: &Wall, decomposition: &CavityDecomposition) {
        let cavities = &decomposition.cavities;
        let total: f64 = cavities.iter().map(|c| c.bounds.area()).sum();
        assert!(
            (total - wall.length * wall.height).abs() < 1e-6,
            "area {} != {}",
            total,
            wall.length * wall.height
        );
        for (i, a) in cavities.iter().enumerate() {
            for b in &cavities[i + 1..] {
                assert!(
                    !a.bounds.overlaps(&b.bounds),
                    "{} overlaps {}",
                    a.cavity_id,
                    b.cavity_id
                );
            }
        }
    }

    /// Full-height bays: U-ranges chain from 0 to length
    fn assert_u_chain(wall: &Wall, decomposition: &CavityDecomposition) {
        let cavities = &decomposition.cavities;
        assert!(cavities[0].bounds.u_min.abs() < 1e-9);
        assert!((cavities.last().unwrap().bounds.u_max - wall.length).abs() < 1e-9);
        for pair in cavities.windows(2) {
            assert!((pair[0].bounds.u_max - pair[1].bounds.u_min).abs() < 1e-9);
        }
    }

    #[test]
    fn test_derived_tier() {
        let wall = wall(10.0);
        let config = RoutingConfig::default();
        let d = decompose_wall_into_cavities(&wall, None, None, &config);

        assert_eq!(d.obstacle_source, CavitySource::Derived);
        // Seven interior studs at 16" o.c. plus two end studs
        assert_eq!(d.cavities.len(), 8);
        assert_partition(&wall, &d);
        assert_u_chain(&wall, &d);

        let first = &d.cavities[0];
        assert!((first.clear.u_min - config.stud_width).abs() < 1e-9);
        assert!((first.bounds.u_max - config.stud_spacing).abs() < 1e-9);
        assert!((first.clear.v_min - config.bottom_plate_thickness).abs() < 1e-9);
        assert!((first.clear.v_max - (9.0 - config.top_plate_thickness)).abs() < 1e-9);
        assert_eq!(first.cavity_id, "w1:c0");
        assert!(d.cavities.iter().all(|c| c.is_routable()));
    }

    #[test]
    fn test_derived_tier_merges_sliver_bay() {
        // 16" o.c. would put the fourth stud against the end stud
        let length = 3.0 * 16.0 * INCH + 2.0 * INCH;
        let wall = wall(length);
        let d = decompose_wall_into_cavities(&wall, None, None, &RoutingConfig::default());
        assert_partition(&wall, &d);
        assert_u_chain(&wall, &d);
        for cavity in &d.cavities {
            assert!(cavity.clear.width() >= RoutingConfig::default().min_cavity_width - 1e-9);
        }
    }

    #[test]
    fn test_tight_spacing_is_clamped() {
        let wall = wall(10.0);
        let config = RoutingConfig {
            stud_spacing: 1e-9,
            ..RoutingConfig::default()
        };
        let d = decompose_wall_into_cavities(&wall, None, None, &config);
        assert_partition(&wall, &d);
        assert_u_chain(&wall, &d);
        assert!(d.cavities.len() <= (wall.length / config.stud_pitch()).ceil() as usize + 1);
        assert!(d.cavities.iter().all(|c| c.is_routable()));
    }

    #[test]
    fn test_tiny_wall_single_cavity() {
        let wall = wall(0.2);
        let d = decompose_wall_into_cavities(&wall, None, None, &RoutingConfig::default());
        assert_partition(&wall, &d);
        assert_eq!(d.cavities.len(), 1);
    }

    fn framed_wall_members() -> Vec<FramingMember> {
        let w = 1.5 * INCH;
        vec![
            FramingMember::horizontal_at("w1", MemberKind::BottomPlate, 0.0, 8.0, w / 2.0, w),
            FramingMember::horizontal_at("w1", MemberKind::TopPlate, 0.0, 8.0, 9.0 - w, 2.0 * w),
            FramingMember::vertical_at("w1", MemberKind::Stud, w / 2.0, w, 9.0 - 2.0 * w, w),
            FramingMember::vertical_at("w1", MemberKind::Stud, 2.0, w, 9.0 - 2.0 * w, w),
            FramingMember::vertical_at("w1", MemberKind::KingStud, 4.0, w, 9.0 - 2.0 * w, w),
            FramingMember::vertical_at("w1", MemberKind::KingStud, 4.0 + w, w, 9.0 - 2.0 * w, w),
            FramingMember::vertical_at("w1", MemberKind::Stud, 8.0 - w / 2.0, w, 9.0 - 2.0 * w, w),
            FramingMember::vertical_at("w1", MemberKind::Cripple, 5.0, w, 2.5, w),
            FramingMember::horizontal_at("w1", MemberKind::Header, 4.2, 7.0, 7.0, 0.5),
            // Another wall's stud must be ignored
            FramingMember::vertical_at("other", MemberKind::Stud, 3.0, 0.0, 9.0, w),
        ]
    }

    #[test]
    fn test_framing_tier() {
        let wall = wall(8.0);
        let members = framed_wall_members();
        let d = decompose_wall_into_cavities(&wall, Some(&members), None, &RoutingConfig::default());

        assert_eq!(d.obstacle_source, CavitySource::FromFraming);
        assert_partition(&wall, &d);
        assert_u_chain(&wall, &d);
        // Bodies: end, 2.0, doubled king at 4.0, end -> three bays
        assert_eq!(d.cavities.len(), 3);
        assert!((d.cavities[0].bounds.u_max - 2.0).abs() < 1e-9);
        assert!((d.cavities[0].clear.u_max - (2.0 - 0.75 * INCH)).abs() < 1e-9);
        // Merged double king stud boundary sits at its midpoint
        let mid = (4.0 - 0.75 * INCH + 4.0 + 2.25 * INCH) / 2.0;
        assert!((d.cavities[1].bounds.u_max - mid).abs() < 1e-9);
        // Plates set the clear height
        assert!((d.cavities[0].clear.v_min - 1.5 * INCH).abs() < 1e-9);
        assert!((d.cavities[0].clear.v_max - (9.0 - 3.0 * INCH)).abs() < 1e-9);
        // Cripple and header become obstructions, plates do not
        assert_eq!(d.obstructions.len(), 2);
        assert!(d
            .obstructions
            .iter()
            .all(|o| o.kind != ObstructionKind::Member(MemberKind::BottomPlate)));
    }

    #[test]
    fn test_cell_tier_splits_at_opening() {
        let wall = wall(8.0);
        let members = framed_wall_members();
        let cells = vec![
            FramingCell::new("w1", CellKind::SillCripple, UvRect::new(4.25, 7.5, 0.0, 3.0)),
            FramingCell::new("w1", CellKind::Opening, UvRect::new(4.25, 7.5, 3.0, 6.75)),
            FramingCell::new("w1", CellKind::HeaderCripple, UvRect::new(4.25, 7.5, 6.75, 9.0)),
        ];
        let d = decompose_wall_into_cavities(
            &wall,
            Some(&members),
            Some(&cells),
            &RoutingConfig::default(),
        );

        assert_eq!(d.obstacle_source, CavitySource::FromCells);
        assert_partition(&wall, &d);

        let opening = d
            .cavities
            .iter()
            .find(|c| c.kind == CavityKind::Opening)
            .expect("opening cavity");
        assert!(!opening.is_routable());
        assert!((opening.bounds.v_min - 3.0).abs() < 1e-9);
        assert!((opening.bounds.v_max - 6.75).abs() < 1e-9);
        assert!(d
            .obstructions
            .iter()
            .any(|o| o.kind == ObstructionKind::Opening));

        let below = d.cavity_at(5.0, 1.0).unwrap();
        assert_eq!(below.kind, CavityKind::SillCripple);
        assert!(below.is_routable());
        let above = d.cavity_at(5.0, 8.0).unwrap();
        assert_eq!(above.kind, CavityKind::HeaderCripple);
        // Left of the opening the bay is untouched
        assert_eq!(d.cavity_at(1.0, 4.0).unwrap().kind, CavityKind::StudBay);
    }

    #[test]
    fn test_cells_on_derived_base() {
        let wall = wall(10.0);
        let cells = vec![FramingCell::new(
            "w1",
            CellKind::Opening,
            UvRect::new(3.0, 6.0, 3.0, 7.0),
        )];
        let d = decompose_wall_into_cavities(&wall, None, Some(&cells), &RoutingConfig::default());
        assert_eq!(d.obstacle_source, CavitySource::FromCells);
        assert_partition(&wall, &d);
        assert_eq!(d.cavity_at(4.5, 5.0).unwrap().kind, CavityKind::Opening);
        assert_eq!(d.cavity_at(4.5, 1.0).unwrap().kind, CavityKind::StudBay);
    }

    #[test]
    fn test_decompose_walls_keys_by_id() {
        let walls = vec![wall(10.0), {
            let mut w = wall(4.0);
            w.wall_id = "w2".into();
            w
        }];
        let by_wall = decompose_walls(&walls, None, None, &RoutingConfig::default());
        assert_eq!(by_wall.len(), 2);
        assert_eq!(by_wall["w2"].wall_id, "w2");
        assert!(by_wall["w2"].cavities.iter().all(|c| c.wall_id == "w2"));
    }

    #[test]
    fn test_source_serializes_as_tier_name() {
        assert_eq!(
            serde_json::to_string(&CavitySource::FromFraming).unwrap(),
            "\"framing\""
        );
        assert_eq!(CavitySource::select(true, false), CavitySource::FromFraming);
        assert_eq!(CavitySource::select(false, true), CavitySource::FromCells);
        assert_eq!(CavitySource::select(false, false), CavitySource::Derived);
    }
}

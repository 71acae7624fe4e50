// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-wall occupancy tracking for Phase 2
//!
//! Routed pipes are stored as wall-local segments with a half-width (pipe
//! radius plus clearance). Two footprints collide when their centerlines come
//! closer than the sum of their half-widths. Fixed obstructions (headers,
//! cripples, openings) live in the same structure so one query covers both.

use mep_lite_model::{UvRect, GEOM_TOLERANCE};
use nalgebra::Point2;

/// A point in wall-local (U, V)
pub type Uv = Point2<f64>;

/// A straight wall-local segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Uv,
    pub b: Uv,
}

impl Segment {
    pub fn new(a: Uv, b: Uv) -> Self {
        Self { a, b }
    }

    pub fn vertical(u: f64, v0: f64, v1: f64) -> Self {
        Self::new(Uv::new(u, v0), Uv::new(u, v1))
    }

    pub fn horizontal(v: f64, u0: f64, u1: f64) -> Self {
        Self::new(Uv::new(u0, v), Uv::new(u1, v))
    }

    pub fn length(&self) -> f64 {
        (self.b - self.a).norm()
    }

    pub fn bounds(&self) -> UvRect {
        UvRect::new(self.a.x, self.b.x, self.a.y, self.b.y)
    }

    pub fn distance_to_point(&self, p: &Uv) -> f64 {
        let d = self.b - self.a;
        let len_sq = d.norm_squared();
        if len_sq < GEOM_TOLERANCE * GEOM_TOLERANCE {
            return (p - self.a).norm();
        }
        let t = ((p - self.a).dot(&d) / len_sq).clamp(0.0, 1.0);
        (p - (self.a + d * t)).norm()
    }

    pub fn distance_to_segment(&self, other: &Segment) -> f64 {
        if self.intersects(other) {
            return 0.0;
        }
        self.distance_to_point(&other.a)
            .min(self.distance_to_point(&other.b))
            .min(other.distance_to_point(&self.a))
            .min(other.distance_to_point(&self.b))
    }

    pub fn distance_to_rect(&self, rect: &UvRect) -> f64 {
        if rect.contains(self.a.x, self.a.y) || rect.contains(self.b.x, self.b.y) {
            return 0.0;
        }
        let corners = [
            Uv::new(rect.u_min, rect.v_min),
            Uv::new(rect.u_max, rect.v_min),
            Uv::new(rect.u_max, rect.v_max),
            Uv::new(rect.u_min, rect.v_max),
        ];
        (0..4)
            .map(|i| self.distance_to_segment(&Segment::new(corners[i], corners[(i + 1) % 4])))
            .fold(f64::INFINITY, f64::min)
    }

    /// Intersection test, touching included
    fn intersects(&self, other: &Segment) -> bool {
        let d1 = orient(&other.a, &other.b, &self.a);
        let d2 = orient(&other.a, &other.b, &self.b);
        let d3 = orient(&self.a, &self.b, &other.a);
        let d4 = orient(&self.a, &self.b, &other.b);

        if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
            && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
        {
            return true;
        }

        (d1 == 0.0 && on_segment(&other.a, &other.b, &self.a))
            || (d2 == 0.0 && on_segment(&other.a, &other.b, &self.b))
            || (d3 == 0.0 && on_segment(&self.a, &self.b, &other.a))
            || (d4 == 0.0 && on_segment(&self.a, &self.b, &other.b))
    }
}

fn orient(a: &Uv, b: &Uv, c: &Uv) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// `p` is collinear with `a`-`b`; check it lies within the segment's box
fn on_segment(a: &Uv, b: &Uv, p: &Uv) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// A claimed pipe segment
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub owner: String,
    pub segment: Segment,
    pub half_width: f64,
}

/// Pipes and obstructions on one wall
///
/// Scoped to a single routing run; never shared between walls.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    footprints: Vec<Footprint>,
    obstructions: Vec<UvRect>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_obstructions(obstructions: impl IntoIterator<Item = UvRect>) -> Self {
        Self {
            footprints: Vec::new(),
            obstructions: obstructions.into_iter().collect(),
        }
    }

    /// Whether a pipe of `half_width` along `segment` touches nothing
    pub fn is_clear(&self, segment: &Segment, half_width: f64) -> bool {
        let hits_obstruction = self
            .obstructions
            .iter()
            .any(|rect| segment.distance_to_rect(rect) < half_width - GEOM_TOLERANCE);
        if hits_obstruction {
            return false;
        }
        !self.footprints.iter().any(|f| {
            segment.distance_to_segment(&f.segment) < half_width + f.half_width - GEOM_TOLERANCE
        })
    }

    pub fn path_is_clear(&self, points: &[Uv], half_width: f64) -> bool {
        points
            .windows(2)
            .all(|w| self.is_clear(&Segment::new(w[0], w[1]), half_width))
    }

    pub fn claim(&mut self, owner: &str, segment: Segment, half_width: f64) {
        self.footprints.push(Footprint {
            owner: owner.to_string(),
            segment,
            half_width,
        });
    }

    pub fn claim_path(&mut self, owner: &str, points: &[Uv], half_width: f64) {
        for w in points.windows(2) {
            self.claim(owner, Segment::new(w[0], w[1]), half_width);
        }
    }

    /// U intervals (open, merged, sorted) where a vertical pipe spanning
    /// `v0..v1` could collide with something
    ///
    /// Conservative near segment ends; callers confirm with [`is_clear`].
    ///
    /// [`is_clear`]: Occupancy::is_clear
    pub fn blocked_u_intervals(&self, v0: f64, v1: f64, half_width: f64) -> Vec<(f64, f64)> {
        let (lo, hi) = (v0.min(v1), v0.max(v1));
        let mut blocked: Vec<(f64, f64)> = Vec::new();

        let mut block = |rect: UvRect, reach: f64| {
            if rect.v_min - reach < hi && rect.v_max + reach > lo {
                blocked.push((rect.u_min - reach, rect.u_max + reach));
            }
        };
        for rect in &self.obstructions {
            block(*rect, half_width);
        }
        for f in &self.footprints {
            block(f.segment.bounds(), half_width + f.half_width);
        }

        blocked.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut merged: Vec<(f64, f64)> = Vec::with_capacity(blocked.len());
        for (a, b) in blocked {
            match merged.last_mut() {
                Some(last) if a <= last.1 => last.1 = last.1.max(b),
                _ => merged.push((a, b)),
            }
        }
        merged
    }

    pub fn footprints(&self) -> &[Footprint] {
        &self.footprints
    }

    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }
}

/// Closed sub-intervals of `[lo, hi]` not covered by `blocked`
///
/// `blocked` must be sorted and merged, as returned by
/// [`Occupancy::blocked_u_intervals`].
pub fn free_intervals(lo: f64, hi: f64, blocked: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if hi < lo {
        return Vec::new();
    }
    let mut free = Vec::new();
    let mut cursor = lo;
    for &(a, b) in blocked {
        if b <= cursor {
            continue;
        }
        if a >= hi {
            break;
        }
        if a > cursor {
            free.push((cursor, a));
        }
        cursor = b;
        if cursor >= hi {
            return free;
        }
    }
    free.push((cursor, hi));
    free
}

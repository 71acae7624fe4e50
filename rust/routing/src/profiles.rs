// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection Profile Table
//!
//! Physical fixture connections differ by fixture: a toilet's closet flange
//! drops straight through the floor, while a sink's P-trap falls a few inches
//! before its arm turns into the wall. These rules live here as data keyed by
//! (fixture type, system type), so the fixture router stays generic.
//!
//! Resolution order:
//! 1. Exact (fixture, system) match
//! 2. The default profile (wall target, no drop)

use mep_lite_model::{FixtureType, SystemType};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Where a connector is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingTarget {
    Wall,
    Floor,
}

impl RoutingTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingTarget::Wall => "wall",
            RoutingTarget::Floor => "floor",
        }
    }
}

/// A connection rule for one (fixture, system) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub fixture_type: FixtureType,
    pub system_type: SystemType,
    pub target: RoutingTarget,
    /// Vertical drop (feet) applied to the connector before wall projection
    pub origin_drop: f64,
    pub description: Cow<'static, str>,
}

const fn profile(
    fixture_type: FixtureType,
    system_type: SystemType,
    target: RoutingTarget,
    origin_drop: f64,
    description: &'static str,
) -> ConnectionProfile {
    ConnectionProfile {
        fixture_type,
        system_type,
        target,
        origin_drop,
        description: Cow::Borrowed(description),
    }
}

/// Returned when no exact rule matches
pub static DEFAULT_PROFILE: ConnectionProfile = profile(
    FixtureType::Other(String::new()),
    SystemType::Other(String::new()),
    RoutingTarget::Wall,
    0.0,
    "Default wall connection",
);

/// Standard residential connection rules
pub static STANDARD_PROFILES: &[ConnectionProfile] = &[
    // Drains
    profile(
        FixtureType::Toilet,
        SystemType::Sanitary,
        RoutingTarget::Floor,
        0.0,
        "Closet flange drops directly through the floor",
    ),
    profile(
        FixtureType::FloorDrain,
        SystemType::Sanitary,
        RoutingTarget::Floor,
        0.0,
        "Floor drain trap sits below the slab or subfloor",
    ),
    profile(
        FixtureType::Shower,
        SystemType::Sanitary,
        RoutingTarget::Floor,
        0.0,
        "Shower drain trap sits below the pan",
    ),
    profile(
        FixtureType::Bathtub,
        SystemType::Sanitary,
        RoutingTarget::Floor,
        0.0,
        "Tub waste and overflow drop through the floor",
    ),
    profile(
        FixtureType::Sink,
        SystemType::Sanitary,
        RoutingTarget::Wall,
        0.5,
        "P-trap drops 6 in before the trap arm turns into the wall",
    ),
    profile(
        FixtureType::Urinal,
        SystemType::Sanitary,
        RoutingTarget::Wall,
        0.0,
        "Wall-hung urinal outlet enters the wall directly",
    ),
    profile(
        FixtureType::WashingMachine,
        SystemType::Sanitary,
        RoutingTarget::Wall,
        0.0,
        "Standpipe in a recessed wall box",
    ),
    profile(
        FixtureType::Dishwasher,
        SystemType::Sanitary,
        RoutingTarget::Wall,
        0.0,
        "Discharge hose ties into the sink tailpiece at the wall",
    ),
    // Cold water
    profile(
        FixtureType::Toilet,
        SystemType::DomesticColdWater,
        RoutingTarget::Wall,
        0.0,
        "Supply stop in the wall behind the tank",
    ),
    profile(
        FixtureType::Sink,
        SystemType::DomesticColdWater,
        RoutingTarget::Wall,
        0.0,
        "Angle stop in the wall below the basin",
    ),
    profile(
        FixtureType::Shower,
        SystemType::DomesticColdWater,
        RoutingTarget::Wall,
        0.0,
        "Valve body in the wet wall",
    ),
    profile(
        FixtureType::Bathtub,
        SystemType::DomesticColdWater,
        RoutingTarget::Wall,
        0.0,
        "Valve body in the wet wall",
    ),
    profile(
        FixtureType::WashingMachine,
        SystemType::DomesticColdWater,
        RoutingTarget::Wall,
        0.0,
        "Valve in the recessed wall box",
    ),
    // Hot water
    profile(
        FixtureType::Sink,
        SystemType::DomesticHotWater,
        RoutingTarget::Wall,
        0.0,
        "Angle stop in the wall below the basin",
    ),
    profile(
        FixtureType::Shower,
        SystemType::DomesticHotWater,
        RoutingTarget::Wall,
        0.0,
        "Valve body in the wet wall",
    ),
    profile(
        FixtureType::Bathtub,
        SystemType::DomesticHotWater,
        RoutingTarget::Wall,
        0.0,
        "Valve body in the wet wall",
    ),
    profile(
        FixtureType::WashingMachine,
        SystemType::DomesticHotWater,
        RoutingTarget::Wall,
        0.0,
        "Valve in the recessed wall box",
    ),
    profile(
        FixtureType::Dishwasher,
        SystemType::DomesticHotWater,
        RoutingTarget::Wall,
        0.0,
        "Supply tees off the sink hot stop",
    ),
];

/// Look up a profile in the standard table
///
/// Never fails: unmatched pairs (and connectors without a fixture type)
/// resolve to [`DEFAULT_PROFILE`].
pub fn lookup(fixture_type: Option<&FixtureType>, system_type: &SystemType) -> &'static ConnectionProfile {
    fixture_type
        .and_then(|fixture| {
            STANDARD_PROFILES
                .iter()
                .find(|p| &p.fixture_type == fixture && &p.system_type == system_type)
        })
        .unwrap_or(&DEFAULT_PROFILE)
}

/// An explicit, indexable profile table
///
/// Built once and passed by reference to the fixture router; there is no
/// global registry to mutate.
#[derive(Debug, Clone)]
pub struct ConnectionProfileTable {
    profiles: Vec<ConnectionProfile>,
    index: FxHashMap<(FixtureType, SystemType), usize>,
    default: ConnectionProfile,
}

impl ConnectionProfileTable {
    /// The standard residential table
    pub fn standard() -> Self {
        Self::with_profiles(STANDARD_PROFILES.to_vec())
    }

    /// Build a table from custom rules; the first rule for a key wins
    pub fn with_profiles(profiles: Vec<ConnectionProfile>) -> Self {
        let mut index = FxHashMap::default();
        for (i, p) in profiles.iter().enumerate() {
            index
                .entry((p.fixture_type.clone(), p.system_type.clone()))
                .or_insert(i);
        }
        Self {
            profiles,
            index,
            default: DEFAULT_PROFILE.clone(),
        }
    }

    /// Replace the fallback profile
    pub fn with_default(mut self, default: ConnectionProfile) -> Self {
        self.default = default;
        self
    }

    pub fn lookup(
        &self,
        fixture_type: Option<&FixtureType>,
        system_type: &SystemType,
    ) -> &ConnectionProfile {
        fixture_type
            .and_then(|fixture| self.index.get(&(fixture.clone(), system_type.clone())))
            .map(|&i| &self.profiles[i])
            .unwrap_or(&self.default)
    }

    pub fn default_profile(&self) -> &ConnectionProfile {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionProfile> {
        self.profiles.iter()
    }
}

impl Default for ConnectionProfileTable {
    fn default() -> Self {
        Self::standard()
    }
}

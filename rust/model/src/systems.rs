// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MEP system and fixture classification
//!
//! Both enums are closed over the values routing cares about and carry an
//! `Other` variant so unknown host values survive a round trip untouched.
//! Parsing is forgiving (case, separators and common Revit spellings);
//! serialization always emits the canonical name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// MEP system a connector belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SystemType {
    Sanitary,
    DomesticColdWater,
    DomesticHotWater,
    Vent,
    Power,
    Lighting,
    Data,
    Other(String),
}

impl SystemType {
    /// Parse a host system name
    pub fn parse(raw: &str) -> Self {
        let key = normalize_key(raw);
        match key.as_str() {
            "sanitary" | "waste" | "soil" | "drain" | "drainage" | "sanitary_drain" => {
                SystemType::Sanitary
            }
            "domesticcoldwater" | "domestic_cold_water" | "cold_water" | "dcw" | "cw" => {
                SystemType::DomesticColdWater
            }
            "domestichotwater" | "domestic_hot_water" | "hot_water" | "dhw" | "hw" => {
                SystemType::DomesticHotWater
            }
            "vent" | "vents" | "venting" | "plumbing_vent" => SystemType::Vent,
            "power" | "electrical" | "power_circuit" => SystemType::Power,
            "lighting" | "lighting_circuit" => SystemType::Lighting,
            "data" | "communication" | "telephone" | "low_voltage" => SystemType::Data,
            _ => SystemType::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SystemType::Sanitary => "Sanitary",
            SystemType::DomesticColdWater => "DomesticColdWater",
            SystemType::DomesticHotWater => "DomesticHotWater",
            SystemType::Vent => "Vent",
            SystemType::Power => "Power",
            SystemType::Lighting => "Lighting",
            SystemType::Data => "Data",
            SystemType::Other(name) => name,
        }
    }

    /// Gravity drainage
    pub fn is_drain(&self) -> bool {
        matches!(self, SystemType::Sanitary)
    }

    /// Pressurized water supply
    pub fn is_supply(&self) -> bool {
        matches!(
            self,
            SystemType::DomesticColdWater | SystemType::DomesticHotWater
        )
    }

    pub fn is_vent(&self) -> bool {
        matches!(self, SystemType::Vent)
    }

    pub fn is_electrical(&self) -> bool {
        matches!(
            self,
            SystemType::Power | SystemType::Lighting | SystemType::Data
        )
    }
}

impl From<String> for SystemType {
    fn from(raw: String) -> Self {
        SystemType::parse(&raw)
    }
}

impl From<&str> for SystemType {
    fn from(raw: &str) -> Self {
        SystemType::parse(raw)
    }
}

impl From<SystemType> for String {
    fn from(system: SystemType) -> Self {
        system.as_str().to_string()
    }
}

impl fmt::Display for SystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized plumbing fixture type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FixtureType {
    Toilet,
    Sink,
    Shower,
    Bathtub,
    Urinal,
    FloorDrain,
    WashingMachine,
    Dishwasher,
    WaterHeater,
    Other(String),
}

impl FixtureType {
    /// Normalize a free-form fixture name
    pub fn parse(raw: &str) -> Self {
        let key = normalize_key(raw);
        match key.as_str() {
            "toilet" | "wc" | "water_closet" | "watercloset" | "closet" => FixtureType::Toilet,
            "sink" | "lavatory" | "lav" | "basin" | "vanity" | "kitchen_sink" => FixtureType::Sink,
            "shower" | "shower_stall" | "shower_pan" => FixtureType::Shower,
            "bathtub" | "tub" | "bath" | "bath_tub" => FixtureType::Bathtub,
            "urinal" => FixtureType::Urinal,
            "floor_drain" | "floordrain" | "fd" => FixtureType::FloorDrain,
            "washing_machine" | "washer" | "clothes_washer" | "laundry" => {
                FixtureType::WashingMachine
            }
            "dishwasher" | "dish_washer" => FixtureType::Dishwasher,
            "water_heater" | "waterheater" | "wh" => FixtureType::WaterHeater,
            _ => FixtureType::Other(key),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FixtureType::Toilet => "toilet",
            FixtureType::Sink => "sink",
            FixtureType::Shower => "shower",
            FixtureType::Bathtub => "bathtub",
            FixtureType::Urinal => "urinal",
            FixtureType::FloorDrain => "floor_drain",
            FixtureType::WashingMachine => "washing_machine",
            FixtureType::Dishwasher => "dishwasher",
            FixtureType::WaterHeater => "water_heater",
            FixtureType::Other(name) => name,
        }
    }
}

impl From<String> for FixtureType {
    fn from(raw: String) -> Self {
        FixtureType::parse(&raw)
    }
}

impl From<&str> for FixtureType {
    fn from(raw: &str) -> Self {
        FixtureType::parse(raw)
    }
}

impl From<FixtureType> for String {
    fn from(fixture: FixtureType) -> Self {
        fixture.as_str().to_string()
    }
}

impl fmt::Display for FixtureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase, trim, and fold spaces/hyphens into underscores
fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

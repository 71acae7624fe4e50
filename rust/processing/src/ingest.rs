// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON ingestion
//!
//! The single place untyped JSON becomes typed connectors, walls, framing
//! members and cells. A payload that is not a list of records is an error;
//! a bad record inside a list is skipped with a warning.

use crate::error::{Error, Result};
use mep_lite_model::{
    CellKind, Connector, FramingCell, FramingMember, MemberKind, Point3D, UvRect, Wall,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record that was skipped during ingestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestWarning {
    /// Which input the record came from (`connectors`, `walls`, ...)
    pub source: String,
    /// Position in the input array
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub message: String,
}

/// Successfully parsed records plus warnings for the rest
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested<T> {
    pub items: Vec<T>,
    pub warnings: Vec<IngestWarning>,
}

impl<T> Ingested<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn skip(&mut self, source: &str, index: usize, record: &Value, message: String) {
        let id = record_id(record);
        tracing::warn!(source, index, id = ?id, %message, "Skipping malformed record");
        self.warnings.push(IngestWarning {
            source: source.to_string(),
            index,
            id,
            message,
        });
    }
}

#[derive(Debug, Deserialize)]
struct Centerline {
    start: Point3D,
    end: Point3D,
}

/// Only the in-plane width matters; `depth` is accepted and ignored
#[derive(Debug, Deserialize)]
struct Profile {
    width: f64,
}

#[derive(Debug, Deserialize)]
struct FramingRecord {
    wall_id: String,
    element_type: String,
    centerline: Centerline,
    profile: Profile,
}

#[derive(Debug, Deserialize)]
struct CellRecord {
    wall_id: String,
    cell_type: String,
    u_start: f64,
    u_end: f64,
    v_start: f64,
    v_end: f64,
}

/// Records in `value`: a bare array, or an object holding one under `key`
fn records<'a>(value: &'a Value, key: &str) -> Result<&'a [Value]> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => match map.get(key) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(Error::InvalidInput(format!(
                "expected an array of {} or an object with a '{}' array",
                key, key
            ))),
        },
        Value::Null => Ok(&[]),
        _ => Err(Error::InvalidInput(format!("expected an array of {}", key))),
    }
}

/// String or numeric field rendered as a string
fn string_field(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Best identifier for a warning
fn record_id(record: &Value) -> Option<String> {
    ["id", "wall_id", "element_id"]
        .iter()
        .find_map(|key| string_field(record, key))
}

/// Parse fixture connectors
pub fn parse_connectors(value: &Value) -> Result<Ingested<Connector>> {
    let mut out = Ingested::new();
    for (index, record) in records(value, "connectors")?.iter().enumerate() {
        let parsed = Connector::deserialize(record)
            .map_err(|e| e.to_string())
            .and_then(|c| c.validate().map(|_| c).map_err(|e| e.to_string()));
        match parsed {
            Ok(connector) => out.items.push(connector),
            Err(message) => out.skip("connectors", index, record, message),
        }
    }
    Ok(out)
}

/// Parse walls; later duplicates of a wall id are skipped
pub fn parse_walls(value: &Value) -> Result<Ingested<Wall>> {
    let mut out: Ingested<Wall> = Ingested::new();
    for (index, record) in records(value, "walls")?.iter().enumerate() {
        match Wall::deserialize(record) {
            Ok(wall) if out.items.iter().any(|w| w.wall_id == wall.wall_id) => out.skip(
                "walls",
                index,
                record,
                format!("duplicate wall_id '{}'", wall.wall_id),
            ),
            Ok(wall) => out.items.push(wall),
            Err(e) => out.skip("walls", index, record, e.to_string()),
        }
    }
    Ok(out)
}

/// Parse framing elements and project them onto their host walls
pub fn parse_framing(value: &Value, walls: &[Wall]) -> Result<Ingested<FramingMember>> {
    let by_id: FxHashMap<&str, &Wall> = walls.iter().map(|w| (w.wall_id.as_str(), w)).collect();
    let mut out = Ingested::new();

    for (index, record) in records(value, "framing")?.iter().enumerate() {
        let parsed = FramingRecord::deserialize(record)
            .map_err(|e| e.to_string())
            .and_then(|r| {
                let wall = by_id
                    .get(r.wall_id.as_str())
                    .ok_or_else(|| format!("unknown wall_id '{}'", r.wall_id))?;
                FramingMember::from_centerline(
                    wall,
                    MemberKind::parse(&r.element_type),
                    &r.centerline.start,
                    &r.centerline.end,
                    r.profile.width,
                )
                .map_err(|e| e.to_string())
            });
        match parsed {
            Ok(member) => {
                let member = match string_field(record, "id") {
                    Some(id) => member.with_id(id),
                    None => member,
                };
                out.items.push(member);
            }
            Err(message) => out.skip("framing", index, record, message),
        }
    }
    Ok(out)
}

/// Parse wall-local framing cells
pub fn parse_cells(value: &Value) -> Result<Ingested<FramingCell>> {
    let mut out = Ingested::new();
    for (index, record) in records(value, "cells")?.iter().enumerate() {
        let parsed = CellRecord::deserialize(record)
            .map_err(|e| e.to_string())
            .and_then(|r| {
                let coords = [r.u_start, r.u_end, r.v_start, r.v_end];
                if coords.iter().any(|c| !c.is_finite()) {
                    return Err("non-finite cell bounds".to_string());
                }
                let mut cell = FramingCell::new(
                    r.wall_id,
                    CellKind::parse(&r.cell_type),
                    UvRect::new(r.u_start, r.u_end, r.v_start, r.v_end),
                );
                cell.cell_id = string_field(record, "id");
                Ok(cell)
            });
        match parsed {
            Ok(cell) => out.items.push(cell),
            Err(message) => out.skip("cells", index, record, message),
        }
    }
    Ok(out)
}

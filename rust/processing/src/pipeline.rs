// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end routing pipeline
//!
//! Typed entry point ([`Pipeline`]) plus JSON-in/JSON-out wrappers that keep
//! the phase output shapes stable for CAD-side callers.

use crate::error::Result;
use crate::ingest::{parse_cells, parse_connectors, parse_framing, parse_walls, IngestWarning};
use mep_lite_model::{Connector, FramingCell, FramingMember, Wall};
use mep_lite_routing::{
    decompose_walls, route_fixtures_with_profiles, route_in_wall, summarize_fixture_routing,
    ConnectionProfileTable, FixtureRoutingResult, RoutingConfig, RoutingStats, WallRoutingResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typed inputs for a full run
#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    pub connectors: Vec<Connector>,
    pub walls: Vec<Wall>,
    pub framing: Option<Vec<FramingMember>>,
    pub cells: Option<Vec<FramingCell>>,
}

/// Results of both phases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub phase1: FixtureRoutingResult,
    pub phase1_stats: RoutingStats,
    pub phase2: WallRoutingResult,
    /// Records skipped during ingestion
    #[serde(default)]
    pub warnings: Vec<IngestWarning>,
}

/// Routing configuration and connection profiles for repeated runs
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: RoutingConfig,
    profiles: ConnectionProfileTable,
}

impl Pipeline {
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            config,
            profiles: ConnectionProfileTable::standard(),
        }
    }

    pub fn with_profiles(mut self, profiles: ConnectionProfileTable) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn phase1(&self, connectors: &[Connector], walls: &[Wall]) -> FixtureRoutingResult {
        route_fixtures_with_profiles(connectors, walls, self.config.search_radius, &self.profiles)
    }

    pub fn phase2(
        &self,
        phase1: &FixtureRoutingResult,
        walls: &[Wall],
        framing: Option<&[FramingMember]>,
        cells: Option<&[FramingCell]>,
    ) -> WallRoutingResult {
        let cavities = decompose_walls(walls, framing, cells, &self.config);
        route_in_wall(phase1, walls, &cavities, &self.config)
    }

    pub fn run(&self, input: &PipelineInput) -> PipelineOutput {
        let phase1 = self.phase1(&input.connectors, &input.walls);
        let phase2 = self.phase2(
            &phase1,
            &input.walls,
            input.framing.as_deref(),
            input.cells.as_deref(),
        );
        PipelineOutput {
            phase1_stats: summarize_fixture_routing(&phase1),
            phase1,
            phase2,
            warnings: Vec::new(),
        }
    }

    /// Parse JSON inputs into a [`PipelineInput`], collecting warnings
    pub fn ingest(
        &self,
        connectors: &Value,
        walls: &Value,
        framing: Option<&Value>,
        cells: Option<&Value>,
    ) -> Result<(PipelineInput, Vec<IngestWarning>)> {
        let connectors = parse_connectors(connectors)?;
        let walls = parse_walls(walls)?;
        let mut warnings = connectors.warnings;
        warnings.extend(walls.warnings);

        let framing = match framing {
            Some(value) => {
                let parsed = parse_framing(value, &walls.items)?;
                warnings.extend(parsed.warnings);
                Some(parsed.items)
            }
            None => None,
        };
        let cells = match cells {
            Some(value) => {
                let parsed = parse_cells(value)?;
                warnings.extend(parsed.warnings);
                Some(parsed.items)
            }
            None => None,
        };

        tracing::info!(
            connectors = connectors.items.len(),
            walls = walls.items.len(),
            framing = framing.as_ref().map_or(0, Vec::len),
            cells = cells.as_ref().map_or(0, Vec::len),
            skipped = warnings.len(),
            "Ingested routing inputs"
        );

        Ok((
            PipelineInput {
                connectors: connectors.items,
                walls: walls.items,
                framing,
                cells,
            },
            warnings,
        ))
    }
}

/// Phase 1 on JSON: `{penetrations, unassigned, status, needs}`
pub fn run_phase1(connectors: &Value, walls: &Value, config: &RoutingConfig) -> Result<Value> {
    let pipeline = Pipeline::new(config.clone());
    let (input, _) = pipeline.ingest(connectors, walls, None, None)?;
    let result = pipeline.phase1(&input.connectors, &input.walls);
    Ok(serde_json::to_value(result)?)
}

/// Phase 2 on JSON: `{routes, unrouted, status, stats}`
///
/// `phase1` is a Phase 1 output document.
pub fn run_phase2(
    phase1: &Value,
    walls: &Value,
    framing: Option<&Value>,
    cells: Option<&Value>,
    config: &RoutingConfig,
) -> Result<Value> {
    let pipeline = Pipeline::new(config.clone());
    let phase1 = FixtureRoutingResult::deserialize(phase1)?;
    let (input, _) = pipeline.ingest(&Value::Null, walls, framing, cells)?;
    let result = pipeline.phase2(
        &phase1,
        &input.walls,
        input.framing.as_deref(),
        input.cells.as_deref(),
    );
    Ok(serde_json::to_value(result)?)
}

/// Both phases on JSON: `{phase1, phase1_stats, phase2, warnings}`
pub fn run(
    connectors: &Value,
    walls: &Value,
    framing: Option<&Value>,
    cells: Option<&Value>,
    config: &RoutingConfig,
) -> Result<Value> {
    let pipeline = Pipeline::new(config.clone());
    let (input, warnings) = pipeline.ingest(connectors, walls, framing, cells)?;
    let mut output = pipeline.run(&input);
    output.warnings = warnings;
    Ok(serde_json::to_value(output)?)
}

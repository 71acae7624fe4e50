// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared processing layer for MEP-Lite routing.
//!
//! Converts untyped JSON from CAD extractors into the typed model, runs both
//! routing phases and serializes the results. Used by the `mep-route` CLI
//! and by any host that speaks the JSON contract.

pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use ingest::{parse_cells, parse_connectors, parse_framing, parse_walls, IngestWarning, Ingested};
pub use pipeline::{run, run_phase1, run_phase2, Pipeline, PipelineInput, PipelineOutput};

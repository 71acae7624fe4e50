// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the JSON boundary.

use thiserror::Error;

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop a whole payload from being processed.
///
/// Individual malformed records never produce these; they are skipped and
/// reported as ingest warnings.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Model error: {0}")]
    Model(#[from] mep_lite_model::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model construction.

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building typed model records.
///
/// Routing never produces these; they only surface at the validation
/// boundary where untyped records become connectors, walls and framing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The wall frame axes are zero-length, vertical or otherwise unusable.
    #[error("invalid wall frame: {0}")]
    InvalidFrame(String),

    /// A length, height or width is non-finite or not positive.
    #[error("invalid dimension {name}: {value}")]
    InvalidDimension { name: &'static str, value: f64 },

    /// A required field is absent from a record.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field is present but has the wrong shape or value.
    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

//! Error types for the analyzer library.

use thiserror::Error;

use crate::schema::{EntityKind, FieldType};

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// A result row lacks a field every view needs.
    #[error("{kind} row is missing required field `{field}`")]
    MissingField { kind: EntityKind, field: &'static str },

    /// A result row carries a field with the wrong JSON shape.
    #[error("{kind} field `{field}` has unexpected value: {found}")]
    InvalidField {
        kind: EntityKind,
        field: String,
        found: String,
    },

    #[error("unknown field `{field}` for {kind} queries")]
    UnknownField { kind: EntityKind, field: String },

    #[error("predicate on `{field}` expects {expected} values")]
    TypeMismatch { field: String, expected: FieldType },

    /// Snapshot node with no process or file variant set.
    #[error("snapshot node `{0}` has no supported variant")]
    UnsupportedNode(String),

    #[error("malformed store response: {0}")]
    MalformedResponse(String),

    /// Error reported by the graph store itself (query errors, non-success status).
    #[error("graph store error{}: {message}", status_suffix(.status))]
    Backend { status: Option<u16>, message: String },

    #[error("graph store request cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl AnalyzerError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AnalyzerError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map_or(false, |s| s.is_server_error())
            }
            AnalyzerError::Backend { status: Some(s), .. } => *s >= 500,
            _ => false,
        }
    }
}

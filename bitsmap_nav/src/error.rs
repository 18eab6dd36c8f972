// Error types for venue compilation, routing and configuration.
//
// Compilation failures (`CompileError`) are fatal: a malformed description is
// a deployment defect and no venue is produced. Routing failures
// (`RouteError`) are ordinary outcomes the caller reports to the user.

use crate::geometry::Position;
use crate::types::{FloorChangerKind, NodeId};

/// Fatal errors raised while turning a route description into a venue.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A line could not be understood, or referenced something that does
    /// not exist (label, floor-changer).
    #[error("line {line}: {reason}")]
    MalformedDescription { line: usize, reason: String },

    /// Two paired floor-changers disagree about where the other end is.
    #[error(
        "{kind} {index} on floor {floor} at {position} expects its partner at {expected}, \
         but the partner is at {actual}"
    )]
    LinkingInconsistency {
        kind: FloorChangerKind,
        index: u32,
        floor: i32,
        position: Position,
        expected: Position,
        actual: Position,
    },

    /// The description had no statements at all.
    #[error("route description is empty")]
    EmptyDescription,

    #[error("failed to read route description: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration passed to the compiler fails validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CompileError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedDescription {
            line,
            reason: reason.into(),
        }
    }
}

/// Recoverable routing and query failures.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The destination cannot be reached from the source, possibly only
    /// under the active accessibility constraint.
    #[error("no path from {from} to {to} (accessible only: {accessible})")]
    NoPathFound {
        from: NodeId,
        to: NodeId,
        accessible: bool,
    },

    /// A node/POI id or narration input that does not resolve.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Errors loading a `NavConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

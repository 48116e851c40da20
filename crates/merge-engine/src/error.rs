//! Error types for configuration loading and registry consistency checks.
//!
//! Gameplay preconditions (no aimed piece, cooldown active, session over) are
//! not errors: those operations are silent no-ops. `MergeError` covers bad
//! configuration and the one internal consistency failure, a pending merge
//! whose source piece is gone at flush time. The latter is logged and skipped,
//! never propagated to the host.

use std::fmt;

use crate::api::types::PieceId;

#[derive(Debug)]
pub enum MergeError {
    /// A configuration value is outside its usable range.
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable constraint that was violated.
        reason: &'static str,
    },

    /// The configuration JSON could not be parsed.
    ConfigParse(serde_json::Error),

    /// A piece was referenced but is no longer tracked by the registry.
    PieceNotFound {
        id: PieceId,
        /// Where the lookup happened (for logging).
        context: &'static str,
    },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::InvalidConfig { field, reason } => {
                write!(f, "invalid config: `{field}` {reason}")
            }
            MergeError::ConfigParse(err) => write!(f, "config parse error: {err}"),
            MergeError::PieceNotFound { id, context } => {
                write!(f, "piece {} not found ({context})", id.0)
            }
        }
    }
}

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MergeError::ConfigParse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MergeError {
    fn from(err: serde_json::Error) -> Self {
        MergeError::ConfigParse(err)
    }
}

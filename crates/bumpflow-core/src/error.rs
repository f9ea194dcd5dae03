//! Error types for the diagram core.

use crate::diagram::{BoxId, ConnectionId};
use thiserror::Error;

/// Diagram errors.
///
/// Interactive gestures never fail; these only come out of integrity
/// checks and snapshot serialization.
#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("{parent} lists {child} as child, but {child} does not list {parent} as parent")]
    AsymmetricLink { parent: BoxId, child: BoxId },
    #[error("{from} links to missing box {missing}")]
    DanglingLink { from: BoxId, missing: BoxId },
    #[error("stack containing {0} loops back on itself")]
    Cycle(BoxId),
    #[error("connection {connection} references missing box {missing}")]
    DanglingConnection {
        connection: ConnectionId,
        missing: BoxId,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for diagram operations.
pub type DiagramResult<T> = Result<T, DiagramError>;

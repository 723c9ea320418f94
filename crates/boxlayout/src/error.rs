use std::{io, result::Result as StdResult};

use thiserror::Error;

use crate::NodeId;

/// Result type for tree and scene operations.
pub type Result<T> = StdResult<T, Error>;

/// Errors raised by structural tree operations and scene loading.
///
/// Measurement and layout never fail; they degrade to zero-size output.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("node not found: {0:?}")]
    /// The node id does not exist in the tree.
    NodeNotFound(NodeId),
    #[error("node already attached: {0:?}")]
    /// The child already has a parent.
    AlreadyAttached(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    /// The child is the parent or one of its ancestors.
    WouldCreateCycle {
        /// Prospective parent.
        parent: NodeId,
        /// Prospective child.
        child: NodeId,
    },
    #[error("duplicate child {child:?} under {parent:?}")]
    /// A child list names the same node twice.
    DuplicateChild {
        /// Parent receiving the list.
        parent: NodeId,
        /// Repeated child.
        child: NodeId,
    },
    #[error("invalid: {0}")]
    /// Operation not permitted in the current tree state.
    InvalidOperation(String),
    #[error("lazy: {0}")]
    /// A lazy child request fell outside the provider's range.
    Lazy(String),
    #[error("scene: {0}")]
    /// A scene description could not be parsed or built.
    Scene(String),
    #[error("io: {0}")]
    /// Writing diagnostic output failed.
    Io(String),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Scene(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Scene(e.to_string())
    }
}

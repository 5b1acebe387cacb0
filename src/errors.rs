//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! Two layers of errors exist:
//! - [`SceneError`] covers failures of the scene itself (missing nodes,
//!   unknown attributes, type mismatches, driven plugs).
//! - [`SymmetryError`] covers the symmetry tool: selection problems, state
//!   conflicts detected during validation, and wrapped scene failures.
//!
//! Every [`SymmetryError`] maps onto an [`ErrorKind`] so the presentation
//! layer can decide how to word the warning.
//!
//! ```rust,ignore
//! use symmetry::errors::{ErrorKind, SymmetryError};
//!
//! match symmetry::try_execute(&mut scene, MirrorAxis::X) {
//!     Err(e) if e.kind() == ErrorKind::Selection => { /* ask the user to reselect */ }
//!     _ => {}
//! }
//! ```

use thiserror::Error;

use crate::scene::value::AttrType;

/// Failures raised by [`Scene`](crate::scene::Scene) operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    // ========================================================================
    // Nodes
    // ========================================================================
    /// The node handle does not refer to a live node.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Another node already uses the requested name.
    #[error("Node name already in use: {0}")]
    NameTaken(String),

    // ========================================================================
    // Attributes
    // ========================================================================
    /// The node has no attribute (or compound child) with this name.
    #[error("Attribute not found: {node}.{attr}")]
    AttributeNotFound {
        /// Name of the node that was probed
        node: String,
        /// Attribute name that was requested
        attr: String,
    },

    /// `add_attr` was called for a name that already exists on the node.
    #[error("Attribute already exists: {node}.{attr}")]
    AttributeExists { node: String, attr: String },

    /// Built-in attributes cannot be removed.
    #[error("Attribute is not dynamic and cannot be removed: {node}.{attr}")]
    AttributeNotDynamic { node: String, attr: String },

    /// A value of the wrong type was written or connected.
    #[error("Type mismatch on {plug}: expected {expected:?}, found {found:?}")]
    TypeMismatch {
        plug: String,
        expected: AttrType,
        found: AttrType,
    },

    /// Computed attributes are read-only.
    #[error("Attribute is an output and cannot be written: {0}")]
    ReadOnly(String),

    /// The plug has an incoming connection and cannot be set directly.
    #[error("Attribute is driven by {source_plug} and cannot be set: {plug}")]
    PlugDriven { plug: String, source_plug: String },

    // ========================================================================
    // Connections
    // ========================================================================
    /// The destination already has an incoming connection.
    #[error("Destination {dst} is already connected from {existing}")]
    AlreadyConnected { dst: String, existing: String },

    /// A plug cannot feed itself.
    #[error("Cannot connect a plug to itself: {0}")]
    SelfConnection(String),

    /// `disconnect` was asked to remove an edge that does not exist.
    #[error("No connection from {src} to {dst}")]
    NotConnected { src: String, dst: String },

    // ========================================================================
    // Hierarchy
    // ========================================================================
    /// The requested parent is not a transform node.
    #[error("Node cannot be parented under non-transform node: {0}")]
    InvalidParent(String),
}

/// Broad classification of a [`SymmetryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong count or type of selected nodes; nothing was changed.
    Selection,
    /// The requested binding conflicts with existing scene state; nothing was changed.
    StateConflict,
    /// A scene operation failed mid-sequence; partial state may remain.
    HostOperation,
    /// Settings could not be loaded.
    Config,
}

/// The main error type of the symmetry tool.
#[derive(Error, Debug)]
pub enum SymmetryError {
    // ========================================================================
    // Selection Errors
    // ========================================================================
    /// The selection does not contain exactly two nodes.
    #[error("Select exactly {expected} joints (source first, then target); {found} selected")]
    SelectionCount { expected: usize, found: usize },

    /// A selected node is not a joint.
    #[error("Selected node '{name}' is a {kind}, not a joint")]
    SelectionType { name: String, kind: &'static str },

    // ========================================================================
    // State Conflicts
    // ========================================================================
    /// Source and target are the same node.
    #[error("Source and target must be different joints: '{0}'")]
    SameJoint(String),

    /// The handle is dead or is not a joint.
    #[error("Invalid joint '{name}': {reason}")]
    InvalidJoint { name: String, reason: String },

    /// A symmetry binding (or part of one) already exists.
    #[error("Joint '{joint}' already carries a symmetry binding ({evidence})")]
    AlreadyBound { joint: String, evidence: String },

    /// A transform channel of the target is driven by something else.
    #[error("Channel '{joint}.{attr}' is already driven by {source_plug}")]
    ChannelDriven {
        joint: String,
        attr: String,
        source_plug: String,
    },

    /// Source and target share the same parent.
    #[error("Joints '{source_joint}' and '{target_joint}' share the parent '{parent}'")]
    SiblingConflict {
        source_joint: String,
        target_joint: String,
        parent: String,
    },

    /// The source sits below the target, so driving the target would move the source.
    #[error("Source joint '{source_joint}' is a descendant of target '{target_joint}'")]
    DescendantSource {
        source_joint: String,
        target_joint: String,
    },

    // ========================================================================
    // Wrapped Errors
    // ========================================================================
    /// A scene operation failed while wiring or tearing down.
    #[error("Scene operation failed: {0}")]
    Host(#[from] SceneError),

    /// Settings JSON could not be parsed.
    #[error("Settings parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl SymmetryError {
    /// Returns the broad category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SelectionCount { .. } | Self::SelectionType { .. } => ErrorKind::Selection,
            Self::SameJoint(_)
            | Self::InvalidJoint { .. }
            | Self::AlreadyBound { .. }
            | Self::ChannelDriven { .. }
            | Self::SiblingConflict { .. }
            | Self::DescendantSource { .. } => ErrorKind::StateConflict,
            Self::Host(_) => ErrorKind::HostOperation,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

/// Alias for `Result<T, SymmetryError>`.
pub type Result<T> = std::result::Result<T, SymmetryError>;

/// Alias for `Result<T, SceneError>`.
pub type SceneResult<T> = std::result::Result<T, SceneError>;

//! Tool & Scene Settings
//!
//! Both settings structs are plain data with sensible defaults and can be
//! loaded from JSON. Missing fields keep their default values.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use symmetry::settings::{SymmetrySettings, RotateOffsetMode};
//!
//! // Defaults: mirror across X, reject sibling joints, literal rotate offset
//! let settings = SymmetrySettings::default();
//!
//! // Allow left/right joints under the same parent
//! let settings = SymmetrySettings {
//!     reject_sibling_joints: false,
//!     ..Default::default()
//! };
//!
//! let settings = SymmetrySettings::from_json(r#"{ "default_axis": "Y" }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::symmetry::axis::MirrorAxis;

// ---------------------------------------------------------------------------
// RotateOffsetMode
// ---------------------------------------------------------------------------

/// How the rotate offset is captured at bind time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotateOffsetMode {
    /// Target world Euler minus *source* world Euler.
    ///
    /// The translate and scale offsets are measured against the mirrored
    /// values while this one is not, so a mirrored pose with non-zero
    /// rotation does not come out unchanged.
    #[default]
    SourceWorld,
    /// Target world Euler minus the mirror node's constrained rotate, which
    /// preserves the target's pose exactly for unparented joints.
    Mirrored,
}

// ---------------------------------------------------------------------------
// SymmetrySettings
// ---------------------------------------------------------------------------

/// Behaviour of [`bind`](crate::symmetry::bind) and [`execute`](crate::symmetry::execute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymmetrySettings {
    /// Axis used when the caller does not name one.
    pub default_axis: MirrorAxis,
    /// Refuse to bind two joints that share the same parent.
    pub reject_sibling_joints: bool,
    /// Rotate offset capture mode.
    pub rotate_offset: RotateOffsetMode,
}

impl Default for SymmetrySettings {
    fn default() -> Self {
        Self {
            default_axis: MirrorAxis::X,
            reject_sibling_joints: true,
            rotate_offset: RotateOffsetMode::SourceWorld,
        }
    }
}

impl SymmetrySettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// SceneSettings
// ---------------------------------------------------------------------------

/// Limits of the in-memory scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Upper bound on node evaluations per propagation pass.
    pub max_evaluation_steps: usize,
    /// Number of undo chunks kept. Zero disables undo.
    pub undo_limit: usize,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            max_evaluation_steps: 10_000,
            undo_limit: 64,
        }
    }
}

impl SceneSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

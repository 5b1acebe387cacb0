#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod errors;
pub mod scene;
pub mod settings;
pub mod symmetry;

pub use errors::{ErrorKind, SceneError, SymmetryError};
pub use scene::{AttrValue, LifecycleEvent, NodeHandle, NodeKind, Scene, plug};
pub use settings::{RotateOffsetMode, SceneSettings, SymmetrySettings};
pub use symmetry::{
    ConstraintBinding, MirrorAxis, OffsetTriple, bind, execute, execute_with, is_bound,
    try_execute, try_execute_with, unbind,
};

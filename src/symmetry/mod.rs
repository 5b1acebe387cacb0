//! Symmetry Module
//!
//! Mirrors one joint onto another through a live node network:
//! - [`bind`] / [`unbind`]: build and remove the network for one pair
//! - [`execute`] / [`try_execute`]: the same, driven by the scene selection
//! - [`OffsetTriple`]: pose-preserving delta captured at bind time
//! - [`lifecycle`]: teardown hooks and their persisted ids
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use symmetry::scene::Scene;
//! use symmetry::symmetry::{self, MirrorAxis};
//!
//! let mut scene = Scene::new();
//! let left = scene.create_joint("arm_L", None)?;
//! let right = scene.create_joint("arm_R", None)?;
//! scene.set_attr(left, "translate", DVec3::new(5.0, 0.0, 0.0))?;
//! scene.set_attr(right, "translate", DVec3::new(-5.0, 0.0, 0.0))?;
//!
//! scene.select(&[left, right]);
//! let binding = symmetry::try_execute(&mut scene, MirrorAxis::X)?;
//!
//! scene.set_attr(left, "translateX", 6.0)?;
//! // arm_R.translate is now (-6, 0, 0)
//! ```

pub mod axis;
pub mod binding;
pub mod command;
pub mod engine;
pub mod lifecycle;
pub mod offset;

pub use axis::{MirrorAxis, ParseAxisError};
pub use binding::{BindingNames, ConstraintBinding, is_bound};
pub use command::{execute, execute_with, try_execute, try_execute_with};
pub use engine::{bind, unbind};
pub use offset::OffsetTriple;

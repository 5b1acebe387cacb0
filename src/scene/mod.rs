//! Scene Module
//!
//! The dependency-graph scene the symmetry tool operates on:
//! - [`Scene`]: node storage, connections, propagation, selection, warnings, undo
//! - [`Node`] / [`NodeKind`]: typed nodes with built-in attribute schemas
//! - [`Attribute`] / [`AttrValue`]: typed attribute storage
//! - [`Plug`] / [`ConnectionGraph`]: directed data-flow edges
//! - [`HookRegistry`]: one-shot lifecycle observers
//! - [`transform`]: Euler / matrix helpers shared by transforms and constraints

pub mod attribute;
pub(crate) mod compute;
pub mod graph;
pub mod hooks;
pub mod node;
pub mod plug;
pub mod scene;
pub mod transform;
pub(crate) mod undo;
pub mod value;

pub use attribute::{AttrFlags, Attribute};
pub use graph::{Connection, ConnectionGraph};
pub use hooks::{HookFn, HookId, HookInfo, HookRegistry, LifecycleEvent, Trigger};
pub use node::{Node, NodeKind};
pub use plug::{Plug, plug};
pub use scene::Scene;
pub use transform::{Pose, RotateOrder};
pub use value::{AttrType, AttrValue};

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
}

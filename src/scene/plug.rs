use crate::scene::NodeHandle;

/// Address of one attribute on one node: the endpoint of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Plug {
    pub node: NodeHandle,
    pub attr: String,
}

impl Plug {
    pub fn new(node: NodeHandle, attr: impl Into<String>) -> Self {
        Self {
            node,
            attr: attr.into(),
        }
    }
}

/// Shorthand for [`Plug::new`].
#[inline]
pub fn plug(node: NodeHandle, attr: &str) -> Plug {
    Plug::new(node, attr)
}

//! Connection Graph
//!
//! Stores the directed data-flow edges between plugs. The graph is purely
//! topological: type checks, value transfer and propagation are the scene's
//! job. A destination has at most one source; a source fans out to any
//! number of destinations.
//!
//! Cycles at the node level are legal (a target's `parentInverseMatrix` feeds
//! the constraint that drives its `translate`); propagation settles them by
//! change detection.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::scene::NodeHandle;
use crate::scene::plug::Plug;

/// A single source → destination edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    pub src: Plug,
    pub dst: Plug,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionGraph {
    /// destination → source
    inputs: FxHashMap<Plug, Plug>,
    /// source → destinations, in connection order
    outputs: FxHashMap<Plug, SmallVec<[Plug; 4]>>,
}

impl ConnectionGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an edge. Returns the existing source if `dst` is already driven.
    pub(crate) fn connect(&mut self, src: Plug, dst: Plug) -> Result<(), Plug> {
        if let Some(existing) = self.inputs.get(&dst) {
            return Err(existing.clone());
        }
        self.outputs.entry(src.clone()).or_default().push(dst.clone());
        self.inputs.insert(dst, src);
        Ok(())
    }

    /// Removes an edge. Returns `false` if it did not exist.
    pub(crate) fn disconnect(&mut self, src: &Plug, dst: &Plug) -> bool {
        if self.inputs.get(dst) != Some(src) {
            return false;
        }
        self.inputs.remove(dst);
        if let Some(list) = self.outputs.get_mut(src) {
            list.retain(|d| d != dst);
            if list.is_empty() {
                self.outputs.remove(src);
            }
        }
        true
    }

    /// The plug feeding `dst`, if any.
    #[must_use]
    pub fn source_of(&self, dst: &Plug) -> Option<&Plug> {
        self.inputs.get(dst)
    }

    /// Plugs fed by `src`.
    #[must_use]
    pub fn destinations(&self, src: &Plug) -> &[Plug] {
        match self.outputs.get(src) {
            Some(list) => list.as_slice(),
            None => &[],
        }
    }

    /// Every edge touching `node`, either as source or destination.
    #[must_use]
    pub fn connections_of(&self, node: NodeHandle) -> Vec<Connection> {
        let mut found: Vec<Connection> = self
            .inputs
            .iter()
            .filter(|(dst, src)| dst.node == node || src.node == node)
            .map(|(dst, src)| Connection {
                src: src.clone(),
                dst: dst.clone(),
            })
            .collect();
        found.sort_by(|a, b| (&a.dst.attr, &a.src.attr).cmp(&(&b.dst.attr, &b.src.attr)));
        found
    }

    /// Removes every edge touching `node` and returns them.
    pub(crate) fn detach_node(&mut self, node: NodeHandle) -> Vec<Connection> {
        let edges = self.connections_of(node);
        for edge in &edges {
            self.disconnect(&edge.src, &edge.dst);
        }
        edges
    }

    /// Removes every edge whose endpoint on `node` is one of `attrs`.
    pub(crate) fn detach_attrs(&mut self, node: NodeHandle, attrs: &[String]) -> Vec<Connection> {
        let touches = |p: &Plug| p.node == node && attrs.iter().any(|a| *a == p.attr);
        let edges: Vec<Connection> = self
            .connections_of(node)
            .into_iter()
            .filter(|c| touches(&c.src) || touches(&c.dst))
            .collect();
        for edge in &edges {
            self.disconnect(&edge.src, &edge.dst);
        }
        edges
    }

    /// Total number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

use std::collections::VecDeque;
use std::rc::Rc;

use glam::{DMat4, DVec3};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::errors::{SceneError, SceneResult};
use crate::scene::NodeHandle;
use crate::scene::attribute::Attribute;
use crate::scene::compute;
use crate::scene::graph::{Connection, ConnectionGraph};
use crate::scene::hooks::{HookId, HookRegistry, LifecycleEvent, Trigger};
use crate::scene::node::{Node, NodeKind};
use crate::scene::plug::Plug;
use crate::scene::transform::{Pose, RotateOrder};
use crate::scene::undo::UndoStack;
use crate::scene::value::{AttrType, AttrValue};
use crate::settings::SceneSettings;

/// Everything an undo chunk restores.
#[derive(Clone, Default)]
pub(crate) struct SceneState {
    nodes: SlotMap<NodeHandle, Node>,
    names: FxHashMap<String, NodeHandle>,
    roots: Vec<NodeHandle>,
    graph: ConnectionGraph,
    hooks: HookRegistry,
    selection: Vec<NodeHandle>,
    /// Bumped by every edit to nodes, attributes, connections or hooks.
    revision: u64,
}

/// The dependency-graph scene.
///
/// `Scene` owns every node, the connections between their attributes and
/// the lifecycle hooks attached to them. All edits are synchronous: a write,
/// a new connection or a new node pushes its effects downstream before the
/// call returns, so reads always observe a settled graph.
///
/// # Evaluation
///
/// - Writing a plug copies its value along outgoing connections.
/// - A node whose inputs changed is re-evaluated; changed outputs are pushed
///   on in turn.
/// - A transform whose world matrix changed re-evaluates its children.
///
/// Propagation stops once values stop changing, or after
/// [`SceneSettings::max_evaluation_steps`] node evaluations.
pub struct Scene {
    state: SceneState,
    undo: UndoStack,
    settings: SceneSettings,
    warnings: Vec<String>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(SceneSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: SceneSettings) -> Self {
        Self {
            state: SceneState::default(),
            undo: UndoStack::new(settings.undo_limit),
            settings,
            warnings: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Creates a node of `kind`, optionally parented under a transform.
    pub fn create_node(
        &mut self,
        kind: NodeKind,
        name: &str,
        parent: Option<NodeHandle>,
    ) -> SceneResult<NodeHandle> {
        if self.state.names.contains_key(name) {
            return Err(SceneError::NameTaken(name.to_string()));
        }
        if let Some(p) = parent {
            let parent_node = self.state.nodes.get(p).ok_or_else(|| missing(p))?;
            if !parent_node.kind.is_transform() {
                return Err(SceneError::InvalidParent(parent_node.name.clone()));
            }
        }

        let mut node = Node::new(name.to_string(), kind);
        node.parent = parent;
        let handle = self.state.nodes.insert(node);
        self.state.names.insert(name.to_string(), handle);
        self.touch();
        match parent.and_then(|p| self.state.nodes.get_mut(p)) {
            Some(p) => p.children.push(handle),
            None => self.state.roots.push(handle),
        }

        log::debug!("Created {} '{}'", kind.type_name(), name);
        self.propagate(VecDeque::new(), [handle]);
        Ok(handle)
    }

    /// Shorthand for creating a [`NodeKind::Joint`].
    pub fn create_joint(&mut self, name: &str, parent: Option<NodeHandle>) -> SceneResult<NodeHandle> {
        self.create_node(NodeKind::Joint, name, parent)
    }

    /// Deletes a node and its hierarchy children.
    ///
    /// Children go first. Each deletion removes the node's connections and
    /// then fires [`Trigger::NodeDeleted`] for it. Hooks run while the
    /// deletion is in progress may delete further nodes.
    pub fn delete_node(&mut self, handle: NodeHandle) -> SceneResult<()> {
        let children = self
            .state
            .nodes
            .get(handle)
            .ok_or_else(|| missing(handle))?
            .children
            .clone();
        for child in children {
            if self.contains(child) {
                self.delete_node(child)?;
            }
        }
        // A hook fired for a child may already have removed this node.
        let Some(node) = self.state.nodes.remove(handle) else {
            return Ok(());
        };
        self.touch();

        let edges = self.state.graph.detach_node(handle);
        self.state.names.remove(&node.name);
        self.state.selection.retain(|&h| h != handle);
        match node.parent.and_then(|p| self.state.nodes.get_mut(p)) {
            Some(parent) => parent.children.retain(|&c| c != handle),
            None => self.state.roots.retain(|&r| r != handle),
        }
        log::debug!(
            "Deleted {} '{}' ({} connections)",
            node.kind.type_name(),
            node.name,
            edges.len()
        );

        self.fire(Trigger::NodeDeleted(handle));
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.state.nodes.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.state.nodes.get(handle)
    }

    /// Looks up a node by its unique name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeHandle> {
        self.state.names.get(name).copied()
    }

    #[must_use]
    pub fn name_of(&self, handle: NodeHandle) -> Option<&str> {
        self.node(handle).map(Node::name)
    }

    #[must_use]
    pub fn kind_of(&self, handle: NodeHandle) -> Option<NodeKind> {
        self.node(handle).map(Node::kind)
    }

    #[must_use]
    pub fn parent_of(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.node(handle).and_then(Node::parent)
    }

    /// Root nodes in creation order.
    #[must_use]
    pub fn roots(&self) -> &[NodeHandle] {
        &self.state.roots
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.state.nodes.iter()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.state.nodes.len()
    }

    /// Display name for logs and error messages; tolerates dead handles.
    #[must_use]
    pub fn display_name(&self, handle: NodeHandle) -> String {
        self.name_of(handle)
            .map_or_else(|| format!("{handle:?}"), str::to_string)
    }

    /// `node.attr` form of a plug.
    #[must_use]
    pub fn plug_name(&self, plug: &Plug) -> String {
        format!("{}.{}", self.display_name(plug.node), plug.attr)
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    #[must_use]
    pub fn has_attr(&self, handle: NodeHandle, name: &str) -> bool {
        self.node(handle).is_some_and(|n| n.has_attr(name))
    }

    pub fn get_attr(&self, handle: NodeHandle, name: &str) -> SceneResult<AttrValue> {
        let node = self.node(handle).ok_or_else(|| missing(handle))?;
        node.value(name).ok_or_else(|| SceneError::AttributeNotFound {
            node: node.name.clone(),
            attr: name.to_string(),
        })
    }

    pub fn get_vec3(&self, handle: NodeHandle, name: &str) -> SceneResult<DVec3> {
        let value = self.get_attr(handle, name)?;
        value.as_vec3().ok_or_else(|| SceneError::TypeMismatch {
            plug: self.plug_name(&Plug::new(handle, name)),
            expected: AttrType::Vec3,
            found: value.attr_type(),
        })
    }

    /// Writes an input attribute and propagates the change.
    ///
    /// Fails for outputs, for plugs driven by a connection and for values of
    /// the wrong type.
    pub fn set_attr(
        &mut self,
        handle: NodeHandle,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> SceneResult<()> {
        let value = value.into();
        let plug = Plug::new(handle, name);
        let (expected, is_output) = self.plug_type(&plug)?;
        if is_output {
            return Err(SceneError::ReadOnly(self.plug_name(&plug)));
        }
        if value.attr_type() != expected {
            return Err(SceneError::TypeMismatch {
                plug: self.plug_name(&plug),
                expected,
                found: value.attr_type(),
            });
        }
        if let Some(src) = self.driver(&plug) {
            return Err(SceneError::PlugDriven {
                plug: self.plug_name(&plug),
                source_plug: self.plug_name(&src),
            });
        }

        let changed = self
            .state
            .nodes
            .get_mut(handle)
            .is_some_and(|n| n.store(name, value));
        if changed {
            self.touch();
            self.propagate(VecDeque::from([plug]), std::iter::empty());
        }
        Ok(())
    }

    /// Adds a dynamic attribute to a node.
    pub fn add_attr(&mut self, handle: NodeHandle, attribute: Attribute) -> SceneResult<()> {
        let node = self.state.nodes.get_mut(handle).ok_or_else(|| missing(handle))?;
        let clash = std::iter::once(attribute.name())
            .chain(attribute.children().into_iter().flatten().map(String::as_str))
            .find(|name| node.has_attr(name));
        if let Some(name) = clash {
            return Err(SceneError::AttributeExists {
                node: node.name.clone(),
                attr: name.to_string(),
            });
        }
        log::debug!("Added attribute {}.{}", node.name, attribute.name());
        node.attributes.push(attribute.dynamic());
        self.touch();
        Ok(())
    }

    /// Removes a dynamic attribute together with its connections.
    pub fn remove_attr(&mut self, handle: NodeHandle, name: &str) -> SceneResult<()> {
        let node = self.state.nodes.get(handle).ok_or_else(|| missing(handle))?;
        let attr = node.attribute(name).ok_or_else(|| SceneError::AttributeNotFound {
            node: node.name.clone(),
            attr: name.to_string(),
        })?;
        if !attr.is_dynamic() {
            return Err(SceneError::AttributeNotDynamic {
                node: node.name.clone(),
                attr: name.to_string(),
            });
        }

        let family = node.storage_family(name);
        self.state.graph.detach_attrs(handle, &family);
        if let Some(node) = self.state.nodes.get_mut(handle) {
            node.attributes.retain(|a| a.name != name);
            log::debug!("Removed attribute {}.{}", node.name, name);
        }
        self.touch();
        Ok(())
    }

    /// Type of a plug and whether it is a computed output.
    fn plug_type(&self, plug: &Plug) -> SceneResult<(AttrType, bool)> {
        let node = self.node(plug.node).ok_or_else(|| missing(plug.node))?;
        let (index, component) =
            node.resolve(&plug.attr)
                .ok_or_else(|| SceneError::AttributeNotFound {
                    node: node.name.clone(),
                    attr: plug.attr.clone(),
                })?;
        let attr = &node.attributes[index];
        let ty = match component {
            Some(_) => AttrType::Float,
            None => attr.value.attr_type(),
        };
        Ok((ty, attr.is_output()))
    }

    // ========================================================================
    // Connections
    // ========================================================================

    /// Connects `src` into `dst` and pushes the source value through.
    pub fn connect(&mut self, src: &Plug, dst: &Plug) -> SceneResult<()> {
        if src == dst {
            return Err(SceneError::SelfConnection(self.plug_name(src)));
        }
        let (src_type, _) = self.plug_type(src)?;
        let (dst_type, dst_is_output) = self.plug_type(dst)?;
        if dst_is_output {
            return Err(SceneError::ReadOnly(self.plug_name(dst)));
        }
        if src_type != dst_type {
            return Err(SceneError::TypeMismatch {
                plug: self.plug_name(dst),
                expected: dst_type,
                found: src_type,
            });
        }
        if let Some(existing) = self.driver(dst) {
            return Err(SceneError::AlreadyConnected {
                dst: self.plug_name(dst),
                existing: self.plug_name(&existing),
            });
        }

        let value = self.get_attr(src.node, &src.attr)?;
        if let Err(existing) = self.state.graph.connect(src.clone(), dst.clone()) {
            return Err(SceneError::AlreadyConnected {
                dst: self.plug_name(dst),
                existing: self.plug_name(&existing),
            });
        }
        log::debug!("Connected {} -> {}", self.plug_name(src), self.plug_name(dst));
        self.touch();

        let changed = self
            .state
            .nodes
            .get_mut(dst.node)
            .is_some_and(|n| n.store(&dst.attr, value));
        if changed {
            self.propagate(VecDeque::from([dst.clone()]), std::iter::empty());
        }
        Ok(())
    }

    /// Removes a connection. The destination keeps its last value.
    pub fn disconnect(&mut self, src: &Plug, dst: &Plug) -> SceneResult<()> {
        if self.state.graph.disconnect(src, dst) {
            self.touch();
            log::debug!("Disconnected {} -> {}", self.plug_name(src), self.plug_name(dst));
            Ok(())
        } else {
            Err(SceneError::NotConnected {
                src: self.plug_name(src),
                dst: self.plug_name(dst),
            })
        }
    }

    /// The plug directly connected into `dst`.
    #[must_use]
    pub fn source_of(&self, dst: &Plug) -> Option<Plug> {
        self.state.graph.source_of(dst).cloned()
    }

    /// The plug driving `plug`, also considering its compound parent or children.
    #[must_use]
    pub fn driver(&self, plug: &Plug) -> Option<Plug> {
        let node = self.node(plug.node)?;
        let (index, component) = node.resolve(&plug.attr)?;
        let attr = &node.attributes[index];
        let mut candidates = vec![attr.name.as_str()];
        if let Some(children) = &attr.children {
            match component {
                Some(c) => candidates.push(children[c].as_str()),
                None => candidates.extend(children.iter().map(String::as_str)),
            }
        }
        candidates
            .into_iter()
            .find_map(|name| self.source_of(&Plug::new(plug.node, name)))
    }

    #[must_use]
    pub fn is_driven(&self, plug: &Plug) -> bool {
        self.driver(plug).is_some()
    }

    #[must_use]
    pub fn destinations_of(&self, src: &Plug) -> Vec<Plug> {
        self.state.graph.destinations(src).to_vec()
    }

    /// Every connection touching `handle`.
    #[must_use]
    pub fn connections_of(&self, handle: NodeHandle) -> Vec<Connection> {
        self.state.graph.connections_of(handle)
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.state.graph.len()
    }

    // ========================================================================
    // World-space queries
    // ========================================================================

    pub fn world_matrix(&self, handle: NodeHandle) -> SceneResult<DMat4> {
        let value = self.get_attr(handle, "worldMatrix")?;
        value.as_matrix().ok_or_else(|| SceneError::TypeMismatch {
            plug: self.plug_name(&Plug::new(handle, "worldMatrix")),
            expected: AttrType::Matrix,
            found: value.attr_type(),
        })
    }

    pub fn world_pose(&self, handle: NodeHandle) -> SceneResult<Pose> {
        Ok(Pose::from_matrix(&self.world_matrix(handle)?))
    }

    pub fn world_translation(&self, handle: NodeHandle) -> SceneResult<DVec3> {
        Ok(self.world_pose(handle)?.translation)
    }

    /// World rotation as Euler degrees in the node's own rotate order.
    pub fn world_rotation(&self, handle: NodeHandle) -> SceneResult<DVec3> {
        let order = self
            .get_attr(handle, "rotateOrder")?
            .as_int()
            .map_or(RotateOrder::Xyz, RotateOrder::from_index);
        Ok(self.world_pose(handle)?.euler(order))
    }

    pub fn world_scale(&self, handle: NodeHandle) -> SceneResult<DVec3> {
        Ok(self.world_pose(handle)?.scale)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Replaces the selection. Dead handles are dropped; order is kept.
    pub fn select(&mut self, handles: &[NodeHandle]) {
        self.state.selection = handles
            .iter()
            .copied()
            .filter(|&h| self.state.nodes.contains_key(h))
            .collect();
    }

    #[must_use]
    pub fn selection(&self) -> &[NodeHandle] {
        &self.state.selection
    }

    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    // ========================================================================
    // Hooks & lifecycle
    // ========================================================================

    /// Registers a one-shot hook.
    pub fn subscribe(
        &mut self,
        trigger: Trigger,
        owner: Option<NodeHandle>,
        label: &str,
        handler: impl Fn(&mut Scene) + 'static,
    ) -> HookId {
        self.touch();
        self.state.hooks.subscribe(trigger, owner, label, Rc::new(handler))
    }

    pub fn cancel_hook(&mut self, id: HookId) -> bool {
        let cancelled = self.state.hooks.cancel(id);
        if cancelled {
            self.touch();
        }
        cancelled
    }

    #[must_use]
    pub fn hooks(&self) -> &HookRegistry {
        &self.state.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        self.touch();
        &mut self.state.hooks
    }

    /// Broadcasts a global lifecycle event to the hooks waiting for it.
    pub fn emit(&mut self, event: LifecycleEvent) {
        log::debug!("Lifecycle event {event:?}");
        self.fire(event.into());
    }

    fn fire(&mut self, trigger: Trigger) {
        for id in self.state.hooks.triggered_by(trigger) {
            // Skips hooks cancelled by an earlier handler of this firing.
            if let Some(handler) = self.state.hooks.take(id) {
                self.touch();
                log::debug!("Hook {id:?} fired by {trigger:?}");
                handler(self);
            }
        }
    }

    // ========================================================================
    // Warnings
    // ========================================================================

    /// Reports a non-fatal problem to the user.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.warnings.push(message);
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    // ========================================================================
    // Undo
    // ========================================================================

    /// Runs `f` as a single undoable step.
    ///
    /// The chunk is recorded whether `f` succeeds or not; a failed sequence
    /// can still be reverted with one [`undo`](Self::undo). Nested calls join
    /// the outermost chunk.
    pub fn undo_chunk<T, E>(
        &mut self,
        label: &str,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        let outermost = self.undo.open(label, &self.state);
        let result = f(self);
        self.undo.close(self.state.revision);
        if outermost {
            log::debug!("Recorded undo chunk '{label}'");
        }
        result
    }

    /// Reverts the most recent chunk. Returns its label.
    ///
    /// Refuses with a warning when the scene was edited outside any chunk
    /// after the most recent chunk closed.
    pub fn undo(&mut self) -> Option<String> {
        if self.undo.is_open() {
            self.warn("Cannot undo while an undo chunk is open");
            return None;
        }
        let (label, closed_at) = self.undo.peek()?;
        if closed_at != Some(self.state.revision) {
            let message = format!("Cannot undo '{label}': the scene was edited after it was recorded");
            self.warn(message);
            return None;
        }
        let (label, state) = self.undo.pop()?;
        self.state = state;
        log::info!("Undo: {label}");
        Some(label)
    }

    /// Labels of the recorded chunks, oldest first.
    #[must_use]
    pub fn undo_labels(&self) -> Vec<&str> {
        self.undo.labels().collect()
    }

    /// Revision counter of the undoable state.
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.state.revision
    }

    #[inline]
    fn touch(&mut self) {
        self.state.revision += 1;
    }

    pub fn flush_undo(&mut self) {
        self.undo.clear();
    }

    // ========================================================================
    // Propagation
    // ========================================================================

    fn propagate(
        &mut self,
        mut dirty_plugs: VecDeque<Plug>,
        seeds: impl IntoIterator<Item = NodeHandle>,
    ) {
        let mut dirty_nodes: VecDeque<NodeHandle> = VecDeque::new();
        let mut queued: FxHashSet<NodeHandle> = FxHashSet::default();
        for handle in seeds {
            if queued.insert(handle) {
                dirty_nodes.push_back(handle);
            }
        }

        let limit = self.settings.max_evaluation_steps;
        let mut steps = 0usize;
        loop {
            while let Some(plug) = dirty_plugs.pop_front() {
                self.forward(&plug, &mut dirty_plugs);
                if queued.insert(plug.node) {
                    dirty_nodes.push_back(plug.node);
                }
            }
            let Some(handle) = dirty_nodes.pop_front() else {
                break;
            };
            queued.remove(&handle);

            steps += 1;
            if steps > limit {
                self.warn(format!(
                    "Evaluation did not settle after {limit} steps; the graph may contain a feedback loop"
                ));
                break;
            }

            if self.recompute(handle, &mut dirty_plugs) {
                let children = self
                    .node(handle)
                    .map(|n| n.children.clone())
                    .unwrap_or_default();
                for child in children {
                    if queued.insert(child) {
                        dirty_nodes.push_back(child);
                    }
                }
            }
        }
    }

    /// Copies the value of `plug` (and of any plug sharing its storage) along
    /// outgoing connections.
    fn forward(&mut self, plug: &Plug, dirty: &mut VecDeque<Plug>) {
        let family = match self.node(plug.node) {
            Some(node) => node.storage_family(&plug.attr),
            None => return,
        };
        for name in family {
            let src = Plug::new(plug.node, name);
            let destinations = self.destinations_of(&src);
            if destinations.is_empty() {
                continue;
            }
            let Some(value) = self.node(plug.node).and_then(|n| n.value(&src.attr)) else {
                continue;
            };
            for dst in destinations {
                if let Some(target) = self.state.nodes.get_mut(dst.node)
                    && target.store(&dst.attr, value.clone())
                {
                    dirty.push_back(dst);
                }
            }
        }
    }

    /// Re-evaluates a node. Returns `true` if its world matrix changed.
    fn recompute(&mut self, handle: NodeHandle, dirty: &mut VecDeque<Plug>) -> bool {
        let Some(node) = self.node(handle) else {
            return false;
        };
        let parent_world = node
            .parent
            .and_then(|p| self.node(p))
            .filter(|p| p.kind.is_transform())
            .map_or(DMat4::IDENTITY, |p| p.matrix_or_identity("worldMatrix"));
        let outputs = compute::evaluate(node, parent_world);

        let Some(node) = self.state.nodes.get_mut(handle) else {
            return false;
        };
        let changed: SmallVec<[&'static str; 5]> = outputs
            .into_iter()
            .filter_map(|(name, value)| node.store(name, value).then_some(name))
            .collect();

        for &name in &changed {
            self.forward(&Plug::new(handle, name), dirty);
        }
        changed.contains(&"worldMatrix")
    }
}

fn missing(handle: NodeHandle) -> SceneError {
    SceneError::NodeNotFound(format!("{handle:?}"))
}

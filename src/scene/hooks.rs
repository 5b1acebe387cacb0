//! Lifecycle Hook Registry
//!
//! A generic one-shot observer registry. Every subscription is keyed to a
//! [`Trigger`]; when the trigger fires, each matching hook is removed from
//! the registry right before its handler runs, so a handler runs at most once
//! and may freely subscribe, cancel or fire further triggers. A hook cancelled
//! by an earlier handler of the same firing does not run.
//!
//! Hook identifiers are plain slotmap keys. [`HookId::to_raw`] and
//! [`HookId::from_raw`] convert them to a `u64` that can be stored in an
//! attribute and recovered later.

use std::fmt;
use std::rc::Rc;

use slotmap::{Key, KeyData, SlotMap, new_key_type};

use crate::scene::NodeHandle;
use crate::scene::scene::Scene;

new_key_type! {
    pub struct HookId;
}

impl HookId {
    /// Opaque integer form, suitable for persisting.
    #[must_use]
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }

    /// Recovers an id previously produced by [`to_raw`](Self::to_raw).
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        KeyData::from_ffi(raw).into()
    }
}

/// Events a hook can wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// The node was deleted from the scene.
    NodeDeleted(NodeHandle),
    /// A scene was opened (or reopened) in place of the current one.
    SceneOpened,
    /// The application is about to quit.
    AppQuitting,
}

/// Global lifecycle events broadcast through [`Scene::emit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    SceneOpened,
    AppQuitting,
}

impl From<LifecycleEvent> for Trigger {
    fn from(event: LifecycleEvent) -> Self {
        match event {
            LifecycleEvent::SceneOpened => Self::SceneOpened,
            LifecycleEvent::AppQuitting => Self::AppQuitting,
        }
    }
}

/// Hook callback. Handlers must tolerate running against a scene in which
/// the nodes they reference are already gone.
pub type HookFn = Rc<dyn Fn(&mut Scene)>;

#[derive(Clone)]
struct Hook {
    trigger: Trigger,
    owner: Option<NodeHandle>,
    label: String,
    handler: HookFn,
}

/// Read-only description of a live hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookInfo {
    pub id: HookId,
    pub trigger: Trigger,
    pub owner: Option<NodeHandle>,
    pub label: String,
}

#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: SlotMap<HookId, Hook>,
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a one-shot hook. `owner` groups hooks for bulk cancellation.
    pub fn subscribe(
        &mut self,
        trigger: Trigger,
        owner: Option<NodeHandle>,
        label: impl Into<String>,
        handler: HookFn,
    ) -> HookId {
        let label = label.into();
        let id = self.hooks.insert(Hook {
            trigger,
            owner,
            label,
            handler,
        });
        log::debug!("Hook {:?} subscribed to {:?}", id, trigger);
        id
    }

    /// Revokes a hook. Returns `false` if it had already fired or been cancelled.
    pub fn cancel(&mut self, id: HookId) -> bool {
        let removed = self.hooks.remove(id).is_some();
        if removed {
            log::debug!("Hook {id:?} cancelled");
        }
        removed
    }

    /// Revokes every hook owned by `owner`. Returns how many were live.
    pub fn cancel_owned_by(&mut self, owner: NodeHandle) -> usize {
        let before = self.hooks.len();
        self.hooks.retain(|_, hook| hook.owner != Some(owner));
        before - self.hooks.len()
    }

    #[must_use]
    pub fn is_live(&self, id: HookId) -> bool {
        self.hooks.contains_key(id)
    }

    #[must_use]
    pub fn info(&self, id: HookId) -> Option<HookInfo> {
        self.hooks.get(id).map(|hook| HookInfo {
            id,
            trigger: hook.trigger,
            owner: hook.owner,
            label: hook.label.clone(),
        })
    }

    /// Ids of live hooks owned by `owner`.
    #[must_use]
    pub fn owned_by(&self, owner: NodeHandle) -> Vec<HookId> {
        self.hooks
            .iter()
            .filter(|(_, hook)| hook.owner == Some(owner))
            .map(|(id, _)| id)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Ids of the hooks waiting for `trigger`.
    pub(crate) fn triggered_by(&self, trigger: Trigger) -> Vec<HookId> {
        self.hooks
            .iter()
            .filter(|(_, hook)| hook.trigger == trigger)
            .map(|(id, _)| id)
            .collect()
    }

    /// Removes a hook and hands back its handler for a single invocation.
    pub(crate) fn take(&mut self, id: HookId) -> Option<HookFn> {
        self.hooks.remove(id).map(|hook| hook.handler)
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.hooks
                    .iter()
                    .map(|(id, hook)| (id, (&hook.trigger, &hook.label))),
            )
            .finish()
    }
}

//! Lifecycle hooks of a binding.
//!
//! A binding registers five one-shot hooks, all owned by the target joint.
//! Any one of them tears the whole binding down:
//!
//! | Trigger                  | Label                              |
//! |--------------------------|------------------------------------|
//! | mirror node deleted      | `symmetry: mirror deleted`         |
//! | source deleted           | `symmetry: source deleted`         |
//! | target deleted           | `symmetry: target deleted`         |
//! | scene opened             | `symmetry: scene opened`           |
//! | application quitting     | `symmetry: application quitting`   |
//!
//! The hook ids are also written, in registration order, to the target's
//! `symmetryHookIds` attribute so they can be listed and cancelled later
//! without the binding record.

use crate::errors::Result;
use crate::scene::{Attribute, HookId, NodeHandle, Scene, Trigger};
use crate::symmetry::binding::{ConstraintBinding, HOOK_IDS};
use crate::symmetry::engine;

/// Subscribes the teardown hooks of `binding` and persists their ids.
pub(crate) fn register(scene: &mut Scene, binding: &ConstraintBinding) -> Result<Vec<HookId>> {
    let triggers = [
        (Trigger::NodeDeleted(binding.mirror), "symmetry: mirror deleted"),
        (Trigger::NodeDeleted(binding.source), "symmetry: source deleted"),
        (Trigger::NodeDeleted(binding.target), "symmetry: target deleted"),
        (Trigger::SceneOpened, "symmetry: scene opened"),
        (Trigger::AppQuitting, "symmetry: application quitting"),
    ];

    let target = binding.target;
    let aux = binding.aux_nodes();
    let ids: Vec<HookId> = triggers
        .into_iter()
        .map(|(trigger, label)| {
            scene.subscribe(trigger, Some(target), label, move |scene: &mut Scene| {
                engine::teardown(scene, target, &aux);
            })
        })
        .collect();

    let raw: Vec<u64> = ids.iter().map(|id| id.to_raw()).collect();
    scene.add_attr(target, Attribute::new(HOOK_IDS, raw))?;
    Ok(ids)
}

/// Hook ids persisted on `target`, in registration order.
#[must_use]
pub fn persisted_ids(scene: &Scene, target: NodeHandle) -> Vec<HookId> {
    let Ok(value) = scene.get_attr(target, HOOK_IDS) else {
        return Vec::new();
    };
    value
        .as_id_list()
        .map(|ids| ids.iter().copied().map(HookId::from_raw).collect())
        .unwrap_or_default()
}

/// Persisted hook ids of `target`, each with whether it is still live.
#[must_use]
pub fn persisted_hooks(scene: &Scene, target: NodeHandle) -> Vec<(HookId, bool)> {
    persisted_ids(scene, target)
        .into_iter()
        .map(|id| (id, scene.hooks().is_live(id)))
        .collect()
}

/// Cancels every live persisted hook of `target`. Returns how many were live.
pub(crate) fn cancel_persisted(scene: &mut Scene, target: NodeHandle) -> usize {
    persisted_ids(scene, target)
        .into_iter()
        .filter(|&id| scene.cancel_hook(id))
        .count()
}

/// Cancels the persisted hooks of `target` and clears the id attribute,
/// leaving the rest of the binding in place.
///
/// Returns how many hooks were still live.
pub fn force_cancel(scene: &mut Scene, target: NodeHandle) -> usize {
    let cancelled = cancel_persisted(scene, target);
    if scene.has_attr(target, HOOK_IDS)
        && let Err(e) = scene.remove_attr(target, HOOK_IDS)
    {
        log::warn!("Failed to clear '{}.{HOOK_IDS}': {e}", scene.display_name(target));
    }
    log::info!(
        "Force-cancelled {cancelled} symmetry hooks on '{}'",
        scene.display_name(target)
    );
    cancelled
}

//! Selection-driven entry points.
//!
//! These are what a shelf button or menu item calls: the first selected
//! joint is the source, the second the target.

use crate::errors::{Result, SymmetryError};
use crate::scene::{NodeHandle, NodeKind, Scene};
use crate::settings::SymmetrySettings;
use crate::symmetry::axis::MirrorAxis;
use crate::symmetry::binding::ConstraintBinding;
use crate::symmetry::engine;

/// Binds the selected pair across `axis` with default settings.
///
/// Failures are reported through [`Scene::warn`] and yield `None`.
pub fn execute(scene: &mut Scene, axis: MirrorAxis) -> Option<ConstraintBinding> {
    execute_with(scene, Some(axis), &SymmetrySettings::default())
}

/// Like [`execute`]; `None` for `axis` falls back to
/// [`SymmetrySettings::default_axis`].
pub fn execute_with(
    scene: &mut Scene,
    axis: Option<MirrorAxis>,
    settings: &SymmetrySettings,
) -> Option<ConstraintBinding> {
    match try_execute_with(scene, axis, settings) {
        Ok(binding) => Some(binding),
        Err(e) => {
            scene.warn(format!("Symmetry constraint not created: {e}"));
            None
        }
    }
}

/// Binds the selected pair across `axis` with default settings.
pub fn try_execute(scene: &mut Scene, axis: MirrorAxis) -> Result<ConstraintBinding> {
    try_execute_with(scene, Some(axis), &SymmetrySettings::default())
}

pub fn try_execute_with(
    scene: &mut Scene,
    axis: Option<MirrorAxis>,
    settings: &SymmetrySettings,
) -> Result<ConstraintBinding> {
    let (source, target) = selected_pair(scene)?;
    engine::bind(
        scene,
        source,
        target,
        axis.unwrap_or(settings.default_axis),
        settings,
    )
}

/// The two selected joints, source first.
fn selected_pair(scene: &Scene) -> Result<(NodeHandle, NodeHandle)> {
    let &[source, target] = scene.selection() else {
        return Err(SymmetryError::SelectionCount {
            expected: 2,
            found: scene.selection().len(),
        });
    };
    for handle in [source, target] {
        if let Some(kind) = scene.kind_of(handle)
            && kind != NodeKind::Joint
        {
            return Err(SymmetryError::SelectionType {
                name: scene.display_name(handle),
                kind: kind.type_name(),
            });
        }
    }
    Ok((source, target))
}

//! Constraint Wiring Engine
//!
//! Builds and tears down the node network that mirrors one source joint onto
//! one target joint:
//!
//! ```text
//!  source.{translate,rotate,scale,rotateOrder,jointOrient,parentMatrix,worldMatrix}
//!        │
//!        ▼
//!  mirror (symmetry constraint, child of target) ◀── target.parentInverseMatrix
//!        │ constraintTranslate / constraintRotate / constraintScale
//!        ▼
//!  combiner  ◀── target.symmetryOffset{Translate,Rotate,Scale}
//!        │
//!        ▼
//!  target.{translate,rotate,scale}
//! ```
//!
//! `constraintRotateOrder` and `constraintJointOrient` feed the target
//! directly. Every check runs before the first edit; once wiring starts a
//! failure is reported as-is and the partial network stays in place (a
//! single `Scene::undo` removes it).

use std::convert::Infallible;

use crate::errors::{Result, SymmetryError};
use crate::scene::{NodeHandle, NodeKind, Scene, plug};
use crate::settings::SymmetrySettings;
use crate::symmetry::axis::MirrorAxis;
use crate::symmetry::binding::{
    self, BINDING_ATTRS, BindingNames, ConstraintBinding, OFFSET_ROTATE, OFFSET_SCALE,
    OFFSET_TRANSLATE,
};
use crate::symmetry::lifecycle;
use crate::symmetry::offset::OffsetTriple;

/// Source channels and the mirror inputs they feed.
const SOURCE_INPUTS: [(&str, &str); 7] = [
    ("translate", "targetTranslate"),
    ("rotate", "targetRotate"),
    ("scale", "targetScale"),
    ("rotateOrder", "targetRotateOrder"),
    ("jointOrient", "targetJointOrient"),
    ("parentMatrix", "targetParentMatrix"),
    ("worldMatrix", "targetWorldMatrix"),
];

/// Target channels the binding takes over.
const DRIVEN_CHANNELS: [&str; 5] = ["translate", "rotate", "scale", "rotateOrder", "jointOrient"];

const SCALE_EPSILON: f64 = 1e-12;

// ============================================================================
// Bind
// ============================================================================

/// Mirrors `source` onto `target` across `axis`.
///
/// The whole operation is recorded as one undo chunk.
pub fn bind(
    scene: &mut Scene,
    source: NodeHandle,
    target: NodeHandle,
    axis: MirrorAxis,
    settings: &SymmetrySettings,
) -> Result<ConstraintBinding> {
    validate(scene, source, target, settings)?;

    let binding = scene.undo_chunk("Create symmetry constraint", |scene| {
        wire(scene, source, target, axis, settings)
    })?;

    log::info!(
        "Symmetry constraint created: '{}' -> '{}' across {}",
        scene.display_name(source),
        scene.display_name(target),
        axis
    );
    Ok(binding)
}

/// Rejects any request that would conflict with existing scene state.
fn validate(
    scene: &Scene,
    source: NodeHandle,
    target: NodeHandle,
    settings: &SymmetrySettings,
) -> Result<()> {
    if source == target {
        return Err(SymmetryError::SameJoint(scene.display_name(source)));
    }
    for joint in [source, target] {
        match scene.kind_of(joint) {
            None => {
                return Err(SymmetryError::InvalidJoint {
                    name: scene.display_name(joint),
                    reason: "node does not exist".to_string(),
                });
            }
            Some(kind) if kind != NodeKind::Joint => {
                return Err(SymmetryError::InvalidJoint {
                    name: scene.display_name(joint),
                    reason: format!("node is a {}", kind.type_name()),
                });
            }
            Some(_) => {}
        }
    }

    for joint in [source, target] {
        if let Some(evidence) = binding::evidence(scene, joint) {
            return Err(SymmetryError::AlreadyBound {
                joint: scene.display_name(joint),
                evidence,
            });
        }
    }

    for attr in DRIVEN_CHANNELS {
        if let Some(src) = scene.driver(&plug(target, attr)) {
            return Err(SymmetryError::ChannelDriven {
                joint: scene.display_name(target),
                attr: attr.to_string(),
                source_plug: scene.plug_name(&src),
            });
        }
    }

    if settings.reject_sibling_joints
        && let Some(parent) = scene.parent_of(source)
        && scene.parent_of(target) == Some(parent)
    {
        return Err(SymmetryError::SiblingConflict {
            source_joint: scene.display_name(source),
            target_joint: scene.display_name(target),
            parent: scene.display_name(parent),
        });
    }

    let mut ancestor = scene.parent_of(source);
    while let Some(node) = ancestor {
        if node == target {
            return Err(SymmetryError::DescendantSource {
                source_joint: scene.display_name(source),
                target_joint: scene.display_name(target),
            });
        }
        ancestor = scene.parent_of(node);
    }

    let scale = scene.world_scale(source)?;
    if scale.abs().min_element() < SCALE_EPSILON {
        return Err(SymmetryError::InvalidJoint {
            name: scene.display_name(source),
            reason: format!("world scale {scale} has a zero component"),
        });
    }
    let parent_inverse = scene.get_attr(target, "parentInverseMatrix")?.as_matrix();
    if !parent_inverse.is_some_and(|m| m.is_finite()) {
        return Err(SymmetryError::InvalidJoint {
            name: scene.display_name(target),
            reason: "parent transform is singular (an ancestor has zero scale)".to_string(),
        });
    }
    Ok(())
}

fn wire(
    scene: &mut Scene,
    source: NodeHandle,
    target: NodeHandle,
    axis: MirrorAxis,
    settings: &SymmetrySettings,
) -> Result<ConstraintBinding> {
    let names = BindingNames::new(&scene.display_name(target));

    // 1. Combiners
    let translate_combiner = scene.create_node(NodeKind::PlusMinusAverage, &names.translate, None)?;
    scene.set_attr(translate_combiner, "operation", 1)?;
    let rotate_combiner = scene.create_node(NodeKind::PlusMinusAverage, &names.rotate, None)?;
    scene.set_attr(rotate_combiner, "operation", 1)?;
    let scale_combiner = scene.create_node(NodeKind::MultiplyDivide, &names.scale, None)?;
    scene.set_attr(scale_combiner, "operation", 1)?;

    // 2. Mirror node
    let mirror = scene.create_node(NodeKind::SymmetryConstraint, &names.constraint, Some(target))?;
    for (flag, on) in axis.flags() {
        scene.set_attr(mirror, flag, on)?;
    }
    for (src, dst) in SOURCE_INPUTS {
        scene.connect(&plug(source, src), &plug(mirror, dst))?;
    }
    scene.connect(
        &plug(target, "parentInverseMatrix"),
        &plug(mirror, "constraintInverseParentWorldMatrix"),
    )?;

    // 3. Offsets, sampled before the target is driven
    let offsets = OffsetTriple::capture(scene, source, target, mirror, settings.rotate_offset)?;
    offsets.persist(scene, target)?;

    // 4. Mirror + offset into the target channels
    let additive = ("input3D[0]", "input3D[1]", "output3D");
    let multiplicative = ("input1", "input2", "output");
    let blends = [
        (translate_combiner, additive, "constraintTranslate", OFFSET_TRANSLATE, "translate"),
        (rotate_combiner, additive, "constraintRotate", OFFSET_ROTATE, "rotate"),
        (scale_combiner, multiplicative, "constraintScale", OFFSET_SCALE, "scale"),
    ];
    for (combiner, (first, second, output), mirrored, offset, channel) in blends {
        scene.connect(&plug(mirror, mirrored), &plug(combiner, first))?;
        scene.connect(&plug(target, offset), &plug(combiner, second))?;
        scene.connect(&plug(combiner, output), &plug(target, channel))?;
    }
    scene.connect(&plug(mirror, "constraintRotateOrder"), &plug(target, "rotateOrder"))?;
    scene.connect(&plug(mirror, "constraintJointOrient"), &plug(target, "jointOrient"))?;

    let mut binding = ConstraintBinding {
        source,
        target,
        axis,
        mirror,
        translate_combiner,
        rotate_combiner,
        scale_combiner,
        hooks: Vec::new(),
        offsets,
    };

    // 5. Teardown hooks
    binding.hooks = lifecycle::register(scene, &binding)?;
    Ok(binding)
}

// ============================================================================
// Unbind
// ============================================================================

/// Removes the binding of `target`, if any.
///
/// Every step checks for existence first, so calling this on a partially
/// removed or never bound joint is harmless. Returns `true` if anything was
/// removed.
pub fn unbind(scene: &mut Scene, target: NodeHandle) -> bool {
    let Some(name) = scene.name_of(target) else {
        return false;
    };
    let aux = BindingNames::new(name).live_nodes(scene);
    let has_state = !aux.is_empty()
        || BINDING_ATTRS.iter().any(|attr| scene.has_attr(target, attr))
        || !scene.hooks().owned_by(target).is_empty();
    if !has_state {
        log::debug!("'{}' has no symmetry binding to remove", scene.display_name(target));
        return false;
    }

    let recorded: std::result::Result<(), Infallible> =
        scene.undo_chunk("Remove symmetry constraint", |scene| {
            teardown(scene, target, &aux);
            Ok(())
        });
    recorded.is_ok()
}

/// Deletes the auxiliary nodes, offset attributes and hooks of a binding.
///
/// Used by [`unbind`] and by every lifecycle hook. Nothing here fails:
/// missing pieces are skipped and scene errors are logged.
pub(crate) fn teardown(scene: &mut Scene, target: NodeHandle, aux: &[NodeHandle]) {
    // Hooks first, so deleting the aux nodes below does not fire them again.
    let mut cancelled = scene.hooks_mut().cancel_owned_by(target);
    cancelled += lifecycle::cancel_persisted(scene, target);

    let mut deleted = 0;
    for &node in aux {
        if !scene.contains(node) {
            continue;
        }
        match scene.delete_node(node) {
            Ok(()) => deleted += 1,
            Err(e) => log::warn!("Failed to delete '{}': {e}", scene.display_name(node)),
        }
    }

    let mut removed = 0;
    for attr in BINDING_ATTRS {
        if !scene.has_attr(target, attr) {
            continue;
        }
        match scene.remove_attr(target, attr) {
            Ok(()) => removed += 1,
            Err(e) => log::warn!("Failed to remove '{}.{attr}': {e}", scene.display_name(target)),
        }
    }

    log::info!(
        "Symmetry constraint removed from '{}' ({deleted} nodes, {removed} attributes, {cancelled} hooks)",
        scene.display_name(target)
    );
}

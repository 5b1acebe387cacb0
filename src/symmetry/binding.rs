//! Binding layout.
//!
//! Names and attributes a symmetry binding leaves in the scene, and the
//! [`ConstraintBinding`] record rebuilt from them.

use crate::scene::{HookId, NodeHandle, NodeKind, Scene, plug};
use crate::symmetry::axis::MirrorAxis;
use crate::symmetry::lifecycle;
use crate::symmetry::offset::OffsetTriple;

pub const OFFSET_TRANSLATE: &str = "symmetryOffsetTranslate";
pub const OFFSET_ROTATE: &str = "symmetryOffsetRotate";
pub const OFFSET_SCALE: &str = "symmetryOffsetScale";
/// Id list of the lifecycle hooks that own the binding's teardown.
pub const HOOK_IDS: &str = "symmetryHookIds";

/// Attributes a binding adds to its target.
pub const BINDING_ATTRS: [&str; 4] = [OFFSET_TRANSLATE, OFFSET_ROTATE, OFFSET_SCALE, HOOK_IDS];

/// Auxiliary node names derived from the target's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingNames {
    pub constraint: String,
    pub translate: String,
    pub rotate: String,
    pub scale: String,
}

impl BindingNames {
    #[must_use]
    pub fn new(target: &str) -> Self {
        Self {
            constraint: format!("{target}_symmetry_constraint"),
            translate: format!("{target}_symmetry_translate"),
            rotate: format!("{target}_symmetry_rotate"),
            scale: format!("{target}_symmetry_scale"),
        }
    }

    /// Each name with the node kind it is created as.
    #[must_use]
    pub fn entries(&self) -> [(&str, NodeKind); 4] {
        [
            (&self.constraint, NodeKind::SymmetryConstraint),
            (&self.translate, NodeKind::PlusMinusAverage),
            (&self.rotate, NodeKind::PlusMinusAverage),
            (&self.scale, NodeKind::MultiplyDivide),
        ]
    }

    /// Live nodes carrying one of these names with the expected kind.
    #[must_use]
    pub fn live_nodes(&self, scene: &Scene) -> Vec<NodeHandle> {
        self.entries()
            .into_iter()
            .filter_map(|(name, kind)| lookup(scene, name, kind))
            .collect()
    }
}

fn lookup(scene: &Scene, name: &str, kind: NodeKind) -> Option<NodeHandle> {
    scene.find(name).filter(|&h| scene.kind_of(h) == Some(kind))
}

/// The network wiring one source joint into one target joint.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintBinding {
    pub source: NodeHandle,
    pub target: NodeHandle,
    pub axis: MirrorAxis,
    /// Symmetry constraint node, parented under the target.
    pub mirror: NodeHandle,
    /// Additive combiner feeding the target's `translate`.
    pub translate_combiner: NodeHandle,
    /// Additive combiner feeding the target's `rotate`.
    pub rotate_combiner: NodeHandle,
    /// Multiplicative combiner feeding the target's `scale`.
    pub scale_combiner: NodeHandle,
    /// Lifecycle hooks in registration order.
    pub hooks: Vec<HookId>,
    pub offsets: OffsetTriple,
}

impl ConstraintBinding {
    /// Rebuilds the binding of `target` from the scene.
    ///
    /// Returns `None` unless the mirror node and all three combiners are
    /// present and the mirror is still wired to a source.
    #[must_use]
    pub fn find(scene: &Scene, target: NodeHandle) -> Option<Self> {
        let names = BindingNames::new(scene.name_of(target)?);
        let mirror = lookup(scene, &names.constraint, NodeKind::SymmetryConstraint)
            .filter(|&m| scene.parent_of(m) == Some(target))?;
        let translate_combiner = lookup(scene, &names.translate, NodeKind::PlusMinusAverage)?;
        let rotate_combiner = lookup(scene, &names.rotate, NodeKind::PlusMinusAverage)?;
        let scale_combiner = lookup(scene, &names.scale, NodeKind::MultiplyDivide)?;

        let source = scene.source_of(&plug(mirror, "targetTranslate"))?.node;
        let axis = MirrorAxis::ALL.into_iter().find(|axis| {
            scene
                .get_attr(mirror, axis.flag_attr())
                .is_ok_and(|v| v.as_bool() == Some(true))
        })?;

        Some(Self {
            source,
            target,
            axis,
            mirror,
            translate_combiner,
            rotate_combiner,
            scale_combiner,
            hooks: lifecycle::persisted_ids(scene, target),
            offsets: OffsetTriple::read(scene, target).unwrap_or_default(),
        })
    }

    /// Auxiliary nodes in teardown order.
    #[must_use]
    pub fn aux_nodes(&self) -> [NodeHandle; 4] {
        [
            self.mirror,
            self.translate_combiner,
            self.rotate_combiner,
            self.scale_combiner,
        ]
    }
}

/// First piece of binding state found on `joint`, described for an error
/// message.
pub(crate) fn evidence(scene: &Scene, joint: NodeHandle) -> Option<String> {
    let names = BindingNames::new(scene.name_of(joint)?);
    if let Some((name, _)) = names
        .entries()
        .into_iter()
        .find(|(name, _)| scene.find(name).is_some())
    {
        return Some(format!("node '{name}' exists"));
    }
    if let Some(attr) = BINDING_ATTRS.iter().find(|attr| scene.has_attr(joint, attr)) {
        return Some(format!("attribute '{attr}' exists"));
    }
    let hooks = scene.hooks().owned_by(joint).len();
    if hooks > 0 {
        return Some(format!("{hooks} lifecycle hooks registered"));
    }
    None
}

/// Whether `joint` carries any binding state.
#[must_use]
pub fn is_bound(scene: &Scene, joint: NodeHandle) -> bool {
    evidence(scene, joint).is_some()
}

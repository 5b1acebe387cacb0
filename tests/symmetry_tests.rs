//! Symmetry Integration Tests
//!
//! Tests for:
//! - bind: validation, wiring, offset capture, live mirroring
//! - unbind: full and idempotent teardown
//! - Lifecycle hooks: teardown on deletion and scene events
//! - Selection-driven execute / try_execute
//! - Undo of bind and unbind

use glam::DVec3;
use symmetry::errors::{ErrorKind, SymmetryError};
use symmetry::scene::{LifecycleEvent, NodeHandle, NodeKind, Scene, plug};
use symmetry::settings::{RotateOffsetMode, SymmetrySettings};
use symmetry::symmetry::binding::{BINDING_ATTRS, HOOK_IDS, OFFSET_SCALE, OFFSET_TRANSLATE};
use symmetry::symmetry::{
    BindingNames, ConstraintBinding, MirrorAxis, bind, is_bound, lifecycle, unbind,
};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f64 = 1e-6;

fn vec3_approx(a: DVec3, b: DVec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

/// Two unparented joints at the given positions.
fn joint_pair(scene: &mut Scene, left: DVec3, right: DVec3) -> anyhow::Result<(NodeHandle, NodeHandle)> {
    let l = scene.create_joint("arm_L", None)?;
    let r = scene.create_joint("arm_R", None)?;
    scene.set_attr(l, "translate", left)?;
    scene.set_attr(r, "translate", right)?;
    Ok((l, r))
}

fn arms(scene: &mut Scene) -> anyhow::Result<(NodeHandle, NodeHandle)> {
    joint_pair(scene, DVec3::new(5.0, 0.0, 0.0), DVec3::new(-5.0, 0.0, 0.0))
}

fn bind_x(scene: &mut Scene, source: NodeHandle, target: NodeHandle) -> symmetry::errors::Result<ConstraintBinding> {
    bind(scene, source, target, MirrorAxis::X, &SymmetrySettings::default())
}

fn attr_count(scene: &Scene, handle: NodeHandle) -> usize {
    scene.node(handle).map_or(0, |n| n.attributes().len())
}

/// Asserts that nothing of a binding is left on `target`.
fn assert_torn_down(scene: &Scene, target: NodeHandle) {
    let names = BindingNames::new("arm_R");
    for (name, _) in names.entries() {
        assert_eq!(scene.find(name), None, "{name} still exists");
    }
    if scene.contains(target) {
        for attr in BINDING_ATTRS {
            assert!(!scene.has_attr(target, attr), "{attr} still present");
        }
        for channel in ["translate", "rotate", "scale", "rotateOrder", "jointOrient"] {
            assert!(!scene.is_driven(&plug(target, channel)), "{channel} still driven");
        }
    }
    assert!(scene.hooks().owned_by(target).is_empty());
    assert!(!is_bound(scene, target));
}

// ============================================================================
// Bind: wiring & mirroring
// ============================================================================

#[test]
fn bind_mirrors_translation_across_x() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    let binding = bind_x(&mut scene, l, r)?;

    assert!(vec3_approx(binding.offsets.translate, DVec3::ZERO));
    assert!(vec3_approx(scene.get_vec3(r, "translate")?, DVec3::new(-5.0, 0.0, 0.0)));

    scene.set_attr(l, "translate", DVec3::new(6.0, 0.0, 0.0))?;
    assert!(vec3_approx(scene.get_vec3(r, "translate")?, DVec3::new(-6.0, 0.0, 0.0)));
    assert!(vec3_approx(scene.world_translation(r)?, DVec3::new(-6.0, 0.0, 0.0)));

    scene.set_attr(l, "translateZ", 2.0)?;
    assert!(vec3_approx(scene.get_vec3(r, "translate")?, DVec3::new(-6.0, 0.0, 2.0)));
    assert!(scene.warnings().is_empty());
    Ok(())
}

#[test]
fn bind_keeps_captured_offset_while_driving() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = joint_pair(&mut scene, DVec3::new(5.0, 0.0, 0.0), DVec3::new(-4.0, 1.0, 0.0))?;
    let binding = bind_x(&mut scene, l, r)?;

    // offset = P_target - C
    let constrained = scene.get_vec3(binding.mirror, "constraintTranslate")?;
    assert!(vec3_approx(constrained, DVec3::new(-5.0, 0.0, 0.0)));
    assert!(vec3_approx(binding.offsets.translate, DVec3::new(1.0, 1.0, 0.0)));
    assert!(vec3_approx(scene.get_vec3(r, OFFSET_TRANSLATE)?, DVec3::new(1.0, 1.0, 0.0)));

    // Pose preserved at bind time
    assert!(vec3_approx(scene.world_translation(r)?, DVec3::new(-4.0, 1.0, 0.0)));

    scene.set_attr(l, "translateX", 6.0)?;
    assert!(vec3_approx(scene.get_vec3(r, "translate")?, DVec3::new(-5.0, 1.0, 0.0)));
    Ok(())
}

#[test]
fn offset_attributes_are_keyable_and_editable() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    bind_x(&mut scene, l, r)?;

    let attr = scene.node(r).and_then(|n| n.attribute(OFFSET_TRANSLATE)).cloned();
    assert!(attr.is_some_and(|a| a.is_keyable()));

    scene.set_attr(r, "symmetryOffsetTranslateY", 3.0)?;
    assert!(vec3_approx(scene.get_vec3(r, "translate")?, DVec3::new(-5.0, 3.0, 0.0)));
    Ok(())
}

#[test]
fn offset_scale_is_target_over_source() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    scene.set_attr(l, "scale", DVec3::new(2.0, 1.0, 1.0))?;
    scene.set_attr(r, "scale", DVec3::new(2.0, 1.0, 1.0))?;
    let binding = bind_x(&mut scene, l, r)?;

    assert!(vec3_approx(binding.offsets.scale, DVec3::ONE));
    assert!(vec3_approx(scene.get_vec3(r, OFFSET_SCALE)?, DVec3::ONE));
    assert!(vec3_approx(scene.world_scale(r)?, DVec3::new(2.0, 1.0, 1.0)));

    scene.set_attr(l, "scaleX", 3.0)?;
    assert!(vec3_approx(scene.get_vec3(r, "scale")?, DVec3::new(3.0, 1.0, 1.0)));
    Ok(())
}

#[test]
fn offset_scale_ratio_is_preserved() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    scene.set_attr(l, "scale", DVec3::new(2.0, 1.0, 1.0))?;
    scene.set_attr(r, "scale", DVec3::new(4.0, 1.0, 0.5))?;
    let binding = bind_x(&mut scene, l, r)?;

    assert!(vec3_approx(binding.offsets.scale, DVec3::new(2.0, 1.0, 0.5)));
    assert!(vec3_approx(scene.world_scale(r)?, DVec3::new(4.0, 1.0, 0.5)));
    Ok(())
}

#[test]
fn exactly_one_axis_flag_matches_request() -> anyhow::Result<()> {
    for axis in MirrorAxis::ALL {
        let mut scene = Scene::new();
        let (l, r) = arms(&mut scene)?;
        let binding = bind(&mut scene, l, r, axis, &SymmetrySettings::default())?;

        for (flag, expected) in [("xAxis", MirrorAxis::X), ("yAxis", MirrorAxis::Y), ("zAxis", MirrorAxis::Z)] {
            let on = scene.get_attr(binding.mirror, flag)?.as_bool();
            assert_eq!(on, Some(expected == axis), "{flag} for {axis}");
        }
        assert_eq!(binding.axis, axis);
    }
    Ok(())
}

#[test]
fn bind_mirrors_across_y() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = joint_pair(&mut scene, DVec3::new(1.0, 3.0, 0.0), DVec3::new(1.0, -3.0, 0.0))?;
    bind(&mut scene, l, r, MirrorAxis::Y, &SymmetrySettings::default())?;

    scene.set_attr(l, "translateY", 4.0)?;
    assert!(vec3_approx(scene.get_vec3(r, "translate")?, DVec3::new(1.0, -4.0, 0.0)));
    Ok(())
}

#[test]
fn bind_mirrors_joint_orient_and_rotate_order() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    scene.set_attr(l, "jointOrient", DVec3::new(0.0, 0.0, 10.0))?;
    scene.set_attr(l, "rotateOrder", 2)?;
    let binding = bind_x(&mut scene, l, r)?;

    assert!(vec3_approx(scene.get_vec3(r, "jointOrient")?, DVec3::new(0.0, 0.0, -10.0)));
    assert_eq!(scene.get_attr(r, "rotateOrder")?.as_int(), Some(2));
    assert!(vec3_approx(
        scene.get_vec3(binding.mirror, "constraintRotate")?,
        DVec3::ZERO
    ));
    Ok(())
}

#[test]
fn rotate_offset_is_measured_against_source() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    scene.set_attr(l, "rotate", DVec3::new(0.0, 0.0, 30.0))?;
    scene.set_attr(r, "rotate", DVec3::new(0.0, 0.0, -30.0))?;
    let binding = bind_x(&mut scene, l, r)?;

    assert!(vec3_approx(binding.offsets.rotate, DVec3::new(0.0, 0.0, -60.0)));
    assert!(vec3_approx(
        scene.get_vec3(binding.mirror, "constraintRotate")?,
        DVec3::new(0.0, 0.0, -30.0)
    ));
    Ok(())
}

#[test]
fn mirrored_rotate_offset_preserves_pose() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    scene.set_attr(l, "rotate", DVec3::new(0.0, 0.0, 30.0))?;
    scene.set_attr(r, "rotate", DVec3::new(0.0, 0.0, -30.0))?;
    let settings = SymmetrySettings {
        rotate_offset: RotateOffsetMode::Mirrored,
        ..Default::default()
    };
    let binding = bind(&mut scene, l, r, MirrorAxis::X, &settings)?;

    assert!(vec3_approx(binding.offsets.rotate, DVec3::ZERO));
    assert!(vec3_approx(scene.world_rotation(r)?, DVec3::new(0.0, 0.0, -30.0)));

    scene.set_attr(l, "rotateZ", 45.0)?;
    assert!(vec3_approx(scene.get_vec3(r, "rotate")?, DVec3::new(0.0, 0.0, -45.0)));
    Ok(())
}

#[test]
fn target_channels_reject_direct_writes() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    bind_x(&mut scene, l, r)?;

    for channel in ["translate", "rotate", "scale", "jointOrient"] {
        assert!(scene.set_attr(r, channel, DVec3::ONE).is_err(), "{channel}");
    }
    assert!(scene.set_attr(r, "rotateOrder", 1).is_err());
    Ok(())
}

#[test]
fn bind_creates_named_aux_nodes() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    let before = scene.node_count();
    let binding = bind_x(&mut scene, l, r)?;

    assert_eq!(scene.node_count(), before + 4);
    assert_eq!(scene.find("arm_R_symmetry_constraint"), Some(binding.mirror));
    assert_eq!(scene.find("arm_R_symmetry_translate"), Some(binding.translate_combiner));
    assert_eq!(scene.find("arm_R_symmetry_rotate"), Some(binding.rotate_combiner));
    assert_eq!(scene.find("arm_R_symmetry_scale"), Some(binding.scale_combiner));
    assert_eq!(scene.parent_of(binding.mirror), Some(r));
    assert_eq!(scene.kind_of(binding.scale_combiner), Some(NodeKind::MultiplyDivide));
    assert_eq!(binding.source, l);
    assert_eq!(binding.target, r);
    Ok(())
}

// ============================================================================
// Bind: validation
// ============================================================================

#[test]
fn bind_twice_fails_without_changes() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    bind_x(&mut scene, l, r)?;
    let nodes = scene.node_count();
    let attrs = attr_count(&scene, r);
    let connections = scene.connection_count();
    let hooks = scene.hooks().len();

    let err = bind_x(&mut scene, l, r).unwrap_err();
    assert!(matches!(err, SymmetryError::AlreadyBound { .. }));
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    assert_eq!(scene.node_count(), nodes);
    assert_eq!(attr_count(&scene, r), attrs);
    assert_eq!(scene.connection_count(), connections);
    assert_eq!(scene.hooks().len(), hooks);
    Ok(())
}

#[test]
fn bound_target_cannot_be_a_source() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    let other = scene.create_joint("other", None)?;
    bind_x(&mut scene, l, r)?;

    let err = bind_x(&mut scene, r, other).unwrap_err();
    assert!(matches!(err, SymmetryError::AlreadyBound { ref joint, .. } if joint == "arm_R"));
    Ok(())
}

#[test]
fn bind_rejects_same_and_invalid_joints() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    let group = scene.create_node(NodeKind::Transform, "group", None)?;

    assert!(matches!(bind_x(&mut scene, l, l), Err(SymmetryError::SameJoint(_))));
    assert!(matches!(bind_x(&mut scene, group, r), Err(SymmetryError::InvalidJoint { .. })));

    scene.delete_node(l)?;
    assert!(matches!(bind_x(&mut scene, l, r), Err(SymmetryError::InvalidJoint { .. })));
    assert!(!is_bound(&scene, r));
    Ok(())
}

#[test]
fn bind_rejects_driven_target_channel() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    let driver = scene.create_joint("driver", None)?;
    scene.connect(&plug(driver, "translateX"), &plug(r, "translateX"))?;
    let nodes = scene.node_count();

    let err = bind_x(&mut scene, l, r).unwrap_err();
    assert!(matches!(err, SymmetryError::ChannelDriven { ref attr, .. } if attr == "translate"));
    assert_eq!(scene.node_count(), nodes);
    Ok(())
}

#[test]
fn sibling_joints_are_rejected_unless_allowed() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let hips = scene.create_joint("hips", None)?;
    let l = scene.create_joint("leg_L", Some(hips))?;
    let r = scene.create_joint("leg_R", Some(hips))?;
    scene.set_attr(l, "translateX", 2.0)?;
    scene.set_attr(r, "translateX", -2.0)?;

    let err = bind_x(&mut scene, l, r).unwrap_err();
    assert!(matches!(err, SymmetryError::SiblingConflict { ref parent, .. } if parent == "hips"));

    let settings = SymmetrySettings {
        reject_sibling_joints: false,
        ..Default::default()
    };
    bind(&mut scene, l, r, MirrorAxis::X, &settings)?;
    scene.set_attr(l, "translateX", 3.0)?;
    assert!(vec3_approx(scene.get_vec3(r, "translate")?, DVec3::new(-3.0, 0.0, 0.0)));
    Ok(())
}

#[test]
fn bind_rejects_zero_source_scale() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    scene.set_attr(l, "scaleY", 0.0)?;

    let err = bind_x(&mut scene, l, r).unwrap_err();
    assert!(matches!(err, SymmetryError::InvalidJoint { .. }));
    assert!(!is_bound(&scene, r));
    Ok(())
}

#[test]
fn bind_rejects_source_below_target() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let r = scene.create_joint("arm_R", None)?;
    let elbow = scene.create_joint("elbow", Some(r))?;
    let l = scene.create_joint("arm_L", Some(elbow))?;
    scene.set_attr(r, "translateX", -5.0)?;
    let nodes = scene.node_count();

    for source in [elbow, l] {
        let err = bind_x(&mut scene, source, r).unwrap_err();
        assert!(matches!(err, SymmetryError::DescendantSource { ref target_joint, .. } if target_joint == "arm_R"));
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }
    assert_eq!(scene.node_count(), nodes);
    assert!(!is_bound(&scene, r));
    assert!(scene.undo_labels().is_empty());
    Ok(())
}

#[test]
fn target_may_sit_below_source() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let l = scene.create_joint("arm_L", None)?;
    let r = scene.create_joint("arm_R", Some(l))?;
    scene.set_attr(l, "translateX", 5.0)?;
    bind_x(&mut scene, l, r)?;

    scene.set_attr(l, "translateX", 6.0)?;
    assert!(scene.get_vec3(r, "translate")?.is_finite());
    assert!(scene.warnings().is_empty());
    Ok(())
}

#[test]
fn bind_rejects_singular_target_parent() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let l = scene.create_joint("arm_L", None)?;
    let group = scene.create_node(NodeKind::Transform, "group", None)?;
    scene.set_attr(group, "scale", DVec3::new(0.0, 1.0, 1.0))?;
    let r = scene.create_joint("arm_R", Some(group))?;
    scene.set_attr(l, "translateX", 5.0)?;
    let nodes = scene.node_count();

    let err = bind_x(&mut scene, l, r).unwrap_err();
    assert!(matches!(err, SymmetryError::InvalidJoint { ref name, .. } if name == "arm_R"));
    assert_eq!(scene.node_count(), nodes);
    assert!(scene.get_vec3(r, "translate")?.is_finite());
    assert!(scene.warnings().is_empty());
    Ok(())
}

#[test]
fn parented_target_moves_by_parent_offset_at_bind() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let left_group = scene.create_node(NodeKind::Transform, "group_L", None)?;
    let right_group = scene.create_node(NodeKind::Transform, "group_R", None)?;
    scene.set_attr(left_group, "translateY", 10.0)?;
    scene.set_attr(right_group, "translateY", 10.0)?;
    let l = scene.create_joint("arm_L", Some(left_group))?;
    let r = scene.create_joint("arm_R", Some(right_group))?;
    scene.set_attr(l, "translateX", 5.0)?;
    scene.set_attr(r, "translateX", -5.0)?;
    assert!(vec3_approx(scene.world_translation(r)?, DVec3::new(-5.0, 10.0, 0.0)));

    // World position minus the local mirrored position: the parent's offset
    // is counted twice.
    let binding = bind_x(&mut scene, l, r)?;
    let constrained = scene.get_vec3(binding.mirror, "constraintTranslate")?;
    assert!(vec3_approx(constrained, DVec3::new(-5.0, 0.0, 0.0)));
    assert!(vec3_approx(binding.offsets.translate, DVec3::new(0.0, 10.0, 0.0)));
    assert!(vec3_approx(scene.world_translation(r)?, DVec3::new(-5.0, 20.0, 0.0)));
    Ok(())
}

// ============================================================================
// Unbind
// ============================================================================

#[test]
fn unbind_removes_everything() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    let nodes = scene.node_count();
    let attrs = attr_count(&scene, r);
    bind_x(&mut scene, l, r)?;

    assert!(unbind(&mut scene, r));
    assert_torn_down(&scene, r);
    assert_eq!(scene.node_count(), nodes);
    assert_eq!(attr_count(&scene, r), attrs);
    assert_eq!(scene.connection_count(), 0);
    assert!(scene.hooks().is_empty());

    // The target keeps its last pose and is writable again.
    assert!(vec3_approx(scene.get_vec3(r, "translate")?, DVec3::new(-5.0, 0.0, 0.0)));
    scene.set_attr(r, "translate", DVec3::ZERO)?;
    Ok(())
}

#[test]
fn unbind_twice_is_harmless() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    bind_x(&mut scene, l, r)?;

    assert!(unbind(&mut scene, r));
    assert!(!unbind(&mut scene, r));
    assert!(!unbind(&mut scene, l));
    assert!(scene.warnings().is_empty());
    assert_torn_down(&scene, r);
    Ok(())
}

#[test]
fn unbind_cleans_partial_state() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    let binding = bind_x(&mut scene, l, r)?;
    scene.delete_node(binding.translate_combiner)?;

    assert!(is_bound(&scene, r));
    assert!(unbind(&mut scene, r));
    assert_torn_down(&scene, r);
    Ok(())
}

#[test]
fn rebind_after_unbind_recaptures_offsets() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    bind_x(&mut scene, l, r)?;
    unbind(&mut scene, r);

    scene.set_attr(r, "translateY", 2.0)?;
    let binding = bind_x(&mut scene, l, r)?;
    assert!(vec3_approx(binding.offsets.translate, DVec3::new(0.0, 2.0, 0.0)));
    Ok(())
}

// ============================================================================
// Lifecycle hooks
// ============================================================================

#[test]
fn deleting_source_tears_down() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    bind_x(&mut scene, l, r)?;
    scene.set_attr(l, "translateX", 7.0)?;

    scene.delete_node(l)?;
    assert_torn_down(&scene, r);
    assert!(scene.hooks().is_empty());
    assert!(vec3_approx(scene.get_vec3(r, "translate")?, DVec3::new(-7.0, 0.0, 0.0)));
    assert!(scene.warnings().is_empty());
    Ok(())
}

#[test]
fn deleting_target_tears_down() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    bind_x(&mut scene, l, r)?;

    scene.delete_node(r)?;
    assert_torn_down(&scene, r);
    assert!(scene.hooks().is_empty());
    assert_eq!(scene.node_count(), 1);
    assert!(scene.contains(l));
    Ok(())
}

#[test]
fn deleting_mirror_tears_down() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    let binding = bind_x(&mut scene, l, r)?;

    scene.delete_node(binding.mirror)?;
    assert_torn_down(&scene, r);
    assert!(scene.hooks().is_empty());
    assert_eq!(scene.node_count(), 2);
    Ok(())
}

#[test]
fn scene_events_tear_down() -> anyhow::Result<()> {
    for event in [LifecycleEvent::SceneOpened, LifecycleEvent::AppQuitting] {
        let mut scene = Scene::new();
        let (l, r) = arms(&mut scene)?;
        bind_x(&mut scene, l, r)?;

        scene.emit(event);
        assert_torn_down(&scene, r);
        assert!(scene.hooks().is_empty(), "{event:?}");
    }
    Ok(())
}

#[test]
fn unrelated_deletion_keeps_binding() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    let other = scene.create_joint("other", None)?;
    bind_x(&mut scene, l, r)?;

    scene.delete_node(other)?;
    assert!(ConstraintBinding::find(&scene, r).is_some());
    assert_eq!(scene.hooks().len(), 5);
    Ok(())
}

#[test]
fn hook_ids_are_persisted_in_order() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    let binding = bind_x(&mut scene, l, r)?;

    let persisted = lifecycle::persisted_hooks(&scene, r);
    assert_eq!(persisted.len(), 5);
    assert_eq!(
        persisted.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
        binding.hooks
    );
    assert!(persisted.iter().all(|(_, live)| *live));
    for id in &binding.hooks {
        let info = scene.hooks().info(*id);
        assert_eq!(info.and_then(|i| i.owner), Some(r));
    }
    Ok(())
}

#[test]
fn force_cancel_revokes_hooks_only() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    bind_x(&mut scene, l, r)?;

    assert_eq!(lifecycle::force_cancel(&mut scene, r), 5);
    assert!(scene.hooks().is_empty());
    assert!(!scene.has_attr(r, HOOK_IDS));
    assert!(lifecycle::persisted_hooks(&scene, r).is_empty());

    // Without hooks, deleting the source leaves the network behind.
    scene.delete_node(l)?;
    assert!(scene.find("arm_R_symmetry_translate").is_some());
    assert!(unbind(&mut scene, r));
    assert_torn_down(&scene, r);
    Ok(())
}

// ============================================================================
// Inspection
// ============================================================================

#[test]
fn find_reconstructs_binding() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = joint_pair(&mut scene, DVec3::new(5.0, 1.0, 0.0), DVec3::new(-5.0, 2.0, 0.0))?;
    let binding = bind(&mut scene, l, r, MirrorAxis::Z, &SymmetrySettings::default())?;

    assert_eq!(ConstraintBinding::find(&scene, r), Some(binding));
    assert_eq!(ConstraintBinding::find(&scene, l), None);
    assert!(is_bound(&scene, r));
    assert!(!is_bound(&scene, l));
    Ok(())
}

// ============================================================================
// Selection-driven execute
// ============================================================================

#[test]
fn execute_binds_selected_pair() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    scene.select(&[l, r]);

    let binding = symmetry::execute(&mut scene, MirrorAxis::X);
    assert!(binding.is_some_and(|b| b.source == l && b.target == r));
    assert!(scene.warnings().is_empty());
    Ok(())
}

#[test]
fn execute_warns_on_bad_selection() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, _) = arms(&mut scene)?;
    scene.select(&[l]);

    assert!(symmetry::execute(&mut scene, MirrorAxis::X).is_none());
    assert_eq!(scene.warnings().len(), 1);
    assert_eq!(scene.node_count(), 2);

    let err = symmetry::try_execute(&mut scene, MirrorAxis::X).unwrap_err();
    assert!(matches!(err, SymmetryError::SelectionCount { expected: 2, found: 1 }));
    assert_eq!(err.kind(), ErrorKind::Selection);
    Ok(())
}

#[test]
fn execute_rejects_non_joint_selection() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, _) = arms(&mut scene)?;
    let group = scene.create_node(NodeKind::Transform, "group", None)?;
    scene.select(&[l, group]);

    let err = symmetry::try_execute(&mut scene, MirrorAxis::X).unwrap_err();
    assert!(matches!(err, SymmetryError::SelectionType { kind: "transform", .. }));
    Ok(())
}

#[test]
fn execute_with_falls_back_to_default_axis() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    scene.select(&[l, r]);
    let settings = SymmetrySettings {
        default_axis: MirrorAxis::Z,
        ..Default::default()
    };

    let binding = symmetry::execute_with(&mut scene, None, &settings);
    assert_eq!(binding.map(|b| b.axis), Some(MirrorAxis::Z));
    Ok(())
}

// ============================================================================
// Undo
// ============================================================================

#[test]
fn undo_reverts_bind() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    let nodes = scene.node_count();
    bind_x(&mut scene, l, r)?;

    assert_eq!(scene.undo().as_deref(), Some("Create symmetry constraint"));
    assert_eq!(scene.node_count(), nodes);
    assert!(!is_bound(&scene, r));
    assert!(scene.hooks().is_empty());
    scene.set_attr(r, "translate", DVec3::ZERO)?;
    Ok(())
}

#[test]
fn undo_refuses_to_revert_later_edits() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    let binding = bind_x(&mut scene, l, r)?;
    let other = scene.create_joint("other", None)?;
    scene.set_attr(l, "translateX", 9.0)?;

    assert_eq!(scene.undo(), None);
    assert_eq!(scene.warnings().len(), 1);
    assert!(scene.contains(other));
    assert!(vec3_approx(scene.get_vec3(l, "translate")?, DVec3::new(9.0, 0.0, 0.0)));
    assert!(vec3_approx(scene.get_vec3(r, "translate")?, DVec3::new(-9.0, 0.0, 0.0)));
    assert_eq!(ConstraintBinding::find(&scene, r).map(|b| b.mirror), Some(binding.mirror));
    Ok(())
}

#[test]
fn undo_reverts_unbind() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    let (l, r) = arms(&mut scene)?;
    let binding = bind_x(&mut scene, l, r)?;
    unbind(&mut scene, r);

    assert_eq!(scene.undo().as_deref(), Some("Remove symmetry constraint"));
    assert_eq!(ConstraintBinding::find(&scene, r), Some(binding));

    scene.set_attr(l, "translateX", 8.0)?;
    assert!(vec3_approx(scene.get_vec3(r, "translate")?, DVec3::new(-8.0, 0.0, 0.0)));
    Ok(())
}

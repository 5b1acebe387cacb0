//! Node evaluation.
//!
//! Each node kind turns its current input values (plus, for transforms, the
//! parent's world matrix) into output values. Evaluation is pure: the scene
//! decides which outputs changed and pushes them along connections.

use glam::{DMat4, DQuat, DVec3};
use smallvec::{SmallVec, smallvec};

use crate::scene::node::{Node, NodeKind};
use crate::scene::transform::{Pose, RotateOrder, compose_local, euler_to_quat, quat_to_euler};
use crate::scene::value::AttrValue;

pub(crate) type Outputs = SmallVec<[(&'static str, AttrValue); 5]>;

/// Evaluates `node` and returns its output attributes.
pub(crate) fn evaluate(node: &Node, parent_world: DMat4) -> Outputs {
    match node.kind {
        NodeKind::Transform | NodeKind::Joint => transform(node, parent_world),
        NodeKind::SymmetryConstraint => symmetry(node),
        NodeKind::PlusMinusAverage => plus_minus_average(node),
        NodeKind::MultiplyDivide => multiply_divide(node),
    }
}

fn transform(node: &Node, parent_world: DMat4) -> Outputs {
    let local = compose_local(
        node.vec3_or("translate", DVec3::ZERO),
        node.vec3_or("rotate", DVec3::ZERO),
        node.vec3_or("scale", DVec3::ONE),
        node.vec3_or("jointOrient", DVec3::ZERO),
        RotateOrder::from_index(node.int_or("rotateOrder", 0)),
    );
    let world = parent_world * local;
    smallvec![
        ("worldMatrix", AttrValue::Matrix(world)),
        ("parentMatrix", AttrValue::Matrix(parent_world)),
        ("parentInverseMatrix", AttrValue::Matrix(parent_world.inverse())),
        ("worldInverseMatrix", AttrValue::Matrix(world.inverse())),
    ]
}

/// Sign applied to each component when reflecting across the plane normal to `axis`.
fn reflection(axis: usize) -> DVec3 {
    let mut signs = DVec3::ONE;
    signs[axis] = -1.0;
    signs
}

/// Reflects a rotation across the plane normal to `axis`.
///
/// Conjugating by a reflection keeps the rotation angle about the mirror
/// axis and negates it about the other two.
pub(crate) fn reflect_rotation(rotation: DQuat, axis: usize) -> DQuat {
    let v = -reflection(axis) * DVec3::new(rotation.x, rotation.y, rotation.z);
    DQuat::from_xyzw(v.x, v.y, v.z, rotation.w)
}

/// Same reflection applied to Euler angles.
pub(crate) fn reflect_euler(degrees: DVec3, axis: usize) -> DVec3 {
    -reflection(axis) * degrees
}

fn mirror_axis(node: &Node) -> Option<usize> {
    ["xAxis", "yAxis", "zAxis"]
        .iter()
        .position(|flag| node.bool_or(flag, false))
}

fn symmetry(node: &Node) -> Outputs {
    let order = RotateOrder::from_index(node.int_or("targetRotateOrder", 0));
    let joint_orient = node.vec3_or("targetJointOrient", DVec3::ZERO);

    // Driver pose rebuilt from its parent space and local channels.
    let driver_world = node.matrix_or_identity("targetParentMatrix")
        * compose_local(
            node.vec3_or("targetTranslate", DVec3::ZERO),
            node.vec3_or("targetRotate", DVec3::ZERO),
            node.vec3_or("targetScale", DVec3::ONE),
            joint_orient,
            order,
        );
    let mut pose = Pose::from_matrix(&driver_world);

    let mirrored_orient = match mirror_axis(node) {
        Some(axis) => {
            pose.translation *= reflection(axis);
            pose.rotation = reflect_rotation(pose.rotation, axis);
            reflect_euler(joint_orient, axis)
        }
        None => joint_orient,
    };

    let local = Pose::from_matrix(
        &(node.matrix_or_identity("constraintInverseParentWorldMatrix") * pose.to_matrix()),
    );
    let orient = euler_to_quat(mirrored_orient, RotateOrder::Xyz);
    let rotate = quat_to_euler(orient.inverse() * local.rotation, order);

    smallvec![
        ("constraintTranslate", AttrValue::Vec3(local.translation)),
        ("constraintRotate", AttrValue::Vec3(rotate)),
        ("constraintScale", AttrValue::Vec3(local.scale)),
        ("constraintRotateOrder", AttrValue::Int(order.index())),
        ("constraintJointOrient", AttrValue::Vec3(mirrored_orient)),
    ]
}

fn plus_minus_average(node: &Node) -> Outputs {
    let a = node.vec3_or("input3D[0]", DVec3::ZERO);
    let b = node.vec3_or("input3D[1]", DVec3::ZERO);
    let out = match node.int_or("operation", 1) {
        1 => a + b,
        2 => a - b,
        3 => (a + b) * 0.5,
        _ => a,
    };
    smallvec![("output3D", AttrValue::Vec3(out))]
}

fn multiply_divide(node: &Node) -> Outputs {
    let a = node.vec3_or("input1", DVec3::ONE);
    let b = node.vec3_or("input2", DVec3::ONE);
    let out = match node.int_or("operation", 1) {
        1 => a * b,
        // Division by zero leaves the numerator untouched, matching the host.
        2 => DVec3::select(b.cmpeq(DVec3::ZERO), a, a / b),
        3 => DVec3::new(a.x.powf(b.x), a.y.powf(b.y), a.z.powf(b.z)),
        _ => a,
    };
    smallvec![("output", AttrValue::Vec3(out))]
}

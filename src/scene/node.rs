use glam::{DMat4, DVec3};

use crate::scene::NodeHandle;
use crate::scene::attribute::Attribute;
use crate::scene::value::{AttrValue, same_float};

/// The fixed set of node types a scene can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Plain transform.
    Transform,
    /// Skeletal joint: a transform with a joint orientation.
    Joint,
    /// Mirrors a driver transform across one world axis.
    SymmetryConstraint,
    /// Adds, subtracts or averages two 3-vectors.
    PlusMinusAverage,
    /// Multiplies, divides or raises two 3-vectors component-wise.
    MultiplyDivide,
}

impl NodeKind {
    /// Host type name of this kind.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Joint => "joint",
            Self::SymmetryConstraint => "symmetryConstraint",
            Self::PlusMinusAverage => "plusMinusAverage",
            Self::MultiplyDivide => "multiplyDivide",
        }
    }

    /// Whether nodes of this kind carry world matrices and may parent other nodes.
    #[inline]
    #[must_use]
    pub fn is_transform(self) -> bool {
        matches!(self, Self::Transform | Self::Joint)
    }

    /// Built-in attribute schema, with default values.
    pub(crate) fn schema(self) -> Vec<Attribute> {
        match self {
            Self::Transform | Self::Joint => vec![
                Attribute::new("translate", DVec3::ZERO).keyable().compound_xyz(),
                Attribute::new("rotate", DVec3::ZERO).keyable().compound_xyz(),
                Attribute::new("scale", DVec3::ONE).keyable().compound_xyz(),
                Attribute::new("rotateOrder", 0),
                Attribute::new("jointOrient", DVec3::ZERO).compound_xyz(),
                Attribute::output("worldMatrix", DMat4::IDENTITY),
                Attribute::output("parentMatrix", DMat4::IDENTITY),
                Attribute::output("parentInverseMatrix", DMat4::IDENTITY),
                Attribute::output("worldInverseMatrix", DMat4::IDENTITY),
            ],
            Self::SymmetryConstraint => vec![
                Attribute::new("targetTranslate", DVec3::ZERO).compound_xyz(),
                Attribute::new("targetRotate", DVec3::ZERO).compound_xyz(),
                Attribute::new("targetScale", DVec3::ONE).compound_xyz(),
                Attribute::new("targetRotateOrder", 0),
                Attribute::new("targetJointOrient", DVec3::ZERO).compound_xyz(),
                Attribute::new("targetParentMatrix", DMat4::IDENTITY),
                Attribute::new("targetWorldMatrix", DMat4::IDENTITY),
                Attribute::new("constraintInverseParentWorldMatrix", DMat4::IDENTITY),
                Attribute::new("xAxis", true),
                Attribute::new("yAxis", false),
                Attribute::new("zAxis", false),
                Attribute::output("constraintTranslate", DVec3::ZERO).compound_xyz(),
                Attribute::output("constraintRotate", DVec3::ZERO).compound_xyz(),
                Attribute::output("constraintScale", DVec3::ONE).compound_xyz(),
                Attribute::output("constraintRotateOrder", 0),
                Attribute::output("constraintJointOrient", DVec3::ZERO).compound_xyz(),
            ],
            Self::PlusMinusAverage => vec![
                Attribute::new("operation", 1),
                Attribute::new("input3D[0]", DVec3::ZERO),
                Attribute::new("input3D[1]", DVec3::ZERO),
                Attribute::output("output3D", DVec3::ZERO).compound_xyz(),
            ],
            Self::MultiplyDivide => vec![
                Attribute::new("operation", 1),
                Attribute::new("input1", DVec3::ONE),
                Attribute::new("input2", DVec3::ONE),
                Attribute::output("output", DVec3::ONE).compound_xyz(),
            ],
        }
    }
}

/// A scene node: identity, hierarchy links and attribute storage.
///
/// Nodes are owned by the [`Scene`](crate::scene::Scene) and addressed by
/// [`NodeHandle`]. All mutation goes through the scene so that connections
/// and propagation stay consistent.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
    pub(crate) attributes: Vec<Attribute>,
}

impl Node {
    pub(crate) fn new(name: String, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            parent: None,
            children: Vec::new(),
            attributes: kind.schema(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// All attributes in declaration order (built-ins first, then dynamic ones).
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Resolves `name` to an attribute and, for compound children, the component index.
    pub(crate) fn resolve(&self, name: &str) -> Option<(usize, Option<usize>)> {
        self.attributes.iter().enumerate().find_map(|(i, a)| {
            if a.name == name {
                Some((i, None))
            } else {
                a.child_index(name).map(|c| (i, Some(c)))
            }
        })
    }

    /// True when `name` is an attribute or a compound child of this node.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Reads an attribute or compound child.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<AttrValue> {
        let (index, component) = self.resolve(name)?;
        let value = &self.attributes[index].value;
        match component {
            None => Some(value.clone()),
            Some(c) => value.as_vec3().map(|v| AttrValue::Float(v[c])),
        }
    }

    /// Reads a built-in 3-vector, falling back to `default` when absent.
    pub(crate) fn vec3_or(&self, name: &str, default: DVec3) -> DVec3 {
        self.attribute(name)
            .and_then(|a| a.value.as_vec3())
            .unwrap_or(default)
    }

    pub(crate) fn matrix_or_identity(&self, name: &str) -> DMat4 {
        self.attribute(name)
            .and_then(|a| a.value.as_matrix())
            .unwrap_or(DMat4::IDENTITY)
    }

    pub(crate) fn int_or(&self, name: &str, default: i32) -> i32 {
        self.attribute(name)
            .and_then(|a| a.value.as_int())
            .unwrap_or(default)
    }

    pub(crate) fn bool_or(&self, name: &str, default: bool) -> bool {
        self.attribute(name)
            .and_then(|a| a.value.as_bool())
            .unwrap_or(default)
    }

    /// Stores a value without type or flag checks. Returns `true` if it changed.
    pub(crate) fn store(&mut self, name: &str, value: AttrValue) -> bool {
        let Some((index, component)) = self.resolve(name) else {
            return false;
        };
        let slot = &mut self.attributes[index].value;
        match (component, slot, value) {
            (None, slot, value) => {
                if slot.same_as(&value) {
                    false
                } else {
                    *slot = value;
                    true
                }
            }
            (Some(c), AttrValue::Vec3(v), AttrValue::Float(f)) => {
                if same_float(v[c], f) {
                    false
                } else {
                    v[c] = f;
                    true
                }
            }
            _ => false,
        }
    }

    /// Names that alias the same storage as `name`: the compound parent and its children.
    pub(crate) fn storage_family(&self, name: &str) -> Vec<String> {
        let Some((index, _)) = self.resolve(name) else {
            return Vec::new();
        };
        let attr = &self.attributes[index];
        let mut family = vec![attr.name.clone()];
        if let Some(children) = &attr.children {
            family.extend(children.iter().cloned());
        }
        family
    }
}

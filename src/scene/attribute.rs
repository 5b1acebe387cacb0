use bitflags::bitflags;

use crate::scene::value::{AttrType, AttrValue};

bitflags! {
    /// Behavioural flags of an attribute.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct AttrFlags: u8 {
        /// Shown in the channel box and animatable.
        const KEYABLE = 1 << 0;
        /// Computed by the owning node; never written from outside.
        const OUTPUT  = 1 << 1;
        /// Added at runtime through `Scene::add_attr`; removable.
        const DYNAMIC = 1 << 2;
    }
}

/// A named, typed value slot on a node.
///
/// A 3-vector attribute may be declared as a compound of three scalar
/// children (`translate` → `translateX`, `translateY`, `translateZ`). The
/// children share the parent's storage and are addressed by name like any
/// other attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub(crate) name: String,
    pub(crate) value: AttrValue,
    pub(crate) flags: AttrFlags,
    pub(crate) children: Option<[String; 3]>,
}

impl Attribute {
    /// Creates a plain input attribute holding `default`.
    pub fn new(name: impl Into<String>, default: impl Into<AttrValue>) -> Self {
        Self {
            name: name.into(),
            value: default.into(),
            flags: AttrFlags::empty(),
            children: None,
        }
    }

    /// Creates a computed attribute.
    pub fn output(name: impl Into<String>, default: impl Into<AttrValue>) -> Self {
        let mut attr = Self::new(name, default);
        attr.flags |= AttrFlags::OUTPUT;
        attr
    }

    #[must_use]
    pub fn keyable(mut self) -> Self {
        self.flags |= AttrFlags::KEYABLE;
        self
    }

    #[must_use]
    pub(crate) fn dynamic(mut self) -> Self {
        self.flags |= AttrFlags::DYNAMIC;
        self
    }

    /// Groups a 3-vector attribute as a compound of `<name>X`, `<name>Y`
    /// and `<name>Z`. Has no effect on other types.
    #[must_use]
    pub fn compound_xyz(mut self) -> Self {
        if self.value.attr_type() == AttrType::Vec3 {
            self.children = Some([
                format!("{}X", self.name),
                format!("{}Y", self.name),
                format!("{}Z", self.name),
            ]);
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> &AttrValue {
        &self.value
    }

    #[inline]
    #[must_use]
    pub fn flags(&self) -> AttrFlags {
        self.flags
    }

    #[inline]
    #[must_use]
    pub fn is_output(&self) -> bool {
        self.flags.contains(AttrFlags::OUTPUT)
    }

    #[inline]
    #[must_use]
    pub fn is_keyable(&self) -> bool {
        self.flags.contains(AttrFlags::KEYABLE)
    }

    #[inline]
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.flags.contains(AttrFlags::DYNAMIC)
    }

    /// Names of the compound children, if any.
    #[must_use]
    pub fn children(&self) -> Option<&[String; 3]> {
        self.children.as_ref()
    }

    /// Index of the compound child called `name`.
    pub(crate) fn child_index(&self, name: &str) -> Option<usize> {
        self.children
            .as_ref()
            .and_then(|c| c.iter().position(|child| child == name))
    }
}

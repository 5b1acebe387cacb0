use glam::{DMat4, DVec3};

/// Type tag of an [`AttrValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrType {
    Bool,
    /// Integers and enums (e.g. `rotateOrder`).
    Int,
    Float,
    Vec3,
    Matrix,
    /// Ordered list of opaque 64-bit identifiers.
    IdList,
}

/// A typed attribute value.
///
/// All continuous data is stored in double precision.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Bool(bool),
    Int(i32),
    Float(f64),
    Vec3(DVec3),
    Matrix(DMat4),
    IdList(Vec<u64>),
}

impl AttrValue {
    #[must_use]
    pub fn attr_type(&self) -> AttrType {
        match self {
            Self::Bool(_) => AttrType::Bool,
            Self::Int(_) => AttrType::Int,
            Self::Float(_) => AttrType::Float,
            Self::Vec3(_) => AttrType::Vec3,
            Self::Matrix(_) => AttrType::Matrix,
            Self::IdList(_) => AttrType::IdList,
        }
    }

    /// Value equality where NaN matches NaN.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => same_float(*a, *b),
            (Self::Vec3(a), Self::Vec3(b)) => {
                a.to_array().iter().zip(b.to_array()).all(|(x, y)| same_float(*x, y))
            }
            (Self::Matrix(a), Self::Matrix(b)) => a
                .to_cols_array()
                .iter()
                .zip(b.to_cols_array())
                .all(|(x, y)| same_float(*x, y)),
            _ => self == other,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_vec3(&self) -> Option<DVec3> {
        match self {
            Self::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_matrix(&self) -> Option<DMat4> {
        match self {
            Self::Matrix(m) => Some(*m),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_id_list(&self) -> Option<&[u64]> {
        match self {
            Self::IdList(ids) => Some(ids),
            _ => None,
        }
    }
}

#[inline]
pub(crate) fn same_float(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<DVec3> for AttrValue {
    fn from(v: DVec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<DMat4> for AttrValue {
    fn from(m: DMat4) -> Self {
        Self::Matrix(m)
    }
}

impl From<Vec<u64>> for AttrValue {
    fn from(ids: Vec<u64>) -> Self {
        Self::IdList(ids)
    }
}

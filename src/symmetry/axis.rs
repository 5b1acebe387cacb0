use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// World axis across which the source is mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MirrorAxis {
    #[default]
    X,
    Y,
    Z,
}

impl MirrorAxis {
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component index (0, 1, 2).
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Name of the constraint flag this axis turns on.
    #[must_use]
    pub fn flag_attr(self) -> &'static str {
        match self {
            Self::X => "xAxis",
            Self::Y => "yAxis",
            Self::Z => "zAxis",
        }
    }

    /// All three flags with the value each must hold for this axis.
    #[must_use]
    pub fn flags(self) -> [(&'static str, bool); 3] {
        Self::ALL.map(|axis| (axis.flag_attr(), axis == self))
    }
}

impl fmt::Display for MirrorAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        };
        f.write_str(name)
    }
}

/// Raised when parsing an axis name fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown mirror axis '{0}', expected X, Y or Z")]
pub struct ParseAxisError(pub String);

impl FromStr for MirrorAxis {
    type Err = ParseAxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(Self::X),
            "Y" => Ok(Self::Y),
            "Z" => Ok(Self::Z),
            _ => Err(ParseAxisError(s.to_string())),
        }
    }
}

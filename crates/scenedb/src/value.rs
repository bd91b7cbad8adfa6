use crate::{group::GroupElement, types::ObjectId};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeMap};
use time::{Date, OffsetDateTime};

/// Dynamic field map of a sample, frame, or embedded document.
pub type Document = BTreeMap<String, Value>;

/// Sentinel strings substituted for IEEE non-finite floats before results
/// leave the engine. JSON transports cannot carry the raw values.
pub const NAN_SENTINEL: &str = "nan";
pub const POS_INF_SENTINEL: &str = "inf";
pub const NEG_INF_SENTINEL: &str = "-inf";

///
/// Value
///
/// Closed set of runtime values a dynamic field can hold. Every variant maps
/// onto exactly one `FieldKind`, which is what lets the aggregation planner
/// dispatch over declared schemas instead of inspecting live data.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    ObjectId(ObjectId),
    Date(Date),
    DateTime(OffsetDateTime),
    List(Vec<Value>),
    Doc(Document),
    Group(GroupElement),
}

impl Value {
    /// True for the explicit null value.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Numeric view of this value, if it has one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// True for float values that are NaN or infinite.
    #[must_use]
    pub fn is_nonfinite(&self) -> bool {
        matches!(self, Self::Float(value) if !value.is_finite())
    }

    /// Replace non-finite floats with their transport-safe string sentinels,
    /// recursing through lists and documents.
    #[must_use]
    pub fn sanitized(self) -> Self {
        match self {
            Self::Float(value) if value.is_nan() => Self::Str(NAN_SENTINEL.to_string()),
            Self::Float(value) if value == f64::INFINITY => {
                Self::Str(POS_INF_SENTINEL.to_string())
            }
            Self::Float(value) if value == f64::NEG_INFINITY => {
                Self::Str(NEG_INF_SENTINEL.to_string())
            }
            Self::List(items) => Self::List(items.into_iter().map(Self::sanitized).collect()),
            Self::Doc(fields) => Self::Doc(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, value.sanitized()))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Compare two scalar values of compatible kinds. Numeric kinds compare
    /// cross-kind through `f64`; containers and incompatible kinds do not
    /// compare.
    #[must_use]
    pub(crate) fn scalar_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
            (Self::ObjectId(a), Self::ObjectId(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            _ => None,
        }
    }

    /// Total ordering used to produce deterministic result listings:
    /// variant rank first, scalar comparison within a rank, incomparable
    /// pairs (NaN included) treated as equal.
    #[must_use]
    pub(crate) fn sort_cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.scalar_cmp(other).unwrap_or(Ordering::Equal))
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Str(_) => 3,
            Self::ObjectId(_) => 4,
            Self::Date(_) => 5,
            Self::DateTime(_) => 6,
            Self::List(_) => 7,
            Self::Doc(_) => 8,
            Self::Group(_) => 9,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<GroupElement> for Value {
    fn from(value: GroupElement) -> Self {
        Self::Group(value)
    }
}

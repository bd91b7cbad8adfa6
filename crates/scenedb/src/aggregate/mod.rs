//! Module: aggregate
//! Responsibility: aggregation value objects, the schema-walking planner,
//! and the single-batched-call executor with its order-preserving fold.
//! Does not own: store transport or view membership resolution.

mod execute;
mod plan;


pub use execute::{
    collection_statistics, execute, label_tag_statistics, LabelTagStatistics, StatisticsRequest,
};
pub use plan::{AggregationPlan, FieldFilter, FilterContext, LabelTagPlan, PathAggregations};

use crate::value::Value;
use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Aggregation
///
/// One planned statistical reduction over a field path. Created by the
/// planner, consumed exactly once by the executor; the empty path targets
/// the whole view.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Aggregation {
    /// Count the non-null values at `path` (all matched samples for the
    /// empty path).
    Count { path: String },
    /// Minimum and maximum at `path`. `safe` ignores non-numeric values;
    /// `count_nonfinite` additionally tallies NaN/±Inf values, which never
    /// participate in the bounds themselves.
    Bounds {
        path: String,
        safe: bool,
        count_nonfinite: bool,
    },
    /// Categorical histogram at `path`: either the `first` most frequent
    /// distinct values, or exactly the `include` listed ones.
    CountValues {
        path: String,
        first: Option<usize>,
        include: Option<Vec<String>>,
    },
    /// Sorted distinct values at `path`.
    Distinct { path: String },
}

impl Aggregation {
    #[must_use]
    pub fn count(path: impl Into<String>) -> Self {
        Self::Count { path: path.into() }
    }

    #[must_use]
    pub fn bounds(path: impl Into<String>) -> Self {
        Self::Bounds {
            path: path.into(),
            safe: false,
            count_nonfinite: false,
        }
    }

    #[must_use]
    pub fn safe_bounds(path: impl Into<String>) -> Self {
        Self::Bounds {
            path: path.into(),
            safe: true,
            count_nonfinite: true,
        }
    }

    #[must_use]
    pub fn count_values(path: impl Into<String>, first: usize) -> Self {
        Self::CountValues {
            path: path.into(),
            first: Some(first),
            include: None,
        }
    }

    #[must_use]
    pub fn count_values_all(path: impl Into<String>) -> Self {
        Self::CountValues {
            path: path.into(),
            first: None,
            include: None,
        }
    }

    #[must_use]
    pub fn count_values_within(path: impl Into<String>, include: Vec<String>) -> Self {
        Self::CountValues {
            path: path.into(),
            first: None,
            include: Some(include),
        }
    }

    #[must_use]
    pub fn distinct(path: impl Into<String>) -> Self {
        Self::Distinct { path: path.into() }
    }

    /// The targeted field path; empty for the whole view.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Count { path }
            | Self::Bounds { path, .. }
            | Self::CountValues { path, .. }
            | Self::Distinct { path } => path,
        }
    }

    /// Stable kind name used to key folded results.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Count { .. } => "count",
            Self::Bounds { .. } => "bounds",
            Self::CountValues { .. } => "count_values",
            Self::Distinct { .. } => "distinct",
        }
    }
}

///
/// AggregateValue
///
/// The result of one executed aggregation, in operation order. Histogram
/// entries are ordered most-frequent-first with ties broken by value, so
/// folding is deterministic.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AggregateValue {
    Count(u64),
    Bounds {
        min: Option<Value>,
        max: Option<Value>,
        nonfinite: Option<u64>,
    },
    CountValues {
        distinct: u64,
        values: Vec<(Value, u64)>,
    },
    Distinct(Vec<Value>),
}

impl AggregateValue {
    /// Replace any non-finite numbers inside this result with their
    /// transport-safe sentinels.
    #[must_use]
    pub fn sanitized(self) -> Self {
        match self {
            Self::Count(count) => Self::Count(count),
            Self::Bounds {
                min,
                max,
                nonfinite,
            } => Self::Bounds {
                min: min.map(Value::sanitized),
                max: max.map(Value::sanitized),
                nonfinite,
            },
            Self::CountValues { distinct, values } => Self::CountValues {
                distinct,
                values: values
                    .into_iter()
                    .map(|(value, count)| (value.sanitized(), count))
                    .collect(),
            },
            Self::Distinct(values) => {
                Self::Distinct(values.into_iter().map(Value::sanitized).collect())
            }
        }
    }
}

///
/// Statistics
///
/// Folded results of one batched execution: field path to a map from
/// aggregation kind name to sanitized result. The empty path carries the
/// total matched-sample count.
///

#[derive(Clone, Debug, Default, Deref, IntoIterator, PartialEq, Serialize)]
pub struct Statistics(
    #[into_iterator(owned, ref)] BTreeMap<String, BTreeMap<&'static str, AggregateValue>>,
);

impl Statistics {
    /// One folded result, by path and aggregation kind name.
    #[must_use]
    pub fn result(&self, path: &str, kind: &str) -> Option<&AggregateValue> {
        self.0.get(path).and_then(|kinds| kinds.get(kind))
    }

    pub(crate) fn insert(&mut self, path: String, kind: &'static str, value: AggregateValue) {
        self.0.entry(path).or_default().insert(kind, value);
    }
}

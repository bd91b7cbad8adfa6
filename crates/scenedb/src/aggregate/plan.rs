use crate::{
    aggregate::Aggregation,
    media::MediaKind,
    schema::{walk_with_frames, FieldKind},
    view::View,
    BOOLEAN_FIRST, CATEGORICAL_FIRST,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Reserved top-level path whose histogram is never restricted by a
/// caller-supplied include-list.
const TAGS_PATH: &str = "tags";

///
/// FieldFilter
///
/// The per-path filter payload supplied by the transport layer. Only the
/// explicit include-list is meaningful to planning; other filter facets are
/// resolved into the view before it reaches this crate.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    #[serde(default)]
    pub values: Option<Vec<String>>,
}

///
/// FilterContext
///
/// Active filters keyed by field path, as supplied with a statistics
/// request.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FilterContext(BTreeMap<String, FieldFilter>);

impl FilterContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an explicit include-list for one path.
    pub fn include(&mut self, path: impl Into<String>, values: Vec<String>) {
        self.0.insert(
            path.into(),
            FieldFilter {
                values: Some(values),
            },
        );
    }

    /// The include-list for a path, if one applies. The reserved top-level
    /// `tags` path always histograms unfiltered.
    #[must_use]
    pub fn include_for(&self, path: &str) -> Option<&[String]> {
        if path == TAGS_PATH {
            return None;
        }
        self.0.get(path)?.values.as_deref()
    }
}

///
/// PathAggregations
///
/// All operations planned for one field path, in emission order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathAggregations {
    pub path: String,
    pub ops: Vec<Aggregation>,
}

///
/// AggregationPlan
///
/// The full ordered plan for one statistics request: the unconditional root
/// count first, then one group per field path. Planning is a pure schema
/// walk — no I/O — and deterministic: the same schema and filter context
/// always produce an element-wise identical plan, which is what lets the
/// executor fold ordered results back by position.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AggregationPlan {
    groups: Vec<PathAggregations>,
}

impl AggregationPlan {
    /// Plan the statistics pass over a view's effective schema (and frame
    /// schema, for video media).
    #[must_use]
    pub fn build(view: &View<'_>, filters: Option<&FilterContext>) -> Self {
        let mut groups = vec![PathAggregations {
            path: String::new(),
            ops: vec![Aggregation::count("")],
        }];

        let schema = view.schema();
        let frame_schema =
            (view.media_kind() == Some(MediaKind::Video)).then(|| view.frame_schema());

        for (path, kind) in walk_with_frames(&schema, frame_schema) {
            groups.push(plan_path(&path, kind, filters));
        }

        let plan = Self { groups };
        debug!(
            paths = plan.groups.len(),
            operations = plan.len(),
            "built aggregation plan"
        );
        plan
    }

    /// Per-path groups, in emission order.
    #[must_use]
    pub fn groups(&self) -> &[PathAggregations] {
        &self.groups
    }

    /// The flattened ordered operation sequence submitted to the store.
    #[must_use]
    pub fn operations(&self) -> Vec<Aggregation> {
        self.groups
            .iter()
            .flat_map(|group| group.ops.iter().cloned())
            .collect()
    }

    /// Total number of planned operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.ops.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| group.ops.is_empty())
    }
}

/// Dispatch the aggregations for one flattened path. A list-of-scalar field
/// aggregates as its element kind (values unwind during execution); every
/// other kind maps to exactly one branch, and every path additionally gets
/// a plain count.
fn plan_path(path: &str, kind: &FieldKind, filters: Option<&FilterContext>) -> PathAggregations {
    let scalar = match kind {
        FieldKind::List(element) => element.as_ref(),
        other => other,
    };

    let mut ops = Vec::new();
    match scalar {
        FieldKind::Float => ops.push(Aggregation::safe_bounds(path)),
        FieldKind::Int | FieldKind::Date | FieldKind::DateTime => {
            ops.push(Aggregation::bounds(path));
        }
        FieldKind::Bool => ops.push(Aggregation::count_values(path, BOOLEAN_FIRST)),
        FieldKind::Str | FieldKind::ObjectId => ops.push(categorical(path, filters)),
        FieldKind::Group
        | FieldKind::List(_)
        | FieldKind::Embedded(_)
        | FieldKind::EmbeddedList(_) => {}
    }

    ops.push(Aggregation::count(path));

    PathAggregations {
        path: path.to_string(),
        ops,
    }
}

fn categorical(path: &str, filters: Option<&FilterContext>) -> Aggregation {
    match filters.and_then(|filters| filters.include_for(path)) {
        Some(values) => Aggregation::count_values_within(path, values.to_vec()),
        None => Aggregation::count_values(path, CATEGORICAL_FIRST),
    }
}

///
/// LabelTagPlan
///
/// The specialty pass behind the tag-filter sidebar: for every top-level
/// label field, a count at its effective path (label lists expand once
/// through their well-known list sub-field) and an unbounded histogram of
/// `<effective path>.tags`.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LabelTagPlan {
    pub counts: Vec<Aggregation>,
    pub tags: Vec<Aggregation>,
}

impl LabelTagPlan {
    /// Plan the tag pass over a view's root schema (and frame schema, for
    /// video media, with `frames.` prefixing).
    #[must_use]
    pub fn build(view: &View<'_>) -> Self {
        let mut plan = Self::default();

        plan.collect(&view.schema(), "");
        if view.media_kind() == Some(MediaKind::Video) {
            plan.collect(view.frame_schema(), crate::FRAMES_PREFIX);
        }

        plan
    }

    fn collect(&mut self, schema: &crate::schema::FieldSchema, prefix: &str) {
        for (name, kind) in schema.iter() {
            let Some(label) = kind
                .embedded_schema()
                .and_then(|embedded| embedded.doc_type.label())
            else {
                continue;
            };

            let effective = match label.list_field() {
                Some(list_field) => format!("{prefix}{name}.{list_field}"),
                None => format!("{prefix}{name}"),
            };

            self.counts.push(Aggregation::count(effective.clone()));
            self.tags
                .push(Aggregation::count_values_all(format!("{effective}.tags")));
        }
    }
}

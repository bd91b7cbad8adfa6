//! Module: view
//! Responsibility: non-destructive stage pipelines over a collection, their
//! serializable compilation, and group/slice projection semantics.
//! Does not own: aggregation planning or store execution.

mod slice;

#[cfg(test)]
mod tests;

pub use slice::resolve_cross_slice_path;

use crate::{
    dataset::Dataset,
    error::{Error, NotFoundError, ValidationError},
    group::GroupConfig,
    media::MediaKind,
    sample::Sample,
    schema::{FieldKind, FieldSchema},
    types::{GroupId, SampleId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

///
/// Stage
///
/// One step of a view pipeline. Stages are value objects: composing them
/// never touches the base collection, and the full pipeline serializes into
/// a `ViewPlan` the backing store can resolve on its own.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    /// Flatten a grouped view to the named slices (`None` = every slice).
    /// `media_kind` is the result kind decided at compose time.
    SelectSlices {
        slices: Option<Vec<String>>,
        media_kind: MediaKind,
    },
    /// Restrict to the named samples.
    Select { sample_ids: Vec<SampleId> },
    /// Keep only the named top-level fields (protected fields stay).
    SelectFields { paths: Vec<String> },
    /// Drop the named top-level fields.
    ExcludeFields { paths: Vec<String> },
    /// Truncate the (group-level, when grouped) sample sequence.
    Limit { limit: usize },
}

///
/// ViewPlan
///
/// The serializable compilation of a view: its ordered stages plus the
/// group context a store needs to resolve membership without the live
/// `View` borrow.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ViewPlan {
    pub stages: Vec<Stage>,
    pub active_slice: Option<String>,
    pub group_field: Option<String>,
}

///
/// View
///
/// A borrowed, composable pipeline over a dataset. Views carry no persisted
/// state: they are created by composing stages and end when dropped. On a
/// grouped collection the un-flattened view projects the active slice;
/// `select_group_slice` produces flat views.
///

#[derive(Clone, Debug)]
pub struct View<'a> {
    dataset: &'a Dataset,
    stages: Vec<Stage>,
}

impl<'a> View<'a> {
    pub(crate) const fn root(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            stages: Vec::new(),
        }
    }

    #[must_use]
    pub const fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    fn with_stage(&self, stage: Stage) -> Self {
        let mut stages = self.stages.clone();
        stages.push(stage);
        Self {
            dataset: self.dataset,
            stages,
        }
    }

    /// True once a slice-selection stage flattened this view.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.stages
            .iter()
            .any(|stage| matches!(stage, Stage::SelectSlices { .. }))
    }

    /// Effective media kind: the last slice selection decides it for
    /// flattened views, the dataset otherwise.
    #[must_use]
    pub fn media_kind(&self) -> Option<MediaKind> {
        for stage in self.stages.iter().rev() {
            if let Stage::SelectSlices { media_kind, .. } = stage {
                return Some(*media_kind);
            }
        }
        self.dataset.media_kind()
    }

    /// Effective group configuration. Flat views have no slice concept, so
    /// flattening clears it.
    #[must_use]
    pub fn group_config(&self) -> Option<&'a GroupConfig> {
        if self.is_flat() {
            None
        } else {
            self.dataset.group_config()
        }
    }

    #[must_use]
    pub fn active_slice(&self) -> Option<&'a str> {
        self.group_config()
            .and_then(|config| config.active_slice.as_deref())
    }

    #[must_use]
    pub fn default_slice(&self) -> Option<&'a str> {
        self.group_config()
            .and_then(|config| config.default_slice.as_deref())
    }

    /// Effective root field schema after projection stages. `SelectFields`
    /// always retains the group field: a view may narrow its projection but
    /// can never drop group membership.
    #[must_use]
    pub fn schema(&self) -> FieldSchema {
        let mut schema = self.dataset.schema().clone();
        let group_field = self.dataset.group_field();

        for stage in &self.stages {
            match stage {
                Stage::ExcludeFields { paths } => {
                    for path in paths {
                        schema.remove(path);
                    }
                }
                Stage::SelectFields { paths } => {
                    let keep: BTreeSet<&str> = paths
                        .iter()
                        .map(String::as_str)
                        .chain(group_field)
                        .collect();
                    schema.retain(|name, _| keep.contains(name.as_str()));
                }
                _ => {}
            }
        }

        schema
    }

    #[must_use]
    pub fn frame_schema(&self) -> &'a FieldSchema {
        self.dataset.frame_schema()
    }

    /// Look up a field kind by dotted path. `frames.`-prefixed paths read
    /// the frame schema; `groups.<slice>.`-prefixed paths resolve against
    /// the named sibling slice.
    #[must_use]
    pub fn field(&self, path: &str) -> Option<&'a FieldKind> {
        if let Some(rest) = path.strip_prefix(crate::FRAMES_PREFIX) {
            return self.dataset.frame_schema().field(rest);
        }
        if path.starts_with(crate::GROUPS_PREFIX) {
            return resolve_cross_slice_path(self.dataset, path)
                .ok()
                .map(|resolved| resolved.2);
        }
        self.dataset.schema().field(path)
    }

    // ---------------------------------------------------------------
    //  Stage builders
    // ---------------------------------------------------------------

    /// Restrict the view to the named samples.
    #[must_use]
    pub fn select(&self, sample_ids: &[SampleId]) -> Self {
        self.with_stage(Stage::Select {
            sample_ids: sample_ids.to_vec(),
        })
    }

    /// Truncate the view. On a grouped view this truncates the group-level
    /// sequence: a later slice selection still expands surviving groups.
    #[must_use]
    pub fn limit(&self, limit: usize) -> Self {
        self.with_stage(Stage::Limit { limit })
    }

    /// Drop the named top-level fields from the view's projection. The
    /// group field can never be excluded.
    pub fn exclude_fields(&self, paths: &[&str]) -> Result<Self, Error> {
        if let Some(field) = self.dataset.group_field() {
            if paths.contains(&field) {
                return Err(ValidationError::GroupFieldRequired {
                    field: field.to_string(),
                }
                .into());
            }
        }

        Ok(self.with_stage(Stage::ExcludeFields {
            paths: paths.iter().map(ToString::to_string).collect(),
        }))
    }

    /// Keep only the named top-level fields. The group field is always
    /// retained, so an omitted group field is not an error.
    #[must_use]
    pub fn select_fields(&self, paths: &[&str]) -> Self {
        self.with_stage(Stage::SelectFields {
            paths: paths.iter().map(ToString::to_string).collect(),
        })
    }

    // ---------------------------------------------------------------
    //  Resolution
    // ---------------------------------------------------------------

    /// Compile this view into its serializable plan.
    #[must_use]
    pub fn plan(&self) -> ViewPlan {
        ViewPlan {
            stages: self.stages.clone(),
            active_slice: self.active_slice().map(ToString::to_string),
            group_field: self.dataset.group_field().map(ToString::to_string),
        }
    }

    /// Samples matched by this view, in pipeline order.
    #[must_use]
    pub fn samples(&self) -> Vec<&'a Sample> {
        resolve(self.dataset, &self.plan())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples().is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&'a Sample> {
        self.samples().into_iter().next()
    }

    // ---------------------------------------------------------------
    //  Group access
    // ---------------------------------------------------------------

    /// The samples of one group, keyed by slice name and restricted to the
    /// slices reachable from this view: every declared slice on a grouped
    /// view, the selected slices on a flattened one.
    pub fn get_group(&self, id: GroupId) -> Result<BTreeMap<String, &'a Sample>, Error> {
        if self.dataset.group_config().is_none() {
            return Err(ValidationError::NotGrouped.into());
        }

        let members: Vec<&Sample> = if self.is_flat() {
            self.samples()
                .into_iter()
                .filter(|sample| {
                    self.dataset
                        .element_of(sample)
                        .is_some_and(|element| element.id == id)
                })
                .collect()
        } else {
            let in_view = self.samples().iter().any(|sample| {
                self.dataset
                    .element_of(sample)
                    .is_some_and(|element| element.id == id)
            });
            if !in_view {
                return Err(NotFoundError::Group { id }.into());
            }

            self.dataset
                .samples()
                .iter()
                .filter(|sample| {
                    self.dataset
                        .element_of(sample)
                        .is_some_and(|element| element.id == id)
                })
                .collect()
        };

        if members.is_empty() {
            return Err(NotFoundError::Group { id }.into());
        }

        Ok(members
            .into_iter()
            .filter_map(|sample| {
                self.dataset
                    .element_of(sample)
                    .map(|element| (element.name.clone(), sample))
            })
            .collect())
    }

    /// Iterate groups in view, in group-insertion order: one slice-to-sample
    /// map per distinct group identity. The iterator is lazy, finite, and
    /// restartable (call again for a fresh pass).
    pub fn iter_groups(&self) -> Result<GroupIter<'a>, Error> {
        if self.group_config().is_none() {
            return Err(ValidationError::NotGrouped.into());
        }

        let mut order = Vec::new();
        let mut seen = BTreeSet::new();
        for sample in self.samples() {
            if let Some(element) = self.dataset.element_of(sample) {
                if seen.insert(element.id) {
                    order.push(element.id);
                }
            }
        }

        let mut members: BTreeMap<GroupId, Vec<&'a Sample>> = BTreeMap::new();
        for sample in self.dataset.samples() {
            if let Some(element) = self.dataset.element_of(sample) {
                if seen.contains(&element.id) {
                    members.entry(element.id).or_default().push(sample);
                }
            }
        }

        Ok(GroupIter {
            dataset: self.dataset,
            order: order.into_iter(),
            members,
        })
    }
}

///
/// GroupIter
///
/// Lazy iterator over the groups of a view, yielding slice-to-sample maps
/// in group-insertion order.
///
#[derive(Debug)]
pub struct GroupIter<'a> {
    dataset: &'a Dataset,
    order: std::vec::IntoIter<GroupId>,
    members: BTreeMap<GroupId, Vec<&'a Sample>>,
}

impl<'a> Iterator for GroupIter<'a> {
    type Item = BTreeMap<String, &'a Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.order.next()?;
        let members = self.members.remove(&id)?;

        Some(
            members
                .into_iter()
                .filter_map(|sample| {
                    self.dataset
                        .element_of(sample)
                        .map(|element| (element.name.clone(), sample))
                })
                .collect(),
        )
    }
}

/// Resolve a view plan against a dataset: the shared membership semantics
/// behind both live views and the in-memory store implementation.
///
/// An un-flattened grouped plan projects the active slice; a slice
/// selection expands every surviving group into the requested slices, in
/// (group order, requested-slice order), or into the group's own insertion
/// order when selecting all slices.
#[must_use]
pub(crate) fn resolve<'a>(dataset: &'a Dataset, plan: &ViewPlan) -> Vec<&'a Sample> {
    let grouped = dataset.group_config().is_some()
        && dataset.media_kind() == Some(MediaKind::Group);

    let mut flat = !grouped;
    let mut working: Vec<&Sample> = if grouped {
        let active = plan
            .active_slice
            .as_deref()
            .or_else(|| dataset.active_slice());
        match active {
            Some(active) => dataset
                .samples()
                .iter()
                .filter(|sample| {
                    dataset
                        .element_of(sample)
                        .is_some_and(|element| element.name == active)
                })
                .collect(),
            None => Vec::new(),
        }
    } else {
        dataset.samples().iter().collect()
    };

    for stage in &plan.stages {
        match stage {
            Stage::Select { sample_ids } => {
                working.retain(|sample| sample_ids.contains(&sample.id));
            }
            Stage::Limit { limit } => working.truncate(*limit),
            Stage::SelectSlices { slices, .. } if !flat => {
                let mut members: BTreeMap<GroupId, Vec<&Sample>> = BTreeMap::new();
                for sample in dataset.samples() {
                    if let Some(element) = dataset.element_of(sample) {
                        members.entry(element.id).or_default().push(sample);
                    }
                }

                let mut order = Vec::new();
                let mut seen = BTreeSet::new();
                for sample in &working {
                    if let Some(element) = dataset.element_of(sample) {
                        if seen.insert(element.id) {
                            order.push(element.id);
                        }
                    }
                }

                let mut expanded = Vec::new();
                for id in order {
                    let Some(group) = members.get(&id) else {
                        continue;
                    };
                    match slices {
                        Some(names) => {
                            for name in names {
                                if let Some(sample) = group.iter().find(|sample| {
                                    dataset
                                        .element_of(sample)
                                        .is_some_and(|element| &element.name == name)
                                }) {
                                    expanded.push(*sample);
                                }
                            }
                        }
                        None => expanded.extend(group.iter().copied()),
                    }
                }

                working = expanded;
                flat = true;
            }
            _ => {}
        }
    }

    working
}

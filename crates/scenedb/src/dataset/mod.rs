//! Module: dataset
//! Responsibility: the owning collection — sample insertion with schema
//! expansion, group configuration, and field/slice mutation operations.
//! Does not own: view staging, aggregation planning, or store execution.

mod slices;


use crate::{
    error::{Error, SchemaError, ValidationError},
    group::GroupConfig,
    media::MediaKind,
    sample::Sample,
    schema::{FieldKind, FieldSchema},
    types::SampleId,
    value::Value,
    view::View,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

///
/// Dataset
///
/// An owning collection of samples plus the schemas and group configuration
/// that type them. Datasets are the single writer surface; views never
/// mutate them. Concurrent slice mutations on the same name are expected to
/// be serialized by the backing store (last-writer-wins); each individual
/// operation leaves the collection internally consistent.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub(crate) media_kind: Option<MediaKind>,
    pub(crate) schema: FieldSchema,
    pub(crate) frame_schema: FieldSchema,
    pub(crate) group: Option<GroupConfig>,
    pub(crate) samples: Vec<Sample>,
}

impl Dataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The collection's media kind; `None` until the first sample or group
    /// field declaration decides it.
    #[must_use]
    pub const fn media_kind(&self) -> Option<MediaKind> {
        self.media_kind
    }

    #[must_use]
    pub const fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    #[must_use]
    pub const fn frame_schema(&self) -> &FieldSchema {
        &self.frame_schema
    }

    #[must_use]
    pub const fn group_config(&self) -> Option<&GroupConfig> {
        self.group.as_ref()
    }

    /// Name of the group field, when the collection is grouped.
    #[must_use]
    pub fn group_field(&self) -> Option<&str> {
        self.group.as_ref().map(|config| config.field.as_str())
    }

    #[must_use]
    pub fn default_slice(&self) -> Option<&str> {
        self.group
            .as_ref()
            .and_then(|config| config.default_slice.as_deref())
    }

    #[must_use]
    pub fn active_slice(&self) -> Option<&str> {
        self.group
            .as_ref()
            .and_then(|config| config.active_slice.as_deref())
    }

    /// Declared slice names, in lexicographic order.
    #[must_use]
    pub fn group_slices(&self) -> Vec<&str> {
        self.group
            .as_ref()
            .map(GroupConfig::slices)
            .unwrap_or_default()
    }

    /// All samples, in insertion order, ignoring any slice projection.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The root view over this collection.
    #[must_use]
    pub const fn view(&self) -> View<'_> {
        View::root(self)
    }

    /// The samples of one group, keyed by slice name.
    pub fn get_group(
        &self,
        id: crate::types::GroupId,
    ) -> Result<std::collections::BTreeMap<String, &Sample>, Error> {
        self.view().get_group(id)
    }

    /// Iterate the collection's groups in group-insertion order.
    pub fn iter_groups(&self) -> Result<crate::view::GroupIter<'_>, Error> {
        self.view().iter_groups()
    }

    /// Number of samples in the root view (the active slice, when grouped).
    #[must_use]
    pub fn len(&self) -> usize {
        self.view().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First sample of the root view.
    #[must_use]
    pub fn first(&self) -> Option<&Sample> {
        self.view().samples().into_iter().next()
    }

    // ---------------------------------------------------------------
    //  Group field declaration
    // ---------------------------------------------------------------

    /// Declare the group field explicitly. The collection's media kind
    /// becomes `Group`, and `default_slice` doubles as the initial active
    /// slice. Fails when a group field already exists.
    pub fn add_group_field(
        &mut self,
        field: impl Into<String>,
        default_slice: impl Into<String>,
    ) -> Result<(), Error> {
        let field = field.into();

        if let Some(config) = &self.group {
            return Err(SchemaError::GroupFieldExists {
                field: config.field.clone(),
            }
            .into());
        }

        self.schema.observe(&field, FieldKind::Group)?;
        self.group = Some(GroupConfig::new(field, Some(default_slice.into())));
        self.media_kind = Some(MediaKind::Group);

        Ok(())
    }

    /// Declare a top-level field's kind ahead of insertion. Group fields
    /// must go through `add_group_field` instead.
    pub fn declare_field(&mut self, name: &str, kind: FieldKind) -> Result<(), Error> {
        if kind == FieldKind::Group {
            return Err(SchemaError::GroupFieldProtected {
                field: name.to_string(),
                operation: "declared",
            }
            .into());
        }
        self.schema.observe(name, kind)?;
        Ok(())
    }

    /// Declare a frame-level field's kind ahead of insertion.
    pub fn declare_frame_field(&mut self, name: &str, kind: FieldKind) -> Result<(), Error> {
        if kind == FieldKind::Group {
            return Err(SchemaError::GroupFieldProtected {
                field: name.to_string(),
                operation: "declared",
            }
            .into());
        }
        self.frame_schema.observe(name, kind)?;
        Ok(())
    }

    // ---------------------------------------------------------------
    //  Insertion
    // ---------------------------------------------------------------

    /// Insert one sample, expanding the field schemas from its dynamic
    /// fields and enforcing media-kind consistency. On the first grouped
    /// insert into an undeclared collection, the group field is inferred
    /// from the first group-element-valued field and that element's slice
    /// becomes both the default and active slice.
    pub fn add_sample(&mut self, sample: Sample) -> Result<SampleId, Error> {
        let media = sample.media_kind();

        if let Some(config) = self.group.as_mut() {
            let Some(element) = sample.group_element(&config.field) else {
                return Err(ValidationError::MissingGroupElement {
                    field: config.field.clone(),
                }
                .into());
            };
            config.observe(&element.name, media)?;
            self.media_kind = Some(MediaKind::Group);
        } else if let Some((field, element)) = sample.first_group_element() {
            if self.media_kind.is_some() || !self.samples.is_empty() {
                return Err(ValidationError::UnexpectedGroupElement {
                    field: field.to_string(),
                }
                .into());
            }

            let mut config = GroupConfig::new(field, Some(element.name.clone()));
            config.observe(&element.name, media)?;

            let field = field.to_string();
            self.schema.observe(&field, FieldKind::Group)?;
            self.group = Some(config);
            self.media_kind = Some(MediaKind::Group);
            debug!(field = %field, "inferred group field from first grouped insert");
        } else {
            match self.media_kind {
                None => self.media_kind = Some(media),
                Some(declared) if declared != media => {
                    return Err(ValidationError::CollectionMediaKind {
                        declared,
                        observed: media,
                    }
                    .into());
                }
                Some(_) => {}
            }
        }

        self.expand_schema(&sample)?;

        let id = sample.id;
        self.samples.push(sample);

        Ok(id)
    }

    /// Insert samples in order, stopping at the first failure.
    pub fn add_samples(
        &mut self,
        samples: impl IntoIterator<Item = Sample>,
    ) -> Result<Vec<SampleId>, Error> {
        samples.into_iter().map(|sample| self.add_sample(sample)).collect()
    }

    fn expand_schema(&mut self, sample: &Sample) -> Result<(), Error> {
        let group_field = self.group.as_ref().map(|config| config.field.clone());

        for (name, value) in &sample.fields {
            let Some(kind) = FieldKind::of_value(value) else {
                continue;
            };
            if kind == FieldKind::Group && group_field.as_deref() != Some(name.as_str()) {
                return Err(SchemaError::GroupFieldExists {
                    field: group_field.unwrap_or_default(),
                }
                .into());
            }
            self.schema.observe(name, kind)?;
        }

        for frame in sample.frames.values() {
            for (name, value) in frame {
                if let Some(kind) = FieldKind::of_value(value) {
                    self.frame_schema.observe(name, kind)?;
                }
            }
        }

        Ok(())
    }

    // ---------------------------------------------------------------
    //  Field operations
    // ---------------------------------------------------------------

    /// Rename a top-level field. Renaming the group field is sanctioned
    /// here because the group configuration is updated in the same
    /// operation, so schema and config cannot diverge.
    pub fn rename_field(&mut self, old: &str, new: &str) -> Result<(), Error> {
        let Some(kind) = self.schema.remove(old) else {
            return Err(SchemaError::UnknownField {
                field: old.to_string(),
            }
            .into());
        };
        if self.schema.contains_key(new) {
            self.schema.insert(old.to_string(), kind);
            return Err(SchemaError::FieldExists {
                field: new.to_string(),
            }
            .into());
        }

        self.schema.insert(new.to_string(), kind);

        for sample in &mut self.samples {
            if let Some(value) = sample.fields.remove(old) {
                sample.fields.insert(new.to_string(), value);
            }
        }

        if let Some(config) = self.group.as_mut() {
            if config.field == old {
                config.field = new.to_string();
            }
        }

        Ok(())
    }

    /// Delete a top-level field from the schema and from every sample.
    /// The group field is protected; slice deletion is the only sanctioned
    /// way to retire grouped data.
    pub fn delete_field(&mut self, field: &str) -> Result<(), Error> {
        self.reject_group_field(field, "deleted")?;

        if self.schema.remove(field).is_none() {
            return Err(SchemaError::UnknownField {
                field: field.to_string(),
            }
            .into());
        }

        for sample in &mut self.samples {
            sample.fields.remove(field);
        }

        Ok(())
    }

    /// Clone a top-level field under a new name, copying its declared kind
    /// and every sample's value. The group field cannot be cloned: a
    /// collection has at most one group field.
    pub fn clone_field(&mut self, field: &str, target: &str) -> Result<(), Error> {
        self.reject_group_field(field, "cloned")?;

        let Some(kind) = self.schema.get(field).cloned() else {
            return Err(SchemaError::UnknownField {
                field: field.to_string(),
            }
            .into());
        };
        if self.schema.contains_key(target) {
            return Err(SchemaError::FieldExists {
                field: target.to_string(),
            }
            .into());
        }

        self.schema.insert(target.to_string(), kind);

        for sample in &mut self.samples {
            if let Some(value) = sample.fields.get(field).cloned() {
                sample.fields.insert(target.to_string(), value);
            }
        }

        Ok(())
    }

    fn reject_group_field(&self, field: &str, operation: &'static str) -> Result<(), Error> {
        if self.group_field() == Some(field) {
            return Err(SchemaError::GroupFieldProtected {
                field: field.to_string(),
                operation,
            }
            .into());
        }
        Ok(())
    }

    /// Look up a grouped sample's element value, by the configured field.
    #[must_use]
    pub(crate) fn element_of<'a>(
        &self,
        sample: &'a Sample,
    ) -> Option<&'a crate::group::GroupElement> {
        let field = self.group.as_ref()?.field.as_str();
        match sample.fields.get(field) {
            Some(Value::Group(element)) => Some(element),
            _ => None,
        }
    }
}

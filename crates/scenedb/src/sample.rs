use crate::{
    group::GroupElement,
    media::MediaKind,
    types::SampleId,
    value::{Document, Value},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Sample
///
/// One media record: identity, primary media locator, a dynamic field map
/// typed by the collection schema, and (for video media) per-frame dynamic
/// fields numbered from 1.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: SampleId,
    pub filepath: String,
    #[serde(default)]
    pub fields: Document,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub frames: BTreeMap<u32, Document>,
}

impl Sample {
    #[must_use]
    pub fn new(filepath: impl Into<String>) -> Self {
        Self {
            id: SampleId::new(),
            filepath: filepath.into(),
            fields: Document::new(),
            frames: BTreeMap::new(),
        }
    }

    /// Media kind, inferred from the filepath extension.
    #[must_use]
    pub fn media_kind(&self) -> MediaKind {
        MediaKind::from_filepath(&self.filepath)
    }

    /// Builder-style field assignment.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set one frame's dynamic fields. Frames are numbered from 1.
    pub fn set_frame(&mut self, number: u32, frame: Document) {
        self.frames.insert(number, frame);
    }

    /// The group element this sample carries in `field`, if any.
    #[must_use]
    pub fn group_element(&self, field: &str) -> Option<&GroupElement> {
        match self.fields.get(field) {
            Some(Value::Group(element)) => Some(element),
            _ => None,
        }
    }

    /// The first group-element-valued field on this sample, in field-name
    /// order. Drives group-field inference on first grouped insert.
    #[must_use]
    pub(crate) fn first_group_element(&self) -> Option<(&str, &GroupElement)> {
        self.fields.iter().find_map(|(name, value)| match value {
            Value::Group(element) => Some((name.as_str(), element)),
            _ => None,
        })
    }
}

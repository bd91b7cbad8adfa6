//! Module: schema
//! Responsibility: declared field-type descriptors, label taxonomy, and the
//! flattened dotted-path walk used by planning and cross-slice resolution.
//! Does not own: runtime values, view stages, or aggregation dispatch.

mod walk;

#[cfg(test)]
mod tests;

pub use walk::{walk, walk_with_frames};

use crate::{error::SchemaError, value::Value};
use derive_more::{Deref, DerefMut, IntoIterator};
use serde::{Deserialize, Serialize};

///
/// LabelKind
///
/// Closed set of annotation document types. The plural kinds are label
/// lists: they wrap a sequence of individual labels under one well-known
/// sub-field whose name is the lowercase kind name.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum LabelKind {
    Classification,
    Classifications,
    Detection,
    Detections,
    Keypoint,
    Keypoints,
}

impl LabelKind {
    /// The well-known list sub-field name, for label-list kinds.
    #[must_use]
    pub const fn list_field(self) -> Option<&'static str> {
        match self {
            Self::Classifications => Some("classifications"),
            Self::Detections => Some("detections"),
            Self::Keypoints => Some("keypoints"),
            Self::Classification | Self::Detection | Self::Keypoint => None,
        }
    }

    /// True for label-list kinds.
    #[must_use]
    pub const fn is_list(self) -> bool {
        self.list_field().is_some()
    }

    /// The individual label kind wrapped by a label-list kind.
    #[must_use]
    pub const fn element(self) -> Option<Self> {
        match self {
            Self::Classifications => Some(Self::Classification),
            Self::Detections => Some(Self::Detection),
            Self::Keypoints => Some(Self::Keypoint),
            Self::Classification | Self::Detection | Self::Keypoint => None,
        }
    }

    /// Canonical sub-schema of this label document type.
    #[must_use]
    pub fn label_schema(self) -> FieldSchema {
        let mut fields = FieldSchema::new();

        if let (Some(name), Some(element)) = (self.list_field(), self.element()) {
            fields.insert(
                name.to_string(),
                FieldKind::EmbeddedList(EmbeddedSchema {
                    doc_type: DocumentType::Label(element),
                    fields: element.label_schema(),
                }),
            );
            return fields;
        }

        fields.insert("id".to_string(), FieldKind::ObjectId);
        fields.insert("label".to_string(), FieldKind::Str);
        fields.insert("confidence".to_string(), FieldKind::Float);
        fields.insert("tags".to_string(), FieldKind::List(Box::new(FieldKind::Str)));

        match self {
            Self::Detection => {
                fields.insert(
                    "bounding_box".to_string(),
                    FieldKind::List(Box::new(FieldKind::Float)),
                );
            }
            Self::Keypoint => {
                fields.insert(
                    "points".to_string(),
                    FieldKind::List(Box::new(FieldKind::List(Box::new(FieldKind::Float)))),
                );
            }
            _ => {}
        }

        fields
    }
}

///
/// DocumentType
///
/// Declared type of an embedded document: a plain dynamic document, or one
/// of the label kinds the tag planner treats specially.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DocumentType {
    Dynamic,
    Label(LabelKind),
}

impl DocumentType {
    /// The label kind, when this document type is an annotation.
    #[must_use]
    pub const fn label(self) -> Option<LabelKind> {
        match self {
            Self::Label(kind) => Some(kind),
            Self::Dynamic => None,
        }
    }
}

///
/// EmbeddedSchema
///
/// The declared shape of an embedded document field: its document type plus
/// its own nested field schema. Schemas are trees by construction.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedSchema {
    pub doc_type: DocumentType,
    pub fields: FieldSchema,
}

///
/// FieldKind
///
/// Closed set of field-type descriptors. Planner dispatch is a total match
/// over this enum; there is deliberately no open-ended type inspection
/// anywhere downstream of it.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    Str,
    ObjectId,
    Date,
    DateTime,
    Group,
    List(Box<FieldKind>),
    Embedded(EmbeddedSchema),
    EmbeddedList(EmbeddedSchema),
}

impl FieldKind {
    /// A plain embedded-document field with the given sub-schema.
    #[must_use]
    pub const fn document(fields: FieldSchema) -> Self {
        Self::Embedded(EmbeddedSchema {
            doc_type: DocumentType::Dynamic,
            fields,
        })
    }

    /// A list-of-embedded-documents field with the given element sub-schema.
    #[must_use]
    pub const fn document_list(fields: FieldSchema) -> Self {
        Self::EmbeddedList(EmbeddedSchema {
            doc_type: DocumentType::Dynamic,
            fields,
        })
    }

    /// A label field of the given kind, carrying its canonical sub-schema.
    #[must_use]
    pub fn label(kind: LabelKind) -> Self {
        Self::Embedded(EmbeddedSchema {
            doc_type: DocumentType::Label(kind),
            fields: kind.label_schema(),
        })
    }

    /// The embedded schema of this kind, for both the single-document and
    /// list-of-documents shapes.
    #[must_use]
    pub const fn embedded_schema(&self) -> Option<&EmbeddedSchema> {
        match self {
            Self::Embedded(schema) | Self::EmbeddedList(schema) => Some(schema),
            _ => None,
        }
    }

    /// Infer the declared kind of a runtime value. `None` values carry no
    /// kind information and infer nothing.
    #[must_use]
    pub fn of_value(value: &Value) -> Option<Self> {
        match value {
            Value::None => None,
            Value::Bool(_) => Some(Self::Bool),
            Value::Int(_) => Some(Self::Int),
            Value::Float(_) => Some(Self::Float),
            Value::Str(_) => Some(Self::Str),
            Value::ObjectId(_) => Some(Self::ObjectId),
            Value::Date(_) => Some(Self::Date),
            Value::DateTime(_) => Some(Self::DateTime),
            Value::Group(_) => Some(Self::Group),
            Value::Doc(fields) => Some(Self::document(FieldSchema::of_document(fields))),
            Value::List(items) => {
                let element = items.iter().find_map(Self::of_value)?;
                match element {
                    Self::Embedded(schema) => Some(Self::EmbeddedList(schema)),
                    scalar => Some(Self::List(Box::new(scalar))),
                }
            }
        }
    }
}

///
/// FieldSchema
///
/// Ordered map from field name to declared kind. Iteration order (and
/// therefore planning order) is lexicographic by field name.
///

#[derive(
    Clone, Debug, Default, Deref, DerefMut, Eq, IntoIterator, PartialEq, Serialize, Deserialize,
)]
pub struct FieldSchema(
    #[into_iterator(owned, ref)] std::collections::BTreeMap<String, FieldKind>,
);

impl FieldSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a dotted path, descending through embedded schemas.
    #[must_use]
    pub fn field(&self, path: &str) -> Option<&FieldKind> {
        match path.split_once('.') {
            None => self.0.get(path),
            Some((head, rest)) => self
                .0
                .get(head)?
                .embedded_schema()
                .and_then(|schema| schema.fields.field(rest)),
        }
    }

    /// Merge an observed kind for `name` into this schema. New fields are
    /// declared; existing fields must agree, with dynamic embedded schemas
    /// merging recursively.
    pub(crate) fn observe(&mut self, name: &str, observed: FieldKind) -> Result<(), SchemaError> {
        if let Some(declared) = self.0.get_mut(name) {
            return merge_kind(name, declared, observed);
        }
        self.0.insert(name.to_string(), observed);
        Ok(())
    }

    /// Infer a schema from a document's values.
    #[must_use]
    pub(crate) fn of_document(fields: &crate::value::Document) -> Self {
        let mut schema = Self::new();
        for (name, value) in fields {
            if let Some(kind) = FieldKind::of_value(value) {
                schema.insert(name.clone(), kind);
            }
        }
        schema
    }
}

fn merge_kind(path: &str, declared: &mut FieldKind, observed: FieldKind) -> Result<(), SchemaError> {
    match (declared, observed) {
        (FieldKind::List(declared), FieldKind::List(observed)) => {
            merge_kind(path, declared, *observed)
        }
        // Runtime documents are untyped, so an observed `Dynamic` shape
        // merges into any declared document type; the declaration wins.
        (FieldKind::Embedded(declared), FieldKind::Embedded(observed))
        | (FieldKind::EmbeddedList(declared), FieldKind::EmbeddedList(observed))
            if declared.doc_type == observed.doc_type
                || observed.doc_type == DocumentType::Dynamic =>
        {
            merge_embedded(path, declared, observed)
        }
        (declared, observed) => {
            if *declared == observed {
                Ok(())
            } else {
                Err(SchemaError::FieldKindConflict {
                    path: path.to_string(),
                    declared: Box::new(declared.clone()),
                    observed: Box::new(observed),
                })
            }
        }
    }
}

fn merge_embedded(
    path: &str,
    declared: &mut EmbeddedSchema,
    observed: EmbeddedSchema,
) -> Result<(), SchemaError> {
    for (name, kind) in observed.fields {
        let nested = format!("{path}.{name}");
        if let Some(existing) = declared.fields.get_mut(&name) {
            merge_kind(&nested, existing, kind)?;
            continue;
        }
        declared.fields.insert(name, kind);
    }
    Ok(())
}

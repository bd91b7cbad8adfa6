//! Shared fixtures: a two-group, three-slice collection (left/right images,
//! ego video with two annotated frames) and a detection-style schema.

use crate::{
    dataset::Dataset,
    group::Group,
    sample::Sample,
    schema::{FieldKind, LabelKind},
    types::ObjectId,
    value::{Document, Value},
};

/// One frame document carrying a single integer field.
pub(crate) fn frame(field: i64) -> Document {
    Document::from([("field".to_string(), Value::Int(field))])
}

/// A detections document with one detection per label.
pub(crate) fn detections(labels: &[(&str, f64)]) -> Value {
    let items = labels
        .iter()
        .map(|(label, confidence)| {
            Value::Doc(Document::from([
                ("id".to_string(), Value::ObjectId(ObjectId::new())),
                ("label".to_string(), Value::Str((*label).to_string())),
                ("confidence".to_string(), Value::Float(*confidence)),
                (
                    "tags".to_string(),
                    Value::List(vec![Value::Str("validated".to_string())]),
                ),
                (
                    "bounding_box".to_string(),
                    Value::List(vec![
                        Value::Float(0.1),
                        Value::Float(0.1),
                        Value::Float(0.4),
                        Value::Float(0.4),
                    ]),
                ),
            ]))
        })
        .collect();

    Value::Doc(Document::from([("detections".to_string(), Value::List(items))]))
}

/// Two groups, three slices each: left/right images and an ego video whose
/// first sample carries two frames.
pub(crate) fn group_dataset() -> Dataset {
    let mut dataset = Dataset::new();
    dataset.add_group_field("group_field", "ego").unwrap();

    let group1 = Group::new();
    let group2 = Group::new();

    let mut ego1 = Sample::new("ego-video1.mp4")
        .with_field("group_field", group1.element("ego"))
        .with_field("field", 2i64);
    ego1.set_frame(1, frame(1));
    ego1.set_frame(2, frame(2));

    dataset
        .add_samples([
            Sample::new("left-image1.jpg")
                .with_field("group_field", group1.element("left"))
                .with_field("field", 1i64),
            ego1,
            Sample::new("right-image1.jpg")
                .with_field("group_field", group1.element("right"))
                .with_field("field", 3i64),
            Sample::new("left-image2.jpg")
                .with_field("group_field", group2.element("left"))
                .with_field("field", 4i64),
            Sample::new("ego-video2.mp4")
                .with_field("group_field", group2.element("ego"))
                .with_field("field", 5i64),
            Sample::new("right-image2.jpg")
                .with_field("group_field", group2.element("right"))
                .with_field("field", 6i64),
        ])
        .unwrap();

    dataset
}

/// An ungrouped image collection with the detection-style schema declared:
/// `confidence: Float`, `label: Str`, `detections: Detections`.
pub(crate) fn detection_dataset() -> Dataset {
    let mut dataset = Dataset::new();
    dataset.declare_field("confidence", FieldKind::Float).unwrap();
    dataset.declare_field("label", FieldKind::Str).unwrap();
    dataset
        .declare_field("detections", FieldKind::label(LabelKind::Detections))
        .unwrap();
    dataset
}

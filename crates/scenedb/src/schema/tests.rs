use super::*;
use crate::value::{Document, Value};

fn detection_paths() -> Vec<&'static str> {
    vec!["bounding_box", "confidence", "id", "label", "tags"]
}

#[test]
fn label_list_kinds_wrap_their_element_schema() {
    let kind = FieldKind::label(LabelKind::Detections);
    let schema = kind.embedded_schema().unwrap();

    assert_eq!(schema.doc_type, DocumentType::Label(LabelKind::Detections));

    let list = schema.fields.get("detections").unwrap();
    let element = list.embedded_schema().unwrap();

    assert_eq!(element.doc_type, DocumentType::Label(LabelKind::Detection));
    assert!(matches!(list, FieldKind::EmbeddedList(_)));
    for path in detection_paths() {
        assert!(element.fields.contains_key(path), "missing {path}");
    }
}

#[test]
fn dotted_lookup_descends_embedded_schemas() {
    let mut schema = FieldSchema::new();
    schema.insert("confidence".to_string(), FieldKind::Float);
    schema.insert("detections".to_string(), FieldKind::label(LabelKind::Detections));

    assert_eq!(schema.field("confidence"), Some(&FieldKind::Float));
    assert_eq!(
        schema.field("detections.detections.label"),
        Some(&FieldKind::Str)
    );
    assert_eq!(schema.field("detections.missing"), None);
    assert_eq!(schema.field("missing"), None);
}

#[test]
fn walk_is_depth_first_with_dotted_prefixes() {
    let mut schema = FieldSchema::new();
    schema.insert("confidence".to_string(), FieldKind::Float);
    schema.insert("detections".to_string(), FieldKind::label(LabelKind::Detections));
    schema.insert("label".to_string(), FieldKind::Str);

    let paths: Vec<String> = walk(&schema).into_iter().map(|(path, _)| path).collect();

    assert_eq!(
        paths,
        vec![
            "confidence",
            "detections",
            "detections.detections",
            "detections.detections.bounding_box",
            "detections.detections.confidence",
            "detections.detections.id",
            "detections.detections.label",
            "detections.detections.tags",
            "label",
        ]
    );
}

#[test]
fn walk_with_frames_prefixes_frame_paths() {
    let mut schema = FieldSchema::new();
    schema.insert("field".to_string(), FieldKind::Int);

    let mut frame_schema = FieldSchema::new();
    frame_schema.insert("field".to_string(), FieldKind::Int);
    frame_schema.insert("gt".to_string(), FieldKind::label(LabelKind::Classification));

    let paths: Vec<String> = walk_with_frames(&schema, Some(&frame_schema))
        .into_iter()
        .map(|(path, _)| path)
        .collect();

    assert_eq!(
        paths,
        vec![
            "field",
            "frames.field",
            "frames.gt",
            "frames.gt.confidence",
            "frames.gt.id",
            "frames.gt.label",
            "frames.gt.tags",
        ]
    );
}

#[test]
fn kind_inference_covers_scalars_lists_and_documents() {
    assert_eq!(FieldKind::of_value(&Value::Int(3)), Some(FieldKind::Int));
    assert_eq!(FieldKind::of_value(&Value::None), None);
    assert_eq!(
        FieldKind::of_value(&Value::List(vec![Value::Str("a".into())])),
        Some(FieldKind::List(Box::new(FieldKind::Str)))
    );

    let mut doc = Document::new();
    doc.insert("score".to_string(), Value::Float(0.5));
    let kind = FieldKind::of_value(&Value::Doc(doc)).unwrap();

    assert_eq!(
        kind.embedded_schema().unwrap().fields.field("score"),
        Some(&FieldKind::Float)
    );
}

#[test]
fn observe_merges_matching_kinds_and_rejects_conflicts() {
    let mut schema = FieldSchema::new();
    schema.observe("field", FieldKind::Int).unwrap();
    schema.observe("field", FieldKind::Int).unwrap();

    let err = schema.observe("field", FieldKind::Str).unwrap_err();
    assert!(matches!(
        err,
        crate::error::SchemaError::FieldKindConflict { .. }
    ));

    // Dynamic embedded documents merge field-by-field.
    let mut first = Document::new();
    first.insert("a".to_string(), Value::Int(1));
    let mut second = Document::new();
    second.insert("b".to_string(), Value::Str("x".into()));

    schema
        .observe("doc", FieldKind::of_value(&Value::Doc(first)).unwrap())
        .unwrap();
    schema
        .observe("doc", FieldKind::of_value(&Value::Doc(second)).unwrap())
        .unwrap();

    assert_eq!(schema.field("doc.a"), Some(&FieldKind::Int));
    assert_eq!(schema.field("doc.b"), Some(&FieldKind::Str));
}

use super::*;
use crate::{
    error::{Error, SchemaError},
    schema::LabelKind,
    test_fixtures::group_dataset,
    value::Value,
};

fn field_values(samples: &[&crate::sample::Sample]) -> Vec<i64> {
    samples
        .iter()
        .map(|sample| match sample.fields["field"] {
            Value::Int(value) => value,
            _ => panic!("expected int field"),
        })
        .collect()
}

#[test]
fn grouped_root_view_projects_the_active_slice() {
    let dataset = group_dataset();
    let view = dataset.view();

    assert_eq!(view.media_kind(), Some(MediaKind::Group));
    assert_eq!(view.active_slice(), Some("ego"));
    assert_eq!(view.default_slice(), Some("ego"));
    assert_eq!(view.len(), 2);
    assert_eq!(field_values(&view.samples()), vec![2, 5]);

    let first = view.first().unwrap();
    assert_eq!(first.group_element("group_field").unwrap().name, "ego");
    assert_eq!(first.media_kind(), MediaKind::Video);
}

#[test]
fn single_slice_selection_flattens_the_view() {
    let dataset = group_dataset();
    let view = dataset.view().select_group_slice(Some(&["left"]), false).unwrap();

    assert_eq!(view.media_kind(), Some(MediaKind::Image));
    assert!(view.group_config().is_none());
    assert_eq!(view.active_slice(), None);
    assert_eq!(view.len(), 2);
    assert_eq!(field_values(&view.samples()), vec![1, 4]);
}

#[test]
fn multi_slice_selection_orders_by_group_then_request() {
    let dataset = group_dataset();
    let view = dataset
        .view()
        .select_group_slice(Some(&["left", "right"]), false)
        .unwrap();

    assert_eq!(view.media_kind(), Some(MediaKind::Image));
    assert_eq!(field_values(&view.samples()), vec![1, 3, 4, 6]);

    let slices: Vec<_> = view
        .samples()
        .iter()
        .map(|sample| sample.group_element("group_field").unwrap().name.clone())
        .collect();
    assert_eq!(slices, vec!["left", "right", "left", "right"]);
}

#[test]
fn mixed_media_selection_requires_the_override() {
    let dataset = group_dataset();

    let err = dataset
        .view()
        .select_group_slice(Some(&["left", "ego"]), false)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MixedMediaKinds { .. })
    ));

    let view = dataset
        .view()
        .select_group_slice(Some(&["left", "ego"]), true)
        .unwrap();
    assert_eq!(view.media_kind(), Some(MediaKind::Mixed));
    assert_eq!(field_values(&view.samples()), vec![1, 2, 4, 5]);
}

#[test]
fn all_slice_selection_uses_group_insertion_order() {
    let dataset = group_dataset();
    let view = dataset.view().select_group_slice(None, true).unwrap();

    assert_eq!(view.media_kind(), Some(MediaKind::Mixed));
    assert_eq!(field_values(&view.samples()), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn no_argument_selection_defaults_to_the_active_slice() {
    let dataset = group_dataset();
    let view = dataset.view().select_group_slice(None, false).unwrap();

    assert_eq!(view.media_kind(), Some(MediaKind::Video));
    assert_eq!(field_values(&view.samples()), vec![2, 5]);
}

#[test]
fn slice_selection_argument_errors() {
    let dataset = group_dataset();

    let err = dataset
        .view()
        .select_group_slice(Some(&[]), false)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::EmptySliceSelection)
    ));

    let err = dataset
        .view()
        .select_group_slice(Some(&["missing"]), false)
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(NotFoundError::Slice { .. })));

    // Ungrouped collections have no slices to select.
    let flat = Dataset::new();
    let err = flat.view().select_group_slice(None, false).unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::NotGrouped)));

    // Flattened views have no slice concept either.
    let flattened = dataset.view().select_group_slice(Some(&["left"]), false).unwrap();
    let err = flattened.select_group_slice(Some(&["right"]), false).unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::NotGrouped)));
}

#[test]
fn limit_applies_to_the_group_sequence() {
    let dataset = group_dataset();
    let view = dataset.view().limit(1);

    assert_eq!(view.len(), 1);
    assert_eq!(
        field_values(
            &view
                .select_group_slice(Some(&["left", "right"]), false)
                .unwrap()
                .samples()
        ),
        vec![1, 3]
    );
    assert_eq!(
        field_values(&view.select_group_slice(None, true).unwrap().samples()),
        vec![1, 2, 3]
    );
}

#[test]
fn select_restricts_by_sample_identity() {
    let dataset = group_dataset();
    let second = dataset.view().samples()[1].id;

    let view = dataset.view().select(&[second]);
    assert_eq!(view.len(), 1);
    assert_eq!(field_values(&view.samples()), vec![5]);
}

#[test]
fn excluding_the_group_field_is_rejected() {
    let dataset = group_dataset();

    let err = dataset.view().exclude_fields(&["group_field"]).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::GroupFieldRequired { .. })
    ));

    let view = dataset.view().exclude_fields(&["field"]).unwrap();
    assert!(!view.schema().contains_key("field"));
    assert!(view.schema().contains_key("group_field"));
}

#[test]
fn select_fields_always_retains_the_group_field() {
    let dataset = group_dataset();
    let view = dataset.view().select_fields(&[]);

    assert_eq!(view.media_kind(), Some(MediaKind::Group));
    assert!(view.schema().contains_key("group_field"));
    assert!(!view.schema().contains_key("field"));
    assert_eq!(view.len(), 2);
}

#[test]
fn flattened_views_still_resolve_groups_by_membership() {
    let dataset = group_dataset();
    let view = dataset
        .view()
        .select_group_slice(Some(&["left", "right"]), false)
        .unwrap();

    let id = view.samples()[0].group_element("group_field").unwrap().id;
    let group = view.get_group(id).unwrap();

    assert_eq!(
        group.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["left", "right"]
    );

    let err = view.iter_groups().unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::NotGrouped)));
}

#[test]
fn cross_slice_paths_resolve_against_sibling_slices() {
    let mut dataset = group_dataset();
    dataset
        .declare_field("ground_truth", FieldKind::label(LabelKind::Detections))
        .unwrap();

    let view = dataset.view();

    assert_eq!(view.field("field"), Some(&FieldKind::Int));
    assert_eq!(view.field("groups.left.field"), Some(&FieldKind::Int));
    assert_eq!(
        view.field("ground_truth.detections.label"),
        Some(&FieldKind::Str)
    );
    assert_eq!(
        view.field("groups.right.ground_truth.detections.label"),
        Some(&FieldKind::Str)
    );
    assert_eq!(view.field("frames.field"), Some(&FieldKind::Int));

    let (slice, residual, kind) =
        resolve_cross_slice_path(&dataset, "groups.left.ground_truth.detections.label").unwrap();
    assert_eq!(slice, "left");
    assert_eq!(residual, "ground_truth.detections.label");
    assert_eq!(kind, &FieldKind::Str);

    let err = resolve_cross_slice_path(&dataset, "groups.missing.field").unwrap_err();
    assert!(matches!(err, Error::NotFound(NotFoundError::Slice { .. })));

    let err = resolve_cross_slice_path(&dataset, "groups.left").unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::CrossSlicePath { .. })
    ));

    let err = resolve_cross_slice_path(&dataset, "groups.left.missing").unwrap_err();
    assert!(matches!(err, Error::Schema(SchemaError::UnknownField { .. })));
}

#[test]
fn view_plans_serialize_for_the_store() {
    let dataset = group_dataset();
    let plan = dataset
        .view()
        .limit(1)
        .select_group_slice(Some(&["left", "right"]), false)
        .unwrap()
        .plan();

    let json = serde_json::to_string(&plan).unwrap();
    let restored: ViewPlan = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, plan);
    assert_eq!(resolve(&dataset, &restored).len(), 2);
}

use super::*;
use crate::{
    sample::Sample as SampleRecord,
    test_fixtures::{detections, group_dataset},
    value::Value,
};

fn plan_of(dataset: &crate::dataset::Dataset) -> ViewPlan {
    dataset.view().plan()
}

#[tokio::test]
async fn find_matching_returns_the_resolved_membership() {
    let dataset = group_dataset();

    let samples = dataset.find_matching(&plan_of(&dataset)).await.unwrap();

    assert_eq!(samples.len(), 2);
    assert!(samples
        .iter()
        .all(|sample| sample.group_element("group_field").unwrap().name == "ego"));
}

#[tokio::test]
async fn results_arrive_in_operation_order() {
    let dataset = group_dataset();

    let operations = vec![
        Aggregation::count(""),
        Aggregation::bounds("field"),
        Aggregation::distinct("field"),
    ];
    let results = dataset
        .execute_aggregations(&operations, &plan_of(&dataset))
        .await
        .unwrap();

    assert_eq!(
        results,
        vec![
            AggregateValue::Count(2),
            AggregateValue::Bounds {
                min: Some(Value::Int(2)),
                max: Some(Value::Int(5)),
                nonfinite: None,
            },
            AggregateValue::Distinct(vec![Value::Int(2), Value::Int(5)]),
        ]
    );
}

#[tokio::test]
async fn path_extraction_unwinds_lists_at_every_step() {
    let mut dataset = crate::dataset::Dataset::new();
    dataset
        .add_sample(
            SampleRecord::new("a.jpg")
                .with_field("detections", detections(&[("cat", 0.9), ("dog", 0.4)])),
        )
        .unwrap();
    dataset
        .add_sample(SampleRecord::new("b.jpg").with_field("detections", detections(&[("dog", 0.7)])))
        .unwrap();

    let operations = vec![
        Aggregation::count("detections"),
        Aggregation::count("detections.detections"),
        Aggregation::count("detections.detections.label"),
        Aggregation::count_values_all("detections.detections.tags"),
    ];
    let results = dataset
        .execute_aggregations(&operations, &plan_of(&dataset))
        .await
        .unwrap();

    assert_eq!(results[0], AggregateValue::Count(2));
    assert_eq!(results[1], AggregateValue::Count(3));
    assert_eq!(results[2], AggregateValue::Count(3));
    assert_eq!(
        results[3],
        AggregateValue::CountValues {
            distinct: 1,
            values: vec![(Value::Str("validated".to_string()), 3)],
        }
    );
}

#[tokio::test]
async fn safe_bounds_exclude_and_tally_nonfinite_values() {
    let mut dataset = crate::dataset::Dataset::new();
    for (path, value) in [
        ("a.jpg", 0.5),
        ("b.jpg", f64::NAN),
        ("c.jpg", f64::INFINITY),
        ("d.jpg", 2.5),
    ] {
        dataset
            .add_sample(SampleRecord::new(path).with_field("confidence", value))
            .unwrap();
    }

    let results = dataset
        .execute_aggregations(
            &[Aggregation::safe_bounds("confidence")],
            &plan_of(&dataset),
        )
        .await
        .unwrap();

    assert_eq!(
        results[0],
        AggregateValue::Bounds {
            min: Some(Value::Float(0.5)),
            max: Some(Value::Float(2.5)),
            nonfinite: Some(2),
        }
    );
}

#[tokio::test]
async fn histograms_truncate_after_ranking() {
    let mut dataset = crate::dataset::Dataset::new();
    for (path, label) in [
        ("a.jpg", "cat"),
        ("b.jpg", "cat"),
        ("c.jpg", "dog"),
        ("d.jpg", "dog"),
        ("e.jpg", "dog"),
        ("f.jpg", "bird"),
    ] {
        dataset
            .add_sample(SampleRecord::new(path).with_field("label", label))
            .unwrap();
    }

    let results = dataset
        .execute_aggregations(
            &[
                Aggregation::count_values("label", 2),
                Aggregation::count_values_within("label", vec!["bird".to_string()]),
            ],
            &plan_of(&dataset),
        )
        .await
        .unwrap();

    assert_eq!(
        results[0],
        AggregateValue::CountValues {
            distinct: 3,
            values: vec![
                (Value::Str("dog".to_string()), 3),
                (Value::Str("cat".to_string()), 2),
            ],
        }
    );
    assert_eq!(
        results[1],
        AggregateValue::CountValues {
            distinct: 1,
            values: vec![(Value::Str("bird".to_string()), 1)],
        }
    );
}

#[tokio::test]
async fn frame_paths_read_frame_documents() {
    let dataset = group_dataset();

    let operations = vec![
        Aggregation::count("frames"),
        Aggregation::count("frames.field"),
        Aggregation::bounds("frames.field"),
    ];
    let results = dataset
        .execute_aggregations(&operations, &plan_of(&dataset))
        .await
        .unwrap();

    assert_eq!(results[0], AggregateValue::Count(2));
    assert_eq!(results[1], AggregateValue::Count(2));
    assert_eq!(
        results[2],
        AggregateValue::Bounds {
            min: Some(Value::Int(1)),
            max: Some(Value::Int(2)),
            nonfinite: None,
        }
    );
}

#[tokio::test]
async fn missing_and_null_values_do_not_count() {
    let mut dataset = crate::dataset::Dataset::new();
    dataset
        .add_sample(SampleRecord::new("a.jpg").with_field("label", "cat"))
        .unwrap();
    dataset
        .add_sample(SampleRecord::new("b.jpg").with_field("label", Value::None))
        .unwrap();
    dataset.add_sample(SampleRecord::new("c.jpg")).unwrap();

    let results = dataset
        .execute_aggregations(
            &[Aggregation::count(""), Aggregation::count("label")],
            &plan_of(&dataset),
        )
        .await
        .unwrap();

    assert_eq!(results[0], AggregateValue::Count(3));
    assert_eq!(results[1], AggregateValue::Count(1));
}

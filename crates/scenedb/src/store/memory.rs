use crate::{
    aggregate::{AggregateValue, Aggregation},
    dataset::Dataset,
    error::StoreFailure,
    sample::Sample,
    store::SampleStore,
    value::{Document, Value},
    view::{resolve, ViewPlan},
};
use std::cmp::Ordering;

/// `Dataset` is the in-memory reference store: plans resolve against its
/// own samples and aggregations fold in process. A remote store client
/// implements the same trait against a server.
impl SampleStore for Dataset {
    async fn find_matching(&self, plan: &ViewPlan) -> Result<Vec<Sample>, StoreFailure> {
        Ok(resolve(self, plan).into_iter().cloned().collect())
    }

    async fn execute_aggregations(
        &self,
        operations: &[Aggregation],
        plan: &ViewPlan,
    ) -> Result<Vec<AggregateValue>, StoreFailure> {
        let samples = resolve(self, plan);

        Ok(operations
            .iter()
            .map(|operation| evaluate(operation, &samples))
            .collect())
    }
}

/// Evaluate one aggregation over the matched samples.
#[allow(clippy::cast_possible_truncation)]
fn evaluate(operation: &Aggregation, samples: &[&Sample]) -> AggregateValue {
    let path = operation.path();

    match operation {
        Aggregation::Count { .. } if path.is_empty() => {
            AggregateValue::Count(samples.len() as u64)
        }
        Aggregation::Count { .. } if path == "frames" => AggregateValue::Count(
            samples.iter().map(|sample| sample.frames.len()).sum::<usize>() as u64,
        ),
        Aggregation::Count { .. } => AggregateValue::Count(collect(samples, path).len() as u64),
        Aggregation::Bounds {
            safe,
            count_nonfinite,
            ..
        } => bounds(&collect(samples, path), *safe, *count_nonfinite),
        Aggregation::CountValues { first, include, .. } => {
            count_values(collect(samples, path), *first, include.as_deref())
        }
        Aggregation::Distinct { .. } => distinct(collect(samples, path)),
    }
}

/// Extract the non-null values at a dotted path across samples, unwinding
/// lists at every step the way a document store's aggregation pipeline
/// does. `frames.`-prefixed paths read frame documents.
fn collect<'a>(samples: &[&'a Sample], path: &str) -> Vec<&'a Value> {
    let mut values = Vec::new();

    if let Some(rest) = path.strip_prefix(crate::FRAMES_PREFIX) {
        for sample in samples {
            for frame in sample.frames.values() {
                collect_path(frame, rest, &mut values);
            }
        }
    } else {
        for sample in samples {
            collect_path(&sample.fields, path, &mut values);
        }
    }

    values
}

fn collect_path<'a>(doc: &'a Document, path: &str, out: &mut Vec<&'a Value>) {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };

    if let Some(value) = doc.get(head) {
        descend(value, rest, out);
    }
}

fn descend<'a>(value: &'a Value, rest: Option<&str>, out: &mut Vec<&'a Value>) {
    match value {
        Value::None => {}
        Value::List(items) => {
            for item in items {
                descend(item, rest, out);
            }
        }
        Value::Doc(fields) => match rest {
            Some(rest) => collect_path(fields, rest, out),
            None => out.push(value),
        },
        other => {
            if rest.is_none() {
                out.push(other);
            }
        }
    }
}

fn bounds(values: &[&Value], safe: bool, count_nonfinite: bool) -> AggregateValue {
    let mut min: Option<&Value> = None;
    let mut max: Option<&Value> = None;
    let mut nonfinite = 0u64;

    for value in values.iter().copied() {
        if value.is_nonfinite() {
            nonfinite += 1;
            if safe {
                continue;
            }
        }

        match min {
            None => min = Some(value),
            Some(current) => {
                if value.scalar_cmp(current) == Some(Ordering::Less) {
                    min = Some(value);
                }
            }
        }
        match max {
            None => max = Some(value),
            Some(current) => {
                if value.scalar_cmp(current) == Some(Ordering::Greater) {
                    max = Some(value);
                }
            }
        }
    }

    AggregateValue::Bounds {
        min: min.cloned(),
        max: max.cloned(),
        nonfinite: count_nonfinite.then_some(nonfinite),
    }
}

const fn is_scalar(value: &Value) -> bool {
    !matches!(
        value,
        Value::None | Value::List(_) | Value::Doc(_) | Value::Group(_)
    )
}

#[allow(clippy::cast_possible_truncation)]
fn count_values(
    values: Vec<&Value>,
    first: Option<usize>,
    include: Option<&[String]>,
) -> AggregateValue {
    let mut scalars: Vec<&Value> = values.into_iter().filter(|value| is_scalar(value)).collect();
    scalars.sort_by(|a, b| a.sort_cmp(b));

    let mut entries: Vec<(Value, u64)> = Vec::new();
    for value in scalars {
        if let Some((current, count)) = entries.last_mut() {
            if current.sort_cmp(value) == Ordering::Equal {
                *count += 1;
                continue;
            }
        }
        entries.push((value.clone(), 1));
    }

    if let Some(include) = include {
        entries.retain(|(value, _)| matches!(value, Value::Str(text) if include.contains(text)));
    }

    let distinct = entries.len() as u64;

    // Most frequent first; ties resolve by value so folds are stable.
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.sort_cmp(&b.0)));
    if let Some(first) = first {
        entries.truncate(first);
    }

    AggregateValue::CountValues {
        distinct,
        values: entries,
    }
}

fn distinct(values: Vec<&Value>) -> AggregateValue {
    let mut scalars: Vec<&Value> = values.into_iter().filter(|value| is_scalar(value)).collect();
    scalars.sort_by(|a, b| a.sort_cmp(b));
    scalars.dedup_by(|a, b| a.sort_cmp(*b) == Ordering::Equal);

    AggregateValue::Distinct(scalars.into_iter().cloned().collect())
}

use crate::{
    aggregate::{
        AggregateValue, Aggregation, AggregationPlan, FilterContext, LabelTagPlan, Statistics,
    },
    error::{Error, StoreFailure},
    store::SampleStore,
    types::SampleId,
    value::Value,
    view::View,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

///
/// StatisticsRequest
///
/// The transport-facing request shape: optional active filters plus an
/// optional focus sample that narrows the view before planning.
///

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StatisticsRequest {
    #[serde(default)]
    pub filters: Option<FilterContext>,
    #[serde(default)]
    pub focus_sample: Option<SampleId>,
}

/// The transport-facing entry point: plan the statistics pass for a view,
/// execute it, and return the path-keyed summary with non-finite numbers
/// pre-sanitized.
pub async fn collection_statistics<S: SampleStore>(
    store: &S,
    view: &View<'_>,
    request: &StatisticsRequest,
) -> Result<Statistics, Error> {
    let focused;
    let view = match request.focus_sample {
        Some(id) => {
            focused = view.select(&[id]);
            &focused
        }
        None => view,
    };

    let plan = AggregationPlan::build(view, request.filters.as_ref());
    execute(store, view, &plan).await
}

/// Execute a plan as one batched, order-preserving store call and fold the
/// ordered results back into a path-keyed structure.
///
/// This is the request's only suspend point. Results are all-or-nothing: a
/// store failure or a shape mismatch returns an error and nothing is folded.
pub async fn execute<S: SampleStore>(
    store: &S,
    view: &View<'_>,
    plan: &AggregationPlan,
) -> Result<Statistics, Error> {
    let operations = plan.operations();
    let view_plan = view.plan();

    debug!(operations = operations.len(), "executing batched aggregation call");

    let results = match store.execute_aggregations(&operations, &view_plan).await {
        Ok(results) => results,
        Err(failure) => {
            warn!(%failure, "batched aggregation call failed");
            return Err(failure.into());
        }
    };

    if results.len() != operations.len() {
        return Err(StoreFailure::ResultShape {
            expected: operations.len(),
            received: results.len(),
        }
        .into());
    }

    let mut results = results.into_iter();
    let mut statistics = Statistics::default();
    for group in plan.groups() {
        for operation in &group.ops {
            let Some(result) = results.next() else {
                return Err(StoreFailure::ResultShape {
                    expected: operations.len(),
                    received: 0,
                }
                .into());
            };
            statistics.insert(group.path.clone(), operation.kind_name(), result.sanitized());
        }
    }

    Ok(statistics)
}

///
/// LabelTagStatistics
///
/// Folded results of the tag pass: label counts keyed by effective path,
/// tag histograms keyed by `<effective path>.tags`.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelTagStatistics {
    pub counts: BTreeMap<String, AggregateValue>,
    pub tags: BTreeMap<String, AggregateValue>,
}

/// Plan and execute the label-tag pass as one batched call.
pub async fn label_tag_statistics<S: SampleStore>(
    store: &S,
    view: &View<'_>,
) -> Result<LabelTagStatistics, Error> {
    let plan = LabelTagPlan::build(view);
    let split = plan.counts.len();

    let operations: Vec<Aggregation> = plan
        .counts
        .iter()
        .chain(plan.tags.iter())
        .cloned()
        .collect();
    let results = view.aggregate(store, &operations).await?;

    let mut statistics = LabelTagStatistics::default();
    for (index, (operation, result)) in operations.iter().zip(results).enumerate() {
        let bucket = if index < split {
            &mut statistics.counts
        } else {
            &mut statistics.tags
        };
        bucket.insert(operation.path().to_string(), result);
    }

    Ok(statistics)
}

impl View<'_> {
    /// Execute an ordered batch of aggregations against this view through
    /// `store`, returning sanitized results in operation order.
    pub async fn aggregate<S: SampleStore>(
        &self,
        store: &S,
        operations: &[Aggregation],
    ) -> Result<Vec<AggregateValue>, Error> {
        let results = store.execute_aggregations(operations, &self.plan()).await?;

        if results.len() != operations.len() {
            return Err(StoreFailure::ResultShape {
                expected: operations.len(),
                received: results.len(),
            }
            .into());
        }

        Ok(results.into_iter().map(AggregateValue::sanitized).collect())
    }

    /// Count the non-null values at `path` (matched samples for `""`).
    pub async fn count<S: SampleStore>(&self, store: &S, path: &str) -> Result<u64, Error> {
        match self.aggregate(store, &[Aggregation::count(path)]).await?.pop() {
            Some(AggregateValue::Count(count)) => Ok(count),
            _ => Err(StoreFailure::ResultShape {
                expected: 1,
                received: 0,
            }
            .into()),
        }
    }

    /// Sorted distinct values at `path`.
    pub async fn distinct<S: SampleStore>(
        &self,
        store: &S,
        path: &str,
    ) -> Result<Vec<Value>, Error> {
        match self
            .aggregate(store, &[Aggregation::distinct(path)])
            .await?
            .pop()
        {
            Some(AggregateValue::Distinct(values)) => Ok(values),
            _ => Err(StoreFailure::ResultShape {
                expected: 1,
                received: 0,
            }
            .into()),
        }
    }
}

//! Module: store
//! Responsibility: the seam to the backing document store, plus the
//! in-memory reference implementation used by tests and embedded callers.
//! Does not own: planning, folding, or view composition.

mod memory;

#[cfg(test)]
mod tests;

use crate::{
    aggregate::{AggregateValue, Aggregation},
    error::StoreFailure,
    sample::Sample,
    view::ViewPlan,
};
use std::future::Future;

///
/// SampleStore
///
/// The backing store's capabilities as consumed by this crate. Both calls
/// are expected to read a consistent snapshot for the duration of one call;
/// isolation and write serialization are the store's concern. Neither call
/// is retried here.
///

pub trait SampleStore {
    /// Samples matched by a view plan, in pipeline order.
    fn find_matching(
        &self,
        plan: &ViewPlan,
    ) -> impl Future<Output = Result<Vec<Sample>, StoreFailure>> + Send;

    /// Execute an ordered batch of aggregations over a view plan, returning
    /// one result per operation in the same order.
    fn execute_aggregations(
        &self,
        operations: &[Aggregation],
        plan: &ViewPlan,
    ) -> impl Future<Output = Result<Vec<AggregateValue>, StoreFailure>> + Send;
}

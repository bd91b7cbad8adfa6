//! Core engine for SceneDB: grouped media collections, composable views,
//! and the schema-walking aggregation planner/executor that summarizes a
//! view in one batched store call.
//!
//! ## Crate layout
//! - `dataset`: the owning collection, group configuration, and mutation ops.
//! - `view`: stage pipelines, slice selection, and cross-slice resolution.
//! - `schema`: field-kind descriptors, label taxonomy, and the path walk.
//! - `aggregate`: aggregation value objects, planner, and executor.
//! - `store`: the backing-store seam and the in-memory reference store.

pub mod aggregate;
pub mod dataset;
pub mod error;
pub mod group;
pub mod media;
pub mod sample;
pub mod schema;
pub mod store;
pub mod types;
pub mod value;
pub mod view;

#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Distinct-value cap for categorical histograms without an include-list.
pub const CATEGORICAL_FIRST: usize = 200;

/// Distinct-value cap for boolean histograms.
pub const BOOLEAN_FIRST: usize = 3;

/// Path prefix addressing frame-level fields of video samples.
pub const FRAMES_PREFIX: &str = "frames.";

/// Path prefix addressing sibling-slice fields on a grouped collection.
pub const GROUPS_PREFIX: &str = "groups.";

///
/// Prelude
///
/// Prelude contains only domain vocabulary. No errors, planners, executors,
/// or store seams are re-exported here.
///

pub mod prelude {
    pub use crate::{
        dataset::Dataset,
        group::{Group, GroupElement},
        media::MediaKind,
        sample::Sample,
        schema::{FieldKind, FieldSchema, LabelKind},
        types::{GroupId, ObjectId, SampleId},
        value::{Document, Value},
        view::View,
    };
}

use crate::{media::MediaKind, schema::FieldKind, types::GroupId};
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level error taxonomy. Planning-phase failures (`Schema`,
/// `Validation`, `NotFound`) are synchronous and abort a request before any
/// store call is issued; `Store` failures surface the backing store's error
/// unmodified, with no retries at this layer.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Store(#[from] StoreFailure),
}

///
/// SchemaError
///
/// Illegal schema or group-field mutation attempts.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("collection already declares a group field: {field}")]
    GroupFieldExists { field: String },

    #[error("the group field cannot be {operation} directly: {field}")]
    GroupFieldProtected {
        field: String,
        operation: &'static str,
    },

    #[error("field kind conflict at {path}: declared {declared:?}, observed {observed:?}")]
    FieldKindConflict {
        path: String,
        declared: Box<FieldKind>,
        observed: Box<FieldKind>,
    },

    #[error("unknown field: {field}")]
    UnknownField { field: String },

    #[error("field already exists: {field}")]
    FieldExists { field: String },
}

///
/// ValidationError
///
/// Caller-supplied arguments that are structurally invalid for the
/// collection they target.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidationError {
    #[error("slice selection is empty")]
    EmptySliceSelection,

    #[error("collection has no group configuration")]
    NotGrouped,

    #[error("selected slices have mixed media kinds: {kinds:?}")]
    MixedMediaKinds { kinds: Vec<MediaKind> },

    #[error("the group field cannot be excluded from a view: {field}")]
    GroupFieldRequired { field: String },

    #[error("slice {slice} holds {declared} media but sample is {observed}")]
    SliceMediaKind {
        slice: String,
        declared: MediaKind,
        observed: MediaKind,
    },

    #[error("collection holds {declared} media but sample is {observed}")]
    CollectionMediaKind {
        declared: MediaKind,
        observed: MediaKind,
    },

    #[error("sample carries no element for group field: {field}")]
    MissingGroupElement { field: String },

    #[error("ungrouped collection cannot accept a group element in field: {field}")]
    UnexpectedGroupElement { field: String },

    #[error("cross-slice path is malformed: {path}")]
    CrossSlicePath { path: String },

    #[error("group slice already exists: {name}")]
    SliceExists { name: String },
}

///
/// NotFoundError
///
/// Lookups of group identities or slice names that do not exist in the
/// targeted view.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum NotFoundError {
    #[error("no group with identity {id} in view")]
    Group { id: GroupId },

    #[error("unknown group slice: {name}")]
    Slice { name: String },
}

///
/// StoreFailure
///
/// Failures raised by (or on behalf of) the backing store while resolving
/// the single batched aggregation call. Retry policy belongs to the store
/// client, not this crate.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreFailure {
    #[error("backing store unavailable: {message}")]
    Unavailable { message: String },

    #[error("batched aggregation call failed: {message}")]
    Batch { message: String },

    #[error("store returned {received} results for {expected} operations")]
    ResultShape { expected: usize, received: usize },
}

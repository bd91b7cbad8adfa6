use crate::{error::ValidationError, media::MediaKind, types::GroupId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Group
///
/// Identity factory for one logical group. Minting elements from the same
/// factory ties samples in different slices to one shared group identity.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Group {
    id: GroupId,
}

impl Group {
    /// Mint a fresh group identity.
    #[must_use]
    pub fn new() -> Self {
        Self { id: GroupId::new() }
    }

    /// The shared identity of every element minted from this factory.
    #[must_use]
    pub const fn id(&self) -> GroupId {
        self.id
    }

    /// Mint the membership record for one named slice of this group.
    #[must_use]
    pub fn element(&self, name: impl Into<String>) -> GroupElement {
        GroupElement {
            id: self.id,
            name: name.into(),
        }
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

///
/// GroupElement
///
/// The value a sample carries in the collection's group field: the group
/// identity plus the name of the slice this sample fills.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupElement {
    pub id: GroupId,
    pub name: String,
}

///
/// GroupConfig
///
/// Group configuration of one collection: which field holds group elements,
/// the default and active slices, and the slice-to-media-kind map observed
/// so far. This record is the single source of truth for group state; both
/// explicit declaration and first-insert inference write into it.
///
/// Serializes losslessly, so the grouped state of a collection is fully
/// reconstructible from this structure alone.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub field: String,
    pub default_slice: Option<String>,
    pub active_slice: Option<String>,
    pub media: BTreeMap<String, MediaKind>,
}

impl GroupConfig {
    /// Build a config for a newly declared group field. The default slice,
    /// when given, doubles as the initial active slice.
    pub(crate) fn new(field: impl Into<String>, default_slice: Option<String>) -> Self {
        Self {
            field: field.into(),
            active_slice: default_slice.clone(),
            default_slice,
            media: BTreeMap::new(),
        }
    }

    /// Declared slice names, in lexicographic order.
    #[must_use]
    pub fn slices(&self) -> Vec<&str> {
        self.media.keys().map(String::as_str).collect()
    }

    /// The declared media kind of one slice.
    #[must_use]
    pub fn slice_media(&self, name: &str) -> Option<MediaKind> {
        self.media.get(name).copied()
    }

    /// Record that `slice` holds `kind` media. The first observation of a
    /// slice declares its kind collection-wide; later observations must
    /// agree. The first slice ever observed becomes the default and active
    /// slice when none is set yet.
    pub(crate) fn observe(&mut self, slice: &str, kind: MediaKind) -> Result<(), ValidationError> {
        match self.media.get(slice) {
            Some(declared) if *declared != kind => Err(ValidationError::SliceMediaKind {
                slice: slice.to_string(),
                declared: *declared,
                observed: kind,
            }),
            Some(_) => Ok(()),
            None => {
                self.media.insert(slice.to_string(), kind);
                if self.default_slice.is_none() {
                    self.default_slice = Some(slice.to_string());
                }
                if self.active_slice.is_none() {
                    self.active_slice = Some(slice.to_string());
                }
                Ok(())
            }
        }
    }

    /// Re-elect the default and active slices after a slice was removed.
    ///
    /// Tie-break: the lexicographically smallest remaining slice name wins.
    /// With no slices left, both roles are unset.
    pub(crate) fn elect_fallback(&mut self) {
        let fallback = self.media.keys().next().cloned();

        if self
            .default_slice
            .as_ref()
            .is_none_or(|name| !self.media.contains_key(name))
        {
            self.default_slice = fallback.clone();
        }
        if self
            .active_slice
            .as_ref()
            .is_none_or(|name| !self.media.contains_key(name))
        {
            self.active_slice = fallback;
        }
    }

    /// Rename a slice in the media map and in the default/active roles.
    pub(crate) fn rename_slice(&mut self, old: &str, new: &str) {
        if let Some(kind) = self.media.remove(old) {
            self.media.insert(new.to_string(), kind);
        }
        if self.default_slice.as_deref() == Some(old) {
            self.default_slice = Some(new.to_string());
        }
        if self.active_slice.as_deref() == Some(old) {
            self.active_slice = Some(new.to_string());
        }
    }
}

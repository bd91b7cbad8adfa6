use crate::{
    dataset::Dataset,
    error::{Error, NotFoundError, ValidationError},
    types::{GroupId, SampleId},
    value::Value,
};
use tracing::debug;

impl Dataset {
    /// Make `name` the active slice for interactive browsing.
    pub fn set_active_slice(&mut self, name: &str) -> Result<(), Error> {
        let config = self.group.as_mut().ok_or(ValidationError::NotGrouped)?;
        if !config.media.contains_key(name) {
            return Err(NotFoundError::Slice {
                name: name.to_string(),
            }
            .into());
        }
        config.active_slice = Some(name.to_string());
        Ok(())
    }

    /// Make `name` the default slice.
    pub fn set_default_slice(&mut self, name: &str) -> Result<(), Error> {
        let config = self.group.as_mut().ok_or(ValidationError::NotGrouped)?;
        if !config.media.contains_key(name) {
            return Err(NotFoundError::Slice {
                name: name.to_string(),
            }
            .into());
        }
        config.default_slice = Some(name.to_string());
        Ok(())
    }

    /// Rename a slice across the media map, the default/active roles, and
    /// every group element referencing it.
    pub fn rename_group_slice(&mut self, old: &str, new: &str) -> Result<(), Error> {
        let config = self.group.as_mut().ok_or(ValidationError::NotGrouped)?;
        if !config.media.contains_key(old) {
            return Err(NotFoundError::Slice {
                name: old.to_string(),
            }
            .into());
        }
        if config.media.contains_key(new) {
            return Err(ValidationError::SliceExists {
                name: new.to_string(),
            }
            .into());
        }

        config.rename_slice(old, new);
        let field = config.field.clone();

        for sample in &mut self.samples {
            if let Some(Value::Group(element)) = sample.fields.get_mut(&field) {
                if element.name == old {
                    element.name = new.to_string();
                }
            }
        }

        debug!(old, new, "renamed group slice");
        Ok(())
    }

    /// Delete a slice: every sample whose group element names it is removed,
    /// along with its media-map entry. When the deleted slice held the
    /// default or active role, the lexicographically smallest remaining
    /// slice takes over; with no slices left, both roles are unset and the
    /// collection's media kind reverts to ungrouped.
    pub fn delete_group_slice(&mut self, name: &str) -> Result<(), Error> {
        let config = self.group.as_ref().ok_or(ValidationError::NotGrouped)?;
        if !config.media.contains_key(name) {
            return Err(NotFoundError::Slice {
                name: name.to_string(),
            }
            .into());
        }
        let field = config.field.clone();

        self.samples.retain(|sample| {
            sample
                .group_element(&field)
                .is_none_or(|element| element.name != name)
        });

        if let Some(config) = self.group.as_mut() {
            config.media.remove(name);
            config.elect_fallback();

            if config.media.is_empty() {
                self.media_kind = None;
            }
        }

        debug!(slice = name, "deleted group slice");
        Ok(())
    }

    /// Delete samples by identity. Unknown identities are ignored.
    pub fn delete_samples(&mut self, ids: &[SampleId]) {
        self.samples.retain(|sample| !ids.contains(&sample.id));
    }

    /// Delete every member sample of the named groups. Declared slices keep
    /// their media-map entries; only slice deletion retires a slice name.
    pub fn delete_groups(&mut self, group_ids: &[GroupId]) {
        let Some(field) = self.group_field().map(str::to_string) else {
            return;
        };

        self.samples.retain(|sample| {
            sample
                .group_element(&field)
                .is_none_or(|element| !group_ids.contains(&element.id))
        });
    }
}

use crate::{
    dataset::Dataset,
    error::{Error, NotFoundError, SchemaError, ValidationError},
    media::MediaKind,
    schema::FieldKind,
    view::{Stage, View},
};

impl<'a> View<'a> {
    /// Project a grouped view down to one or more named slices, producing a
    /// flat view.
    ///
    /// - `None`: the active slice — or, with `allow_mixed`, every declared
    ///   slice in each group's own insertion order.
    /// - One name: that slice; the result reports the slice's media kind.
    /// - Several names: the union in (group order, requested-slice order).
    ///   Heterogeneous media kinds fail unless `allow_mixed` is set, in
    ///   which case the result reports `Mixed`.
    ///
    /// Fails with `ValidationError` on ungrouped or already-flat views and
    /// on empty selections, and with `NotFoundError` for unknown slices.
    pub fn select_group_slice(
        &self,
        slices: Option<&[&str]>,
        allow_mixed: bool,
    ) -> Result<Self, Error> {
        let config = self.group_config().ok_or(ValidationError::NotGrouped)?;

        let (requested, kinds): (Option<Vec<String>>, Vec<MediaKind>) = match slices {
            Some(names) => {
                if names.is_empty() {
                    return Err(ValidationError::EmptySliceSelection.into());
                }

                let mut kinds = Vec::new();
                for name in names {
                    let kind = config.slice_media(name).ok_or_else(|| NotFoundError::Slice {
                        name: (*name).to_string(),
                    })?;
                    if !kinds.contains(&kind) {
                        kinds.push(kind);
                    }
                }

                (
                    Some(names.iter().map(ToString::to_string).collect()),
                    kinds,
                )
            }
            None if allow_mixed => {
                let mut kinds: Vec<MediaKind> = config.media.values().copied().collect();
                kinds.dedup();
                (None, kinds)
            }
            None => {
                let Some(active) = config.active_slice.as_deref() else {
                    return Err(ValidationError::EmptySliceSelection.into());
                };
                let kind = config.slice_media(active).ok_or_else(|| NotFoundError::Slice {
                    name: active.to_string(),
                })?;

                (Some(vec![active.to_string()]), vec![kind])
            }
        };

        if kinds.len() > 1 && !allow_mixed {
            return Err(ValidationError::MixedMediaKinds { kinds }.into());
        }

        let media_kind = match kinds.as_slice() {
            [kind] => *kind,
            _ => MediaKind::Mixed,
        };

        Ok(self.with_stage(Stage::SelectSlices {
            slices: requested,
            media_kind,
        }))
    }
}

/// Resolve a `groups.<slice>.<field>` path: the slice name, the residual
/// field path, and the field's declared kind looked up as if `<slice>` were
/// the active slice. Descends embedded and label schemas exactly like a
/// normal dotted lookup; the schema walk itself stays slice-unaware.
pub fn resolve_cross_slice_path<'a>(
    dataset: &'a Dataset,
    path: &str,
) -> Result<(String, String, &'a FieldKind), Error> {
    let Some(rest) = path.strip_prefix(crate::GROUPS_PREFIX) else {
        return Err(ValidationError::CrossSlicePath {
            path: path.to_string(),
        }
        .into());
    };
    let Some((slice, residual)) = rest.split_once('.') else {
        return Err(ValidationError::CrossSlicePath {
            path: path.to_string(),
        }
        .into());
    };

    let config = dataset
        .group_config()
        .ok_or(ValidationError::NotGrouped)?;
    if !config.media.contains_key(slice) {
        return Err(NotFoundError::Slice {
            name: slice.to_string(),
        }
        .into());
    }

    let kind = dataset
        .schema()
        .field(residual)
        .ok_or_else(|| SchemaError::UnknownField {
            field: residual.to_string(),
        })?;

    Ok((slice.to_string(), residual.to_string(), kind))
}

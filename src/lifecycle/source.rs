//! Picks the single clone source of a creation request.

use crate::error::VolumeError;
use crate::model::SourceType;

/// The one source a new volume is created from.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ResolvedSource {
    /// Clone of the identified volume.
    Volume(String),
    /// Restore of the identified snapshot.
    Snapshot(String),
    /// Fill from the identified image.
    Image(String),
    /// Empty storage.
    Blank,
}

impl ResolvedSource {
    /// Returns the kind of the source.
    #[must_use]
    pub const fn source_type(&self) -> SourceType {
        match self {
            Self::Volume(_) => SourceType::Volume,
            Self::Snapshot(_) => SourceType::Snapshot,
            Self::Image(_) => SourceType::Image,
            Self::Blank => SourceType::Blank,
        }
    }
}

/// Resolves the optional source identifiers of a request into one source.
///
/// # Errors
///
/// Returns [`VolumeError::MultipleSources`] when more than one identifier is
/// given.
pub fn resolve_source(
    source_volume_id: Option<&str>,
    source_snapshot_id: Option<&str>,
    source_image_id: Option<&str>,
) -> Result<ResolvedSource, VolumeError> {
    let given = [source_volume_id, source_snapshot_id, source_image_id]
        .iter()
        .filter(|id| id.is_some())
        .count();
    if given > 1 {
        return Err(VolumeError::MultipleSources);
    }

    Ok(match (source_volume_id, source_snapshot_id, source_image_id) {
        (Some(id), _, _) => ResolvedSource::Volume(id.to_owned()),
        (_, Some(id), _) => ResolvedSource::Snapshot(id.to_owned()),
        (_, _, Some(id)) => ResolvedSource::Image(id.to_owned()),
        (None, None, None) => ResolvedSource::Blank,
    })
}

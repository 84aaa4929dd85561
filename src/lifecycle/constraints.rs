//! Size and disk-template checks for a resolved clone source.

use crate::config::OrchestratorConfig;
use crate::error::VolumeError;
use crate::lookup::{LockMode, LookupGateway};
use crate::model::{
    BYTES_PER_GIB, SourceArtifact, SourceType, VolumeSource, VolumeStatus, gib_to_bytes,
};

use super::source::ResolvedSource;

/// Where and how large the new volume should be.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CreationTarget<'a> {
    /// Tenant the lookups run on behalf of.
    pub tenant_id: &'a str,
    /// Disk template of the target server.
    pub disk_template: &'a str,
    /// Creation index; `Some(0)` is the root volume.
    pub index: Option<u32>,
    /// Requested size in GiB.
    pub size: Option<u64>,
}

/// Attributes derived from the source once every check has passed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidatedSource {
    /// Final size in GiB.
    pub size: u64,
    /// Source descriptor; `None` for blank volumes.
    pub source: Option<VolumeSource>,
    /// Origin checksum or backend identity.
    pub origin: Option<String>,
}

/// Validates the source against the target server and requested size.
///
/// A volume source is locked for update so concurrent clones observe the
/// same status and size.
///
/// # Errors
///
/// Returns [`VolumeError::UnsupportedSource`], [`VolumeError::SourceNotClonable`],
/// [`VolumeError::SizeRequired`], [`VolumeError::SizeTooSmall`], or
/// [`VolumeError::SizeOverflow`] for rule violations, and
/// [`VolumeError::Lookup`] when the source cannot be resolved.
pub fn check_source<G>(
    lookup: &mut G,
    config: &OrchestratorConfig,
    target: &CreationTarget<'_>,
    source: &ResolvedSource,
) -> Result<ValidatedSource, VolumeError>
where
    G: LookupGateway + ?Sized,
{
    ensure_source_allowed(config, target, source)?;

    match source {
        ResolvedSource::Volume(id) => check_volume_source(lookup, target, id),
        ResolvedSource::Snapshot(id) => {
            let snapshot = lookup.get_snapshot(target.tenant_id, id)?;
            check_artifact_source(SourceType::Snapshot, &snapshot, target.size)
        }
        ResolvedSource::Image(id) => {
            let image = lookup.get_image(target.tenant_id, id)?;
            check_artifact_source(SourceType::Image, &image, target.size)
        }
        ResolvedSource::Blank => {
            let size = target.size.ok_or(VolumeError::SizeRequired {
                source_type: SourceType::Blank,
            })?;
            Ok(ValidatedSource {
                size,
                source: None,
                origin: None,
            })
        }
    }
}

// Only the root volume or an extended disk template may be filled from a
// source.
fn ensure_source_allowed(
    config: &OrchestratorConfig,
    target: &CreationTarget<'_>,
    source: &ResolvedSource,
) -> Result<(), VolumeError> {
    let root = matches!(target.index, Some(0));
    if root || config.is_extended_template(target.disk_template) {
        return Ok(());
    }
    if matches!(source, ResolvedSource::Blank) {
        return Ok(());
    }
    Err(VolumeError::UnsupportedSource {
        disk_template: target.disk_template.to_owned(),
    })
}

fn check_volume_source<G>(
    lookup: &mut G,
    target: &CreationTarget<'_>,
    source_id: &str,
) -> Result<ValidatedSource, VolumeError>
where
    G: LookupGateway + ?Sized,
{
    let source_volume = lookup.get_volume(target.tenant_id, source_id, LockMode::ForUpdate)?;
    if source_volume.status != VolumeStatus::InUse {
        return Err(VolumeError::SourceNotClonable {
            volume_id: source_volume.id,
            status: source_volume.status,
        });
    }

    // Both sizes are GiB.
    let size = match target.size {
        None => source_volume.size,
        Some(requested) if requested < source_volume.size => {
            return Err(VolumeError::SizeTooSmall {
                source_type: SourceType::Volume,
                source_id: source_volume.id,
                requested_bytes: requested.saturating_mul(BYTES_PER_GIB),
                minimum_bytes: source_volume.size.saturating_mul(BYTES_PER_GIB),
            });
        }
        Some(requested) => requested,
    };

    Ok(ValidatedSource {
        size,
        source: Some(VolumeSource::new(SourceType::Volume, source_volume.id)),
        origin: Some(source_volume.backend_volume_id),
    })
}

fn check_artifact_source(
    source_type: SourceType,
    artifact: &SourceArtifact,
    requested: Option<u64>,
) -> Result<ValidatedSource, VolumeError> {
    let size = requested.ok_or(VolumeError::SizeRequired { source_type })?;
    let requested_bytes = to_bytes(size)?;
    if requested_bytes < artifact.size_bytes {
        return Err(VolumeError::SizeTooSmall {
            source_type,
            source_id: artifact.id.clone(),
            requested_bytes,
            minimum_bytes: artifact.size_bytes,
        });
    }

    Ok(ValidatedSource {
        size,
        source: Some(VolumeSource::new(source_type, artifact.id.clone())),
        origin: Some(artifact.checksum.clone()),
    })
}

fn to_bytes(size: u64) -> Result<u64, VolumeError> {
    gib_to_bytes(size).ok_or(VolumeError::SizeOverflow { size })
}

//! Entities handled by the orchestrator: volumes, their metadata, and the
//! external records (servers, snapshots, images) they are created from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VolumeError;

/// Byte count for a single gibibyte; volume sizes are expressed in GiB.
pub const BYTES_PER_GIB: u64 = 1024 * 1024 * 1024;

/// Converts a size in GiB to bytes, returning `None` on overflow.
#[must_use]
pub const fn gib_to_bytes(size_gib: u64) -> Option<u64> {
    size_gib.checked_mul(BYTES_PER_GIB)
}

/// Lifecycle status of a volume.
///
/// The orchestrator only ever writes [`VolumeStatus::Creating`]; the other
/// states are set once the backend job system reports the attach outcome.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeStatus {
    /// Persisted and waiting for the attach job to complete.
    Creating,
    /// Attached to its server.
    InUse,
    /// The backend job failed.
    Error,
}

impl VolumeStatus {
    /// Returns the upper-case label used in persisted records and messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creating => "CREATING",
            Self::InUse => "IN_USE",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for VolumeStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Kind of artifact a volume's initial content is copied from.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Clone of another volume.
    Volume,
    /// Restored from a snapshot.
    Snapshot,
    /// Filled from an image.
    Image,
    /// Empty storage.
    Blank,
}

impl SourceType {
    /// Returns the lowercase label used in source descriptors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Snapshot => "snapshot",
            Self::Image => "image",
            Self::Blank => "blank",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = VolumeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "volume" => Ok(Self::Volume),
            "snapshot" => Ok(Self::Snapshot),
            "image" => Ok(Self::Image),
            "blank" => Ok(Self::Blank),
            other => Err(VolumeError::UnknownSourceType {
                value: other.to_owned(),
            }),
        }
    }
}

/// Source descriptor stored on a cloned volume.
///
/// Rendered and persisted as `<type>:<id>`, for example `snapshot:sn1`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(into = "String", try_from = "String")]
pub struct VolumeSource {
    /// Kind of the source artifact.
    pub source_type: SourceType,
    /// Identifier of the source artifact.
    pub source_id: String,
}

impl VolumeSource {
    /// Builds a descriptor for the given source.
    #[must_use]
    pub fn new(source_type: SourceType, source_id: impl Into<String>) -> Self {
        Self {
            source_type,
            source_id: source_id.into(),
        }
    }
}

impl fmt::Display for VolumeSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.source_type, self.source_id)
    }
}

impl FromStr for VolumeSource {
    type Err = VolumeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((kind, id)) = value.split_once(':') else {
            return Err(VolumeError::UnknownSourceType {
                value: value.to_owned(),
            });
        };
        Ok(Self::new(kind.parse()?, id.trim()))
    }
}

impl TryFrom<String> for VolumeSource {
    type Error = VolumeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VolumeSource> for String {
    fn from(source: VolumeSource) -> Self {
        source.to_string()
    }
}

/// A block-storage volume owned by a tenant.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Volume {
    /// Unique identifier.
    pub id: String,
    /// Owning tenant.
    pub tenant_id: String,
    /// Optional human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Size in GiB.
    pub size: u64,
    /// Current lifecycle status.
    pub status: VolumeStatus,
    /// Whether the volume is destroyed together with its server.
    pub delete_on_termination: bool,
    /// Artifact the volume was cloned from; `None` for blank volumes.
    #[serde(default)]
    pub source: Option<VolumeSource>,
    /// Integrity identifier inherited from the source.
    #[serde(default)]
    pub origin: Option<String>,
    /// Server the volume is attached to.
    #[serde(default)]
    pub machine_id: Option<String>,
    /// Position on the server; `0` marks the root volume.
    #[serde(default)]
    pub index: Option<u32>,
    /// Identity of the volume inside the storage backend.
    pub backend_volume_id: String,
    /// Identifier of the last job submitted for this volume.
    #[serde(default)]
    pub backend_job_id: Option<String>,
    /// Soft-deletion flag set by the job system once the volume is gone.
    #[serde(default)]
    pub deleted: bool,
}

impl Volume {
    /// Returns `true` when the volume is the root volume of its server.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        matches!(self.index, Some(0))
    }

    /// Returns the kind of source the volume was created from.
    #[must_use]
    pub fn source_type(&self) -> SourceType {
        self.source
            .as_ref()
            .map_or(SourceType::Blank, |source| source.source_type)
    }
}

/// Key/value pair attached to a volume. Keys are unique per volume.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct VolumeMetadata {
    /// Volume the record belongs to.
    pub volume_id: String,
    /// Metadata key.
    pub key: String,
    /// Metadata value.
    pub value: String,
}

/// Hardware profile of a server.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Flavor {
    /// Flavor identifier.
    pub id: String,
    /// Storage backend configuration, for example `ext_rbd` or `drbd`.
    pub disk_template: String,
}

/// A compute instance volumes are attached to.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Server {
    /// Unique identifier.
    pub id: String,
    /// Owning tenant.
    pub tenant_id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Hardware profile.
    pub flavor: Flavor,
    /// Whether the server has been deleted.
    #[serde(default)]
    pub deleted: bool,
}

/// Snapshot or image a volume can be filled from.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SourceArtifact {
    /// Unique identifier.
    pub id: String,
    /// Owning tenant.
    pub owner: String,
    /// Reported size in bytes.
    pub size_bytes: u64,
    /// Content checksum copied to cloned volumes as their origin.
    pub checksum: String,
    /// Whether tenants other than the owner may read the artifact.
    #[serde(default)]
    pub public: bool,
}

//! Identifier resolution for the entities a volume operation touches.

use std::fmt;

use thiserror::Error;

use crate::model::{Server, SourceArtifact, Volume};

/// Row lock requested alongside a lookup.
///
/// Locks taken with [`LockMode::ForUpdate`] are held until the enclosing
/// transaction commits or rolls back.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum LockMode {
    /// Plain read.
    #[default]
    Shared,
    /// Exclusive lock serialising concurrent writers of the same row.
    ForUpdate,
}

/// Kinds of entity the gateway resolves.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ResourceKind {
    /// Compute instance.
    Server,
    /// Block-storage volume.
    Volume,
    /// Volume snapshot.
    Snapshot,
    /// Disk image.
    Image,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Server => "server",
            Self::Volume => "volume",
            Self::Snapshot => "snapshot",
            Self::Image => "image",
        })
    }
}

/// Errors raised while resolving identifiers.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum LookupError {
    /// Raised when the entity does not exist or is not visible to the tenant.
    #[error("{resource} {id} not found")]
    NotFound {
        /// Kind of entity requested.
        resource: ResourceKind,
        /// Identifier requested.
        id: String,
    },
    /// Raised when the entity exists but the tenant may not use it.
    #[error("{resource} {id} is not accessible")]
    Forbidden {
        /// Kind of entity requested.
        resource: ResourceKind,
        /// Identifier requested.
        id: String,
    },
}

/// Resolves identifiers to live entities on behalf of a tenant.
pub trait LookupGateway {
    /// Loads a server owned by `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] when the server is missing, deleted,
    /// or owned by another tenant.
    fn get_server(
        &mut self,
        tenant_id: &str,
        server_id: &str,
        lock: LockMode,
    ) -> Result<Server, LookupError>;

    /// Loads a volume owned by `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] when the volume is missing, deleted,
    /// or owned by another tenant.
    fn get_volume(
        &mut self,
        tenant_id: &str,
        volume_id: &str,
        lock: LockMode,
    ) -> Result<Volume, LookupError>;

    /// Loads a snapshot readable by `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] for unknown snapshots and
    /// [`LookupError::Forbidden`] for private snapshots of other tenants.
    fn get_snapshot(
        &mut self,
        tenant_id: &str,
        snapshot_id: &str,
    ) -> Result<SourceArtifact, LookupError>;

    /// Loads an image readable by `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] for unknown images and
    /// [`LookupError::Forbidden`] for private images of other tenants.
    fn get_image(&mut self, tenant_id: &str, image_id: &str)
    -> Result<SourceArtifact, LookupError>;
}

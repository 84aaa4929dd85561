//! Volume lifecycle operations: create, delete, rename, and description
//! updates.
//!
//! Every operation runs inside one store transaction. Any error rolls back
//! every row written by the call; a normal return commits them.

use crate::config::OrchestratorConfig;
use crate::error::VolumeError;
use crate::jobs::{AttachmentCoordinator, JobBackend};
use crate::lookup::{LockMode, LookupGateway};
use crate::model::{Volume, VolumeMetadata};
use crate::repository::{Store, Transaction, VolumeRepository};

pub mod constraints;
mod factory;
mod request;
pub mod source;


pub use constraints::{CreationTarget, ValidatedSource, check_source};
pub use request::{CreateVolumeRequest, CreateVolumeRequestBuilder};
pub use source::{ResolvedSource, resolve_source};

use factory::VolumeFactory;

/// Coordinates validation, persistence, and job submission for volumes.
#[derive(Debug)]
pub struct VolumeOrchestrator<S, J> {
    store: S,
    coordinator: AttachmentCoordinator<J>,
    config: OrchestratorConfig,
}

impl<S, J> VolumeOrchestrator<S, J>
where
    S: Store,
    J: JobBackend,
{
    /// Creates an orchestrator over the given store and job backend.
    #[must_use]
    pub const fn new(store: S, jobs: J, config: OrchestratorConfig) -> Self {
        Self {
            store,
            coordinator: AttachmentCoordinator::new(jobs),
            config,
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the job backend.
    #[must_use]
    pub const fn jobs(&self) -> &J {
        self.coordinator.backend()
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Creates a volume, attaches its metadata, and submits the attach job.
    ///
    /// The target server is locked for the duration of the call, as is the
    /// source volume when cloning one.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::ServerRequired`] without touching the store when
    /// no server is given. Validation, lookup, persistence, and job
    /// submission failures roll back everything written by the call.
    pub fn create(&self, request: &CreateVolumeRequest) -> Result<Volume, VolumeError> {
        let server_id = request
            .server_id
            .as_deref()
            .ok_or(VolumeError::ServerRequired)?;
        self.atomically(|tx| self.create_in(tx, request, server_id))
    }

    fn create_in<T>(
        &self,
        tx: &mut T,
        request: &CreateVolumeRequest,
        server_id: &str,
    ) -> Result<Volume, VolumeError>
    where
        T: Transaction,
    {
        let server = tx.get_server(&request.tenant_id, server_id, LockMode::ForUpdate)?;

        let source = resolve_source(
            request.source_volume_id.as_deref(),
            request.source_snapshot_id.as_deref(),
            request.source_image_id.as_deref(),
        )?;
        let target = CreationTarget {
            tenant_id: &request.tenant_id,
            disk_template: &server.flavor.disk_template,
            index: request.index,
            size: request.size,
        };
        let validated = check_source(tx, &self.config, &target, &source)?;

        let mut volume = VolumeFactory::new(&self.config).create(tx, request, &server, validated)?;
        for (key, value) in &request.metadata {
            tx.insert_metadata(&volume.id, key, value)?;
        }

        self.coordinator.attach(tx, &server, &mut volume)?;
        tracing::info!(
            volume_id = %volume.id,
            server_id = %server.id,
            source = %source.source_type(),
            size = volume.size,
            "created volume"
        );
        Ok(volume)
    }

    /// Deletes a volume by detaching it from its server.
    ///
    /// The stored row is reloaded and locked first; `volume` only identifies
    /// it. Completion is asynchronous: the returned volume is the stored row
    /// with the detach job id recorded.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::DetachedDelete`] without submitting a job when
    /// the stored row is not attached, and passes through lookup, job
    /// submission, and persistence failures.
    pub fn delete(&self, volume: &Volume) -> Result<Volume, VolumeError> {
        self.atomically(|tx| {
            let mut current = tx.get_volume(&volume.tenant_id, &volume.id, LockMode::ForUpdate)?;
            let Some(machine_id) = current.machine_id.clone() else {
                return Err(VolumeError::DetachedDelete {
                    volume_id: current.id,
                });
            };

            let server = tx.get_server(&current.tenant_id, &machine_id, LockMode::Shared)?;
            let job_id = self.coordinator.detach(tx, &server, &mut current)?;
            tracing::info!(
                volume_id = %current.id,
                server_id = %machine_id,
                job_id = %job_id,
                "detaching volume from server"
            );
            Ok(current)
        })
    }

    /// Renames a volume, leaving every other stored field as it is.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Lookup`] when the volume no longer exists and
    /// [`VolumeError::Store`] when it cannot be persisted.
    pub fn rename(
        &self,
        volume: &Volume,
        new_name: impl Into<String>,
    ) -> Result<Volume, VolumeError> {
        self.update(volume, |current| current.name = Some(new_name.into()))
    }

    /// Replaces a volume's description, leaving every other stored field as
    /// it is.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Lookup`] when the volume no longer exists and
    /// [`VolumeError::Store`] when it cannot be persisted.
    pub fn update_description(
        &self,
        volume: &Volume,
        new_description: impl Into<String>,
    ) -> Result<Volume, VolumeError> {
        self.update(volume, |current| {
            current.description = Some(new_description.into());
        })
    }

    /// Loads a volume owned by `tenant_id`.
    ///
    /// # Errors
    ///
    /// Passes through [`VolumeError::Lookup`] failures.
    pub fn find(&self, tenant_id: &str, volume_id: &str) -> Result<Volume, VolumeError> {
        self.atomically(|tx| Ok(tx.get_volume(tenant_id, volume_id, LockMode::Shared)?))
    }

    /// Returns a volume's metadata ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Store`] when the records cannot be read.
    pub fn metadata(&self, volume_id: &str) -> Result<Vec<VolumeMetadata>, VolumeError> {
        self.atomically(|tx| Ok(tx.metadata(volume_id)?))
    }

    fn update<F>(&self, volume: &Volume, change: F) -> Result<Volume, VolumeError>
    where
        F: FnOnce(&mut Volume),
    {
        self.atomically(|tx| {
            let mut current = tx.get_volume(&volume.tenant_id, &volume.id, LockMode::ForUpdate)?;
            change(&mut current);
            tx.save_volume(&current)?;
            Ok(current)
        })
    }

    fn atomically<'s, T, F>(&'s self, operation: F) -> Result<T, VolumeError>
    where
        S: 's,
        F: FnOnce(&mut S::Tx<'s>) -> Result<T, VolumeError>,
    {
        let mut tx = self.store.begin()?;
        match operation(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                tx.rollback();
                Err(err)
            }
        }
    }
}

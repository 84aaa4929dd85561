//! Attach and detach job submission.
//!
//! The hypervisor-level work runs in an external job engine. This module only
//! submits requests and records the returned job identifiers; completion is
//! observed later through the volume status.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::VolumeError;
use crate::model::{Server, Volume};
use crate::repository::VolumeRepository;

/// Identifier returned by the job backend for a submitted job.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wraps a backend-provided identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Operation carried out by a job.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobAction {
    /// Attach a volume to a server.
    Attach,
    /// Detach a volume from a server.
    Detach,
}

impl fmt::Display for JobAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Attach => "attach",
            Self::Detach => "detach",
        })
    }
}

/// Errors raised when the backend refuses a submission.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum JobError {
    /// Raised when a job cannot be submitted.
    #[error("failed to submit {action} job for volume {volume_id} on server {server_id}: {message}")]
    Submission {
        /// Requested operation.
        action: JobAction,
        /// Volume the job targets.
        volume_id: String,
        /// Server the job targets.
        server_id: String,
        /// Message from the backend.
        message: String,
    },
}

/// Narrow interface onto the external job engine.
pub trait JobBackend {
    /// Submits an attach job and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Submission`] when the backend rejects the job.
    fn attach(&self, server: &Server, volume: &Volume) -> Result<JobId, JobError>;

    /// Submits a detach job and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Submission`] when the backend rejects the job.
    fn detach(&self, server: &Server, volume: &Volume) -> Result<JobId, JobError>;
}

/// Submits attach/detach jobs and records them on the volume.
#[derive(Clone, Debug)]
pub struct AttachmentCoordinator<J> {
    backend: J,
}

impl<J: JobBackend> AttachmentCoordinator<J> {
    /// Wraps a job backend.
    #[must_use]
    pub const fn new(backend: J) -> Self {
        Self { backend }
    }

    /// Returns the wrapped backend.
    #[must_use]
    pub const fn backend(&self) -> &J {
        &self.backend
    }

    /// Submits an attach job for `volume` on `server` and stores the job id.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::JobSubmission`] when submission fails and
    /// [`VolumeError::Store`] when the job id cannot be recorded.
    pub fn attach<R>(
        &self,
        repository: &mut R,
        server: &Server,
        volume: &mut Volume,
    ) -> Result<JobId, VolumeError>
    where
        R: VolumeRepository + ?Sized,
    {
        let job_id = self.backend.attach(server, volume)?;
        Self::record(repository, volume, &job_id)?;
        tracing::info!(
            volume_id = %volume.id,
            server_id = %server.id,
            job_id = %job_id,
            "submitted attach job"
        );
        Ok(job_id)
    }

    /// Submits a detach job for `volume` on `server` and stores the job id.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::JobSubmission`] when submission fails and
    /// [`VolumeError::Store`] when the job id cannot be recorded.
    pub fn detach<R>(
        &self,
        repository: &mut R,
        server: &Server,
        volume: &mut Volume,
    ) -> Result<JobId, VolumeError>
    where
        R: VolumeRepository + ?Sized,
    {
        let job_id = self.backend.detach(server, volume)?;
        Self::record(repository, volume, &job_id)?;
        Ok(job_id)
    }

    fn record<R>(repository: &mut R, volume: &mut Volume, job_id: &JobId) -> Result<(), VolumeError>
    where
        R: VolumeRepository + ?Sized,
    {
        volume.backend_job_id = Some(job_id.to_string());
        repository.save_volume(volume)?;
        Ok(())
    }
}

/// A job as handed to the execution engine.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct JobRecord {
    /// Job identifier.
    pub id: JobId,
    /// Requested operation.
    pub action: JobAction,
    /// Target server.
    pub server_id: String,
    /// Target volume.
    pub volume_id: String,
}

/// In-process job backend that queues submissions for later hand-off.
///
/// Clones share the same queue.
#[derive(Clone, Debug, Default)]
pub struct JobSpool {
    queue: Arc<Mutex<Vec<JobRecord>>>,
}

impl JobSpool {
    /// Creates an empty spool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every queued job.
    #[must_use]
    pub fn drain(&self) -> Vec<JobRecord> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn submit(&self, action: JobAction, server: &Server, volume: &Volume) -> Result<JobId, JobError> {
        let mut queue = self.queue.lock().map_err(|err| JobError::Submission {
            action,
            volume_id: volume.id.clone(),
            server_id: server.id.clone(),
            message: err.to_string(),
        })?;
        let id = JobId::new(Uuid::new_v4().to_string());
        queue.push(JobRecord {
            id: id.clone(),
            action,
            server_id: server.id.clone(),
            volume_id: volume.id.clone(),
        });
        Ok(id)
    }
}

impl JobBackend for JobSpool {
    fn attach(&self, server: &Server, volume: &Volume) -> Result<JobId, JobError> {
        self.submit(JobAction::Attach, server, volume)
    }

    fn detach(&self, server: &Server, volume: &Volume) -> Result<JobId, JobError> {
        self.submit(JobAction::Detach, server, volume)
    }
}

//! Test support utilities shared across unit and integration tests.

use std::sync::{Arc, Mutex, PoisonError};

use crate::jobs::{JobAction, JobBackend, JobError, JobId, JobRecord};
use crate::model::{Flavor, Server, SourceArtifact, Volume, VolumeStatus};

/// Builds a live server owned by `tenant_id` with the given disk template.
#[must_use]
pub fn server_fixture(id: &str, tenant_id: &str, disk_template: &str) -> Server {
    Server {
        id: id.to_owned(),
        tenant_id: tenant_id.to_owned(),
        name: format!("server-{id}"),
        flavor: Flavor {
            id: format!("flavor-{disk_template}"),
            disk_template: disk_template.to_owned(),
        },
        deleted: false,
    }
}

/// Builds a 10 GiB `IN_USE` blank volume, optionally attached to a server.
#[must_use]
pub fn volume_fixture(id: &str, tenant_id: &str, machine_id: Option<&str>) -> Volume {
    Volume {
        id: id.to_owned(),
        tenant_id: tenant_id.to_owned(),
        name: None,
        description: None,
        size: 10,
        status: VolumeStatus::InUse,
        delete_on_termination: true,
        source: None,
        origin: None,
        machine_id: machine_id.map(str::to_owned),
        index: None,
        backend_volume_id: format!("vol-{id}"),
        backend_job_id: None,
        deleted: false,
    }
}

/// Builds a snapshot or image record with checksum `sha256:<id>`.
#[must_use]
pub fn artifact_fixture(id: &str, owner: &str, size_bytes: u64, public: bool) -> SourceArtifact {
    SourceArtifact {
        id: id.to_owned(),
        owner: owner.to_owned(),
        size_bytes,
        checksum: format!("sha256:{id}"),
        public,
    }
}

/// Job backend that records submissions and can be told to reject them.
///
/// Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct ScriptedJobBackend {
    state: Arc<Mutex<ScriptedJobState>>,
}

#[derive(Debug, Default)]
struct ScriptedJobState {
    fail_attach: bool,
    fail_detach: bool,
    submitted: Vec<JobRecord>,
}

impl ScriptedJobBackend {
    /// Creates a backend that accepts every submission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent attach submissions fail.
    pub fn fail_attach(&self) {
        self.lock().fail_attach = true;
    }

    /// Makes subsequent detach submissions fail.
    pub fn fail_detach(&self) {
        self.lock().fail_detach = true;
    }

    /// Returns the accepted submissions in order.
    #[must_use]
    pub fn submitted(&self) -> Vec<JobRecord> {
        self.lock().submitted.clone()
    }

    /// Returns the accepted submissions of the given kind.
    #[must_use]
    pub fn submitted_for(&self, action: JobAction) -> Vec<JobRecord> {
        self.submitted()
            .into_iter()
            .filter(|record| record.action == action)
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedJobState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn submit(&self, action: JobAction, server: &Server, volume: &Volume) -> Result<JobId, JobError> {
        let mut state = self.lock();
        let failing = match action {
            JobAction::Attach => state.fail_attach,
            JobAction::Detach => state.fail_detach,
        };
        if failing {
            return Err(JobError::Submission {
                action,
                volume_id: volume.id.clone(),
                server_id: server.id.clone(),
                message: String::from("scripted rejection"),
            });
        }
        let id = JobId::new(format!("job-{}", state.submitted.len() + 1));
        state.submitted.push(JobRecord {
            id: id.clone(),
            action,
            server_id: server.id.clone(),
            volume_id: volume.id.clone(),
        });
        Ok(id)
    }
}

impl JobBackend for ScriptedJobBackend {
    fn attach(&self, server: &Server, volume: &Volume) -> Result<JobId, JobError> {
        self.submit(JobAction::Attach, server, volume)
    }

    fn detach(&self, server: &Server, volume: &Volume) -> Result<JobId, JobError> {
        self.submit(JobAction::Detach, server, volume)
    }
}

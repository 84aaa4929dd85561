//! Builds and persists the initial volume record.

use uuid::Uuid;

use crate::config::OrchestratorConfig;
use crate::error::VolumeError;
use crate::model::{Server, Volume, VolumeStatus};
use crate::repository::VolumeRepository;

use super::constraints::ValidatedSource;
use super::request::CreateVolumeRequest;

pub(super) struct VolumeFactory<'a> {
    config: &'a OrchestratorConfig,
}

impl<'a> VolumeFactory<'a> {
    pub(super) const fn new(config: &'a OrchestratorConfig) -> Self {
        Self { config }
    }

    pub(super) fn build(
        &self,
        request: &CreateVolumeRequest,
        server: &Server,
        validated: ValidatedSource,
    ) -> Volume {
        let id = Uuid::new_v4().to_string();
        let backend_volume_id = format!("{}{id}", self.config.backend_volume_prefix);
        Volume {
            id,
            tenant_id: request.tenant_id.clone(),
            name: request.name.clone(),
            description: request.description.clone(),
            size: validated.size,
            status: VolumeStatus::Creating,
            delete_on_termination: request
                .delete_on_termination
                .unwrap_or(self.config.delete_on_termination_default()),
            source: validated.source,
            origin: validated.origin,
            machine_id: Some(server.id.clone()),
            index: request.index,
            backend_volume_id,
            backend_job_id: None,
            deleted: false,
        }
    }

    pub(super) fn create<R>(
        &self,
        repository: &mut R,
        request: &CreateVolumeRequest,
        server: &Server,
        validated: ValidatedSource,
    ) -> Result<Volume, VolumeError>
    where
        R: VolumeRepository + ?Sized,
    {
        let volume = repository.insert_volume(self.build(request, server, validated))?;
        Ok(volume)
    }
}

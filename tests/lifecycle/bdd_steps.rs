//! BDD step definitions for volume lifecycle behaviour.

use rstest_bdd_macros::{given, then, when};
use volwright::test_support::{artifact_fixture, server_fixture, volume_fixture};
use volwright::{CreateVolumeRequest, JobAction, Volume, VolumeError};

use super::test_helpers::{LifecycleContext, Outcome};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

fn record(result: Result<Volume, VolumeError>) -> Outcome {
    match result {
        Ok(volume) => Outcome::Success(volume),
        Err(err) => Outcome::Failure {
            kind: err.kind().as_str().to_owned(),
            message: err.to_string(),
        },
    }
}

fn outcome_volume(lifecycle_context: &LifecycleContext) -> Result<&Volume, StepError> {
    match lifecycle_context.outcome.as_ref() {
        Some(Outcome::Success(volume)) => Ok(volume),
        other => Err(StepError::Assertion(format!(
            "expected success, got: {other:?}"
        ))),
    }
}

#[given("a server \"{server}\" owned by tenant \"{tenant}\" with disk template \"{template}\"")]
fn server_exists(
    lifecycle_context: LifecycleContext,
    server: String,
    tenant: String,
    template: String,
) -> LifecycleContext {
    lifecycle_context.seed(|inventory| {
        inventory.with_server(server_fixture(server.trim(), tenant.trim(), template.trim()))
    })
}

#[given("an in-use volume \"{volume}\" of {size:u64} GiB owned by tenant \"{tenant}\" attached to \"{server}\"")]
fn attached_volume_exists(
    lifecycle_context: LifecycleContext,
    volume: String,
    size: u64,
    tenant: String,
    server: String,
) -> LifecycleContext {
    let mut record = volume_fixture(volume.trim(), tenant.trim(), Some(server.trim()));
    record.size = size;
    lifecycle_context.seed(|inventory| inventory.with_volume(record))
}

#[given("a detached volume \"{volume}\" owned by tenant \"{tenant}\"")]
fn detached_volume_exists(
    lifecycle_context: LifecycleContext,
    volume: String,
    tenant: String,
) -> LifecycleContext {
    lifecycle_context
        .seed(|inventory| inventory.with_volume(volume_fixture(volume.trim(), tenant.trim(), None)))
}

#[given("a snapshot \"{snapshot}\" of {size:u64} bytes owned by tenant \"{tenant}\"")]
fn snapshot_exists(
    lifecycle_context: LifecycleContext,
    snapshot: String,
    size: u64,
    tenant: String,
) -> LifecycleContext {
    lifecycle_context.seed(|inventory| {
        inventory.with_snapshot(artifact_fixture(snapshot.trim(), tenant.trim(), size, false))
    })
}

#[given("the job backend rejects attach jobs")]
fn backend_rejects_attach(lifecycle_context: LifecycleContext) -> LifecycleContext {
    lifecycle_context.jobs.fail_attach();
    lifecycle_context
}

#[when("tenant \"{tenant}\" creates a {size:u64} GiB volume on \"{server}\" cloned from volume \"{source}\"")]
fn create_volume_clone(
    mut lifecycle_context: LifecycleContext,
    tenant: String,
    size: u64,
    server: String,
    source: String,
) -> LifecycleContext {
    let request = CreateVolumeRequest::builder(tenant)
        .size(size)
        .server_id(server)
        .source_volume(source)
        .build();
    lifecycle_context.outcome = Some(record(lifecycle_context.orchestrator().create(&request)));
    lifecycle_context
}

#[when("tenant \"{tenant}\" creates a {size:u64} GiB volume on \"{server}\" from snapshot \"{snapshot}\"")]
fn create_volume_from_snapshot(
    mut lifecycle_context: LifecycleContext,
    tenant: String,
    size: u64,
    server: String,
    snapshot: String,
) -> LifecycleContext {
    let request = CreateVolumeRequest::builder(tenant)
        .size(size)
        .server_id(server)
        .source_snapshot(snapshot)
        .build();
    lifecycle_context.outcome = Some(record(lifecycle_context.orchestrator().create(&request)));
    lifecycle_context
}

#[when("tenant \"{tenant}\" creates a volume on \"{server}\" from snapshot \"{snapshot}\" without a size")]
fn create_unsized_volume_from_snapshot(
    mut lifecycle_context: LifecycleContext,
    tenant: String,
    server: String,
    snapshot: String,
) -> LifecycleContext {
    let request = CreateVolumeRequest::builder(tenant)
        .server_id(server)
        .source_snapshot(snapshot)
        .build();
    lifecycle_context.outcome = Some(record(lifecycle_context.orchestrator().create(&request)));
    lifecycle_context
}

#[when("tenant \"{tenant}\" deletes volume \"{volume}\"")]
fn delete_volume(
    mut lifecycle_context: LifecycleContext,
    tenant: String,
    volume: String,
) -> LifecycleContext {
    let orchestrator = lifecycle_context.orchestrator();
    let result = orchestrator
        .find(tenant.trim(), volume.trim())
        .and_then(|found| orchestrator.delete(&found));
    lifecycle_context.outcome = Some(record(result));
    lifecycle_context
}

#[then("the volume is created with size {size:u64} and status \"{status}\"")]
fn volume_created(
    lifecycle_context: &LifecycleContext,
    size: u64,
    status: String,
) -> Result<(), StepError> {
    let volume = outcome_volume(lifecycle_context)?;
    if volume.size == size && volume.status.as_str() == status.trim() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected size {size} and status {status}, got {volume:?}"
        )))
    }
}

#[then("the volume source is \"{source}\"")]
fn volume_source(lifecycle_context: &LifecycleContext, source: String) -> Result<(), StepError> {
    let volume = outcome_volume(lifecycle_context)?;
    let rendered = volume.source.as_ref().map(ToString::to_string);
    if rendered.as_deref() == Some(source.trim()) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected source {source}, got {rendered:?}"
        )))
    }
}

#[then("the volume keeps its attachment to \"{server}\"")]
fn volume_still_attached(
    lifecycle_context: &LifecycleContext,
    server: String,
) -> Result<(), StepError> {
    let volume = outcome_volume(lifecycle_context)?;
    if volume.machine_id.as_deref() == Some(server.trim()) && volume.backend_job_id.is_some() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected attachment to {server} with a job id, got {volume:?}"
        )))
    }
}

fn job_submitted(
    lifecycle_context: &LifecycleContext,
    action: JobAction,
    server: &str,
) -> Result<(), StepError> {
    let jobs = lifecycle_context.jobs.submitted_for(action);
    if jobs.len() == 1 && jobs.iter().all(|job| job.server_id == server) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected one {action} job for {server}, got {jobs:?}"
        )))
    }
}

#[then("an attach job is submitted for server \"{server}\"")]
fn attach_job_submitted(
    lifecycle_context: &LifecycleContext,
    server: String,
) -> Result<(), StepError> {
    job_submitted(lifecycle_context, JobAction::Attach, server.trim())
}

#[then("a detach job is submitted for server \"{server}\"")]
fn detach_job_submitted(
    lifecycle_context: &LifecycleContext,
    server: String,
) -> Result<(), StepError> {
    job_submitted(lifecycle_context, JobAction::Detach, server.trim())
}

#[then("the request fails with \"{kind}\"")]
fn request_fails(lifecycle_context: &LifecycleContext, kind: String) -> Result<(), StepError> {
    match lifecycle_context.outcome.as_ref() {
        Some(Outcome::Failure {
            kind: actual,
            message,
        }) if actual == kind.trim() => {
            if message.is_empty() {
                Err(StepError::Assertion(String::from("missing error message")))
            } else {
                Ok(())
            }
        }
        other => Err(StepError::Assertion(format!(
            "expected {kind} failure, got: {other:?}"
        ))),
    }
}

#[then("no job is submitted")]
fn no_job_submitted(lifecycle_context: &LifecycleContext) -> Result<(), StepError> {
    let jobs = lifecycle_context.jobs.submitted();
    if jobs.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!("unexpected jobs: {jobs:?}")))
    }
}

#[then("the inventory holds {count:u32} volumes")]
fn inventory_volume_count(
    lifecycle_context: &LifecycleContext,
    count: u32,
) -> Result<(), StepError> {
    let inventory = lifecycle_context.inventory();
    let expected = usize::try_from(count)
        .map_err(|err| StepError::Assertion(format!("count out of range: {err}")))?;
    if inventory.volumes.len() == expected && inventory.volume_metadata.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {count} volumes and no metadata, got {inventory:?}"
        )))
    }
}

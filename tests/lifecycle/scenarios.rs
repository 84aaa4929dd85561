//! BDD scenarios for volume lifecycle orchestration.

use rstest_bdd_macros::scenario;

use super::test_helpers::{LifecycleContext, lifecycle_context};

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Clone a volume into a larger volume"
)]
fn scenario_clone_volume(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Reject a clone smaller than its source"
)]
fn scenario_reject_small_clone(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Require a size when restoring a snapshot"
)]
fn scenario_snapshot_size_required(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Reject clones on a plain disk template"
)]
fn scenario_plain_template(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Roll back when the attach job is rejected"
)]
fn scenario_attach_rollback(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Delete an attached volume"
)]
fn scenario_delete_attached(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Refuse to delete a detached volume"
)]
fn scenario_delete_detached(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

//! Command-line interface definitions for the `volwright` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser, Subcommand};

/// Top-level CLI for the `volwright` binary.
#[derive(Debug, Parser)]
#[command(
    name = "volwright",
    about = "Create, attach, rename, and delete block-storage volumes",
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// JSON inventory of servers, volumes, clone sources, and queued jobs.
    #[arg(
        long,
        global = true,
        env = "VOLWRIGHT_INVENTORY",
        value_name = "PATH",
        default_value = "volwright.json"
    )]
    pub(crate) inventory: String,
    /// Log at trace level unless `RUST_LOG` says otherwise.
    #[arg(long, global = true)]
    pub(crate) debug: bool,
    /// Operation to run.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Volume operations.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Create a volume and submit its attach job.
    #[command(name = "create")]
    Create(CreateCommand),
    /// Submit the detach job that deletes an attached volume.
    #[command(name = "delete")]
    Delete(VolumeTarget),
    /// Rename a volume.
    #[command(name = "rename")]
    Rename(RenameCommand),
    /// Replace a volume's description.
    #[command(name = "set-description")]
    SetDescription(DescribeCommand),
    /// Print a volume.
    #[command(name = "show")]
    Show(VolumeTarget),
}

/// Arguments for the `volwright create` subcommand.
#[derive(Debug, Args)]
pub(crate) struct CreateCommand {
    /// Tenant that will own the volume.
    #[arg(long, value_name = "TENANT")]
    pub(crate) tenant: String,
    /// Server to attach the volume to.
    #[arg(long, value_name = "SERVER")]
    pub(crate) server: Option<String>,
    /// Size in GiB. May be omitted when cloning a volume.
    #[arg(long, value_name = "GIB")]
    pub(crate) size: Option<u64>,
    /// Display name.
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Free-form description.
    #[arg(long)]
    pub(crate) description: Option<String>,
    /// Clone an existing volume.
    #[arg(long, value_name = "VOLUME")]
    pub(crate) source_volume: Option<String>,
    /// Restore a snapshot.
    #[arg(long, value_name = "SNAPSHOT")]
    pub(crate) source_snapshot: Option<String>,
    /// Fill the volume from an image.
    #[arg(long, value_name = "IMAGE")]
    pub(crate) source_image: Option<String>,
    /// Metadata pair in `KEY=VALUE` form; may be repeated.
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub(crate) metadata: Vec<String>,
    /// Keep the volume when its server is terminated.
    #[arg(long)]
    pub(crate) keep_on_termination: bool,
    /// Creation index on the server; 0 marks the root volume.
    #[arg(long, value_name = "INDEX")]
    pub(crate) index: Option<u32>,
}

/// Identifies a volume owned by a tenant.
#[derive(Debug, Args)]
pub(crate) struct VolumeTarget {
    /// Tenant that owns the volume.
    #[arg(long, value_name = "TENANT")]
    pub(crate) tenant: String,
    /// Volume identifier.
    #[arg(value_name = "VOLUME")]
    pub(crate) volume: String,
}

/// Arguments for the `volwright rename` subcommand.
#[derive(Debug, Args)]
pub(crate) struct RenameCommand {
    /// Volume to rename.
    #[command(flatten)]
    pub(crate) target: VolumeTarget,
    /// New display name.
    #[arg(value_name = "NAME")]
    pub(crate) name: String,
}

/// Arguments for the `volwright set-description` subcommand.
#[derive(Debug, Args)]
pub(crate) struct DescribeCommand {
    /// Volume to describe.
    #[command(flatten)]
    pub(crate) target: VolumeTarget,
    /// New description.
    #[arg(value_name = "DESCRIPTION")]
    pub(crate) description: String,
}

//! Binary entry point for the volwright CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt};

use volwright::{
    ConfigError, CreateVolumeRequest, InventoryError, InventoryFile, JobBackend, JobSpool,
    MemoryStore, OrchestratorConfig, Store, Volume, VolumeError, VolumeOrchestrator,
};

mod cli;

use cli::{Cli, Command, CreateCommand, VolumeTarget};

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Volume(#[from] VolumeError),
    #[error("invalid metadata pair '{0}': expected KEY=VALUE")]
    InvalidMetadata(String),
    #[error("failed to render volume: {0}")]
    Render(String),
}

impl CliError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Inventory(_) => "inventory",
            Self::Volume(err) => err.kind().as_str(),
            Self::InvalidMetadata(_) => "invalid_metadata",
            Self::Render(_) => "render",
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "trace" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .ok();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    let exit_code = match dispatch(cli) {
        Ok(rendered) => {
            writeln!(io::stdout(), "{rendered}").ok();
            0
        }
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn dispatch(cli: Cli) -> Result<String, CliError> {
    let config = OrchestratorConfig::load_without_cli_args()?;
    config.validate()?;

    let file = InventoryFile::new(cli.inventory);
    let _lock = file.lock()?;
    let spool = JobSpool::new();
    let orchestrator = VolumeOrchestrator::new(MemoryStore::new(file.load()?), spool.clone(), config);

    let mutates = !matches!(cli.command, Command::Show(_));
    let volume = execute(&orchestrator, cli.command)?;
    if mutates {
        let mut inventory = orchestrator.store().snapshot().map_err(VolumeError::from)?;
        inventory.jobs.extend(spool.drain());
        file.save(&inventory)?;
    }
    render(&volume)
}

fn execute<S, J>(orchestrator: &VolumeOrchestrator<S, J>, command: Command) -> Result<Volume, CliError>
where
    S: Store,
    J: JobBackend,
{
    let volume = match command {
        Command::Create(args) => orchestrator.create(&create_request(args)?)?,
        Command::Delete(target) => orchestrator.delete(&find(orchestrator, &target)?)?,
        Command::Rename(args) => orchestrator.rename(&find(orchestrator, &args.target)?, args.name)?,
        Command::SetDescription(args) => {
            orchestrator.update_description(&find(orchestrator, &args.target)?, args.description)?
        }
        Command::Show(target) => find(orchestrator, &target)?,
    };
    Ok(volume)
}

fn find<S, J>(orchestrator: &VolumeOrchestrator<S, J>, target: &VolumeTarget) -> Result<Volume, VolumeError>
where
    S: Store,
    J: JobBackend,
{
    orchestrator.find(&target.tenant, &target.volume)
}

fn create_request(args: CreateCommand) -> Result<CreateVolumeRequest, CliError> {
    let mut builder = CreateVolumeRequest::builder(args.tenant).maybe_size(args.size);
    if let Some(server) = args.server {
        builder = builder.server_id(server);
    }
    if let Some(name) = args.name {
        builder = builder.name(name);
    }
    if let Some(description) = args.description {
        builder = builder.description(description);
    }
    if let Some(volume) = args.source_volume {
        builder = builder.source_volume(volume);
    }
    if let Some(snapshot) = args.source_snapshot {
        builder = builder.source_snapshot(snapshot);
    }
    if let Some(image) = args.source_image {
        builder = builder.source_image(image);
    }
    if let Some(index) = args.index {
        builder = builder.index(index);
    }
    if args.keep_on_termination {
        builder = builder.delete_on_termination(false);
    }
    for pair in &args.metadata {
        let (key, value) = parse_metadata(pair)?;
        builder = builder.metadata(key, value);
    }
    Ok(builder.build())
}

fn parse_metadata(pair: &str) -> Result<(&str, &str), CliError> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(CliError::InvalidMetadata(pair.to_owned())),
    }
}

fn render(volume: &Volume) -> Result<String, CliError> {
    serde_json::to_string_pretty(volume).map_err(|err| CliError::Render(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "error[{}]: {err}", err.kind()).ok();
}

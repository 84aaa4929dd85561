//! Core library for the volwright volume orchestrator.
//!
//! The crate validates and sequences block-storage volume operations for a
//! multi-tenant control plane: creation from a volume, snapshot, image, or
//! blank storage, attachment through an external job engine, and
//! detach-driven deletion. Every operation runs inside one store transaction
//! so a failed request leaves no trace.

pub mod config;
pub mod error;
pub mod inventory;
pub mod jobs;
pub mod lifecycle;
pub mod lookup;
pub mod memory;
pub mod model;
pub mod repository;
#[cfg(test)]
pub mod test_helpers;
pub mod test_support;

pub use config::{ConfigError, OrchestratorConfig};
pub use error::{ErrorCategory, ErrorKind, VolumeError};
pub use inventory::{
    DEFAULT_INVENTORY_PATH, Inventory, InventoryError, InventoryFile, InventoryLock,
};
pub use jobs::{AttachmentCoordinator, JobAction, JobBackend, JobError, JobId, JobRecord, JobSpool};
pub use lifecycle::{
    CreateVolumeRequest, CreateVolumeRequestBuilder, CreationTarget, ResolvedSource,
    ValidatedSource, VolumeOrchestrator, check_source, resolve_source,
};
pub use lookup::{LockMode, LookupError, LookupGateway, ResourceKind};
pub use memory::{MemoryStore, MemoryTransaction};
pub use model::{
    BYTES_PER_GIB, Flavor, Server, SourceArtifact, SourceType, Volume, VolumeMetadata,
    VolumeSource, VolumeStatus, gib_to_bytes,
};
pub use repository::{Store, StoreError, Transaction, VolumeRepository};

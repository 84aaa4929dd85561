//! Persistence seams and the transaction boundary wrapped around every
//! lifecycle operation.

use thiserror::Error;

use crate::lookup::LookupGateway;
use crate::model::{Volume, VolumeMetadata};

/// Errors raised by a [`Store`] or one of its transactions.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum StoreError {
    /// Raised when inserting a volume whose identifier already exists.
    #[error("volume {volume_id} already exists")]
    DuplicateVolume {
        /// Conflicting identifier.
        volume_id: String,
    },
    /// Raised when saving a volume that was never inserted.
    #[error("volume {volume_id} does not exist")]
    MissingVolume {
        /// Identifier that could not be found.
        volume_id: String,
    },
    /// Raised when a metadata key is already present on the volume.
    #[error("metadata key '{key}' already set on volume {volume_id}")]
    DuplicateMetadataKey {
        /// Volume the key belongs to.
        volume_id: String,
        /// Conflicting key.
        key: String,
    },
    /// Raised when the store cannot open or finish a transaction.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Human-readable cause.
        message: String,
    },
}

/// Writes volume rows and their metadata children.
pub trait VolumeRepository {
    /// Inserts a new volume row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateVolume`] when the identifier is taken.
    fn insert_volume(&mut self, volume: Volume) -> Result<Volume, StoreError>;

    /// Overwrites an existing volume row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingVolume`] when no row has the identifier.
    fn save_volume(&mut self, volume: &Volume) -> Result<(), StoreError>;

    /// Inserts a metadata record for an existing volume.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingVolume`] for unknown volumes and
    /// [`StoreError::DuplicateMetadataKey`] when the key is already set.
    fn insert_metadata(
        &mut self,
        volume_id: &str,
        key: &str,
        value: &str,
    ) -> Result<VolumeMetadata, StoreError>;

    /// Returns the metadata records of a volume ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the records cannot be read.
    fn metadata(&mut self, volume_id: &str) -> Result<Vec<VolumeMetadata>, StoreError>;
}

/// A unit of work that either commits every change or none of them.
///
/// Dropping a transaction without committing discards its changes.
pub trait Transaction: LookupGateway + VolumeRepository {
    /// Makes every change visible to later transactions.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the changes cannot be persisted; nothing
    /// is applied in that case.
    fn commit(self) -> Result<(), StoreError>;

    /// Discards every change and releases held locks.
    fn rollback(self);
}

/// Source of transactions.
pub trait Store {
    /// Transaction type handed out by [`Store::begin`].
    type Tx<'a>: Transaction
    where
        Self: 'a;

    /// Opens a new transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot start one.
    fn begin(&self) -> Result<Self::Tx<'_>, StoreError>;
}

//! Inventory snapshot of every record the orchestrator reads or writes, and
//! its JSON file representation.

use std::fs::File;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::OpenOptions;
use cap_std::{ambient_authority, fs_utf8::Dir};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::jobs::JobRecord;
use crate::model::{Server, SourceArtifact, Volume, VolumeMetadata};

/// Default inventory file used by the command-line interface.
pub const DEFAULT_INVENTORY_PATH: &str = "volwright.json";

/// Servers, volumes, clone sources, and queued jobs.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Inventory {
    /// Compute instances.
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Block-storage volumes.
    #[serde(default)]
    pub volumes: Vec<Volume>,
    /// Metadata children of `volumes`.
    #[serde(default)]
    pub volume_metadata: Vec<VolumeMetadata>,
    /// Snapshots available as clone sources.
    #[serde(default)]
    pub snapshots: Vec<SourceArtifact>,
    /// Images available as clone sources.
    #[serde(default)]
    pub images: Vec<SourceArtifact>,
    /// Jobs submitted but not yet picked up by the execution engine.
    #[serde(default)]
    pub jobs: Vec<JobRecord>,
}

impl Inventory {
    /// Adds a server.
    #[must_use]
    pub fn with_server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    /// Adds a volume.
    #[must_use]
    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volumes.push(volume);
        self
    }

    /// Adds a snapshot.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: SourceArtifact) -> Self {
        self.snapshots.push(snapshot);
        self
    }

    /// Adds an image.
    #[must_use]
    pub fn with_image(mut self, image: SourceArtifact) -> Self {
        self.images.push(image);
        self
    }
}

/// Errors raised while reading or writing an inventory file.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Raised when file system operations fail.
    #[error("failed to access {path}: {message}")]
    Io {
        /// Path that could not be accessed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when the file does not contain a valid inventory.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path that could not be parsed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when the inventory cannot be serialised.
    #[error("failed to serialise inventory for {path}: {message}")]
    Serialise {
        /// Destination path.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when the path does not name a file.
    #[error("inventory path {path} is missing a filename")]
    MissingFileName {
        /// Offending path.
        path: Utf8PathBuf,
    },
}

/// Exclusive hold on an inventory file. Released when dropped.
///
/// The lock lives on a sibling `.<name>.lock` file so the inventory itself
/// can still be replaced by rename while the lock is held.
#[derive(Debug)]
pub struct InventoryLock {
    file: File,
    path: Utf8PathBuf,
}

impl InventoryLock {
    /// Returns the lock file path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl Drop for InventoryLock {
    fn drop(&mut self) {
        FileExt::unlock(&self.file).ok();
    }
}

/// JSON file holding an [`Inventory`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InventoryFile {
    path: Utf8PathBuf,
}

impl InventoryFile {
    /// Points at the inventory stored at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Blocks until this process holds the inventory exclusively.
    ///
    /// Hold the returned guard from [`Self::load`] through [`Self::save`] so
    /// concurrent writers cannot interleave their read-modify-write cycles.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Io`] when the lock file cannot be opened or
    /// locked.
    pub fn lock(&self) -> Result<InventoryLock, InventoryError> {
        let lock_name = format!(".{}.lock", self.file_name()?);
        let path = self.parent().join(&lock_name);
        let lock_error = |err: &io::Error| InventoryError::Io {
            path: path.clone(),
            message: err.to_string(),
        };

        let dir = Dir::open_ambient_dir(self.parent(), ambient_authority())
            .map_err(|err| lock_error(&err))?;
        let file = dir
            .open_with(&lock_name, OpenOptions::new().read(true).write(true).create(true))
            .map_err(|err| lock_error(&err))?
            .into_std();
        FileExt::lock_exclusive(&file).map_err(|err| lock_error(&err))?;
        tracing::debug!(path = %path, "locked inventory");
        Ok(InventoryLock { file, path })
    }

    /// Reads the inventory. A missing file yields an empty inventory.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError`] when the file cannot be read or parsed.
    pub fn load(&self) -> Result<Inventory, InventoryError> {
        let file_name = self.file_name()?;
        let dir = match Dir::open_ambient_dir(self.parent(), ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Inventory::default()),
            Err(err) => return Err(self.io_error(&err)),
        };

        let contents = match dir.read_to_string(file_name) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Inventory::default()),
            Err(err) => return Err(self.io_error(&err)),
        };

        if contents.trim().is_empty() {
            return Ok(Inventory::default());
        }

        serde_json::from_str(&contents).map_err(|err| InventoryError::Parse {
            path: self.path.clone(),
            message: err.to_string(),
        })
    }

    /// Writes the inventory, replacing the file in a single rename.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError`] when serialisation or any file operation
    /// fails.
    pub fn save(&self, inventory: &Inventory) -> Result<(), InventoryError> {
        let file_name = self.file_name()?;
        let mut contents =
            serde_json::to_string_pretty(inventory).map_err(|err| InventoryError::Serialise {
                path: self.path.clone(),
                message: err.to_string(),
            })?;
        contents.push('\n');

        let dir = Dir::open_ambient_dir(self.parent(), ambient_authority())
            .map_err(|err| self.io_error(&err))?;
        let staging = format!(".{file_name}.tmp");
        dir.write(&staging, contents.as_bytes())
            .map_err(|err| self.io_error(&err))?;
        dir.rename(&staging, &dir, file_name)
            .map_err(|err| self.io_error(&err))
    }

    fn parent(&self) -> &Utf8Path {
        match self.path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        }
    }

    fn file_name(&self) -> Result<&str, InventoryError> {
        self.path
            .file_name()
            .ok_or_else(|| InventoryError::MissingFileName {
                path: self.path.clone(),
            })
    }

    fn io_error(&self, err: &io::Error) -> InventoryError {
        InventoryError::Io {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

//! Error taxonomy for volume lifecycle operations.

use thiserror::Error;

use crate::jobs::JobError;
use crate::lookup::LookupError;
use crate::model::{SourceType, VolumeStatus};
use crate::repository::StoreError;

/// Errors returned by [`crate::VolumeOrchestrator`] operations.
///
/// Validation failures all belong to the invalid-request category; lookup,
/// job submission, and persistence failures are passed through from the
/// collaborators that raised them.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// Raised when a volume is requested without a server to attach to.
    #[error("volume must be attached to a server")]
    ServerRequired,
    /// Raised when more than one clone source is supplied.
    #[error("volume can not have more than one source")]
    MultipleSources,
    /// Raised when the source volume is not in a clonable status.
    #[error("cannot clone volume {volume_id} while it is in '{status}' status")]
    SourceNotClonable {
        /// Source volume identifier.
        volume_id: String,
        /// Status observed under lock.
        status: VolumeStatus,
    },
    /// Raised when the requested size cannot hold the source content.
    #[error(
        "volume size of {requested_bytes} bytes is smaller than {source_type} {source_id} size of {minimum_bytes} bytes"
    )]
    SizeTooSmall {
        /// Kind of the source being cloned.
        source_type: SourceType,
        /// Identifier of the source being cloned.
        source_id: String,
        /// Requested size converted to bytes.
        requested_bytes: u64,
        /// Size of the source in bytes.
        minimum_bytes: u64,
    },
    /// Raised when the source kind has no default size and none was given.
    #[error("volume size is required for {source_type} volumes")]
    SizeRequired {
        /// Kind of the requested source.
        source_type: SourceType,
    },
    /// Raised when the requested size cannot be represented in bytes.
    #[error("volume size of {size} GiB is too large to represent")]
    SizeOverflow {
        /// Requested size in GiB.
        size: u64,
    },
    /// Raised when the server's disk template does not allow clone sources.
    #[error("volumes of '{disk_template}' disk template cannot have a source")]
    UnsupportedSource {
        /// Disk template of the target server.
        disk_template: String,
    },
    /// Raised when a source type label is not recognised.
    #[error("unknown source type '{value}'")]
    UnknownSourceType {
        /// Label that failed to parse.
        value: String,
    },
    /// Raised when deleting a volume that is not attached to any server.
    #[error("cannot delete detached volume {volume_id}")]
    DetachedDelete {
        /// Volume identifier.
        volume_id: String,
    },
    /// Lookup failures raised by the gateway.
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// Failures submitting an attach or detach job.
    #[error(transparent)]
    JobSubmission(#[from] JobError),
    /// Persistence failures.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Distinguishes the variants of [`VolumeError`] without their payloads.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// See [`VolumeError::ServerRequired`].
    ServerRequired,
    /// See [`VolumeError::MultipleSources`].
    MultipleSources,
    /// See [`VolumeError::SourceNotClonable`].
    SourceNotClonable,
    /// See [`VolumeError::SizeTooSmall`].
    SizeTooSmall,
    /// See [`VolumeError::SizeRequired`].
    SizeRequired,
    /// See [`VolumeError::SizeOverflow`].
    SizeOverflow,
    /// See [`VolumeError::UnsupportedSource`].
    UnsupportedSource,
    /// See [`VolumeError::UnknownSourceType`].
    UnknownSourceType,
    /// See [`VolumeError::DetachedDelete`].
    DetachedDelete,
    /// See [`VolumeError::Lookup`].
    Lookup,
    /// See [`VolumeError::JobSubmission`].
    JobSubmission,
    /// See [`VolumeError::Store`].
    Store,
}

impl ErrorKind {
    /// Returns a stable snake-case label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServerRequired => "server_required",
            Self::MultipleSources => "multiple_sources",
            Self::SourceNotClonable => "source_not_clonable",
            Self::SizeTooSmall => "size_too_small",
            Self::SizeRequired => "size_required",
            Self::SizeOverflow => "size_overflow",
            Self::UnsupportedSource => "unsupported_source",
            Self::UnknownSourceType => "unknown_source_type",
            Self::DetachedDelete => "detached_delete",
            Self::Lookup => "lookup",
            Self::JobSubmission => "job_submission",
            Self::Store => "store",
        }
    }

    /// Returns the category the kind is reported under.
    #[must_use]
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::Lookup => ErrorCategory::Lookup,
            Self::JobSubmission => ErrorCategory::JobSubmission,
            Self::Store => ErrorCategory::Persistence,
            Self::ServerRequired
            | Self::MultipleSources
            | Self::SourceNotClonable
            | Self::SizeTooSmall
            | Self::SizeRequired
            | Self::SizeOverflow
            | Self::UnsupportedSource
            | Self::UnknownSourceType
            | Self::DetachedDelete => ErrorCategory::InvalidRequest,
        }
    }
}

/// Coarse grouping of error kinds as presented to callers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorCategory {
    /// The request violates a business rule.
    InvalidRequest,
    /// An identifier could not be resolved.
    Lookup,
    /// The job backend rejected a submission.
    JobSubmission,
    /// The store failed to read or persist state.
    Persistence,
}

impl VolumeError {
    /// Returns the payload-free kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ServerRequired => ErrorKind::ServerRequired,
            Self::MultipleSources => ErrorKind::MultipleSources,
            Self::SourceNotClonable { .. } => ErrorKind::SourceNotClonable,
            Self::SizeTooSmall { .. } => ErrorKind::SizeTooSmall,
            Self::SizeRequired { .. } => ErrorKind::SizeRequired,
            Self::SizeOverflow { .. } => ErrorKind::SizeOverflow,
            Self::UnsupportedSource { .. } => ErrorKind::UnsupportedSource,
            Self::UnknownSourceType { .. } => ErrorKind::UnknownSourceType,
            Self::DetachedDelete { .. } => ErrorKind::DetachedDelete,
            Self::Lookup(_) => ErrorKind::Lookup,
            Self::JobSubmission(_) => ErrorKind::JobSubmission,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// Returns the category this error is reported under.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind().category()
    }

    /// Returns `true` for business-rule violations.
    #[must_use]
    pub fn is_invalid_request(&self) -> bool {
        self.category() == ErrorCategory::InvalidRequest
    }
}

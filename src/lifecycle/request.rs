//! Input of [`super::VolumeOrchestrator::create`].

use std::collections::BTreeMap;

/// Parameters of a volume creation.
///
/// At most one of the `source_*` identifiers may be set; leaving all of them
/// empty creates a blank volume.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CreateVolumeRequest {
    /// Tenant that will own the volume.
    pub tenant_id: String,
    /// Requested size in GiB. Optional only when cloning a volume.
    pub size: Option<u64>,
    /// Server to attach the volume to. Required.
    pub server_id: Option<String>,
    /// Optional display name.
    pub name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Volume to clone.
    pub source_volume_id: Option<String>,
    /// Snapshot to restore.
    pub source_snapshot_id: Option<String>,
    /// Image to fill the volume from.
    pub source_image_id: Option<String>,
    /// Metadata attached after the volume row is created.
    pub metadata: BTreeMap<String, String>,
    /// Overrides the configured `delete_on_termination` default.
    pub delete_on_termination: Option<bool>,
    /// Creation index on the server; `Some(0)` is the root volume.
    pub index: Option<u32>,
}

impl CreateVolumeRequest {
    /// Starts a builder for a request owned by `tenant_id`.
    #[must_use]
    pub fn builder(tenant_id: impl Into<String>) -> CreateVolumeRequestBuilder {
        CreateVolumeRequestBuilder::new(tenant_id)
    }
}

/// Builder for [`CreateVolumeRequest`] that trims identifiers.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CreateVolumeRequestBuilder {
    request: CreateVolumeRequest,
}

fn trimmed(value: impl Into<String>) -> String {
    value.into().trim().to_owned()
}

impl CreateVolumeRequestBuilder {
    /// Creates a builder for a request owned by `tenant_id`.
    #[must_use]
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            request: CreateVolumeRequest {
                tenant_id: trimmed(tenant_id),
                ..CreateVolumeRequest::default()
            },
        }
    }

    /// Sets the size in GiB.
    #[must_use]
    pub fn size(mut self, size: u64) -> Self {
        self.request.size = Some(size);
        self
    }

    /// Sets the optional size in GiB.
    #[must_use]
    pub fn maybe_size(mut self, size: Option<u64>) -> Self {
        self.request.size = size;
        self
    }

    /// Sets the server to attach to.
    #[must_use]
    pub fn server_id(mut self, value: impl Into<String>) -> Self {
        self.request.server_id = Some(trimmed(value));
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.request.name = Some(value.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.request.description = Some(value.into());
        self
    }

    /// Clones the given volume.
    #[must_use]
    pub fn source_volume(mut self, value: impl Into<String>) -> Self {
        self.request.source_volume_id = Some(trimmed(value));
        self
    }

    /// Restores the given snapshot.
    #[must_use]
    pub fn source_snapshot(mut self, value: impl Into<String>) -> Self {
        self.request.source_snapshot_id = Some(trimmed(value));
        self
    }

    /// Fills the volume from the given image.
    #[must_use]
    pub fn source_image(mut self, value: impl Into<String>) -> Self {
        self.request.source_image_id = Some(trimmed(value));
        self
    }

    /// Adds a metadata pair; a repeated key keeps the last value.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.metadata.insert(key.into(), value.into());
        self
    }

    /// Overrides `delete_on_termination`.
    #[must_use]
    pub fn delete_on_termination(mut self, value: bool) -> Self {
        self.request.delete_on_termination = Some(value);
        self
    }

    /// Sets the creation index.
    #[must_use]
    pub fn index(mut self, value: u32) -> Self {
        self.request.index = Some(value);
        self
    }

    /// Returns the assembled request.
    #[must_use]
    pub fn build(self) -> CreateVolumeRequest {
        self.request
    }
}

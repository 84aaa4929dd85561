//! In-memory [`Store`] backed by an [`Inventory`].
//!
//! A transaction holds the store mutex from `begin` until it commits or is
//! dropped, so transactions are fully serialised. That subsumes the row locks
//! requested through [`LockMode::ForUpdate`]: a second transaction touching the
//! same server or source volume waits until the first one finishes. Changes
//! are staged on a private copy and swapped in on commit.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::inventory::Inventory;
use crate::lookup::{LockMode, LookupError, LookupGateway, ResourceKind};
use crate::model::{Server, SourceArtifact, Volume, VolumeMetadata};
use crate::repository::{Store, StoreError, Transaction, VolumeRepository};

/// Shared in-memory store. Clones refer to the same inventory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inventory: Arc<Mutex<Inventory>>,
}

impl MemoryStore {
    /// Wraps an inventory.
    #[must_use]
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory: Arc::new(Mutex::new(inventory)),
        }
    }

    /// Returns a copy of the committed inventory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store mutex is poisoned.
    pub fn snapshot(&self) -> Result<Inventory, StoreError> {
        self.inventory
            .lock()
            .map(|inventory| inventory.clone())
            .map_err(|err| StoreError::Unavailable {
                message: err.to_string(),
            })
    }
}

impl Store for MemoryStore {
    type Tx<'a>
        = MemoryTransaction<'a>
    where
        Self: 'a;

    fn begin(&self) -> Result<MemoryTransaction<'_>, StoreError> {
        let committed = self
            .inventory
            .lock()
            .map_err(|err| StoreError::Unavailable {
                message: err.to_string(),
            })?;
        let working = committed.clone();
        Ok(MemoryTransaction { committed, working })
    }
}

/// Transaction over a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryTransaction<'a> {
    committed: MutexGuard<'a, Inventory>,
    working: Inventory,
}

impl MemoryTransaction<'_> {
    fn note_lock(resource: ResourceKind, id: &str, lock: LockMode) {
        if lock == LockMode::ForUpdate {
            tracing::debug!(%resource, id, "row locked for update");
        }
    }
}

fn readable(artifact: &SourceArtifact, tenant_id: &str) -> bool {
    artifact.public || artifact.owner == tenant_id
}

fn find_artifact(
    artifacts: &[SourceArtifact],
    resource: ResourceKind,
    tenant_id: &str,
    id: &str,
) -> Result<SourceArtifact, LookupError> {
    let artifact = artifacts
        .iter()
        .find(|artifact| artifact.id == id)
        .ok_or_else(|| LookupError::NotFound {
            resource,
            id: id.to_owned(),
        })?;
    if !readable(artifact, tenant_id) {
        return Err(LookupError::Forbidden {
            resource,
            id: id.to_owned(),
        });
    }
    Ok(artifact.clone())
}

impl LookupGateway for MemoryTransaction<'_> {
    fn get_server(
        &mut self,
        tenant_id: &str,
        server_id: &str,
        lock: LockMode,
    ) -> Result<Server, LookupError> {
        let server = self
            .working
            .servers
            .iter()
            .find(|server| server.id == server_id && server.tenant_id == tenant_id && !server.deleted)
            .cloned()
            .ok_or_else(|| LookupError::NotFound {
                resource: ResourceKind::Server,
                id: server_id.to_owned(),
            })?;
        Self::note_lock(ResourceKind::Server, server_id, lock);
        Ok(server)
    }

    fn get_volume(
        &mut self,
        tenant_id: &str,
        volume_id: &str,
        lock: LockMode,
    ) -> Result<Volume, LookupError> {
        let volume = self
            .working
            .volumes
            .iter()
            .find(|volume| volume.id == volume_id && volume.tenant_id == tenant_id && !volume.deleted)
            .cloned()
            .ok_or_else(|| LookupError::NotFound {
                resource: ResourceKind::Volume,
                id: volume_id.to_owned(),
            })?;
        Self::note_lock(ResourceKind::Volume, volume_id, lock);
        Ok(volume)
    }

    fn get_snapshot(
        &mut self,
        tenant_id: &str,
        snapshot_id: &str,
    ) -> Result<SourceArtifact, LookupError> {
        find_artifact(
            &self.working.snapshots,
            ResourceKind::Snapshot,
            tenant_id,
            snapshot_id,
        )
    }

    fn get_image(
        &mut self,
        tenant_id: &str,
        image_id: &str,
    ) -> Result<SourceArtifact, LookupError> {
        find_artifact(&self.working.images, ResourceKind::Image, tenant_id, image_id)
    }
}

impl VolumeRepository for MemoryTransaction<'_> {
    fn insert_volume(&mut self, volume: Volume) -> Result<Volume, StoreError> {
        if self.working.volumes.iter().any(|row| row.id == volume.id) {
            return Err(StoreError::DuplicateVolume {
                volume_id: volume.id,
            });
        }
        self.working.volumes.push(volume.clone());
        Ok(volume)
    }

    fn save_volume(&mut self, volume: &Volume) -> Result<(), StoreError> {
        let row = self
            .working
            .volumes
            .iter_mut()
            .find(|row| row.id == volume.id)
            .ok_or_else(|| StoreError::MissingVolume {
                volume_id: volume.id.clone(),
            })?;
        row.clone_from(volume);
        Ok(())
    }

    fn insert_metadata(
        &mut self,
        volume_id: &str,
        key: &str,
        value: &str,
    ) -> Result<VolumeMetadata, StoreError> {
        if !self.working.volumes.iter().any(|row| row.id == volume_id) {
            return Err(StoreError::MissingVolume {
                volume_id: volume_id.to_owned(),
            });
        }
        if self
            .working
            .volume_metadata
            .iter()
            .any(|meta| meta.volume_id == volume_id && meta.key == key)
        {
            return Err(StoreError::DuplicateMetadataKey {
                volume_id: volume_id.to_owned(),
                key: key.to_owned(),
            });
        }
        let record = VolumeMetadata {
            volume_id: volume_id.to_owned(),
            key: key.to_owned(),
            value: value.to_owned(),
        };
        self.working.volume_metadata.push(record.clone());
        Ok(record)
    }

    fn metadata(&mut self, volume_id: &str) -> Result<Vec<VolumeMetadata>, StoreError> {
        let mut records = self
            .working
            .volume_metadata
            .iter()
            .filter(|meta| meta.volume_id == volume_id)
            .cloned()
            .collect::<Vec<_>>();
        records.sort_by(|left, right| left.key.cmp(&right.key));
        Ok(records)
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn commit(self) -> Result<(), StoreError> {
        let Self {
            mut committed,
            working,
        } = self;
        *committed = working;
        Ok(())
    }

    fn rollback(self) {
        tracing::debug!("transaction rolled back");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{artifact_fixture, server_fixture, volume_fixture};
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> MemoryStore {
        MemoryStore::new(
            Inventory::default()
                .with_server(server_fixture("s1", "t1", "ext_rbd"))
                .with_volume(volume_fixture("v1", "t1", Some("s1")))
                .with_snapshot(artifact_fixture("sn1", "t2", 1024, false))
                .with_image(artifact_fixture("img1", "t2", 1024, true)),
        )
    }

    #[rstest]
    fn committed_changes_are_visible(store: MemoryStore) {
        let mut tx = store.begin().expect("begin");
        tx.insert_volume(volume_fixture("v2", "t1", Some("s1")))
            .expect("insert");
        tx.insert_metadata("v2", "purpose", "scratch")
            .expect("metadata");
        tx.commit().expect("commit");

        let inventory = store.snapshot().expect("snapshot");
        assert!(inventory.volumes.iter().any(|volume| volume.id == "v2"));
        assert_eq!(inventory.volume_metadata.len(), 1);
    }

    #[rstest]
    fn rolled_back_changes_are_discarded(store: MemoryStore) {
        let mut tx = store.begin().expect("begin");
        tx.insert_volume(volume_fixture("v2", "t1", Some("s1")))
            .expect("insert");
        tx.rollback();

        let inventory = store.snapshot().expect("snapshot");
        assert!(!inventory.volumes.iter().any(|volume| volume.id == "v2"));
    }

    #[rstest]
    fn dropped_transactions_are_discarded(store: MemoryStore) {
        {
            let mut tx = store.begin().expect("begin");
            tx.insert_volume(volume_fixture("v2", "t1", Some("s1")))
                .expect("insert");
        }

        let inventory = store.snapshot().expect("snapshot");
        assert_eq!(inventory.volumes.len(), 1);
    }

    #[rstest]
    fn servers_of_other_tenants_are_not_found(store: MemoryStore) {
        let mut tx = store.begin().expect("begin");
        let err = tx
            .get_server("t2", "s1", LockMode::ForUpdate)
            .expect_err("foreign server");
        assert_eq!(
            err,
            LookupError::NotFound {
                resource: ResourceKind::Server,
                id: String::from("s1"),
            }
        );
    }

    #[rstest]
    fn private_snapshots_of_other_tenants_are_forbidden(store: MemoryStore) {
        let mut tx = store.begin().expect("begin");
        let err = tx.get_snapshot("t1", "sn1").expect_err("private snapshot");
        assert!(matches!(err, LookupError::Forbidden { .. }), "got {err:?}");
    }

    #[rstest]
    fn public_images_are_readable_by_everyone(store: MemoryStore) {
        let mut tx = store.begin().expect("begin");
        let image = tx.get_image("t1", "img1").expect("public image");
        assert_eq!(image.size_bytes, 1024);
    }

    #[rstest]
    fn duplicate_metadata_keys_are_rejected(store: MemoryStore) {
        let mut tx = store.begin().expect("begin");
        tx.insert_metadata("v1", "k", "a").expect("first insert");
        let err = tx
            .insert_metadata("v1", "k", "b")
            .expect_err("duplicate key");
        assert!(matches!(err, StoreError::DuplicateMetadataKey { .. }));
    }

    #[rstest]
    fn saving_unknown_volumes_fails(store: MemoryStore) {
        let mut tx = store.begin().expect("begin");
        let err = tx
            .save_volume(&volume_fixture("ghost", "t1", None))
            .expect_err("unknown volume");
        assert!(matches!(err, StoreError::MissingVolume { .. }));
    }
}

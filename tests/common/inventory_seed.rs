//! Seeded inventory files for CLI integration tests.

use camino::Utf8PathBuf;
use tempfile::TempDir;
use volwright::test_support::{artifact_fixture, server_fixture, volume_fixture};
use volwright::{BYTES_PER_GIB, Inventory, InventoryFile};

/// Temporary directory holding a seeded `volwright.json`.
pub struct SeededInventory {
    pub dir: TempDir,
    pub file: InventoryFile,
}

impl SeededInventory {
    pub fn path(&self) -> &str {
        self.file.path().as_str()
    }

    pub fn load(&self) -> Inventory {
        self.file
            .load()
            .unwrap_or_else(|err| panic!("inventory should load: {err}"))
    }
}

/// Writes an inventory with servers `s1` (`ext_rbd`) and `s2` (`drbd`), the
/// attached volume `v1`, the detached volume `v-loose`, and snapshot `sn1`.
pub fn seeded_inventory() -> SeededInventory {
    let dir = TempDir::new().unwrap_or_else(|err| panic!("temp dir: {err}"));
    let path = Utf8PathBuf::from_path_buf(dir.path().join("volwright.json"))
        .unwrap_or_else(|path| panic!("non UTF-8 temp path: {}", path.display()));
    let file = InventoryFile::new(path);
    let inventory = Inventory::default()
        .with_server(server_fixture("s1", "t1", "ext_rbd"))
        .with_server(server_fixture("s2", "t1", "drbd"))
        .with_volume(volume_fixture("v1", "t1", Some("s1")))
        .with_volume(volume_fixture("v-loose", "t1", None))
        .with_snapshot(artifact_fixture("sn1", "t1", 2 * BYTES_PER_GIB, false));
    file.save(&inventory)
        .unwrap_or_else(|err| panic!("inventory should save: {err}"));
    SeededInventory { dir, file }
}

//! Shared fixtures and helpers for lifecycle BDD scenarios.

use rstest::fixture;
use volwright::test_support::ScriptedJobBackend;
use volwright::{Inventory, MemoryStore, OrchestratorConfig, Volume, VolumeOrchestrator};

#[derive(Clone, Debug)]
pub enum Outcome {
    Success(Volume),
    Failure { kind: String, message: String },
}

#[derive(Clone, Debug)]
pub struct LifecycleContext {
    pub store: MemoryStore,
    pub jobs: ScriptedJobBackend,
    pub outcome: Option<Outcome>,
}

#[fixture]
pub fn lifecycle_context() -> LifecycleContext {
    LifecycleContext {
        store: MemoryStore::new(Inventory::default()),
        jobs: ScriptedJobBackend::new(),
        outcome: None,
    }
}

impl LifecycleContext {
    /// Applies `seed` to the committed inventory.
    pub fn seed(&self, seed: impl FnOnce(Inventory) -> Inventory) -> Self {
        let inventory = self.inventory();
        Self {
            store: MemoryStore::new(seed(inventory)),
            ..self.clone()
        }
    }

    pub fn inventory(&self) -> Inventory {
        self.store
            .snapshot()
            .unwrap_or_else(|err| panic!("store should be readable: {err}"))
    }

    pub fn orchestrator(&self) -> VolumeOrchestrator<MemoryStore, ScriptedJobBackend> {
        VolumeOrchestrator::new(
            self.store.clone(),
            self.jobs.clone(),
            OrchestratorConfig::default(),
        )
    }
}

//! In-memory workflow state store
//!
//! Holds every workflow's authoritative state. Mutations go through
//! [`WorkflowStore::update`], which applies a domain operation to a copy and
//! commits it only on success, so a rejected transition never leaves a
//! half-applied state behind. Status changes are broadcast on a per-workflow
//! watch channel.

use review_domain::{DomainError, WorkflowId, WorkflowState, WorkflowStatus};
use std::collections::HashMap;
use tokio::sync::{RwLock, watch};

struct Entry {
    state: WorkflowState,
    status_tx: watch::Sender<WorkflowStatus>,
}

#[derive(Default)]
pub struct WorkflowStore {
    entries: RwLock<HashMap<WorkflowId, Entry>>,
}

impl WorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new workflow. An existing entry with the same id is replaced.
    pub async fn insert(&self, state: WorkflowState) {
        let (status_tx, _) = watch::channel(state.status());
        let id = state.workflow_id().clone();
        self.entries
            .write()
            .await
            .insert(id, Entry { state, status_tx });
    }

    pub async fn get(&self, id: &WorkflowId) -> Option<WorkflowState> {
        self.entries.read().await.get(id).map(|e| e.state.clone())
    }

    /// Snapshot of all workflows
    pub async fn list(&self) -> Vec<WorkflowState> {
        let mut states: Vec<_> = self
            .entries
            .read()
            .await
            .values()
            .map(|e| e.state.clone())
            .collect();
        states.sort_by_key(|s| s.created_at());
        states
    }

    /// Apply `op` atomically. Returns `None` for an unknown workflow,
    /// otherwise the committed state or the domain error that rejected `op`.
    pub async fn update<F>(
        &self,
        id: &WorkflowId,
        op: F,
    ) -> Option<Result<WorkflowState, DomainError>>
    where
        F: FnOnce(&mut WorkflowState) -> Result<(), DomainError>,
    {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(id)?;

        let mut next = entry.state.clone();
        if let Err(e) = op(&mut next) {
            return Some(Err(e));
        }
        let status = next.status();
        entry.state = next;
        entry.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
        Some(Ok(entry.state.clone()))
    }

    pub async fn subscribe(&self, id: &WorkflowId) -> Option<watch::Receiver<WorkflowStatus>> {
        self.entries
            .read()
            .await
            .get(id)
            .map(|e| e.status_tx.subscribe())
    }

    /// Wait until the workflow reaches approved, rejected or expired
    pub async fn wait_for_terminal(&self, id: &WorkflowId) -> Option<WorkflowState> {
        let mut rx = self.subscribe(id).await?;
        rx.wait_for(|status| status.is_terminal()).await.ok()?;
        self.get(id).await
    }
}

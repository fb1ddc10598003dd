//! Multi-select state and bulk archive/delete.

use crate::liveness::LivenessHandle;
use crate::provider::{ConfirmPrompt, ConversationProvider, DestructivePrompt, PromptChoice};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Which bulk operation ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Archive,
    Delete,
}

/// What happened during a bulk run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    pub action: BulkAction,
    /// Number of per-item calls made.
    pub attempted: usize,
    /// Items whose call failed, with the error text.
    pub failed: Vec<(Uuid, String)>,
    /// False when the owner was torn down before the follow-up could run; the
    /// selection was then left as it was.
    pub applied: bool,
}

impl BulkOutcome {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed.len()
    }
}

/// Selection mode flag plus the selected ids, in the order they were picked.
///
/// Idle is `selection_mode == false` with an empty set. The set never goes
/// empty while selecting: removing the last id drops back to Idle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    selection_mode: bool,
    selected: Vec<Uuid>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection_mode(&self) -> bool {
        self.selection_mode
    }

    pub fn selected(&self) -> &[Uuid] {
        &self.selected
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Enter selection mode seeded with `id` (long-press).
    pub fn start(&mut self, id: Uuid) {
        self.selection_mode = true;
        self.selected.clear();
        self.selected.push(id);
        debug!(target: "chatlens::selection", "Selection started with {}", id);
    }

    /// Add or remove `id`. Removing the last id exits selection mode.
    pub fn toggle(&mut self, id: Uuid) {
        if !self.selection_mode {
            self.start(id);
            return;
        }

        if let Some(pos) = self.selected.iter().position(|s| *s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id);
        }

        if self.selected.is_empty() {
            self.selection_mode = false;
            debug!(target: "chatlens::selection", "Selection emptied, leaving selection mode");
        }
    }

    /// Add every id not already selected. No effect outside selection mode.
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        if !self.selection_mode {
            return;
        }
        for id in ids {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
    }

    /// Drop ids that no longer exist in the current data.
    pub fn retain(&mut self, mut keep: impl FnMut(Uuid) -> bool) {
        self.selected.retain(|id| keep(*id));
        if self.selected.is_empty() {
            self.selection_mode = false;
        }
    }

    pub fn cancel(&mut self) {
        self.selection_mode = false;
        self.selected.clear();
    }

    /// Archive every selected conversation, one call at a time.
    ///
    /// Failures are logged and recorded but do not stop the loop. Afterwards
    /// the selection is cleared unless `liveness` was torn down meanwhile.
    pub async fn archive_selected<P>(&mut self, provider: &P, liveness: &LivenessHandle) -> Option<BulkOutcome>
    where
        P: ConversationProvider + ?Sized,
    {
        if self.selected.is_empty() {
            return None;
        }
        Some(self.run_bulk(BulkAction::Archive, provider, liveness).await)
    }

    /// Delete every selected conversation after the user confirms.
    ///
    /// Returns `None` without touching anything when nothing is selected or the
    /// prompt is cancelled.
    pub async fn delete_selected<P, C>(
        &mut self,
        provider: &P,
        prompt: &C,
        liveness: &LivenessHandle,
    ) -> Option<BulkOutcome>
    where
        P: ConversationProvider + ?Sized,
        C: ConfirmPrompt + ?Sized,
    {
        if self.selected.is_empty() {
            return None;
        }

        let choice = prompt
            .ask(DestructivePrompt::delete_conversations(self.selected.len()))
            .await;
        if choice == PromptChoice::Cancel {
            debug!(target: "chatlens::selection", "Bulk delete cancelled");
            return None;
        }

        Some(self.run_bulk(BulkAction::Delete, provider, liveness).await)
    }

    async fn run_bulk<P>(&mut self, action: BulkAction, provider: &P, liveness: &LivenessHandle) -> BulkOutcome
    where
        P: ConversationProvider + ?Sized,
    {
        let ids = self.selected.clone();
        let mut failed = Vec::new();

        for id in &ids {
            let result = match action {
                BulkAction::Archive => provider.archive_conversation(*id).await,
                BulkAction::Delete => provider.delete_conversation(*id).await,
            };
            if let Err(e) = result {
                warn!(target: "chatlens::selection", "{:?} failed for {}: {}", action, id, e);
                failed.push((*id, e.to_string()));
            }
        }

        let applied = liveness.is_active();
        if applied {
            self.cancel();
        } else {
            debug!(target: "chatlens::selection", "Owner torn down during {:?}; leaving selection as is", action);
        }

        info!(
            target: "chatlens::selection",
            "{:?} finished: {} attempted, {} failed",
            action,
            ids.len(),
            failed.len()
        );

        BulkOutcome {
            action,
            attempted: ids.len(),
            failed,
            applied,
        }
    }
}

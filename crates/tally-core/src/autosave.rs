//! Debounced persistence of an [`InvoiceDraft`].
//!
//! [`AutoSave::spawn`] starts a background task that watches the draft.
//! Every change that alters the fingerprint (re)starts a quiet window; when
//! the window closes without further changes the draft is created or updated
//! through a [`DraftStore`]. Each attempt is reported as a [`SaveOutcome`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::draft::{DraftAction, InvoiceDraft};
use crate::error::Result;

/// A boxed future returned by [`DraftStore`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Quiet period after the last edit before a save is attempted.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Where drafts are persisted.
pub trait DraftStore: Send + Sync + 'static {
    /// Persists a new draft and returns its id.
    fn create<'a>(&'a self, draft: &'a InvoiceDraft) -> BoxFuture<'a, Result<i64>>;

    /// Overwrites a previously created draft.
    fn update<'a>(&'a self, id: i64, draft: &'a InvoiceDraft) -> BoxFuture<'a, Result<()>>;
}

/// Why a save attempt did not reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No client selected yet.
    NotReady,
    /// The invoice is paid.
    Locked,
    /// Nothing changed since the last save.
    Unchanged,
}

/// Result of one save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created { id: i64, fingerprint: String },
    Updated { id: i64, fingerprint: String },
    Skipped { reason: SkipReason },
    Failed { message: String },
}

/// Handle to a running auto-save task.
///
/// Dropping the handle lets the task save any pending edits once and exit;
/// [`AutoSave::shutdown`] does the same and waits for it.
pub struct AutoSave {
    draft: Arc<watch::Sender<InvoiceDraft>>,
    flush: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl AutoSave {
    /// Starts watching `initial`, saving `delay` after the last edit.
    pub fn spawn<S: DraftStore>(
        store: Arc<S>,
        initial: InvoiceDraft,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SaveOutcome>) {
        let saved_id = initial.id;
        let (draft, edits) = watch::channel(initial);
        let draft = Arc::new(draft);
        let (flush, flushes) = mpsc::unbounded_channel();
        let (outcomes, outcome_rx) = mpsc::unbounded_channel();

        let worker = Worker {
            store,
            draft: Arc::clone(&draft),
            outcomes,
            saved_id,
        };
        let task = tokio::spawn(worker.run(edits, flushes, delay));

        (Self { draft, flush, task }, outcome_rx)
    }

    /// Applies an edit to the watched draft.
    pub fn dispatch(&self, action: DraftAction) {
        self.draft.send_modify(|draft| {
            let next = draft.clone().reduce(action);
            *draft = next;
        });
    }

    /// Replaces the watched draft.
    pub fn replace(&self, draft: InvoiceDraft) {
        self.draft.send_replace(draft);
    }

    /// Returns a snapshot of the current draft.
    pub fn draft(&self) -> InvoiceDraft {
        self.draft.borrow().clone()
    }

    /// Saves immediately instead of waiting for the quiet window.
    pub fn flush(&self) {
        // The task only stops after the handle is gone.
        let _ = self.flush.send(());
    }

    /// Saves pending edits and stops the task.
    pub async fn shutdown(self) {
        let Self { flush, task, .. } = self;
        drop(flush);
        if let Err(e) = task.await {
            warn!("auto-save task ended abnormally: {}", e);
        }
    }
}

struct Worker<S> {
    store: Arc<S>,
    draft: Arc<watch::Sender<InvoiceDraft>>,
    outcomes: mpsc::UnboundedSender<SaveOutcome>,
    saved_id: Option<i64>,
}

impl<S: DraftStore> Worker<S> {
    async fn run(
        mut self,
        mut edits: watch::Receiver<InvoiceDraft>,
        mut flushes: mpsc::UnboundedReceiver<()>,
        delay: Duration,
    ) {
        // Deadline and fingerprint of the open quiet window.
        let mut window: Option<(Instant, String)> = None;

        loop {
            let deadline = window.as_ref().map_or_else(Instant::now, |(at, _)| *at);
            tokio::select! {
                changed = edits.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let fingerprint = edits.borrow_and_update().fingerprint();
                    let same_window = matches!(&window, Some((_, start)) if *start == fingerprint);
                    if !same_window {
                        window = Some((Instant::now() + delay, fingerprint));
                    }
                }
                () = sleep_until(deadline), if window.is_some() => {
                    let Some((_, start)) = window.take() else { continue };
                    let current = self.draft.borrow().fingerprint();
                    if current == start {
                        self.save().await;
                    } else {
                        debug!("draft changed at the end of the window, waiting again");
                        window = Some((Instant::now() + delay, current));
                    }
                }
                command = flushes.recv() => {
                    window = None;
                    self.save().await;
                    if command.is_none() {
                        break;
                    }
                }
            }
        }
        debug!("auto-save stopped");
    }

    async fn save(&mut self) {
        let draft = self.draft.borrow().clone();
        let outcome = if draft.is_locked() {
            SaveOutcome::Skipped {
                reason: SkipReason::Locked,
            }
        } else if !draft.is_ready() {
            SaveOutcome::Skipped {
                reason: SkipReason::NotReady,
            }
        } else if !draft.is_dirty() {
            SaveOutcome::Skipped {
                reason: SkipReason::Unchanged,
            }
        } else {
            self.persist(&draft).await
        };

        debug!(?outcome, "auto-save attempt finished");
        let _ = self.outcomes.send(outcome);
    }

    async fn persist(&mut self, draft: &InvoiceDraft) -> SaveOutcome {
        let fingerprint = draft.fingerprint();
        let result = match draft.id.or(self.saved_id) {
            Some(id) => self.store.update(id, draft).await.map(|()| (id, false)),
            None => self.store.create(draft).await.map(|id| (id, true)),
        };

        match result {
            Ok((id, created)) => {
                self.saved_id = Some(id);
                self.mark_saved(id, fingerprint.clone());
                if created {
                    SaveOutcome::Created { id, fingerprint }
                } else {
                    SaveOutcome::Updated { id, fingerprint }
                }
            }
            Err(e) => {
                warn!("auto-save failed: {}", e);
                SaveOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Records the save on the watched draft without waking the watcher.
    fn mark_saved(&self, id: i64, fingerprint: String) {
        self.draft.send_if_modified(|draft| {
            let next = draft.clone().reduce(DraftAction::MarkSaved { id, fingerprint });
            *draft = next;
            false
        });
    }
}

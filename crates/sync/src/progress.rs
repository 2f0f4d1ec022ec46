//! Progress reporting for orchestrated operations.
//!
//! Steps run strictly one at a time, so each event names exactly one
//! (skill, tool) pair or one install.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Observable progress of the active operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Scanning a folder or repository for candidates
    Listing { source: String },
    /// Installing candidate `current` of `total`
    Install {
        current: usize,
        total: usize,
        name: String,
    },
    /// Importing onboarding group `current` of `total`
    Import {
        current: usize,
        total: usize,
        name: String,
    },
    /// Projecting a skill into one tool
    Sync {
        current: usize,
        total: usize,
        skill_name: String,
        tool_label: String,
    },
    Unsync {
        skill_name: String,
        tool_label: String,
    },
    Updating { skill_name: String },
    Removing { skill_name: String },
    Refreshing,
    Finished,
}

/// Fan-out end of the progress channel. Dropped receivers are ignored.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl ProgressSink {
    /// Creates a connected sink and its receiver.
    pub fn channel() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn emit(&self, event: ProgressEvent) {
        tracing::trace!(?event, "progress");
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    /// Returns a guard that emits [`ProgressEvent::Finished`] when dropped,
    /// whichever way the operation exits.
    pub fn finish_on_drop(&self) -> FinishGuard {
        FinishGuard(self.clone())
    }
}

/// Emits the terminal event of one operation on drop.
#[derive(Debug)]
pub struct FinishGuard(ProgressSink);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.emit(ProgressEvent::Finished);
    }
}

/// One numbered step of a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<T> {
    /// 1-based position
    pub current: usize,
    pub total: usize,
    pub item: T,
}

/// Ordered queue of steps that knows its own size up front.
#[derive(Debug, Clone)]
pub struct StepQueue<T> {
    inner: std::vec::IntoIter<T>,
    total: usize,
    done: usize,
}

impl<T> StepQueue<T> {
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len();
        Self {
            inner: items.into_iter(),
            total,
            done: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

impl<T> Iterator for StepQueue<T> {
    type Item = Step<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        self.done += 1;
        Some(Step {
            current: self.done,
            total: self.total,
            item,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

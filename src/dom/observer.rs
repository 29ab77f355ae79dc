//! Mutation observation for the document model.
//!
//! Each registration owns the sending half of an unbounded channel; the
//! [`ObserverHandle`] owns the receiving half. Records are delivered in the
//! order the mutations happened.

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use super::document::NodeId;

/// One childList mutation under an observed subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

/// Records taken from an observer in one go.
pub type MutationBatch = Vec<MutationRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// The live subscription returned by `Document::observe`.
#[derive(Debug)]
pub struct ObserverHandle {
    id: ObserverId,
    root: NodeId,
    rx: UnboundedReceiver<MutationRecord>,
}

impl ObserverHandle {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Drains every record queued so far without waiting.
    pub fn take_records(&mut self) -> MutationBatch {
        let mut batch = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(record) => batch.push(record),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        batch
    }

    /// Waits for at least one record, then coalesces whatever else is queued.
    ///
    /// Returns `None` once the document side of the registration is gone.
    pub async fn next_batch(&mut self) -> Option<MutationBatch> {
        let first = self.rx.recv().await?;
        let mut batch = vec![first];
        batch.extend(self.take_records());
        Some(batch)
    }
}

struct Registration {
    id: ObserverId,
    root: NodeId,
    tx: UnboundedSender<MutationRecord>,
}

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    entries: Vec<Registration>,
}

impl ObserverRegistry {
    pub(crate) fn register(&mut self, root: NodeId) -> ObserverHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push(Registration { id, root, tx });
        ObserverHandle { id, root, rx }
    }

    pub(crate) fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub(crate) fn roots(&self) -> Vec<(ObserverId, NodeId)> {
        self.entries.iter().map(|e| (e.id, e.root)).collect()
    }

    /// Sends a record to the listed observers, dropping registrations whose
    /// handle has been dropped.
    pub(crate) fn deliver(&mut self, to: &[ObserverId], record: &MutationRecord) {
        self.entries.retain(|e| {
            if !to.contains(&e.id) {
                return !e.tx.is_closed();
            }
            e.tx.send(record.clone()).is_ok()
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.tx.is_closed()).count()
    }
}

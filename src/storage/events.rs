//! Change notification for storage mutations.
//!
//! Every store mutation publishes a `ChangeEvent` naming the table, the row
//! id, and the operation, so consumers can apply targeted updates instead of
//! re-fetching whole collections. Delivery is fan-out over crossbeam
//! channels; subscribers that drop their receiver are pruned on the next
//! publish.

use crossbeam::channel::{unbounded, Receiver, Sender};
use std::sync::Mutex;
use uuid::Uuid;

/// Table a change occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Goals,
    Reviews,
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Table::Goals => write!(f, "goals"),
            Table::Reviews => write!(f, "reviews"),
        }
    }
}

/// Kind of mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Inserted,
    Updated,
    Deleted,
}

/// A single storage mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Table the row lives in
    pub table: Table,
    /// Id of the affected row
    pub id: Uuid,
    /// What happened to it
    pub op: Operation,
}

impl ChangeEvent {
    pub fn new(table: Table, id: Uuid, op: Operation) -> Self {
        Self { table, id, op }
    }
}

/// Fan-out bus for change events.
#[derive(Default)]
pub struct ChangeBus {
    subscribers: Mutex<Vec<Sender<ChangeEvent>>>,
}

impl ChangeBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber and return its receiving end.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        let (tx, rx) = unbounded();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    /// Deliver an event to all live subscribers, dropping dead ones.
    pub fn publish(&self, event: ChangeEvent) {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            return;
        };
        subscribers.retain(|tx| tx.send(event).is_ok());
        tracing::debug!(table = %event.table, op = ?event.op, id = %event.id, "change published");
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

//! Change notification contracts.
//!
//! # Invariants
//! - Delivery is synchronous and in subscription order.
//! - Observers see the collection as it is after the mutation persisted.

use crate::model::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Handle returned by `Repository::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// What happened to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Loaded,
    Added(EntityId),
    Updated(EntityId),
    Deleted(EntityId),
    Sorted(String),
}

/// Notification payload: the change and the full post-change collection.
#[derive(Debug)]
pub struct ChangeEvent<'a, E> {
    pub kind: ChangeKind,
    pub snapshot: &'a [E],
}

/// Failure reported by an observer; aborts the remaining fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverError {
    message: String,
}

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ObserverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ObserverError {}

/// Receiver of repository change events.
pub trait Observer<E> {
    fn notify(&mut self, event: &ChangeEvent<'_, E>) -> Result<(), ObserverError>;
}

/// Adapts a closure into an `Observer`.
pub(crate) struct FnObserver<F>(pub(crate) F);

impl<E, F> Observer<E> for FnObserver<F>
where
    F: FnMut(&ChangeEvent<'_, E>) -> Result<(), ObserverError>,
{
    fn notify(&mut self, event: &ChangeEvent<'_, E>) -> Result<(), ObserverError> {
        (self.0)(event)
    }
}

//! Notification Store
//!
//! Ordered, newest-first collection of notification records with their
//! read/unread projection.
//!
//! - Ids are unique: a redelivered id is ignored
//! - Counts are derived from the collection on every call, never cached
//! - Optional capacity bound evicts the oldest records
//! - Observers fire **outside** the lock scope (see [`NotificationObserver`])

use crate::domain::{NotificationId, NotificationRecord};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Thread-safe store shared between the channel handler and the UI side
pub type SharedNotificationStore = Arc<RwLock<NotificationStore>>;

/// Hook for "new record created" (desktop notifications and the like)
///
/// Fired after the write lock is released, so reading the store from the
/// callback is safe. Keep callbacks fast; they run on the channel task.
///
/// # Example
///
/// ```ignore
/// struct Toast(crossbeam_channel::Sender<String>);
///
/// impl NotificationObserver for Toast {
///     fn on_notification(&self, record: &NotificationRecord) {
///         let _ = self.0.try_send(record.title.clone());
///     }
/// }
/// ```
pub trait NotificationObserver: Send + Sync {
    fn on_notification(&self, record: &NotificationRecord);
}

#[derive(Default)]
pub struct NotificationStore {
    /// Front is newest
    records: VecDeque<NotificationRecord>,
    capacity: Option<usize>,
    observers: Vec<Arc<dyn NotificationObserver>>,
}

impl std::fmt::Debug for NotificationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationStore")
            .field("records", &self.records.len())
            .field("capacity", &self.capacity)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl NotificationStore {
    /// Unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store keeping at most `capacity` records (`None` = unbounded)
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn shared(capacity: Option<usize>) -> SharedNotificationStore {
        Arc::new(RwLock::new(Self::with_capacity(capacity)))
    }

    /// Prepend a record
    ///
    /// Returns the inserted record for observer dispatch, or `None` when
    /// its id is already present.
    pub fn insert(&mut self, record: NotificationRecord) -> Option<NotificationRecord> {
        if self.contains(&record.id) {
            debug!("Ignoring duplicate notification {}", record.id);
            return None;
        }

        self.records.push_front(record.clone());

        if let Some(capacity) = self.capacity {
            while self.records.len() > capacity {
                if let Some(evicted) = self.records.pop_back() {
                    debug!("Evicted notification {} (capacity {})", evicted.id, capacity);
                }
            }
        }

        Some(record)
    }

    /// Mark one record read; unknown ids are ignored
    pub fn mark_one_read(&mut self, id: &NotificationId) -> bool {
        match self.records.iter_mut().find(|r| &r.id == id) {
            Some(record) => {
                record.mark_read();
                true
            }
            None => {
                debug!("mark_one_read: no notification {}", id);
                false
            }
        }
    }

    /// Mark every record read, returning how many were unread
    pub fn mark_all_read(&mut self) -> usize {
        let mut flipped = 0;
        for record in self.records.iter_mut().filter(|r| r.is_unread) {
            record.mark_read();
            flipped += 1;
        }
        flipped
    }

    /// Empty the collection, returning how many records were removed
    pub fn clear_all(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        removed
    }

    pub fn contains(&self, id: &NotificationId) -> bool {
        self.records.iter().any(|r| &r.id == id)
    }

    pub fn get(&self, id: &NotificationId) -> Option<&NotificationRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// All records, newest first
    pub fn snapshot(&self) -> Vec<NotificationRecord> {
        self.records.iter().cloned().collect()
    }

    /// Unread records, newest first
    pub fn unread(&self) -> Vec<NotificationRecord> {
        self.records.iter().filter(|r| r.is_unread).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.iter()
    }

    pub fn unread_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_unread).count()
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn subscribe(&mut self, observer: Arc<dyn NotificationObserver>) {
        self.observers.push(observer);
    }

    /// Observers to fire after releasing the lock
    pub fn observers(&self) -> Vec<Arc<dyn NotificationObserver>> {
        self.observers.clone()
    }
}

/// Insert into a shared store and fire observers outside the lock
pub fn insert_and_notify(store: &SharedNotificationStore, record: NotificationRecord) -> bool {
    let (inserted, observers) = {
        let mut guard = store.write();
        let inserted = guard.insert(record);
        (inserted, guard.observers())
    };

    match inserted {
        Some(record) => {
            for observer in &observers {
                observer.on_notification(&record);
            }
            true
        }
        None => false,
    }
}

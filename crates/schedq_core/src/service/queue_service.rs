//! Queue use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for scheduler/admin callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or catalog contracts.
//! - The service layer remains storage-agnostic.

use crate::model::attribute::{AttributeEntry, AttributeKey};
use crate::model::queue::{Queue, QueueType};
use crate::repo::cursor::QueueCursor;
use crate::repo::queue_repo::{QueueRepository, RepoResult, SaveDirective};

/// Use-case wrapper over a queue repository.
pub struct QueueService<R: QueueRepository> {
    repo: R,
}

impl<R: QueueRepository> QueueService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a queue with the given attributes.
    ///
    /// # Contract
    /// - Fails with `Conflict` when the name already exists.
    /// - Timestamps are assigned by the store, not the caller.
    pub fn create_queue(
        &self,
        name: impl Into<String>,
        queue_type: QueueType,
        attributes: Vec<AttributeEntry>,
    ) -> RepoResult<()> {
        let mut queue = Queue::new(name, queue_type);
        queue.attributes = attributes;
        self.repo.save(&queue, SaveDirective::New)
    }

    /// Persists a queue per the directive semantics.
    pub fn save(&self, queue: &Queue, directive: SaveDirective) -> RepoResult<()> {
        self.repo.save(queue, directive)
    }

    /// Loads one queue by name.
    pub fn load(&self, name: &str) -> RepoResult<Option<Queue>> {
        self.repo.load(name)
    }

    /// Removes the named attribute keys from a queue.
    pub fn delete_attrs(&self, name: &str, keys: &[AttributeKey]) -> RepoResult<()> {
        self.repo.delete_attrs(name, keys)
    }

    /// Deletes a queue.
    pub fn delete(&self, name: &str) -> RepoResult<()> {
        self.repo.delete(name)
    }

    /// Opens a cursor over all queues in creation order.
    pub fn find(&self) -> RepoResult<QueueCursor> {
        self.repo.find()
    }

    /// Convenience scan: loads every queue through the cursor protocol.
    pub fn list_all(&self) -> RepoResult<Vec<Queue>> {
        let mut cursor = self.repo.find()?;
        let mut queues = Vec::with_capacity(cursor.count());
        for index in 0..cursor.count() {
            queues.push(cursor.next_row(index)?);
        }
        cursor.close();
        Ok(queues)
    }
}

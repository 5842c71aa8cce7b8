use chrono::{DateTime, Utc};
use log::*;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::AppError;

/**
 * Something residents submit and then upvote
 */
pub trait Record: Clone {
    /**
     * Human name of the record, used in "not found" messages
     */
    const KIND: &'static str;
    type Draft;

    /**
     * Validate a submission and build the record for the given id
     */
    fn from_draft(id: u64, draft: Self::Draft, now: DateTime<Utc>) -> Result<Self, AppError>;
    fn id(&self) -> u64;
    fn votes(&self) -> u64;
    fn upvote(&mut self);
}

struct Inner<T> {
    next_id: u64,
    records: Vec<T>,
}

/**
 * In-memory collection of records with their own id counter
 *
 * Records are kept in insertion order and never removed. Each mutation holds the store's lock
 * for its whole duration so concurrent votes are never lost.
 */
pub struct Store<T> {
    inner: Mutex<Inner<T>>,
}

impl<T: Record> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Store<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                records: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // no critical section can leave the collection half-updated
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /**
     * Validate and append a new record, the id is only consumed when validation passes
     */
    pub fn create(&self, draft: T::Draft) -> Result<T, AppError> {
        let mut inner = self.lock();
        let record = T::from_draft(inner.next_id, draft, Utc::now())?;
        inner.next_id += 1;
        inner.records.push(record.clone());
        debug!("Created {} {}", T::KIND, record.id());
        Ok(record)
    }

    /**
     * All records, most votes first, ties in submission order
     */
    pub fn list(&self) -> Vec<T> {
        let mut records = self.lock().records.clone();
        // sort_by is stable
        records.sort_by(|a, b| b.votes().cmp(&a.votes()));
        records
    }

    pub fn vote_for(&self, id: u64) -> Result<T, AppError> {
        let mut inner = self.lock();
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(AppError::NotFound(T::KIND))?;
        record.upvote();
        Ok(record.clone())
    }
}

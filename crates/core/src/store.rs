//! In-memory stores for conversations and generation jobs.
//!
//! Entries live until removed or expired; nothing is persisted.

use crate::assistant::Conversation;
use crate::types::GenerationJob;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Entry<T> {
    value: T,
    created_at: Instant,
}

/// Thread-safe map from id to value with creation-time expiry.
#[derive(Debug)]
pub struct Store<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
}

/// Chat conversations keyed by conversation id.
pub type ConversationStore = Store<Conversation>;

/// Web generation jobs keyed by job id.
pub type JobStore = Store<GenerationJob>;

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> Store<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `id`, restarting its clock.
    pub fn insert(&self, id: impl Into<String>, value: T) {
        self.entries.lock().insert(
            id.into(),
            Entry {
                value,
                created_at: Instant::now(),
            },
        );
    }

    /// Replace the value for an existing `id`, keeping its creation time.
    /// Returns false if there is no such entry.
    pub fn update(&self, id: &str, value: T) -> bool {
        match self.entries.lock().get_mut(id) {
            Some(entry) => {
                entry.value = value;
                true
            }
            None => false,
        }
    }

    /// Run `f` against the value for `id` while holding the lock.
    pub fn with<R>(&self, id: &str, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.entries.lock().get(id).map(|entry| f(&entry.value))
    }

    /// Run `f` against the mutable value for `id` while holding the lock.
    pub fn with_mut<R>(&self, id: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.entries.lock().get_mut(id).map(|entry| f(&mut entry.value))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    pub fn remove(&self, id: &str) -> Option<T> {
        self.entries.lock().remove(id).map(|entry| entry.value)
    }

    /// Drop entries created `ttl` or longer ago. Returns how many were
    /// dropped.
    pub fn expire(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.created_at) < ttl);
        before - entries.len()
    }

    /// Ids of all live entries, in no particular order.
    pub fn ids(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<T: Clone> Store<T> {
    pub fn get(&self, id: &str) -> Option<T> {
        self.with(id, T::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobPhase;

    #[test]
    fn test_insert_get_update() {
        let jobs = JobStore::new();
        jobs.insert("job1", GenerationJob::planning());
        assert_eq!(jobs.get("job1").map(|j| j.status), Some(JobPhase::Planning));

        assert!(jobs.update("job1", GenerationJob::complete()));
        assert_eq!(jobs.get("job1").map(|j| j.progress), Some(100));
        assert!(!jobs.update("missing", GenerationJob::complete()));
        assert!(jobs.get("missing").is_none());
    }

    #[test]
    fn test_with_mut_edits_in_place() {
        let conversations = ConversationStore::new();
        conversations.insert("c1", Conversation::new("c1"));

        let count = conversations.with_mut("c1", |c| {
            c.slides.push(crate::types::SlideRecord::section("S"));
            c.slides.len()
        });
        assert_eq!(count, Some(1));
        assert_eq!(conversations.with("c1", |c| c.slides.len()), Some(1));
        assert_eq!(conversations.with_mut("nope", |c| c.slides.len()), None);
    }

    #[test]
    fn test_expire() {
        let jobs = JobStore::new();
        jobs.insert("a", GenerationJob::planning());
        jobs.insert("b", GenerationJob::rendering());

        assert_eq!(jobs.expire(Duration::from_secs(3600)), 0);
        assert_eq!(jobs.len(), 2);

        assert_eq!(jobs.expire(Duration::ZERO), 2);
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_ids() {
        let jobs = JobStore::new();
        assert!(jobs.ids().is_empty());
        jobs.insert("a", GenerationJob::planning());
        jobs.insert("b", GenerationJob::planning());

        let mut ids = jobs.ids();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_remove() {
        let jobs = JobStore::new();
        jobs.insert("a", GenerationJob::planning());
        assert!(jobs.contains("a"));
        assert_eq!(jobs.remove("a"), Some(GenerationJob::planning()));
        assert!(!jobs.contains("a"));
    }
}

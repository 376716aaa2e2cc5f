use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::config::{CommentConfig, IdStrategy};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    payload: String,
    sequence: u64,
}

/// Id and payload bookkeeping for the comments of one session.
///
/// Every id the store hands out or accepts is remembered for the rest of the
/// session, so a generated id never matches one used before, even after the
/// comment that carried it is gone.
#[derive(Debug, Clone, Default)]
pub struct CommentStore {
    config: CommentConfig,
    entries: HashMap<String, Entry>,
    issued: HashSet<String>,
    next_sequence: u64,
    next_id: u64,
}

impl CommentStore {
    pub fn new(config: CommentConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &CommentConfig {
        &self.config
    }

    /// Register a payload under `id`, or under a fresh id when `id` is `None`.
    pub fn register(&mut self, id: Option<&str>, payload: impl Into<String>) -> Result<String> {
        let id = match id {
            Some(id) if self.entries.contains_key(id) => {
                return Err(Error::DuplicateId(id.to_string()))
            }
            Some(id) => id.to_string(),
            None => self.generate(),
        };

        self.next_sequence += 1;
        self.issued.insert(id.clone());
        self.entries.insert(
            id.clone(),
            Entry {
                payload: payload.into(),
                sequence: self.next_sequence,
            },
        );

        Ok(id)
    }

    pub fn unregister(&mut self, id: &str) -> Result<()> {
        self.entries
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::UnknownId(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Result<&str> {
        self.entry(id).map(|entry| entry.payload.as_str())
    }

    /// The creation counter of a live comment. Later comments have larger values.
    pub fn sequence_of(&self, id: &str) -> Result<u64> {
        self.entry(id).map(|entry| entry.sequence)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Forget every live comment. Issued ids stay reserved.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Bring back the live comments of `snapshot`. Ids issued since the
    /// snapshot stay reserved.
    pub(crate) fn restore_entries(&mut self, snapshot: &CommentStore) {
        self.entries = snapshot.entries.clone();
    }

    fn entry(&self, id: &str) -> Result<&Entry> {
        self.entries
            .get(id)
            .ok_or_else(|| Error::UnknownId(id.to_string()))
    }

    fn generate(&mut self) -> String {
        loop {
            let id = match self.config.ids {
                IdStrategy::Random => {
                    format!("{}{}", self.config.id_prefix, Uuid::new_v4().simple())
                }
                IdStrategy::Sequential => {
                    self.next_id += 1;
                    format!("{}{}", self.config.id_prefix, self.next_id)
                }
            };
            if !self.issued.contains(&id) {
                return id;
            }
        }
    }
}

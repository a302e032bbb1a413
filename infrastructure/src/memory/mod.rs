//! Memory store backends
//!
//! - [`InMemoryMemoryStore`]: process-local, lost on exit (default)
//! - [`JsonlMemoryStore`]: one append-only JSONL file per conversation

mod in_memory;
mod jsonl;

pub use in_memory::InMemoryMemoryStore;
pub use jsonl::JsonlMemoryStore;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

/// One lock per conversation id, created on first use.
struct Namespaces<T> {
    locks: RwLock<HashMap<String, Arc<Mutex<T>>>>,
}

impl<T: Default> Namespaces<T> {
    fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }

    fn get(&self, conversation_id: &str) -> Arc<Mutex<T>> {
        if let Some(lock) = self
            .locks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(conversation_id)
        {
            return Arc::clone(lock);
        }
        let mut locks = self.locks.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(conversation_id.to_string()).or_default())
    }

    fn remove(&self, conversation_id: &str) {
        self.locks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(conversation_id);
    }
}

//! Named counters for tracking events

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct Counter {
    counters: Mutex<HashMap<String, usize>>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
        }
    }

    // A panicking reader cannot leave a half-written count behind.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn increment(&self, name: &str, value: usize) {
        let mut counters = self.lock();
        match counters.get_mut(name) {
            Some(count) => *count += value,
            None => {
                counters.insert(name.to_string(), value);
            }
        }
    }

    pub fn get(&self, name: &str) -> usize {
        self.lock().get(name).copied().unwrap_or(0)
    }

    /// Sum over every named counter.
    pub fn total(&self) -> usize {
        self.lock().values().sum()
    }

    pub fn reset(&self, name: &str) {
        self.lock().insert(name.to_string(), 0);
    }

    pub fn reset_all(&self) {
        self.lock().clear();
    }
}

//! In-memory session mirror for embedding and tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::ports::{SessionMirror, SessionMirrorError};

/// Session mirror held in a mutex-guarded slot.
#[derive(Debug, Default)]
pub struct InMemorySessionMirror {
    slot: Mutex<Option<String>>,
}

impl InMemorySessionMirror {
    /// Create an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mirror already holding `record`.
    #[must_use]
    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(record.into())),
        }
    }

    /// Copy of the stored record.
    #[must_use]
    pub fn snapshot(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        // The slot is replaced whole, so a poisoned guard still holds a
        // complete value.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionMirror for InMemorySessionMirror {
    fn read(&self) -> Result<Option<String>, SessionMirrorError> {
        Ok(self.snapshot())
    }

    fn write(&self, record: &str) -> Result<(), SessionMirrorError> {
        *self.lock() = Some(record.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionMirrorError> {
        *self.lock() = None;
        Ok(())
    }
}

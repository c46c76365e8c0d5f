//! Driven port for the local session mirror.
//!
//! The mirror is a single slot holding the serialised session user under
//! [`SESSION_MIRROR_KEY`]. It stores raw text so that decoding, and the
//! decision to discard a corrupt record, stay in the domain.

use super::define_port_error;

/// Fixed key under which the session user is mirrored.
pub const SESSION_MIRROR_KEY: &str = "user";

define_port_error! {
    /// Errors raised by session mirror adapters.
    pub enum SessionMirrorError {
        /// Reading the stored record failed.
        Read { message: String } => "session mirror read failed: {message}",
        /// Writing the record failed.
        Write { message: String } => "session mirror write failed: {message}",
        /// Removing the record failed.
        Clear { message: String } => "session mirror clear failed: {message}",
    }
}

/// Port for durable client-local storage of the session user.
#[cfg_attr(test, mockall::automock)]
pub trait SessionMirror: Send + Sync {
    /// Return the stored record, or `None` when the slot is empty.
    fn read(&self) -> Result<Option<String>, SessionMirrorError>;

    /// Replace the stored record.
    fn write(&self, record: &str) -> Result<(), SessionMirrorError>;

    /// Remove the stored record. Clearing an empty slot succeeds.
    fn clear(&self) -> Result<(), SessionMirrorError>;
}

//! Session mirror adapters.
//!
//! The file adapter is the durable default; the in-memory adapter suits
//! embedding and tests.

mod atomic_io;
mod file;
mod memory;

pub use file::{FileSessionMirror, MIRROR_FILE_NAME};
pub use memory::InMemorySessionMirror;

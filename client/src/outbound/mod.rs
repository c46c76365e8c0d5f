//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest-backed session and plan backend
//! - **mirror**: file-backed and in-memory session mirrors
//!
//! Adapters are thin translators between domain types and transport or
//! storage representations. They contain no session logic.

pub mod http;
pub mod mirror;

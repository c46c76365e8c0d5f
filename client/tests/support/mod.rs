//! Shared fixtures for end-to-end client tests.

pub mod stub_backend;

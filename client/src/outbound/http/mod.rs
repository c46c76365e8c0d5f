//! HTTP outbound adapter for the session backend.
//!
//! This module provides a reqwest implementation of the `SessionApi` and
//! `PlanApi` ports.

mod client;
mod dto;

pub use client::{HttpBackend, HttpBackendBuildError};

//! Client session layer for the UnBind contract analyser.
//!
//! `domain` holds the session records, ports and services; `outbound` holds
//! the HTTP backend and session mirror adapters; `config` loads the settings
//! used to wire them together.

pub mod config;
pub mod domain;
pub mod outbound;

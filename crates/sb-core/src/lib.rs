//! # sb-core
//!
//! Core utilities for the SAML artifact bridge: the shared error taxonomy,
//! the bridge configuration values, and structured audit events.
//!
//! This crate provides foundational types used across all other bridge
//! crates and has no protocol or transport knowledge of its own.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};

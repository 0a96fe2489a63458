//! Authorization decisions for the bridge.
//!
//! A policy backend answers single-resource questions; the gateway
//! fans batches out over it, bounds concurrency, applies a
//! per-decision timeout, and translates every failure into an
//! indeterminate decision. A broken backend can slow answers down or
//! blank them out, but it can never grant access.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod backend;
pub mod gateway;

pub use backend::{AllowAllBackend, HeadProbeBackend, PolicyBackend};
pub use gateway::AuthorizationGateway;

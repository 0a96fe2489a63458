//! SAML 2.0 artifact binding messages for the bridge.
//!
//! This crate owns the wire format: parsing the two inbound request
//! kinds the search appliance sends over the SOAP binding, and
//! rendering the fixed-shape responses the bridge answers with. All
//! outbound values pass through structured XML writing so that text
//! and attribute content is escaped exactly once.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod builder;
pub mod codec;
pub mod constants;
pub mod random;
pub mod types;

pub use builder::{complete_reply_to, ResponseBuilder};
pub use codec::{parse_artifact_resolve, parse_authz_query};
pub use types::{ArtifactResolve, AuthzQuery, Decision, DecisionOutcome, ResolveContext};

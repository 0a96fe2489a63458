//! Identifier generation for protocol messages.
//!
//! Message ids, assertion ids, and session indexes must be unique and
//! unguessable for the lifetime of the deployment; artifacts must be
//! unguessable for their validity window. Everything here draws from
//! the operating system CSPRNG.

use rand::distr::{Alphanumeric, SampleString};

/// Length of the random portion of every generated identifier.
///
/// 32 alphanumeric characters carry roughly 190 bits of entropy,
/// comfortably above the 128-bit floor for unguessable tokens.
const ID_LEN: usize = 32;

/// Generates an identifier usable as a SAML message, assertion, or
/// session id.
///
/// The value starts with an underscore so it is a valid XML ID no
/// matter which character the random tail starts with.
#[must_use]
pub fn protocol_id() -> String {
    let mut id = String::with_capacity(ID_LEN + 1);
    id.push('_');
    id.push_str(&Alphanumeric.sample_string(&mut rand::rng(), ID_LEN));
    id
}

/// Generates an opaque artifact token.
///
/// Artifacts travel inside URLs and XML text nodes, so the alphabet
/// is restricted to unreserved alphanumeric characters.
#[must_use]
pub fn artifact_token() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), ID_LEN)
}

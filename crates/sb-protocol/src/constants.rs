//! Protocol constants for the SAML 2.0 artifact binding.
//!
//! Namespace URIs, status code URNs, and authentication context
//! classes used on the wire. Values are taken verbatim from the SAML
//! 2.0 core and bindings specifications.

/// SAML 2.0 assertion namespace.
pub const SAML_NS: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// SAML 2.0 protocol namespace.
pub const SAMLP_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// SOAP 1.1 envelope namespace used by the artifact binding.
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Protocol version carried in every message.
pub const SAML_VERSION: &str = "2.0";

/// Bearer subject confirmation method.
pub const BEARER_METHOD: &str = "urn:oasis:names:tc:SAML:2.0:cm:bearer";

/// Action namespace for the HTTP get/head/put/post action set.
pub const GHPP_ACTION_NS: &str = "urn:oasis:names:tc:SAML:1.0:action:ghpp";

/// The single action the bridge answers authorization queries for.
pub const HTTP_GET_ACTION: &str = "GET";

/// Top-level SAML 2.0 status codes.
pub mod status_codes {
    /// The request succeeded.
    pub const SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";

    /// The request could not be performed due to an error on the
    /// part of the requester.
    pub const REQUESTER: &str = "urn:oasis:names:tc:SAML:2.0:status:Requester";

    /// The request could not be performed due to an error on the
    /// part of the responder.
    pub const RESPONDER: &str = "urn:oasis:names:tc:SAML:2.0:status:Responder";

    /// The responder could not process the request because the
    /// protocol version was incorrect.
    pub const VERSION_MISMATCH: &str = "urn:oasis:names:tc:SAML:2.0:status:VersionMismatch";
}

/// Second-level SAML 2.0 status codes, nested under a top-level code.
pub mod sub_status_codes {
    /// The responder is able to process the request but has chosen
    /// not to respond.
    pub const REQUEST_DENIED: &str = "urn:oasis:names:tc:SAML:2.0:status:RequestDenied";

    /// The resource value provided in the request was invalid or
    /// unrecognized.
    pub const RESOURCE_NOT_RECOGNIZED: &str =
        "urn:oasis:names:tc:SAML:2.0:status:ResourceNotRecognized";

    /// The responder does not recognize the principal named in the
    /// request.
    pub const UNKNOWN_PRINCIPAL: &str = "urn:oasis:names:tc:SAML:2.0:status:UnknownPrincipal";
}

/// Authentication context classes the bridge can assert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthnContextClass {
    /// Authentication inferred from the connection address.
    InternetProtocol,
    /// Password over a protected transport.
    PasswordProtectedTransport,
    /// No particular context claimed.
    Unspecified,
}

impl AuthnContextClass {
    /// Returns the URI for this authentication context class.
    #[must_use]
    pub fn uri(&self) -> &'static str {
        match self {
            Self::InternetProtocol => "urn:oasis:names:tc:SAML:2.0:ac:classes:InternetProtocol",
            Self::PasswordProtectedTransport => {
                "urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport"
            }
            Self::Unspecified => "urn:oasis:names:tc:SAML:2.0:ac:classes:unspecified",
        }
    }

    /// Parses an authentication context class from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "urn:oasis:names:tc:SAML:2.0:ac:classes:InternetProtocol" => {
                Some(Self::InternetProtocol)
            }
            "urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport" => {
                Some(Self::PasswordProtectedTransport)
            }
            "urn:oasis:names:tc:SAML:2.0:ac:classes:unspecified" => Some(Self::Unspecified),
            _ => None,
        }
    }
}

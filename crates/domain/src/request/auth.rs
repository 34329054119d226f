//! Authentication attached to a request.

use serde::{Deserialize, Serialize};

/// Where an API key is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    /// As a request header.
    #[default]
    Header,
    /// As a query parameter.
    Query,
}

/// A raw key/value/type triple for auth schemes the editor does not model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthParam {
    /// Parameter name.
    pub key: String,
    /// Parameter value, kept as JSON because some schemes use non-strings.
    #[serde(default)]
    pub value: serde_json::Value,
    /// Value type hint.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
}

/// Request authentication.
///
/// All string values may contain `{{variables}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Auth {
    /// Explicitly no authentication.
    NoAuth,

    /// Bearer token authentication.
    Bearer {
        /// The bearer token value.
        token: String,
    },

    /// HTTP Basic authentication.
    Basic {
        /// Username for basic auth.
        username: String,
        /// Password for basic auth.
        password: String,
    },

    /// API Key authentication.
    ApiKey {
        /// Header or query parameter name.
        key: String,
        /// The API key value.
        value: String,
        /// Where to send the key.
        location: ApiKeyLocation,
    },

    /// Any other scheme (oauth2, digest, awsv4, ...), carried as-is.
    Other {
        /// Scheme name as written in the document.
        scheme: String,
        /// Scheme parameters.
        params: Vec<AuthParam>,
    },
}

impl Auth {
    /// Creates a bearer token authentication.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Creates a basic authentication.
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the scheme name as used in collection documents.
    #[must_use]
    pub fn scheme(&self) -> &str {
        match self {
            Self::NoAuth => "noauth",
            Self::Bearer { .. } => "bearer",
            Self::Basic { .. } => "basic",
            Self::ApiKey { .. } => "apikey",
            Self::Other { scheme, .. } => scheme,
        }
    }
}

//! Dispatcher configuration.
//!
//! This module defines the TOML-deserializable defaults the dispatcher
//! resolves against on every request: base URL, default headers, and the
//! default body-encoding tag. All three are set once at construction and
//! never mutated by requests.

use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;

use crate::error::{ClientError, Result};

/// Dispatcher defaults, loadable from TOML.
///
/// # Examples
///
/// ```toml
/// base_url = "http://data.un.org/ws/rest"
/// default_encoding = "json"
///
/// [default_headers]
/// Accept = "text/json"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DispatcherConfig {
    /// Service base URL.
    ///
    /// Endpoint paths are appended verbatim, with no separator inserted, so
    /// a trailing slash here must match the leading-separator convention of
    /// the paths used.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Headers applied when a call does not supply its own.
    #[serde(default = "default_headers")]
    pub default_headers: BTreeMap<String, String>,

    /// Body-encoding tag applied when a call does not supply its own.
    ///
    /// The `"json"` tag sends bodies as raw JSON documents; any other tag
    /// sends the body form-encoded as the single pair `{tag: body}`.
    #[serde(default = "default_encoding")]
    pub default_encoding: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_headers: default_headers(),
            default_encoding: default_encoding(),
        }
    }
}

impl DispatcherConfig {
    /// Parses and validates a configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the document does not parse
    /// or fails [`validate`](Self::validate).
    pub fn from_toml(document: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(document).map_err(|e| ClientError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the base URL is not an
    /// absolute http/https URL or the default encoding tag is empty.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url: {e}")))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::Configuration(format!(
                "base_url must use http or https, got {}",
                url.scheme()
            )));
        }
        if self.default_encoding.is_empty() {
            return Err(ClientError::Configuration(
                "default_encoding must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://data.un.org/ws/rest".to_owned()
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Accept".to_owned(), "text/json".to_owned())])
}

fn default_encoding() -> String {
    "json".to_owned()
}

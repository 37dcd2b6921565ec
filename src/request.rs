//! Per-call request description.
//!
//! A [`RequestSpec`] is built for every dispatch operation by merging
//! call-site arguments over the dispatcher defaults, and is never persisted
//! across calls.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::DispatcherConfig;

/// Encoding tag that sends bodies as raw JSON documents.
///
/// Any other non-empty tag sends the body form-encoded as the single pair
/// `{tag: body}`, which is the service's form-style convention.
pub const JSON_ENCODING: &str = "json";

/// HTTP methods accepted by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP DELETE.
    Delete,
}

impl Method {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

/// A fully resolved request, ready for dispatch.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// HTTP method.
    pub method: Method,
    /// Endpoint path, appended verbatim to the base URL.
    pub path: String,
    /// Optional opaque body value.
    pub body: Option<Value>,
    /// Body-encoding tag.
    pub encoding: String,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
}

impl RequestSpec {
    /// Merges call-site arguments over the dispatcher defaults.
    ///
    /// Omitted headers and encoding fall back to the configured defaults;
    /// everything else is taken as given.
    pub(crate) fn resolve(
        method: Method,
        path: &str,
        body: Option<Value>,
        encoding: Option<String>,
        headers: Option<BTreeMap<String, String>>,
        defaults: &DispatcherConfig,
    ) -> Self {
        Self {
            method,
            path: path.to_owned(),
            body,
            encoding: encoding.unwrap_or_else(|| defaults.default_encoding.clone()),
            headers: headers.unwrap_or_else(|| defaults.default_headers.clone()),
        }
    }

    /// Builds the full request URL.
    ///
    /// The path is concatenated verbatim onto the base URL with no separator
    /// inserted; the caller supplies the leading `/`.
    #[must_use]
    pub fn full_url(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.path)
    }

    /// Attaches this spec's body to a request builder.
    ///
    /// Bodies under the [`JSON_ENCODING`] tag are sent as raw JSON; bodies
    /// under any other tag are form-encoded as the single pair
    /// `{tag: body}`. Requests without a body are left untouched.
    pub(crate) fn apply_body(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.body {
            None => request,
            Some(body) if self.encoding == JSON_ENCODING => request.json(body),
            Some(body) => request.form(&[(self.encoding.as_str(), form_value(body))]),
        }
    }
}

/// Renders a body value as a single form field value.
///
/// Strings are sent without their JSON quoting; other values are sent as
/// their compact JSON rendering.
fn form_value(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

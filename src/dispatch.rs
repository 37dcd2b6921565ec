//! Request dispatch.
//!
//! This module provides [`RequestDispatcher`], the component that translates
//! logical REST operations into concrete network calls. Three dispatch
//! operations (single, repeated, batched) funnel through one shared
//! preparation step (URL join, header and encoding resolution, body
//! wrapping) before execution, and share one error taxonomy.
//!
//! # Sessions
//!
//! Each call builds its own HTTP session: single requests use a fresh
//! connection, and the fan-out operations share one session across their
//! sub-requests, torn down at the join point. Sessions are never shared
//! across calls.

use std::collections::BTreeMap;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{error, info, instrument};

use crate::{
    config::DispatcherConfig,
    decode::json_from_slice,
    error::{ClientError, Result},
    request::{Method, RequestSpec},
};

/// Maximum number of characters of a payload included in a log event.
///
/// Request bodies and response payloads are truncated to this length before
/// logging. The payload handed back to the caller is never truncated.
const LOG_PREVIEW_MAX: usize = 250;

/// One data flow advertised by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataflow {
    /// Flow identifier.
    pub id: String,
    /// Full URN of the flow.
    pub urn: String,
    /// Remaining flow attributes, preserved as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Data flow listing returned by the `/dataflow` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DataflowSet {
    /// Available data flows.
    pub resources: Vec<Dataflow>,
    /// Cross-references reported alongside the flows.
    #[serde(default)]
    pub references: Value,
}

/// Dispatcher issuing HTTP requests against the statistical-data service.
///
/// Owns a base URL, default headers, and a default body-encoding tag, all
/// immutable after construction. Calls may override headers and encoding
/// per request; omitted arguments resolve to the defaults.
///
/// # Examples
///
/// ```rust,no_run
/// use undata_client::{Method, RequestDispatcher};
///
/// # async fn example() -> undata_client::Result<()> {
/// let dispatcher = RequestDispatcher::new("http://data.un.org/ws/rest");
/// let payload = dispatcher.send(Method::Get, "/dataflow", None, None, None).await?;
/// println!("{} bytes", payload.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    config: DispatcherConfig,
}

impl RequestDispatcher {
    /// Creates a dispatcher for the given base URL with the stock defaults
    /// (`Accept: text/json`, `"json"` encoding).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { config: DispatcherConfig { base_url: base_url.into(), ..DispatcherConfig::default() } }
    }

    /// Creates a dispatcher from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the configuration fails
    /// [`DispatcherConfig::validate`].
    pub fn from_config(config: DispatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the dispatcher's configuration.
    #[must_use]
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Issues a single request and returns the raw response payload.
    ///
    /// Omitted `encoding` and `headers` resolve to the dispatcher defaults.
    /// The full URL is the base URL with `path` appended verbatim. The raw
    /// payload is returned untouched; callers expecting JSON should decode
    /// via [`crate::decode::json_from_slice`], which tolerates the
    /// byte-order mark the service sometimes prefixes.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Request`] on a non-2xx status, carrying the status
    ///   code and the response body
    /// - [`ClientError::Transport`] on connection failure, timeout, or any
    ///   other network-layer fault
    #[instrument(skip(self, body, headers), fields(base_url = %self.config.base_url))]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        encoding: Option<String>,
        headers: Option<BTreeMap<String, String>>,
    ) -> Result<Vec<u8>> {
        let spec = RequestSpec::resolve(method, path, body, encoding, headers, &self.config);
        let client = session()?;
        execute(&client, &self.config.base_url, &spec).await
    }

    /// Issues the identical request `n` times concurrently and returns the
    /// raw response payloads in issue order.
    ///
    /// All `n` sub-requests start together within one session and the call
    /// suspends until every one has completed. The first sub-request to fail
    /// aborts the remaining siblings and its error is the one propagated; no
    /// partial results are returned.
    ///
    /// # Errors
    ///
    /// As for [`send`](Self::send), from whichever sub-request fails first.
    #[instrument(skip(self, body, headers), fields(base_url = %self.config.base_url))]
    pub async fn send_repeated(
        &self,
        n: usize,
        method: Method,
        path: &str,
        body: Option<Value>,
        encoding: Option<String>,
        headers: Option<BTreeMap<String, String>>,
    ) -> Result<Vec<Vec<u8>>> {
        let spec = RequestSpec::resolve(method, path, body, encoding, headers, &self.config);
        let client = session()?;

        let mut tasks = JoinSet::new();
        for index in 0..n {
            let client = client.clone();
            let base_url = self.config.base_url.clone();
            let spec = spec.clone();
            tasks.spawn(async move { (index, execute(&client, &base_url, &spec).await) });
        }
        join_in_order(tasks, n).await
    }

    /// Issues `M` heterogeneous requests concurrently and returns each
    /// response parsed as JSON, in input order.
    ///
    /// `methods`, `paths`, and `bodies` must have equal length `M`;
    /// `encodings` and `headers`, when given, must match as well. Omitted
    /// `encodings`/`headers` resolve to `M` copies of the dispatcher
    /// defaults. Each response is byte-order-mark-stripped and JSON-parsed
    /// individually.
    ///
    /// Same fan-out semantics as [`send_repeated`](Self::send_repeated): one
    /// session for the whole call, all-or-nothing join, first failure wins.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Configuration`] on mismatched input lengths, before
    ///   any network call
    /// - [`ClientError::Decode`] if a response is not valid JSON
    /// - [`ClientError::Request`] / [`ClientError::Transport`] as for
    ///   [`send`](Self::send)
    #[instrument(skip(self, bodies, encodings, headers), fields(base_url = %self.config.base_url, batch_len = methods.len()))]
    pub async fn send_batch(
        &self,
        methods: &[Method],
        paths: &[String],
        bodies: &[Option<Value>],
        encodings: Option<&[String]>,
        headers: Option<&[BTreeMap<String, String>]>,
    ) -> Result<Vec<Value>> {
        let len = methods.len();
        if paths.len() != len || bodies.len() != len {
            return Err(ClientError::Configuration(format!(
                "batch inputs must have equal lengths: {} methods, {} paths, {} bodies",
                len,
                paths.len(),
                bodies.len()
            )));
        }
        if let Some(encodings) = encodings
            && encodings.len() != len
        {
            return Err(ClientError::Configuration(format!(
                "batch inputs must have equal lengths: {} methods, {} encodings",
                len,
                encodings.len()
            )));
        }
        if let Some(headers) = headers
            && headers.len() != len
        {
            return Err(ClientError::Configuration(format!(
                "batch inputs must have equal lengths: {} methods, {} headers",
                len,
                headers.len()
            )));
        }

        let client = session()?;
        let mut tasks = JoinSet::new();
        for index in 0..len {
            let spec = RequestSpec::resolve(
                methods[index],
                &paths[index],
                bodies[index].clone(),
                encodings.map(|e| e[index].clone()),
                headers.map(|h| h[index].clone()),
                &self.config,
            );
            let client = client.clone();
            let base_url = self.config.base_url.clone();
            tasks.spawn(async move {
                let parsed = match execute(&client, &base_url, &spec).await {
                    Ok(payload) => json_from_slice(&payload),
                    Err(err) => Err(err),
                };
                (index, parsed)
            });
        }
        join_in_order(tasks, len).await
    }

    /// Fetches the service's data flow listing.
    ///
    /// Issues `GET /dataflow`, strips the optional byte-order mark, and
    /// decodes the JSON listing.
    ///
    /// # Errors
    ///
    /// As for [`send`](Self::send), plus [`ClientError::Decode`] if the
    /// payload is not a valid flow listing.
    pub async fn get_all_dataflows(&self) -> Result<DataflowSet> {
        let payload = self.send(Method::Get, "/dataflow", None, None, None).await?;
        json_from_slice(&payload)
    }
}

/// Builds the HTTP session for one dispatch call.
///
/// Library defaults apply throughout; no timeout or pool tuning is
/// configured here.
fn session() -> Result<Client> {
    Ok(Client::builder().build()?)
}

/// Executes one prepared request against the given session.
async fn execute(client: &Client, base_url: &str, spec: &RequestSpec) -> Result<Vec<u8>> {
    let url = spec.full_url(base_url);
    info!(
        method = spec.method.as_str(),
        url = %url,
        encoding = %spec.encoding,
        body = %spec.body.as_ref().map_or_else(String::new, |b| preview(b.to_string().as_bytes())),
        "dispatching request"
    );

    let mut request = client.request(spec.method.into(), &url);
    for (name, value) in &spec.headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request = spec.apply_body(request);

    let response = request.send().await?;
    let status = response.status();
    let payload = response.bytes().await?.to_vec();

    if !status.is_success() {
        let body = String::from_utf8_lossy(&payload).into_owned();
        error!(
            method = spec.method.as_str(),
            url = %url,
            status = status.as_u16(),
            body = %preview(body.as_bytes()),
            "service returned error status"
        );
        return Err(ClientError::Request { status: status.as_u16(), body });
    }

    info!(
        method = spec.method.as_str(),
        url = %url,
        status = status.as_u16(),
        response = %preview(&payload),
        "request succeeded"
    );
    Ok(payload)
}

/// Awaits every task in the set and returns their results in spawn order.
///
/// The first sub-request failure aborts the remaining siblings and becomes
/// the error for the whole call. Aborted siblings surface as cancelled join
/// results and are skipped; a panicking task resumes its panic on the
/// caller.
async fn join_in_order<T: Send + 'static>(
    mut tasks: JoinSet<(usize, Result<T>)>,
    len: usize,
) -> Result<Vec<T>> {
    let mut slots: Vec<Option<T>> = Vec::with_capacity(len);
    slots.resize_with(len, || None);
    let mut first_error: Option<ClientError> = None;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(value))) => slots[index] = Some(value),
            Ok((_, Err(err))) => {
                if first_error.is_none() {
                    first_error = Some(err);
                    tasks.abort_all();
                }
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    std::panic::resume_unwind(join_err.into_panic());
                }
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }
    Ok(slots
        .into_iter()
        .map(|slot| slot.expect("fan-out spawns exactly one task per slot"))
        .collect())
}

/// Truncates a payload to [`LOG_PREVIEW_MAX`] characters of lossy UTF-8 for
/// logging.
fn preview(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload).chars().take(LOG_PREVIEW_MAX).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_preview_short_payload_unchanged() {
        assert_eq!(preview(b"{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_preview_truncates_to_limit() {
        let long = "x".repeat(LOG_PREVIEW_MAX + 100);
        let cut = preview(long.as_bytes());
        assert_eq!(cut.chars().count(), LOG_PREVIEW_MAX);
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let long = "ü".repeat(LOG_PREVIEW_MAX + 10);
        let cut = preview(long.as_bytes());
        assert_eq!(cut.chars().count(), LOG_PREVIEW_MAX);
    }

    #[test]
    fn test_dataflow_set_deserializes() {
        let payload = json!({
            "resources": [
                {"id": "DF_UNDATA_COUNTRYDATA", "urn": "urn:sdmx:org.sdmx.infomodel.datastructure.Dataflow=UNSD:DF_UNDATA_COUNTRYDATA(1.0)", "name": "Country data"}
            ],
            "references": {}
        });

        let flows: DataflowSet = serde_json::from_value(payload).unwrap();
        assert_eq!(flows.resources.len(), 1);
        assert_eq!(flows.resources[0].id, "DF_UNDATA_COUNTRYDATA");
        assert!(flows.resources[0].urn.starts_with("urn:sdmx"));
        assert_eq!(
            flows.resources[0].extra.get("name").and_then(Value::as_str),
            Some("Country data")
        );
    }

    #[test]
    fn test_dataflow_set_missing_references_defaults_to_null() {
        let flows: DataflowSet = serde_json::from_value(json!({"resources": []})).unwrap();
        assert!(flows.references.is_null());
    }

    #[test]
    fn test_dispatcher_new_uses_stock_defaults() {
        let dispatcher = RequestDispatcher::new("http://localhost:8080/rest");
        assert_eq!(dispatcher.config().base_url, "http://localhost:8080/rest");
        assert_eq!(dispatcher.config().default_encoding, "json");
    }

    #[test]
    fn test_dispatcher_from_config_validates() {
        let config = DispatcherConfig { base_url: "not a url".to_owned(), ..DispatcherConfig::default() };
        let result = RequestDispatcher::from_config(config);
        assert!(matches!(result.unwrap_err(), ClientError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_send_batch_rejects_mismatched_paths() {
        let dispatcher = RequestDispatcher::new("http://localhost:1/rest");
        let result = dispatcher
            .send_batch(
                &[Method::Get, Method::Get, Method::Get],
                &["/a".to_owned(), "/b".to_owned()],
                &[None, None, None],
                None,
                None,
            )
            .await;
        assert!(matches!(result.unwrap_err(), ClientError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_send_batch_rejects_mismatched_encodings() {
        let dispatcher = RequestDispatcher::new("http://localhost:1/rest");
        let result = dispatcher
            .send_batch(
                &[Method::Get],
                &["/a".to_owned()],
                &[None],
                Some(&["json".to_owned(), "csv".to_owned()]),
                None,
            )
            .await;
        assert!(matches!(result.unwrap_err(), ClientError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_send_batch_rejects_mismatched_headers() {
        let dispatcher = RequestDispatcher::new("http://localhost:1/rest");
        let result = dispatcher
            .send_batch(&[Method::Get], &["/a".to_owned()], &[None], None, Some(&[]))
            .await;
        assert!(matches!(result.unwrap_err(), ClientError::Configuration(_)));
    }
}

//! HTTP client for the UN data statistical web service.
//!
//! This library dispatches REST requests against the UN data SDMX endpoint
//! (`http://data.un.org/ws/rest` by default): single requests, repeated
//! identical concurrent requests, and batched heterogeneous concurrent
//! requests, with shared default headers, a shared body-encoding
//! convention, and one structured error taxonomy across all paths.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use undata_client::RequestDispatcher;
//!
//! # async fn example() -> undata_client::Result<()> {
//! let dispatcher = RequestDispatcher::new("http://data.un.org/ws/rest");
//!
//! let flows = dispatcher.get_all_dataflows().await?;
//! for flow in &flows.resources {
//!     println!("{}: {}", flow.id, flow.urn);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrent fan-out
//!
//! ```rust,no_run
//! use undata_client::{Method, RequestDispatcher};
//!
//! # async fn example() -> undata_client::Result<()> {
//! let dispatcher = RequestDispatcher::new("http://data.un.org/ws/rest");
//!
//! // The same request, five times, one session, results in issue order.
//! let payloads = dispatcher
//!     .send_repeated(5, Method::Get, "/dataflow", None, None, None)
//!     .await?;
//! assert_eq!(payloads.len(), 5);
//!
//! // Heterogeneous requests, each response parsed as JSON.
//! let parsed = dispatcher
//!     .send_batch(
//!         &[Method::Get, Method::Get],
//!         &["/dataflow".to_owned(), "/codelist".to_owned()],
//!         &[None, None],
//!         None,
//!         None,
//!     )
//!     .await?;
//! assert_eq!(parsed.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! Fan-out calls are all-or-nothing: the first sub-request failure aborts
//! the remaining siblings and is the one error propagated. Partial results
//! are never surfaced.
//!
//! # Module Organization
//!
//! - [`dispatch`]: the [`RequestDispatcher`] and its operations
//! - [`request`]: per-call request description and body-encoding rules
//! - [`config`]: TOML-loadable dispatcher defaults
//! - [`decode`]: byte-order-mark stripping and JSON decoding
//! - [`error`]: error taxonomy
//!
//! # Logging
//!
//! Dispatch operations emit `tracing` events carrying the method, full URL,
//! encoding tag, and a truncated payload preview. The crate never installs
//! a subscriber; wire one up in the host application to collect the events.
//!
//! # Error Handling
//!
//! All operations return [`Result<T, ClientError>`](Result). Configuration
//! errors are raised before any network I/O; HTTP and transport failures
//! are logged with context and propagated, never swallowed. There are no
//! automatic retries.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod request;

pub use config::DispatcherConfig;
pub use dispatch::{Dataflow, DataflowSet, RequestDispatcher};
pub use error::{ClientError, Result};
pub use request::{JSON_ENCODING, Method, RequestSpec};

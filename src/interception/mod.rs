// src/interception/mod.rs
//! Request interception layer
//!
//! - **Transport**: the outbound entry point and the handle it is registered in
//! - **Interceptor**: wrapper that redirects protected-origin calls to the proxy
//! - **Decision**: redirect or pass through, per call
//! - **Reconstruct**: the proxy-bound copy of a call
//! - **Call / Body**: the call model, with one-shot streamed bodies
//! - **HTTP Transport**: hyper-based transport the interceptor wraps
//!
//! # Architecture
//!
//! ```text
//! Host code
//!     │
//!     └─ FetchHandle::fetch → Interceptor ─┬─ pass-through ─────────→ HyperTransport → original URL
//!                                          └─ redirect → rebuild ───→ HyperTransport → proxy
//!                                                          (on failure, optional single retry → original URL)
//! ```

pub mod body;
pub mod call;
pub mod decision;
pub mod http_transport;
pub mod interceptor;
pub mod reconstruct;
pub mod transport;

// Re-export commonly used types
pub use body::{Body, HttpBody, OneShotStream};
pub use call::{CallOptions, CallTarget, Credentials, HeaderSource, InterceptedCall, RedirectMode, RequestDescriptor};
pub use decision::RedirectDecision;
pub use http_transport::HyperTransport;
pub use interceptor::{install, InstallOutcome, Interceptor};
pub use reconstruct::{ReconstructedCall, ORIGINAL_URL_HEADER};
pub use transport::{FetchHandle, FetchResponse, Transport};

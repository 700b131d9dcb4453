// tests/common/mod.rs
//! Shared fixtures for integration tests

#![allow(dead_code)]

use bytes::Bytes;
use futures::future::BoxFuture;
use http_body_util::{BodyExt, Full};
use hyper::header::HeaderMap;
use hyper::{Method, Response, StatusCode};
use origin_redirect::interception::{CallOptions, CallTarget, FetchResponse, InterceptedCall, Transport};
use origin_redirect::toggle::{MemoryToggleStore, ToggleController};
use origin_redirect::utils::config::{InterceptConfig, ToggleConfig};
use origin_redirect::utils::errors::{BoxError, RedirectError, Result};
use parking_lot::Mutex;
use std::sync::Arc;

pub const PREFIX: &str = "https://generativelanguage.googleapis.com/";
pub const PROXY: &str = "https://proxy.workers.test/";

/// One dispatch as seen by the transport
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: std::result::Result<Bytes, String>,
    pub had_signal: bool,
}

/// Records every dispatch and answers from a script
pub struct RecordingTransport {
    dispatched: Mutex<Vec<Dispatched>>,
    unreachable: Vec<String>,
    status: StatusCode,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Self::with_unreachable(&[])
    }

    /// Transport that fails at the network level for the given URLs
    pub fn with_unreachable(urls: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            dispatched: Mutex::new(Vec::new()),
            unreachable: urls.iter().map(|u| u.to_string()).collect(),
            status: StatusCode::OK,
        })
    }

    pub fn with_status(status: StatusCode) -> Arc<Self> {
        Arc::new(Self {
            dispatched: Mutex::new(Vec::new()),
            unreachable: Vec::new(),
            status,
        })
    }

    pub fn dispatched(&self) -> Vec<Dispatched> {
        self.dispatched.lock().clone()
    }
}

impl Transport for RecordingTransport {
    fn fetch(&self, target: CallTarget, options: CallOptions) -> BoxFuture<'_, Result<FetchResponse>> {
        Box::pin(async move {
            let call = InterceptedCall::new(target, options);
            let url = call.url().to_string();

            // Read the body the way a real transport would: once, at dispatch
            let body = match call.body().into_http() {
                Ok(body) => body
                    .collect()
                    .await
                    .map(|c| c.to_bytes())
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };

            self.dispatched.lock().push(Dispatched {
                url: url.clone(),
                method: call.method_or(&Method::GET)?,
                headers: call.headers()?,
                body,
                had_signal: call.signal().is_some(),
            });

            if self.unreachable.contains(&url) {
                return Err(RedirectError::DispatchFailed {
                    url,
                    source: "connection refused".into(),
                });
            }

            let body = Full::new(Bytes::from(format!("served by {}", url)))
                .map_err(|never| -> BoxError { match never {} })
                .boxed_unsync();
            let mut response = Response::new(body);
            *response.status_mut() = self.status;
            Ok::<_, RedirectError>(response)
        })
    }
}

pub fn toggle(enabled: bool) -> Arc<ToggleController> {
    let controller = ToggleController::load(Arc::new(MemoryToggleStore::new()), ToggleConfig::default());
    controller.set(enabled);
    controller
}

pub fn intercept_config(fallback: bool) -> Arc<InterceptConfig> {
    Arc::new(InterceptConfig {
        protected_prefix: PREFIX.to_string(),
        proxy_url: PROXY.to_string(),
        fallback_on_error: fallback,
    })
}

pub async fn body_text(response: FetchResponse) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

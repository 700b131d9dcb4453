// src/interception/http_transport.rs
//! Underlying HTTP transport on the hyper-util client
//!
//! This is the transport the interceptor wraps. It performs calls exactly as
//! given: no decision logic, no rewriting beyond what the call options ask for.

use crate::interception::body::HttpBody;
use crate::interception::call::{CallOptions, CallTarget, Credentials, InterceptedCall};
use crate::interception::transport::{FetchResponse, Transport};
use crate::utils::errors::{BoxError, RedirectError, Result};
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use hyper::header::{HeaderValue, COOKIE, REFERER};
use hyper::{Method, Request, Uri};
use hyper_util::client::legacy::connect::{Connect, HttpConnector};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, trace};

/// Transport backed by a pooled hyper client
pub struct HyperTransport<C = HttpConnector> {
    client: Client<C, HttpBody>,
}

impl HyperTransport<HttpConnector> {
    /// Plain HTTP client
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self { client }
    }
}

impl Default for HyperTransport<HttpConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> HyperTransport<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    /// Client over a custom connector, e.g. one that speaks TLS
    pub fn with_connector(connector: C) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client }
    }

    async fn send(&self, call: InterceptedCall) -> Result<FetchResponse> {
        let url = call.url().to_string();
        let uri: Uri = url
            .parse()
            .map_err(|e| RedirectError::DecisionFailed(format!("Invalid URL '{}': {}", url, e)))?;

        let method = call.method_or(&Method::GET)?;
        let mut headers = call.headers()?;

        if let Some(referrer) = call.referrer() {
            if is_absolute_http(&referrer) && !headers.contains_key(REFERER) {
                if let Ok(value) = HeaderValue::from_str(&referrer) {
                    headers.insert(REFERER, value);
                }
            }
        }

        // Omit only drops ambient cookies; explicit auth headers stay
        if call.credentials() == Some(Credentials::Omit) {
            headers.remove(COOKIE);
        }

        let signal = call.signal();

        // The body is read here and nowhere earlier
        let body = call.body().into_http()?;

        let mut request = Request::builder()
            .method(method.clone())
            .uri(uri)
            .body(body)
            .map_err(|e| RedirectError::DecisionFailed(format!("Request build error: {}", e)))?;
        *request.headers_mut() = headers;

        debug!("Dispatching {} {}", method, url);

        let pending = self.client.request(request);
        let response = match signal {
            Some(signal) => {
                tokio::select! {
                    result = pending => result,
                    _ = signal.cancelled() => {
                        debug!("Request to {} aborted by caller", url);
                        return Err(RedirectError::Aborted(url));
                    }
                }
            }
            None => pending.await,
        }
        .map_err(|e| RedirectError::DispatchFailed {
            url: url.clone(),
            source: Box::new(e),
        })?;

        trace!("Response from {}: {}", url, response.status());

        Ok(response.map(|body| body.map_err(|e| -> BoxError { Box::new(e) }).boxed_unsync()))
    }
}

impl<C> Transport for HyperTransport<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    fn fetch(&self, target: CallTarget, options: CallOptions) -> BoxFuture<'_, Result<FetchResponse>> {
        Box::pin(self.send(InterceptedCall::new(target, options)))
    }
}

fn is_absolute_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

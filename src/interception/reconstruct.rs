// src/interception/reconstruct.rs
//! Rebuilding a redirected call against the proxy

use crate::interception::body::Body;
use crate::interception::call::{CallOptions, CallTarget, Credentials, HeaderSource, InterceptedCall, RedirectMode};
use crate::utils::errors::{RedirectError, Result};
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::Method;

/// Header carrying the original URL of every redirected call. Reserved.
pub const ORIGINAL_URL_HEADER: &str = "x-original-url";

/// The call actually sent to the proxy
#[derive(Debug, Clone)]
pub struct ReconstructedCall {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Body,
    pub credentials: Option<Credentials>,
    pub redirect: Option<RedirectMode>,
    pub referrer: Option<String>,
    pub referrer_policy: Option<String>,
}

impl ReconstructedCall {
    /// Build the proxy call for `call`. The body handle is shared, never read here,
    /// and the cancellation signal is left behind.
    pub fn build(call: &InterceptedCall, proxy_url: &str) -> Result<Self> {
        let original_url = call.url();

        let mut headers = call.headers()?;
        let value = HeaderValue::from_str(original_url).map_err(|e| {
            RedirectError::DecisionFailed(format!("URL '{}' is not a valid header value: {}", original_url, e))
        })?;
        headers.insert(HeaderName::from_static(ORIGINAL_URL_HEADER), value);

        Ok(Self {
            url: proxy_url.to_string(),
            method: call.method_or(&Method::POST)?,
            headers,
            body: call.body(),
            credentials: call.credentials(),
            redirect: call.redirect(),
            referrer: call.referrer(),
            referrer_policy: call.referrer_policy(),
        })
    }

    /// Original URL as recorded in the reserved header
    pub fn original_url(&self) -> Option<&str> {
        self.headers
            .get(ORIGINAL_URL_HEADER)
            .and_then(|v| v.to_str().ok())
    }

    /// Shape the call for the underlying transport
    pub fn into_parts(self) -> (CallTarget, CallOptions) {
        let options = CallOptions {
            method: Some(self.method.as_str().to_string()),
            headers: Some(HeaderSource::Structured(self.headers)),
            body: Some(self.body),
            credentials: self.credentials,
            redirect: self.redirect,
            referrer: self.referrer,
            referrer_policy: self.referrer_policy,
            signal: None,
        };
        (CallTarget::Url(self.url), options)
    }
}

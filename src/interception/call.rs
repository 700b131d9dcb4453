// src/interception/call.rs
//! The call as seen at the transport entry point
//!
//! A call is a target (plain URL or request descriptor) plus an options bag.
//! Options take precedence over the descriptor field by field.

use crate::interception::body::Body;
use crate::utils::errors::{RedirectError, Result};
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::Method;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// Credential mode of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    Omit,
    SameOrigin,
    Include,
}

/// Redirect-follow policy of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    Follow,
    Error,
    Manual,
}

/// Headers in any of the shapes a caller may hand over
#[derive(Debug, Clone)]
pub enum HeaderSource {
    Structured(HeaderMap),
    Pairs(Vec<(String, String)>),

    /// Plain mapping in caller order; `None` values are dropped
    Plain(Vec<(String, Option<String>)>),
}

impl HeaderSource {
    /// Normalize into one case-insensitive map, last write wins
    pub fn normalize(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        match self {
            HeaderSource::Structured(map) => {
                for name in map.keys() {
                    headers.insert(name.clone(), join_values(name, map)?);
                }
            }
            HeaderSource::Pairs(pairs) => {
                for (name, value) in pairs {
                    headers.insert(parse_name(name)?, parse_value(name, value)?);
                }
            }
            HeaderSource::Plain(map) => {
                for (name, value) in map {
                    if let Some(value) = value {
                        headers.insert(parse_name(name)?, parse_value(name, value)?);
                    }
                }
            }
        }

        Ok(headers)
    }
}

impl From<HeaderMap> for HeaderSource {
    fn from(map: HeaderMap) -> Self {
        HeaderSource::Structured(map)
    }
}

impl From<Vec<(String, String)>> for HeaderSource {
    fn from(pairs: Vec<(String, String)>) -> Self {
        HeaderSource::Pairs(pairs)
    }
}

impl From<Vec<(String, Option<String>)>> for HeaderSource {
    fn from(entries: Vec<(String, Option<String>)>) -> Self {
        HeaderSource::Plain(entries)
    }
}

impl From<BTreeMap<String, Option<String>>> for HeaderSource {
    fn from(map: BTreeMap<String, Option<String>>) -> Self {
        HeaderSource::Plain(map.into_iter().collect())
    }
}

/// All values of a repeated header folded into one, comma separated
fn join_values(name: &HeaderName, map: &HeaderMap) -> Result<HeaderValue> {
    let mut values = map.get_all(name).iter();
    let first = match values.next() {
        Some(first) => first,
        None => return Ok(HeaderValue::from_static("")),
    };

    let mut joined = first.as_bytes().to_vec();
    for value in values {
        joined.extend_from_slice(b", ");
        joined.extend_from_slice(value.as_bytes());
    }

    HeaderValue::from_bytes(&joined)
        .map_err(|e| RedirectError::DecisionFailed(format!("Invalid value for header '{}': {}", name, e)))
}

fn parse_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| RedirectError::DecisionFailed(format!("Invalid header name '{}': {}", name, e)))
}

fn parse_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| RedirectError::DecisionFailed(format!("Invalid value for header '{}': {}", name, e)))
}

/// Structured request descriptor
#[derive(Debug, Clone, Default)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: Option<String>,
    pub headers: HeaderMap,
    pub body: Body,
    pub credentials: Option<Credentials>,
    pub redirect: Option<RedirectMode>,
    pub referrer: Option<String>,
    pub referrer_policy: Option<String>,
    pub signal: Option<CancellationToken>,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a value without replacing earlier ones for the same name
    pub fn append_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// Where a call is going
#[derive(Debug, Clone)]
pub enum CallTarget {
    Url(String),
    Request(RequestDescriptor),
}

impl CallTarget {
    pub fn url(&self) -> &str {
        match self {
            CallTarget::Url(url) => url,
            CallTarget::Request(req) => &req.url,
        }
    }

    fn descriptor(&self) -> Option<&RequestDescriptor> {
        match self {
            CallTarget::Url(_) => None,
            CallTarget::Request(req) => Some(req),
        }
    }
}

impl From<&str> for CallTarget {
    fn from(url: &str) -> Self {
        CallTarget::Url(url.to_string())
    }
}

impl From<String> for CallTarget {
    fn from(url: String) -> Self {
        CallTarget::Url(url)
    }
}

impl From<RequestDescriptor> for CallTarget {
    fn from(req: RequestDescriptor) -> Self {
        CallTarget::Request(req)
    }
}

/// Options bag accompanying a call
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub method: Option<String>,
    pub headers: Option<HeaderSource>,
    pub body: Option<Body>,
    pub credentials: Option<Credentials>,
    pub redirect: Option<RedirectMode>,
    pub referrer: Option<String>,
    pub referrer_policy: Option<String>,
    pub signal: Option<CancellationToken>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn headers(mut self, headers: impl Into<HeaderSource>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn redirect(mut self, redirect: RedirectMode) -> Self {
        self.redirect = Some(redirect);
        self
    }

    pub fn referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn referrer_policy(mut self, policy: impl Into<String>) -> Self {
        self.referrer_policy = Some(policy.into());
        self
    }

    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }
}

/// A call exactly as the caller issued it
#[derive(Debug, Clone)]
pub struct InterceptedCall {
    pub target: CallTarget,
    pub options: CallOptions,
}

impl InterceptedCall {
    pub fn new(target: CallTarget, options: CallOptions) -> Self {
        Self { target, options }
    }

    pub fn url(&self) -> &str {
        self.target.url()
    }

    pub fn into_parts(self) -> (CallTarget, CallOptions) {
        (self.target, self.options)
    }

    /// Options method, then descriptor method, then `default`; uppercased
    pub fn method_or(&self, default: &Method) -> Result<Method> {
        let raw = present(self.options.method.as_deref())
            .or_else(|| present(self.target.descriptor().and_then(|req| req.method.as_deref())));

        match raw {
            Some(raw) => Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).map_err(|e| {
                RedirectError::DecisionFailed(format!("Invalid method '{}': {}", raw, e))
            }),
            None => Ok(default.clone()),
        }
    }

    /// Options headers if given, otherwise the descriptor's. The two are not merged.
    pub fn headers(&self) -> Result<HeaderMap> {
        match (&self.options.headers, self.target.descriptor()) {
            (Some(source), _) => source.normalize(),
            (None, Some(req)) => HeaderSource::Structured(req.headers.clone()).normalize(),
            (None, None) => Ok(HeaderMap::new()),
        }
    }

    /// Options body if given, otherwise the descriptor's. Never reads a stream.
    pub fn body(&self) -> Body {
        match (&self.options.body, self.target.descriptor()) {
            (Some(body), _) => body.clone(),
            (None, Some(req)) => req.body.clone(),
            (None, None) => Body::Empty,
        }
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.options
            .credentials
            .or_else(|| self.target.descriptor().and_then(|req| req.credentials))
    }

    pub fn redirect(&self) -> Option<RedirectMode> {
        self.options
            .redirect
            .or_else(|| self.target.descriptor().and_then(|req| req.redirect))
    }

    pub fn referrer(&self) -> Option<String> {
        present(self.options.referrer.as_deref())
            .or_else(|| present(self.target.descriptor().and_then(|req| req.referrer.as_deref())))
            .map(String::from)
    }

    pub fn referrer_policy(&self) -> Option<String> {
        present(self.options.referrer_policy.as_deref())
            .or_else(|| present(self.target.descriptor().and_then(|req| req.referrer_policy.as_deref())))
            .map(String::from)
    }

    pub fn signal(&self) -> Option<CancellationToken> {
        self.options
            .signal
            .clone()
            .or_else(|| self.target.descriptor().and_then(|req| req.signal.clone()))
    }
}

/// Empty strings count as unset
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

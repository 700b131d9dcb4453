// src/interception/interceptor.rs
//! Redirecting wrapper around the outbound transport
//!
//! Calls for the protected origin are rebuilt against the proxy while the
//! toggle is on. Everything else goes straight to the wrapped transport.
//!
//! # Failure policy
//!
//! - malformed call: logged, sent unmodified to the original target
//! - proxy unreachable: one retry against the original target when
//!   `fallback_on_error` is set, otherwise the proxy error is returned
//! - HTTP error statuses from the proxy are ordinary responses

use crate::interception::call::{CallOptions, CallTarget, InterceptedCall};
use crate::interception::decision::RedirectDecision;
use crate::interception::reconstruct::ReconstructedCall;
use crate::interception::transport::{FetchHandle, FetchResponse, Transport};
use crate::toggle::ToggleController;
use crate::utils::config::InterceptConfig;
use crate::utils::errors::Result;
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use ulid::Ulid;

/// Whether `install` changed the registered handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyInstalled,
}

/// Transport wrapper applying the redirect policy
pub struct Interceptor {
    inner: Arc<dyn Transport>,
    toggle: Arc<ToggleController>,
    config: Arc<InterceptConfig>,
}

impl Interceptor {
    pub fn new(
        inner: Arc<dyn Transport>,
        toggle: Arc<ToggleController>,
        config: Arc<InterceptConfig>,
    ) -> Self {
        Self {
            inner,
            toggle,
            config,
        }
    }

    async fn redirect(&self, call: InterceptedCall) -> Result<FetchResponse> {
        debug!("intercepting {}", call.url());

        let rebuilt = match ReconstructedCall::build(&call, &self.config.proxy_url) {
            Ok(rebuilt) => rebuilt,
            Err(e) => {
                error!("cannot rebuild call for {}: {}; sending it unmodified", call.url(), e);
                metrics::counter!("origin_redirect_calls_total", "outcome" => "degraded").increment(1);
                let (target, options) = call.into_parts();
                return self.inner.fetch(target, options).await;
            }
        };

        let (target, options) = rebuilt.into_parts();
        match self.inner.fetch(target, options).await {
            Ok(response) => {
                debug!("proxy answered {} for {}", response.status(), call.url());
                metrics::counter!("origin_redirect_calls_total", "outcome" => "redirected").increment(1);
                Ok(response)
            }
            Err(e) if e.is_transport_failure() && self.config.fallback_on_error => {
                error!("fetch to proxy {} failed: {}", self.config.proxy_url, e);
                warn!("falling back to original URL {}", call.url());
                metrics::counter!("origin_redirect_calls_total", "outcome" => "fallback").increment(1);
                let (target, options) = call.into_parts();
                self.inner.fetch(target, options).await
            }
            Err(e) if e.is_transport_failure() => {
                error!("fetch to proxy {} failed: {}", self.config.proxy_url, e);
                metrics::counter!("origin_redirect_calls_total", "outcome" => "proxy_failed").increment(1);
                Err(e)
            }
            Err(e) => {
                error!("unexpected error redirecting {}: {}; sending it unmodified", call.url(), e);
                metrics::counter!("origin_redirect_calls_total", "outcome" => "degraded").increment(1);
                let (target, options) = call.into_parts();
                self.inner.fetch(target, options).await
            }
        }
    }
}

impl Transport for Interceptor {
    fn fetch(&self, target: CallTarget, options: CallOptions) -> BoxFuture<'_, Result<FetchResponse>> {
        let decision = RedirectDecision::evaluate(
            self.toggle.is_enabled(),
            target.url(),
            &self.config.protected_prefix,
        );

        if !decision.is_redirect() {
            return self.inner.fetch(target, options);
        }

        let span = info_span!("intercept", call_id = %Ulid::new(), url = %target.url());
        Box::pin(
            self.redirect(InterceptedCall::new(target, options))
                .instrument(span),
        )
    }

    fn is_intercepting(&self) -> bool {
        true
    }
}

/// Wrap the handler registered in `handle`. A second call is a no-op.
pub fn install(
    handle: &FetchHandle,
    toggle: Arc<ToggleController>,
    config: Arc<InterceptConfig>,
) -> InstallOutcome {
    let swapped = handle.replace_with(|current| {
        if current.is_intercepting() {
            return None;
        }
        let wrapper: Arc<dyn Transport> = Arc::new(Interceptor::new(Arc::clone(current), toggle, config));
        Some(wrapper)
    });

    if swapped {
        info!("fetch patched");
        InstallOutcome::Installed
    } else {
        debug!("fetch already patched");
        InstallOutcome::AlreadyInstalled
    }
}

// src/interception/transport.rs
//! The outbound entry point
//!
//! Every outbound call in the host application goes through one [`FetchHandle`].
//! The handle holds the currently registered [`Transport`]; installing the
//! interceptor swaps that handler for a wrapper around it.

use crate::interception::body::HttpBody;
use crate::interception::call::{CallOptions, CallTarget};
use crate::utils::errors::Result;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::sync::Arc;

/// Response returned to callers, direct or redirected alike
pub type FetchResponse = hyper::Response<HttpBody>;

/// Anything that can carry out a call
pub trait Transport: Send + Sync {
    fn fetch(&self, target: CallTarget, options: CallOptions) -> BoxFuture<'_, Result<FetchResponse>>;

    /// Marker set by wrappers that already intercept calls
    fn is_intercepting(&self) -> bool {
        false
    }
}

/// Registered handler slot for outbound calls
pub struct FetchHandle {
    current: RwLock<Arc<dyn Transport>>,
}

impl FetchHandle {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            current: RwLock::new(transport),
        }
    }

    /// Currently registered handler
    pub fn current(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.current.read())
    }

    /// Replace the handler atomically. `wrap` sees the current handler and
    /// returns `None` to leave it in place. Returns whether a swap happened.
    pub fn replace_with<F>(&self, wrap: F) -> bool
    where
        F: FnOnce(&Arc<dyn Transport>) -> Option<Arc<dyn Transport>>,
    {
        let mut current = self.current.write();
        match wrap(&current) {
            Some(next) => {
                *current = next;
                true
            }
            None => false,
        }
    }

    /// Issue a call through whatever handler is registered
    pub async fn fetch(&self, target: impl Into<CallTarget>, options: CallOptions) -> Result<FetchResponse> {
        let transport = self.current();
        transport.fetch(target.into(), options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interception::body::Body;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransport {
        calls: AtomicUsize,
    }

    impl Transport for CountingTransport {
        fn fetch(&self, _target: CallTarget, _options: CallOptions) -> BoxFuture<'_, Result<FetchResponse>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok::<_, crate::utils::errors::RedirectError>(hyper::Response::new(Body::Empty.into_http()?)) })
        }
    }

    #[tokio::test]
    async fn test_fetch_uses_registered_transport() {
        let transport = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
        });
        let handle = FetchHandle::new(transport.clone());

        handle.fetch("http://example.test/", CallOptions::new()).await.unwrap();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_replace_with_none_keeps_handler() {
        let transport: Arc<dyn Transport> = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
        });
        let handle = FetchHandle::new(Arc::clone(&transport));

        assert!(!handle.replace_with(|_| None));
        assert!(Arc::ptr_eq(&handle.current(), &transport));
    }
}

// src/interception/decision.rs
//! Per-call redirect decision

/// Outcome of inspecting a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectDecision {
    Redirect,
    PassThrough,
}

impl RedirectDecision {
    /// `Redirect` only when enabled and `url` lexically starts with `protected_prefix`
    #[inline]
    pub fn evaluate(enabled: bool, url: &str, protected_prefix: &str) -> Self {
        if enabled && url.starts_with(protected_prefix) {
            RedirectDecision::Redirect
        } else {
            RedirectDecision::PassThrough
        }
    }

    pub fn is_redirect(self) -> bool {
        self == RedirectDecision::Redirect
    }
}

// src/lib.rs
//! Origin Redirect
//!
//! Client-side interception of outbound HTTP calls: requests for one protected
//! API origin are rebuilt and sent through a proxy endpoint while a persisted
//! user switch is on. All other traffic is untouched.
//!
//! # Architecture
//!
//! - **interception**: transport entry point, redirect decision, call reconstruction
//! - **toggle**: the persisted on/off switch and its settings-panel control
//! - **bootstrap**: ready/change signal wiring for attach and install
//! - **observability**: tracing and metrics setup
//! - **utils**: configuration and errors

pub mod bootstrap;
pub mod interception;
pub mod observability;
pub mod toggle;
pub mod utils;

// Re-export commonly used types
pub use bootstrap::{Bootstrap, BootstrapReport};
pub use interception::{install, CallOptions, CallTarget, FetchHandle, HyperTransport, Interceptor, Transport};
pub use toggle::{PersistentToggle, SettingsPanel, ToggleController};
pub use utils::config::RedirectConfig;
pub use utils::errors::{RedirectError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

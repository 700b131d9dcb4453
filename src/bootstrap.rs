// src/bootstrap.rs
//! Startup and re-attachment wiring
//!
//! Waits until the host signals it is ready (or the grace period runs out),
//! then attaches the control and installs the interceptor. Every later
//! structure-change signal repeats both steps; each is idempotent.

use crate::interception::interceptor::{install, InstallOutcome};
use crate::interception::transport::FetchHandle;
use crate::toggle::{AttachOutcome, SettingsPanel, ToggleController};
use crate::utils::config::{InterceptConfig, RedirectConfig};
use futures::{Stream, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Counts from one bootstrap run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Init passes run (the first one plus one per change signal)
    pub passes: usize,

    /// Passes that inserted a new control
    pub attached: usize,

    /// Passes that installed the interceptor
    pub installed: usize,
}

/// Wires the toggle controller and the interceptor into a host
pub struct Bootstrap {
    handle: Arc<FetchHandle>,
    toggle: Arc<ToggleController>,
    panel: Arc<dyn SettingsPanel>,
    intercept: Arc<InterceptConfig>,
    init_grace: Duration,
}

impl Bootstrap {
    pub fn new(
        handle: Arc<FetchHandle>,
        toggle: Arc<ToggleController>,
        panel: Arc<dyn SettingsPanel>,
        intercept: Arc<InterceptConfig>,
        init_grace: Duration,
    ) -> Self {
        Self {
            handle,
            toggle,
            panel,
            intercept,
            init_grace,
        }
    }

    /// Build from loaded configuration
    pub fn from_config(
        handle: Arc<FetchHandle>,
        toggle: Arc<ToggleController>,
        panel: Arc<dyn SettingsPanel>,
        config: &RedirectConfig,
    ) -> Self {
        Self::new(
            handle,
            toggle,
            panel,
            Arc::new(config.intercept.clone()),
            Duration::from_millis(config.bootstrap.init_grace_ms),
        )
    }

    /// Run until the change stream ends
    pub async fn run<R, S>(&self, ready: R, changes: S) -> BootstrapReport
    where
        R: Future<Output = ()>,
        S: Stream<Item = ()>,
    {
        let mut report = BootstrapReport::default();

        tokio::select! {
            _ = ready => debug!("host ready"),
            _ = tokio::time::sleep(self.init_grace) => {
                debug!("ready signal not seen after {:?}, initializing anyway", self.init_grace);
            }
        }

        self.pass(&mut report);

        futures::pin_mut!(changes);
        while changes.next().await.is_some() {
            self.pass(&mut report);
        }

        info!(
            passes = report.passes,
            attached = report.attached,
            installed = report.installed,
            "bootstrap finished"
        );
        report
    }

    /// One attach-and-install attempt. Failures are logged, never raised.
    pub fn pass(&self, report: &mut BootstrapReport) {
        report.passes += 1;

        match self.toggle.attach(self.panel.as_ref()) {
            Ok(AttachOutcome::Attached) => report.attached += 1,
            Ok(_) => {}
            Err(e) => error!("init failed attaching control: {}", e),
        }

        let outcome = install(
            &self.handle,
            Arc::clone(&self.toggle),
            Arc::clone(&self.intercept),
        );
        if outcome == InstallOutcome::Installed {
            report.installed += 1;
        }
    }
}

// tests/bootstrap_flow.rs
//! Ready/change signal wiring

mod common;

use common::*;
use futures::StreamExt;
use origin_redirect::bootstrap::{Bootstrap, BootstrapReport};
use origin_redirect::interception::{CallOptions, FetchHandle};
use origin_redirect::toggle::{ChangeHandler, ControlSpec, MemoryToggleStore, SettingsPanel, ToggleControl, ToggleController};
use origin_redirect::utils::config::{RedirectConfig, ToggleConfig};
use origin_redirect::utils::errors::Result;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Checkbox {
    id: String,
    checked: AtomicBool,
}

impl ToggleControl for Checkbox {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_checked(&self, checked: bool) {
        self.checked.store(checked, Ordering::SeqCst);
    }

    fn is_checked(&self) -> bool {
        self.checked.load(Ordering::SeqCst)
    }
}

/// Panel whose anchor shows up only after the host renders it
#[derive(Default)]
struct LazyPanel {
    anchor: AtomicBool,
    controls: Mutex<Vec<Arc<Checkbox>>>,
    handlers: Mutex<Vec<ChangeHandler>>,
}

impl LazyPanel {
    fn rebuild(&self) {
        self.controls.lock().clear();
        self.handlers.lock().clear();
    }
}

impl SettingsPanel for LazyPanel {
    fn find_control(&self, id: &str) -> Option<Arc<dyn ToggleControl>> {
        self.controls
            .lock()
            .iter()
            .find(|c| c.id == id)
            .map(|c| Arc::clone(c) as Arc<dyn ToggleControl>)
    }

    fn has_anchor(&self, _anchor_id: &str) -> bool {
        self.anchor.load(Ordering::SeqCst)
    }

    fn insert_control(&self, spec: ControlSpec<'_>, on_change: ChangeHandler) -> Result<Arc<dyn ToggleControl>> {
        let checkbox = Arc::new(Checkbox {
            id: spec.id.to_string(),
            checked: AtomicBool::new(false),
        });
        self.controls.lock().push(Arc::clone(&checkbox));
        self.handlers.lock().push(on_change);
        Ok(checkbox)
    }
}

fn controller(persisted: Option<&str>) -> Arc<ToggleController> {
    let store = match persisted {
        Some(value) => MemoryToggleStore::with_value(value),
        None => MemoryToggleStore::new(),
    };
    ToggleController::load(Arc::new(store), ToggleConfig::default())
}

#[tokio::test]
async fn test_ready_signal_then_changes() {
    let transport = RecordingTransport::new();
    let handle = Arc::new(FetchHandle::new(transport.clone()));
    let panel = Arc::new(LazyPanel::default());
    let toggle = controller(Some("true"));

    let bootstrap = Bootstrap::new(
        Arc::clone(&handle),
        Arc::clone(&toggle),
        panel.clone(),
        intercept_config(false),
        Duration::from_secs(60),
    );

    // Host renders its settings after the first pass, then rebuilds them once.
    // The stream is lazy, so each step runs after the previous pass finished.
    let host = panel.clone();
    let changes = futures::stream::iter(0..3).map(move |step| match step {
        0 => host.anchor.store(true, Ordering::SeqCst),
        2 => host.rebuild(),
        _ => {}
    });

    let report = bootstrap.run(futures::future::ready(()), changes).await;

    assert_eq!(
        report,
        BootstrapReport {
            passes: 4,
            attached: 2,
            installed: 1,
        }
    );
    assert_eq!(panel.controls.lock().len(), 1);
    assert!(panel.controls.lock()[0].is_checked());
    assert!(handle.current().is_intercepting());
}

#[tokio::test(start_paused = true)]
async fn test_grace_period_runs_init_without_ready_signal() {
    let transport = RecordingTransport::new();
    let handle = Arc::new(FetchHandle::new(transport.clone()));
    let panel = Arc::new(LazyPanel::default());
    panel.anchor.store(true, Ordering::SeqCst);

    let config = RedirectConfig {
        intercept: (*intercept_config(false)).clone(),
        ..Default::default()
    };
    assert_eq!(config.bootstrap.init_grace_ms, 1000);
    let bootstrap = Bootstrap::from_config(Arc::clone(&handle), controller(None), panel.clone(), &config);

    let report = bootstrap
        .run(futures::future::pending::<()>(), futures::stream::empty::<()>())
        .await;

    assert_eq!(report.passes, 1);
    assert_eq!(report.attached, 1);
    assert!(handle.current().is_intercepting());
}

#[tokio::test]
async fn test_user_flip_through_attached_control_redirects() {
    let transport = RecordingTransport::new();
    let handle = Arc::new(FetchHandle::new(transport.clone()));
    let panel = Arc::new(LazyPanel::default());
    panel.anchor.store(true, Ordering::SeqCst);
    let toggle = controller(None);

    let bootstrap = Bootstrap::new(
        Arc::clone(&handle),
        Arc::clone(&toggle),
        panel.clone(),
        intercept_config(false),
        Duration::from_secs(60),
    );
    bootstrap
        .run(futures::future::ready(()), futures::stream::empty::<()>())
        .await;

    let url = format!("{}v1/models", PREFIX);
    handle.fetch(url.as_str(), CallOptions::new()).await.unwrap();

    // User ticks the box
    panel.controls.lock()[0].set_checked(true);
    (panel.handlers.lock()[0])(true);
    assert!(toggle.is_enabled());

    handle.fetch(url.as_str(), CallOptions::new()).await.unwrap();

    let sent = transport.dispatched();
    assert_eq!(sent[0].url, url);
    assert_eq!(sent[1].url, PROXY);
}

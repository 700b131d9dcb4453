// src/toggle/controller.rs
//! Owner of the `redirect_enabled` flag

use crate::toggle::panel::{ControlSpec, SettingsPanel, ToggleControl};
use crate::toggle::store::PersistentToggle;
use crate::utils::config::ToggleConfig;
use crate::utils::errors::Result;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error, info};

const ENABLED_MARKER: &str = "true";
const DISABLED_MARKER: &str = "false";

/// Result of one attachment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// A new control was inserted
    Attached,

    /// The control already exists; it was re-synced
    AlreadyPresent,

    /// The anchor control is not on the page yet
    AnchorMissing,
}

/// Holds the flag, mirrors it to storage and to the UI control
pub struct ToggleController {
    enabled: AtomicBool,
    store: Arc<dyn PersistentToggle>,
    config: ToggleConfig,
    control: Mutex<Option<Arc<dyn ToggleControl>>>,
}

impl ToggleController {
    /// Read the persisted value once; anything but `"true"` is disabled
    pub fn load(store: Arc<dyn PersistentToggle>, config: ToggleConfig) -> Arc<Self> {
        let enabled = store.read().as_deref() == Some(ENABLED_MARKER);
        debug!("{} loaded as {}", config.storage_key, enabled);

        Arc::new(Self {
            enabled: AtomicBool::new(enabled),
            store,
            config,
            control: Mutex::new(None),
        })
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Update, persist, and log. A failed write is logged and the in-memory value kept.
    pub fn set(&self, value: bool) {
        let previous = self.enabled.swap(value, Ordering::Relaxed);

        let marker = if value { ENABLED_MARKER } else { DISABLED_MARKER };
        if let Err(e) = self.store.write(marker) {
            error!("Failed to persist {}: {}", self.config.storage_key, e);
        }

        if let Some(control) = self.control.lock().as_ref() {
            if control.is_checked() != value {
                control.set_checked(value);
            }
        }

        if previous != value {
            metrics::counter!("origin_redirect_toggle_changes_total").increment(1);
        }
        info!("redirect_enabled = {}", value);
    }

    /// Attach the control to `panel`, or re-sync the one already there
    pub fn attach(self: &Arc<Self>, panel: &dyn SettingsPanel) -> Result<AttachOutcome> {
        if let Some(existing) = panel.find_control(&self.config.control_id) {
            existing.set_checked(self.is_enabled());
            *self.control.lock() = Some(existing);
            return Ok(AttachOutcome::AlreadyPresent);
        }

        if !panel.has_anchor(&self.config.anchor_id) {
            debug!("anchor {} not present yet", self.config.anchor_id);
            return Ok(AttachOutcome::AnchorMissing);
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        let on_change = Box::new(move |checked: bool| {
            if let Some(controller) = weak.upgrade() {
                controller.set(checked);
            }
        });

        let spec = ControlSpec {
            id: &self.config.control_id,
            label: &self.config.label,
            anchor_id: &self.config.anchor_id,
        };
        let control = panel.insert_control(spec, on_change)?;
        control.set_checked(self.is_enabled());
        *self.control.lock() = Some(control);

        info!("control {} attached", self.config.control_id);
        Ok(AttachOutcome::Attached)
    }
}

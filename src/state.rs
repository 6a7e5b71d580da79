//! # Scan State
//!
//! Finite-state controller for one scan slot:
//!
//! ```text
//! Idle ──begin_scan──▶ Scanning ──succeed──▶ Success
//!  ▲                      │                     │
//!  │                      └──────fail─────▶ Error
//!  └──────────reset (new selection / no selection)┘
//! ```
//!
//! The controller owns everything a UI shows about progress: the status line,
//! the badge, the error panel and whether the scan trigger is enabled. The
//! trigger is disabled exactly while `Scanning`; `begin_scan` refuses to enter
//! `Scanning` twice, which is the single-flight gate for the whole pipeline.

use std::fmt;

use tracing::debug;

use crate::error::{ScanError, ScanResult};

pub const WAITING_MESSAGE: &str = "Waiting for an image";
pub const SCANNING_MESSAGE: &str = "Analyzing…";
pub const LIVE_BADGE: &str = "LIVE";

/// Exactly one of these is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Idle,
    Scanning,
    Success,
    Error,
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScanStatus::Idle => "idle",
            ScanStatus::Scanning => "scanning",
            ScanStatus::Success => "success",
            ScanStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// Everything the UI sinks display about the current status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub status: ScanStatus,
    pub message: String,
    pub badge: Option<String>,
    /// Error panel text; `None` means the panel is hidden.
    pub error: Option<String>,
    pub trigger_enabled: bool,
}

impl StatusView {
    fn idle(message: impl Into<String>) -> Self {
        Self {
            status: ScanStatus::Idle,
            message: message.into(),
            badge: None,
            error: None,
            trigger_enabled: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanStateController {
    view: StatusView,
}

impl Default for ScanStateController {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanStateController {
    pub fn new() -> Self {
        Self {
            view: StatusView::idle(WAITING_MESSAGE),
        }
    }

    pub fn view(&self) -> &StatusView {
        &self.view
    }

    pub fn status(&self) -> ScanStatus {
        self.view.status
    }

    /// True while a scan holds the slot.
    pub fn is_busy(&self) -> bool {
        self.view.status == ScanStatus::Scanning
    }

    /// Hide the error panel without changing status.
    pub fn clear_error(&mut self) {
        self.view.error = None;
    }

    /// Return to `Idle` with `message`. Refused while scanning.
    pub fn reset(&mut self, message: impl Into<String>) -> ScanResult<()> {
        if self.is_busy() {
            return Err(ScanError::busy().with_operation("reset"));
        }
        self.transition(StatusView::idle(message));
        Ok(())
    }

    /// Enter `Scanning` and disable the trigger.
    ///
    /// # Errors
    ///
    /// `ScanError::Busy` if a scan is already running; state is left untouched.
    pub fn begin_scan(&mut self) -> ScanResult<()> {
        if self.is_busy() {
            return Err(ScanError::busy().with_operation("begin scan"));
        }
        self.transition(StatusView {
            status: ScanStatus::Scanning,
            message: SCANNING_MESSAGE.to_string(),
            badge: None,
            error: None,
            trigger_enabled: false,
        });
        Ok(())
    }

    /// Leave `Scanning` with `count` recognized items.
    pub fn succeed(&mut self, count: usize) {
        let noun = if count == 1 { "item" } else { "items" };
        self.transition(StatusView {
            status: ScanStatus::Success,
            message: format!("Found {} {}", count, noun),
            badge: Some(LIVE_BADGE.to_string()),
            error: None,
            trigger_enabled: true,
        });
    }

    /// Leave `Scanning` with `error` surfaced on the error panel.
    pub fn fail(&mut self, error: &ScanError) {
        self.transition(StatusView {
            status: ScanStatus::Error,
            message: error.status_label().to_string(),
            badge: None,
            error: Some(error.user_message()),
            trigger_enabled: true,
        });
    }

    fn transition(&mut self, next: StatusView) {
        debug!(from = %self.view.status, to = %next.status, message = %next.message, "scan state transition");
        self.view = next;
    }
}

//! # Scan Session
//!
//! Top-level coordination of the capture-to-result pipeline. A session owns
//! the single "selected image" slot, the state controller and the current
//! result rows, and pushes every change to a [`ScanSink`].
//!
//! ## Flow
//!
//! 1. [`ScanSession::select`] replaces the selection and resets the results
//! 2. [`ScanSession::scan`] enters `Scanning`, normalizes the image, uploads it
//!    through the [`RecognitionClient`], classifies the response and ends in
//!    `Success` or `Error`
//!
//! ## Single Flight
//!
//! Session state sits behind a `std::sync::Mutex` that is only held between
//! await points. The controller's busy gate makes a second `scan` or `select`
//! during a scan fail fast with `ScanError::Busy`; nothing is queued. A guard
//! finishes the scan on every exit path, including a dropped future, so the
//! trigger is always re-enabled.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::normalize::{ImageNormalizer, SelectedImage};
use crate::recognition::{ClassificationItem, RecognitionClient, classify_response};
use crate::render::{DisplayRow, Placeholder, render};
use crate::state::{ScanStateController, ScanStatus, StatusView, WAITING_MESSAGE};

/// Output side of a session: the status line, badge, error panel, trigger and
/// result list of whatever UI is attached.
pub trait ScanSink: Send {
    fn status_changed(&mut self, view: &StatusView);

    fn results_changed(&mut self, rows: &[DisplayRow]);

    fn selection_changed(&mut self, _selected: Option<&SelectedImage>) {}
}

impl<S: ScanSink + ?Sized> ScanSink for Box<S> {
    fn status_changed(&mut self, view: &StatusView) {
        (**self).status_changed(view)
    }

    fn results_changed(&mut self, rows: &[DisplayRow]) {
        (**self).results_changed(rows)
    }

    fn selection_changed(&mut self, selected: Option<&SelectedImage>) {
        (**self).selection_changed(selected)
    }
}

/// Sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ScanSink for NullSink {
    fn status_changed(&mut self, _view: &StatusView) {}

    fn results_changed(&mut self, _rows: &[DisplayRow]) {}
}

struct SessionState<S> {
    selected: Option<SelectedImage>,
    controller: ScanStateController,
    rows: Vec<DisplayRow>,
    sink: S,
}

impl<S: ScanSink> SessionState<S> {
    fn publish_status(&mut self) {
        self.sink.status_changed(self.controller.view());
    }

    fn set_rows(&mut self, rows: Vec<DisplayRow>) {
        self.rows = rows;
        self.sink.results_changed(&self.rows);
    }

    fn finish(&mut self, outcome: &ScanResult<Vec<ClassificationItem>>) -> ScanStatus {
        match outcome {
            Ok(items) => {
                info!(count = items.len(), "scan succeeded");
                self.controller.succeed(items.len());
                self.set_rows(render(Some(items)));
            }
            Err(e) => {
                warn!(category = e.category(), error = %e, "scan failed");
                self.controller.fail(e);
                self.set_rows(vec![DisplayRow::Placeholder(Placeholder::Failed)]);
            }
        }
        self.publish_status();
        self.controller.status()
    }
}

fn lock_state<S>(inner: &Mutex<SessionState<S>>) -> MutexGuard<'_, SessionState<S>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ends the scan it was created for exactly once.
struct ScanGuard<'a, S: ScanSink> {
    inner: &'a Mutex<SessionState<S>>,
    finished: bool,
}

impl<'a, S: ScanSink> ScanGuard<'a, S> {
    fn new(inner: &'a Mutex<SessionState<S>>) -> Self {
        Self {
            inner,
            finished: false,
        }
    }

    fn finish(mut self, outcome: ScanResult<Vec<ClassificationItem>>) -> ScanStatus {
        self.finished = true;
        lock_state(self.inner).finish(&outcome)
    }
}

impl<S: ScanSink> Drop for ScanGuard<'_, S> {
    fn drop(&mut self) {
        if !self.finished {
            let interrupted = ScanError::network("scan")
                .with_context("scan ended before a response was classified");
            lock_state(self.inner).finish(&Err(interrupted));
        }
    }
}

/// High-level session that orchestrates selection, normalization, upload and
/// result display.
pub struct ScanSession<C, S> {
    client: C,
    normalizer: ImageNormalizer,
    inner: Mutex<SessionState<S>>,
}

impl<C: RecognitionClient, S: ScanSink> ScanSession<C, S> {
    /// Create a session in `Idle` with the "no results yet" placeholder and
    /// publish that initial state to `sink`.
    pub fn new(config: &ScanConfig, client: C, sink: S) -> Self {
        Self::with_normalizer(ImageNormalizer::from_config(config), client, sink)
    }

    pub fn with_normalizer(normalizer: ImageNormalizer, client: C, sink: S) -> Self {
        let mut state = SessionState {
            selected: None,
            controller: ScanStateController::new(),
            rows: Vec::new(),
            sink,
        };
        state.set_rows(vec![DisplayRow::Placeholder(Placeholder::NotScanned)]);
        state.publish_status();

        Self {
            client,
            normalizer,
            inner: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState<S>> {
        lock_state(&self.inner)
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn status(&self) -> ScanStatus {
        self.lock().controller.status()
    }

    pub fn view(&self) -> StatusView {
        self.lock().controller.view().clone()
    }

    pub fn rows(&self) -> Vec<DisplayRow> {
        self.lock().rows.clone()
    }

    pub fn selected_name(&self) -> Option<String> {
        self.lock().selected.as_ref().map(|image| image.name.clone())
    }

    /// Replace the selection (or clear it with `None`).
    ///
    /// # Errors
    ///
    /// `ScanError::Busy` while a scan is running; the selection is unchanged.
    pub fn select(&self, image: Option<SelectedImage>) -> ScanResult<()> {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.controller.is_busy() {
            warn!("selection changed during a scan; rejected");
            return Err(ScanError::busy().with_operation("select"));
        }

        let message = match &image {
            Some(image) => format!("Ready to scan {}", image.name),
            None => WAITING_MESSAGE.to_string(),
        };
        debug!(name = ?image.as_ref().map(|i| i.name.as_str()), "selection replaced");

        state.selected = image;
        state.sink.selection_changed(state.selected.as_ref());
        state.controller.reset(message)?;
        state.set_rows(vec![DisplayRow::Placeholder(Placeholder::NotScanned)]);
        state.publish_status();
        Ok(())
    }

    /// Run one scan of the current selection.
    ///
    /// Returns the terminal status (`Success` or `Error`), or `Idle` when
    /// nothing is selected. Scan failures are reported through the state, not
    /// as `Err`.
    ///
    /// # Errors
    ///
    /// `ScanError::Busy` if another scan is in flight; state is untouched.
    pub async fn scan(&self) -> ScanResult<ScanStatus> {
        let selected = {
            let mut state = self.lock();
            if state.controller.is_busy() {
                warn!("scan requested while another scan is running; rejected");
                return Err(ScanError::busy().with_operation("scan"));
            }
            state.controller.clear_error();

            match state.selected.clone() {
                Some(selected) => {
                    state.controller.begin_scan()?;
                    state.publish_status();
                    selected
                }
                None => {
                    info!("scan requested without a selection");
                    state.controller.reset(ScanError::no_selection().user_message())?;
                    state.publish_status();
                    return Ok(ScanStatus::Idle);
                }
            }
        };

        let guard = ScanGuard::new(&self.inner);
        info!(name = %selected.name, bytes = selected.len(), "scan started");
        let outcome = self.exchange(selected).await;
        Ok(guard.finish(outcome))
    }

    /// Select `image` and scan it.
    pub async fn scan_image(&self, image: SelectedImage) -> ScanResult<ScanStatus> {
        self.select(Some(image))?;
        self.scan().await
    }

    async fn exchange(&self, selected: SelectedImage) -> ScanResult<Vec<ClassificationItem>> {
        let normalized = self.normalizer.normalize_async(selected).await;
        debug!(outcome = ?normalized.outcome, bytes = normalized.len(), "image normalized");

        let response = self.client.submit(&normalized).await?;
        classify_response(&response)
    }
}

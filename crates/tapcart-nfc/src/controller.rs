//! # Tag Scan Controller
//!
//! Owns the NFC module lifecycle and turns taps into menu items.
//!
//! ## Controller Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        NfcController                                    │
//! │                                                                         │
//! │  probe (once) ──► initialize ──► check_enabled                         │
//! │                                                                         │
//! │  read_tag ─────────────┐        start_continuous_scan                  │
//! │                        │               │ spawn                          │
//! │                        ▼               ▼                                │
//! │              ┌──────────────────────────────────────┐                  │
//! │              │  tech slot (tokio Mutex)             │  one technology  │
//! │              │  deadline(slot + request + get_tag)  │  request at a    │
//! │              │  cancel_technology_request (always)  │  time            │
//! │              └──────────────────┬───────────────────┘                  │
//! │                                 │ TagPayload                            │
//! │                                 ▼                                       │
//! │              DetectionGate ──► MenuLookup ──► ScanListener              │
//! │                                     │                                   │
//! │                                     └──► UserNotifier (miss / failure)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Poll Loop
//! ```text
//!  loop until session token cancelled:
//!    read (poll timeout) ─┬─ tag ──────► handle_tag_detected, sleep post-read cooldown
//!                         ├─ failed ───► count; N in a row ► on_error(RepeatedReadFailures)
//!                         └─ timeout / empty / malformed ► nothing
//!    sleep poll interval
//! ```
//!
//! Public operations never return errors. Absent hardware is a normal,
//! silent condition: everything degrades to `false`, `None` or a no-op
//! handle.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use tapcart_core::ndef;
use tapcart_core::validation::validate_tag_payload;
use tapcart_core::{CoreError, TagPayload};

use crate::adapter::{AdapterResult, NfcAdapter, NfcTech, TagRecord};
use crate::config::ScannerConfig;
use crate::error::{AdapterError, LookupError, ScanError};
use crate::gate::{DetectionGate, GateState};
use crate::listener::ScanListener;
use crate::lookup::MenuLookup;
use crate::notify::{NoOpNotifier, Notice, UserNotifier};
use crate::session::{ScanHandle, ScanSession};

// =============================================================================
// Availability & Status
// =============================================================================

/// Whether the NFC module can be used in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleAvailability {
    /// Not probed yet.
    Unknown,
    Available,
    /// The native module is not present in this runtime. Silent.
    Missing,
    /// The module is present but the device has no NFC hardware.
    Unsupported,
}

impl ModuleAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, ModuleAvailability::Available)
    }
}

impl fmt::Display for ModuleAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleAvailability::Unknown => write!(f, "unknown"),
            ModuleAvailability::Available => write!(f, "available"),
            ModuleAvailability::Missing => write!(f, "missing"),
            ModuleAvailability::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Snapshot of the controller for UI and diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerStatus {
    pub availability: ModuleAvailability,
    pub initialized: bool,
    pub scanning: bool,
    pub gate: GateState,
    pub session_id: Option<Uuid>,
}

/// Result of [`NfcController::handle_tag_detected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// The listener received the resolved item.
    Delivered,
    /// Another detection is processing or cooling down; this one was dropped.
    Suppressed,
    /// The menu has no item with the tag's id.
    NotFound,
    /// The menu backend failed.
    LookupFailed,
}

/// How a single read ended.
#[derive(Debug)]
enum ReadOutcome {
    Tag(TagPayload),
    NoTag,
    TimedOut,
    Cancelled,
    Malformed(CoreError),
    Failed(AdapterError),
}

// =============================================================================
// Controller
// =============================================================================

struct ControllerState {
    availability: ModuleAvailability,
    initialized: bool,
    session: Option<ScanSession>,
}

struct Inner {
    adapter: Arc<dyn NfcAdapter>,
    menu: Arc<dyn MenuLookup>,
    notifier: Arc<dyn UserNotifier>,
    config: ScannerConfig,
    gate: DetectionGate,

    /// Never held across an `.await`.
    state: Mutex<ControllerState>,

    /// Shares the single `is_supported` probe between concurrent callers.
    probe: OnceCell<ModuleAvailability>,

    /// Serializes `start` calls.
    init_lock: tokio::sync::Mutex<()>,

    /// Held for the whole request → read/write → release sequence.
    tech_slot: tokio::sync::Mutex<()>,
}

/// The Tag Scan Controller. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct NfcController {
    inner: Arc<Inner>,
}

impl NfcController {
    /// Creates a controller with a no-op notifier and default config.
    pub fn new(adapter: Arc<dyn NfcAdapter>, menu: Arc<dyn MenuLookup>) -> Self {
        NfcControllerBuilder::new(adapter, menu).build()
    }

    pub fn builder(adapter: Arc<dyn NfcAdapter>, menu: Arc<dyn MenuLookup>) -> NfcControllerBuilder {
        NfcControllerBuilder::new(adapter, menu)
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.inner.config
    }

    /// Returns a snapshot of the controller state.
    pub fn status(&self) -> ScannerStatus {
        let state = self.state();
        ScannerStatus {
            availability: state.availability,
            initialized: state.initialized,
            scanning: state.session.is_some(),
            gate: self.inner.gate.state(),
            session_id: state.session.as_ref().map(|s| s.id),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Returns true if the NFC module can be used.
    ///
    /// The adapter is probed once per controller; later calls use the cached
    /// result (which `initialize` may downgrade to `Missing`).
    pub async fn check_module_availability(&self) -> bool {
        self.availability().await.is_available()
    }

    async fn availability(&self) -> ModuleAvailability {
        let probed = *self.inner.probe.get_or_init(|| self.probe()).await;

        let mut state = self.state();
        if state.availability == ModuleAvailability::Unknown {
            state.availability = probed;
        }
        state.availability
    }

    async fn probe(&self) -> ModuleAvailability {
        let availability = match self.inner.adapter.is_supported().await {
            Ok(true) => ModuleAvailability::Available,
            Ok(false) => ModuleAvailability::Unsupported,
            Err(e) => {
                debug!(error = %e, "NFC module not present in this runtime");
                ModuleAvailability::Missing
            }
        };
        info!(%availability, device = %self.inner.config.device.name, "NFC module probed");
        availability
    }

    /// Starts the adapter. Idempotent; returns false when NFC cannot be used.
    pub async fn initialize(&self) -> bool {
        if self.state().initialized {
            return true;
        }

        match self.availability().await {
            ModuleAvailability::Available => {}
            ModuleAvailability::Unsupported => {
                if self.inner.config.is_development() {
                    debug!("NFC not supported (development build, not reporting)");
                } else {
                    info!("NFC not supported on this device");
                    self.inner.notifier.notify(Notice::NotSupported);
                }
                return false;
            }
            other => {
                debug!(availability = %other, "Skipping NFC initialization");
                return false;
            }
        }

        let _init = self.inner.init_lock.lock().await;
        if self.state().initialized {
            return true;
        }

        match self.inner.adapter.start().await {
            Ok(()) => {
                self.state().initialized = true;
                info!("NFC initialized");
                true
            }
            Err(e) if e.is_module_missing() => {
                warn!(error = %e, "NFC native module missing, disabling NFC");
                self.state().availability = ModuleAvailability::Missing;
                false
            }
            Err(e) => {
                error!(error = %e, "NFC initialization error");
                false
            }
        }
    }

    /// Returns true if NFC is switched on. Errors read as false.
    pub async fn check_enabled(&self) -> bool {
        if !self.check_module_availability().await {
            return false;
        }

        match self.inner.adapter.is_enabled().await {
            Ok(enabled) => enabled,
            Err(e) => {
                warn!(error = %e, "Error checking NFC status");
                false
            }
        }
    }

    // =========================================================================
    // One-shot Read
    // =========================================================================

    /// Reads one tag with the manual timeout.
    pub async fn read_tag(&self) -> Option<TagPayload> {
        self.read_tag_with_timeout(self.inner.config.manual_read_timeout())
            .await
    }

    /// Reads one tag, giving up after `timeout`.
    ///
    /// The timeout covers the technology request and the tag read. Timeouts
    /// and user cancellations come back as `None` without a notice.
    pub async fn read_tag_with_timeout(&self, timeout: Duration) -> Option<TagPayload> {
        if !self.check_module_availability().await {
            return None;
        }
        if !self.initialize().await {
            return None;
        }

        match self.read_once(timeout, None).await {
            ReadOutcome::Tag(payload) => Some(payload),
            _ => None,
        }
    }

    /// One read, optionally abandoned as soon as `cancel` fires.
    async fn read_once(&self, timeout: Duration, cancel: Option<&CancellationToken>) -> ReadOutcome {
        let outcome = match cancel {
            Some(token) => {
                let finished = tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    outcome = self.read_with_timeout(timeout) => Some(outcome),
                };
                match finished {
                    Some(outcome) => outcome,
                    None => {
                        // The read was dropped mid-flight; give the radio back.
                        let _slot = self.inner.tech_slot.lock().await;
                        self.release_technology().await;
                        ReadOutcome::Cancelled
                    }
                }
            }
            None => self.read_with_timeout(timeout).await,
        };

        self.report_read(&outcome);
        outcome
    }

    /// The deadline covers waiting for the technology slot as well as the
    /// request and read themselves.
    async fn read_with_timeout(&self, timeout: Duration) -> ReadOutcome {
        let deadline = Instant::now() + timeout;
        let Ok(_slot) = tokio::time::timeout_at(deadline, self.inner.tech_slot.lock()).await else {
            debug!("Technology slot busy until the read deadline");
            return ReadOutcome::TimedOut;
        };
        let result = tokio::time::timeout_at(deadline, self.request_and_get_tag()).await;
        self.release_technology().await;

        match result {
            Err(_elapsed) => ReadOutcome::TimedOut,
            Ok(Ok(Some(tag))) => Self::decode_tag(&tag),
            Ok(Ok(None)) => ReadOutcome::NoTag,
            Ok(Err(e)) if e.is_user_cancellation() => ReadOutcome::Cancelled,
            Ok(Err(AdapterError::Timeout)) => ReadOutcome::TimedOut,
            Ok(Err(e)) => ReadOutcome::Failed(e),
        }
    }

    async fn request_and_get_tag(&self) -> AdapterResult<Option<TagRecord>> {
        self.inner.adapter.request_technology(NfcTech::Ndef).await?;
        self.inner.adapter.get_tag().await
    }

    /// Only the first record is read, and only if it is a text record.
    fn decode_tag(tag: &TagRecord) -> ReadOutcome {
        match tag.first_record() {
            Some(record) if record.is_text() => match ndef::payload_from_record(record) {
                Ok(payload) => ReadOutcome::Tag(payload),
                Err(e) => ReadOutcome::Malformed(e),
            },
            Some(record) => {
                debug!(tnf = record.tnf, "First NDEF record is not text, ignoring tag");
                ReadOutcome::NoTag
            }
            None => ReadOutcome::NoTag,
        }
    }

    /// Logs the outcome and posts a notice when not in continuous-scan mode.
    fn report_read(&self, outcome: &ReadOutcome) {
        let scanning = self.state().session.is_some();
        match outcome {
            ReadOutcome::Tag(payload) => {
                debug!(menu_item_id = %payload.menu_item_id, "Tag read");
            }
            ReadOutcome::NoTag => debug!("Tag carried no menu data"),
            ReadOutcome::TimedOut => debug!("NFC read timed out"),
            ReadOutcome::Cancelled => debug!("NFC read cancelled"),
            ReadOutcome::Malformed(e) => {
                warn!(error = %e, "Error parsing NFC data");
                if !scanning {
                    self.inner.notifier.notify(Notice::InvalidTag);
                }
            }
            ReadOutcome::Failed(e) => {
                warn!(error = %e, "NFC read error");
                if !scanning {
                    self.inner.notifier.notify(Notice::ReadFailed);
                }
            }
        }
    }

    async fn release_technology(&self) {
        if let Err(e) = self.inner.adapter.cancel_technology_request().await {
            debug!(error = %e, "Ignoring technology release error");
        }
    }

    // =========================================================================
    // Continuous Scan
    // =========================================================================

    /// Starts polling for tags until the returned handle (or `cleanup`)
    /// stops it.
    ///
    /// While a scan is running, further calls return a handle bound to the
    /// same session instead of starting a second loop.
    pub async fn start_continuous_scan(&self, listener: Arc<dyn ScanListener>) -> ScanHandle {
        if let Some(session) = self.current_session() {
            debug!(session_id = %session.id, "Continuous scan already running");
            return ScanHandle::bound(self.clone(), session);
        }

        if !self.check_module_availability().await {
            debug!("NFC module unavailable, continuous scan not started");
            return ScanHandle::noop();
        }
        if !self.check_enabled().await {
            listener.on_error(&ScanError::NotEnabled);
            return ScanHandle::noop();
        }
        if !self.initialize().await {
            listener.on_error(&ScanError::InitializationFailed);
            return ScanHandle::noop();
        }

        let session = {
            let mut state = self.state();
            if let Some(existing) = &state.session {
                // Another caller won the race while we were checking.
                return ScanHandle::bound(self.clone(), existing.clone());
            }
            let session = ScanSession::new();
            state.session = Some(session.clone());
            session
        };

        info!(session_id = %session.id, "Continuous scan started");
        let span = info_span!("scan_session", session_id = %session.id);
        tokio::spawn(
            self.clone()
                .run_scan_loop(session.clone(), listener)
                .instrument(span),
        );

        ScanHandle::bound(self.clone(), session)
    }

    fn current_session(&self) -> Option<ScanSession> {
        self.state().session.clone()
    }

    async fn run_scan_loop(self, session: ScanSession, listener: Arc<dyn ScanListener>) {
        let token = &session.token;
        let config = &self.inner.config;
        let limit = config.max_consecutive_failures();
        let mut failures: u32 = 0;

        while !token.is_cancelled() {
            match self.read_once(config.poll_read_timeout(), Some(token)).await {
                ReadOutcome::Tag(payload) => {
                    failures = 0;
                    let handled = tokio::select! {
                        biased;
                        _ = token.cancelled() => false,
                        _ = self.handle_tag_detected(&payload, listener.as_ref()) => true,
                    };
                    if !handled || !pause(config.post_read_cooldown(), token).await {
                        break;
                    }
                }
                ReadOutcome::NoTag | ReadOutcome::Malformed(_) => failures = 0,
                ReadOutcome::Failed(last) => {
                    failures += 1;
                    if limit > 0 && failures >= limit {
                        warn!(count = failures, error = %last, "Repeated NFC read failures");
                        listener.on_error(&ScanError::RepeatedReadFailures {
                            count: failures,
                            last,
                        });
                        failures = 0;
                    }
                }
                ReadOutcome::TimedOut | ReadOutcome::Cancelled => {}
            }

            if !pause(config.poll_interval(), token).await {
                break;
            }
        }

        debug!("Scan loop exited");
    }

    /// Ends `session` if it is still the current one, then cancels it.
    pub(crate) async fn end_session(&self, session: &ScanSession) {
        let was_current = {
            let mut state = self.state();
            match &state.session {
                Some(current) if current.id == session.id => {
                    state.session = None;
                    true
                }
                _ => false,
            }
        };
        session.token.cancel();

        if was_current {
            info!(session_id = %session.id, "Continuous scan stopped");
            self.release_technology().await;
        }
    }

    // =========================================================================
    // Detection
    // =========================================================================

    /// Resolves a scanned payload and hands it to the listener, unless another
    /// detection is processing or cooling down.
    pub async fn handle_tag_detected(
        &self,
        payload: &TagPayload,
        listener: &dyn ScanListener,
    ) -> DetectionOutcome {
        let Some(_permit) = self.inner.gate.try_enter() else {
            debug!(menu_item_id = %payload.menu_item_id, "Duplicate detection suppressed");
            return DetectionOutcome::Suppressed;
        };

        match self.inner.menu.get_by_id(&payload.menu_item_id).await {
            Ok(item) => {
                info!(menu_item_id = %item.id, name = %item.name, "Menu item scanned");
                listener.on_tag_detected(&item, payload);
                DetectionOutcome::Delivered
            }
            Err(LookupError::NotFound(id)) => {
                info!(menu_item_id = %id, "Scanned menu item not found");
                self.inner.notifier.notify(Notice::ItemNotFound { menu_item_id: id });
                DetectionOutcome::NotFound
            }
            Err(e) => {
                warn!(error = %e, menu_item_id = %payload.menu_item_id, "Menu lookup failed");
                self.inner.notifier.notify(Notice::LookupFailed);
                DetectionOutcome::LookupFailed
            }
        }
    }

    // =========================================================================
    // Write
    // =========================================================================

    /// Writes `payload` to the next tag presented. Returns true on success.
    pub async fn write_tag(&self, payload: &TagPayload) -> bool {
        if !self.check_module_availability().await {
            return false;
        }
        if !self.initialize().await {
            return false;
        }

        if let Err(e) = validate_tag_payload(payload) {
            warn!(error = %e, "Refusing to write invalid tag payload");
            self.inner.notifier.notify(Notice::InvalidTag);
            return false;
        }

        let bytes = match ndef::encode_tag_payload(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "Failed to encode tag payload");
                self.inner.notifier.notify(Notice::WriteFailed);
                return false;
            }
        };

        let deadline = Instant::now() + self.inner.config.write_timeout();
        let Ok(_slot) = tokio::time::timeout_at(deadline, self.inner.tech_slot.lock()).await else {
            warn!("Technology slot busy until the write deadline");
            self.inner.notifier.notify(Notice::WriteFailed);
            return false;
        };
        let result = tokio::time::timeout_at(deadline, self.request_and_write(&bytes)).await;
        self.release_technology().await;

        match result {
            Ok(Ok(())) => {
                info!(menu_item_id = %payload.menu_item_id, "Menu item written to tag");
                self.inner.notifier.notify(Notice::WriteSucceeded);
                true
            }
            Ok(Err(e)) => {
                error!(error = %e, "NFC write error");
                self.inner.notifier.notify(Notice::WriteFailed);
                false
            }
            Err(_elapsed) => {
                warn!("NFC write timed out");
                self.inner.notifier.notify(Notice::WriteFailed);
                false
            }
        }
    }

    async fn request_and_write(&self, bytes: &[u8]) -> AdapterResult<()> {
        self.inner.adapter.request_technology(NfcTech::Ndef).await?;
        self.inner.adapter.write_message(bytes).await
    }

    // =========================================================================
    // Cleanup & Settings
    // =========================================================================

    /// Stops any active scan and releases any pending technology request.
    /// Safe to call at any time.
    pub async fn cleanup(&self) {
        let (session, available) = {
            let mut state = self.state();
            (state.session.take(), state.availability.is_available())
        };

        if let Some(session) = session {
            session.token.cancel();
            info!(session_id = %session.id, "Continuous scan stopped by cleanup");
        }
        self.inner.gate.reset();

        if available {
            self.release_technology().await;
        }
    }

    /// Sends the user to the NFC settings, or tells them how to get there.
    pub async fn open_settings(&self) {
        if !self.check_module_availability().await {
            self.inner.notifier.notify(Notice::RequiresNativeBuild);
            return;
        }

        let platform = self.inner.adapter.platform();
        if platform.has_settings_intent() {
            if let Err(e) = self.inner.adapter.open_platform_settings().await {
                error!(error = %e, ?platform, "Error opening NFC settings");
            }
        } else {
            self.inner.notifier.notify(Notice::EnableInSettings);
        }
    }
}

impl fmt::Debug for NfcController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NfcController")
            .field("status", &self.status())
            .finish()
    }
}

/// Sleeps `duration` unless `token` fires first. Returns false if cancelled.
async fn pause(duration: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for [`NfcController`].
pub struct NfcControllerBuilder {
    adapter: Arc<dyn NfcAdapter>,
    menu: Arc<dyn MenuLookup>,
    notifier: Option<Arc<dyn UserNotifier>>,
    config: Option<ScannerConfig>,
}

impl NfcControllerBuilder {
    pub fn new(adapter: Arc<dyn NfcAdapter>, menu: Arc<dyn MenuLookup>) -> Self {
        NfcControllerBuilder {
            adapter,
            menu,
            notifier: None,
            config: None,
        }
    }

    /// Sets the user notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn UserNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Sets the scanner configuration.
    pub fn with_config(mut self, config: ScannerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> NfcController {
        let config = self.config.unwrap_or_default();
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(NoOpNotifier));

        NfcController {
            inner: Arc::new(Inner {
                adapter: self.adapter,
                menu: self.menu,
                notifier,
                gate: DetectionGate::new(config.detection_cooldown()),
                config,
                state: Mutex::new(ControllerState {
                    availability: ModuleAvailability::Unknown,
                    initialized: false,
                    session: None,
                }),
                probe: OnceCell::new(),
                init_lock: tokio::sync::Mutex::new(()),
                tech_slot: tokio::sync::Mutex::new(()),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

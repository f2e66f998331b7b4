//! Scripted adapter and recording sinks for controller tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tapcart_core::ndef::NdefRecord;
use tapcart_core::{MenuItem, TagPayload};

use crate::adapter::{AdapterResult, NfcAdapter, NfcTech, Platform, TagRecord};
use crate::error::{AdapterError, LookupError, ScanError};
use crate::listener::ScanListener;
use crate::lookup::{InMemoryMenu, MenuLookup};
use crate::notify::{Notice, UserNotifier};

// =============================================================================
// Scripted Adapter
// =============================================================================

/// What the next technology request does.
pub(crate) enum MockRead {
    /// Request resolves, `get_tag` returns this tag.
    Tag(TagRecord),
    /// Request resolves, `get_tag` returns nothing.
    Empty,
    /// Request fails with this error.
    Fail(AdapterError),
    /// Request never resolves.
    Hang,
    /// Request resolves after a delay, then `get_tag` returns the tag.
    Delayed(Duration, TagRecord),
}

pub(crate) struct MockAdapter {
    supported: Mutex<AdapterResult<bool>>,
    enabled: Mutex<AdapterResult<bool>>,
    start_results: Mutex<VecDeque<AdapterResult<()>>>,
    reads: Mutex<VecDeque<MockRead>>,
    claimed: Mutex<Option<Option<TagRecord>>>,
    write_result: Mutex<AdapterResult<()>>,
    platform: Platform,

    pub supported_calls: AtomicUsize,
    pub start_calls: AtomicUsize,
    pub requests: AtomicUsize,
    pub releases: AtomicUsize,
    pub settings_opened: AtomicUsize,
    outstanding: AtomicUsize,
    max_outstanding: AtomicUsize,
    pub written: Mutex<Vec<Vec<u8>>>,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self::on(Platform::Android)
    }

    pub fn on(platform: Platform) -> Self {
        MockAdapter {
            supported: Mutex::new(Ok(true)),
            enabled: Mutex::new(Ok(true)),
            start_results: Mutex::new(VecDeque::new()),
            reads: Mutex::new(VecDeque::new()),
            claimed: Mutex::new(None),
            write_result: Mutex::new(Ok(())),
            platform,
            supported_calls: AtomicUsize::new(0),
            start_calls: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            settings_opened: AtomicUsize::new(0),
            outstanding: AtomicUsize::new(0),
            max_outstanding: AtomicUsize::new(0),
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn set_supported(&self, result: AdapterResult<bool>) {
        *self.supported.lock().unwrap() = result;
    }

    pub fn set_enabled(&self, result: AdapterResult<bool>) {
        *self.enabled.lock().unwrap() = result;
    }

    /// Queues the result of the next `start` call. Unqueued calls succeed.
    pub fn push_start(&self, result: AdapterResult<()>) {
        self.start_results.lock().unwrap().push_back(result);
    }

    /// Queues what the next technology request does. Unqueued requests hang.
    pub fn push_read(&self, read: MockRead) {
        self.reads.lock().unwrap().push_back(read);
    }

    pub fn set_write_result(&self, result: AdapterResult<()>) {
        *self.write_result.lock().unwrap() = result;
    }

    /// Most technology requests ever outstanding at the same time.
    pub fn max_outstanding(&self) -> usize {
        self.max_outstanding.load(Ordering::SeqCst)
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    fn claim(&self, tag: Option<TagRecord>) {
        *self.claimed.lock().unwrap() = Some(tag);
    }
}

#[async_trait]
impl NfcAdapter for MockAdapter {
    async fn is_supported(&self) -> AdapterResult<bool> {
        self.supported_calls.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent probes actually overlap.
        tokio::task::yield_now().await;
        self.supported.lock().unwrap().clone()
    }

    async fn start(&self) -> AdapterResult<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.start_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn is_enabled(&self) -> AdapterResult<bool> {
        self.enabled.lock().unwrap().clone()
    }

    async fn request_technology(&self, _tech: NfcTech) -> AdapterResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let now = self.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_outstanding.fetch_max(now, Ordering::SeqCst);

        let next = self.reads.lock().unwrap().pop_front().unwrap_or(MockRead::Hang);
        match next {
            MockRead::Tag(tag) => {
                self.claim(Some(tag));
                Ok(())
            }
            MockRead::Empty => {
                self.claim(None);
                Ok(())
            }
            MockRead::Fail(err) => Err(err),
            MockRead::Hang => std::future::pending().await,
            MockRead::Delayed(delay, tag) => {
                tokio::time::sleep(delay).await;
                self.claim(Some(tag));
                Ok(())
            }
        }
    }

    async fn get_tag(&self) -> AdapterResult<Option<TagRecord>> {
        Ok(self.claimed.lock().unwrap().take().flatten())
    }

    async fn cancel_technology_request(&self) -> AdapterResult<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.outstanding.store(0, Ordering::SeqCst);
        self.claimed.lock().unwrap().take();
        Ok(())
    }

    async fn write_message(&self, bytes: &[u8]) -> AdapterResult<()> {
        let result = self.write_result.lock().unwrap().clone();
        if result.is_ok() {
            self.written.lock().unwrap().push(bytes.to_vec());
        }
        result
    }

    async fn open_platform_settings(&self) -> AdapterResult<()> {
        self.settings_opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}

// =============================================================================
// Recording Sinks
// =============================================================================

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl UserNotifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

#[derive(Default)]
pub(crate) struct RecordingListener {
    detected: Mutex<Vec<(MenuItem, TagPayload)>>,
    errors: Mutex<Vec<ScanError>>,
}

impl RecordingListener {
    pub fn detected(&self) -> Vec<(MenuItem, TagPayload)> {
        self.detected.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<ScanError> {
        self.errors.lock().unwrap().clone()
    }
}

impl ScanListener for RecordingListener {
    fn on_tag_detected(&self, item: &MenuItem, payload: &TagPayload) {
        self.detected
            .lock()
            .unwrap()
            .push((item.clone(), payload.clone()));
    }

    fn on_error(&self, error: &ScanError) {
        self.errors.lock().unwrap().push(error.clone());
    }
}

/// A lookup whose backend is always down.
pub(crate) struct FailingMenu;

#[async_trait]
impl MenuLookup for FailingMenu {
    async fn get_by_id(&self, _id: &str) -> Result<MenuItem, LookupError> {
        Err(LookupError::Backend("503 Service Unavailable".into()))
    }
}

/// The fixture menu, answering only after `delay`.
pub(crate) struct SlowMenu {
    delay: Duration,
    menu: InMemoryMenu,
}

impl SlowMenu {
    pub fn new(delay: Duration) -> Self {
        SlowMenu {
            delay,
            menu: InMemoryMenu::new([burger()]),
        }
    }
}

#[async_trait]
impl MenuLookup for SlowMenu {
    async fn get_by_id(&self, id: &str) -> Result<MenuItem, LookupError> {
        tokio::time::sleep(self.delay).await;
        self.menu.get_by_id(id).await
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub(crate) fn burger() -> MenuItem {
    MenuItem {
        id: "m1".into(),
        name: "Burger".into(),
        description: "Double patty".into(),
        price_cents: 999,
        image_url: None,
        store_id: None,
        category: Some("Burgers".into()),
    }
}

pub(crate) fn menu() -> Arc<InMemoryMenu> {
    Arc::new(InMemoryMenu::new([burger()]))
}

/// A tag with one text record holding `text`.
pub(crate) fn text_tag(text: &str) -> TagRecord {
    TagRecord::with_records(vec![NdefRecord::text(text).unwrap()])
}

pub(crate) const BURGER_JSON: &str = r#"{"menuItemId":"m1","name":"Burger","price":9.99}"#;

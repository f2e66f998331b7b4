//! # Simulated Tag Reader
//!
//! An [`NfcAdapter`] for counters without NFC hardware. Every input line is
//! one tap: the line is written into an NDEF text record, encoded to bytes
//! and decoded again the way a phone would read it off the tag.
//!
//! ```text
//!   stdin ──lines──► feed task ──mpsc──► request_technology() ──► claimed tag
//!                        │                       │
//!                        └── EOF closes ─────────┴──► drained token fires once
//!                            the channel              every tap was read
//! ```
//!
//! A blank line is a tap with an unformatted tag (no records).

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tapcart_core::ndef::{self, NdefRecord};
use tapcart_nfc::{AdapterError, AdapterResult, NfcAdapter, NfcTech, Platform, TagRecord};

/// Taps buffered ahead of the scan loop.
const TAP_BUFFER: usize = 16;

pub struct SimulatedReader {
    taps: tokio::sync::Mutex<mpsc::Receiver<String>>,
    claimed: Mutex<Option<TagRecord>>,
    drained: CancellationToken,
    enabled: bool,
    tap_count: AtomicU64,
}

impl SimulatedReader {
    /// Reader fed from the process's stdin.
    pub fn from_stdin() -> (Self, CancellationToken) {
        Self::spawn(BufReader::new(tokio::io::stdin()))
    }

    /// Spawns a task that feeds each line of `input` as a tap. The returned
    /// token fires when the input has ended and every tap has been claimed.
    pub fn spawn<R>(input: R) -> (Self, CancellationToken)
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(TAP_BUFFER);
        tokio::spawn(feed_lines(input, tx));

        let drained = CancellationToken::new();
        let reader = SimulatedReader {
            taps: tokio::sync::Mutex::new(rx),
            claimed: Mutex::new(None),
            drained: drained.clone(),
            enabled: true,
            tap_count: AtomicU64::new(0),
        };
        (reader, drained)
    }

    /// Reports NFC as switched off in settings.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Builds the tag a phone would see for one input line.
    fn tag_from_line(&self, line: &str) -> AdapterResult<TagRecord> {
        let n = self.tap_count.fetch_add(1, Ordering::Relaxed) + 1;
        let line = line.trim();

        let records = if line.is_empty() {
            Vec::new()
        } else {
            let record = NdefRecord::text(line).map_err(|e| AdapterError::Io(e.to_string()))?;
            let bytes =
                ndef::encode_message(&[record]).map_err(|e| AdapterError::Io(e.to_string()))?;
            ndef::decode_message(&bytes).map_err(|e| AdapterError::Io(e.to_string()))?
        };

        Ok(TagRecord {
            id: Some(format!("sim-{:04}", n)),
            ..TagRecord::with_records(records)
        })
    }

    fn claimed(&self) -> std::sync::MutexGuard<'_, Option<TagRecord>> {
        self.claimed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn feed_lines<R>(input: R, tx: mpsc::Sender<String>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read tap input");
                break;
            }
        }
    }
    debug!("Tap input closed");
}

#[async_trait]
impl NfcAdapter for SimulatedReader {
    async fn is_supported(&self) -> AdapterResult<bool> {
        Ok(true)
    }

    async fn start(&self) -> AdapterResult<()> {
        info!("Simulated reader ready");
        Ok(())
    }

    async fn is_enabled(&self) -> AdapterResult<bool> {
        Ok(self.enabled)
    }

    async fn request_technology(&self, _tech: NfcTech) -> AdapterResult<()> {
        let line = {
            let mut taps = self.taps.lock().await;
            taps.recv().await
        };

        match line {
            Some(line) => {
                let tag = self.tag_from_line(&line)?;
                debug!(tag_id = ?tag.id, records = tag.ndef_message.len(), "Simulated tap");
                *self.claimed() = Some(tag);
                Ok(())
            }
            None => {
                // No more taps will ever arrive; wait out the caller's timeout.
                self.drained.cancel();
                std::future::pending().await
            }
        }
    }

    async fn get_tag(&self) -> AdapterResult<Option<TagRecord>> {
        Ok(self.claimed().clone())
    }

    async fn cancel_technology_request(&self) -> AdapterResult<()> {
        self.claimed().take();
        Ok(())
    }

    async fn write_message(&self, bytes: &[u8]) -> AdapterResult<()> {
        let payload =
            ndef::decode_tag_payload(bytes).map_err(|e| AdapterError::Io(e.to_string()))?;
        let json = payload
            .to_json()
            .map_err(|e| AdapterError::Io(e.to_string()))?;
        info!(menu_item_id = %payload.menu_item_id, "Simulated tag written");
        println!("wrote tag: {}", json);
        Ok(())
    }

    async fn open_platform_settings(&self) -> AdapterResult<()> {
        Err(AdapterError::NotSupported)
    }

    fn platform(&self) -> Platform {
        Platform::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tapcart_core::TagPayload;

    const BURGER: &str = r#"{"menuItemId":"m1","name":"Burger","price":9.99}"#;

    #[tokio::test]
    async fn test_each_line_is_one_tap() {
        let input: &'static [u8] = b"{\"menuItemId\":\"m1\",\"name\":\"Burger\",\"price\":9.99}\n\n";
        let (reader, drained) = SimulatedReader::spawn(input);

        reader.request_technology(NfcTech::Ndef).await.unwrap();
        let tag = reader.get_tag().await.unwrap().unwrap();
        assert_eq!(tag.id.as_deref(), Some("sim-0001"));
        let record = tag.first_record().unwrap();
        assert!(record.is_text());
        assert_eq!(record.text_content().unwrap(), BURGER);
        assert_eq!(
            ndef::payload_from_record(record).unwrap(),
            TagPayload::new("m1", "Burger", 9.99)
        );

        reader.cancel_technology_request().await.unwrap();
        assert!(reader.get_tag().await.unwrap().is_none());

        // Blank line: a tag with nothing on it.
        reader.request_technology(NfcTech::Ndef).await.unwrap();
        let tag = reader.get_tag().await.unwrap().unwrap();
        assert!(tag.ndef_message.is_empty());
        assert!(!drained.is_cancelled());

        let next = tokio::time::timeout(
            Duration::from_millis(50),
            reader.request_technology(NfcTech::Ndef),
        )
        .await;
        assert!(next.is_err());
        assert!(drained.is_cancelled());
    }

    #[tokio::test]
    async fn test_write_accepts_encoded_payload() {
        let (reader, _drained) = SimulatedReader::spawn(&b""[..]);
        let bytes = ndef::encode_tag_payload(&TagPayload::new("m1", "Burger", 9.99)).unwrap();
        reader.write_message(&bytes).await.unwrap();

        let err = reader.write_message(&[0xFF, 0x00]).await.unwrap_err();
        assert!(matches!(err, AdapterError::Io(_)));
    }

    #[tokio::test]
    async fn test_disabled_reader() {
        let (reader, _drained) = SimulatedReader::spawn(&b""[..]);
        let reader = reader.disabled();
        assert!(!reader.is_enabled().await.unwrap());
        assert!(reader.is_supported().await.unwrap());
    }
}

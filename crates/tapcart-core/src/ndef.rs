//! # NDEF Codec
//!
//! The on-tag wire format: one NDEF message holding one text record whose
//! text is the [`TagPayload`] JSON.
//!
//! ## Record Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       NDEF Record (short form)                          │
//! │                                                                         │
//! │   byte 0     MB ME CF SR IL TNF(3)    0xD1 = MB|ME|SR, well-known       │
//! │   byte 1     TYPE LENGTH              0x01                              │
//! │   byte 2     PAYLOAD LENGTH (SR: 1B, else 4B big-endian)                │
//! │   [byte]     ID LENGTH (only when IL)                                   │
//! │   ...        TYPE                     "T"                               │
//! │   ...        ID   (only when IL)                                        │
//! │   ...        PAYLOAD                                                    │
//! │                                                                         │
//! │                       Text Record Payload                               │
//! │                                                                         │
//! │   byte 0     bit7 = UTF-16, bits0-5 = language code length              │
//! │   ...        language code            "en"                              │
//! │   ...        text                     {"menuItemId":"m1",...}           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Chunked records (CF) are not produced by any writer we care about and are
//! rejected on decode.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::TagPayload;

// =============================================================================
// Constants
// =============================================================================

const FLAG_MB: u8 = 0x80;
const FLAG_ME: u8 = 0x40;
const FLAG_CF: u8 = 0x20;
const FLAG_SR: u8 = 0x10;
const FLAG_IL: u8 = 0x08;
const TNF_MASK: u8 = 0x07;

const STATUS_UTF16: u8 = 0x80;
const STATUS_LANG_LEN_MASK: u8 = 0x3f;

/// Empty record.
pub const TNF_EMPTY: u8 = 0x00;
/// NFC Forum well-known type (text, URI, smart poster, ...).
pub const TNF_WELL_KNOWN: u8 = 0x01;
/// RFC 2046 media type.
pub const TNF_MIME_MEDIA: u8 = 0x02;

/// Record type of a well-known text record.
pub const RTD_TEXT: &[u8] = b"T";

/// Language code written into text records.
pub const DEFAULT_LANGUAGE: &str = "en";

// =============================================================================
// Record
// =============================================================================

/// A single NDEF record as read from or written to a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NdefRecord {
    /// Type name format (3 bits).
    pub tnf: u8,

    /// Record type, e.g. `b"T"` for text.
    #[serde(default)]
    pub record_type: Vec<u8>,

    /// Optional record id.
    #[serde(default)]
    pub id: Vec<u8>,

    /// Raw payload bytes.
    #[serde(default)]
    pub payload: Vec<u8>,
}

impl NdefRecord {
    /// Builds a text record in the default language.
    pub fn text(text: &str) -> CoreResult<Self> {
        Self::text_with_language(text, DEFAULT_LANGUAGE)
    }

    /// Builds a UTF-8 text record with an explicit language code.
    pub fn text_with_language(text: &str, language: &str) -> CoreResult<Self> {
        Ok(NdefRecord {
            tnf: TNF_WELL_KNOWN,
            record_type: RTD_TEXT.to_vec(),
            id: Vec::new(),
            payload: encode_text_payload(text, language)?,
        })
    }

    /// True for well-known `T` records.
    pub fn is_text(&self) -> bool {
        self.tnf == TNF_WELL_KNOWN && self.record_type == RTD_TEXT
    }

    /// Returns the decoded text of a text record.
    pub fn text_content(&self) -> CoreResult<String> {
        if !self.is_text() {
            return Err(CoreError::NotTextRecord { tnf: self.tnf });
        }
        decode_text_payload(&self.payload)
    }
}

// =============================================================================
// Text Record Payload
// =============================================================================

/// Encodes a UTF-8 text record payload (status byte, language, text).
pub fn encode_text_payload(text: &str, language: &str) -> CoreResult<Vec<u8>> {
    let lang = language.as_bytes();
    if lang.len() > STATUS_LANG_LEN_MASK as usize {
        return Err(CoreError::MalformedNdef(format!(
            "language code too long: {} bytes",
            lang.len()
        )));
    }

    let mut payload = Vec::with_capacity(1 + lang.len() + text.len());
    payload.push(lang.len() as u8);
    payload.extend_from_slice(lang);
    payload.extend_from_slice(text.as_bytes());
    Ok(payload)
}

/// Decodes a text record payload, accepting UTF-8 and UTF-16 encodings.
pub fn decode_text_payload(payload: &[u8]) -> CoreResult<String> {
    let (&status, rest) = payload
        .split_first()
        .ok_or_else(|| CoreError::MalformedNdef("empty text payload".to_string()))?;

    let lang_len = (status & STATUS_LANG_LEN_MASK) as usize;
    if lang_len > rest.len() {
        return Err(CoreError::MalformedNdef(format!(
            "language length {} exceeds payload ({} bytes)",
            lang_len,
            rest.len()
        )));
    }
    let text = &rest[lang_len..];

    if status & STATUS_UTF16 == 0 {
        return String::from_utf8(text.to_vec())
            .map_err(|e| CoreError::MalformedNdef(format!("invalid UTF-8 text: {e}")));
    }

    decode_utf16(text)
}

fn decode_utf16(bytes: &[u8]) -> CoreResult<String> {
    if bytes.len() % 2 != 0 {
        return Err(CoreError::MalformedNdef(
            "odd byte count in UTF-16 text".to_string(),
        ));
    }

    // Big-endian unless a byte order mark says otherwise.
    let (little_endian, body) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (true, rest),
        [0xFE, 0xFF, rest @ ..] => (false, rest),
        _ => (false, bytes),
    };

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if little_endian {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();

    String::from_utf16(&units)
        .map_err(|e| CoreError::MalformedNdef(format!("invalid UTF-16 text: {e}")))
}

// =============================================================================
// Message Framing
// =============================================================================

/// Encodes records into NDEF message bytes.
pub fn encode_message(records: &[NdefRecord]) -> CoreResult<Vec<u8>> {
    if records.is_empty() {
        return Err(CoreError::MalformedNdef("message has no records".to_string()));
    }

    let mut out = Vec::new();
    let last = records.len() - 1;

    for (index, record) in records.iter().enumerate() {
        if record.record_type.len() > u8::MAX as usize || record.id.len() > u8::MAX as usize {
            return Err(CoreError::MalformedNdef(
                "record type or id longer than 255 bytes".to_string(),
            ));
        }
        let payload_len = u32::try_from(record.payload.len()).map_err(|_| {
            CoreError::PayloadTooLarge {
                len: record.payload.len(),
            }
        })?;

        let short = payload_len <= u8::MAX as u32;
        let mut header = record.tnf & TNF_MASK;
        if index == 0 {
            header |= FLAG_MB;
        }
        if index == last {
            header |= FLAG_ME;
        }
        if short {
            header |= FLAG_SR;
        }
        if !record.id.is_empty() {
            header |= FLAG_IL;
        }

        out.push(header);
        out.push(record.record_type.len() as u8);
        if short {
            out.push(payload_len as u8);
        } else {
            out.extend_from_slice(&payload_len.to_be_bytes());
        }
        if !record.id.is_empty() {
            out.push(record.id.len() as u8);
        }
        out.extend_from_slice(&record.record_type);
        out.extend_from_slice(&record.id);
        out.extend_from_slice(&record.payload);
    }

    Ok(out)
}

/// Decodes NDEF message bytes into records.
pub fn decode_message(bytes: &[u8]) -> CoreResult<Vec<NdefRecord>> {
    let mut reader = ByteReader::new(bytes);
    let mut records = Vec::new();

    loop {
        let header = reader.u8()?;
        if records.is_empty() && header & FLAG_MB == 0 {
            return Err(CoreError::MalformedNdef(
                "first record lacks message-begin flag".to_string(),
            ));
        }
        if header & FLAG_CF != 0 {
            return Err(CoreError::MalformedNdef(
                "chunked records are not supported".to_string(),
            ));
        }

        let type_len = reader.u8()? as usize;
        let payload_len = if header & FLAG_SR != 0 {
            reader.u8()? as usize
        } else {
            reader.u32_be()? as usize
        };
        let id_len = if header & FLAG_IL != 0 {
            reader.u8()? as usize
        } else {
            0
        };

        let record_type = reader.take(type_len)?.to_vec();
        let id = reader.take(id_len)?.to_vec();
        let payload = reader.take(payload_len)?.to_vec();

        records.push(NdefRecord {
            tnf: header & TNF_MASK,
            record_type,
            id,
            payload,
        });

        if header & FLAG_ME != 0 {
            break;
        }
    }

    if !reader.is_empty() {
        return Err(CoreError::MalformedNdef(format!(
            "{} trailing bytes after message end",
            reader.remaining()
        )));
    }

    Ok(records)
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        ByteReader { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> CoreResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                CoreError::MalformedNdef(format!(
                    "record truncated: need {} bytes at offset {}, have {}",
                    len,
                    self.pos,
                    self.bytes.len() - self.pos
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> CoreResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32_be(&mut self) -> CoreResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

// =============================================================================
// Tag Payload Helpers
// =============================================================================

/// Encodes a payload as a one-record NDEF text message, ready to write.
pub fn encode_tag_payload(payload: &TagPayload) -> CoreResult<Vec<u8>> {
    let record = NdefRecord::text(&payload.to_json()?)?;
    encode_message(std::slice::from_ref(&record))
}

/// Parses the payload out of a text record.
pub fn payload_from_record(record: &NdefRecord) -> CoreResult<TagPayload> {
    TagPayload::from_json(&record.text_content()?)
}

/// Decodes NDEF message bytes and parses the first record as a payload.
pub fn decode_tag_payload(bytes: &[u8]) -> CoreResult<TagPayload> {
    let records = decode_message(bytes)?;
    let first = records
        .first()
        .ok_or_else(|| CoreError::MalformedNdef("message has no records".to_string()))?;
    payload_from_record(first)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_payload_layout() {
        let payload = encode_text_payload("hi", "en").unwrap();
        assert_eq!(payload, vec![0x02, b'e', b'n', b'h', b'i']);
        assert_eq!(decode_text_payload(&payload).unwrap(), "hi");
    }

    #[test]
    fn test_short_record_header() {
        let record = NdefRecord::text("hi").unwrap();
        let bytes = encode_message(&[record]).unwrap();
        // MB | ME | SR | TNF well-known
        assert_eq!(bytes[0], 0xD1);
        assert_eq!(bytes[1], 1);
        assert_eq!(bytes[2], 5);
        assert_eq!(bytes[3], b'T');
    }

    #[test]
    fn test_tag_payload_round_trip() {
        let payload = TagPayload::new("m1", "Burger", 9.99).with_store("store-9");
        let bytes = encode_tag_payload(&payload).unwrap();
        assert_eq!(decode_tag_payload(&bytes).unwrap(), payload);
    }

    #[test]
    fn test_long_record_uses_four_byte_length() {
        let name = "X".repeat(400);
        let payload = TagPayload::new("m1", name, 1.5);
        let bytes = encode_tag_payload(&payload).unwrap();
        assert_eq!(bytes[0] & FLAG_SR, 0);
        assert_eq!(decode_tag_payload(&bytes).unwrap(), payload);
    }

    #[test]
    fn test_multi_record_message() {
        let records = vec![
            NdefRecord::text("one").unwrap(),
            NdefRecord {
                tnf: TNF_MIME_MEDIA,
                record_type: b"application/json".to_vec(),
                id: b"7".to_vec(),
                payload: b"{}".to_vec(),
            },
        ];
        let bytes = encode_message(&records).unwrap();
        assert_eq!(decode_message(&bytes).unwrap(), records);
    }

    #[test]
    fn test_utf16_text() {
        // status: UTF-16 + 2-byte language, then BE "ok"
        let payload = [0x82, b'e', b'n', 0x00, b'o', 0x00, b'k'];
        assert_eq!(decode_text_payload(&payload).unwrap(), "ok");

        let le_bom = [0x82, b'e', b'n', 0xFF, 0xFE, b'o', 0x00];
        assert_eq!(decode_text_payload(&le_bom).unwrap(), "o");
    }

    #[test]
    fn test_truncated_message_rejected() {
        let bytes = encode_tag_payload(&TagPayload::new("m1", "Burger", 9.99)).unwrap();
        let err = decode_message(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, CoreError::MalformedNdef(_)));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode_message(&[NdefRecord::text("a").unwrap()]).unwrap();
        bytes.push(0x00);
        assert!(decode_message(&bytes).is_err());
    }

    #[test]
    fn test_non_text_record_is_not_a_payload() {
        let record = NdefRecord {
            tnf: TNF_WELL_KNOWN,
            record_type: b"U".to_vec(),
            id: Vec::new(),
            payload: b"\x04example.com".to_vec(),
        };
        assert!(matches!(
            payload_from_record(&record),
            Err(CoreError::NotTextRecord { tnf: TNF_WELL_KNOWN })
        ));
    }

    #[test]
    fn test_bad_language_length() {
        assert!(decode_text_payload(&[0x05, b'e']).is_err());
        assert!(decode_text_payload(&[]).is_err());
    }
}

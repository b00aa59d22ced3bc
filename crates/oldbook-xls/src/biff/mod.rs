//! BIFF8 (Binary Interchange File Format) handling.
//!
//! This module provides the record-level abstraction for BIFF8 streams.
//! A BIFF8 stream is a sequence of records, each with a 4-byte header
//! (2 bytes record type + 2 bytes body length) followed by the body.
//!
//! CONTINUE records (type 0x003C) extend the body of the preceding record
//! beyond the 8224-byte per-record limit. Reading merges them into the record
//! they continue; the record remembers where the physical fragments were split
//! so that it can be written back the same way.

pub mod parser;
pub mod records;
pub mod strings;
pub mod writer;

use std::io::Read;

use crate::error::{XlsError, XlsResult};
use records::RecordKind;

pub use writer::{frame, RecordWriter, MAX_RECORD_PAYLOAD};

/// A single BIFF8 record (with CONTINUE bodies already merged).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Record type ID (e.g. `records::SST`, `records::NUMBER`).
    pub record_type: u16,
    /// Record body bytes (CONTINUE records have been concatenated).
    pub data: Vec<u8>,
    /// Byte offset of this record's header in the stream it was read from.
    pub stream_offset: Option<u64>,
    /// Length of each physical fragment as read (head body, then each
    /// CONTINUE body). Empty for records built in memory.
    fragments: Vec<usize>,
}

impl Record {
    /// A record built in memory
    pub fn new(record_type: u16, data: Vec<u8>) -> Self {
        Self {
            record_type,
            data,
            stream_offset: None,
            fragments: Vec::new(),
        }
    }

    /// The record's kind
    pub fn kind(&self) -> RecordKind {
        RecordKind::from_code(self.record_type)
    }

    /// Physical fragment lengths as read
    pub fn fragments(&self) -> &[usize] {
        &self.fragments
    }

    /// The read-time split, if the payload length still matches it.
    ///
    /// Records whose CONTINUE boundaries carry meaning (SST strings, drawing
    /// and text objects) keep them as long as their payload is not resized.
    pub fn preserved_fragments(&self) -> Option<&[usize]> {
        let matches = self.fragments.len() > 1
            && self.fragments.iter().sum::<usize>() == self.data.len();
        matches.then_some(self.fragments.as_slice())
    }

    /// Replace the payload. A resized payload loses its read-time split.
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }
}

/// Split a record stream into records, merging CONTINUE records into their
/// predecessor.
///
/// Each step reads a header, then the payload it declares; the payload either
/// starts a new record or, for CONTINUE, extends the last one. A CONTINUE with
/// nothing before it is dropped.
pub fn unframe(bytes: &[u8]) -> XlsResult<Vec<Record>> {
    let mut records: Vec<Record> = Vec::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let available = bytes.len() - pos;
        if available < 4 {
            return Err(XlsError::MalformedRecord {
                offset: pos as u64,
                record_type: 0,
                declared: 4,
                available,
            });
        }

        let record_type = u16::from_le_bytes([bytes[pos], bytes[pos + 1]]);
        let body_len = u16::from_le_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let body_start = pos + 4;
        if body_start + body_len > bytes.len() {
            return Err(XlsError::MalformedRecord {
                offset: pos as u64,
                record_type,
                declared: body_len,
                available: bytes.len() - body_start,
            });
        }
        let body = &bytes[body_start..body_start + body_len];

        if record_type == records::CONTINUE {
            match records.last_mut() {
                Some(prev) => {
                    prev.data.extend_from_slice(body);
                    prev.fragments.push(body_len);
                }
                None => log::warn!("dropping CONTINUE record with no predecessor at offset {pos}"),
            }
        } else {
            records.push(Record {
                record_type,
                data: body.to_vec(),
                stream_offset: Some(pos as u64),
                fragments: vec![body_len],
            });
        }
        pos = body_start + body_len;
    }

    log::debug!("read {} records from {} bytes", records.len(), bytes.len());
    Ok(records)
}

/// Reads all BIFF8 records from a byte stream, merging CONTINUE records
/// into their parent.
pub fn read_all_records<R: Read>(stream: &mut R) -> XlsResult<Vec<Record>> {
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    unframe(&bytes)
}

/// Extract the BOF record fields from a record body.
///
/// Returns `(version, substream_type)`.
/// - `version` should be `0x0600` for BIFF8
/// - `substream_type`: 0x0005 = workbook globals, 0x0010 = worksheet, etc.
pub fn parse_bof(data: &[u8]) -> XlsResult<(u16, u16)> {
    if data.len() < 4 {
        return Err(XlsError::InvalidFormat("BOF record too short".into()));
    }
    let version = u16::from_le_bytes([data[0], data[1]]);
    let dt = u16::from_le_bytes([data[2], data[3]]);
    Ok((version, dt))
}

/// BOF payload for a BIFF8 substream of type `substream`.
pub fn bof_payload(substream: u16) -> Vec<u8> {
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&records::BIFF8_VERSION.to_le_bytes());
    data.extend_from_slice(&substream.to_le_bytes());
    // rupBuild, rupYear
    data.extend_from_slice(&0x0DBBu16.to_le_bytes());
    data.extend_from_slice(&0x07CCu16.to_le_bytes());
    // bfh, sfo
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&0x0006u32.to_le_bytes());
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_payload_is_malformed() {
        // Declares 10 bytes, carries 3
        let bytes = [0x03, 0x02, 0x0A, 0x00, 1, 2, 3];
        match unframe(&bytes) {
            Err(XlsError::MalformedRecord {
                offset,
                record_type,
                declared,
                available,
            }) => {
                assert_eq!((offset, record_type), (0, 0x0203));
                assert_eq!((declared, available), (10, 3));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn trailing_partial_header_is_malformed() {
        let mut bytes = frame(records::EOF, &[]);
        bytes.extend_from_slice(&[0x09, 0x08]);
        assert!(matches!(
            unframe(&bytes),
            Err(XlsError::MalformedRecord { offset: 4, .. })
        ));
    }

    #[test]
    fn unknown_types_are_kept() {
        let mut bytes = frame(0x0867, &[0xAA, 0xBB]);
        bytes.extend(frame(records::EOF, &[]));
        let records = unframe(&bytes).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind(), RecordKind::Unknown(0x0867));
        assert_eq!(records[0].data, [0xAA, 0xBB]);
        assert_eq!(records[1].stream_offset, Some(6));
    }

    #[test]
    fn orphan_continue_is_dropped() {
        let mut bytes = frame(records::CONTINUE, &[1, 2]);
        bytes.extend(frame(records::EOF, &[]));
        let records = unframe(&bytes).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, records::EOF);
    }

    #[test]
    fn resized_payload_forgets_split() {
        let mut bytes = frame(records::SST, &[1, 2]);
        bytes.extend(frame(records::CONTINUE, &[3]));
        let mut record = unframe(&bytes).unwrap().remove(0);
        assert_eq!(record.preserved_fragments(), Some(&[2usize, 1][..]));
        record.set_data(vec![9; 4]);
        assert_eq!(record.preserved_fragments(), None);
    }

    #[test]
    fn test_parse_bof() {
        let (version, dt) = parse_bof(&[0x00, 0x06, 0x05, 0x00, 0, 0, 0, 0]).unwrap();
        assert_eq!(version, records::BIFF8_VERSION);
        assert_eq!(dt, records::BOF_WORKBOOK_GLOBALS);
        assert!(parse_bof(&[0x00]).is_err());

        let data = bof_payload(records::BOF_WORKSHEET);
        assert_eq!(data.len(), 16);
        assert_eq!(
            parse_bof(&data).unwrap(),
            (records::BIFF8_VERSION, records::BOF_WORKSHEET)
        );
    }
}

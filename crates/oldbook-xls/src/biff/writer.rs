//! Record framing on the write side.
//!
//! A payload longer than [`MAX_RECORD_PAYLOAD`] is written as a head record
//! carrying the first `MAX_RECORD_PAYLOAD` bytes followed by CONTINUE records
//! for the rest. The last chunk is not padded.

use super::records::CONTINUE;
use super::Record;

/// Largest payload a single record may carry.
pub const MAX_RECORD_PAYLOAD: usize = 8224;

const HEADER_LEN: usize = 4;

/// Growable output sink for framed records.
#[derive(Debug, Default)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far, i.e. the stream offset of the next record
    pub fn position(&self) -> u64 {
        self.buf.len() as u64
    }

    /// Frame `payload` under `code`, splitting it into continuations as needed.
    pub fn write_payload(&mut self, code: u16, payload: &[u8]) {
        let mut chunks = payload.chunks(MAX_RECORD_PAYLOAD);
        let head = chunks.next().unwrap_or(&[]);
        self.write_header(code, head.len());
        self.buf.extend_from_slice(head);
        for chunk in chunks {
            self.write_header(CONTINUE, chunk.len());
            self.buf.extend_from_slice(chunk);
        }
    }

    /// Frame `payload` with the given physical fragment lengths.
    ///
    /// The first fragment goes under `code`, the others under CONTINUE. The
    /// lengths must add up to the payload length.
    pub fn write_fragments(&mut self, code: u16, payload: &[u8], fragments: &[usize]) {
        let mut start = 0;
        for (i, &len) in fragments.iter().enumerate() {
            self.write_header(if i == 0 { code } else { CONTINUE }, len);
            self.buf.extend_from_slice(&payload[start..start + len]);
            start += len;
        }
    }

    /// Write a record, keeping its original fragment boundaries when it still
    /// has them.
    pub fn write_record(&mut self, record: &Record) {
        match record.preserved_fragments() {
            Some(fragments) => self.write_fragments(record.record_type, &record.data, fragments),
            None => self.write_payload(record.record_type, &record.data),
        }
    }

    /// The framed bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer, returning the framed bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    fn write_header(&mut self, code: u16, len: usize) {
        debug_assert!(len <= u16::MAX as usize);
        self.buf.extend_from_slice(&code.to_le_bytes());
        self.buf.extend_from_slice(&(len as u16).to_le_bytes());
    }
}

/// Frame a single payload.
pub fn frame(code: u16, payload: &[u8]) -> Vec<u8> {
    let mut writer = RecordWriter::with_capacity(framed_len(payload.len()));
    writer.write_payload(code, payload);
    writer.into_inner()
}

/// Number of CONTINUE records a payload of `len` bytes needs.
pub fn continuation_count(len: usize) -> usize {
    if len <= MAX_RECORD_PAYLOAD {
        0
    } else {
        (len - MAX_RECORD_PAYLOAD + MAX_RECORD_PAYLOAD - 1) / MAX_RECORD_PAYLOAD
    }
}

/// Size on the wire of a payload of `len` bytes, headers included.
pub fn framed_len(len: usize) -> usize {
    len + HEADER_LEN * (1 + continuation_count(len))
}

/// Size on the wire of `record` as [`RecordWriter::write_record`] writes it.
pub fn record_framed_len(record: &Record) -> usize {
    match record.preserved_fragments() {
        Some(fragments) => record.data.len() + HEADER_LEN * fragments.len(),
        None => framed_len(record.data.len()),
    }
}

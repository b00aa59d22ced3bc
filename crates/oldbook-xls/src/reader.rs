//! XLS (BIFF8) reader.
//!
//! Opens a Compound File Binary (CFB/OLE2) container, reads the `Workbook`
//! stream and parses it into a [`BiffWorkbook`].

use std::io::{Read, Seek};
use std::path::Path;

use crate::error::{XlsError, XlsResult};
use crate::workbook::{BiffWorkbook, ReadOptions};

/// XLS file reader.
pub struct XlsReader;

impl XlsReader {
    /// Read an XLS file from a filesystem path.
    pub fn read_file<P: AsRef<Path>>(path: P, options: &ReadOptions) -> XlsResult<BiffWorkbook> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read(file, options)
    }

    /// Read an XLS file from any `Read + Seek` source.
    pub fn read<R: Read + Seek>(reader: R, options: &ReadOptions) -> XlsResult<BiffWorkbook> {
        let stream = Self::workbook_stream(reader)?;
        BiffWorkbook::from_stream(&stream, options)
    }

    /// The raw bytes of the container's workbook stream.
    pub fn workbook_stream<R: Read + Seek>(reader: R) -> XlsResult<Vec<u8>> {
        let mut cfb = cfb::CompoundFile::open(reader)?;

        // "Book" is the BIFF5 name; it is opened so the version check can
        // report it
        let stream_path = if cfb.exists("/Workbook") {
            "/Workbook"
        } else if cfb.exists("/Book") {
            "/Book"
        } else {
            return Err(XlsError::InvalidFormat(
                "no Workbook or Book stream found in CFB".into(),
            ));
        };

        let mut stream_data = Vec::new();
        {
            let mut stream = cfb.open_stream(stream_path)?;
            stream.read_to_end(&mut stream_data)?;
        }
        log::debug!("{stream_path} stream is {} bytes", stream_data.len());
        Ok(stream_data)
    }
}

//! XLS (BIFF8) writer.
//!
//! Serializes a [`BiffWorkbook`] and stores it as the `Workbook` stream of a
//! new Compound File Binary container.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use crate::error::XlsResult;
use crate::workbook::{BiffWorkbook, WriteOptions};

/// XLS file writer.
pub struct XlsWriter;

impl XlsWriter {
    /// Write a workbook to a filesystem path.
    pub fn write_file<P: AsRef<Path>>(
        workbook: &BiffWorkbook,
        path: P,
        options: &WriteOptions,
    ) -> XlsResult<()> {
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Self::write(workbook, file, options)?;
        Ok(())
    }

    /// Write a workbook into a new container over `writer`, returning it.
    pub fn write<W: Read + Write + Seek>(
        workbook: &BiffWorkbook,
        writer: W,
        options: &WriteOptions,
    ) -> XlsResult<W> {
        let stream_data = workbook.to_stream(options)?;

        let mut cfb = cfb::CompoundFile::create(writer)?;
        {
            let mut stream = cfb.create_stream("/Workbook")?;
            stream.write_all(&stream_data)?;
        }
        cfb.flush()?;
        log::debug!("wrote {} byte Workbook stream", stream_data.len());
        Ok(cfb.into_inner())
    }
}

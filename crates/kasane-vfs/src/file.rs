//! Open file streams.

use std::io::{self, Read, Seek, SeekFrom, Write};

/// A byte stream returned by [`Filesystem::open`](crate::Filesystem::open).
///
/// Anything that reads, writes and seeks qualifies. Backends refuse the
/// directions the open mode did not ask for with an `io::Error`.
pub trait VfsFile: Read + Write + Seek + Send {}

impl<T: Read + Write + Seek + Send> VfsFile for T {}

/// Stream that reads as empty and discards writes.
///
/// Returned by `safe_open` in place of a file that could not be opened.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFile;

impl Read for NullFile {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

impl Write for NullFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for NullFile {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Ok(0)
    }
}

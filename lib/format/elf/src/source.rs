//! Generic API over seekable, readable binary streams.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

/// Generic API over the byte stream backing an ELF file.
///
/// A [`ByteSource`] is a cursor-based stream: [`ByteSource::seek()`]
/// repositions the cursor to an absolute offset and [`ByteSource::read()`]
/// consumes bytes at the cursor. The cursor is exclusively owned by the
/// handle the source is injected into; nothing in this crate shares a
/// source between handles.
///
/// # Implementors
///
/// The underlying bytes must be immutable for the lifetime of the source.
/// Seeking past the end of the stream must succeed; a subsequent read then
/// simply returns fewer bytes than requested (possibly zero), which callers
/// surface as a short read rather than a seek failure.
pub trait ByteSource {
    /// Repositions the read cursor to `offset` bytes from the start of the
    /// source.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] if the underlying stream rejects the
    /// reposition.
    fn seek(&mut self, offset: u64) -> io::Result<()>;

    /// Reads up to `buf.len()` bytes at the cursor into `buf`, returning
    /// the number of bytes read.
    ///
    /// A return value of zero indicates the end of the source.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] if the underlying stream cannot be read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl ByteSource for File {
    fn seek(&mut self, offset: u64) -> io::Result<()> {
        Seek::seek(self, SeekFrom::Start(offset)).map(|_| ())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }
}

impl<T: AsRef<[u8]>> ByteSource for Cursor<T> {
    fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.set_position(offset);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn seek(&mut self, offset: u64) -> io::Result<()> {
        S::seek(*self, offset)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        S::read(*self, buf)
    }
}

/// Fills `buf` from `source`, retrying on interruption, and returns the
/// number of bytes actually read.
///
/// Unlike [`Read::read_exact`], reaching the end of the source before `buf`
/// is full is not an error here; the caller decides whether a short count
/// is acceptable.
///
/// # Errors
///
/// Returns [`io::Error`] if the underlying stream cannot be read.
pub(crate) fn read_full<S: ByteSource + ?Sized>(
    source: &mut S,
    buf: &mut [u8],
) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }

    Ok(filled)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::{ByteSource, read_full};

    #[test]
    fn cursor_seek_and_read() {
        let mut source = Cursor::new([0u8, 1, 2, 3, 4, 5, 6, 7]);

        let mut buf = [0; 4];
        source.seek(2).unwrap();
        assert_eq!(read_full(&mut source, &mut buf).unwrap(), 4);
        assert_eq!(buf, [2, 3, 4, 5]);
    }

    #[test]
    fn seek_past_end_reads_short() {
        let mut source = Cursor::new([0u8; 8]);

        // Seeking past the end must succeed; the shortfall shows up at
        // read time.
        source.seek(100).unwrap();

        let mut buf = [0xAA; 4];
        assert_eq!(read_full(&mut source, &mut buf).unwrap(), 0);
    }

    #[test]
    fn read_full_stops_at_end() {
        let mut source = Cursor::new([1u8, 2, 3]);
        source.seek(0).unwrap();

        let mut buf = [0; 8];
        assert_eq!(read_full(&mut source, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }
}

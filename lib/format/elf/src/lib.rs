//! The `elf` crate provides an interface for reading 64-bit little-endian
//! ELF files.
//!
//! # Capabilities
//!
//! ## Tolerates arbitrary input
//!
//! Every decoding operation returns a [`Result`] carrying a specific
//! rejection reason. Malformed, truncated, or outright non-ELF input is
//! reported through [`ElfError`], never through ordinary panics, so the
//! crate can be pointed at untrusted bytes.
//!
//! ## Abstract byte sources
//!
//! Files are read through the [`ByteSource`] trait, so the decoder works
//! against anything seekable and readable: an open [`File`], an in-memory
//! [`Cursor`][std::io::Cursor], or a caller-provided stream.
//!
//! ## Lazy table reads
//!
//! The section and program header tables are read only when first
//! requested and cached for the lifetime of the handle; repeated loads
//! return the cached bytes without touching the source again.
//!
//! ## Uses no unsafe code
//!
//! This crate contains zero unsafe blocks of code.

use std::fs::File;
use std::io;
use std::path::Path;
use std::{error, fmt};

use crate::header::ElfHeader;
use crate::ident::{ElfIdent, IdentError};
use crate::program_header::ProgramHeader;
use crate::section_header::SectionHeader;
use crate::source::{ByteSource, read_full};
use crate::table::RawTable;

mod encoding;
pub mod header;
pub mod ident;
pub mod program_header;
pub mod section_header;
pub mod source;
pub mod table;

/// An open handle to a 64-bit little-endian ELF file.
///
/// A handle owns its [`ByteSource`] and the source's read cursor
/// exclusively; decoding several files concurrently requires one
/// independently owned handle per file. The handle holds no state shared
/// with any other handle, and it performs no internal locking: calling
/// into one handle from several threads at once is a caller bug that the
/// caller must prevent.
///
/// The ELF header is decoded once when the handle is created and is
/// immutable afterwards. The two header tables are read lazily and cached;
/// [`Elf::close()`] releases them and permanently retires the handle.
#[derive(Debug)]
pub struct Elf<S> {
    /// The underlying [`ByteSource`] of the file.
    source: S,
    /// The decoded identification prefix.
    ident: ElfIdent,
    /// The decoded file header.
    header: ElfHeader,
    /// The cached section header table, once loaded.
    section_table: Option<RawTable>,
    /// The cached program header table, once loaded.
    program_table: Option<RawTable>,
    /// Whether [`Elf::close()`] has retired this handle.
    closed: bool,
}

impl Elf<File> {
    /// Opens the file at `path` as an ELF file.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::Io`] if the file cannot be opened, and
    /// otherwise any error [`Elf::new()`] reports for the file's contents.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ElfError> {
        let file = File::open(path).map_err(ElfError::Io)?;
        Self::new(file)
    }
}

impl<S: ByteSource> Elf<S> {
    /// Creates a new [`Elf`] handle over `source`, validating the
    /// identification prefix and decoding the file header.
    ///
    /// # Errors
    ///
    /// - [`ElfError::Seek`] / [`ElfError::Io`]: the source could not be
    ///   repositioned or read.
    /// - [`ElfError::Ident`]: the file failed the identification gate
    ///   (truncated, wrong magic, or an unsupported class, encoding,
    ///   version, or OS/ABI).
    pub fn new(mut source: S) -> Result<Self, ElfError> {
        source
            .seek(0)
            .map_err(|error| ElfError::Seek { offset: 0, error })?;

        let mut buf = [0; ElfHeader::SIZE];
        let filled = read_full(&mut source, &mut buf).map_err(ElfError::Io)?;

        let ident = ElfIdent::parse(&buf[..filled])?;
        let header = ElfHeader::decode(&buf)?;

        Ok(Self {
            source,
            ident,
            header,
            section_table: None,
            program_table: None,
            closed: false,
        })
    }

    /// Returns the decoded identification prefix of the file.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::HandleClosed`] if the handle has been closed.
    pub fn ident(&self) -> Result<&ElfIdent, ElfError> {
        self.ensure_open()?;
        Ok(&self.ident)
    }

    /// Returns the decoded file header.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::HandleClosed`] if the handle has been closed.
    pub fn header(&self) -> Result<&ElfHeader, ElfError> {
        self.ensure_open()?;
        Ok(&self.header)
    }

    /// Reads the section header table at the offset, entry size, and entry
    /// count the file header declares, caching it for the lifetime of the
    /// handle.
    ///
    /// A second call returns the cached table without touching the source.
    /// A section header count of zero yields an empty table, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::HandleClosed`] if the handle has been closed,
    /// and otherwise any error [`RawTable::read_from()`] reports.
    pub fn load_section_header_table(&mut self) -> Result<&RawTable, ElfError> {
        self.ensure_open()?;

        if self.section_table.is_none() {
            let table = RawTable::read_from(
                &mut self.source,
                self.header.section_header_offset,
                usize::from(self.header.section_header_size),
                u64::from(self.header.section_header_count),
            )?;
            self.section_table = Some(table);
        }

        let Some(table) = self.section_table.as_ref() else {
            unreachable!("section header table was just cached");
        };
        Ok(table)
    }

    /// Reads the program header table at the offset, entry size, and entry
    /// count the file header declares, caching it for the lifetime of the
    /// handle.
    ///
    /// A second call returns the cached table without touching the source.
    /// A program header count of zero (the usual case for relocatable
    /// objects) yields an empty table, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::HandleClosed`] if the handle has been closed,
    /// and otherwise any error [`RawTable::read_from()`] reports.
    pub fn load_program_header_table(&mut self) -> Result<&RawTable, ElfError> {
        self.ensure_open()?;

        if self.program_table.is_none() {
            let table = RawTable::read_from(
                &mut self.source,
                self.header.program_header_offset,
                usize::from(self.header.program_header_size),
                u64::from(self.header.program_header_count),
            )?;
            self.program_table = Some(table);
        }

        let Some(table) = self.program_table.as_ref() else {
            unreachable!("program header table was just cached");
        };
        Ok(table)
    }

    /// Decodes the section header table entry at `index`, loading the
    /// table first if it is not yet cached.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::IndexOutOfRange`] if `index` is not below the
    /// section header count, and otherwise any error
    /// [`Elf::load_section_header_table()`] or [`SectionHeader::decode()`]
    /// reports.
    pub fn section_header(&mut self, index: u64) -> Result<SectionHeader, ElfError> {
        let table = self.load_section_header_table()?;
        SectionHeader::decode(table.entry(index)?)
    }

    /// Decodes the program header table entry at `index`, loading the
    /// table first if it is not yet cached.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::IndexOutOfRange`] if `index` is not below the
    /// program header count, and otherwise any error
    /// [`Elf::load_program_header_table()`] or [`ProgramHeader::decode()`]
    /// reports.
    pub fn program_header(&mut self, index: u64) -> Result<ProgramHeader, ElfError> {
        let table = self.load_program_header_table()?;
        ProgramHeader::decode(table.entry(index)?)
    }

    /// Closes the handle, releasing the cached tables.
    ///
    /// Closing is terminal: every subsequent operation on the handle fails
    /// with [`ElfError::HandleClosed`]. Closing an already closed handle
    /// has no effect.
    pub fn close(&mut self) {
        self.section_table = None;
        self.program_table = None;
        self.closed = true;
    }

    /// Fails with [`ElfError::HandleClosed`] once the handle is closed.
    fn ensure_open(&self) -> Result<(), ElfError> {
        if self.closed {
            return Err(ElfError::HandleClosed);
        }

        Ok(())
    }
}

/// Checks whether the file at `path` is a well-formed 64-bit little-endian
/// ELF file, returning its decoded identification prefix.
///
/// This reads at most [`ElfHeader::SIZE`] bytes and never constructs a
/// handle, so it is cheap enough to sniff arbitrary files that may not be
/// ELF at all.
///
/// # Errors
///
/// Returns [`ElfError::Io`] if the file cannot be opened or read, and
/// [`ElfError::Ident`] with the specific rejection reason if the file
/// fails the identification gate.
pub fn probe<P: AsRef<Path>>(path: P) -> Result<ElfIdent, ElfError> {
    let mut file = File::open(path).map_err(ElfError::Io)?;

    let mut buf = [0; ElfHeader::SIZE];
    let filled = read_full(&mut file, &mut buf).map_err(ElfError::Io)?;

    Ok(ElfIdent::parse(&buf[..filled])?)
}

/// Errors produced by the decoding operations of this crate.
#[derive(Debug)]
pub enum ElfError {
    /// The underlying byte source could not be read.
    Io(io::Error),
    /// The file failed the identification gate.
    Ident(IdentError),
    /// A header decode was invoked with a slice of the wrong length. The
    /// identification gate guarantees the length, so this indicates a
    /// logic error in the caller rather than a malformed file.
    CorruptHeader {
        /// The length of the slice that was provided.
        length: usize,
    },
    /// The underlying byte source rejected a reposition of its cursor.
    Seek {
        /// The offset that was requested.
        offset: u64,
        /// The error the source reported.
        error: io::Error,
    },
    /// The byte source held fewer bytes than a table read requested.
    ShortRead {
        /// The number of bytes requested.
        requested: u64,
        /// The number of bytes actually read.
        read: u64,
    },
    /// A table entry index was not below the table's entry count.
    IndexOutOfRange {
        /// The index that was requested.
        index: u64,
        /// The number of entries in the table.
        count: u64,
    },
    /// An entry decode was invoked with a slice whose length does not
    /// match the fixed entry layout.
    ShortEntry {
        /// The length the entry layout requires.
        expected: usize,
        /// The length of the slice that was provided.
        length: usize,
    },
    /// The handle has been closed.
    HandleClosed,
}

impl From<IdentError> for ElfError {
    fn from(value: IdentError) -> Self {
        Self::Ident(value)
    }
}

impl fmt::Display for ElfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "error reading byte source: {error}"),
            Self::Ident(error) => fmt::Display::fmt(error, f),
            Self::CorruptHeader { length } => {
                write!(f, "header decode requires exactly 64 bytes, got {length}")
            }
            Self::Seek { offset, error } => {
                write!(f, "error seeking byte source to offset {offset}: {error}")
            }
            Self::ShortRead { requested, read } => write!(
                f,
                "short read: requested {requested} bytes, source held {read}"
            ),
            Self::IndexOutOfRange { index, count } => write!(
                f,
                "entry index {index} out of range for table of {count} entries"
            ),
            Self::ShortEntry { expected, length } => write!(
                f,
                "entry decode requires exactly {expected} bytes, got {length}"
            ),
            Self::HandleClosed => write!(f, "operation on a closed ELF handle"),
        }
    }
}

impl error::Error for ElfError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(error) | Self::Seek { error, .. } => Some(error),
            Self::Ident(error) => Some(error),
            _ => None,
        }
    }
}

/// Safely converts `value` to a `u64` relying on compile time code checking.
#[expect(clippy::as_conversions, reason = "implementation of type-safe as cast")]
pub(crate) fn usize_to_u64(value: usize) -> u64 {
    #[cfg(not(any(
        target_pointer_width = "16",
        target_pointer_width = "32",
        target_pointer_width = "64"
    )))]
    compile_error!("library supports only 16-bit, 32-bit, and 64-bit usize");
    value as u64
}

/// Safely converts `value` to a `usize` relying on compile time code checking.
#[expect(clippy::as_conversions, reason = "implementation of type-safe as cast")]
pub(crate) fn u64_to_usize(value: u64) -> usize {
    #[cfg(not(any(target_pointer_width = "64")))]
    compile_error!("library supports only 64-bit usize");
    value as usize
}

#[cfg(test)]
mod test {
    use std::io::{self, Cursor};

    use crate::header::{ElfHeader, ElfType, Machine};
    use crate::ident::{ElfIdent, IdentError, OsAbi};
    use crate::program_header::ProgramHeader;
    use crate::section_header::{SectionHeader, SectionType};
    use crate::source::ByteSource;

    use super::{Elf, ElfError, probe};

    /// Builds a synthetic ELF image: header, then `section_count` section
    /// header entries at the offset the header declares.
    ///
    /// The sections are `PROGBITS` entries whose `name_offset` equals
    /// their index, so tests can tell entries apart.
    fn image(section_count: u16) -> Vec<u8> {
        let mut bytes = vec![0; ElfHeader::SIZE];
        bytes[..4].copy_from_slice(&ElfIdent::MAGIC_BYTES);
        bytes[4] = 2;
        bytes[5] = 1;
        bytes[6] = 1;

        let set_u16 = |bytes: &mut Vec<u8>, offset: usize, value: u16| {
            bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        };

        set_u16(&mut bytes, 16, ElfType::RELOCATABLE.0);
        set_u16(&mut bytes, 18, Machine::X86_64.0);
        bytes[20..24].copy_from_slice(&1u32.to_le_bytes());
        // Section header table immediately follows the file header.
        bytes[40..48].copy_from_slice(&(ElfHeader::SIZE as u64).to_le_bytes());
        set_u16(&mut bytes, 52, 64);
        set_u16(&mut bytes, 54, 56);
        set_u16(&mut bytes, 56, 0);
        set_u16(&mut bytes, 58, 64);
        set_u16(&mut bytes, 60, section_count);

        for index in 0..section_count {
            let mut entry = [0u8; SectionHeader::SIZE];
            entry[0..4].copy_from_slice(&u32::from(index).to_le_bytes());
            entry[4..8].copy_from_slice(&SectionType::PROGBITS.0.to_le_bytes());
            bytes.extend_from_slice(&entry);
        }

        bytes
    }

    /// A [`ByteSource`] wrapper that counts reads and seeks.
    struct CountingSource {
        /// The wrapped source.
        inner: Cursor<Vec<u8>>,
        /// The number of [`ByteSource::read()`] calls issued.
        reads: usize,
        /// The number of [`ByteSource::seek()`] calls issued.
        seeks: usize,
    }

    impl ByteSource for CountingSource {
        fn seek(&mut self, offset: u64) -> io::Result<()> {
            self.seeks += 1;
            self.inner.seek(offset)
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            self.inner.read(buf)
        }
    }

    #[test]
    fn decodes_synthetic_image() {
        // The image starts `7F 45 4C 46 02 01 01 00 00`, declares no
        // program headers and three 64-byte section headers.
        let mut elf = Elf::new(Cursor::new(image(3))).unwrap();

        assert_eq!(elf.ident().unwrap().os_abi, OsAbi::SYSV);

        let header = *elf.header().unwrap();
        assert_eq!(header.section_header_count, 3);
        assert_eq!(header.program_header_count, 0);

        let program_table = elf.load_program_header_table().unwrap();
        assert!(program_table.is_empty());

        for index in 0..3 {
            let section = elf.section_header(index).unwrap();
            assert_eq!(u64::from(section.name_offset), index);
            assert_eq!(section.section_type, SectionType::PROGBITS);
        }
    }

    #[test]
    fn rejects_class32_image() {
        let mut bytes = image(3);
        bytes[4] = 1;

        match Elf::new(Cursor::new(bytes)) {
            Err(ElfError::Ident(IdentError::UnsupportedClass(class))) => {
                assert_eq!(class.0, 1);
            }
            other => panic!("expected UnsupportedClass, got {other:?}"),
        }
    }

    #[test]
    fn section_index_out_of_range() {
        let mut elf = Elf::new(Cursor::new(image(3))).unwrap();

        for index in [3, 4, 6] {
            assert!(matches!(
                elf.section_header(index),
                Err(ElfError::IndexOutOfRange { count: 3, .. })
            ));
        }
    }

    #[test]
    fn section_table_offset_past_end_of_file() {
        let mut bytes = image(0);
        // Three entries claimed at an offset past the end of the file.
        bytes[40..48].copy_from_slice(&0x10_0000u64.to_le_bytes());
        bytes[60..62].copy_from_slice(&3u16.to_le_bytes());

        let mut elf = Elf::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            elf.load_section_header_table(),
            Err(ElfError::ShortRead { .. })
        ));
    }

    #[test]
    fn table_loads_are_idempotent() {
        let mut bytes = image(3);
        // Declare the section header table as a program header table too,
        // so both loads exercise the cache.
        bytes[32..40].copy_from_slice(&(ElfHeader::SIZE as u64).to_le_bytes());
        bytes[56..58].copy_from_slice(&2u16.to_le_bytes());

        let source = CountingSource {
            inner: Cursor::new(bytes),
            reads: 0,
            seeks: 0,
        };
        let mut elf = Elf::new(source).unwrap();

        let first = elf.load_program_header_table().unwrap().clone();
        let reads_after_first = elf.source.reads;
        let seeks_after_first = elf.source.seeks;

        let second = elf.load_program_header_table().unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(elf.source.reads, reads_after_first);
        assert_eq!(elf.source.seeks, seeks_after_first);

        // The program header cache does not satisfy section table loads.
        elf.load_section_header_table().unwrap();
        assert!(elf.source.reads > reads_after_first);
    }

    #[test]
    fn closed_handle_rejects_everything() {
        let mut elf = Elf::new(Cursor::new(image(3))).unwrap();
        elf.close();

        assert!(matches!(elf.ident(), Err(ElfError::HandleClosed)));
        assert!(matches!(elf.header(), Err(ElfError::HandleClosed)));
        assert!(matches!(
            elf.load_section_header_table(),
            Err(ElfError::HandleClosed)
        ));
        assert!(matches!(
            elf.load_program_header_table(),
            Err(ElfError::HandleClosed)
        ));
        assert!(matches!(
            elf.section_header(0),
            Err(ElfError::HandleClosed)
        ));
        assert!(matches!(
            elf.program_header(0),
            Err(ElfError::HandleClosed)
        ));

        // Closing again stays closed.
        elf.close();
        assert!(matches!(elf.header(), Err(ElfError::HandleClosed)));
    }

    #[test]
    fn program_entry_decodes_from_cached_table() {
        let mut bytes = image(0);
        bytes[32..40].copy_from_slice(&(ElfHeader::SIZE as u64).to_le_bytes());
        bytes[54..56].copy_from_slice(&(ProgramHeader::SIZE as u16).to_le_bytes());
        bytes[56..58].copy_from_slice(&1u16.to_le_bytes());

        let mut entry = [0u8; ProgramHeader::SIZE];
        entry[0..4].copy_from_slice(&1u32.to_le_bytes());
        entry[8..16].copy_from_slice(&0x1000u64.to_le_bytes());
        bytes.extend_from_slice(&entry);

        let mut elf = Elf::new(Cursor::new(bytes)).unwrap();
        let program = elf.program_header(0).unwrap();
        assert_eq!(program.segment_type.0, 1);
        assert_eq!(program.offset, 0x1000);
    }

    #[test]
    fn probe_reports_specific_reasons() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("elf-probe-test-{}", std::process::id()));

        std::fs::write(&path, image(3)).unwrap();
        assert!(probe(&path).is_ok());

        std::fs::write(&path, [0u8; 10]).unwrap();
        assert!(matches!(
            probe(&path),
            Err(ElfError::Ident(IdentError::TruncatedHeader { length: 10 }))
        ));

        std::fs::write(&path, [0u8; 64]).unwrap();
        assert!(matches!(
            probe(&path),
            Err(ElfError::Ident(IdentError::BadMagic(_)))
        ));

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(probe(&path), Err(ElfError::Io(_))));
    }
}

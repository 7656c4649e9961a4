//! Bulk reading of fixed-size-entry header tables.

use crate::ElfError;
use crate::source::{ByteSource, read_full};
use crate::{u64_to_usize, usize_to_u64};

/// An owned copy of one header table (section or program) read from a byte
/// source.
///
/// The buffer length is always exactly `entry_count * entry_size`, so any
/// index `n` with `n < entry_count` maps to the byte range
/// `[n * entry_size, (n + 1) * entry_size)`.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct RawTable {
    /// The raw bytes of the table.
    buf: Vec<u8>,
    /// The size, in bytes, of one table entry.
    entry_size: usize,
    /// The number of entries in the table.
    entry_count: u64,
}

impl RawTable {
    /// Reads a table of `entry_count` entries of `entry_size` bytes
    /// starting at `offset` into an owned buffer.
    ///
    /// An `entry_count` of zero is a legitimately empty table (relocatable
    /// objects usually carry no program header table): the result is a
    /// zero-length buffer and the source is not touched at all.
    ///
    /// # Errors
    ///
    /// - [`ElfError::Seek`]: the source rejected repositioning to
    ///   `offset`.
    /// - [`ElfError::Io`]: the source could not be read.
    /// - [`ElfError::ShortRead`]: the source held fewer than
    ///   `entry_size * entry_count` bytes past `offset`, or that product
    ///   overflows `u64`; a truncated table is surfaced, never silently
    ///   padded.
    pub fn read_from<S: ByteSource + ?Sized>(
        source: &mut S,
        offset: u64,
        entry_size: usize,
        entry_count: u64,
    ) -> Result<Self, ElfError> {
        // No source can satisfy a table whose byte size overflows u64.
        let Some(requested) = usize_to_u64(entry_size).checked_mul(entry_count) else {
            return Err(ElfError::ShortRead {
                requested: u64::MAX,
                read: 0,
            });
        };
        if requested == 0 {
            return Ok(Self {
                buf: Vec::new(),
                entry_size,
                entry_count,
            });
        }

        source
            .seek(offset)
            .map_err(|error| ElfError::Seek { offset, error })?;

        let mut buf = vec![0; u64_to_usize(requested)];
        let read = usize_to_u64(read_full(source, &mut buf).map_err(ElfError::Io)?);
        if read < requested {
            return Err(ElfError::ShortRead { requested, read });
        }

        Ok(Self {
            buf,
            entry_size,
            entry_count,
        })
    }

    /// Returns the raw bytes of the entry at `index`.
    ///
    /// The returned slice borrows the table's owned buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::IndexOutOfRange`] if `index` is not below the
    /// entry count; an out-of-range index never yields an empty or
    /// garbage slice.
    pub fn entry(&self, index: u64) -> Result<&[u8], ElfError> {
        if index >= self.entry_count {
            return Err(ElfError::IndexOutOfRange {
                index,
                count: self.entry_count,
            });
        }

        let start = u64_to_usize(index) * self.entry_size;
        Ok(&self.buf[start..start + self.entry_size])
    }

    /// Returns the number of entries in the table.
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    /// Returns the size, in bytes, of one table entry.
    pub fn entry_size(&self) -> usize {
        self.entry_size
    }

    /// Returns the raw bytes of the whole table.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use crate::ElfError;

    use super::RawTable;

    #[test]
    fn reads_exactly_the_requested_range() {
        let bytes: Vec<u8> = (0..64).collect();
        let mut source = Cursor::new(bytes);

        let table = RawTable::read_from(&mut source, 8, 4, 3).unwrap();
        assert_eq!(table.entry_count(), 3);
        assert_eq!(table.as_bytes(), &[8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19]);
        assert_eq!(table.entry(0).unwrap(), &[8, 9, 10, 11]);
        assert_eq!(table.entry(2).unwrap(), &[16, 17, 18, 19]);
    }

    #[test]
    fn zero_count_is_empty_not_an_error() {
        // Offset far past the end of the source: with no entries to read,
        // the source must not even be seeked.
        let mut source = Cursor::new([0u8; 4]);

        let table = RawTable::read_from(&mut source, 0xFFFF_FFFF, 64, 0).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.as_bytes().len(), 0);
    }

    #[test]
    fn truncated_table_is_a_short_read() {
        let mut source = Cursor::new([0u8; 100]);

        let result = RawTable::read_from(&mut source, 80, 64, 2);
        assert!(matches!(
            result,
            Err(ElfError::ShortRead {
                requested: 128,
                read: 20,
            })
        ));
    }

    #[test]
    fn offset_past_end_is_a_short_read() {
        let mut source = Cursor::new([0u8; 100]);

        let result = RawTable::read_from(&mut source, 1000, 64, 2);
        assert!(matches!(
            result,
            Err(ElfError::ShortRead { requested: 128, read: 0 })
        ));
    }

    #[test]
    fn overflowing_geometry_is_a_short_read() {
        let mut source = Cursor::new([0u8; 64]);

        let result = RawTable::read_from(&mut source, 0, usize::MAX, u64::MAX);
        assert!(matches!(result, Err(ElfError::ShortRead { read: 0, .. })));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut source = Cursor::new([0u8; 64]);
        let table = RawTable::read_from(&mut source, 0, 16, 4).unwrap();

        for index in [4, 5, 8] {
            assert!(matches!(
                table.entry(index),
                Err(ElfError::IndexOutOfRange { count: 4, .. })
            ));
        }
    }
}

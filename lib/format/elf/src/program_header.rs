//! Decoding of 64-bit ELF program header table entries.

use std::fmt;

use crate::ElfError;
use crate::encoding::{read_u32, read_u64};

/// The decoded form of one program header table entry.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct ProgramHeader {
    /// The [`SegmentType`] of the segment.
    pub segment_type: SegmentType,
    /// The [`SegmentFlags`] of the segment.
    pub flags: SegmentFlags,
    /// The offset at which the segment's first byte resides in the file.
    pub offset: u64,
    /// The virtual address at which the segment's first byte resides in
    /// memory.
    pub virtual_address: u64,
    /// The physical address of the segment. Unused on x86_64 targets but
    /// decoded so the remaining fields keep their layout positions.
    pub physical_address: u64,
    /// The number of bytes the segment occupies in the file.
    pub file_size: u64,
    /// The number of bytes the segment occupies in memory.
    pub memory_size: u64,
    /// The required alignment of the segment.
    pub alignment: u64,
}

impl ProgramHeader {
    /// The size, in bytes, of a 64-bit program header table entry.
    pub const SIZE: usize = 56;

    /// Decodes one program header from a slice holding exactly the
    /// [`ProgramHeader::SIZE`] bytes of the entry.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::ShortEntry`] if `bytes` is not exactly
    /// [`ProgramHeader::SIZE`] bytes long.
    pub fn decode(bytes: &[u8]) -> Result<Self, ElfError> {
        if bytes.len() != Self::SIZE {
            return Err(ElfError::ShortEntry {
                expected: Self::SIZE,
                length: bytes.len(),
            });
        }

        let header = Self {
            segment_type: SegmentType(read_u32(bytes, 0)),
            flags: SegmentFlags(read_u32(bytes, 4)),
            offset: read_u64(bytes, 8),
            virtual_address: read_u64(bytes, 16),
            physical_address: read_u64(bytes, 24),
            file_size: read_u64(bytes, 32),
            memory_size: read_u64(bytes, 40),
            alignment: read_u64(bytes, 48),
        };
        Ok(header)
    }
}

/// The type of a segment.
#[repr(transparent)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SegmentType(pub u32);

impl SegmentType {
    /// The program header is unused.
    pub const NULL: Self = Self(0);
    /// The segment is loadable.
    pub const LOAD: Self = Self(1);
    /// The segment holds dynamic linking information.
    pub const DYNAMIC: Self = Self(2);
    /// The segment specifies the location and size of a path to invoke as
    /// an interpreter.
    pub const INTERP: Self = Self(3);
    /// The segment specifies the location and size of auxiliary
    /// information.
    pub const NOTE: Self = Self(4);
    /// This [`SegmentType`] is reserved and segments with it have
    /// unspecified semantics.
    pub const SHLIB: Self = Self(5);
    /// The segment specifies the location and size of the program header
    /// table itself.
    pub const PHDR: Self = Self(6);
    /// The segment specifies a thread-local storage template.
    pub const TLS: Self = Self(7);
}

impl fmt::Debug for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NULL => f.pad("Null"),
            Self::LOAD => f.pad("Load"),
            Self::DYNAMIC => f.pad("Dynamic"),
            Self::INTERP => f.pad("Interp"),
            Self::NOTE => f.pad("Note"),
            Self::SHLIB => f.pad("ShLib"),
            Self::PHDR => f.pad("Phdr"),
            Self::TLS => f.pad("Tls"),
            segment_type => f.debug_tuple("SegmentType").field(&segment_type.0).finish(),
        }
    }
}

/// Permission flags of a segment.
#[repr(transparent)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SegmentFlags(pub u32);

impl SegmentFlags {
    /// The segment may be executed.
    pub const EXECUTE: Self = Self(0x1);
    /// The segment may be written to.
    pub const WRITE: Self = Self(0x2);
    /// The segment may be read from.
    pub const READ: Self = Self(0x4);

    /// Returns `true` if all flags in `rhs` are set in `self`.
    pub const fn contains(self, rhs: Self) -> bool {
        self.0 & rhs.0 == rhs.0
    }
}

impl fmt::Debug for SegmentFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = if self.contains(Self::READ) { "R" } else { "-" };
        let w = if self.contains(Self::WRITE) { "W" } else { "-" };
        let x = if self.contains(Self::EXECUTE) { "X" } else { "-" };
        write!(f, "{r}{w}{x}")
    }
}

#[cfg(test)]
mod test {
    use crate::ElfError;

    use super::{ProgramHeader, SegmentFlags, SegmentType};

    /// Encodes `header` into the 56-byte on-disk entry layout.
    pub(crate) fn encode(header: &ProgramHeader) -> [u8; ProgramHeader::SIZE] {
        let mut bytes = [0; ProgramHeader::SIZE];
        bytes[0..4].copy_from_slice(&header.segment_type.0.to_le_bytes());
        bytes[4..8].copy_from_slice(&header.flags.0.to_le_bytes());
        bytes[8..16].copy_from_slice(&header.offset.to_le_bytes());
        bytes[16..24].copy_from_slice(&header.virtual_address.to_le_bytes());
        bytes[24..32].copy_from_slice(&header.physical_address.to_le_bytes());
        bytes[32..40].copy_from_slice(&header.file_size.to_le_bytes());
        bytes[40..48].copy_from_slice(&header.memory_size.to_le_bytes());
        bytes[48..56].copy_from_slice(&header.alignment.to_le_bytes());
        bytes
    }

    #[test]
    fn round_trip() {
        let header = ProgramHeader {
            segment_type: SegmentType::LOAD,
            flags: SegmentFlags(0x5),
            offset: 0x1000,
            virtual_address: 0x40_1000,
            physical_address: 0x40_1000,
            file_size: 0x1C5,
            memory_size: 0x1C5,
            alignment: 0x1000,
        };

        assert_eq!(ProgramHeader::decode(&encode(&header)).unwrap(), header);
    }

    #[test]
    fn physical_address_keeps_its_position() {
        // The field is unused on this target, but a decoder that skipped
        // it would shift every later field by eight bytes.
        let mut header = ProgramHeader::decode(&[0; ProgramHeader::SIZE]).unwrap();
        header.physical_address = 0xDEAD_BEEF;
        header.file_size = 0x77;

        let decoded = ProgramHeader::decode(&encode(&header)).unwrap();
        assert_eq!(decoded.physical_address, 0xDEAD_BEEF);
        assert_eq!(decoded.file_size, 0x77);
    }

    #[test]
    fn wrong_length_is_a_short_entry() {
        assert!(matches!(
            ProgramHeader::decode(&[0; 64]),
            Err(ElfError::ShortEntry {
                expected: ProgramHeader::SIZE,
                length: 64,
            })
        ));
    }

    #[test]
    fn flags_render_as_permissions() {
        assert_eq!(format!("{:?}", SegmentFlags(0x5)), "R-X");
        assert_eq!(format!("{:?}", SegmentFlags(0x6)), "RW-");
        assert_eq!(format!("{:?}", SegmentFlags(0x0)), "---");
    }
}

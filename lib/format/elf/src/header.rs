//! Decoding of the fixed 64-byte ELF file header.

use std::fmt;

use crate::ElfError;
use crate::encoding::{read_u16, read_u32, read_u64};

/// The decoded ELF file header.
///
/// Every field is taken verbatim from the file; beyond the identification
/// gate no semantic validation is applied here, so values like a zero
/// section header count are preserved rather than defaulted. The offsets,
/// counts, and sizes recorded here parameterize all later table reads.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct ElfHeader {
    /// The [`ElfType`] of the file.
    pub elf_type: ElfType,
    /// The architecture for which the file is targeted.
    pub machine: Machine,
    /// The version of the ELF file.
    pub version: u32,
    /// The virtual address of the entry point of the file.
    pub entry: u64,
    /// The program header table's file offset in bytes.
    pub program_header_offset: u64,
    /// The section header table's file offset in bytes.
    pub section_header_offset: u64,
    /// Processor specific flags associated with the file.
    pub flags: u32,
    /// The size of the ELF file header in bytes as declared by the file.
    pub header_size: u16,
    /// The size of each program header in the program header table.
    pub program_header_size: u16,
    /// The number of program headers in the program header table.
    pub program_header_count: u16,
    /// The size of each section header in the section header table.
    pub section_header_size: u16,
    /// The number of section headers in the section header table.
    pub section_header_count: u16,
    /// The index into the section header table of the section name string
    /// table.
    pub string_table_index: u16,
}

impl ElfHeader {
    /// The size, in bytes, of a 64-bit ELF file header.
    pub const SIZE: usize = 64;
    /// The current version of the ELF file format.
    pub const CURRENT_FILE_VERSION: u32 = 1;

    /// Decodes the 13 fixed-width fields following the identification
    /// prefix from a buffer holding exactly the [`ElfHeader::SIZE`] header
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::CorruptHeader`] if `bytes` is not exactly
    /// [`ElfHeader::SIZE`] bytes long. Identification validation already
    /// guarantees the length, so hitting this from the file handle is a
    /// logic error in the caller rather than a property of the input file.
    pub fn decode(bytes: &[u8]) -> Result<Self, ElfError> {
        if bytes.len() != Self::SIZE {
            return Err(ElfError::CorruptHeader {
                length: bytes.len(),
            });
        }

        let header = Self {
            elf_type: ElfType(read_u16(bytes, 16)),
            machine: Machine(read_u16(bytes, 18)),
            version: read_u32(bytes, 20),
            entry: read_u64(bytes, 24),
            program_header_offset: read_u64(bytes, 32),
            section_header_offset: read_u64(bytes, 40),
            flags: read_u32(bytes, 48),
            header_size: read_u16(bytes, 52),
            program_header_size: read_u16(bytes, 54),
            program_header_count: read_u16(bytes, 56),
            section_header_size: read_u16(bytes, 58),
            section_header_count: read_u16(bytes, 60),
            string_table_index: read_u16(bytes, 62),
        };
        Ok(header)
    }
}

/// The type of the ELF file.
#[repr(transparent)]
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct ElfType(pub u16);

impl ElfType {
    /// No kind.
    pub const NONE: Self = Self(0);
    /// Relocatable ELF file.
    pub const RELOCATABLE: Self = Self(1);
    /// Executable ELF file.
    pub const EXECUTABLE: Self = Self(2);
    /// Shared object ELF file.
    pub const SHARED: Self = Self(3);
    /// Core ELF file.
    pub const CORE: Self = Self(4);
}

impl fmt::Debug for ElfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => f.pad("None"),
            Self::RELOCATABLE => f.pad("Relocatable"),
            Self::EXECUTABLE => f.pad("Executable"),
            Self::SHARED => f.pad("SharedObject"),
            Self::CORE => f.pad("Core"),
            elf_type => f.debug_tuple("ElfType").field(&elf_type.0).finish(),
        }
    }
}

/// The architecture of the ELF file.
#[repr(transparent)]
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct Machine(pub u16);

impl Machine {
    /// No required machine.
    pub const NONE: Self = Self(0);
    /// ELF file requires the Intel 80386 architecture.
    pub const INTEL_386: Self = Self(3);
    /// ELF file requires the AMD x86_64 architecture.
    pub const X86_64: Self = Self(62);
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => f.pad("None"),
            Self::INTEL_386 => f.pad("Intel386"),
            Self::X86_64 => f.pad("x86_64"),
            machine => f.debug_tuple("Machine").field(&machine.0).finish(),
        }
    }
}

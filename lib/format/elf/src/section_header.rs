//! Decoding of 64-bit ELF section header table entries.

use std::fmt;

use crate::ElfError;
use crate::encoding::{read_u32, read_u64};

/// The decoded form of one section header table entry.
///
/// Field values are taken verbatim from the entry bytes; interpreting
/// unrecognized type or flag values is a presentation concern and happens
/// outside this crate.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct SectionHeader {
    /// The offset into the section name string table of this section's
    /// name.
    pub name_offset: u32,
    /// The [`SectionType`] of the section.
    pub section_type: SectionType,
    /// Flags that affect the interpretation and manipulation of the
    /// section.
    pub flags: u64,
    /// The address at which the section's first byte should reside in
    /// memory.
    pub address: u64,
    /// The offset at which the section's first byte resides in the file.
    pub offset: u64,
    /// The size of the section in bytes.
    pub size: u64,
    /// A section header table index link; its interpretation depends on
    /// the [`SectionType`].
    pub link: u32,
    /// Extra information; its interpretation depends on the
    /// [`SectionType`].
    pub info: u32,
    /// The required alignment of the section.
    pub address_alignment: u64,
    /// The size of fixed-size entries in the section, or zero for
    /// sections without fixed-size entries.
    pub entry_size: u64,
}

impl SectionHeader {
    /// The size, in bytes, of a 64-bit section header table entry.
    pub const SIZE: usize = 64;

    /// Decodes one section header from a slice holding exactly the
    /// [`SectionHeader::SIZE`] bytes of the entry.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::ShortEntry`] if `bytes` is not exactly
    /// [`SectionHeader::SIZE`] bytes long.
    pub fn decode(bytes: &[u8]) -> Result<Self, ElfError> {
        if bytes.len() != Self::SIZE {
            return Err(ElfError::ShortEntry {
                expected: Self::SIZE,
                length: bytes.len(),
            });
        }

        let header = Self {
            name_offset: read_u32(bytes, 0),
            section_type: SectionType(read_u32(bytes, 4)),
            flags: read_u64(bytes, 8),
            address: read_u64(bytes, 16),
            offset: read_u64(bytes, 24),
            size: read_u64(bytes, 32),
            link: read_u32(bytes, 40),
            info: read_u32(bytes, 44),
            address_alignment: read_u64(bytes, 48),
            entry_size: read_u64(bytes, 56),
        };
        Ok(header)
    }
}

/// The type of a section.
#[repr(transparent)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SectionType(pub u32);

impl SectionType {
    /// The section header does not have an associated section.
    pub const NULL: Self = Self(0);
    /// The section holds information defined by the program.
    pub const PROGBITS: Self = Self(1);
    /// The section holds a symbol table.
    pub const SYMTAB: Self = Self(2);
    /// The section holds a string table.
    pub const STRTAB: Self = Self(3);
    /// The section holds relocation entries with explicit addends.
    pub const RELA: Self = Self(4);
    /// The section holds a symbol hash table.
    pub const HASH: Self = Self(5);
    /// The section holds information for dynamic linking.
    pub const DYNAMIC: Self = Self(6);
    /// The section holds information used for marking the file in some
    /// way.
    pub const NOTE: Self = Self(7);
    /// The section occupies no space in the file but otherwise resembles
    /// [`SectionType::PROGBITS`].
    pub const NOBITS: Self = Self(8);
    /// The section holds relocation entries without explicit addends.
    pub const REL: Self = Self(9);
    /// This [`SectionType`] is reserved and has unspecified semantics.
    pub const SHLIB: Self = Self(10);
    /// The section holds a dynamic symbol table.
    pub const DYNSYM: Self = Self(11);
    /// The section holds an array of pointers to initialization functions.
    pub const INIT_ARRAY: Self = Self(12);
    /// The section holds an array of pointers to termination functions.
    pub const FINI_ARRAY: Self = Self(13);
    /// The section holds an array of pointers to functions invoked before
    /// all other initialization functions.
    pub const PREINIT_ARRAY: Self = Self(14);
    /// The section defines a section group.
    pub const GROUP: Self = Self(15);
    /// The section is associated with a symbol table section.
    pub const SYMTAB_SHNDX: Self = Self(16);
}

impl fmt::Debug for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NULL => f.pad("Null"),
            Self::PROGBITS => f.pad("ProgBits"),
            Self::SYMTAB => f.pad("SymTab"),
            Self::STRTAB => f.pad("StrTab"),
            Self::RELA => f.pad("Rela"),
            Self::HASH => f.pad("Hash"),
            Self::DYNAMIC => f.pad("Dynamic"),
            Self::NOTE => f.pad("Note"),
            Self::NOBITS => f.pad("NoBits"),
            Self::REL => f.pad("Rel"),
            Self::SHLIB => f.pad("ShLib"),
            Self::DYNSYM => f.pad("DynSym"),
            Self::INIT_ARRAY => f.pad("InitArray"),
            Self::FINI_ARRAY => f.pad("FiniArray"),
            Self::PREINIT_ARRAY => f.pad("PreInitArray"),
            Self::GROUP => f.pad("Group"),
            Self::SYMTAB_SHNDX => f.pad("SymTabShIndex"),
            section_type => f.debug_tuple("SectionType").field(&section_type.0).finish(),
        }
    }
}

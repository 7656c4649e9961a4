//! Validation and decoding of the fixed 16-byte ELF identification prefix.

use std::{error, fmt};

use crate::header::ElfHeader;

/// The decoded identification prefix of an ELF file.
///
/// An [`ElfIdent`] is only ever produced by [`ElfIdent::parse()`], so a
/// value of this type is proof that the file passed the class, encoding,
/// version, and OS/ABI gate; the fields record which of the accepted
/// values the file carries.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct ElfIdent {
    /// The [`Class`] of the file. Always [`Class::CLASS64`].
    pub class: Class,
    /// The data [`Encoding`] of the file. Always [`Encoding::LSB2`].
    pub encoding: Encoding,
    /// The version of the identification prefix. Always
    /// [`ElfIdent::CURRENT_VERSION`].
    pub version: u8,
    /// The [`OsAbi`] of the file. One of the two accepted values.
    pub os_abi: OsAbi,
    /// The version of the ABI to which the file is targeted. Always zero.
    pub abi_version: u8,
}

impl ElfIdent {
    /// The magic bytes that identify the start of an ELF file.
    pub const MAGIC_BYTES: [u8; 4] = [0x7F, b'E', b'L', b'F'];
    /// The current version of the ELF identification prefix.
    pub const CURRENT_VERSION: u8 = 1;
    /// The size, in bytes, of the identification prefix.
    pub const SIZE: usize = 16;

    /// Validates the identification prefix at the start of `bytes` and
    /// decodes it into an [`ElfIdent`].
    ///
    /// This is a pure function over the first [`ElfHeader::SIZE`] bytes of
    /// a candidate file; it touches no open resource and so doubles as a
    /// cheap file-type sniff. The checks run in a fixed order and the
    /// first failing check determines the error, so rejection reasons are
    /// deterministic for inputs that fail more than one check.
    ///
    /// # Errors
    ///
    /// - [`IdentError::TruncatedHeader`]: fewer than [`ElfHeader::SIZE`]
    ///   bytes were provided.
    /// - [`IdentError::BadMagic`]: the file does not start with
    ///   [`ElfIdent::MAGIC_BYTES`].
    /// - [`IdentError::UnsupportedClass`]: any [`Class`] other than
    ///   [`Class::CLASS64`].
    /// - [`IdentError::UnsupportedEncoding`]: any [`Encoding`] other than
    ///   [`Encoding::LSB2`].
    /// - [`IdentError::UnsupportedIdentVersion`]: any version other than
    ///   [`ElfIdent::CURRENT_VERSION`].
    /// - [`IdentError::UnsupportedAbi`]: an OS/ABI outside the accepted
    ///   set ([`OsAbi::SYSV`] and [`OsAbi::GNU`]) or a nonzero ABI
    ///   version.
    pub fn parse(bytes: &[u8]) -> Result<Self, IdentError> {
        if bytes.len() < ElfHeader::SIZE {
            return Err(IdentError::TruncatedHeader { length: bytes.len() });
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != Self::MAGIC_BYTES {
            return Err(IdentError::BadMagic(magic));
        }

        let class = Class(bytes[4]);
        if class != Class::CLASS64 {
            return Err(IdentError::UnsupportedClass(class));
        }

        let encoding = Encoding(bytes[5]);
        if encoding != Encoding::LSB2 {
            return Err(IdentError::UnsupportedEncoding(encoding));
        }

        let version = bytes[6];
        if version != Self::CURRENT_VERSION {
            return Err(IdentError::UnsupportedIdentVersion(version));
        }

        let os_abi = OsAbi(bytes[7]);
        let abi_version = bytes[8];
        if !(os_abi == OsAbi::SYSV || os_abi == OsAbi::GNU) || abi_version != 0 {
            return Err(IdentError::UnsupportedAbi {
                os_abi,
                abi_version,
            });
        }

        Ok(Self {
            class,
            encoding,
            version,
            os_abi,
            abi_version,
        })
    }
}

/// The specific reason an identification prefix was rejected.
///
/// The variants are ordered by the check that produces them; an input
/// failing several checks reports the earliest.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum IdentError {
    /// Fewer than [`ElfHeader::SIZE`] bytes were available.
    TruncatedHeader {
        /// The number of bytes that were available.
        length: usize,
    },
    /// The given bytes do not start with [`ElfIdent::MAGIC_BYTES`].
    BadMagic([u8; 4]),
    /// The [`Class`] of the file is not supported.
    UnsupportedClass(Class),
    /// The data [`Encoding`] of the file is not supported.
    UnsupportedEncoding(Encoding),
    /// The version of the identification prefix is not supported.
    UnsupportedIdentVersion(u8),
    /// The OS/ABI or ABI version of the file is not supported.
    UnsupportedAbi {
        /// The [`OsAbi`] the file carries.
        os_abi: OsAbi,
        /// The ABI version the file carries.
        abi_version: u8,
    },
}

impl fmt::Display for IdentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedHeader { length } => write!(
                f,
                "file too short to contain an ELF header: {length} bytes"
            ),
            Self::BadMagic(bytes) => write!(f, "invalid magic bytes: {bytes:x?}"),
            Self::UnsupportedClass(class) => {
                write!(f, "unsupported ELF class: {class:?} (only 64-bit)")
            }
            Self::UnsupportedEncoding(encoding) => write!(
                f,
                "unsupported data encoding: {encoding:?} (only little-endian)"
            ),
            Self::UnsupportedIdentVersion(version) => {
                write!(f, "unsupported ELF ident version: {version}")
            }
            Self::UnsupportedAbi {
                os_abi,
                abi_version,
            } => write!(
                f,
                "unsupported OS/ABI: {os_abi:?} version {abi_version}"
            ),
        }
    }
}

impl error::Error for IdentError {}

/// Specifier of the ELF file class, which determines the sizing of various
/// items in the ELF file format.
#[repr(transparent)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Class(pub u8);

impl Class {
    /// Invalid [`Class`] specifier.
    pub const NONE: Self = Self(0);
    /// ELF file is formatted in its 32-bit format.
    pub const CLASS32: Self = Self(1);
    /// ELF file is formatted in its 64-bit format.
    pub const CLASS64: Self = Self(2);
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => f.pad("Invalid"),
            Self::CLASS32 => f.pad("Class32"),
            Self::CLASS64 => f.pad("Class64"),
            class => f.debug_tuple("Class").field(&class.0).finish(),
        }
    }
}

/// Specifier of the ELF file data encoding, which determines the encoding
/// of the data structures used by the ELF file format.
#[repr(transparent)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Encoding(pub u8);

impl Encoding {
    /// Invalid [`Encoding`] specifier.
    pub const NONE: Self = Self(0);
    /// The encoding of the ELF file format uses little endian two's
    /// complement integers.
    pub const LSB2: Self = Self(1);
    /// The encoding of the ELF file format uses big endian two's
    /// complement integers.
    pub const MSB2: Self = Self(2);
}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => f.pad("NoEncoding"),
            Self::LSB2 => f.pad("LittleEndian"),
            Self::MSB2 => f.pad("BigEndian"),
            encoding => f.debug_tuple("Encoding").field(&encoding.0).finish(),
        }
    }
}

/// Specifier of the OS or ABI specific ELF extensions used by a file.
#[repr(transparent)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct OsAbi(pub u8);

impl OsAbi {
    /// System V ABI (also used for files that specify no extensions).
    pub const SYSV: Self = Self(0);
    /// GNU extensions.
    pub const GNU: Self = Self(3);
}

impl fmt::Debug for OsAbi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::SYSV => f.pad("SystemV"),
            Self::GNU => f.pad("Gnu"),
            os_abi => f.debug_tuple("OsAbi").field(&os_abi.0).finish(),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::header::ElfHeader;

    use super::{Class, ElfIdent, Encoding, IdentError, OsAbi};

    /// A header prefix that passes every identification check.
    fn valid_prefix() -> [u8; ElfHeader::SIZE] {
        let mut bytes = [0; ElfHeader::SIZE];
        bytes[..4].copy_from_slice(&ElfIdent::MAGIC_BYTES);
        bytes[4] = 2;
        bytes[5] = 1;
        bytes[6] = 1;
        bytes
    }

    #[test]
    fn accepts_sysv_and_gnu() {
        let mut bytes = valid_prefix();

        let ident = ElfIdent::parse(&bytes).unwrap();
        assert_eq!(ident.class, Class::CLASS64);
        assert_eq!(ident.encoding, Encoding::LSB2);
        assert_eq!(ident.os_abi, OsAbi::SYSV);
        assert_eq!(ident.abi_version, 0);

        bytes[7] = 3;
        let ident = ElfIdent::parse(&bytes).unwrap();
        assert_eq!(ident.os_abi, OsAbi::GNU);
    }

    #[test]
    fn short_input_is_truncated() {
        for length in 0..ElfHeader::SIZE {
            let bytes = vec![0x7F; length];
            assert_eq!(
                ElfIdent::parse(&bytes),
                Err(IdentError::TruncatedHeader { length })
            );
        }
    }

    #[test]
    fn bad_magic_regardless_of_rest() {
        let mut bytes = valid_prefix();
        bytes[1] = b'Z';

        assert_eq!(
            ElfIdent::parse(&bytes),
            Err(IdentError::BadMagic([0x7F, b'Z', b'L', b'F']))
        );
    }

    #[test]
    fn rejects_class32() {
        let mut bytes = valid_prefix();
        bytes[4] = 1;

        assert_eq!(
            ElfIdent::parse(&bytes),
            Err(IdentError::UnsupportedClass(Class::CLASS32))
        );
    }

    #[test]
    fn rejects_big_endian() {
        let mut bytes = valid_prefix();
        bytes[5] = 2;

        assert_eq!(
            ElfIdent::parse(&bytes),
            Err(IdentError::UnsupportedEncoding(Encoding::MSB2))
        );
    }

    #[test]
    fn rejects_unknown_ident_version() {
        let mut bytes = valid_prefix();
        bytes[6] = 2;

        assert_eq!(
            ElfIdent::parse(&bytes),
            Err(IdentError::UnsupportedIdentVersion(2))
        );
    }

    #[test]
    fn rejects_foreign_abi() {
        let mut bytes = valid_prefix();
        bytes[7] = 9;

        assert_eq!(
            ElfIdent::parse(&bytes),
            Err(IdentError::UnsupportedAbi {
                os_abi: OsAbi(9),
                abi_version: 0,
            })
        );

        let mut bytes = valid_prefix();
        bytes[8] = 1;
        assert_eq!(
            ElfIdent::parse(&bytes),
            Err(IdentError::UnsupportedAbi {
                os_abi: OsAbi::SYSV,
                abi_version: 1,
            })
        );
    }

    #[test]
    fn first_failing_check_wins() {
        // Fails the magic, class, encoding, version, and ABI checks all at
        // once; the magic check comes first.
        let bytes = [0xFF; ElfHeader::SIZE];
        assert_eq!(
            ElfIdent::parse(&bytes),
            Err(IdentError::BadMagic([0xFF; 4]))
        );

        // Fails class and encoding; class comes first.
        let mut bytes = valid_prefix();
        bytes[4] = 1;
        bytes[5] = 2;
        assert_eq!(
            ElfIdent::parse(&bytes),
            Err(IdentError::UnsupportedClass(Class::CLASS32))
        );
    }
}

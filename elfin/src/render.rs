//! Human-readable formatting of decoded ELF structures.
//!
//! Interpretation of type and flag values lives here, on the presentation
//! side; the decoder hands every field over verbatim.

use std::fmt::Write;

use elf::header::ElfHeader;
use elf::ident::ElfIdent;
use elf::program_header::ProgramHeader;
use elf::section_header::SectionHeader;

/// The column heading matching [`section_row()`].
pub const SECTION_ROW_HEADING: &str =
    "  idx type          flags              address    offset     size       name";

/// The column heading matching [`program_row()`].
pub const PROGRAM_ROW_HEADING: &str =
    "  idx type          flags  offset     vaddr              filesz     memsz";

/// Formats the identification prefix and file header as a field listing.
pub fn header(ident: &ElfIdent, header: &ElfHeader) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "class:         {:?}", ident.class);
    let _ = writeln!(out, "encoding:      {:?}", ident.encoding);
    let _ = writeln!(out, "ident version: {}", ident.version);
    let _ = writeln!(out, "OS/ABI:        {:?} (version {})", ident.os_abi, ident.abi_version);
    let _ = writeln!(out, "type:          {:?}", header.elf_type);
    let _ = writeln!(out, "machine:       {:?}", header.machine);
    let _ = writeln!(out, "version:       {}", header.version);
    let _ = writeln!(out, "entry:         {:#x}", header.entry);
    let _ = writeln!(out, "flags:         {:#x}", header.flags);
    let _ = writeln!(out, "header size:   {}", header.header_size);
    let _ = writeln!(
        out,
        "pht:           offset {:#x}, {} entries of {} bytes",
        header.program_header_offset, header.program_header_count, header.program_header_size,
    );
    let _ = writeln!(
        out,
        "sht:           offset {:#x}, {} entries of {} bytes",
        header.section_header_offset, header.section_header_count, header.section_header_size,
    );
    let _ = writeln!(out, "shstrndx:      {}", header.string_table_index);

    out
}

/// Formats one section header as a table row.
pub fn section_row(index: u64, section: &SectionHeader) -> String {
    format!(
        "{index:5} {:<13} {:#018x} {:#010x} {:#010x} {:#010x} {}",
        format!("{:?}", section.section_type),
        section.flags,
        section.address,
        section.offset,
        section.size,
        section.name_offset,
    )
}

/// Formats one section header as a full field listing.
pub fn section_detail(index: u64, section: &SectionHeader) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "section {index}:");
    let _ = writeln!(out, "  name offset:   {}", section.name_offset);
    let _ = writeln!(out, "  type:          {:?}", section.section_type);
    let _ = writeln!(out, "  flags:         {:#x}", section.flags);
    let _ = writeln!(out, "  address:       {:#x}", section.address);
    let _ = writeln!(out, "  offset:        {:#x}", section.offset);
    let _ = writeln!(out, "  size:          {:#x}", section.size);
    let _ = writeln!(out, "  link:          {}", section.link);
    let _ = writeln!(out, "  info:          {}", section.info);
    let _ = writeln!(out, "  alignment:     {}", section.address_alignment);
    let _ = writeln!(out, "  entry size:    {}", section.entry_size);

    out
}

/// Formats one program header as a table row.
pub fn program_row(index: u64, program: &ProgramHeader) -> String {
    format!(
        "{index:5} {:<13} {:?}    {:#010x} {:#018x} {:#010x} {:#010x}",
        format!("{:?}", program.segment_type),
        program.flags,
        program.offset,
        program.virtual_address,
        program.file_size,
        program.memory_size,
    )
}

/// Formats one program header as a full field listing.
pub fn program_detail(index: u64, program: &ProgramHeader) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "segment {index}:");
    let _ = writeln!(out, "  type:          {:?}", program.segment_type);
    let _ = writeln!(out, "  flags:         {:?}", program.flags);
    let _ = writeln!(out, "  offset:        {:#x}", program.offset);
    let _ = writeln!(out, "  vaddr:         {:#x}", program.virtual_address);
    let _ = writeln!(out, "  paddr:         {:#x}", program.physical_address);
    let _ = writeln!(out, "  file size:     {:#x}", program.file_size);
    let _ = writeln!(out, "  memory size:   {:#x}", program.memory_size);
    let _ = writeln!(out, "  alignment:     {}", program.alignment);

    out
}

/// Formats `bytes` as a classic hex dump: sixteen bytes per line, with the
/// absolute file offset on the left (the table starts at `base`) and an
/// ASCII column on the right.
pub fn hex_dump(bytes: &[u8], base: u64) -> String {
    let mut out = String::new();

    for (offset, chunk) in (base..).step_by(16).zip(bytes.chunks(16)) {
        let _ = write!(out, "{offset:08x} ");

        for column in 0..16 {
            if column % 8 == 0 {
                out.push(' ');
            }
            match chunk.get(column) {
                Some(byte) => {
                    let _ = write!(out, "{byte:02x} ");
                }
                None => out.push_str("   "),
            }
        }

        out.push_str(" |");
        for byte in chunk {
            let c = char::from(*byte);
            out.push(if c.is_ascii_graphic() || c == ' ' { c } else { '.' });
        }
        out.push_str("|\n");
    }

    out
}

#[cfg(test)]
mod test {
    use elf::program_header::{ProgramHeader, SegmentFlags, SegmentType};

    use super::{hex_dump, program_row};

    #[test]
    fn hex_dump_layout() {
        let bytes: Vec<u8> = (0x41..0x41 + 20).collect();
        let dump = hex_dump(&bytes, 0x40);

        let mut lines = dump.lines();
        assert_eq!(
            lines.next(),
            Some(
                "00000040  41 42 43 44 45 46 47 48  49 4a 4b 4c 4d 4e 4f 50  |ABCDEFGHIJKLMNOP|"
            )
        );
        assert_eq!(
            lines.next(),
            Some(
                "00000050  51 52 53 54                                       |QRST|"
            )
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn hex_dump_of_nothing_is_empty() {
        assert_eq!(hex_dump(&[], 0), "");
    }

    #[test]
    fn program_row_contains_the_fields() {
        let program = ProgramHeader {
            segment_type: SegmentType::LOAD,
            flags: SegmentFlags(0x5),
            offset: 0x1000,
            virtual_address: 0x40_1000,
            physical_address: 0x40_1000,
            file_size: 0x20,
            memory_size: 0x20,
            alignment: 0x1000,
        };

        let row = program_row(3, &program);
        assert!(row.contains("Load"));
        assert!(row.contains("R-X"));
        assert!(row.contains("0x00001000"));
    }
}

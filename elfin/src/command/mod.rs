//! The interactive command loop: parsing and dispatch of shell commands.

use std::io::{self, BufRead, Write};
use std::{error, fmt};

use anyhow::{Context, Result};

use elf::{Elf, ElfError, source::ByteSource};

use crate::log::Logger;
use crate::render;

use self::lexer::{LexError, Token};

pub mod lexer;

/// A parsed shell command.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Command {
    /// Print the command summary.
    Help,
    /// Leave the shell.
    Quit,
    /// Print the decoded form of a [`Target`].
    Print(Target),
    /// Hex dump the raw bytes of a [`Target`].
    Dump(Target),
}

/// The object a command operates on.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Target {
    /// The ELF file header.
    Header,
    /// The section header table, or one of its entries.
    SectionTable(Option<u64>),
    /// The program header table, or one of its entries.
    ProgramTable(Option<u64>),
}

/// Parses one input line into a [`Command`].
///
/// Returns `Ok(None)` for a blank line.
///
/// # Errors
///
/// Returns [`ParseError`] if the line does not tokenize or does not match
/// the command grammar.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let tokens = lexer::tokenize(line)?;
    let mut tokens = tokens.into_iter();

    let Some(first) = tokens.next() else {
        return Ok(None);
    };
    let Token::Word(word) = first else {
        return Err(ParseError::ExpectedCommand(first));
    };

    let command = match word.as_str() {
        "help" => Command::Help,
        "q" | "quit" => Command::Quit,
        "p" | "print" => Command::Print(parse_target(&mut tokens)?),
        "d" | "dump" => Command::Dump(parse_target(&mut tokens)?),
        _ => return Err(ParseError::UnknownCommand(word)),
    };

    if let Some(trailing) = tokens.next() {
        return Err(ParseError::TrailingToken(trailing));
    }

    Ok(Some(command))
}

/// Parses the target of a `print` or `dump` command: `hdr`, `pht`, or
/// `sht`, optionally followed by an entry index for the two tables.
fn parse_target(tokens: &mut impl Iterator<Item = Token>) -> Result<Target, ParseError> {
    let Some(token) = tokens.next() else {
        return Err(ParseError::MissingTarget);
    };
    let Token::Word(word) = token else {
        return Err(ParseError::ExpectedTarget(token));
    };

    let index = match tokens.next() {
        None => None,
        Some(Token::Number(index)) => Some(index),
        Some(token) => return Err(ParseError::TrailingToken(token)),
    };

    match (word.as_str(), index) {
        ("hdr", None) => Ok(Target::Header),
        ("hdr", Some(_)) => Err(ParseError::IndexOnHeader),
        ("sht", index) => Ok(Target::SectionTable(index)),
        ("pht", index) => Ok(Target::ProgramTable(index)),
        _ => Err(ParseError::UnknownTarget(word)),
    }
}

/// The reason an input line was not a valid command.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum ParseError {
    /// The line did not tokenize.
    Lex(LexError),
    /// The line does not start with a command word.
    ExpectedCommand(Token),
    /// The command word is not recognized.
    UnknownCommand(String),
    /// A `print` or `dump` command has no target.
    MissingTarget,
    /// The target position holds a number instead of a target word.
    ExpectedTarget(Token),
    /// The target word is not recognized.
    UnknownTarget(String),
    /// The file header has no entry index.
    IndexOnHeader,
    /// The line continues past a complete command.
    TrailingToken(Token),
}

impl From<LexError> for ParseError {
    fn from(value: LexError) -> Self {
        Self::Lex(value)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(error) => fmt::Display::fmt(error, f),
            Self::ExpectedCommand(token) => {
                write!(f, "expected a command, got {token:?} (try \"help\")")
            }
            Self::UnknownCommand(word) => {
                write!(f, "unknown command \"{word}\" (try \"help\")")
            }
            Self::MissingTarget => write!(f, "expected a target: hdr, pht, or sht"),
            Self::ExpectedTarget(token) => {
                write!(f, "expected a target (hdr, pht, or sht), got {token:?}")
            }
            Self::UnknownTarget(word) => write!(f, "unknown target \"{word}\""),
            Self::IndexOnHeader => write!(f, "hdr does not take an entry index"),
            Self::TrailingToken(token) => write!(f, "unexpected trailing {token:?}"),
        }
    }
}

impl error::Error for ParseError {}

/// Runs the `cmd > ` read-eval loop against `elf` until `q` or end of
/// input.
///
/// Decoder errors are printed and the loop continues; only the loss of
/// stdin or stdout ends the session abnormally.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or stdout cannot be written.
pub fn run<S: ByteSource>(elf: &mut Elf<S>, logger: &mut Logger) -> Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("cmd > ");
        io::stdout().flush().context("failed to flush prompt")?;

        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("failed to read command")?;
        if read == 0 {
            // End of input.
            println!();
            break;
        }

        logger.line(&format!("cmd: {}", line.trim_end()));

        match parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(Command::Help)) => print_help(),
            Ok(Some(command)) => {
                if let Err(error) = execute(elf, &command) {
                    logger.line(&format!("error: {error}"));
                    println!("error: {error}");
                }
            }
            Err(error) => println!("{error}"),
        }
    }

    Ok(())
}

/// Executes one decoded command against the handle.
fn execute<S: ByteSource>(elf: &mut Elf<S>, command: &Command) -> Result<(), ElfError> {
    match command {
        Command::Help | Command::Quit => {}
        Command::Print(Target::Header) => {
            print!("{}", render::header(elf.ident()?, elf.header()?));
        }
        Command::Print(Target::SectionTable(None)) => {
            let count = u64::from(elf.header()?.section_header_count);
            println!("{}", render::SECTION_ROW_HEADING);
            for index in 0..count {
                println!("{}", render::section_row(index, &elf.section_header(index)?));
            }
        }
        Command::Print(Target::SectionTable(Some(index))) => {
            print!("{}", render::section_detail(*index, &elf.section_header(*index)?));
        }
        Command::Print(Target::ProgramTable(None)) => {
            let count = u64::from(elf.header()?.program_header_count);
            println!("{}", render::PROGRAM_ROW_HEADING);
            for index in 0..count {
                println!("{}", render::program_row(index, &elf.program_header(index)?));
            }
        }
        Command::Print(Target::ProgramTable(Some(index))) => {
            print!("{}", render::program_detail(*index, &elf.program_header(*index)?));
        }
        Command::Dump(Target::Header) => {
            println!("hdr has no raw table; use \"p hdr\"");
        }
        Command::Dump(Target::SectionTable(index)) => {
            let offset = elf.header()?.section_header_offset;
            let table = elf.load_section_header_table()?;
            match index {
                None => print!("{}", render::hex_dump(table.as_bytes(), offset)),
                Some(index) => {
                    let entry = table.entry(*index)?;
                    let base = entry_offset(offset, *index, table.entry_size());
                    print!("{}", render::hex_dump(entry, base));
                }
            }
        }
        Command::Dump(Target::ProgramTable(index)) => {
            let offset = elf.header()?.program_header_offset;
            let table = elf.load_program_header_table()?;
            match index {
                None => print!("{}", render::hex_dump(table.as_bytes(), offset)),
                Some(index) => {
                    let entry = table.entry(*index)?;
                    let base = entry_offset(offset, *index, table.entry_size());
                    print!("{}", render::hex_dump(entry, base));
                }
            }
        }
    }

    Ok(())
}

/// Returns the absolute file offset of entry `index` in a table that
/// starts at `offset`, saturating at `u64::MAX` instead of overflowing.
fn entry_offset(offset: u64, index: u64, entry_size: usize) -> u64 {
    let entry_size = u64::try_from(entry_size).unwrap_or(u64::MAX);
    index
        .checked_mul(entry_size)
        .and_then(|relative| offset.checked_add(relative))
        .unwrap_or(u64::MAX)
}

/// Prints the command summary.
fn print_help() {
    println!("p hdr        print the file header");
    println!("p sht [N]    print the section header table, or entry N");
    println!("p pht [N]    print the program header table, or entry N");
    println!("d sht [N]    hex dump the raw section header table, or entry N");
    println!("d pht [N]    hex dump the raw program header table, or entry N");
    println!("help         show this summary");
    println!("q            quit");
    println!();
    println!("N is decimal, or hexadecimal with a leading 0 (010 is sixteen).");
}

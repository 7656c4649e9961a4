//! `elfin` is an interactive investigator for 64-bit little-endian ELF
//! object files: it probes a file, decodes its header, and drops into a
//! small shell for printing and dumping the header tables.

use anyhow::{Context, Result, bail};

use elf::Elf;

use crate::log::Logger;

mod cli;
mod command;
mod log;
mod render;

fn main() -> Result<()> {
    let config = cli::parse_arguments();

    let mut logger = if config.log {
        Logger::create(log::LOG_FILE)?
    } else {
        Logger::disabled()
    };
    logger.line(&format!("inspecting \"{}\"", config.file.display()));

    // The cheap gate first, so pointing elfin at an arbitrary non-ELF file
    // yields a one-line reason instead of a decode attempt.
    if let Err(error) = elf::probe(&config.file) {
        logger.line(&format!("probe failed: {error}"));
        bail!("\"{}\" is not a supported ELF file: {error}", config.file.display());
    }

    let mut handle = Elf::open(&config.file)
        .with_context(|| format!("failed to open \"{}\"", config.file.display()))?;

    println!("elfin: inspecting \"{}\" (type \"help\" for commands)", config.file.display());
    let result = command::run(&mut handle, &mut logger);
    handle.close();

    logger.line("session closed");
    result
}

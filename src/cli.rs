//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - Global flags may appear before or after the subcommand.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::codepage::Codepage;
use crate::config::types::{Config, LogLevel};
use crate::entry_type::EntryType;

/// List and search directory entries.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "List and search directory entries")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Codepage for narrow names and paths (utf-8, ascii, iso-8859-1, iso-8859-15, windows-1252 or a numeric code).
    #[arg(long, global = true, value_name = "CODEPAGE")]
    pub codepage: Option<Codepage>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        global = true,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Also write logs to this file.
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print `<type>\t<name>` for every entry of a directory.
    List {
        #[arg(value_name = "PATH", value_hint = ValueHint::DirPath)]
        path: PathBuf,

        /// Use the wide (UTF-16) open and name calls.
        #[arg(long)]
        wide: bool,
    },

    /// Look for an entry by name; exits 0 when found and 1 when not.
    Has {
        #[arg(value_name = "PATH", value_hint = ValueHint::DirPath)]
        path: PathBuf,

        #[arg(value_name = "NAME")]
        name: String,

        /// Entry type to match: file, directory, link, device, pipe, socket, undefined.
        #[arg(long = "type", value_name = "TYPE", default_value_t = EntryType::File)]
        entry_type: EntryType,

        /// Compare names case-insensitively.
        #[arg(long)]
        no_case: bool,

        /// Use the wide (UTF-16) open and search calls.
        #[arg(long)]
        wide: bool,
    },

    /// Print the config file location and the effective settings.
    Config,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(cp) = self.codepage {
            cfg.codepage = cp;
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(file) = &self.log_file {
            cfg.log_file = Some(file.clone());
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

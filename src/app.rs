//! Application orchestrator.
//! Loads/merges config, initializes logging, then runs the requested subcommand
//! against the library.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};

use cdirectory::cli::{Args, Command};
use cdirectory::config::{CONFIG_ENV, config_path, load_config};
use cdirectory::output as out;
use cdirectory::system_string::{narrow_from_wide, wide_from_narrow};
use cdirectory::{Codepage, CompareFlags, Config, Directory, DirectoryEntry, EntryType};

use crate::logging::init_tracing;

/// Exit status of `has` when nothing matched.
const EXIT_NOT_FOUND: u8 = 1;

/// Run the CLI application.
pub fn run(args: Args) -> Result<ExitCode> {
    // Build config (may read XML). CLI args override config values.
    let (mut cfg, loaded_from) = load_config()?;
    args.apply_overrides(&mut cfg);

    // Hold the guard until exit so the file appender flushes.
    let _guard = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json)
        .context("initialize logging")?;

    debug!(?args, "starting cdirectory {}", cdirectory::version());

    match &args.command {
        Command::List { path, wide } => list(&cfg, path, *wide),
        Command::Has {
            path,
            name,
            entry_type,
            no_case,
            wide,
        } => {
            let flags = if *no_case {
                CompareFlags::NO_CASE
            } else {
                CompareFlags::empty()
            };
            has(&cfg, path, name, *entry_type, flags, *wide)
        }
        Command::Config => {
            print_config(&cfg, loaded_from.as_deref());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn list(cfg: &Config, path: &Path, wide: bool) -> Result<ExitCode> {
    let mut dir = Directory::with_codepage(cfg.codepage);
    open_directory(&mut dir, path, wide)?;

    let mut entry = DirectoryEntry::with_codepage(cfg.codepage);
    let mut count = 0usize;
    while dir
        .read_entry(&mut entry)
        .with_context(|| format!("read '{}'", path.display()))?
    {
        let name = display_name(&entry, wide)?;
        out::print_user(&format!("{}\t{}", entry.entry_type()?, name));
        count += 1;
    }
    dir.close()?;

    info!(path = %path.display(), count, "listed directory");
    Ok(ExitCode::SUCCESS)
}

fn has(
    cfg: &Config,
    path: &Path,
    name: &str,
    entry_type: EntryType,
    flags: CompareFlags,
    wide: bool,
) -> Result<ExitCode> {
    let mut dir = Directory::with_codepage(cfg.codepage);
    open_directory(&mut dir, path, wide)?;

    let mut entry = DirectoryEntry::with_codepage(cfg.codepage);
    let found = if wide {
        dir.has_entry_wide(&mut entry, &to_wide(name), entry_type, flags)?
    } else {
        let narrow = to_narrow(name, cfg.codepage).context("encode name")?;
        dir.has_entry(&mut entry, &narrow, entry_type, flags)?
    };
    dir.close()?;

    if !found {
        info!(path = %path.display(), name, %entry_type, %flags, "no matching entry");
        return Ok(ExitCode::from(EXIT_NOT_FOUND));
    }
    let matched = display_name(&entry, wide)?;
    info!(path = %path.display(), name, matched = %matched, %entry_type, "found entry");
    out::print_user(&matched);
    Ok(ExitCode::SUCCESS)
}

/// Narrow mode hands the OS path over as-is; the codepage only applies to
/// entry names.
fn open_directory(dir: &mut Directory, path: &Path, wide: bool) -> Result<()> {
    if wide {
        dir.open_wide(&to_wide(&path.to_string_lossy()))?;
    } else {
        dir.open_path(path)?;
    }
    Ok(())
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn to_narrow(s: &str, codepage: Codepage) -> Result<Vec<u8>> {
    Ok(narrow_from_wide(&to_wide(s), codepage)?)
}

/// Decode an entry name for the terminal, through the same encoding the
/// listing was requested in.
fn display_name(entry: &DirectoryEntry, wide: bool) -> Result<String> {
    if wide {
        return Ok(String::from_utf16_lossy(entry.name_wide()?));
    }
    let narrow = entry.name()?;
    Ok(match wide_from_narrow(narrow, entry.codepage()) {
        Ok(w) => String::from_utf16_lossy(&w),
        Err(_) => entry.name_lossy(),
    })
}

fn print_config(cfg: &Config, loaded_from: Option<&Path>) {
    match (loaded_from, config_path()) {
        (Some(p), _) => out::print_info(&format!("Using config file: {}", p.display())),
        (None, Some(p)) => out::print_info(&format!(
            "No config file at {} (defaults in use). Set {CONFIG_ENV} to use another file.",
            p.display()
        )),
        (None, None) => out::print_info("Could not determine a config location; defaults in use."),
    }
    out::print_user(&format!("codepage\t{}", cfg.codepage));
    out::print_user(&format!("log_level\t{}", cfg.log_level));
    let log_file = cfg
        .log_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".into());
    out::print_user(&format!("log_file\t{log_file}"));
}

//! Core library for `cdirectory`.
//!
//! Enumerates one directory level at a time over the platform primitives:
//! - Windows: `FindFirstFileW` / `FindNextFileW` / `FindClose`
//! - Unix: `opendir` / `readdir` / `closedir`
//!
//! ```no_run
//! use cdirectory::{CompareFlags, Directory, DirectoryEntry, EntryType};
//!
//! # fn main() -> Result<(), cdirectory::DirectoryError> {
//! let mut dir = Directory::new();
//! let mut entry = DirectoryEntry::new();
//! dir.open(b".")?;
//! while dir.read_entry(&mut entry)? {
//!     println!("{}\t{}", entry.entry_type()?, entry.name_lossy());
//! }
//! dir.close()?;
//!
//! dir.open(b".")?;
//! let found = dir.has_entry(&mut entry, b"Cargo.toml", EntryType::File, CompareFlags::NO_CASE)?;
//! # let _ = found;
//! # Ok(())
//! # }
//! ```
//!
//! Narrow strings are bytes in an explicit [`Codepage`]; wide strings are UTF-16.

pub mod cli;
pub mod codepage;
pub mod config;
pub mod directory;
pub mod entry;
pub mod entry_type;
pub mod errors;
pub mod output;
mod platform;
pub mod search;
pub mod system_string;

pub use codepage::Codepage;
pub use config::{Config, LogLevel, default_config_path, path_has_symlink_ancestor};
pub use directory::{Directory, Entries};
pub use entry::DirectoryEntry;
pub use entry_type::EntryType;
pub use errors::{DirectoryError, ErrorDomain};
pub use search::CompareFlags;
pub use system_string::ConversionError;

/// Library version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Name lookup over an open directory.
//!
//! `has_entry` scans the remaining entries of a directory the caller has
//! already opened. Among entries of the requested type with a name of the
//! query's length:
//! - an exact match is copied out and ends the scan;
//! - with `CompareFlags::NO_CASE`, the first caseless match is copied out and
//!   the scan continues, since a later exact match replaces it.
//!
//! Later caseless matches never replace the first one.

use std::fmt;

use bitflags::bitflags;
use tracing::debug;

use crate::directory::Directory;
use crate::entry::DirectoryEntry;
use crate::entry_type::EntryType;
use crate::errors::DirectoryError;

bitflags! {
    /// Name comparison options for [`Directory::has_entry`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CompareFlags: u8 {
        /// Compare names case-insensitively.
        const NO_CASE = 0x01;
    }
}

/// Validate raw flag bits; any bit other than `NO_CASE` is rejected.
impl TryFrom<u8> for CompareFlags {
    type Error = DirectoryError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        CompareFlags::from_bits(bits).ok_or(DirectoryError::UnsupportedValue {
            what: "compare flags",
            value: u32::from(bits),
        })
    }
}

impl fmt::Display for CompareFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contains(CompareFlags::NO_CASE) {
            f.write_str("no-case")
        } else {
            f.write_str("exact")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameMatch {
    Exact,
    Caseless,
}

impl Directory {
    /// Look for an entry of `entry_type` named `name` (narrow, in this
    /// directory's codepage). On success the match is copied into `entry`.
    ///
    /// The directory must already be open. The scan consumes entries from the
    /// current read position onwards.
    pub fn has_entry(
        &mut self,
        entry: &mut DirectoryEntry,
        name: &[u8],
        entry_type: EntryType,
        flags: CompareFlags,
    ) -> Result<bool, DirectoryError> {
        self.search_by(entry, entry_type, flags, |candidate| {
            Ok(match_narrow(candidate.name()?, name))
        })
    }

    /// Same as [`Directory::has_entry`] for a wide (UTF-16) name.
    pub fn has_entry_wide(
        &mut self,
        entry: &mut DirectoryEntry,
        name: &[u16],
        entry_type: EntryType,
        flags: CompareFlags,
    ) -> Result<bool, DirectoryError> {
        self.search_by(entry, entry_type, flags, |candidate| {
            Ok(match_wide(candidate.name_wide()?, name))
        })
    }

    fn search_by<F>(
        &mut self,
        entry: &mut DirectoryEntry,
        entry_type: EntryType,
        flags: CompareFlags,
        compare: F,
    ) -> Result<bool, DirectoryError>
    where
        F: Fn(&DirectoryEntry) -> Result<Option<NameMatch>, DirectoryError>,
    {
        let no_case = flags.contains(CompareFlags::NO_CASE);
        let mut candidate = DirectoryEntry::with_codepage(self.codepage());
        let mut found_caseless = false;

        while self.read_entry(&mut candidate)? {
            if candidate.entry_type()? != entry_type {
                continue;
            }
            match compare(&candidate)? {
                Some(NameMatch::Exact) => {
                    entry.copy_from(&candidate);
                    debug!(name = %candidate.name_lossy(), %entry_type, "exact match");
                    return Ok(true);
                }
                Some(NameMatch::Caseless) if no_case && !found_caseless => {
                    entry.copy_from(&candidate);
                    found_caseless = true;
                    debug!(name = %candidate.name_lossy(), %entry_type, "caseless match, scanning on");
                }
                _ => {}
            }
        }

        debug!(%entry_type, %flags, found = found_caseless, "directory search finished");
        Ok(found_caseless)
    }
}

fn match_narrow(candidate: &[u8], query: &[u8]) -> Option<NameMatch> {
    if candidate.len() != query.len() {
        return None;
    }
    if candidate == query {
        Some(NameMatch::Exact)
    } else if candidate.eq_ignore_ascii_case(query) {
        Some(NameMatch::Caseless)
    } else {
        None
    }
}

fn match_wide(candidate: &[u16], query: &[u16]) -> Option<NameMatch> {
    if candidate.len() != query.len() {
        return None;
    }
    if candidate == query {
        Some(NameMatch::Exact)
    } else if candidate
        .iter()
        .zip(query)
        .all(|(&a, &b)| fold_unit(a) == fold_unit(b))
    {
        Some(NameMatch::Caseless)
    } else {
        None
    }
}

/// Lowercase a single UTF-16 unit. Surrogates and characters whose lowercase
/// form is not a single BMP character are left as they are.
fn fold_unit(unit: u16) -> u16 {
    let Some(c) = char::from_u32(u32::from(unit)) else {
        return unit;
    };
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => u16::try_from(u32::from(l)).unwrap_or(unit),
        _ => unit,
    }
}

//! Directory entry snapshot.
//!
//! A `DirectoryEntry` holds exactly one platform record at a time plus a
//! lazily computed copy of its name in the non-native encoding:
//! - Unix: the native name is narrow (`d_name` bytes); the wide (UTF-16) name is derived.
//! - Windows: the native name is wide (`cFileName`); the narrow name is derived.
//!
//! The derived name belongs to one generation of the record. Every read or
//! copy into the entry discards it, and it is never copied between entries.

use std::cell::OnceCell;

use crate::codepage::Codepage;
use crate::entry_type::EntryType;
use crate::errors::DirectoryError;
use crate::platform::{self, AltChar, NativeChar, RawEntry};

#[derive(Debug, Default)]
pub struct DirectoryEntry {
    raw: RawEntry,
    codepage: Codepage,
    alternate_name: OnceCell<Vec<AltChar>>,
}

impl DirectoryEntry {
    /// Empty entry using the UTF-8 codepage; populate it with `Directory::read_entry`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty entry whose narrow name is transcoded with `codepage`.
    pub fn with_codepage(codepage: Codepage) -> Self {
        Self {
            codepage,
            ..Self::default()
        }
    }

    /// Release the entry held in `slot`. A `None` slot is a no-op.
    pub fn free(slot: &mut Option<DirectoryEntry>) {
        slot.take();
    }

    pub fn codepage(&self) -> Codepage {
        self.codepage
    }

    /// Replace this entry's record with a copy of `source`'s.
    ///
    /// Only the platform record is copied; this entry keeps its own codepage
    /// and recomputes its derived name on the next request.
    pub fn copy_from(&mut self, source: &DirectoryEntry) {
        *self.raw_mut() = source.raw.clone();
    }

    pub fn entry_type(&self) -> Result<EntryType, DirectoryError> {
        self.raw.entry_type()
    }

    /// Entry name as a narrow string.
    pub fn name(&self) -> Result<&[u8], DirectoryError> {
        #[cfg(unix)]
        {
            Ok(self.native_name())
        }
        #[cfg(windows)]
        {
            self.derived_name()
        }
    }

    /// Entry name as a wide (UTF-16) string.
    pub fn name_wide(&self) -> Result<&[u16], DirectoryError> {
        #[cfg(unix)]
        {
            self.derived_name()
        }
        #[cfg(windows)]
        {
            Ok(self.native_name())
        }
    }

    /// Lossy UTF-8 rendering of the name, for display and logging.
    pub fn name_lossy(&self) -> String {
        #[cfg(unix)]
        {
            String::from_utf8_lossy(self.native_name()).into_owned()
        }
        #[cfg(windows)]
        {
            String::from_utf16_lossy(self.native_name())
        }
    }

    fn native_name(&self) -> &[NativeChar] {
        self.raw.native_name()
    }

    fn derived_name(&self) -> Result<&[AltChar], DirectoryError> {
        if let Some(name) = self.alternate_name.get() {
            return Ok(name.as_slice());
        }
        let name = self
            .raw
            .alternate_name(self.codepage)
            .map_err(DirectoryError::conversion("directory entry name"))?;
        Ok(self.alternate_name.get_or_init(|| name).as_slice())
    }

    /// Mutable access to the platform record. The derived name is dropped first
    /// since it would describe the previous record.
    pub(crate) fn raw_mut(&mut self) -> &mut platform::RawEntry {
        self.alternate_name.take();
        &mut self.raw
    }

    #[cfg(test)]
    pub(crate) fn has_cached_name(&self) -> bool {
        self.alternate_name.get().is_some()
    }
}

impl Clone for DirectoryEntry {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            codepage: self.codepage,
            alternate_name: OnceCell::new(),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn entry(d_type: u8, name: &[u8]) -> DirectoryEntry {
        let mut e = DirectoryEntry::new();
        *e.raw_mut() = RawEntry::from_parts(d_type, name);
        e
    }

    #[test]
    fn new_entry_is_undefined_and_unnamed() {
        let e = DirectoryEntry::new();
        assert_eq!(e.entry_type().unwrap(), EntryType::Undefined);
        assert_eq!(e.name().unwrap(), b"");
        assert!(e.name_wide().unwrap().is_empty());
    }

    #[test]
    fn wide_name_is_cached_per_record() {
        let mut e = entry(libc::DT_REG, b"first.txt");
        assert!(!e.has_cached_name());
        let wide: Vec<u16> = "first.txt".encode_utf16().collect();
        assert_eq!(e.name_wide().unwrap(), wide.as_slice());
        assert!(e.has_cached_name());

        *e.raw_mut() = RawEntry::from_parts(libc::DT_DIR, b"second");
        assert!(!e.has_cached_name(), "replacing the record drops the cache");
        let wide: Vec<u16> = "second".encode_utf16().collect();
        assert_eq!(e.name_wide().unwrap(), wide.as_slice());
    }

    #[test]
    fn copy_preserves_type_but_not_cache() {
        let src = entry(libc::DT_DIR, b"sub");
        src.name_wide().unwrap();
        assert!(src.has_cached_name());

        let mut dest = entry(libc::DT_REG, b"old");
        dest.name_wide().unwrap();
        dest.copy_from(&src);
        assert!(!dest.has_cached_name());
        assert_eq!(dest.entry_type().unwrap(), src.entry_type().unwrap());
        assert_eq!(dest.name().unwrap(), b"sub");
        assert_eq!(dest.name_wide().unwrap(), src.name_wide().unwrap());
    }

    #[test]
    fn clone_starts_with_empty_cache() {
        let src = entry(libc::DT_REG, b"a");
        src.name_wide().unwrap();
        let copy = src.clone();
        assert!(!copy.has_cached_name());
        assert_eq!(copy.name().unwrap(), b"a");
    }

    #[test]
    fn codepage_drives_wide_name() {
        let mut e = DirectoryEntry::with_codepage(Codepage::Windows1252);
        *e.raw_mut() = RawEntry::from_parts(libc::DT_REG, b"caf\xe9");
        let wide: Vec<u16> = "café".encode_utf16().collect();
        assert_eq!(e.name_wide().unwrap(), wide.as_slice());
    }

    #[test]
    fn invalid_utf8_name_is_a_conversion_error() {
        let e = entry(libc::DT_REG, b"bad\xff");
        let err = e.name_wide().unwrap_err();
        assert_eq!(err.domain(), crate::errors::ErrorDomain::Conversion);
        assert!(!e.has_cached_name());
        assert_eq!(e.name_lossy(), "bad\u{FFFD}");
    }

    #[test]
    fn free_is_a_noop_on_none() {
        let mut slot: Option<DirectoryEntry> = None;
        DirectoryEntry::free(&mut slot);
        let mut slot = Some(DirectoryEntry::new());
        DirectoryEntry::free(&mut slot);
        assert!(slot.is_none());
    }
}

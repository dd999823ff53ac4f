//! Directory handle.
//!
//! A `Directory` owns at most one platform enumeration resource:
//! - Unix: a `DIR*` stream; entries come from `readdir`, one per read.
//! - Windows: a find handle; `FindFirstFileW` hands back the first entry at open
//!   time, so that entry is parked in `pending_first_entry` and served by the
//!   next read instead of calling `FindNextFileW`.
//!
//! States: unopened -> open -> closed (closed behaves exactly like unopened).
//! Dropping an open `Directory` closes it; a failure there is only logged.

use std::path::Path;

use tracing::{trace, warn};

use crate::codepage::Codepage;
use crate::entry::DirectoryEntry;
use crate::errors::DirectoryError;
use crate::platform::{self, NativePath, RawEntry};

#[cfg(unix)]
use crate::platform::DirStream;
#[cfg(windows)]
use crate::platform::SearchHandle;

/// Platform enumeration resource; exactly one variant exists per target.
#[derive(Debug)]
enum Resource {
    #[cfg(unix)]
    Stream(DirStream),
    #[cfg(windows)]
    Search(SearchHandle),
}

impl Resource {
    fn read_next(&mut self, raw: &mut RawEntry) -> std::io::Result<bool> {
        match self {
            #[cfg(unix)]
            Resource::Stream(stream) => stream.read(raw),
            #[cfg(windows)]
            Resource::Search(handle) => handle.find_next(raw),
        }
    }

    fn release(self) -> std::io::Result<()> {
        match self {
            #[cfg(unix)]
            Resource::Stream(stream) => stream.close(),
            #[cfg(windows)]
            Resource::Search(handle) => handle.close(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Directory {
    resource: Option<Resource>,
    pending_first_entry: Option<DirectoryEntry>,
    codepage: Codepage,
}

impl Directory {
    /// Unopened directory using the UTF-8 codepage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unopened directory that transcodes narrow paths and names with `codepage`.
    pub fn with_codepage(codepage: Codepage) -> Self {
        Self {
            resource: None,
            pending_first_entry: None,
            codepage,
        }
    }

    /// Close and release the directory held in `slot`. A `None` slot is a no-op.
    ///
    /// The directory is released even when closing it fails; the close error
    /// is still returned.
    pub fn free(slot: &mut Option<Directory>) -> Result<(), DirectoryError> {
        match slot.take() {
            Some(mut directory) => directory.close(),
            None => Ok(()),
        }
    }

    pub fn codepage(&self) -> Codepage {
        self.codepage
    }

    pub fn is_open(&self) -> bool {
        self.resource.is_some()
    }

    /// Open a directory given as a narrow string in this directory's codepage.
    pub fn open(&mut self, name: &[u8]) -> Result<(), DirectoryError> {
        self.ensure_unopened()?;
        let path = platform::path_from_narrow(name, self.codepage)?;
        self.open_native(path)
    }

    /// Open a directory given as a wide (UTF-16) string.
    pub fn open_wide(&mut self, name: &[u16]) -> Result<(), DirectoryError> {
        self.ensure_unopened()?;
        let path = platform::path_from_wide(name, self.codepage)?;
        self.open_native(path)
    }

    /// Open a directory given as an OS path, without any codepage conversion.
    pub fn open_path(&mut self, path: impl AsRef<Path>) -> Result<(), DirectoryError> {
        self.ensure_unopened()?;
        let path = platform::path_from_os(path.as_ref())?;
        self.open_native(path)
    }

    fn ensure_unopened(&self) -> Result<(), DirectoryError> {
        if self.resource.is_some() {
            return Err(DirectoryError::ValueAlreadySet("handle"));
        }
        if self.pending_first_entry.is_some() {
            return Err(DirectoryError::ValueAlreadySet("first entry"));
        }
        Ok(())
    }

    #[cfg(unix)]
    fn open_native(&mut self, path: NativePath) -> Result<(), DirectoryError> {
        let stream = DirStream::open(&path).map_err(|source| DirectoryError::OpenFailed {
            path: platform::display_path(&path),
            source,
        })?;
        trace!(path = %platform::display_path(&path), "opened directory stream");
        self.resource = Some(Resource::Stream(stream));
        Ok(())
    }

    #[cfg(windows)]
    fn open_native(&mut self, path: NativePath) -> Result<(), DirectoryError> {
        let pattern = platform::search_pattern(&path);
        // Dropped on failure, so nothing of a failed open is kept.
        let mut first_entry = DirectoryEntry::with_codepage(self.codepage);
        let handle = SearchHandle::find_first(&pattern, first_entry.raw_mut()).map_err(|source| {
            DirectoryError::OpenFailed {
                path: platform::display_path(&path),
                source,
            }
        })?;
        trace!(path = %platform::display_path(&path), "opened directory search");
        self.pending_first_entry = Some(first_entry);
        self.resource = Some(Resource::Search(handle));
        Ok(())
    }

    /// Close the directory. Closing an unopened directory succeeds.
    ///
    /// The resource is forgotten even when releasing it fails, so a second
    /// close never releases it twice.
    pub fn close(&mut self) -> Result<(), DirectoryError> {
        self.pending_first_entry = None;
        let Some(resource) = self.resource.take() else {
            return Ok(());
        };
        resource
            .release()
            .map_err(|source| DirectoryError::CloseFailed { source })?;
        trace!("closed directory");
        Ok(())
    }

    /// Read the next entry into `entry`.
    ///
    /// Returns `Ok(true)` when an entry was read and `Ok(false)` once the
    /// directory is exhausted.
    pub fn read_entry(&mut self, entry: &mut DirectoryEntry) -> Result<bool, DirectoryError> {
        let Some(resource) = self.resource.as_mut() else {
            return Err(DirectoryError::ValueMissing("handle"));
        };
        if let Some(first_entry) = self.pending_first_entry.take() {
            entry.copy_from(&first_entry);
            return Ok(true);
        }
        resource
            .read_next(entry.raw_mut())
            .map_err(|source| DirectoryError::ReadFailed { source })
    }

    /// Iterate over the remaining entries. Iteration ends after exhaustion or
    /// the first error.
    pub fn entries(&mut self) -> Entries<'_> {
        Entries {
            directory: self,
            done: false,
        }
    }
}

impl Drop for Directory {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, code = e.code(), os_code = ?e.os_code(), "failed to close directory on drop");
        }
    }
}

/// Iterator returned by [`Directory::entries`].
pub struct Entries<'a> {
    directory: &'a mut Directory,
    done: bool,
}

impl Iterator for Entries<'_> {
    type Item = Result<DirectoryEntry, DirectoryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut entry = DirectoryEntry::with_codepage(self.directory.codepage);
        match self.directory.read_entry(&mut entry) {
            Ok(true) => Some(Ok(entry)),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for Entries<'_> {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::entry_type::EntryType;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn new_directory_is_unopened() {
        let dir = Directory::new();
        assert!(!dir.is_open());
        assert!(dir.pending_first_entry.is_none());
    }

    #[test]
    fn stream_model_never_buffers_a_first_entry() {
        let td = tempdir().unwrap();
        let mut dir = Directory::new();
        dir.open_path(td.path()).unwrap();
        assert!(dir.is_open());
        assert!(dir.pending_first_entry.is_none());
    }

    #[test]
    fn pending_first_entry_is_served_exactly_once() {
        let td = tempdir().unwrap();
        fs::create_dir(td.path().join("only")).unwrap();

        let mut dir = Directory::new();
        dir.open_path(td.path()).unwrap();
        let mut parked = DirectoryEntry::new();
        *parked.raw_mut() = RawEntry::from_parts(libc::DT_SOCK, b"parked");
        dir.pending_first_entry = Some(parked);

        let mut entry = DirectoryEntry::new();
        assert!(dir.read_entry(&mut entry).unwrap());
        assert_eq!(entry.name().unwrap(), b"parked");
        assert_eq!(entry.entry_type().unwrap(), EntryType::Socket);
        assert!(dir.pending_first_entry.is_none());

        // Subsequent reads come from the stream itself.
        let mut names = Vec::new();
        while dir.read_entry(&mut entry).unwrap() {
            names.push(entry.name().unwrap().to_vec());
        }
        assert!(names.contains(&b"only".to_vec()));
        assert!(!names.contains(&b"parked".to_vec()));
    }

    #[test]
    fn close_drops_unconsumed_first_entry() {
        let td = tempdir().unwrap();
        let mut dir = Directory::new();
        dir.open_path(td.path()).unwrap();
        dir.pending_first_entry = Some(DirectoryEntry::new());
        dir.close().unwrap();
        assert!(!dir.is_open());
        assert!(dir.pending_first_entry.is_none());
        // Reopening is allowed once both fields are clear.
        dir.open_path(td.path()).unwrap();
    }

    #[test]
    fn open_rejects_leftover_first_entry() {
        let td = tempdir().unwrap();
        let mut dir = Directory::new();
        dir.pending_first_entry = Some(DirectoryEntry::new());
        let err = dir.open_path(td.path()).unwrap_err();
        assert!(matches!(err, DirectoryError::ValueAlreadySet("first entry")));
        assert!(!dir.is_open());
    }

    #[test]
    fn read_clears_stale_wide_name() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("a"), b"").unwrap();
        let mut dir = Directory::new();
        dir.open_path(td.path()).unwrap();
        let mut entry = DirectoryEntry::new();
        assert!(dir.read_entry(&mut entry).unwrap());
        entry.name_wide().unwrap();
        assert!(entry.has_cached_name());
        if dir.read_entry(&mut entry).unwrap() {
            assert!(!entry.has_cached_name());
        }
    }

    #[test]
    fn entries_iterator_is_fused() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("x"), b"").unwrap();
        let mut dir = Directory::new();
        dir.open_path(td.path()).unwrap();
        let mut it = dir.entries();
        let names: Vec<String> = it.by_ref().map(|e| e.unwrap().name_lossy()).collect();
        assert!(names.iter().any(|n| n == "x"));
        assert!(it.next().is_none());
    }

    #[test]
    fn entries_on_closed_directory_yields_one_error() {
        let mut dir = Directory::new();
        let mut it = dir.entries();
        assert!(matches!(
            it.next(),
            Some(Err(DirectoryError::ValueMissing(_)))
        ));
        assert!(it.next().is_none());
    }
}

//! Unix stream model: `opendir` on the path itself, then one `readdir` per entry.
//!
//! Notes:
//! - `readdir` signals both end-of-stream and failure with NULL; errno is
//!   cleared before each call so the two can be told apart.
//! - Entry names are the raw `d_name` bytes; that is the native (narrow) form.

use std::ffi::{CStr, CString};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr::NonNull;

use nix::errno::Errno;

use crate::codepage::Codepage;
use crate::entry_type::EntryType;
use crate::errors::DirectoryError;
use crate::system_string::{self, ConversionError};

pub type NativeChar = u8;
pub type AltChar = u16;
pub type NativePath = CString;

/// Snapshot of the fields of a `dirent` that outlive the next `readdir`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    d_type: u8,
    name: Vec<u8>,
}

impl RawEntry {
    pub fn entry_type(&self) -> Result<EntryType, DirectoryError> {
        match self.d_type {
            libc::DT_BLK | libc::DT_CHR => Ok(EntryType::Device),
            libc::DT_DIR => Ok(EntryType::Directory),
            libc::DT_FIFO => Ok(EntryType::Pipe),
            libc::DT_LNK => Ok(EntryType::Link),
            libc::DT_REG => Ok(EntryType::File),
            libc::DT_SOCK => Ok(EntryType::Socket),
            libc::DT_UNKNOWN => Ok(EntryType::Undefined),
            other => Err(DirectoryError::UnsupportedValue {
                what: "directory entry type",
                value: u32::from(other),
            }),
        }
    }

    pub fn native_name(&self) -> &[u8] {
        &self.name
    }

    pub fn alternate_name(&self, codepage: Codepage) -> Result<Vec<AltChar>, ConversionError> {
        system_string::wide_from_narrow(&self.name, codepage)
    }

    #[cfg(test)]
    pub(crate) fn from_parts(d_type: u8, name: &[u8]) -> Self {
        Self {
            d_type,
            name: name.to_vec(),
        }
    }
}

/// Open `DIR*` stream. Closing is explicit via `close`; `Directory` owns the
/// drop-time cleanup.
#[derive(Debug)]
pub struct DirStream(NonNull<libc::DIR>);

// SAFETY: a DIR stream may be used from any thread as long as it is not used
// from two at once; `DirStream` is only reachable through `&mut`.
unsafe impl Send for DirStream {}

impl DirStream {
    pub fn open(path: &CStr) -> io::Result<Self> {
        let dir = unsafe { libc::opendir(path.as_ptr()) };
        NonNull::new(dir)
            .map(Self)
            .ok_or_else(io::Error::last_os_error)
    }

    /// Read the next entry into `raw`. `Ok(false)` means the stream is exhausted.
    pub fn read(&mut self, raw: &mut RawEntry) -> io::Result<bool> {
        Errno::clear();
        let ent = unsafe { libc::readdir(self.0.as_ptr()) };
        if ent.is_null() {
            let err = io::Error::last_os_error();
            return match err.raw_os_error() {
                None | Some(0) => Ok(false),
                Some(_) => Err(err),
            };
        }
        // SAFETY: readdir returned a non-null entry that stays valid until the
        // next call on this stream; everything needed is copied out here.
        let ent = unsafe { &*ent };
        let name = unsafe { CStr::from_ptr(ent.d_name.as_ptr()) };
        raw.d_type = ent.d_type;
        raw.name.clear();
        raw.name.extend_from_slice(name.to_bytes());
        Ok(true)
    }

    pub fn close(self) -> io::Result<()> {
        let rc = unsafe { libc::closedir(self.0.as_ptr()) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// Narrow paths are passed to `opendir` unchanged.
pub fn path_from_narrow(path: &[u8], _codepage: Codepage) -> Result<NativePath, DirectoryError> {
    CString::new(path).map_err(|_| DirectoryError::InvalidArgument("directory name"))
}

pub fn path_from_wide(path: &[u16], codepage: Codepage) -> Result<NativePath, DirectoryError> {
    let narrow = system_string::narrow_from_wide(path, codepage)
        .map_err(DirectoryError::conversion("directory name"))?;
    path_from_narrow(&narrow, codepage)
}

pub fn path_from_os(path: &Path) -> Result<NativePath, DirectoryError> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| DirectoryError::InvalidArgument("directory name"))
}

pub fn display_path(path: &NativePath) -> String {
    String::from_utf8_lossy(path.as_bytes()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn dirent_types_map_to_entry_types() {
        let cases = [
            (libc::DT_BLK, EntryType::Device),
            (libc::DT_CHR, EntryType::Device),
            (libc::DT_DIR, EntryType::Directory),
            (libc::DT_FIFO, EntryType::Pipe),
            (libc::DT_LNK, EntryType::Link),
            (libc::DT_REG, EntryType::File),
            (libc::DT_SOCK, EntryType::Socket),
            (libc::DT_UNKNOWN, EntryType::Undefined),
        ];
        for (d_type, expected) in cases {
            let raw = RawEntry::from_parts(d_type, b"x");
            assert_eq!(raw.entry_type().unwrap(), expected, "d_type {d_type}");
        }
    }

    #[test]
    fn unknown_dirent_type_fails_closed() {
        // DT_WHT (14) and anything past it is not a type we classify.
        let raw = RawEntry::from_parts(14, b"whiteout");
        let err = raw.entry_type().unwrap_err();
        assert!(matches!(err, DirectoryError::UnsupportedValue { value: 14, .. }));
    }

    #[test]
    fn stream_reads_until_exhausted() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("one"), b"1").unwrap();
        let path = path_from_os(dir.path()).unwrap();
        let mut stream = DirStream::open(&path).unwrap();
        let mut raw = RawEntry::default();
        let mut names = Vec::new();
        while stream.read(&mut raw).unwrap() {
            names.push(raw.native_name().to_vec());
        }
        assert!(names.contains(&b"one".to_vec()));
        assert!(!stream.read(&mut raw).unwrap(), "exhausted stream stays exhausted");
        stream.close().unwrap();
    }

    #[test]
    fn stale_errno_does_not_fail_end_of_stream() {
        let dir = tempdir().unwrap();
        let mut stream = DirStream::open(&path_from_os(dir.path()).unwrap()).unwrap();
        // Leave ENOENT behind in errno before draining the stream.
        let missing = path_from_os(&dir.path().join("missing")).unwrap();
        assert!(DirStream::open(&missing).is_err());

        let mut raw = RawEntry::default();
        while stream.read(&mut raw).unwrap() {}
        stream.close().unwrap();
    }

    #[test]
    fn opendir_on_file_is_enotdir() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        let err = DirStream::open(&path_from_os(&file).unwrap()).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ENOTDIR));
    }

    #[test]
    fn interior_nul_is_invalid_argument() {
        let err = path_from_narrow(b"a\0b", Codepage::Utf8).unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidArgument(_)));
    }
}

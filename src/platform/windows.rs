//! Windows find-first model.
//!
//! Notes:
//! - Directories are opened by searching `<path>\*`; `FindFirstFileW` returns
//!   the first matching record together with the search handle.
//! - Entry names are the UTF-16 `cFileName`; that is the native (wide) form.
//! - `ERROR_NO_MORE_FILES` from `FindNextFileW` is end-of-stream, not a failure.

use std::fmt;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use windows_sys::Win32::Foundation::{ERROR_NO_MORE_FILES, HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::Storage::FileSystem::{
    FILE_ATTRIBUTE_DEVICE, FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_REPARSE_POINT, FindClose,
    FindFirstFileW, FindNextFileW, WIN32_FIND_DATAW,
};

use crate::codepage::Codepage;
use crate::entry_type::EntryType;
use crate::errors::DirectoryError;
use crate::system_string::{self, ConversionError};

pub type NativeChar = u16;
pub type AltChar = u8;
/// Wide directory path without a trailing NUL.
pub type NativePath = Vec<u16>;

const BACKSLASH: u16 = b'\\' as u16;
const SLASH: u16 = b'/' as u16;
const WILDCARD: u16 = b'*' as u16;

/// Copy of the `WIN32_FIND_DATAW` record produced by the last find call.
#[derive(Clone, Copy)]
pub struct RawEntry {
    find_data: WIN32_FIND_DATAW,
}

impl Default for RawEntry {
    fn default() -> Self {
        // SAFETY: WIN32_FIND_DATAW is plain data; all-zero is a valid empty record.
        Self {
            find_data: unsafe { std::mem::zeroed() },
        }
    }
}

impl fmt::Debug for RawEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawEntry")
            .field("attributes", &self.find_data.dwFileAttributes)
            .field("name", &String::from_utf16_lossy(self.native_name()))
            .finish()
    }
}

impl RawEntry {
    pub fn entry_type(&self) -> Result<EntryType, DirectoryError> {
        let attributes = self.find_data.dwFileAttributes;
        let entry_type = if attributes & FILE_ATTRIBUTE_DEVICE != 0 {
            EntryType::Device
        } else if attributes & FILE_ATTRIBUTE_DIRECTORY != 0 {
            EntryType::Directory
        } else if attributes & FILE_ATTRIBUTE_REPARSE_POINT != 0 {
            EntryType::Link
        } else {
            EntryType::File
        };
        Ok(entry_type)
    }

    pub fn native_name(&self) -> &[u16] {
        let name = &self.find_data.cFileName;
        let len = name.iter().position(|&c| c == 0).unwrap_or(name.len());
        &name[..len]
    }

    pub fn alternate_name(&self, codepage: Codepage) -> Result<Vec<AltChar>, ConversionError> {
        system_string::narrow_from_wide(self.native_name(), codepage)
    }
}

/// Open find handle.
#[derive(Debug)]
pub struct SearchHandle(HANDLE);

// SAFETY: find handles are not tied to the creating thread; `SearchHandle`
// is only reachable through `&mut`.
unsafe impl Send for SearchHandle {}

impl SearchHandle {
    /// Start a search for the NUL-terminated `pattern`, storing the first record in `raw`.
    pub fn find_first(pattern: &[u16], raw: &mut RawEntry) -> io::Result<Self> {
        debug_assert_eq!(pattern.last(), Some(&0));
        let handle = unsafe { FindFirstFileW(pattern.as_ptr(), &mut raw.find_data) };
        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }
        Ok(Self(handle))
    }

    /// Read the next record into `raw`. `Ok(false)` means the search is exhausted.
    pub fn find_next(&mut self, raw: &mut RawEntry) -> io::Result<bool> {
        if unsafe { FindNextFileW(self.0, &mut raw.find_data) } == 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(ERROR_NO_MORE_FILES as i32) {
                return Ok(false);
            }
            return Err(err);
        }
        Ok(true)
    }

    pub fn close(self) -> io::Result<()> {
        if unsafe { FindClose(self.0) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// `<path>\*`, NUL-terminated. A separator is only added when the path does
/// not already end in one.
pub fn search_pattern(path: &[u16]) -> Vec<u16> {
    let mut pattern = Vec::with_capacity(path.len() + 3);
    pattern.extend_from_slice(path);
    if !matches!(path.last(), Some(&BACKSLASH) | Some(&SLASH)) {
        pattern.push(BACKSLASH);
    }
    pattern.push(WILDCARD);
    pattern.push(0);
    pattern
}

pub fn path_from_narrow(path: &[u8], codepage: Codepage) -> Result<NativePath, DirectoryError> {
    let wide = system_string::wide_from_narrow(path, codepage)
        .map_err(DirectoryError::conversion("directory name"))?;
    path_from_wide(&wide, codepage)
}

pub fn path_from_wide(path: &[u16], _codepage: Codepage) -> Result<NativePath, DirectoryError> {
    if path.contains(&0) {
        return Err(DirectoryError::InvalidArgument("directory name"));
    }
    Ok(path.to_vec())
}

pub fn path_from_os(path: &Path) -> Result<NativePath, DirectoryError> {
    let wide: Vec<u16> = path.as_os_str().encode_wide().collect();
    path_from_wide(&wide, Codepage::default())
}

pub fn display_path(path: &NativePath) -> String {
    String::from_utf16_lossy(path)
}

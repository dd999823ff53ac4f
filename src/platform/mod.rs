//! Platform-specific enumeration primitives.
//! Unix uses the stream model (`opendir`/`readdir`/`closedir`); Windows uses
//! the find-first model (`FindFirstFileW`/`FindNextFileW`/`FindClose`), whose
//! open call already yields the first entry. Both expose the same shapes so
//! `Directory` and `DirectoryEntry` stay platform-agnostic.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub(crate) use unix::{
    AltChar, DirStream, NativeChar, NativePath, RawEntry, display_path, path_from_narrow,
    path_from_os, path_from_wide,
};

#[cfg(windows)]
pub(crate) use windows::{
    AltChar, NativeChar, NativePath, RawEntry, SearchHandle, display_path, path_from_narrow,
    path_from_os, path_from_wide, search_pattern,
};

#[cfg(not(any(unix, windows)))]
compile_error!("cdirectory supports Unix (dirent) and Windows (find-first) targets only");

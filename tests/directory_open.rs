//! Open/close lifecycle of `Directory`.

use assert_fs::prelude::*;
use cdirectory::{Directory, DirectoryEntry, DirectoryError, ErrorDomain};

#[test]
fn open_read_close_then_reopen() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.txt").touch().unwrap();

    let mut dir = Directory::new();
    assert!(!dir.is_open());
    dir.open_path(temp.path()).unwrap();
    assert!(dir.is_open());

    let mut entry = DirectoryEntry::new();
    assert!(dir.read_entry(&mut entry).unwrap());

    dir.close().unwrap();
    assert!(!dir.is_open());

    // A closed directory behaves like a fresh one.
    dir.open_path(temp.path()).unwrap();
    assert!(dir.read_entry(&mut entry).unwrap());
}

#[test]
fn open_twice_is_value_already_set() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut dir = Directory::new();
    dir.open_path(temp.path()).unwrap();

    let err = dir.open_path(temp.path()).unwrap_err();
    assert!(matches!(err, DirectoryError::ValueAlreadySet(_)), "{err:?}");
    assert_eq!(err.domain(), ErrorDomain::Runtime);
    assert_eq!(err.code(), "value_already_set");

    // The first handle is untouched.
    assert!(dir.is_open());
    let mut entry = DirectoryEntry::new();
    assert!(dir.read_entry(&mut entry).unwrap());
}

#[test]
fn open_missing_directory_fails_with_os_code() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut dir = Directory::new();
    let err = dir.open_path(temp.path().join("does-not-exist")).unwrap_err();
    assert!(matches!(err, DirectoryError::OpenFailed { .. }), "{err:?}");
    assert_eq!(err.domain(), ErrorDomain::Io);
    assert!(err.os_code().is_some());
    assert!(!dir.is_open());
    assert!(err.to_string().contains("does-not-exist"));
}

#[test]
fn open_regular_file_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("plain.txt");
    file.write_str("not a directory").unwrap();

    let mut dir = Directory::new();
    let err = dir.open_path(file.path()).unwrap_err();
    assert!(matches!(err, DirectoryError::OpenFailed { .. }), "{err:?}");
    assert!(!dir.is_open());

    // Nothing of the failed open is kept.
    dir.open_path(temp.path()).unwrap();
}

#[test]
fn interior_nul_is_an_argument_error() {
    let mut dir = Directory::new();
    let err = dir.open(b"some\0where").unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidArgument(_)));
    assert_eq!(err.domain(), ErrorDomain::Arguments);

    let wide: Vec<u16> = "some\0where".encode_utf16().collect();
    let err = dir.open_wide(&wide).unwrap_err();
    assert_eq!(err.domain(), ErrorDomain::Arguments);
}

#[test]
fn narrow_and_wide_open_accept_the_same_path() {
    let temp = assert_fs::TempDir::new().unwrap();
    let text = temp.path().to_str().expect("temp path is UTF-8");

    let mut dir = Directory::new();
    dir.open(text.as_bytes()).unwrap();
    dir.close().unwrap();

    let wide: Vec<u16> = text.encode_utf16().collect();
    dir.open_wide(&wide).unwrap();
    dir.close().unwrap();
}

#[test]
fn close_without_open_and_twice_is_ok() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut dir = Directory::new();
    dir.close().unwrap();

    dir.open_path(temp.path()).unwrap();
    dir.close().unwrap();
    dir.close().unwrap();
}

#[test]
fn read_on_unopened_directory_is_value_missing() {
    let mut dir = Directory::new();
    let mut entry = DirectoryEntry::new();
    let err = dir.read_entry(&mut entry).unwrap_err();
    assert!(matches!(err, DirectoryError::ValueMissing(_)));
    assert_eq!(err.code(), "value_missing");
}

#[test]
fn free_accepts_none_and_open_directories() {
    let mut slot: Option<Directory> = None;
    Directory::free(&mut slot).unwrap();

    let temp = assert_fs::TempDir::new().unwrap();
    let mut dir = Directory::new();
    dir.open_path(temp.path()).unwrap();
    let mut slot = Some(dir);
    Directory::free(&mut slot).unwrap();
    assert!(slot.is_none());

    let mut entry_slot: Option<DirectoryEntry> = None;
    DirectoryEntry::free(&mut entry_slot);
}

#[test]
fn dropping_an_open_directory_is_fine() {
    let temp = assert_fs::TempDir::new().unwrap();
    for _ in 0..64 {
        let mut dir = Directory::new();
        dir.open_path(temp.path()).unwrap();
    }
}

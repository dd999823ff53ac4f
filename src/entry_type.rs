//! Directory entry classification.

use std::fmt;
use std::str::FromStr;

use crate::errors::DirectoryError;

/// Kind of a directory entry, derived from the platform record on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntryType {
    /// The platform did not report a type (`DT_UNKNOWN`).
    Undefined = 0,
    /// Block or character device.
    Device = 1,
    Directory = 2,
    File = 3,
    /// Symbolic link or reparse point.
    Link = 4,
    /// Named pipe (FIFO).
    Pipe = 5,
    Socket = 6,
}

impl EntryType {
    pub const ALL: [EntryType; 7] = [
        EntryType::Undefined,
        EntryType::Device,
        EntryType::Directory,
        EntryType::File,
        EntryType::Link,
        EntryType::Pipe,
        EntryType::Socket,
    ];

    /// Parse common names (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "undefined" | "unknown" => Some(EntryType::Undefined),
            "device" | "dev" => Some(EntryType::Device),
            "directory" | "dir" | "d" => Some(EntryType::Directory),
            "file" | "f" => Some(EntryType::File),
            "link" | "symlink" | "l" => Some(EntryType::Link),
            "pipe" | "fifo" => Some(EntryType::Pipe),
            "socket" | "sock" => Some(EntryType::Socket),
            _ => None,
        }
    }
}

impl TryFrom<u8> for EntryType {
    type Error = DirectoryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        EntryType::ALL
            .into_iter()
            .find(|t| *t as u8 == value)
            .ok_or(DirectoryError::UnsupportedValue {
                what: "entry type",
                value: u32::from(value),
            })
    }
}

impl From<EntryType> for u8 {
    fn from(t: EntryType) -> u8 {
        t as u8
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryType::Undefined => "undefined",
            EntryType::Device => "device",
            EntryType::Directory => "directory",
            EntryType::File => "file",
            EntryType::Link => "link",
            EntryType::Pipe => "pipe",
            EntryType::Socket => "socket",
        };
        f.write_str(s)
    }
}

impl FromStr for EntryType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid entry type: '{s}'"))
    }
}

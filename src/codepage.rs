//! Narrow-string codepages.
//!
//! A `Codepage` decides how narrow (8-bit) names and paths map to Unicode.
//! `Utf8` is the default; the single-byte legacy codepages are table driven.
//! The value is threaded explicitly through `Directory` and `DirectoryEntry`;
//! there is no process-wide codepage.

use std::fmt;
use std::str::FromStr;

use crate::errors::DirectoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codepage {
    /// UTF-8 narrow strings (code 0).
    #[default]
    Utf8,
    /// 7-bit US-ASCII.
    Ascii,
    /// ISO 8859-1 (Latin-1).
    Iso8859_1,
    /// ISO 8859-15 (Latin-9).
    Iso8859_15,
    /// Windows 1252 (Western European).
    Windows1252,
}

/// Windows 1252 code points for bytes 0x80..=0x9F; `None` marks unassigned bytes.
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

impl Codepage {
    /// Numeric codepage identifier (0 for UTF-8).
    pub const fn code(self) -> u32 {
        match self {
            Codepage::Utf8 => 0,
            Codepage::Ascii => 20127,
            Codepage::Iso8859_1 => 28591,
            Codepage::Iso8859_15 => 28605,
            Codepage::Windows1252 => 1252,
        }
    }

    pub fn from_code(code: u32) -> Result<Self, DirectoryError> {
        match code {
            0 | 65001 => Ok(Codepage::Utf8),
            20127 => Ok(Codepage::Ascii),
            28591 => Ok(Codepage::Iso8859_1),
            28605 => Ok(Codepage::Iso8859_15),
            1252 => Ok(Codepage::Windows1252),
            other => Err(DirectoryError::UnsupportedValue {
                what: "codepage",
                value: other,
            }),
        }
    }

    /// Parse a codepage name or numeric code (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u32>() {
            return Self::from_code(code).ok();
        }
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Codepage::Utf8),
            "ascii" | "us-ascii" => Some(Codepage::Ascii),
            "iso-8859-1" | "latin1" | "latin-1" => Some(Codepage::Iso8859_1),
            "iso-8859-15" | "latin9" | "latin-9" => Some(Codepage::Iso8859_15),
            "windows-1252" | "cp1252" => Some(Codepage::Windows1252),
            _ => None,
        }
    }

    pub(crate) fn is_single_byte(self) -> bool {
        !matches!(self, Codepage::Utf8)
    }

    /// Decode one byte of a single-byte codepage.
    pub(crate) fn decode_byte(self, byte: u8) -> Option<char> {
        if byte < 0x80 {
            return Some(char::from(byte));
        }
        match self {
            Codepage::Utf8 | Codepage::Ascii => None,
            Codepage::Iso8859_1 => Some(char::from(byte)),
            Codepage::Iso8859_15 => Some(match byte {
                0xA4 => '\u{20AC}',
                0xA6 => '\u{0160}',
                0xA8 => '\u{0161}',
                0xB4 => '\u{017D}',
                0xB8 => '\u{017E}',
                0xBC => '\u{0152}',
                0xBD => '\u{0153}',
                0xBE => '\u{0178}',
                other => char::from(other),
            }),
            Codepage::Windows1252 => match byte {
                0x80..=0x9F => WINDOWS_1252_HIGH[usize::from(byte - 0x80)],
                other => Some(char::from(other)),
            },
        }
    }

    /// Encode one character into a single-byte codepage.
    pub(crate) fn encode_char(self, c: char) -> Option<u8> {
        if c.is_ascii() {
            return Some(c as u8);
        }
        (0x80..=0xFFu8).find(|&b| self.decode_byte(b) == Some(c))
    }
}

impl fmt::Display for Codepage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Codepage::Utf8 => "utf-8",
            Codepage::Ascii => "ascii",
            Codepage::Iso8859_1 => "iso-8859-1",
            Codepage::Iso8859_15 => "iso-8859-15",
            Codepage::Windows1252 => "windows-1252",
        };
        f.write_str(s)
    }
}

impl FromStr for Codepage {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unsupported codepage: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_codes_parse() {
        assert_eq!(Codepage::parse("UTF-8"), Some(Codepage::Utf8));
        assert_eq!(Codepage::parse("cp1252"), Some(Codepage::Windows1252));
        assert_eq!(Codepage::parse("28605"), Some(Codepage::Iso8859_15));
        assert_eq!(Codepage::parse("0"), Some(Codepage::Utf8));
        assert_eq!(Codepage::parse("klingon"), None);
    }

    #[test]
    fn display_roundtrips_with_fromstr() {
        for cp in [
            Codepage::Utf8,
            Codepage::Ascii,
            Codepage::Iso8859_1,
            Codepage::Iso8859_15,
            Codepage::Windows1252,
        ] {
            assert_eq!(cp.to_string().parse::<Codepage>().unwrap(), cp);
            assert_eq!(Codepage::from_code(cp.code()).unwrap(), cp);
        }
    }

    #[test]
    fn unknown_code_is_unsupported() {
        let err = Codepage::from_code(932).unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::UnsupportedValue { what: "codepage", value: 932 }
        ));
    }

    #[test]
    fn windows_1252_high_range() {
        assert_eq!(Codepage::Windows1252.decode_byte(0x80), Some('€'));
        assert_eq!(Codepage::Windows1252.decode_byte(0x81), None);
        assert_eq!(Codepage::Windows1252.encode_char('€'), Some(0x80));
        assert_eq!(Codepage::Windows1252.encode_char('é'), Some(0xE9));
        assert_eq!(Codepage::Iso8859_1.encode_char('€'), None);
        assert_eq!(Codepage::Iso8859_15.encode_char('€'), Some(0xA4));
    }

    #[test]
    fn ascii_rejects_high_bytes() {
        assert_eq!(Codepage::Ascii.decode_byte(0xE9), None);
        assert_eq!(Codepage::Ascii.encode_char('é'), None);
        assert_eq!(Codepage::Ascii.encode_char('a'), Some(b'a'));
    }
}

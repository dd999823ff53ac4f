//! Narrow <-> wide string transcoding.
//!
//! Narrow strings are byte strings in a `Codepage`; wide strings are UTF-16.
//! Each direction comes as a size function and a conversion function so
//! callers can size buffers up front. Strings are slices without a trailing
//! NUL.

use thiserror::Error;

use crate::codepage::Codepage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("invalid UTF-8 sequence at byte {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("unpaired UTF-16 surrogate at unit {offset}")]
    InvalidUtf16 { offset: usize },

    #[error("byte {byte:#04x} at {offset} is not defined in {codepage}")]
    UnmappableByte {
        codepage: Codepage,
        byte: u8,
        offset: usize,
    },

    #[error("character {character:?} cannot be represented in {codepage}")]
    UnmappableChar { codepage: Codepage, character: char },
}

/// Number of UTF-16 units needed to hold `src` decoded from `codepage`.
pub fn wide_size_from_narrow(src: &[u8], codepage: Codepage) -> Result<usize, ConversionError> {
    if codepage.is_single_byte() {
        // Every supported single-byte codepage maps into the BMP.
        decode_single_byte(src, codepage).try_fold(0usize, |n, c| c.map(|_| n + 1))
    } else {
        Ok(utf8(src)?.encode_utf16().count())
    }
}

/// Decode `src` from `codepage` into UTF-16.
pub fn wide_from_narrow(src: &[u8], codepage: Codepage) -> Result<Vec<u16>, ConversionError> {
    let mut out = Vec::with_capacity(wide_size_from_narrow(src, codepage)?);
    if codepage.is_single_byte() {
        let mut buf = [0u16; 2];
        for c in decode_single_byte(src, codepage) {
            out.extend_from_slice(c?.encode_utf16(&mut buf));
        }
    } else {
        out.extend(utf8(src)?.encode_utf16());
    }
    Ok(out)
}

/// Number of bytes needed to hold `src` encoded into `codepage`.
pub fn narrow_size_from_wide(src: &[u16], codepage: Codepage) -> Result<usize, ConversionError> {
    let mut size = 0usize;
    for c in decode_utf16(src) {
        let c = c?;
        size += if codepage.is_single_byte() {
            encode_single_byte(c, codepage)?;
            1
        } else {
            c.len_utf8()
        };
    }
    Ok(size)
}

/// Encode the UTF-16 string `src` into `codepage`.
pub fn narrow_from_wide(src: &[u16], codepage: Codepage) -> Result<Vec<u8>, ConversionError> {
    let mut out = Vec::with_capacity(narrow_size_from_wide(src, codepage)?);
    let mut buf = [0u8; 4];
    for c in decode_utf16(src) {
        let c = c?;
        if codepage.is_single_byte() {
            out.push(encode_single_byte(c, codepage)?);
        } else {
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
    }
    Ok(out)
}

fn utf8(src: &[u8]) -> Result<&str, ConversionError> {
    std::str::from_utf8(src).map_err(|e| ConversionError::InvalidUtf8 {
        offset: e.valid_up_to(),
    })
}

fn decode_single_byte(
    src: &[u8],
    codepage: Codepage,
) -> impl Iterator<Item = Result<char, ConversionError>> + '_ {
    src.iter().enumerate().map(move |(offset, &byte)| {
        codepage
            .decode_byte(byte)
            .ok_or(ConversionError::UnmappableByte {
                codepage,
                byte,
                offset,
            })
    })
}

fn encode_single_byte(c: char, codepage: Codepage) -> Result<u8, ConversionError> {
    codepage
        .encode_char(c)
        .ok_or(ConversionError::UnmappableChar {
            codepage,
            character: c,
        })
}

fn decode_utf16(src: &[u16]) -> impl Iterator<Item = Result<char, ConversionError>> + '_ {
    let mut offset = 0usize;
    char::decode_utf16(src.iter().copied()).map(move |r| match r {
        Ok(c) => {
            offset += c.len_utf16();
            Ok(c)
        }
        Err(_) => Err(ConversionError::InvalidUtf16 { offset }),
    })
}

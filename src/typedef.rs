//! This module contains the enumerated types defined by the NRRD format:
//! the element type of the samples, the data encoding, and the axis order
//! used when presenting volumes as arrays.
//!
//! Each of these has a textual form in the header. Parsing accepts every
//! spelling the format allows, while formatting always produces the
//! canonical one.

use crate::error::{NrrdError, Result};
use byteordered::Endianness;
use std::fmt;
use std::str::FromStr;

/// Data type for representing the element type of the samples in a NRRD
/// volume, as declared by the `type` field.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum NrrdType {
    /// signed char, `int8`.
    Int8,
    /// unsigned char, `uint8`.
    Uint8,
    /// signed short, `int16`.
    Int16,
    /// unsigned short, `uint16`.
    Uint16,
    /// signed int, `int32`.
    Int32,
    /// unsigned int, `uint32`.
    Uint32,
    /// signed long long, `int64`.
    Int64,
    /// unsigned long long, `uint64`.
    Uint64,
    /// 32 bit float.
    Float,
    /// 64 bit float = double.
    Double,
    /// Opaque block of bytes, sized by the `block size` field.
    Block,
}

impl NrrdType {
    /// Retrieve the size of an element of this data type, in bytes.
    /// Returns `None` for `Block`, whose size is declared in the header.
    pub fn size_of(self) -> Option<usize> {
        use NrrdType::*;
        match self {
            Int8 | Uint8 => Some(1),
            Int16 | Uint16 => Some(2),
            Int32 | Uint32 | Float => Some(4),
            Int64 | Uint64 | Double => Some(8),
            Block => None,
        }
    }

    /// The canonical token of this type, as written by this crate.
    pub fn as_str(self) -> &'static str {
        use NrrdType::*;
        match self {
            Int8 => "int8",
            Uint8 => "uint8",
            Int16 => "int16",
            Uint16 => "uint16",
            Int32 => "int32",
            Uint32 => "uint32",
            Int64 => "int64",
            Uint64 => "uint64",
            Float => "float",
            Double => "double",
            Block => "block",
        }
    }
}

impl FromStr for NrrdType {
    type Err = NrrdError;

    fn from_str(s: &str) -> Result<Self> {
        use NrrdType::*;
        let t = match s {
            "signed char" | "int8" | "int8_t" => Int8,
            "uchar" | "unsigned char" | "uint8" | "uint8_t" => Uint8,
            "short" | "short int" | "signed short" | "signed short int" | "int16" | "int16_t" => {
                Int16
            }
            "ushort" | "unsigned short" | "unsigned short int" | "uint16" | "uint16_t" => Uint16,
            "int" | "signed int" | "int32" | "int32_t" => Int32,
            "uint" | "unsigned int" | "uint32" | "uint32_t" => Uint32,
            "longlong" | "long long" | "long long int" | "signed long long"
            | "signed long long int" | "int64" | "int64_t" => Int64,
            "ulonglong" | "unsigned long long" | "unsigned long long int" | "uint64"
            | "uint64_t" => Uint64,
            "float" => Float,
            "double" => Double,
            "block" => Block,
            _ => return Err(NrrdError::UnsupportedType(s.to_string())),
        };
        Ok(t)
    }
}

impl fmt::Display for NrrdType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The encoding of the data section, as declared by the `encoding` field.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Encoding {
    /// Uncompressed binary samples.
    Raw,
    /// Whitespace separated textual samples (`ascii`, `text`, `txt`).
    Ascii,
    /// Gzip compressed binary samples (`gzip`, `gz`).
    Gzip,
    /// Bzip2 compressed binary samples (`bzip2`, `bz2`).
    Bzip2,
}

impl Encoding {
    /// Whether the samples are stored in binary form, so that multi-byte
    /// element types need a byte order.
    pub fn is_binary(self) -> bool {
        self != Encoding::Ascii
    }

    /// Whether the data stream is compressed.
    pub fn is_compressed(self) -> bool {
        matches!(self, Encoding::Gzip | Encoding::Bzip2)
    }

    /// Conventional file name suffix for a detached data file holding data
    /// in this encoding.
    pub fn data_file_extension(self) -> &'static str {
        match self {
            Encoding::Raw => "raw",
            Encoding::Ascii => "txt",
            Encoding::Gzip => "raw.gz",
            Encoding::Bzip2 => "raw.bz2",
        }
    }

    /// The canonical token of this encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Raw => "raw",
            Encoding::Ascii => "ascii",
            Encoding::Gzip => "gzip",
            Encoding::Bzip2 => "bzip2",
        }
    }
}

impl FromStr for Encoding {
    type Err = NrrdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(Encoding::Raw),
            "ascii" | "text" | "txt" => Ok(Encoding::Ascii),
            "gzip" | "gz" => Ok(Encoding::Gzip),
            "bzip2" | "bz2" => Ok(Encoding::Bzip2),
            _ => Err(NrrdError::UnsupportedEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse the value of an `endian` field.
pub fn parse_endian(s: &str) -> Result<Endianness> {
    match s {
        "little" => Ok(Endianness::Little),
        "big" => Ok(Endianness::Big),
        _ => Err(NrrdError::InvalidEndian(s.to_string())),
    }
}

/// The token of an `endian` field for the given byte order.
pub fn endian_str(e: Endianness) -> &'static str {
    match e {
        Endianness::Little => "little",
        Endianness::Big => "big",
    }
}

/// The axis order in which volumes are presented as arrays.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum IndexOrder {
    /// The first axis varies fastest, matching the order of `sizes`
    /// (the format's native order, column major).
    Fortran,
    /// The first axis varies slowest: the axes are reversed with respect to
    /// `sizes` (row major).
    C,
}

impl Default for IndexOrder {
    fn default() -> Self {
        IndexOrder::Fortran
    }
}

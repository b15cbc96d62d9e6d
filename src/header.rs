//! This module defines the `NrrdHeader` struct, which holds the typed
//! fields and free form key/value pairs of a NRRD header, along with the
//! functions reading it from and writing it to a text stream.

use crate::error::{NrrdError, Result};
use crate::field::{field_type, is_known_field, FieldMap, FieldType, FIELD_ORDER};
use crate::formatter::format_field_value;
use crate::object::{DuplicateFieldPolicy, ReaderOptions, SpaceDirectionsRepr};
use crate::parser::parse_field_value;
use crate::value::Value;
use log::{debug, trace, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// The magic word opening every NRRD file.
pub const MAGIC_WORD: &str = "NRRD";

/// The newest format version understood by this crate.
pub const MAX_SUPPORTED_VERSION: u32 = 5;

/// The magic line written by this crate.
pub const MAGIC_LINE: &str = "NRRD0005";

/// The NRRD header data type.
///
/// Fields keep the order in which they were declared or inserted. Values
/// are typed according to the field grammar (see the [`field`] module).
/// Free form `key:=value` pairs are kept apart, sorted by key.
///
/// # Examples
///
/// ```no_run
/// use nrrd::NrrdHeader;
/// # use nrrd::Result;
///
/// # fn run() -> Result<()> {
/// let hdr = NrrdHeader::from_file("volume.nhdr")?;
/// println!("sizes: {}", hdr["sizes"]);
/// # Ok(())
/// # }
/// ```
///
/// Or to build one yourself:
///
/// ```
/// use nrrd::{NrrdHeader, Value};
///
/// let hdr = NrrdHeader::new()
///     .with_field("type", "double")
///     .with_field("sizes", vec![3i64, 4])
///     .with_key_value("author", "me");
/// assert_eq!(hdr.get("type"), Some(&Value::from("double")));
/// assert_eq!(hdr.key_value("author"), Some("me"));
/// ```
///
/// [`field`]: ../field/index.html
#[derive(Debug, Clone, Default)]
pub struct NrrdHeader {
    fields: Vec<(String, Value)>,
    key_values: BTreeMap<String, String>,
}

impl NrrdHeader {
    /// Create an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve a NRRD header from a file, which can be either an attached
    /// (`.nrrd`) or a detached (`.nhdr`) header file. Only the header is
    /// read. Default reading options are used.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<NrrdHeader> {
        ReaderOptions::new().read_header_file(path)
    }

    /// Read a NRRD header from the given text source, with default reading
    /// options. The source is consumed up to and including the blank line
    /// ending the header.
    pub fn from_reader<R: BufRead>(source: R) -> Result<NrrdHeader> {
        read_header(source, &ReaderOptions::new()).map(|(h, _)| h)
    }

    /// Builder-like method for inserting a field.
    pub fn with_field<K, V>(mut self, field: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let _ = self.insert(field, value);
        self
    }

    /// Builder-like method for inserting a key/value pair.
    pub fn with_key_value<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let _ = self.key_values.insert(key.into(), value.into());
        self
    }

    /// Get the value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == field).map(|(_, v)| v)
    }

    /// Get a mutable reference to the value of a field.
    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v)
    }

    /// Whether the header contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Set the value of a field, returning the previous value if there was
    /// one. A replaced field keeps its position.
    pub fn insert<K, V>(&mut self, field: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let field = field.into();
        let value = value.into();
        match self.get_mut(&field) {
            Some(old) => Some(std::mem::replace(old, value)),
            None => {
                self.fields.push((field, value));
                None
            }
        }
    }

    /// Remove a field, returning its value if it was present.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        let i = self.fields.iter().position(|(k, _)| k == field)?;
        Some(self.fields.remove(i).1)
    }

    /// Iterate over the fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The number of fields, not counting key/value pairs.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the header has no fields and no key/value pairs.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.key_values.is_empty()
    }

    /// Get the value of a key/value pair.
    pub fn key_value(&self, key: &str) -> Option<&str> {
        self.key_values.get(key).map(String::as_str)
    }

    /// Set the value of a key/value pair, returning the previous value.
    pub fn set_key_value<K, V>(&mut self, key: K, value: V) -> Option<String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.key_values.insert(key.into(), value.into())
    }

    /// Obtain a reference to the key/value pairs, sorted by key.
    pub fn key_values(&self) -> &BTreeMap<String, String> {
        &self.key_values
    }

    /// Obtain a mutable reference to the key/value pairs.
    pub fn key_values_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.key_values
    }

    /// Get the first of the given synonymous fields which is present.
    pub(crate) fn get_any<'a>(&'a self, fields: &[&'a str]) -> Option<(&'a str, &'a Value)> {
        fields
            .iter()
            .find_map(|f| self.get(f).map(|v| (*f, v)))
    }

    /// Get an integer field, failing if it holds anything else.
    pub(crate) fn int_field(&self, fields: &[&str]) -> Result<Option<i64>> {
        match self.get_any(fields) {
            None => Ok(None),
            Some((_, Value::Int(v))) => Ok(Some(*v)),
            Some((f, _)) => Err(NrrdError::UnexpectedFieldValue(f.to_string(), "an integer")),
        }
    }

    /// Get a text field, failing if it holds anything else.
    pub(crate) fn str_field<'a>(&'a self, fields: &[&'a str]) -> Result<Option<&'a str>> {
        match self.get_any(fields) {
            None => Ok(None),
            Some((_, Value::String(v))) => Ok(Some(v)),
            Some((f, _)) => Err(NrrdError::UnexpectedFieldValue(f.to_string(), "a string")),
        }
    }

    /// Get a required field, failing if it is absent.
    pub(crate) fn required(&self, field: &str) -> Result<&Value> {
        self.get(field)
            .ok_or_else(|| NrrdError::MissingField(field.to_string()))
    }
}

/// Headers are equal when they hold the same fields and key/value pairs,
/// regardless of the order of the fields.
impl PartialEq for NrrdHeader {
    fn eq(&self, other: &NrrdHeader) -> bool {
        self.fields.len() == other.fields.len()
            && self.key_values == other.key_values
            && self
                .fields
                .iter()
                .all(|(field, value)| other.get(field) == Some(value))
    }
}

impl std::ops::Index<&str> for NrrdHeader {
    type Output = Value;

    /// # Panics
    ///
    /// Panics if the field is not in the header.
    fn index(&self, field: &str) -> &Value {
        match self.get(field) {
            Some(v) => v,
            None => panic!("no field {:?} in NRRD header", field),
        }
    }
}

/// Check the magic line of a NRRD file, returning the format version.
///
/// The version is returned in place of the magic line's length. The
/// consumed bytes, magic line included, are counted by `read_header`.
///
/// # Errors
///
/// - `NrrdError::MissingMagic` if the line does not start with `NRRD`.
/// - `NrrdError::InvalidMagicLine` if the version is not a number.
/// - `NrrdError::UnsupportedVersion` if the version is newer than 5.
pub fn validate_magic_line(line: &str) -> Result<u32> {
    if !line.starts_with(MAGIC_WORD) {
        return Err(NrrdError::MissingMagic);
    }
    let version: u32 = line[MAGIC_WORD.len()..]
        .trim()
        .parse()
        .map_err(|_| NrrdError::InvalidMagicLine(line.to_string()))?;
    if version > MAX_SUPPORTED_VERSION {
        return Err(NrrdError::UnsupportedVersion(version));
    }
    Ok(version)
}

/// One meaningful line of a header.
#[derive(Debug, PartialEq)]
enum HeaderLine<'a> {
    Field(&'a str, &'a str),
    KeyValue(&'a str, &'a str),
}

fn split_line(line: &str) -> Result<HeaderLine> {
    let i = line
        .find(':')
        .ok_or_else(|| NrrdError::MalformedLine(line.to_string()))?;
    let name = line[..i].trim();
    let rest = &line[i + 1..];
    if let Some(value) = rest.strip_prefix('=') {
        Ok(HeaderLine::KeyValue(name, value.trim()))
    } else {
        Ok(HeaderLine::Field(name, rest.trim()))
    }
}

/// Read a NRRD header from a text source.
///
/// Reading stops right after the blank line which ends the header, or at
/// the end of the source. Returns the header along with the number of
/// bytes consumed, which is where the data starts in an attached file.
pub fn read_header<R: BufRead>(mut source: R, options: &ReaderOptions) -> Result<(NrrdHeader, u64)> {
    let mut buf = Vec::new();
    let mut consumed = 0u64;

    let n = source.read_until(b'\n', &mut buf)?;
    consumed += n as u64;
    let magic = String::from_utf8_lossy(&buf);
    let version = validate_magic_line(magic.trim_end())?;
    trace!("NRRD magic line accepted, version {}", version);

    let mut header = NrrdHeader::new();
    loop {
        buf.clear();
        let n = source.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        consumed += n as u64;
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if line.starts_with('#') {
            continue;
        }

        match split_line(line)? {
            HeaderLine::KeyValue(key, value) => {
                if options.custom_fields.contains_key(key) && !is_known_field(key) {
                    insert_field(&mut header, key, value, options)?;
                } else if let Some(old) = header.set_key_value(key, value) {
                    debug!("Key/value pair {:?} redefined (was {:?})", key, old);
                }
            }
            HeaderLine::Field(field, value) => insert_field(&mut header, field, value, options)?,
        }
    }

    debug!(
        "Read NRRD header: {} fields, {} key/value pairs, {} bytes",
        header.len(),
        header.key_values.len(),
        consumed
    );
    Ok((header, consumed))
}

fn insert_field(
    header: &mut NrrdHeader,
    field: &str,
    value: &str,
    options: &ReaderOptions,
) -> Result<()> {
    if header.contains(field) {
        match options.duplicate_fields {
            DuplicateFieldPolicy::Reject => {
                return Err(NrrdError::DuplicateField(field.to_string()));
            }
            DuplicateFieldPolicy::WarnKeepFirst => {
                warn!("Duplicate header field {:?}, keeping the first value", field);
                return Ok(());
            }
            DuplicateFieldPolicy::WarnOverwrite => {
                warn!("Duplicate header field {:?}, overwriting with the new value", field);
            }
        }
    }

    let t = if field == "space directions"
        && options.space_directions == SpaceDirectionsRepr::VectorList
    {
        FieldType::DoubleVectorList
    } else {
        field_type(field, &options.custom_fields)
    };
    let _ = header.insert(field, parse_field_value(value, t)?);
    Ok(())
}

/// Read a NRRD header from a seekable source, leaving the source
/// positioned at the first byte after the header.
pub fn read_header_seek<R>(source: &mut R, options: &ReaderOptions) -> Result<(NrrdHeader, u64)>
where
    R: Read + Seek,
{
    let start = source.seek(SeekFrom::Current(0))?;
    let (header, len) = read_header(BufReader::new(&mut *source), options)?;
    let _ = source.seek(SeekFrom::Start(start + len))?;
    Ok((header, len))
}

pub(crate) fn read_header_file<P: AsRef<Path>>(path: P, options: &ReaderOptions) -> Result<NrrdHeader> {
    let file = BufReader::new(File::open(path)?);
    read_header(file, options).map(|(h, _)| h)
}

/// Lines written after the magic line of every header.
const PREAMBLE: &[&str] = &[
    "# This NRRD file was generated by the nrrd crate",
    "# Complete NRRD file format specification at:",
    "# http://teem.sourceforge.net/nrrd/format.html",
];

fn output_type(field: &str, value: &Value, custom_fields: &FieldMap) -> FieldType {
    match (field, value) {
        ("space directions", Value::DoubleVectorList(_)) => FieldType::DoubleVectorList,
        _ => match crate::field::known_field_type(field) {
            Some(t) => t,
            None => custom_fields
                .get(field)
                .cloned()
                .unwrap_or_else(|| value.field_type()),
        },
    }
}

/// Write a header as text, ending with the blank line separating it from
/// the data.
///
/// Known fields are written first, in the format's canonical order, then
/// any other field as a `name:=value` line, then the key/value pairs
/// sorted by key. `space dimension` is left out when `space` is present,
/// since the two are mutually exclusive. The comment lines naming the
/// generator follow the magic line when `preamble` is set.
pub fn write_header<W: Write>(
    mut writer: W,
    header: &NrrdHeader,
    custom_fields: &FieldMap,
    preamble: bool,
) -> Result<()> {
    writeln!(writer, "{}", MAGIC_LINE)?;
    if preamble {
        for line in PREAMBLE {
            writeln!(writer, "{}", line)?;
        }
    }

    let has_space = header.contains("space");
    for &field in FIELD_ORDER {
        if field == "space dimension" && has_space {
            continue;
        }
        if let Some(value) = header.get(field) {
            let text = format_field_value(value, output_type(field, value, custom_fields));
            writeln!(writer, "{}: {}", field, text)?;
        }
    }

    for (field, value) in header.fields() {
        if is_known_field(field) {
            continue;
        }
        let text = format_field_value(value, output_type(field, value, custom_fields));
        writeln!(writer, "{}:={}", field, text)?;
    }

    for (key, value) in &header.key_values {
        writeln!(writer, "{}:={}", key, value)?;
    }

    writeln!(writer)?;
    Ok(())
}

//! The field grammar: a fixed table binding every field name known to the
//! NRRD format to the type of its value, plus a caller supplied map for
//! custom fields.

use crate::error::{NrrdError, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The type of a header field's value, which determines how the textual
/// value is parsed and formatted.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum FieldType {
    /// A single integer, e.g. `5`.
    Int,
    /// A single floating point number, e.g. `2.5`.
    Double,
    /// Verbatim text.
    String,
    /// Whitespace separated integers, e.g. `1 2 3`.
    IntList,
    /// Whitespace separated numbers, e.g. `1.2 2.0 3.1`.
    DoubleList,
    /// Whitespace separated words.
    StringList,
    /// Whitespace separated words, where double quotes group words
    /// containing spaces, e.g. `"mm" "f(x, y)"`.
    QuotedStringList,
    /// Parenthesized integers, e.g. `(1,0,0)`.
    IntVector,
    /// Parenthesized numbers, e.g. `(3.14,3.14,6.28)`.
    DoubleVector,
    /// Whitespace separated integer vectors, all of the same length.
    IntMatrix,
    /// Whitespace separated number vectors, all of the same length. Any
    /// row may be `none`.
    DoubleMatrix,
    /// Whitespace separated integer vectors, kept as a list of rows.
    IntVectorList,
    /// Whitespace separated number vectors, kept as a list of rows where
    /// `none` rows are absent.
    DoubleVectorList,
}

impl FieldType {
    /// The tag naming this type in a custom field map.
    pub fn as_str(self) -> &'static str {
        use FieldType::*;
        match self {
            Int => "int",
            Double => "double",
            String => "string",
            IntList => "int list",
            DoubleList => "double list",
            StringList => "string list",
            QuotedStringList => "quoted string list",
            IntVector => "int vector",
            DoubleVector => "double vector",
            IntMatrix => "int matrix",
            DoubleMatrix => "double matrix",
            IntVectorList => "int vector list",
            DoubleVectorList => "double vector list",
        }
    }
}

impl FromStr for FieldType {
    type Err = NrrdError;

    fn from_str(s: &str) -> Result<Self> {
        use FieldType::*;
        let t = match s {
            "int" => Int,
            "double" => Double,
            "string" => String,
            "int list" => IntList,
            "double list" => DoubleList,
            "string list" => StringList,
            "quoted string list" => QuotedStringList,
            "int vector" => IntVector,
            "double vector" => DoubleVector,
            "int matrix" => IntMatrix,
            "double matrix" => DoubleMatrix,
            "int vector list" => IntVectorList,
            "double vector list" => DoubleVectorList,
            _ => return Err(NrrdError::InvalidFieldType(s.to_string())),
        };
        Ok(t)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map from custom field names to the type of their values.
pub type FieldMap = HashMap<String, FieldType>;

/// Build a field map out of textual type tags, as in
/// `[("int", "int"), ("frame", "double matrix")]`.
///
/// # Errors
///
/// - `NrrdError::InvalidFieldType` if a tag does not name a field type.
pub fn field_map_from_tags<I, K, V>(tags: I) -> Result<FieldMap>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    tags.into_iter()
        .map(|(k, v)| Ok((k.into(), v.as_ref().parse::<FieldType>()?)))
        .collect()
}

/// Known fields in the order in which they are written to a header.
pub const FIELD_ORDER: &[&str] = &[
    "type",
    "dimension",
    "space dimension",
    "space",
    "sizes",
    "space directions",
    "kinds",
    "endian",
    "encoding",
    "min",
    "max",
    "oldmin",
    "old min",
    "oldmax",
    "old max",
    "content",
    "sample units",
    "spacings",
    "thicknesses",
    "axis mins",
    "axismins",
    "axis maxs",
    "axismaxs",
    "centerings",
    "labels",
    "units",
    "space units",
    "space origin",
    "measurement frame",
    "block size",
    "blocksize",
    "line skip",
    "lineskip",
    "byte skip",
    "byteskip",
    "data file",
    "datafile",
];

/// Obtain the type bound to a known field, or `None` if the name is not
/// part of the format's vocabulary.
pub fn known_field_type(field: &str) -> Option<FieldType> {
    use FieldType::*;
    let t = match field {
        "dimension" | "lineskip" | "line skip" | "byteskip" | "byte skip" | "space dimension"
        | "blocksize" | "block size" => Int,
        "min" | "max" | "oldmin" | "old min" | "oldmax" | "old max" => Double,
        "endian" | "encoding" | "content" | "sample units" | "datafile" | "data file"
        | "space" | "type" => String,
        "sizes" => IntList,
        "spacings" | "thicknesses" | "axismins" | "axis mins" | "axismaxs" | "axis maxs" => {
            DoubleList
        }
        "kinds" | "centerings" => StringList,
        "labels" | "units" | "space units" => QuotedStringList,
        "space origin" => DoubleVector,
        "space directions" | "measurement frame" => DoubleMatrix,
        _ => return None,
    };
    Some(t)
}

/// Whether the field is part of the format's vocabulary.
pub fn is_known_field(field: &str) -> bool {
    known_field_type(field).is_some()
}

/// Resolve the type of a field by name. Known fields have a fixed type;
/// other fields are looked up in `custom_fields`, defaulting to a string.
pub fn field_type(field: &str, custom_fields: &FieldMap) -> FieldType {
    known_field_type(field)
        .or_else(|| custom_fields.get(field).cloned())
        .unwrap_or(FieldType::String)
}

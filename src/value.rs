//! The in-memory representation of header field values.

use crate::field::FieldType;
use crate::formatter;
use ndarray::Array2;
use std::fmt;

/// A typed header field value. Each variant corresponds to one of the
/// value shapes of the format's field grammar.
///
/// Quoted string lists are kept as `StringList`: quoting only affects
/// the textual form of the value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single integer.
    Int(i64),
    /// A single floating point number.
    Double(f64),
    /// Verbatim text.
    String(String),
    /// A list of integers.
    IntList(Vec<i64>),
    /// A list of floating point numbers.
    DoubleList(Vec<f64>),
    /// A list of words.
    StringList(Vec<String>),
    /// A fixed-length integer vector.
    IntVector(Vec<i64>),
    /// A fixed-length floating point vector.
    DoubleVector(Vec<f64>),
    /// A rectangular integer matrix, one row per vector.
    IntMatrix(Array2<i64>),
    /// A rectangular floating point matrix, one row per vector. Rows which
    /// were `none` in the header are filled with NaN.
    DoubleMatrix(Array2<f64>),
    /// A list of integer vectors.
    IntVectorList(Vec<Vec<i64>>),
    /// A list of floating point vectors, any of which may be absent.
    DoubleVectorList(Vec<Option<Vec<f64>>>),
}

impl Value {
    /// The field type naturally describing this value.
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Int(_) => FieldType::Int,
            Value::Double(_) => FieldType::Double,
            Value::String(_) => FieldType::String,
            Value::IntList(_) => FieldType::IntList,
            Value::DoubleList(_) => FieldType::DoubleList,
            Value::StringList(_) => FieldType::StringList,
            Value::IntVector(_) => FieldType::IntVector,
            Value::DoubleVector(_) => FieldType::DoubleVector,
            Value::IntMatrix(_) => FieldType::IntMatrix,
            Value::DoubleMatrix(_) => FieldType::DoubleMatrix,
            Value::IntVectorList(_) => FieldType::IntVectorList,
            Value::DoubleVectorList(_) => FieldType::DoubleVectorList,
        }
    }

    /// Get the integer held by this value, if any.
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Get the number held by this value, if any. Integers are converted.
    pub fn as_double(&self) -> Option<f64> {
        match *self {
            Value::Int(v) => Some(v as f64),
            Value::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Get the text held by this value, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integers of a list or vector value.
    pub fn as_int_slice(&self) -> Option<&[i64]> {
        match self {
            Value::IntList(v) | Value::IntVector(v) => Some(v),
            _ => None,
        }
    }

    /// Get the numbers of a list or vector value.
    pub fn as_double_slice(&self) -> Option<&[f64]> {
        match self {
            Value::DoubleList(v) | Value::DoubleVector(v) => Some(v),
            _ => None,
        }
    }

    /// Get the words of a string list value.
    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Value::StringList(v) => Some(v),
            _ => None,
        }
    }

    /// Get the rows of a floating point matrix value.
    pub fn as_double_matrix(&self) -> Option<&Array2<f64>> {
        match self {
            Value::DoubleMatrix(m) => Some(m),
            _ => None,
        }
    }

    /// Obtain the rows of a matrix or vector list value as a list of
    /// optional floating point vectors. NaN rows of a double matrix are
    /// reported as absent.
    pub fn to_optional_rows(&self) -> Option<Vec<Option<Vec<f64>>>> {
        match self {
            Value::DoubleMatrix(m) => Some(
                m.outer_iter()
                    .map(|row| {
                        if row.iter().all(|x| x.is_nan()) {
                            None
                        } else {
                            Some(row.to_vec())
                        }
                    })
                    .collect(),
            ),
            Value::IntMatrix(m) => Some(
                m.outer_iter()
                    .map(|row| Some(row.iter().map(|&x| x as f64).collect()))
                    .collect(),
            ),
            Value::DoubleVectorList(rows) => Some(rows.clone()),
            Value::IntVectorList(rows) => Some(
                rows.iter()
                    .map(|row| Some(row.iter().map(|&x| x as f64).collect()))
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&formatter::format_field_value(self, self.field_type()))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::IntList(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::DoubleList(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::StringList(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::StringList(v.into_iter().map(String::from).collect())
    }
}

impl From<Array2<i64>> for Value {
    fn from(v: Array2<i64>) -> Self {
        Value::IntMatrix(v)
    }
}

impl From<Array2<f64>> for Value {
    fn from(v: Array2<f64>) -> Self {
        Value::DoubleMatrix(v)
    }
}

impl From<Vec<Option<Vec<f64>>>> for Value {
    fn from(v: Vec<Option<Vec<f64>>>) -> Self {
        Value::DoubleVectorList(v)
    }
}

//! Parsers for the textual micro-formats of header field values.
//!
//! Numeric values are always read as double precision first. When the
//! element type is left to automatic detection, a list, vector or matrix
//! whose numbers have no fractional part becomes integral; otherwise it
//! stays floating point. Forcing integers truncates toward zero.

use crate::error::{NrrdError, Result};
use crate::field::FieldType;
use crate::value::Value;
use ndarray::Array2;

/// Element type requested when parsing numeric values.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Dtype {
    /// Integral if every number is whole, floating point otherwise.
    Auto,
    /// Truncate every number to an integer.
    Int,
    /// Keep every number as floating point.
    Double,
}

impl Default for Dtype {
    fn default() -> Self {
        Dtype::Auto
    }
}

/// A homogeneous sequence of numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum Numbers {
    /// Integers.
    Int(Vec<i64>),
    /// Floating point numbers.
    Double(Vec<f64>),
}

impl Numbers {
    /// The amount of numbers in the sequence.
    pub fn len(&self) -> usize {
        match self {
            Numbers::Int(v) => v.len(),
            Numbers::Double(v) => v.len(),
        }
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A rectangular matrix of numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum Matrix {
    /// Integer matrix.
    Int(Array2<i64>),
    /// Floating point matrix.
    Double(Array2<f64>),
}

fn parse_f64(x: &str) -> Result<f64> {
    let x = x.trim();
    x.parse()
        .map_err(|_| NrrdError::InvalidNumber(x.to_string()))
}

fn parse_i64(x: &str) -> Result<i64> {
    let x = x.trim();
    x.parse()
        .map_err(|_| NrrdError::InvalidNumber(x.to_string()))
}

fn is_whole(x: f64) -> bool {
    x - (x as i64) as f64 == 0.
}

fn apply_dtype(values: Vec<f64>, dtype: Dtype) -> Numbers {
    match dtype {
        Dtype::Double => Numbers::Double(values),
        Dtype::Int => Numbers::Int(values.into_iter().map(|x| x as i64).collect()),
        Dtype::Auto => {
            if values.iter().all(|&x| is_whole(x)) {
                Numbers::Int(values.into_iter().map(|x| x as i64).collect())
            } else {
                Numbers::Double(values)
            }
        }
    }
}

/// Parse a single number, which becomes an integer if it has no
/// fractional part.
pub fn parse_number_auto_dtype(x: &str) -> Result<Value> {
    let value = parse_f64(x)?;
    if is_whole(value) {
        Ok(Value::Int(value as i64))
    } else {
        Ok(Value::Double(value))
    }
}

/// Parse a whitespace separated list of numbers, such as `1 2 3`.
pub fn parse_number_list(x: &str, dtype: Dtype) -> Result<Numbers> {
    let values = x.split_whitespace().map(parse_f64).collect::<Result<Vec<_>>>()?;
    Ok(apply_dtype(values, dtype))
}

fn parse_raw_vector(x: &str) -> Result<Vec<f64>> {
    let x = x.trim();
    if !x.starts_with('(') || !x.ends_with(')') || x.len() < 2 {
        return Err(NrrdError::VectorNotEnclosed);
    }
    x[1..x.len() - 1].split(',').map(parse_f64).collect()
}

/// Parse a vector, such as `(100, 200, 300)`.
///
/// # Errors
///
/// - `NrrdError::VectorNotEnclosed` if the text is not wrapped in
///   parentheses.
/// - `NrrdError::InvalidNumber` if a component is not a number.
pub fn parse_vector(x: &str, dtype: Dtype) -> Result<Numbers> {
    Ok(apply_dtype(parse_raw_vector(x)?, dtype))
}

/// Parse a vector which may also be the literal `none`.
pub fn parse_optional_vector(x: &str, dtype: Dtype) -> Result<Option<Numbers>> {
    if x.trim() == "none" {
        Ok(None)
    } else {
        parse_vector(x, dtype).map(Some)
    }
}

fn stack_rows(rows: Vec<Vec<f64>>) -> Result<Array2<f64>> {
    let ncols = rows.first().map(Vec::len).unwrap_or(0);
    if rows.is_empty() || rows.iter().any(|r| r.len() != ncols) {
        return Err(NrrdError::RaggedMatrix);
    }
    let nrows = rows.len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), flat).map_err(|_| NrrdError::RaggedMatrix)
}

/// Parse a matrix written as whitespace separated vectors, such as
/// `(1,0,0) (0,1,0) (0,0,1)`.
///
/// # Errors
///
/// - `NrrdError::RaggedMatrix` if the rows have different lengths.
pub fn parse_matrix(x: &str, dtype: Dtype) -> Result<Matrix> {
    let rows = x
        .split_whitespace()
        .map(parse_raw_vector)
        .collect::<Result<Vec<_>>>()?;
    let matrix = stack_rows(rows)?;
    let whole = matrix.iter().all(|&v| is_whole(v));
    Ok(match dtype {
        Dtype::Double => Matrix::Double(matrix),
        Dtype::Auto if !whole => Matrix::Double(matrix),
        _ => Matrix::Int(matrix.mapv(|v| v as i64)),
    })
}

/// Parse a floating point matrix in which any row may be `none`. Absent
/// rows are filled with NaN, with as many columns as the other rows.
pub fn parse_optional_matrix(x: &str) -> Result<Array2<f64>> {
    let rows = parse_optional_vector_list(x)?;
    let ncols = rows.iter().flatten().map(Vec::len).next().unwrap_or(0);
    let rows: Vec<Vec<f64>> = rows
        .into_iter()
        .map(|row| row.unwrap_or_else(|| vec![f64::NAN; ncols]))
        .collect();
    stack_rows(rows)
}

/// Parse whitespace separated vectors into a list of rows of equal length.
pub fn parse_vector_list(x: &str, dtype: Dtype) -> Result<Vec<Numbers>> {
    let rows = x
        .split_whitespace()
        .map(parse_raw_vector)
        .collect::<Result<Vec<_>>>()?;
    if rows.windows(2).any(|w| w[0].len() != w[1].len()) {
        return Err(NrrdError::RaggedMatrix);
    }
    let dtype = match dtype {
        Dtype::Auto if rows.iter().flatten().all(|&v| is_whole(v)) => Dtype::Int,
        Dtype::Auto => Dtype::Double,
        d => d,
    };
    Ok(rows.into_iter().map(|row| apply_dtype(row, dtype)).collect())
}

/// Parse whitespace separated floating point vectors, any of which may
/// be `none`, into a list of optional rows.
pub fn parse_optional_vector_list(x: &str) -> Result<Vec<Option<Vec<f64>>>> {
    let rows = x
        .split_whitespace()
        .map(|row| {
            if row == "none" {
                Ok(None)
            } else {
                parse_raw_vector(row).map(Some)
            }
        })
        .collect::<Result<Vec<_>>>()?;
    let mut lengths = rows.iter().flatten().map(Vec::len);
    if let Some(first) = lengths.next() {
        if lengths.any(|len| len != first) {
            return Err(NrrdError::RaggedMatrix);
        }
    }
    Ok(rows)
}

/// Split a list of words on whitespace.
pub fn parse_string_list(x: &str) -> Vec<String> {
    x.split_whitespace().map(String::from).collect()
}

/// Split a list of words on whitespace, keeping double quoted words with
/// spaces together, as in `"X" "Y" "f(log(X, 10), Y)"`.
pub fn parse_quoted_string_list(x: &str) -> Result<Vec<String>> {
    shlex::split(x).ok_or_else(|| NrrdError::InvalidQuotedList(x.to_string()))
}

fn into_int(n: Numbers) -> Vec<i64> {
    match n {
        Numbers::Int(v) => v,
        Numbers::Double(v) => v.into_iter().map(|x| x as i64).collect(),
    }
}

fn into_double(n: Numbers) -> Vec<f64> {
    match n {
        Numbers::Int(v) => v.into_iter().map(|x| x as f64).collect(),
        Numbers::Double(v) => v,
    }
}

/// Parse the textual value of a field with the given type.
pub fn parse_field_value(value: &str, field_type: FieldType) -> Result<Value> {
    let v = match field_type {
        FieldType::Int => Value::Int(parse_i64(value)?),
        FieldType::Double => Value::Double(parse_f64(value)?),
        FieldType::String => Value::String(value.to_string()),
        FieldType::IntList => Value::IntList(into_int(parse_number_list(value, Dtype::Int)?)),
        FieldType::DoubleList => {
            Value::DoubleList(into_double(parse_number_list(value, Dtype::Double)?))
        }
        FieldType::StringList => Value::StringList(parse_string_list(value)),
        FieldType::QuotedStringList => Value::StringList(parse_quoted_string_list(value)?),
        FieldType::IntVector => Value::IntVector(into_int(parse_vector(value, Dtype::Int)?)),
        FieldType::DoubleVector => {
            Value::DoubleVector(into_double(parse_vector(value, Dtype::Double)?))
        }
        FieldType::IntMatrix => match parse_matrix(value, Dtype::Int)? {
            Matrix::Int(m) => Value::IntMatrix(m),
            Matrix::Double(m) => Value::IntMatrix(m.mapv(|v| v as i64)),
        },
        FieldType::DoubleMatrix => Value::DoubleMatrix(parse_optional_matrix(value)?),
        FieldType::IntVectorList => Value::IntVectorList(
            parse_vector_list(value, Dtype::Int)?
                .into_iter()
                .map(into_int)
                .collect(),
        ),
        FieldType::DoubleVectorList => Value::DoubleVectorList(parse_optional_vector_list(value)?),
    };
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn vector() {
        for bad in &["100, 200, 300)", "(100, 200, 300", "100, 200, 300", ""] {
            let err = parse_vector(bad, Dtype::Auto).unwrap_err();
            assert_eq!(err.to_string(), "Vector should be enclosed by parentheses.");
        }

        assert_eq!(
            parse_vector("(100, 200, 300)", Dtype::Auto).unwrap(),
            Numbers::Int(vec![100, 200, 300])
        );
        assert_eq!(
            parse_vector("(100, 200, 300)", Dtype::Double).unwrap(),
            Numbers::Double(vec![100., 200., 300.])
        );
        assert_eq!(
            parse_vector("(100.5, 200, 300)", Dtype::Auto).unwrap(),
            Numbers::Double(vec![100.5, 200., 300.])
        );
        assert_eq!(
            parse_vector("(100.47655, 220.32, 300.50)", Dtype::Int).unwrap(),
            Numbers::Int(vec![100, 220, 300])
        );
        assert!(parse_vector("(1,x,3)", Dtype::Auto).is_err());
    }

    #[test]
    fn optional_vector() {
        assert_eq!(parse_optional_vector("none", Dtype::Auto).unwrap(), None);
        assert_eq!(
            parse_optional_vector("(1,2)", Dtype::Auto).unwrap(),
            Some(Numbers::Int(vec![1, 2]))
        );
    }

    #[test]
    fn matrix() {
        assert_eq!(
            parse_matrix("(1,0,0) (0,1,0) (0,0,1)", Dtype::Auto).unwrap(),
            Matrix::Int(array![[1, 0, 0], [0, 1, 0], [0, 0, 1]])
        );
        assert_eq!(
            parse_matrix(
                "(1.4726600000000003,-0,0) (-0,1.4726600000000003,-0) (0,-0,4.7619115092114601)",
                Dtype::Int
            )
            .unwrap(),
            Matrix::Int(array![[1, 0, 0], [0, 1, 0], [0, 0, 4]])
        );
        assert_eq!(
            parse_matrix("(1.5,0) (0,1)", Dtype::Auto).unwrap(),
            Matrix::Double(array![[1.5, 0.], [0., 1.]])
        );

        let err = parse_matrix("(1,0,0,0) (0,1,0) (0,0,1)", Dtype::Auto).unwrap_err();
        assert_eq!(err.to_string(), "Matrix should have same number of elements in each row");
    }

    #[test]
    fn optional_matrix() {
        let m = parse_optional_matrix("none (1,0,0) (0,1,0) (0,0,1)").unwrap();
        assert_eq!(m.shape(), &[4, 3]);
        assert!(m.row(0).iter().all(|x| x.is_nan()));
        assert_eq!(m.row(1).to_vec(), vec![1., 0., 0.]);
        assert_eq!(m.row(3).to_vec(), vec![0., 0., 1.]);

        let m = parse_optional_matrix("(1.5,0,0) none (0,1,0)").unwrap();
        assert!(m.row(1).iter().all(|x| x.is_nan()));

        assert!(matches!(
            parse_optional_matrix("none (1,0,0,0) (0,1,0) (0,0,1)"),
            Err(NrrdError::RaggedMatrix)
        ));
    }

    #[test]
    fn number_list() {
        assert_eq!(
            parse_number_list("1 2 3 4", Dtype::Auto).unwrap(),
            Numbers::Int(vec![1, 2, 3, 4])
        );
        assert_eq!(
            parse_number_list("1 2 3 4", Dtype::Double).unwrap(),
            Numbers::Double(vec![1., 2., 3., 4.])
        );
        assert_eq!(
            parse_number_list("1 2.5", Dtype::Auto).unwrap(),
            Numbers::Double(vec![1., 2.5])
        );
        assert_eq!(parse_number_list("1", Dtype::Auto).unwrap(), Numbers::Int(vec![1]));
    }

    #[test]
    fn number_auto_dtype() {
        assert_eq!(parse_number_auto_dtype("25").unwrap(), Value::Int(25));
        assert_eq!(parse_number_auto_dtype("25.125").unwrap(), Value::Double(25.125));
    }

    #[test]
    fn vector_lists() {
        let rows = parse_optional_vector_list("(1.5,0,0) (0,1.5,0) (0,0,1) none").unwrap();
        assert_eq!(
            rows,
            vec![
                Some(vec![1.5, 0., 0.]),
                Some(vec![0., 1.5, 0.]),
                Some(vec![0., 0., 1.]),
                None
            ]
        );
        assert_eq!(
            parse_vector_list("(1,2) (3,4)", Dtype::Auto).unwrap(),
            vec![Numbers::Int(vec![1, 2]), Numbers::Int(vec![3, 4])]
        );
        assert!(parse_vector_list("(1,2) (3,4,5)", Dtype::Auto).is_err());
    }

    #[test]
    fn quoted_strings() {
        assert_eq!(
            parse_quoted_string_list(r#""X" "Y" "f(log(X, 10), Y)""#).unwrap(),
            vec!["X", "Y", "f(log(X, 10), Y)"]
        );
        assert_eq!(
            parse_quoted_string_list("mm cm in").unwrap(),
            vec!["mm", "cm", "in"]
        );
        assert!(parse_quoted_string_list(r#""mm" "cm"#).is_err());
    }

    #[test]
    fn field_values() {
        assert_eq!(parse_field_value("24", FieldType::Int).unwrap(), Value::Int(24));
        assert!(parse_field_value("24.5", FieldType::Int).is_err());
        assert_eq!(
            parse_field_value("1 2 3", FieldType::DoubleList).unwrap(),
            Value::DoubleList(vec![1., 2., 3.])
        );
        assert_eq!(
            parse_field_value("(100, 200, -300)", FieldType::IntVector).unwrap(),
            Value::IntVector(vec![100, 200, -300])
        );
        assert_eq!(
            parse_field_value("(1.2,0.3,0) (0,1.5,0) (0,-0.55,1.6)", FieldType::DoubleMatrix)
                .unwrap(),
            Value::DoubleMatrix(array![[1.2, 0.3, 0.], [0., 1.5, 0.], [0., -0.55, 1.6]])
        );
        assert_eq!(
            parse_field_value("domain domain", FieldType::StringList).unwrap(),
            Value::StringList(vec!["domain".to_string(), "domain".to_string()])
        );
    }
}

//! Formatters producing the textual form of header field values.
//!
//! Floating point numbers are written with 17 significant digits, which is
//! enough to read back the exact same value, in the shortest of the fixed
//! or exponent notations (the behavior of C's `%.17g`).

use crate::field::FieldType;
use crate::value::Value;
use ndarray::ArrayView2;

const SIGNIFICANT_DIGITS: i32 = 17;

/// A number which can be written into a header.
pub trait FormatNumber: Copy {
    /// The textual form of the number.
    fn format_number(self) -> String;
}

impl FormatNumber for i64 {
    fn format_number(self) -> String {
        self.to_string()
    }
}

impl FormatNumber for f64 {
    fn format_number(self) -> String {
        format_number(self)
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Format a floating point number with 17 significant digits, removing
/// trailing zeros, e.g. `0.2` becomes `0.20000000000000001` and `2.0`
/// becomes `2`.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0. { "inf" } else { "-inf" }.to_string();
    }
    if x == 0. {
        return if x.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // the exponent is taken after rounding to the target precision
    let sci = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, x);
    let (mantissa, exponent) = match sci.find('e') {
        Some(i) => (&sci[..i], &sci[i + 1..]),
        None => (&sci[..], "0"),
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS {
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            if exponent < 0 { '-' } else { '+' },
            exponent.abs()
        )
    } else {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, x)).to_string()
    }
}

/// Format a vector, e.g. `(1,2,3)`.
pub fn format_vector<T: FormatNumber>(x: &[T]) -> String {
    let parts: Vec<String> = x.iter().map(|v| v.format_number()).collect();
    format!("({})", parts.join(","))
}

/// Format a vector which may be absent. Absent and all-NaN vectors are
/// written as `none`.
pub fn format_optional_vector(x: Option<&[f64]>) -> String {
    match x {
        Some(v) if !v.iter().all(|x| x.is_nan()) => format_vector(v),
        _ => "none".to_string(),
    }
}

/// Format a matrix as whitespace separated row vectors.
pub fn format_matrix<T: FormatNumber>(x: ArrayView2<T>) -> String {
    let rows: Vec<String> = x
        .outer_iter()
        .map(|row| format_vector(&row.to_vec()))
        .collect();
    rows.join(" ")
}

/// Format a floating point matrix, writing all-NaN rows as `none`.
pub fn format_optional_matrix(x: ArrayView2<f64>) -> String {
    let rows: Vec<String> = x
        .outer_iter()
        .map(|row| format_optional_vector(Some(&row.to_vec()[..])))
        .collect();
    rows.join(" ")
}

/// Format a whitespace separated list of numbers.
pub fn format_number_list<T: FormatNumber>(x: &[T]) -> String {
    let parts: Vec<String> = x.iter().map(|v| v.format_number()).collect();
    parts.join(" ")
}

/// Format a list of vectors.
pub fn format_vector_list<T: FormatNumber>(x: &[Vec<T>]) -> String {
    let rows: Vec<String> = x.iter().map(|row| format_vector(row)).collect();
    rows.join(" ")
}

/// Format a list of optional vectors, writing absent rows as `none`.
pub fn format_optional_vector_list(x: &[Option<Vec<f64>>]) -> String {
    let rows: Vec<String> = x
        .iter()
        .map(|row| format_optional_vector(row.as_deref()))
        .collect();
    rows.join(" ")
}

/// Format a list of words, each one double quoted.
pub fn format_quoted_string_list(x: &[String]) -> String {
    let parts: Vec<String> = x
        .iter()
        .map(|s| format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    parts.join(" ")
}

/// Format a value as the given field type.
///
/// The type mostly follows the value itself. It only matters where a value
/// shape has more than one textual form: string lists can be quoted, and
/// integer sequences can be written as either a list or a vector.
pub fn format_field_value(value: &Value, field_type: FieldType) -> String {
    match (value, field_type) {
        (Value::StringList(v), FieldType::QuotedStringList) => format_quoted_string_list(v),
        (Value::IntList(v), FieldType::IntVector) | (Value::IntVector(v), FieldType::IntVector) => {
            format_vector(v)
        }
        (Value::DoubleList(v), FieldType::DoubleVector)
        | (Value::DoubleVector(v), FieldType::DoubleVector) => format_optional_vector(Some(v)),
        (Value::IntVector(v), FieldType::IntList) => format_number_list(v),
        (Value::DoubleVector(v), FieldType::DoubleList) => format_number_list(v),
        (Value::Int(v), _) => v.to_string(),
        (Value::Double(v), _) => format_number(*v),
        (Value::String(s), _) => s.clone(),
        (Value::IntList(v), _) => format_number_list(v),
        (Value::DoubleList(v), _) => format_number_list(v),
        (Value::StringList(v), _) => v.join(" "),
        (Value::IntVector(v), _) => format_vector(v),
        (Value::DoubleVector(v), _) => format_optional_vector(Some(v)),
        (Value::IntMatrix(m), _) => format_matrix(m.view()),
        (Value::DoubleMatrix(m), _) => format_optional_matrix(m.view()),
        (Value::IntVectorList(v), _) => format_vector_list(v),
        (Value::DoubleVectorList(v), _) => format_optional_vector_list(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn numbers() {
        assert_eq!(format_number(0.2), "0.20000000000000001");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(2.), "2");
        assert_eq!(format_number(-3.), "-3");
        assert_eq!(format_number(200.3), "200.30000000000001");
        assert_eq!(format_number(1e20), "1e+20");
        assert_eq!(format_number(0.00001), "1.0000000000000001e-05");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(123456789.), "123456789");
        assert_eq!(format_number(0.), "0");
        assert_eq!(format_number(f64::NAN), "nan");
    }

    #[test]
    fn number_round_trip() {
        for &x in &[0.1, 1. / 3., 4.7619115092114601, -1e-300, 6.02214076e23] {
            let s = format_number(x);
            assert_eq!(s.parse::<f64>().unwrap(), x, "{}", s);
        }
    }

    #[test]
    fn vectors() {
        assert_eq!(format_vector(&[1i64, 2, 3]), "(1,2,3)");
        assert_eq!(format_vector(&[1.2, 2., 3.2]), "(1.2,2,3.2000000000000002)");
        assert_eq!(format_optional_vector(None), "none");
        assert_eq!(format_optional_vector(Some(&[f64::NAN, f64::NAN][..])), "none");
        assert_eq!(format_optional_vector(Some(&[1., 2.][..])), "(1,2)");
    }

    #[test]
    fn matrices() {
        assert_eq!(
            format_matrix(array![[1i64, 0, 0], [0, 1, 0], [0, 0, 1]].view()),
            "(1,0,0) (0,1,0) (0,0,1)"
        );
        let m = array![[f64::NAN, f64::NAN], [1.5, 0.], [0., 2.]];
        assert_eq!(format_optional_matrix(m.view()), "none (1.5,0) (0,2)");
    }

    #[test]
    fn lists() {
        assert_eq!(format_number_list(&[1i64, 2, 3]), "1 2 3");
        assert_eq!(
            format_number_list(&[0.2, 0.502, 0.8]),
            "0.20000000000000001 0.502 0.80000000000000004"
        );
        assert_eq!(
            format_optional_vector_list(&[Some(vec![1., 0.]), None]),
            "(1,0) none"
        );
        assert_eq!(format_vector_list(&[vec![1i64, 2], vec![3, 4]]), "(1,2) (3,4)");
    }

    #[test]
    fn field_values() {
        let labels = Value::from(vec!["X", "f(x, y)"]);
        assert_eq!(
            format_field_value(&labels, FieldType::QuotedStringList),
            r#""X" "f(x, y)""#
        );
        assert_eq!(format_field_value(&labels, FieldType::StringList), "X f(x, y)");
        assert_eq!(
            format_field_value(&Value::IntList(vec![3, 4]), FieldType::IntVector),
            "(3,4)"
        );
        assert_eq!(format_field_value(&Value::Double(2.5), FieldType::Double), "2.5");
        assert_eq!(Value::Int(7).to_string(), "7");

        let origin = Value::DoubleVector(vec![f64::NAN, f64::NAN, f64::NAN]);
        assert_eq!(format_field_value(&origin, FieldType::DoubleVector), "none");
        assert_eq!(origin.to_string(), "none");
        assert_eq!(
            Value::DoubleVector(vec![1.5, f64::NAN]).to_string(),
            "(1.5,nan)"
        );
    }
}

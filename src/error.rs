//! Types for error handling go here.

use crate::typedef::NrrdType;
use quick_error::quick_error;
use std::io::Error as IOError;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum NrrdError {
        /// The first line of the file does not start with the `NRRD` magic word.
        MissingMagic {
            display("Invalid NRRD magic line. Is this an NRRD file?")
        }
        /// The magic line has no numeric version suffix.
        InvalidMagicLine(line: String) {
            display("Invalid NRRD magic line: {}", line)
        }
        /// The file was written with a format version newer than supported.
        UnsupportedVersion(version: u32) {
            display("Unsupported NRRD file version (version: {}). This library only supports v5 and below.", version)
        }
        /// A header line is neither a comment, a field nor a key/value pair.
        MalformedLine(line: String) {
            display("Malformed NRRD header line: {}", line)
        }
        /// The same field was declared twice in the header.
        DuplicateField(field: String) {
            display("Duplicate header field: {}", field)
        }
        /// An unknown field type tag was requested through a custom field map.
        InvalidFieldType(tag: String) {
            display("Invalid field type given: {}", tag)
        }
        /// A scalar literal could not be parsed as a number.
        InvalidNumber(literal: String) {
            display("Invalid number in NRRD header: {:?}", literal)
        }
        /// A vector literal is not wrapped in a single pair of parentheses.
        VectorNotEnclosed {
            display("Vector should be enclosed by parentheses.")
        }
        /// The rows of a matrix literal have different lengths.
        RaggedMatrix {
            display("Matrix should have same number of elements in each row")
        }
        /// A quoted string list has unbalanced quotes.
        InvalidQuotedList(value: String) {
            display("Invalid quoted string list: {}", value)
        }
        /// A header field holds a value of a different shape than the one required.
        UnexpectedFieldValue(field: String, expected: &'static str) {
            display("Header field {:?} should hold {}", field, expected)
        }
        /// A field required for reading the data is not in the header.
        MissingField(field: String) {
            display("Header is missing required field: {}", field)
        }
        /// The `dimension` field disagrees with the number of `sizes`.
        DimensionMismatch(dimension: i64, sizes: usize) {
            display("Number of elements in sizes does not match dimension. Dimension: {}, len(sizes): {}", dimension, sizes)
        }
        /// One of the axis sizes is negative.
        InvalidSize(size: i64) {
            display("Invalid axis size in header: {}", size)
        }
        /// The `type` field does not name a known element type.
        UnsupportedType(token: String) {
            display("Unsupported data type: {}", token)
        }
        /// The `encoding` field does not name a supported encoding.
        UnsupportedEncoding(token: String) {
            display("Unsupported encoding: {}", token)
        }
        /// The writer was asked for an encoding it cannot produce.
        InvalidWriteEncoding(token: String) {
            display("Invalid encoding specification while writing NRRD file: {}", token)
        }
        /// The `endian` field is neither `little` nor `big`.
        InvalidEndian(token: String) {
            display("Invalid endian value in header: {}", token)
        }
        /// Negative line skip.
        InvalidLineSkip(value: i64) {
            display("Invalid lineskip, allowed values are greater than or equal to 0")
        }
        /// Byte skip below -1.
        InvalidByteSkip(value: i64) {
            display("Invalid byteskip, allowed values are greater than or equal to -1")
        }
        /// Block volumes need a positive `block size` field.
        InvalidBlockSize(value: i64) {
            display("Invalid block size: {}", value)
        }
        /// The number of decoded elements disagrees with `sizes`.
        SizeMismatch(expected: usize, got: usize) {
            display("Size of the data does not equal the product of all the dimensions: {}-{}={}",
                expected, got, *expected as i128 - *got as i128)
        }
        /// A detached data file path is relative, but no header path is known.
        MissingHeaderPath {
            display("Filename parameter must be specified when a relative data file path is given")
        }
        /// An ASCII sample literal could not be parsed as the element type.
        InvalidAsciiSample(literal: String, datatype: NrrdType) {
            display("Invalid ASCII value {:?} for data type {:?}", literal, datatype)
        }
        /// The requested element type does not match the volume's element type.
        ElementTypeMismatch(requested: NrrdType, actual: NrrdType) {
            display("Requested element type {:?}, but the volume holds {:?}", requested, actual)
        }
        /// The operation is not available for this element type.
        UnsupportedDataType(t: NrrdType) {
            display("Unsupported data type {:?} for this operation", t)
        }
        /// Attempted to read volume outside boundaries.
        OutOfBounds(coords: Vec<usize>) {
            display("Out of bounds access to volume: {:?}", &coords[..])
        }
        /// Attempted to access a volume with an index of the wrong rank.
        IncorrectVolumeDimensionality(expected: usize, got: usize) {
            display("Unexpected volume data dimensionality (expected {}, got {})", expected, got)
        }
        /// The buffer length is inconsistent with the volume shape.
        IncompatibleLength(got: usize, expected: usize) {
            display("Raw data buffer length ({}) is incompatible with the expected length ({})", got, expected)
        }
        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, NrrdError>;

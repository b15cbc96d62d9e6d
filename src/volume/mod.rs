//! This module defines the sample volume API, as well as data
//! types for reading volumes from files and streams.
//! An integration with `ndarray` allows for more elegant and
//! efficient approaches, and should be preferred when possible.

pub mod codec;
pub mod element;
pub mod inmem;
pub mod ndarray;
mod util;

pub use self::element::DataElement;
pub use self::inmem::*;
pub use self::ndarray::IntoNdArray;
use crate::error::Result;
use crate::typedef::NrrdType;

/// Public API for NRRD volume data, exposed as a multi-dimensional
/// sample array.
pub trait NrrdVolume {
    /// Get the axis sizes of the volume, as declared by the `sizes` field.
    /// The first axis varies fastest.
    fn sizes(&self) -> &[usize];

    /// Get the volume's number of dimensions. In a fully compliant file,
    /// this is equivalent to the corresponding header's `dimension` field.
    fn dimensionality(&self) -> usize {
        self.sizes().len()
    }

    /// Get this volume's data type.
    fn data_type(&self) -> NrrdType;

    /// Fetch a single sample's value in the given index coordinates
    /// as a double precision floating point value, the first coordinate
    /// running along the first axis of `sizes`. Note that using this
    /// function continuously to traverse the volume is inefficient.
    /// Prefer using the `ndarray` API for volume traversal.
    ///
    /// # Errors
    ///
    /// - `NrrdError::OutOfBounds` if the given coordinates surpass this
    /// volume's boundaries.
    /// - `NrrdError::UnsupportedDataType` for block volumes.
    fn get_f64(&self, coords: &[usize]) -> Result<f64>;

    /// Fetch a single sample's value as a single precision floating point
    /// value.
    fn get_f32(&self, coords: &[usize]) -> Result<f32> {
        let v = self.get_f64(coords)?;
        Ok(v as f32)
    }
}

//! Interfaces and implementations specific to integration with `ndarray`.
//!
//! This module introduces the trait [`IntoNdArray`], which is implemented for
//! NRRD volume types and enables their mapping into an [`Array`] with a
//! dynamic number of dimensions. The target [element type] needs to be
//! provided at compile time and must match the volume's `type` field:
//! samples are never cast.
//!
//! #### Note on memory order
//!
//! NRRD volumes are stored with the first axis varying fastest (Fortran
//! order). By default, the resulting array keeps the axes in the order of
//! the `sizes` field and is laid out in column major order. Requesting
//! [`IndexOrder::C`] instead reverses the axes, so that the array is in row
//! major order and the last axis of `sizes` comes first. Neither choice
//! copies the samples.
//!
//! [`IntoNdArray`]: ./trait.IntoNdArray.html
//! [`Array`]: ../../../ndarray/type.Array.html
//! [element type]: ../element/trait.DataElement.html
//! [`IndexOrder::C`]: ../../typedef/enum.IndexOrder.html
//!
use crate::error::Result;
use crate::typedef::IndexOrder;
use crate::volume::element::DataElement;
use ndarray::{Array, IxDyn};

/// Trait for volumes which can be converted to an ndarray.
///
/// Please see the [module-level documentation](index.html) for more details.
pub trait IntoNdArray {
    /// Consume the volume into an ndarray with the same number of dimensions
    /// and the given element type `T`, with axes in the order of `sizes`.
    ///
    /// # Errors
    ///
    /// - `NrrdError::ElementTypeMismatch` if `T` is not the volume's
    ///   element type.
    fn into_ndarray<T>(self) -> Result<Array<T, IxDyn>>
    where
        Self: Sized,
        T: DataElement,
    {
        self.into_ndarray_with_order(IndexOrder::Fortran)
    }

    /// Consume the volume into an ndarray, with the axes in the given
    /// index order.
    fn into_ndarray_with_order<T>(self, order: IndexOrder) -> Result<Array<T, IxDyn>>
    where
        T: DataElement;
}

//! Module holding an in-memory implementation of a NRRD volume.

use super::codec::{self, DataLayout};
use super::element::DataElement;
use super::ndarray::IntoNdArray;
use super::util::coords_to_index;
use super::NrrdVolume;
use crate::error::{NrrdError, Result};
use crate::header::NrrdHeader;
use crate::typedef::{IndexOrder, NrrdType};
use byteordered::Endianness;
use ndarray::{Array, IxDyn, ShapeBuilder};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A data type for a NRRD volume contained in memory.
/// Objects of this type contain raw sample data in the byte order it was
/// stored with, which is converted when reading samples or converting the
/// volume to an `ndarray`.
#[derive(Debug, PartialEq, Clone)]
pub struct InMemNrrdVolume {
    sizes: Vec<usize>,
    datatype: NrrdType,
    item_size: usize,
    raw_data: Vec<u8>,
    endianness: Endianness,
}

impl InMemNrrdVolume {
    /// Build a volume out of raw sample bytes in the given byte order. The
    /// first axis of `sizes` varies fastest.
    ///
    /// # Errors
    ///
    /// - `NrrdError::UnsupportedDataType` for block volumes, which are
    ///   built with [`from_raw_blocks`](#method.from_raw_blocks).
    /// - `NrrdError::IncompatibleLength` if the data does not fit the sizes.
    pub fn from_raw_data(
        sizes: &[usize],
        datatype: NrrdType,
        raw_data: Vec<u8>,
        endianness: Endianness,
    ) -> Result<Self> {
        let item_size = datatype
            .size_of()
            .ok_or(NrrdError::UnsupportedDataType(datatype))?;
        Self::with_item_size(sizes, datatype, item_size, raw_data, endianness)
    }

    /// Build a block volume, where each element is an opaque block of
    /// `block_size` bytes.
    pub fn from_raw_blocks(sizes: &[usize], block_size: usize, raw_data: Vec<u8>) -> Result<Self> {
        if block_size == 0 {
            return Err(NrrdError::InvalidBlockSize(0));
        }
        Self::with_item_size(
            sizes,
            NrrdType::Block,
            block_size,
            raw_data,
            Endianness::native(),
        )
    }

    fn with_item_size(
        sizes: &[usize],
        datatype: NrrdType,
        item_size: usize,
        raw_data: Vec<u8>,
        endianness: Endianness,
    ) -> Result<Self> {
        let expected = sizes.iter().product::<usize>() * item_size;
        if raw_data.len() != expected {
            return Err(NrrdError::IncompatibleLength(raw_data.len(), expected));
        }
        Ok(InMemNrrdVolume {
            sizes: sizes.to_vec(),
            datatype,
            item_size,
            raw_data,
            endianness,
        })
    }

    /// Read a NRRD volume from a stream positioned at the start of the
    /// data section. The header must be known in advance. Detached data
    /// files are not followed: `source` is assumed to hold the data.
    pub fn from_reader<R: BufRead>(source: R, header: &NrrdHeader) -> Result<Self> {
        let layout = DataLayout::from_header(header)?;
        Self::from_layout(source, &layout)
    }

    /// Read a NRRD volume from a data file, such as the one named by the
    /// `data file` field of a detached header.
    pub fn from_file<P: AsRef<Path>>(path: P, header: &NrrdHeader) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        Self::from_reader(file, header)
    }

    pub(crate) fn from_layout<R: BufRead>(source: R, layout: &DataLayout) -> Result<Self> {
        let (raw_data, endianness) = codec::decode(source, layout)?;
        Ok(InMemNrrdVolume {
            sizes: layout.sizes.clone(),
            datatype: layout.datatype,
            item_size: layout.item_size,
            raw_data,
            endianness,
        })
    }

    /// Retrieve the raw data, consuming the volume.
    pub fn into_raw_data(self) -> Vec<u8> {
        self.raw_data
    }

    /// Retrieve a reference to the raw data.
    pub fn raw_data(&self) -> &[u8] {
        &self.raw_data
    }

    /// Retrieve a mutable reference to the raw data.
    pub fn raw_data_mut(&mut self) -> &mut [u8] {
        &mut self.raw_data
    }

    /// The byte order of the raw data.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// The size of each element in bytes, which is the block size for
    /// block volumes.
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// The total number of elements.
    pub fn element_count(&self) -> usize {
        self.sizes.iter().product()
    }

    fn shaped<T>(shape: Vec<usize>, data: Vec<T>, order: IndexOrder) -> Result<Array<T, IxDyn>> {
        let len = data.len();
        let expected = shape.iter().product();
        let a = Array::from_shape_vec(IxDyn(&shape).f(), data)
            .map_err(|_| NrrdError::IncompatibleLength(len, expected))?;
        Ok(match order {
            IndexOrder::Fortran => a,
            IndexOrder::C => a.reversed_axes(),
        })
    }

    /// Consume a block volume into an array of bytes, with the bytes of
    /// each block as an extra axis varying fastest (Fortran order) or
    /// slowest (C order).
    pub fn into_block_ndarray(self, order: IndexOrder) -> Result<Array<u8, IxDyn>> {
        if self.datatype != NrrdType::Block {
            return Err(NrrdError::ElementTypeMismatch(NrrdType::Block, self.datatype));
        }
        let mut shape = Vec::with_capacity(self.sizes.len() + 1);
        shape.push(self.item_size);
        shape.extend_from_slice(&self.sizes);
        Self::shaped(shape, self.raw_data, order)
    }
}

impl IntoNdArray for InMemNrrdVolume {
    fn into_ndarray_with_order<T>(self, order: IndexOrder) -> Result<Array<T, IxDyn>>
    where
        T: DataElement,
    {
        if T::DATA_TYPE != self.datatype {
            return Err(NrrdError::ElementTypeMismatch(T::DATA_TYPE, self.datatype));
        }
        let data = T::from_raw_vec(self.raw_data, self.endianness);
        Self::shaped(self.sizes, data, order)
    }
}

impl<'a> IntoNdArray for &'a InMemNrrdVolume {
    fn into_ndarray_with_order<T>(self, order: IndexOrder) -> Result<Array<T, IxDyn>>
    where
        T: DataElement,
    {
        self.clone().into_ndarray_with_order(order)
    }
}

fn read_sample<T: DataElement>(bytes: &[u8], endianness: Endianness) -> f64 {
    let v: T = bytemuck::pod_read_unaligned(bytes);
    if endianness == Endianness::native() {
        v.to_f64()
    } else {
        v.swap_bytes().to_f64()
    }
}

impl NrrdVolume for InMemNrrdVolume {
    fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    fn data_type(&self) -> NrrdType {
        self.datatype
    }

    fn get_f64(&self, coords: &[usize]) -> Result<f64> {
        if self.datatype == NrrdType::Block {
            return Err(NrrdError::UnsupportedDataType(NrrdType::Block));
        }
        let index = coords_to_index(coords, &self.sizes)?;
        let bytes = &self.raw_data[index * self.item_size..(index + 1) * self.item_size];
        with_element_type!(self.datatype, T => Ok(read_sample::<T>(bytes, self.endianness)),
            Block => Err(NrrdError::UnsupportedDataType(NrrdType::Block)))
    }
}

impl<'a> NrrdVolume for &'a InMemNrrdVolume {
    fn sizes(&self) -> &[usize] {
        (**self).sizes()
    }

    fn data_type(&self) -> NrrdType {
        (**self).data_type()
    }

    fn get_f64(&self, coords: &[usize]) -> Result<f64> {
        (**self).get_f64(coords)
    }
}

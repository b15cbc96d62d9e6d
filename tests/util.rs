//! Helpers shared by the integration tests.
#![allow(dead_code)]

use ndarray::{Array, Array3, IxDyn, ShapeBuilder};
use std::fs;
use std::path::Path;

/// Write a file made of a header text followed by data bytes.
pub fn write_nrrd_file<P: AsRef<Path>>(path: P, header: &str, data: &[u8]) {
    let mut contents = header.as_bytes().to_vec();
    contents.extend_from_slice(data);
    fs::write(path, contents).unwrap();
}

/// Big endian bytes of the given 16-bit samples.
pub fn i16_be_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|v| v.to_be_bytes().to_vec()).collect()
}

/// Little endian bytes of the given 16-bit samples.
pub fn i16_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|v| v.to_le_bytes().to_vec()).collect()
}

/// A 3D volume where every sample is a distinct function of its indices.
pub fn ramp_volume(size: usize) -> Array3<i16> {
    Array3::from_shape_fn((size, size, size), |(i, j, k)| {
        (i as i16) - 2 * (j as i16) + 3 * (k as i16) * (k as i16)
    })
}

/// Shape a vector of samples stored with the first axis varying fastest.
pub fn fortran_array<T>(sizes: &[usize], data: Vec<T>) -> Array<T, IxDyn> {
    Array::from_shape_vec(IxDyn(sizes).f(), data).unwrap()
}

//! Miscellaneous volume-related functions
use crate::error::{NrrdError, Result};

/// Obtain the linear index of a sample from its coordinates, the first
/// axis varying fastest.
pub fn coords_to_index(coords: &[usize], dim: &[usize]) -> Result<usize> {
    if coords.len() != dim.len() || coords.is_empty() {
        return Err(NrrdError::IncorrectVolumeDimensionality(
            dim.len(),
            coords.len(),
        ));
    }

    if !coords.iter().zip(dim).all(|(i, d)| i < d) {
        return Err(NrrdError::OutOfBounds(Vec::from(coords)));
    }

    let index = coords
        .iter()
        .zip(dim)
        .rev()
        .fold(0, |a, (c, d)| a * d + c);

    Ok(index)
}

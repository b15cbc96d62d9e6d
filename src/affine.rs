//! Index-to-world transforms of NRRD volumes in 3D space, built from the
//! `space directions` and `space origin` fields.

use crate::error::{NrrdError, Result};
use crate::header::NrrdHeader;
use crate::value::Value;
use nalgebra::{Matrix3, Matrix4, Scalar, Vector3};

/// A 3x3 linear transform.
pub type Affine3 = Matrix3<f64>;
/// A homogeneous 4x4 transform.
pub type Affine4 = Matrix4<f64>;

/// Separate a 4x4 affine into its 3x3 affine and translation components.
pub fn get_affine_and_translation<T: Scalar>(affine: &Matrix4<T>) -> (Matrix3<T>, Vector3<T>) {
    let translation = Vector3::new(
        affine[(0, 3)].clone(),
        affine[(1, 3)].clone(),
        affine[(2, 3)].clone(),
    );
    let affine = affine.fixed_view::<3, 3>(0, 0).into_owned();
    (affine, translation)
}

/// Gather the direction vectors of the spatial axes, skipping the `none`
/// rows of non-spatial axes.
fn spatial_directions(value: &Value) -> Result<Vec<Vec<f64>>> {
    let rows = value.to_optional_rows().ok_or_else(|| {
        NrrdError::UnexpectedFieldValue("space directions".to_string(), "a matrix")
    })?;
    Ok(rows.into_iter().flatten().collect())
}

impl NrrdHeader {
    /// Build the transform from index coordinates to world coordinates.
    ///
    /// Column `j` of the linear part is the direction of the `j`-th spatial
    /// axis, and the translation is the space origin, or zero when the
    /// header has no `space origin`.
    ///
    /// # Errors
    ///
    /// - `NrrdError::MissingField` if the header has no `space directions`.
    /// - `NrrdError::UnexpectedFieldValue` if the header does not describe
    ///   exactly three spatial axes in a 3D space.
    pub fn affine(&self) -> Result<Affine4> {
        let directions = spatial_directions(self.required("space directions")?)?;
        if directions.len() != 3 || directions.iter().any(|d| d.len() != 3) {
            return Err(NrrdError::UnexpectedFieldValue(
                "space directions".to_string(),
                "three spatial axes in 3D space",
            ));
        }

        let origin = match self.get("space origin") {
            None => [0.; 3],
            Some(v) => match v.as_double_slice() {
                Some(&[x, y, z]) => [x, y, z],
                _ => {
                    return Err(NrrdError::UnexpectedFieldValue(
                        "space origin".to_string(),
                        "a vector of 3 numbers",
                    ))
                }
            },
        };

        let mut affine = Affine4::identity();
        for (j, direction) in directions.iter().enumerate() {
            for (i, &d) in direction.iter().enumerate() {
                affine[(i, j)] = d;
            }
        }
        for (i, &o) in origin.iter().enumerate() {
            affine[(i, 3)] = o;
        }
        Ok(affine)
    }

    /// Set the `space directions` and `space origin` fields from a
    /// transform from index coordinates to world coordinates.
    ///
    /// Axes which were marked as non-spatial in the current
    /// `space directions` field keep their `none` row; the spatial axes
    /// receive the columns of the transform in order.
    pub fn set_affine(&mut self, affine: &Affine4) {
        let (linear, translation) = get_affine_and_translation(affine);
        let mut columns = (0..3).map(|j| Some(linear.column(j).iter().copied().collect::<Vec<_>>()));

        let rows: Vec<Option<Vec<f64>>> = match self
            .get("space directions")
            .and_then(Value::to_optional_rows)
        {
            Some(current) if current.iter().filter(|r| r.is_some()).count() == 3 => current
                .into_iter()
                .map(|row| row.and_then(|_| columns.next().flatten()))
                .collect(),
            _ => columns.collect(),
        };

        let value = match self.get("space directions") {
            Some(Value::DoubleVectorList(_)) => Value::DoubleVectorList(rows),
            _ => {
                let matrix = rows
                    .iter()
                    .flat_map(|row| match row {
                        Some(r) => r.clone(),
                        None => vec![f64::NAN; 3],
                    })
                    .collect();
                match ndarray::Array2::from_shape_vec((rows.len(), 3), matrix) {
                    Ok(m) => Value::DoubleMatrix(m),
                    Err(_) => Value::DoubleVectorList(rows),
                }
            }
        };
        let _ = self.insert("space directions", value);
        let _ = self.insert(
            "space origin",
            Value::DoubleVector(translation.iter().copied().collect()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn affine_and_translation() {
        #[rustfmt::skip]
        let affine = Affine4::new(
            1., 2., 3., 10.,
            4., 5., 6., 20.,
            7., 8., 9., 30.,
            0., 0., 0., 1.,
        );
        let (linear, translation) = get_affine_and_translation(&affine);
        assert_eq!(linear, Affine3::new(1., 2., 3., 4., 5., 6., 7., 8., 9.));
        assert_eq!(translation, Vector3::new(10., 20., 30.));
    }

    #[test]
    fn skips_non_spatial_axes() {
        let nan = f64::NAN;
        let header = NrrdHeader::new()
            .with_field(
                "space directions",
                array![[nan, nan, nan], [2., 0., 0.], [0., 3., 0.], [0., 0., 4.]],
            )
            .with_field("space origin", Value::DoubleVector(vec![1., 2., 3.]));
        #[rustfmt::skip]
        let expected = Affine4::new(
            2., 0., 0., 1.,
            0., 3., 0., 2.,
            0., 0., 4., 3.,
            0., 0., 0., 1.,
        );
        assert_eq!(header.affine().unwrap(), expected);
    }

    #[test]
    fn missing_directions() {
        assert!(matches!(
            NrrdHeader::new().affine(),
            Err(NrrdError::MissingField(_))
        ));
        let header = NrrdHeader::new().with_field("space directions", array![[1., 0.], [0., 1.]]);
        assert!(matches!(
            header.affine(),
            Err(NrrdError::UnexpectedFieldValue(_, _))
        ));
    }
}

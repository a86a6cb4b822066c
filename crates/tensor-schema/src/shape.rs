// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors with dynamic-dimension support.

use std::fmt;

use crate::{DType, ShapeError};

/// Describes the dimensionality of one tensor binding.
///
/// Dimensions are stored as `i64` because compiled artifacts may declare a
/// *dynamic* leading dimension with the sentinel `-1`; such a shape must be
/// resolved against an optimization profile before it can size a buffer.
/// Shapes are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TensorShape {
    dims: Vec<i64>,
}

impl TensorShape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_schema::TensorShape;
    /// let s = TensorShape::new(vec![1, 224, 224, 3]);
    /// assert_eq!(s.rank(), 4);
    /// assert!(!s.has_dynamic());
    /// ```
    pub fn new(dims: Vec<i64>) -> Self {
        Self { dims }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[i64] {
        &self.dims
    }

    /// Returns a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<i64> {
        self.dims.get(index).copied()
    }

    /// Returns `true` if any dimension carries the dynamic sentinel.
    pub fn has_dynamic(&self) -> bool {
        self.dims.iter().any(|&d| d < 0)
    }

    /// Returns `true` if the *leading* dimension is dynamic.
    ///
    /// This is the only placement compiled artifacts use for batch-size
    /// wildcards; a negative dimension anywhere else is rejected later, when
    /// the shape is sized.
    pub fn leading_dynamic(&self) -> bool {
        matches!(self.dims.first(), Some(&d) if d < 0)
    }

    /// Returns the total number of elements.
    ///
    /// For a scalar shape (rank 0), returns 1. Fails if any dimension is
    /// ≤ 0 or the product overflows.
    pub fn num_elements(&self) -> Result<usize, ShapeError> {
        let mut total: usize = 1;
        for (index, &value) in self.dims.iter().enumerate() {
            if value <= 0 {
                return Err(ShapeError::NonPositiveDim { index, value });
            }
            total = total
                .checked_mul(value as usize)
                .ok_or_else(|| ShapeError::ElementCountOverflow { shape: self.clone() })?;
        }
        Ok(total)
    }

    /// Computes the memory footprint in bytes for a given [`DType`].
    ///
    /// # Examples
    /// ```
    /// use tensor_schema::{DType, TensorShape};
    /// let s = TensorShape::new(vec![1, 1000]);
    /// assert_eq!(s.byte_size(DType::F32).unwrap(), 4000);
    /// ```
    pub fn byte_size(&self, dtype: DType) -> Result<usize, ShapeError> {
        let elements = self.num_elements()?;
        elements
            .checked_mul(dtype.size_bytes())
            .ok_or_else(|| ShapeError::ElementCountOverflow { shape: self.clone() })
    }

    /// Returns the dimensions as `usize` values, failing on any dimension
    /// that is still ≤ 0.
    pub fn static_dims(&self) -> Result<Vec<usize>, ShapeError> {
        self.dims
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                if value <= 0 {
                    Err(ShapeError::NonPositiveDim { index, value })
                } else {
                    Ok(value as usize)
                }
            })
            .collect()
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Convenience: `TensorShape::from(vec![1, 3])`.
impl From<Vec<i64>> for TensorShape {
    fn from(dims: Vec<i64>) -> Self {
        Self::new(dims)
    }
}

/// Convenience: `TensorShape::from(&[1, 3][..])`.
impl From<&[i64]> for TensorShape {
    fn from(dims: &[i64]) -> Self {
        Self::new(dims.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_shape() {
        let s = TensorShape::new(vec![1, 224, 224, 3]);
        assert_eq!(s.rank(), 4);
        assert!(!s.has_dynamic());
        assert!(!s.leading_dynamic());
        assert_eq!(s.num_elements().unwrap(), 150_528);
    }

    #[test]
    fn test_dynamic_leading_dim() {
        let s = TensorShape::new(vec![-1, 224, 224, 3]);
        assert!(s.has_dynamic());
        assert!(s.leading_dynamic());
        assert!(matches!(
            s.num_elements(),
            Err(ShapeError::NonPositiveDim { index: 0, value: -1 })
        ));
    }

    #[test]
    fn test_dynamic_inner_dim_is_not_leading() {
        let s = TensorShape::new(vec![4, -1, 8]);
        assert!(s.has_dynamic());
        assert!(!s.leading_dynamic());
    }

    #[test]
    fn test_scalar_shape() {
        let s = TensorShape::new(vec![]);
        assert_eq!(s.rank(), 0);
        assert_eq!(s.num_elements().unwrap(), 1);
        assert_eq!(s.byte_size(DType::F32).unwrap(), 4);
    }

    #[test]
    fn test_zero_dim_rejected() {
        let s = TensorShape::new(vec![2, 0, 5]);
        assert!(matches!(
            s.byte_size(DType::F32),
            Err(ShapeError::NonPositiveDim { index: 1, value: 0 })
        ));
    }

    #[test]
    fn test_byte_size() {
        let s = TensorShape::new(vec![1, 1000]);
        assert_eq!(s.byte_size(DType::F32).unwrap(), 4000);
        assert_eq!(s.byte_size(DType::F16).unwrap(), 2000);
        assert_eq!(s.byte_size(DType::I8).unwrap(), 1000);
        assert_eq!(s.byte_size(DType::Bool).unwrap(), 1000);
    }

    #[test]
    fn test_overflow_detected() {
        let s = TensorShape::new(vec![i64::MAX / 2, 8]);
        assert!(matches!(
            s.num_elements(),
            Err(ShapeError::ElementCountOverflow { .. })
        ));
    }

    #[test]
    fn test_static_dims() {
        let s = TensorShape::new(vec![8, 224, 224, 3]);
        assert_eq!(s.static_dims().unwrap(), vec![8, 224, 224, 3]);
        let d = TensorShape::new(vec![-1, 3]);
        assert!(d.static_dims().is_err());
    }

    #[test]
    fn test_display() {
        let s = TensorShape::new(vec![-1, 224, 224, 3]);
        assert_eq!(format!("{s}"), "[-1, 224, 224, 3]");
    }

    #[test]
    fn test_from_conversions() {
        let s1: TensorShape = vec![2i64, 3].into();
        let s2: TensorShape = (&[2i64, 3][..]).into();
        assert_eq!(s1, s2);
    }

    #[test]
    fn test_serde_transparent() {
        let s = TensorShape::new(vec![-1, 3]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "[-1,3]");
        let back: TensorShape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}

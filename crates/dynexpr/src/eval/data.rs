use crate::error::{ExprError, ExprResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The (F, n) input matrix: F feature rows, n sample columns.
///
/// Storage is row-major in a single allocation, so every feature row is a
/// contiguous slice - the layout the fused evaluation kernels read from
/// directly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dataset<T> {
    data: Vec<T>,
    features: usize,
    samples: usize,
}

impl<T> Dataset<T> {
    /// Build a dataset from one row per feature. All rows must share one
    /// length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> ExprResult<Self> {
        let features = rows.len();
        let samples = rows.first().map_or(0, |row| row.len());

        for (row, values) in rows.iter().enumerate() {
            if values.len() != samples {
                return Err(ExprError::RaggedDataset {
                    row,
                    len: values.len(),
                    expected: samples,
                });
            }
        }

        if samples == 0 {
            tracing::warn!(features, "dataset constructed with zero samples");
        }

        Ok(Dataset {
            data: rows.into_iter().flatten().collect(),
            features,
            samples,
        })
    }

    pub fn n_features(&self) -> usize {
        self.features
    }

    pub fn n_samples(&self) -> usize {
        self.samples
    }

    /// The contiguous row for the 1-based `feature` index.
    #[inline]
    pub fn feature(&self, feature: usize) -> &[T] {
        assert!(feature >= 1, "feature indices are 1-based");
        &self.data[(feature - 1) * self.samples..feature * self.samples]
    }

    #[inline]
    pub fn get_feature(&self, feature: usize) -> Option<&[T]> {
        if feature >= 1 && feature <= self.features {
            Some(self.feature(feature))
        } else {
            None
        }
    }
}

impl<T> From<Vec<Vec<T>>> for Dataset<T> {
    fn from(rows: Vec<Vec<T>>) -> Self {
        match Dataset::from_rows(rows) {
            Ok(data) => data,
            Err(err) => panic!("{}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let data = Dataset::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();

        assert_eq!(data.n_features(), 2);
        assert_eq!(data.n_samples(), 3);
        assert_eq!(data.feature(1), &[1.0, 2.0, 3.0]);
        assert_eq!(data.feature(2), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let result = Dataset::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);

        assert_eq!(
            result,
            Err(ExprError::RaggedDataset {
                row: 1,
                len: 1,
                expected: 2
            })
        );
    }

    #[test]
    fn test_checked_feature_access() {
        let data = Dataset::from_rows(vec![vec![1.0_f32, 2.0]]).unwrap();

        assert!(data.get_feature(1).is_some());
        assert!(data.get_feature(0).is_none());
        assert!(data.get_feature(2).is_none());
    }

    #[test]
    fn test_empty_dataset() {
        let data = Dataset::<f64>::from_rows(vec![]).unwrap();

        assert_eq!(data.n_features(), 0);
        assert_eq!(data.n_samples(), 0);
    }

    #[test]
    #[should_panic]
    fn test_from_panics_on_ragged_rows() {
        let _ = Dataset::from(vec![vec![1.0, 2.0], vec![3.0]]);
    }
}

//! Label encoding into a fixed class space

use crate::error::{Result, TabMlpError};
use ndarray::{Array1, Array2};

/// One-hot encode integer class labels (carried as `f64`) into an
/// `(n, n_classes)` matrix.
///
/// The class space is fixed: every label must fall in `[0, n_classes)`.
pub fn one_hot_encode(labels: &Array1<f64>, n_classes: usize) -> Result<Array2<f64>> {
    let mut encoded = Array2::zeros((labels.len(), n_classes));

    for (i, &label) in labels.iter().enumerate() {
        let class = label as i64;
        if label < 0.0 || class as usize >= n_classes {
            return Err(TabMlpError::LabelOutOfRange {
                label: class,
                n_classes,
            });
        }
        encoded[[i, class as usize]] = 1.0;
    }

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_one_hot_encode() {
        let labels = array![0.0, 2.0, 1.0];
        let encoded = one_hot_encode(&labels, 3).unwrap();

        assert_eq!(encoded.shape(), &[3, 3]);
        assert_eq!(encoded[[0, 0]], 1.0);
        assert_eq!(encoded[[1, 2]], 1.0);
        assert_eq!(encoded[[2, 1]], 1.0);
        for row in encoded.rows() {
            assert_eq!(row.sum(), 1.0);
        }
    }

    #[test]
    fn test_label_out_of_range() {
        let labels = array![0.0, 9.0];
        assert!(matches!(
            one_hot_encode(&labels, 9),
            Err(TabMlpError::LabelOutOfRange { label: 9, n_classes: 9 })
        ));
    }

    #[test]
    fn test_negative_label() {
        let labels = array![-1.0];
        assert!(matches!(
            one_hot_encode(&labels, 9),
            Err(TabMlpError::LabelOutOfRange { .. })
        ));
    }

    #[test]
    fn test_empty_labels() {
        let labels = Array1::<f64>::zeros(0);
        let encoded = one_hot_encode(&labels, 9).unwrap();
        assert_eq!(encoded.shape(), &[0, 9]);
    }
}

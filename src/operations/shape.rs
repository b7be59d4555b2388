//! Canonical rank 3 layout for filter coefficients.
//!
//! | input rank | input shape       | output shape   |
//! |------------|-------------------|----------------|
//! | 1          | `(L,)`            | `(1, 1, L)`    |
//! | 2          | `(M, L)`          | `(1, M, L)`    |
//! | 3          | `(F, M, L)`       | `(F, M, L)`    |
//! | other      |                   | shape error    |
//!
//! The first axis always counts filters, so a single filter and a batch of
//! filters go through the same code path.

use ndarray::{Array, Array3, Dimension, Order};

use crate::{SignalError, SignalResult};

/// Brings `data` to rank 3 by prepending unit axes.
///
/// ```rust
/// use acoustic_signals::atleast_3d_first_dim;
/// use ndarray::array;
///
/// let sos = array![[1.0, 0.5, 0.0, 1.0, 0.0, 0.0]];
/// assert_eq!(atleast_3d_first_dim(sos).unwrap().shape(), &[1, 1, 6]);
/// ```
///
/// # Errors
/// Returns [`SignalError::Shape`] for rank 0 and ranks above 3.
pub fn atleast_3d_first_dim<A, D>(data: Array<A, D>) -> SignalResult<Array3<A>>
where
    A: Clone,
    D: Dimension,
{
    let shape = data.shape().to_vec();
    let target = match shape.as_slice() {
        [len] => [1, 1, *len],
        [rows, len] => [1, *rows, *len],
        [filters, rows, len] => [*filters, *rows, *len],
        _ => {
            return Err(SignalError::shape(format!(
                "coefficients must have rank 1, 2 or 3, got shape {shape:?}"
            )));
        }
    };
    Ok(data.to_shape((target, Order::RowMajor))?.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, array};

    #[test]
    fn test_atleast_3d_first_dim() {
        let arr = atleast_3d_first_dim(array![1.0, 0.0, 0.0]).unwrap();
        assert_eq!(arr, array![[[1.0, 0.0, 0.0]]]);

        let arr = atleast_3d_first_dim(array![[1.0, 0.0, 0.0], [2.0, 2.0, 2.0]]).unwrap();
        assert_eq!(arr, array![[[1.0, 0.0, 0.0], [2.0, 2.0, 2.0]]]);

        let ones = Array::from_shape_fn((2, 3, 5), |(a, b, c)| (a * 15 + b * 5 + c) as f64);
        let arr = atleast_3d_first_dim(ones.clone()).unwrap();
        assert_eq!(arr, ones);
    }

    #[test]
    fn test_rejects_other_ranks() {
        let scalar = ndarray::arr0(1.0);
        assert!(matches!(
            atleast_3d_first_dim(scalar),
            Err(SignalError::Shape(_))
        ));
        let four = Array::<f64, _>::zeros((1, 1, 1, 3));
        assert!(atleast_3d_first_dim(four).is_err());
    }

    #[test]
    fn test_non_standard_layout_keeps_logical_order() {
        let transposed = array![[1.0, 2.0], [3.0, 4.0]].reversed_axes();
        let arr = atleast_3d_first_dim(transposed).unwrap();
        assert_eq!(arr, array![[[1.0, 3.0], [2.0, 4.0]]]);
    }
}

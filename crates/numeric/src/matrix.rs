use crate::error::NumericError;
use nalgebra::DMatrix;

/// A diagonal entry at least this close to 1 marks the state as absorbing.
const ABSORBING_EPS: f64 = 1e-9;

/// Singular values below this threshold are discarded by the pseudo-inverse.
const PINV_EPS: f64 = 1e-12;

/// The limit of a row-stochastic matrix raised to an infinite power.
#[derive(Debug, Clone)]
pub struct AbsorbingLimit {
    pub matrix: DMatrix<f64>,
    /// True when the fundamental matrix was singular and the limit had to be
    /// computed through a pseudo-inverse. Callers should surface this as a
    /// recoverable diagnostic, not an error.
    pub used_pseudo_inverse: bool,
}

/// Divides every row of `matrix` by its sum.
///
/// A zero divisor is replaced by 1, so all-zero rows stay all-zero. Rows that
/// must be stochastic are guaranteed non-zero by construction: the transition
/// matrix builder injects self-loops into the absorbing rows.
pub fn normalize_rows(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let mut normalized = matrix.clone();
    for mut row in normalized.row_iter_mut() {
        let sum: f64 = row.iter().sum();
        let divisor = if sum == 0.0 { 1.0 } else { sum };
        for value in row.iter_mut() {
            *value /= divisor;
        }
    }
    normalized
}

/// Computes `lim k→∞ Mᵏ` for a row-stochastic matrix with absorbing states.
///
/// States are split into absorbing (self-loop probability 1) and transient.
/// With `Q` the transient-to-transient block and `R` the transient-to-
/// absorbing block, the limit's only non-zero entries are the absorption
/// probabilities `B = (I − Q)⁻¹ · R` and the absorbing self-loops; mass
/// between transient states vanishes at infinity.
///
/// `I − Q` fails to invert exactly when transient states are trapped in a
/// cycle with no path to an absorbing state (a repeated unit-modulus
/// eigenvalue). That case degrades to an SVD pseudo-inverse and is flagged on
/// the result so the caller can report it.
pub fn power_to_infinity(matrix: &DMatrix<f64>) -> Result<AbsorbingLimit, NumericError> {
    if !matrix.is_square() {
        return Err(NumericError::NonSquareMatrix {
            rows: matrix.nrows(),
            cols: matrix.ncols(),
        });
    }
    let n = matrix.nrows();

    let (transient, absorbing): (Vec<usize>, Vec<usize>) =
        (0..n).partition(|&i| matrix[(i, i)] < 1.0 - ABSORBING_EPS);

    let mut limit = DMatrix::zeros(n, n);
    for &a in &absorbing {
        limit[(a, a)] = 1.0;
    }
    if transient.is_empty() || absorbing.is_empty() {
        return Ok(AbsorbingLimit {
            matrix: limit,
            used_pseudo_inverse: false,
        });
    }

    let q = DMatrix::from_fn(transient.len(), transient.len(), |i, j| {
        matrix[(transient[i], transient[j])]
    });
    let r = DMatrix::from_fn(transient.len(), absorbing.len(), |i, j| {
        matrix[(transient[i], absorbing[j])]
    });

    let identity = DMatrix::identity(transient.len(), transient.len());
    let fundamental = &identity - &q;

    let mut used_pseudo_inverse = false;
    let inverse = match fundamental.clone().try_inverse() {
        Some(inverse) => inverse,
        None => {
            used_pseudo_inverse = true;
            fundamental
                .pseudo_inverse(PINV_EPS)
                .map_err(|e| NumericError::PseudoInverse(e.to_string()))?
        }
    };

    let absorption = inverse * r;
    for (ti, &row) in transient.iter().enumerate() {
        for (aj, &col) in absorbing.iter().enumerate() {
            limit[(row, col)] = absorption[(ti, aj)];
        }
    }

    Ok(AbsorbingLimit {
        matrix: limit,
        used_pseudo_inverse,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn normalize_divides_rows_by_their_sum() {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 6.0, 1.0, 1.0]);
        let n = normalize_rows(&m);
        assert!((n[(0, 0)] - 0.25).abs() < EPS);
        assert!((n[(0, 1)] - 0.75).abs() < EPS);
        assert!((n[(1, 0)] - 0.5).abs() < EPS);
    }

    #[test]
    fn normalize_leaves_zero_rows_untouched() {
        let m = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 3.0, 1.0]);
        let n = normalize_rows(&m);
        assert_eq!(n[(0, 0)], 0.0);
        assert_eq!(n[(0, 1)], 0.0);
        assert!((n.row(1).iter().sum::<f64>() - 1.0).abs() < EPS);
    }

    #[test]
    fn direct_split_between_two_absorbing_states() {
        // One transient state splitting 50/50 between two absorbing states.
        let m = DMatrix::from_row_slice(
            3,
            3,
            &[0.0, 0.5, 0.5, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        );
        let limit = power_to_infinity(&m).unwrap();
        assert!(!limit.used_pseudo_inverse);
        assert!((limit.matrix[(0, 1)] - 0.5).abs() < EPS);
        assert!((limit.matrix[(0, 2)] - 0.5).abs() < EPS);
        assert!(limit.matrix[(0, 0)].abs() < EPS);
    }

    #[test]
    fn self_loop_mass_is_eventually_absorbed() {
        // A state retrying itself with probability 0.3 still converts with
        // probability 1 at infinity.
        let m = DMatrix::from_row_slice(
            3,
            3,
            &[0.0, 1.0, 0.0, 0.0, 0.3, 0.7, 0.0, 0.0, 1.0],
        );
        let limit = power_to_infinity(&m).unwrap();
        assert!((limit.matrix[(0, 2)] - 1.0).abs() < EPS);
        assert!((limit.matrix[(1, 2)] - 1.0).abs() < EPS);
    }

    #[test]
    fn all_absorbing_matrix_is_its_own_limit() {
        let m = DMatrix::identity(3, 3);
        let limit = power_to_infinity(&m).unwrap();
        assert_eq!(limit.matrix, m);
    }

    #[test]
    fn transient_cycle_takes_the_pseudo_inverse_path() {
        // Two transient states feeding each other forever: I - Q is exactly
        // singular (repeated unit-modulus eigenvalue).
        let m = DMatrix::from_row_slice(
            3,
            3,
            &[0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        );
        let limit = power_to_infinity(&m).unwrap();
        assert!(limit.used_pseudo_inverse);
        assert!(limit.matrix.iter().all(|v| v.is_finite()));
        // No path into the absorbing state, so nothing is absorbed.
        assert!(limit.matrix[(0, 2)].abs() < EPS);
    }

    #[test]
    fn zero_rows_absorb_nothing() {
        // State 1 is a dead transient state: mass entering it vanishes.
        let m = DMatrix::from_row_slice(
            3,
            3,
            &[0.0, 0.5, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        );
        let limit = power_to_infinity(&m).unwrap();
        assert!((limit.matrix[(0, 2)] - 0.5).abs() < EPS);
        assert!(limit.matrix[(1, 2)].abs() < EPS);
    }

    #[test]
    fn rejects_non_square_input() {
        let m = DMatrix::zeros(2, 3);
        assert!(matches!(
            power_to_infinity(&m),
            Err(NumericError::NonSquareMatrix { rows: 2, cols: 3 })
        ));
    }
}

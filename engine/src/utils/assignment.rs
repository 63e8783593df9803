use nalgebra::DMatrix;

use crate::errors::{PhiError, Result};

/// Solve the square linear sum assignment problem (Hungarian method with
/// row/column potentials, O(n^3)).
///
/// Returns `assignment[row] = column` minimising the total cost.
pub fn linear_sum_assignment(cost: &DMatrix<f64>) -> Result<Vec<usize>> {
    if cost.nrows() != cost.ncols() {
        return Err(PhiError::DimensionMismatch {
            left: cost.nrows(),
            right: cost.ncols(),
        });
    }
    if cost.iter().any(|c| !c.is_finite()) {
        return Err(PhiError::Computation(
            "assignment costs must be finite".into(),
        ));
    }
    let n = cost.nrows();
    if n == 0 {
        return Ok(Vec::new());
    }

    // Index 0 is a virtual row/column; real entries are 1..=n.
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    let mut matched_row = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for row in 1..=n {
        matched_row[0] = row;
        let mut col0 = 0usize;
        let mut min_slack = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[col0] = true;
            let row0 = matched_row[col0];
            let mut delta = f64::INFINITY;
            let mut col1 = 0usize;
            for col in 1..=n {
                if used[col] {
                    continue;
                }
                let slack = cost[(row0 - 1, col - 1)] - u[row0] - v[col];
                if slack < min_slack[col] {
                    min_slack[col] = slack;
                    way[col] = col0;
                }
                if min_slack[col] < delta {
                    delta = min_slack[col];
                    col1 = col;
                }
            }
            if col1 == 0 {
                return Err(PhiError::Computation(format!(
                    "assignment search stalled on row {row}"
                )));
            }
            for col in 0..=n {
                if used[col] {
                    u[matched_row[col]] += delta;
                    v[col] -= delta;
                } else {
                    min_slack[col] -= delta;
                }
            }
            col0 = col1;
            if matched_row[col0] == 0 {
                break;
            }
        }
        loop {
            let col1 = way[col0];
            matched_row[col0] = matched_row[col1];
            col0 = col1;
            if col0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for col in 1..=n {
        if matched_row[col] != 0 {
            assignment[matched_row[col] - 1] = col - 1;
        }
    }
    Ok(assignment)
}

/// Total cost of an assignment produced by [`linear_sum_assignment`].
pub fn assignment_cost(cost: &DMatrix<f64>, assignment: &[usize]) -> f64 {
    assignment
        .iter()
        .enumerate()
        .map(|(row, &col)| cost[(row, col)])
        .sum()
}

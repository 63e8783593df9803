/// Scale `values` to sum to one. Returns `false` and leaves the slice
/// untouched when the total is not positive.
pub fn normalize_in_place(values: &mut [f64]) -> bool {
    let total: f64 = values.iter().sum();
    if total > 0.0 && total.is_finite() {
        values.iter_mut().for_each(|v| *v /= total);
        true
    } else {
        false
    }
}

/// Uniform distribution over `len` outcomes.
pub fn uniform(len: usize) -> Vec<f64> {
    if len == 0 {
        return Vec::new();
    }
    vec![1.0 / len as f64; len]
}

/// Normalized copy, falling back to uniform when the mass is degenerate.
pub fn normalized_or_uniform(mut values: Vec<f64>) -> Vec<f64> {
    if normalize_in_place(&mut values) {
        values
    } else {
        uniform(values.len())
    }
}

/// Clip every entry into `[floor, 1]` and renormalize.
pub fn clip_and_normalize(values: &[f64], floor: f64) -> Vec<f64> {
    let mut clipped: Vec<f64> = values.iter().map(|v| v.clamp(floor, 1.0)).collect();
    normalize_in_place(&mut clipped);
    clipped
}

/// Running sum.
pub fn cumulative(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Whether `values` is a probability vector within `tol`.
pub fn is_distribution(values: &[f64], tol: f64) -> bool {
    !values.is_empty()
        && values.iter().all(|v| *v >= -tol && *v <= 1.0 + tol)
        && (values.iter().sum::<f64>() - 1.0).abs() < tol
}

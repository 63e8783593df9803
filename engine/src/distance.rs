//! Distances between repertoires, concepts and whole cause-effect
//! structures.

use std::{fmt, str::FromStr};

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{PhiError, Result},
    models::{Concept, RepertoireResult},
    repertoire::Repertoire,
    utils::{assignment_cost, clip_and_normalize, cumulative, linear_sum_assignment},
};

/// Floor applied before taking logarithms in the KL divergence.
pub const KL_FLOOR: f64 = 1e-10;

/// Distances below this are treated as exactly zero by the MIP searches.
pub const PRECISION: f64 = 1e-10;

/// Snap rounding residue below [`PRECISION`] to zero.
pub fn snap_to_zero(value: f64) -> f64 {
    if value.abs() < PRECISION {
        0.0
    } else {
        value
    }
}

/// Repertoire distance used throughout a computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// One-dimensional earth mover's distance over the state index order.
    #[default]
    #[serde(alias = "EMD")]
    Emd,
    /// Symmetrised Kullback-Leibler divergence.
    #[serde(alias = "KL")]
    Kl,
}

impl FromStr for Measure {
    type Err = PhiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "emd" | "EMD" => Ok(Self::Emd),
            "kl" | "KL" => Ok(Self::Kl),
            other => Err(PhiError::config(format!(
                "unknown distance measure {other:?}, expected \"EMD\" or \"KL\""
            ))),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Emd => f.write_str("EMD"),
            Self::Kl => f.write_str("KL"),
        }
    }
}

fn check_lengths(p: &[f64], q: &[f64]) -> Result<()> {
    if p.len() != q.len() {
        return Err(PhiError::DimensionMismatch {
            left: p.len(),
            right: q.len(),
        });
    }
    Ok(())
}

/// Relative entropy `D(p || q)` after clipping both operands at
/// [`KL_FLOOR`] and renormalising.
pub fn kl_divergence(p: &[f64], q: &[f64]) -> Result<f64> {
    check_lengths(p, q)?;
    let p = clip_and_normalize(p, KL_FLOOR);
    let q = clip_and_normalize(q, KL_FLOOR);
    Ok(p.iter().zip(&q).map(|(a, b)| a * (a / b).ln()).sum())
}

/// Average of both directed divergences; exactly symmetric in its operands.
pub fn symmetric_kl(p: &[f64], q: &[f64]) -> Result<f64> {
    Ok((kl_divergence(p, q)? + kl_divergence(q, p)?) / 2.0)
}

/// 1-D earth mover's distance: L1 distance between the cumulative sums.
pub fn earth_movers_distance(p: &[f64], q: &[f64]) -> Result<f64> {
    check_lengths(p, q)?;
    Ok(cumulative(p)
        .iter()
        .zip(cumulative(q))
        .map(|(a, b)| (a - b).abs())
        .sum())
}

pub fn repertoire_distance(a: &Repertoire, b: &Repertoire, measure: Measure) -> Result<f64> {
    match measure {
        Measure::Emd => earth_movers_distance(a.as_slice(), b.as_slice()),
        Measure::Kl => symmetric_kl(a.as_slice(), b.as_slice()),
    }
}

fn result_distance(a: &RepertoireResult, b: &RepertoireResult, measure: Measure) -> Result<f64> {
    if a.purview() == b.purview() {
        return repertoire_distance(a.repertoire(), b.repertoire(), measure);
    }
    let union = a.purview().union(b.purview());
    let left = a.repertoire().expand(a.purview(), union)?;
    let right = b.repertoire().expand(b.purview(), union)?;
    repertoire_distance(&left, &right, measure)
}

/// Distance between two concepts.
///
/// Concepts over different mechanisms are maximally apart (the sum of their
/// phi). Otherwise the cause and effect distances are averaged and weighted
/// by the smaller phi; purviews that differ are first expanded to their
/// union.
pub fn concept_distance(c1: &Concept, c2: &Concept, measure: Measure) -> Result<f64> {
    if c1.mechanism() != c2.mechanism() {
        return Ok(c1.phi() + c2.phi());
    }
    let cause = result_distance(c1.cause(), c2.cause(), measure)?;
    let effect = result_distance(c1.effect(), c2.effect(), measure)?;
    Ok(c1.phi().min(c2.phi()) * (cause + effect) / 2.0)
}

/// Extended earth mover's distance between two concept structures.
///
/// Each concept is a point mass equal to its phi. The cost matrix is padded
/// to the larger structure; a concept left unmatched costs its own phi.
pub fn extended_earth_movers_distance(
    ces1: &[Concept],
    ces2: &[Concept],
    measure: Measure,
) -> Result<f64> {
    if ces1.is_empty() || ces2.is_empty() {
        let total = ces1.iter().chain(ces2).map(Concept::phi).sum();
        return Ok(total);
    }
    let n = ces1.len().max(ces2.len());
    let mut cost = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            cost[(i, j)] = match (ces1.get(i), ces2.get(j)) {
                (Some(a), Some(b)) => concept_distance(a, b, measure)?,
                (Some(a), None) => a.phi(),
                (None, Some(b)) => b.phi(),
                (None, None) => 0.0,
            };
        }
    }
    let assignment = linear_sum_assignment(&cost)?;
    Ok(assignment_cost(&cost, &assignment))
}

/// Distance between a system's structure and that of a partitioned system.
pub fn intrinsic_difference(
    unpartitioned: &[Concept],
    partitioned: &[Concept],
    measure: Measure,
) -> Result<f64> {
    extended_earth_movers_distance(unpartitioned, partitioned, measure)
}

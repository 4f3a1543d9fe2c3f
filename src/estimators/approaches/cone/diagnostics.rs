// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-solve diagnostics shared by every cone model.
//!
//! Entropies are in bits. Objectives and duals live in the solver's natural-log
//! units, so the duality gap converts with `ln 2`.

use ndarray::Array1;
use std::f64::consts::LN_2;

use crate::estimators::approaches::cone::index::Support;

/// Quality figures of one solved program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    /// Conditional entropy of the optimum, in bits.
    pub condentropy: f64,
    /// `-⟨y, b⟩`
    pub dual_objective: f64,
    pub primal_residual: f64,
    pub dual_residual: f64,
    pub duality_gap: f64,
}

/// `-Σ p log2 p` over the positive entries.
pub fn entropy_of<I>(weights: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    weights
        .into_iter()
        .filter(|&p| p > 0.0)
        .map(|p| -p * p.log2())
        .sum()
}

/// Conditional entropy of the target given a conditioning tuple, in bits.
///
/// Each group holds the weights of one conditioning tuple, one per target
/// symbol. Negative noise is clipped to zero; groups with no positive weight
/// contribute nothing.
pub fn condentropy_of_groups<'a, I>(groups: I) -> f64
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut h = 0.0_f64;
    for group in groups {
        let norm: f64 = group.iter().map(|&q| q.max(0.0)).sum();
        for &q in group.iter().filter(|&&q| q > 0.0) {
            h -= q * (q / norm).log2();
        }
    }
    h
}

/// Dual objective `-⟨y, b⟩` of a canonical program with `h = 0`.
pub fn dual_objective(y: &Array1<f64>, b: &Array1<f64>) -> f64 {
    -y.dot(b)
}

/// `|primal - dual|` with the primal objective recovered from the entropy of
/// the optimum (`cᵀx = -H·ln 2`), floored at zero.
pub fn duality_gap(condentropy_bits: f64, dual_objective: f64) -> f64 {
    (-condentropy_bits * LN_2 - dual_objective).abs().max(0.0)
}

/// Worst primal violation: negativity of any q, or the largest absolute
/// error of a marginal equation evaluated with clipped q.
///
/// `q[i]` is the value of the q-variable of quad `i`.
pub fn primal_residual(support: &Support, q: &[f64]) -> f64 {
    let max_negativity = q.iter().fold(0.0_f64, |acc, &v| acc.max(-v));

    let mut residual: Vec<f64> = support.marginal_rhs().collect();
    for (i, quad) in support.quads.iter() {
        let Some(rows) = support.marginal_rows(quad) else {
            continue;
        };
        let clipped = q[i].max(0.0);
        for row in rows {
            residual[row] -= clipped;
        }
    }
    let max_violation = residual.iter().fold(0.0_f64, |acc, &r| acc.max(r.abs()));

    max_negativity.max(max_violation)
}

/// Violation of the dual exponential cone membership of `(u, v, w)`.
///
/// In `(r, p, q)` order the dual cone is `{u < 0, -u·exp(w/u) <= e·v}`, so the
/// violation is `ln(-u) + w/u - 1 - ln v`. Points with `u >= 0` or `v <= 0`
/// are infinitely infeasible.
pub fn exp_dual_violation(u: f64, v: f64, w: f64) -> f64 {
    if u >= 0.0 || v <= 0.0 {
        return f64::INFINITY;
    }
    (-u).ln() + w / u - 1.0 - v.ln()
}

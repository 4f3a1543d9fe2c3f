// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::Array1;

use crate::estimators::approaches::cone::diagnostics::{
    condentropy_of_groups, exp_dual_violation, primal_residual,
};
use crate::estimators::approaches::cone::index::{SourcePair, Support, TripleIndex};
use crate::estimators::approaches::cone::program::{ConeDims, ConicProgram};
use crate::estimators::approaches::cone::solver::Solution;
use crate::estimators::approaches::cone::sparse::TripletBuilder;
use crate::estimators::traits::{ConeModel, Feasibility, Sources};

/// Maximum-entropy program for one source pair, optimising H(S | pair).
///
/// The q-variables still range over the full quad support so that all three
/// marginals can be enforced; they are aggregated twice on the way into the
/// exponential cones:
///
/// * `w_k = Σ_{excluded source} q` for triple `k = (s, t, v)`,
/// * `p_k = Σ_u w_(u,t,v)`,
/// * `r_k <= w_k ln(p_k / w_k)`.
///
/// Layout: `(r_k, p_k, w_k)` at `3k..3k+3` for every triple, then one `q_j`
/// per quad at `3T + j`.
#[derive(Debug, Clone)]
pub struct PairModel<'a> {
    support: &'a Support,
    triples: TripleIndex,
}

impl<'a> PairModel<'a> {
    pub fn new(pair: SourcePair, support: &'a Support) -> Self {
        let triples = TripleIndex::enumerate(pair, support);
        Self { support, triples }
    }

    pub fn pair(&self) -> SourcePair {
        self.triples.pair()
    }

    pub fn triples(&self) -> &TripleIndex {
        &self.triples
    }

    pub fn r_vidx(&self, k: usize) -> usize {
        3 * k
    }

    pub fn p_vidx(&self, k: usize) -> usize {
        3 * k + 1
    }

    pub fn w_vidx(&self, k: usize) -> usize {
        3 * k + 2
    }

    pub fn q_vidx(&self, j: usize) -> usize {
        3 * self.triples.len() + j
    }

    pub fn n_vars(&self) -> usize {
        3 * self.triples.len() + self.support.quads.len()
    }

    /// q–w rows, then w–p rows, then the marginal rows.
    pub fn n_equalities(&self) -> usize {
        2 * self.triples.len() + self.support.n_marginal_rows()
    }

    /// Clipped q aggregated into the triples.
    fn triple_weights(&self, q: &[f64]) -> Vec<f64> {
        let mut w = vec![0.0; self.triples.len()];
        for (j, quad) in self.support.quads.iter() {
            if let Some(k) = self.triples.project(quad) {
                w[k] += q[j].max(0.0);
            }
        }
        w
    }
}

impl ConeModel for PairModel<'_> {
    fn sources(&self) -> Sources {
        Sources::Pair(self.pair())
    }

    fn build(&self) -> ConicProgram {
        let quads = &self.support.quads;
        let n_quads = quads.len();
        let n_trip = self.triples.len();
        let n_vars = self.n_vars();
        let n_cons = self.n_equalities();

        let mut a = TripletBuilder::new(n_cons, n_vars);

        // Σ_{excluded} q - w_k = 0
        for k in 0..n_trip {
            a.push(k, self.w_vidx(k), -1.0);
        }
        for (j, quad) in quads.iter() {
            if let Some(k) = self.triples.project(quad) {
                a.push(k, self.q_vidx(j), 1.0);
            }
        }

        // Σ_u w_(u,t,v) - p_k = 0
        for (k, (_, t, v)) in self.triples.iter() {
            a.push(n_trip + k, self.p_vidx(k), -1.0);
            for &other in self.triples.sharing_sources(t, v) {
                a.push(n_trip + k, self.w_vidx(other), 1.0);
            }
        }

        let base = 2 * n_trip;
        for (j, quad) in quads.iter() {
            let Some(rows) = self.support.marginal_rows(quad) else {
                continue;
            };
            for row in rows {
                a.push(base + row, self.q_vidx(j), 1.0);
            }
        }

        let mut b: Array1<f64> = Array1::zeros(n_cons);
        for (row, w) in self.support.marginal_rhs().enumerate() {
            b[base + row] = w;
        }

        // q_j >= 0 first, then one exponential block per triple.
        let mut g = TripletBuilder::with_capacity(n_vars, n_vars, n_vars);
        for j in 0..n_quads {
            g.push(j, self.q_vidx(j), -1.0);
        }
        for k in 0..n_trip {
            let row = n_quads + 3 * k;
            g.push(row, self.r_vidx(k), -1.0);
            g.push(row + 1, self.p_vidx(k), -1.0);
            g.push(row + 2, self.w_vidx(k), -1.0);
        }
        let h: Array1<f64> = Array1::zeros(n_vars);
        let dims = ConeDims {
            l: n_quads,
            e: n_trip,
        };

        let mut c: Array1<f64> = Array1::zeros(n_vars);
        for k in 0..n_trip {
            c[self.r_vidx(k)] = -1.0;
        }

        ConicProgram::new(c, g.finish(), h, dims, a.finish(), b)
    }

    fn q_values(&self, solution: &Solution) -> Vec<f64> {
        (0..self.support.quads.len())
            .map(|j| solution.x[self.q_vidx(j)])
            .collect()
    }

    fn condentropy(&self, solution: &Solution) -> f64 {
        let w = self.triple_weights(&self.q_values(solution));
        let groups: Vec<Vec<f64>> = self
            .triples
            .source_groups()
            .map(|group| group.iter().map(|&k| w[k]).collect())
            .collect();
        condentropy_of_groups(groups.iter().map(Vec::as_slice))
    }

    fn feasibility(&self, solution: &Solution) -> Feasibility {
        let n_trip = self.triples.len();
        let q = self.q_values(solution);
        let primal = primal_residual(self.support, &q);

        // Duals: ν_k = λ[k] (q–w rows), μ_k = λ[T + k] (w–p rows),
        // marginal duals from 2T on. With z = c + Aᵀλ:
        //   q_j:  z = ν_k(j) + λ_sx + λ_sy + λ_sz >= 0
        //   k:    z_r = -1, z_p = -μ_k, z_w = -ν_k + Σ_{k' sharing tv} μ_k'
        let lambda = &solution.y;
        let base = 2 * n_trip;
        let mut dual = 0.0_f64;

        for (_, quad) in self.support.quads.iter() {
            let (Some(k), Some(rows)) = (self.triples.project(quad), self.support.marginal_rows(quad)) else {
                continue;
            };
            let z_q = lambda[k] + rows.iter().map(|&row| lambda[base + row]).sum::<f64>();
            dual = dual.max(-z_q);
        }

        for (k, (_, t, v)) in self.triples.iter() {
            let mu_tv: f64 = self
                .triples
                .sharing_sources(t, v)
                .iter()
                .map(|&other| lambda[n_trip + other])
                .sum();
            let z_w = -lambda[k] + mu_tv;
            let z_p = -lambda[n_trip + k];
            dual = dual.max(exp_dual_violation(-1.0, z_p, z_w));
        }

        Feasibility { primal, dual }
    }
}

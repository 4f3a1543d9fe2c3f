// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::Array1;

use crate::estimators::approaches::cone::diagnostics::{
    condentropy_of_groups, exp_dual_violation, primal_residual,
};
use crate::estimators::approaches::cone::index::Support;
use crate::estimators::approaches::cone::program::{ConeDims, ConicProgram};
use crate::estimators::approaches::cone::solver::Solution;
use crate::estimators::approaches::cone::sparse::TripletBuilder;
use crate::estimators::traits::{ConeModel, Feasibility, Sources};

// Exponential cone block of quad i: (r, p, q) with q > 0 and exp(r/q) <= p/q.
pub fn r_vidx(i: usize) -> usize {
    3 * i
}

pub fn p_vidx(i: usize) -> usize {
    3 * i + 1
}

pub fn q_vidx(i: usize) -> usize {
    3 * i + 2
}

/// Maximum-entropy program over the full support, optimising H(S | X, Y, Z).
///
/// For every quad `i = (s, x, y, z)`:
///
/// * `q_i` is the optimised probability,
/// * `p_i = Σ_u q_(u,x,y,z)` is its source marginal,
/// * `r_i <= q_i ln(p_i / q_i)`, so `Σ r_i` is the conditional entropy in nats.
///
/// The q's must reproduce the (S,X), (S,Y) and (S,Z) marginals.
#[derive(Debug, Clone, Copy)]
pub struct QuadModel<'a> {
    support: &'a Support,
}

impl<'a> QuadModel<'a> {
    pub fn new(support: &'a Support) -> Self {
        Self { support }
    }

    pub fn support(&self) -> &'a Support {
        self.support
    }

    pub fn n_vars(&self) -> usize {
        3 * self.support.quads.len()
    }

    /// `n` coupling rows followed by the marginal rows.
    pub fn n_equalities(&self) -> usize {
        self.support.quads.len() + self.support.n_marginal_rows()
    }
}

impl ConeModel for QuadModel<'_> {
    fn sources(&self) -> Sources {
        Sources::All
    }

    fn build(&self) -> ConicProgram {
        let quads = &self.support.quads;
        let n = quads.len();
        let n_vars = self.n_vars();
        let n_cons = self.n_equalities();

        let mut a = TripletBuilder::new(n_cons, n_vars);

        // q_{*xyz} - p_{sxyz} = 0
        for (i, (_, x, y, z)) in quads.iter() {
            a.push(i, p_vidx(i), -1.0);
            for &j in quads.sharing_sources(x, y, z) {
                a.push(i, q_vidx(j), 1.0);
            }
        }

        // q_{sx**} = b_sx, q_{s*y*} = b_sy, q_{s**z} = b_sz
        for (i, quad) in quads.iter() {
            let Some(rows) = self.support.marginal_rows(quad) else {
                continue;
            };
            for row in rows {
                a.push(n + row, q_vidx(i), 1.0);
            }
        }

        let mut b: Array1<f64> = Array1::zeros(n_cons);
        for (row, w) in self.support.marginal_rhs().enumerate() {
            b[n + row] = w;
        }

        let mut g = TripletBuilder::with_capacity(n_vars, n_vars, n_vars);
        for i in 0..n {
            g.push(3 * i, r_vidx(i), -1.0);
            g.push(3 * i + 1, p_vidx(i), -1.0);
            g.push(3 * i + 2, q_vidx(i), -1.0);
        }
        let h: Array1<f64> = Array1::zeros(n_vars);
        let dims = ConeDims { l: 0, e: n };

        let mut c: Array1<f64> = Array1::zeros(n_vars);
        for i in 0..n {
            c[r_vidx(i)] = -1.0;
        }

        ConicProgram::new(c, g.finish(), h, dims, a.finish(), b)
    }

    fn q_values(&self, solution: &Solution) -> Vec<f64> {
        (0..self.support.quads.len())
            .map(|i| solution.x[q_vidx(i)])
            .collect()
    }

    fn condentropy(&self, solution: &Solution) -> f64 {
        let q = self.q_values(solution);
        let groups: Vec<Vec<f64>> = self
            .support
            .quads
            .source_groups()
            .map(|group| group.iter().map(|&i| q[i]).collect())
            .collect();
        condentropy_of_groups(groups.iter().map(Vec::as_slice))
    }

    fn feasibility(&self, solution: &Solution) -> Feasibility {
        let quads = &self.support.quads;
        let n = quads.len();
        let q = self.q_values(solution);
        let primal = primal_residual(self.support, &q);

        // z = c + Aᵀλ on every cone block: z_r = -1, z_p = -λ_i and
        // z_q = λ_sx + λ_sy + λ_sz + Σ_{quads sharing xyz} λ_j.
        let lambda = &solution.y;
        let mut dual = 0.0_f64;
        for (i, quad) in quads.iter() {
            let (_, x, y, z) = quad;
            let Some(rows) = self.support.marginal_rows(quad) else {
                continue;
            };
            let mu_xyz: f64 = quads.sharing_sources(x, y, z).iter().map(|&j| lambda[j]).sum();
            let z_q = rows.iter().map(|&row| lambda[n + row]).sum::<f64>() + mu_xyz;
            let z_p = -lambda[i];
            dual = dual.max(exp_dual_violation(-1.0, z_p, z_q));
        }

        Feasibility { primal, dual }
    }
}

// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::Array1;

use crate::estimators::approaches::cone::sparse::SparseMatrix;

/// Cone sizes of the inequality block `h - G x ∈ K`.
///
/// The first `l` rows form the nonnegative orthant, followed by `e`
/// exponential-cone blocks of three rows each, in `(r, p, q)` order with
/// `q > 0` and `exp(r / q) <= p / q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConeDims {
    pub l: usize,
    pub e: usize,
}

impl ConeDims {
    pub fn n_rows(&self) -> usize {
        self.l + 3 * self.e
    }
}

/// Canonical cone program
///
/// ```text
/// minimise  cᵀx
/// s.t.      A x = b
///           h - G x ∈ K(dims)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConicProgram {
    c: Array1<f64>,
    g: SparseMatrix,
    h: Array1<f64>,
    dims: ConeDims,
    a: SparseMatrix,
    b: Array1<f64>,
}

impl ConicProgram {
    pub fn new(
        c: Array1<f64>,
        g: SparseMatrix,
        h: Array1<f64>,
        dims: ConeDims,
        a: SparseMatrix,
        b: Array1<f64>,
    ) -> Self {
        assert_eq!(g.n_cols(), c.len(), "G must have one column per variable");
        assert_eq!(a.n_cols(), c.len(), "A must have one column per variable");
        assert_eq!(g.n_rows(), h.len(), "h must have one entry per row of G");
        assert_eq!(g.n_rows(), dims.n_rows(), "cone dims must cover every row of G");
        assert_eq!(a.n_rows(), b.len(), "b must have one entry per row of A");
        Self { c, g, h, dims, a, b }
    }

    pub fn c(&self) -> &Array1<f64> {
        &self.c
    }

    pub fn g(&self) -> &SparseMatrix {
        &self.g
    }

    pub fn h(&self) -> &Array1<f64> {
        &self.h
    }

    pub fn dims(&self) -> ConeDims {
        self.dims
    }

    pub fn a(&self) -> &SparseMatrix {
        &self.a
    }

    pub fn b(&self) -> &Array1<f64> {
        &self.b
    }

    pub fn n_vars(&self) -> usize {
        self.c.len()
    }

    pub fn n_equalities(&self) -> usize {
        self.b.len()
    }

    pub fn n_inequalities(&self) -> usize {
        self.h.len()
    }
}

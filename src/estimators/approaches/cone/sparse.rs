// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::{Array1, Array2};

/// Accumulates `(row, col, value)` triplets for a sparse matrix of fixed shape.
///
/// The same `(row, col)` may be pushed more than once; the values are summed
/// when the builder is finalised.
#[derive(Debug, Clone)]
pub struct TripletBuilder {
    n_rows: usize,
    n_cols: usize,
    triplets: Vec<(usize, usize, f64)>,
}

impl TripletBuilder {
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            triplets: Vec::new(),
        }
    }

    pub fn with_capacity(n_rows: usize, n_cols: usize, capacity: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            triplets: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.n_rows, "row {row} out of bounds ({})", self.n_rows);
        debug_assert!(col < self.n_cols, "col {col} out of bounds ({})", self.n_cols);
        self.triplets.push((row, col, value));
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Compress into column-major storage, summing duplicate positions.
    pub fn finish(mut self) -> SparseMatrix {
        self.triplets
            .sort_unstable_by(|a, b| (a.1, a.0).cmp(&(b.1, b.0)));

        let mut col_ptr = vec![0usize; self.n_cols + 1];
        let mut row_idx: Vec<usize> = Vec::with_capacity(self.triplets.len());
        let mut values: Vec<f64> = Vec::with_capacity(self.triplets.len());
        let mut last: Option<(usize, usize)> = None;
        for &(row, col, value) in &self.triplets {
            if last == Some((row, col)) {
                if let Some(v) = values.last_mut() {
                    *v += value;
                }
                continue;
            }
            row_idx.push(row);
            values.push(value);
            col_ptr[col + 1] += 1;
            last = Some((row, col));
        }
        for c in 0..self.n_cols {
            col_ptr[c + 1] += col_ptr[c];
        }

        SparseMatrix {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            col_ptr,
            row_idx,
            values,
        }
    }
}

/// Immutable compressed-sparse-column matrix.
///
/// Row indices are strictly increasing inside each column.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    n_rows: usize,
    n_cols: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<f64>,
}

impl SparseMatrix {
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn col_ptr(&self) -> &[usize] {
        &self.col_ptr
    }

    pub fn row_idx(&self) -> &[usize] {
        &self.row_idx
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Stored entries as `(row, col, value)`, column by column.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.n_cols).flat_map(move |col| {
            (self.col_ptr[col]..self.col_ptr[col + 1])
                .map(move |k| (self.row_idx[k], col, self.values[k]))
        })
    }

    /// Value at `(row, col)`; zero when nothing is stored there.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.n_rows || col >= self.n_cols {
            return 0.0;
        }
        let range = self.col_ptr[col]..self.col_ptr[col + 1];
        match self.row_idx[range.clone()].binary_search(&row) {
            Ok(pos) => self.values[range.start + pos],
            Err(_) => 0.0,
        }
    }

    /// Number of stored entries in each row.
    pub fn row_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_rows];
        for &r in &self.row_idx {
            counts[r] += 1;
        }
        counts
    }

    /// `M · v`
    pub fn dot(&self, v: &Array1<f64>) -> Array1<f64> {
        assert_eq!(v.len(), self.n_cols, "vector length must equal column count");
        let mut out = Array1::zeros(self.n_rows);
        for (row, col, value) in self.iter() {
            out[row] += value * v[col];
        }
        out
    }

    /// `Mᵀ · v`
    pub fn t_dot(&self, v: &Array1<f64>) -> Array1<f64> {
        assert_eq!(v.len(), self.n_rows, "vector length must equal row count");
        let mut out = Array1::zeros(self.n_cols);
        for (row, col, value) in self.iter() {
            out[col] += value * v[row];
        }
        out
    }

    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.n_rows, self.n_cols));
        for (row, col, value) in self.iter() {
            dense[(row, col)] = value;
        }
        dense
    }
}

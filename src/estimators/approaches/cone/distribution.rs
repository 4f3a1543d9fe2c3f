// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{BTreeMap, HashMap};

use crate::error::PidError;
use crate::estimators::approaches::cone::diagnostics::{condentropy_of_groups, entropy_of};

/// A `(s, x, y, z)` support tuple: target first, then the three sources.
pub type Quad = (i32, i32, i32, i32);

/// A `(target, source)` key of a pairwise marginal.
pub type PairKey = (i32, i32);

/// Weights at or below this value are dropped before any logarithm is taken.
pub const WEIGHT_EPSILON: f64 = 1e-300;

/// Joint probability table over a target S and three sources X, Y, Z.
///
/// Symbols are `i32`; callers with other alphabets encode them as integers
/// first.
///
/// Entries are kept in a sorted map so that every derived structure
/// (alphabets, indices, equality rows) is enumerated in the same order on
/// every run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JointDistribution {
    weights: BTreeMap<Quad, f64>,
}

impl JointDistribution {
    /// Build a distribution from loosely typed rows `(key, weight)`.
    ///
    /// Keys must have exactly four symbols and weights must be finite and
    /// non-negative. Repeated keys are summed.
    pub fn from_rows<I, K>(rows: I) -> Result<Self, PidError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<[i32]>,
    {
        let mut weights = BTreeMap::new();
        for (key, value) in rows {
            let key = key.as_ref();
            let &[s, x, y, z] = key else {
                return Err(PidError::InvalidKey { len: key.len() });
            };
            if !value.is_finite() || value < 0.0 {
                return Err(PidError::InvalidWeight {
                    key: [s, x, y, z],
                    value,
                });
            }
            *weights.entry((s, x, y, z)).or_insert(0.0) += value;
        }
        Ok(Self { weights })
    }

    /// Build a distribution from typed `(s, x, y, z)` keys.
    pub fn new<I>(entries: I) -> Result<Self, PidError>
    where
        I: IntoIterator<Item = (Quad, f64)>,
    {
        Self::from_rows(
            entries
                .into_iter()
                .map(|((s, x, y, z), w)| ([s, x, y, z], w)),
        )
    }

    /// Copy of the distribution without entries of weight `<= WEIGHT_EPSILON`.
    pub fn filtered(&self) -> Self {
        let weights = self
            .weights
            .iter()
            .filter(|&(_, &w)| w > WEIGHT_EPSILON)
            .map(|(&k, &w)| (k, w))
            .collect();
        Self { weights }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn get(&self, quad: &Quad) -> Option<f64> {
        self.weights.get(quad).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Quad, &f64)> {
        self.weights.iter()
    }

    pub fn total_mass(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Marginal over (S, X).
    pub fn marginal_sx(&self) -> Marginal {
        self.marginal(|&(s, x, _, _)| (s, x))
    }

    /// Marginal over (S, Y).
    pub fn marginal_sy(&self) -> Marginal {
        self.marginal(|&(s, _, y, _)| (s, y))
    }

    /// Marginal over (S, Z).
    pub fn marginal_sz(&self) -> Marginal {
        self.marginal(|&(s, _, _, z)| (s, z))
    }

    fn marginal<F>(&self, project: F) -> Marginal
    where
        F: Fn(&Quad) -> PairKey,
    {
        let mut entries = BTreeMap::new();
        for (quad, &w) in self.weights.iter() {
            *entries.entry(project(quad)).or_insert(0.0) += w;
        }
        Marginal::from_entries(entries)
    }

    /// Entropy H(S) of the target in bits.
    pub fn target_entropy(&self) -> f64 {
        let mut marg_s: BTreeMap<i32, f64> = BTreeMap::new();
        for (&(s, _, _, _), &w) in self.weights.iter() {
            *marg_s.entry(s).or_insert(0.0) += w;
        }
        entropy_of(marg_s.values().copied())
    }

    /// Conditional entropy H(S | X, Y, Z) of the table itself, in bits.
    pub fn condentropy(&self) -> f64 {
        let mut groups: BTreeMap<(i32, i32, i32), Vec<f64>> = BTreeMap::new();
        for (&(_, x, y, z), &w) in self.weights.iter() {
            groups.entry((x, y, z)).or_default().push(w);
        }
        condentropy_of_groups(groups.values().map(Vec::as_slice))
    }
}

/// Pairwise marginal `(target, source) -> weight`.
///
/// Each key carries a dense rank in key order, which is the offset of its
/// equality row inside the block of this marginal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Marginal {
    entries: BTreeMap<PairKey, f64>,
    ranks: HashMap<PairKey, usize>,
}

impl Marginal {
    pub fn from_entries(entries: BTreeMap<PairKey, f64>) -> Self {
        let ranks = entries
            .keys()
            .enumerate()
            .map(|(rank, &key)| (key, rank))
            .collect();
        Self { entries, ranks }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &PairKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &PairKey) -> Option<f64> {
        self.entries.get(key).copied()
    }

    pub fn rank(&self, key: &PairKey) -> Option<usize> {
        self.ranks.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &f64)> {
        self.entries.iter()
    }

    pub fn total_mass(&self) -> f64 {
        self.entries.values().sum()
    }

    pub fn targets(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.keys().map(|&(s, _)| s)
    }

    pub fn sources(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.keys().map(|&(_, a)| a)
    }
}

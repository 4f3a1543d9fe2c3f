// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::estimators::approaches::cone::distribution::{JointDistribution, Marginal, PairKey, Quad};

/// A `(s, t, v)` tuple: target plus the two symbols of a source pair.
pub type Triple = (i32, i32, i32);

/// Sorted symbol sets of the target and the three sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabets {
    pub s: Vec<i32>,
    pub x: Vec<i32>,
    pub y: Vec<i32>,
    pub z: Vec<i32>,
}

impl Alphabets {
    /// Collect alphabets from the keys of the three marginals.
    ///
    /// The target alphabet is the union over all three marginals.
    pub fn from_marginals(sx: &Marginal, sy: &Marginal, sz: &Marginal) -> Self {
        let s: BTreeSet<i32> = sx.targets().chain(sy.targets()).chain(sz.targets()).collect();
        let x: BTreeSet<i32> = sx.sources().collect();
        let y: BTreeSet<i32> = sy.sources().collect();
        let z: BTreeSet<i32> = sz.sources().collect();
        Self {
            s: s.into_iter().collect(),
            x: x.into_iter().collect(),
            y: y.into_iter().collect(),
            z: z.into_iter().collect(),
        }
    }
}

/// Bijection between valid quadruples and `0..n`.
///
/// `(s, x, y, z)` is valid iff `(s, x)`, `(s, y)` and `(s, z)` are keys of
/// their marginals. Indices follow `s`, `x`, `y`, `z` ascending, which is the
/// variable layout of every program built on top of this index.
#[derive(Debug, Clone)]
pub struct QuadIndex {
    tuples: Vec<Quad>,
    positions: HashMap<Quad, usize>,
    by_sources: BTreeMap<(i32, i32, i32), Vec<usize>>,
}

impl QuadIndex {
    pub fn enumerate(alphabets: &Alphabets, sx: &Marginal, sy: &Marginal, sz: &Marginal) -> Self {
        let mut tuples = Vec::new();
        for &s in &alphabets.s {
            for &x in alphabets.x.iter().filter(|&&x| sx.contains(&(s, x))) {
                for &y in alphabets.y.iter().filter(|&&y| sy.contains(&(s, y))) {
                    for &z in alphabets.z.iter().filter(|&&z| sz.contains(&(s, z))) {
                        tuples.push((s, x, y, z));
                    }
                }
            }
        }

        let positions = tuples.iter().enumerate().map(|(i, &q)| (q, i)).collect();
        let mut by_sources: BTreeMap<(i32, i32, i32), Vec<usize>> = BTreeMap::new();
        for (i, &(_, x, y, z)) in tuples.iter().enumerate() {
            by_sources.entry((x, y, z)).or_default().push(i);
        }
        Self {
            tuples,
            positions,
            by_sources,
        }
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn index_of(&self, quad: &Quad) -> Option<usize> {
        self.positions.get(quad).copied()
    }

    pub fn quad_of(&self, i: usize) -> Option<Quad> {
        self.tuples.get(i).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Quad)> + '_ {
        self.tuples.iter().copied().enumerate()
    }

    /// Indices of all quads with source part `(x, y, z)`, one per target symbol.
    pub fn sharing_sources(&self, x: i32, y: i32, z: i32) -> &[usize] {
        self.by_sources
            .get(&(x, y, z))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Groups of quad indices with equal `(x, y, z)`, in ascending source order.
    pub fn source_groups(&self) -> impl Iterator<Item = &[usize]> {
        self.by_sources.values().map(Vec::as_slice)
    }
}

/// Which two sources a pair-restricted program conditions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourcePair {
    XY,
    XZ,
    YZ,
}

impl SourcePair {
    pub const ALL: [SourcePair; 3] = [SourcePair::XY, SourcePair::XZ, SourcePair::YZ];

    /// Drop the excluded source from a quad.
    pub fn project(self, (s, x, y, z): Quad) -> Triple {
        match self {
            SourcePair::XY => (s, x, y),
            SourcePair::XZ => (s, x, z),
            SourcePair::YZ => (s, y, z),
        }
    }

    /// The two marginals pertinent to this pair, in pair order.
    pub fn marginals(self, support: &Support) -> (&Marginal, &Marginal) {
        match self {
            SourcePair::XY => (&support.sx, &support.sy),
            SourcePair::XZ => (&support.sx, &support.sz),
            SourcePair::YZ => (&support.sy, &support.sz),
        }
    }

    fn alphabets(self, alphabets: &Alphabets) -> (&[i32], &[i32]) {
        match self {
            SourcePair::XY => (alphabets.x.as_slice(), alphabets.y.as_slice()),
            SourcePair::XZ => (alphabets.x.as_slice(), alphabets.z.as_slice()),
            SourcePair::YZ => (alphabets.y.as_slice(), alphabets.z.as_slice()),
        }
    }
}

/// Bijection between valid `(s, t, v)` triples of a source pair and `0..T`.
///
/// Validity only involves the two marginals of the pair; the excluded source
/// plays no part.
#[derive(Debug, Clone)]
pub struct TripleIndex {
    pair: SourcePair,
    tuples: Vec<Triple>,
    positions: HashMap<Triple, usize>,
    by_sources: BTreeMap<(i32, i32), Vec<usize>>,
}

impl TripleIndex {
    pub fn enumerate(pair: SourcePair, support: &Support) -> Self {
        let (first, second) = pair.marginals(support);
        let (t_alphabet, v_alphabet) = pair.alphabets(&support.alphabets);
        let mut tuples = Vec::new();
        for &s in &support.alphabets.s {
            for &t in t_alphabet.iter().filter(|&&t| first.contains(&(s, t))) {
                for &v in v_alphabet.iter().filter(|&&v| second.contains(&(s, v))) {
                    tuples.push((s, t, v));
                }
            }
        }

        let positions = tuples.iter().enumerate().map(|(i, &t)| (t, i)).collect();
        let mut by_sources: BTreeMap<(i32, i32), Vec<usize>> = BTreeMap::new();
        for (i, &(_, t, v)) in tuples.iter().enumerate() {
            by_sources.entry((t, v)).or_default().push(i);
        }
        Self {
            pair,
            tuples,
            positions,
            by_sources,
        }
    }

    pub fn pair(&self) -> SourcePair {
        self.pair
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn index_of(&self, triple: &Triple) -> Option<usize> {
        self.positions.get(triple).copied()
    }

    pub fn triple_of(&self, k: usize) -> Option<Triple> {
        self.tuples.get(k).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Triple)> + '_ {
        self.tuples.iter().copied().enumerate()
    }

    /// Index of the triple a quad aggregates into.
    pub fn project(&self, quad: Quad) -> Option<usize> {
        self.index_of(&self.pair.project(quad))
    }

    /// Indices of all triples with pair part `(t, v)`.
    pub fn sharing_sources(&self, t: i32, v: i32) -> &[usize] {
        self.by_sources
            .get(&(t, v))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn source_groups(&self) -> impl Iterator<Item = &[usize]> {
        self.by_sources.values().map(Vec::as_slice)
    }
}

/// Immutable index data shared by every model of one estimation: the three
/// marginals, the alphabets and the quad index.
#[derive(Debug, Clone)]
pub struct Support {
    pub sx: Marginal,
    pub sy: Marginal,
    pub sz: Marginal,
    pub alphabets: Alphabets,
    pub quads: QuadIndex,
}

impl Support {
    pub fn new(pdf: &JointDistribution) -> Self {
        Self::from_marginals(pdf.marginal_sx(), pdf.marginal_sy(), pdf.marginal_sz())
    }

    pub fn from_marginals(sx: Marginal, sy: Marginal, sz: Marginal) -> Self {
        let alphabets = Alphabets::from_marginals(&sx, &sy, &sz);
        let quads = QuadIndex::enumerate(&alphabets, &sx, &sy, &sz);
        Self {
            sx,
            sy,
            sz,
            alphabets,
            quads,
        }
    }

    /// Number of marginal equality rows, `|SX| + |SY| + |SZ|`.
    pub fn n_marginal_rows(&self) -> usize {
        self.sx.len() + self.sy.len() + self.sz.len()
    }

    /// Offsets (relative to the first marginal row) of the three marginal
    /// rows a quad contributes to, or `None` for a quad outside the support.
    pub fn marginal_rows(&self, (s, x, y, z): Quad) -> Option<[usize; 3]> {
        let sx = self.sx.rank(&(s, x))?;
        let sy = self.sy.rank(&(s, y))?;
        let sz = self.sz.rank(&(s, z))?;
        Some([sx, self.sx.len() + sy, self.sx.len() + self.sy.len() + sz])
    }

    /// Right-hand sides of the marginal rows, in row order.
    pub fn marginal_rhs(&self) -> impl Iterator<Item = f64> + '_ {
        self.marginal_entries().map(|(_, w)| w)
    }

    /// `(key, weight)` of every marginal row in row order.
    pub fn marginal_entries(&self) -> impl Iterator<Item = (PairKey, f64)> + '_ {
        self.sx
            .iter()
            .chain(self.sy.iter())
            .chain(self.sz.iter())
            .map(|(&k, &w)| (k, w))
    }
}

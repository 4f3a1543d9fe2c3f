// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use approx::assert_abs_diff_eq;
use ndarray::Array1;
use pidcone::estimators::approaches::cone::quad::{p_vidx, q_vidx, r_vidx};
use pidcone::estimators::approaches::cone::{
    model_for, JointDistribution, PairModel, QuadModel, SourcePair, Support,
};
use pidcone::estimators::traits::{ConeModel, Sources};
use rstest::rstest;

use crate::test_helpers::{and_gate, random_distribution};

/// The input itself, written in the quad program's variables.
fn quad_point(pdf: &JointDistribution, support: &Support) -> Array1<f64> {
    let model = QuadModel::new(support);
    let quads = &support.quads;
    let mut x = Array1::zeros(model.n_vars());
    for (i, quad) in quads.iter() {
        x[q_vidx(i)] = pdf.get(&quad).unwrap_or(0.0);
    }
    for (i, (_, qx, qy, qz)) in quads.iter() {
        let p: f64 = quads.sharing_sources(qx, qy, qz).iter().map(|&j| x[q_vidx(j)]).sum();
        x[p_vidx(i)] = p;
        let q = x[q_vidx(i)];
        x[r_vidx(i)] = if q > 0.0 { q * (p / q).ln() } else { 0.0 };
    }
    x
}

/// The input itself, written in a pair program's variables.
fn pair_point(pdf: &JointDistribution, support: &Support, model: &PairModel) -> Array1<f64> {
    let triples = model.triples();
    let mut x = Array1::zeros(model.n_vars());
    let mut w = vec![0.0; triples.len()];
    for (j, quad) in support.quads.iter() {
        let q = pdf.get(&quad).unwrap_or(0.0);
        x[model.q_vidx(j)] = q;
        if let Some(k) = triples.project(quad) {
            w[k] += q;
        }
    }
    for (k, (_, t, v)) in triples.iter() {
        let p: f64 = triples.sharing_sources(t, v).iter().map(|&o| w[o]).sum();
        x[model.w_vidx(k)] = w[k];
        x[model.p_vidx(k)] = p;
        x[model.r_vidx(k)] = if w[k] > 0.0 { w[k] * (p / w[k]).ln() } else { 0.0 };
    }
    x
}

#[test]
fn quad_program_shape() {
    let support = Support::new(&and_gate());
    let model = QuadModel::new(&support);
    let program = model.build();

    assert_eq!(program.n_vars(), 30);
    assert_eq!(program.n_equalities(), 10 + 10);
    assert_eq!(program.dims().l, 0);
    assert_eq!(program.dims().e, 10);
    assert_eq!(program.n_inequalities(), 30);
    assert_abs_diff_eq!(program.c().sum(), -10.0, epsilon = 1e-15);
    assert!(program.h().iter().all(|&v| v == 0.0));
    assert_eq!(program.g().nnz(), 30);
    assert_abs_diff_eq!(program.b().sum(), 3.0, epsilon = 1e-12);
}

#[test]
fn quad_program_accepts_the_input() {
    let pdf = and_gate();
    let support = Support::new(&pdf);
    let program = QuadModel::new(&support).build();
    let x = quad_point(&pdf, &support);

    let residual = program.a().dot(&x) - program.b();
    for r in residual.iter() {
        assert_abs_diff_eq!(*r, 0.0, epsilon = 1e-12);
    }
    // h - G x = x on every cone block
    let slack = program.h() - &program.g().dot(&x);
    assert_eq!(slack, x);
    // objective at the input is -H(S|XYZ) in nats
    assert_abs_diff_eq!(
        program.c().dot(&x),
        -pdf.condentropy() * std::f64::consts::LN_2,
        epsilon = 1e-12
    );
}

#[rstest]
#[case(SourcePair::XY, 5)]
#[case(SourcePair::XZ, 6)]
#[case(SourcePair::YZ, 6)]
fn pair_program_shape(#[case] pair: SourcePair, #[case] n_triples: usize) {
    let support = Support::new(&and_gate());
    let model = PairModel::new(pair, &support);
    let program = model.build();

    assert_eq!(model.triples().len(), n_triples);
    assert_eq!(program.n_vars(), 3 * n_triples + 10);
    assert_eq!(program.n_equalities(), 2 * n_triples + 10);
    assert_eq!(program.dims().l, 10);
    assert_eq!(program.dims().e, n_triples);
    assert_abs_diff_eq!(program.c().sum(), -(n_triples as f64), epsilon = 1e-15);
}

#[rstest]
#[case(SourcePair::XY)]
#[case(SourcePair::XZ)]
#[case(SourcePair::YZ)]
fn pair_program_accepts_the_input(#[case] pair: SourcePair) {
    let pdf = random_distribution(2, 7);
    let support = Support::new(&pdf);
    let model = PairModel::new(pair, &support);
    let program = model.build();
    let x = pair_point(&pdf, &support, &model);

    let residual = program.a().dot(&x) - program.b();
    for r in residual.iter() {
        assert_abs_diff_eq!(*r, 0.0, epsilon = 1e-12);
    }
    let slack = program.h() - &program.g().dot(&x);
    let n_quads = support.quads.len();
    for j in 0..n_quads {
        assert!(slack[j] >= 0.0);
        assert_eq!(slack[j], x[model.q_vidx(j)]);
    }
}

#[test]
fn build_is_deterministic() {
    let pdf = random_distribution(3, 11);
    let mut reversed: Vec<_> = pdf.iter().map(|(&k, &w)| (k, w)).collect();
    reversed.reverse();
    let shuffled = JointDistribution::new(reversed).unwrap();

    let a = Support::new(&pdf);
    let b = Support::new(&shuffled);
    assert_eq!(QuadModel::new(&a).build(), QuadModel::new(&b).build());
    assert_eq!(
        PairModel::new(SourcePair::XZ, &a).build(),
        PairModel::new(SourcePair::XZ, &b).build()
    );
}

#[test]
fn factory_picks_model_by_sources() {
    let support = Support::new(&and_gate());
    assert_eq!(model_for(Sources::All, &support).sources(), Sources::All);
    for pair in SourcePair::ALL {
        let model = model_for(Sources::Pair(pair), &support);
        assert_eq!(model.sources(), Sources::Pair(pair));
        assert_eq!(model.build().dims().l, support.quads.len());
    }
}

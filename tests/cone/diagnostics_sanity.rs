// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use approx::assert_abs_diff_eq;
use ndarray::array;
use pidcone::estimators::approaches::cone::diagnostics::{
    condentropy_of_groups, dual_objective, duality_gap, entropy_of, exp_dual_violation,
    primal_residual,
};
use pidcone::estimators::approaches::cone::Support;
use std::f64::consts::LN_2;

use crate::test_helpers::and_gate;

#[test]
fn entropy_skips_zeros() {
    assert_abs_diff_eq!(entropy_of([0.5, 0.5, 0.0]), 1.0, epsilon = 1e-15);
    assert_abs_diff_eq!(entropy_of([1.0]), 0.0, epsilon = 1e-15);
}

#[test]
fn condentropy_of_groups_in_bits() {
    let groups: [&[f64]; 3] = [&[0.25, 0.25], &[0.5], &[0.0, 0.0]];
    assert_abs_diff_eq!(condentropy_of_groups(groups), 0.5, epsilon = 1e-15);
}

#[test]
fn condentropy_clips_negative_noise() {
    let groups: [&[f64]; 1] = [&[0.5, -1e-12]];
    assert_abs_diff_eq!(condentropy_of_groups(groups), 0.0, epsilon = 1e-15);
}

#[test]
fn dual_cone_violation() {
    // boundary point: -u exp(w/u) = e v
    assert_abs_diff_eq!(exp_dual_violation(-1.0, 1.0, -1.0), 0.0, epsilon = 1e-15);
    // interior
    assert!(exp_dual_violation(-1.0, 1.0, 0.0) < 0.0);
    // outside
    assert!(exp_dual_violation(-1.0, 1.0, -2.0) > 0.0);
    assert_eq!(exp_dual_violation(0.0, 1.0, 0.0), f64::INFINITY);
    assert_eq!(exp_dual_violation(-1.0, 0.0, 0.0), f64::INFINITY);
}

#[test]
fn gap_converts_bits_to_nats() {
    let y = array![1.0, 2.0];
    let b = array![0.5, 0.25];
    assert_abs_diff_eq!(dual_objective(&y, &b), -1.0, epsilon = 1e-15);
    assert_abs_diff_eq!(duality_gap(1.0 / LN_2, -1.0), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(duality_gap(0.0, -1.0), 1.0, epsilon = 1e-15);
}

#[test]
fn primal_residual_of_the_input_is_zero() {
    let pdf = and_gate();
    let support = Support::new(&pdf);
    let q: Vec<f64> = support
        .quads
        .iter()
        .map(|(_, quad)| pdf.get(&quad).unwrap_or(0.0))
        .collect();
    assert_abs_diff_eq!(primal_residual(&support, &q), 0.0, epsilon = 1e-15);

    let mut shifted = q.clone();
    shifted[0] = -0.0625;
    // negativity 0.0625, but clipping loses all 0.125 of the quad's marginal mass
    assert_abs_diff_eq!(primal_residual(&support, &shifted), 0.125, epsilon = 1e-15);
}

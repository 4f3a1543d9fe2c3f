// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use approx::assert_abs_diff_eq;
use pidcone::estimators::approaches::cone::{JointDistribution, SolverConfig, SourcePair};
use pidcone::estimators::traits::Sources;
use pidcone::{pid, pid_distribution, Decomposition, PidConfig, PidOutcome, PidReport};
use rstest::rstest;

use crate::test_helpers::{and3_gate, and_gate, copy_x, independent_target, xor_gate};

fn full_config() -> PidConfig {
    PidConfig::default().with_decomposition(Decomposition::Full)
}

fn decompose(pdf: &JointDistribution, config: &PidConfig) -> PidReport {
    match pid_distribution(pdf, config).unwrap() {
        PidOutcome::Decomposed(report) => report,
        PidOutcome::Unsolved(object) => panic!("solver failed: {}", object.status),
    }
}

// H(0.75, 0.25) - 1/2
const AND_SHARED: f64 = 0.311_278_124_459_132_8;

#[rstest]
#[case::and(and_gate(), 0.5, [0.0, 0.0, 0.0], AND_SHARED)]
#[case::xor(xor_gate(), 1.0, [0.0, 0.0, 0.0], 0.0)]
#[case::copy(copy_x(), 0.0, [1.0, 0.0, 0.0], 0.0)]
#[case::independent(independent_target(), 0.0, [0.0, 0.0, 0.0], 0.0)]
fn full_decomposition_of_gates(
    #[case] pdf: JointDistribution,
    #[case] synergy: f64,
    #[case] unique: [f64; 3],
    #[case] shared: f64,
) {
    let report = decompose(&pdf, &full_config());

    assert_abs_diff_eq!(report.synergy, synergy, epsilon = 1e-4);
    let ui = report.unique.expect("full decomposition has unique information");
    assert_abs_diff_eq!(ui.x, unique[0], epsilon = 1e-4);
    assert_abs_diff_eq!(ui.y, unique[1], epsilon = 1e-4);
    assert_abs_diff_eq!(ui.z, unique[2], epsilon = 1e-4);
    assert_abs_diff_eq!(report.shared.unwrap(), shared, epsilon = 1e-4);

    assert!(report.num_err.primal < 1e-6);
    assert!(report.num_err.dual < 1e-6);
    assert!(report.num_err.gap < 1e-6);
}

#[rstest]
#[case::synergy(Decomposition::Synergy)]
#[case::full(Decomposition::Full)]
fn three_input_and_gate(#[case] decomposition: Decomposition) {
    let config = PidConfig::default().with_decomposition(decomposition);
    let report = decompose(&and3_gate(), &config);

    assert!(report.synergy >= 0.0, "synergy {}", report.synergy);
    assert_abs_diff_eq!(report.synergy, 0.405_639, epsilon = 1e-4);

    let (primal, dual, gap) = report.num_err.as_tuple();
    assert!(primal <= 1e-6, "primal residual {primal}");
    assert!(dual <= 1e-6, "dual residual {dual}");
    assert!(gap <= 1e-6, "duality gap {gap}");
}

#[rstest]
#[case::and(and_gate())]
#[case::xor(xor_gate())]
#[case::copy(copy_x())]
fn atoms_add_up_to_mutual_information(#[case] pdf: JointDistribution) {
    let report = decompose(&pdf, &full_config());
    let ui = report.unique.unwrap();
    let total = report.synergy + ui.x + ui.y + ui.z + report.shared.unwrap();
    let mi = report.entropies.target - report.entropies.given_sources;
    assert_abs_diff_eq!(total, mi, epsilon = 1e-12);
}

#[test]
fn synergy_only_skips_pair_programs() {
    let pdf = and_gate();
    let report = decompose(&pdf, &PidConfig::default());
    assert!(report.unique.is_none());
    assert!(report.shared.is_none());
    assert!(report.entropies.max_given_pairs.is_none());
    assert!(report.solver_objects.is_empty());

    let full = decompose(&pdf, &full_config());
    assert_abs_diff_eq!(report.synergy, full.synergy, epsilon = 1e-9);
}

#[test]
fn report_carries_provenance_and_entropies() {
    let pdf = and_gate();
    let report = decompose(&pdf, &full_config());
    assert_eq!(report.solver, "Clarabel https://clarabel.org");
    assert_abs_diff_eq!(report.entropies.target, AND_SHARED + 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(report.entropies.given_sources, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(report.entropies.max_given_sources, 0.5, epsilon = 1e-4);
    let [h_xy, h_xz, h_yz] = report.entropies.max_given_pairs.unwrap();
    for h in [h_xy, h_xz, h_yz] {
        assert_abs_diff_eq!(h, 0.5, epsilon = 1e-4);
    }
}

#[test]
fn solver_objects_are_kept_on_request() {
    let solver = SolverConfig::default().with_keep_solver_object(true);
    let report = decompose(&xor_gate(), &full_config().with_solver(solver));

    let sources: Vec<Sources> = report.solver_objects.iter().map(|o| o.sources).collect();
    assert_eq!(
        sources,
        vec![
            Sources::All,
            Sources::Pair(SourcePair::XY),
            Sources::Pair(SourcePair::XZ),
            Sources::Pair(SourcePair::YZ),
        ]
    );
    for object in &report.solver_objects {
        assert!(object.status == "Solved" || object.status == "AlmostSolved");
        let solution = object.solution.as_ref().unwrap();
        assert_eq!(solution.x.len(), object.program.n_vars());
        assert_eq!(solution.y.len(), object.program.n_equalities());
    }
}

#[test]
fn loose_rows_match_typed_distribution() {
    let rows: Vec<(Vec<i32>, f64)> = and_gate()
        .iter()
        .map(|(&(s, x, y, z), &w)| (vec![s, x, y, z], w))
        .collect();
    let outcome = pid(rows, &full_config()).unwrap();
    let typed = decompose(&and_gate(), &full_config());
    assert_eq!(outcome.report(), Some(&typed));
}

#[test]
fn verbose_run_gives_the_same_numbers() {
    let quiet = decompose(&xor_gate(), &PidConfig::default());
    let loud = decompose(&xor_gate(), &PidConfig::default().with_verbosity(1));
    assert_eq!(quiet.synergy, loud.synergy);
}

#[test]
fn zero_weight_rows_do_not_change_the_result() {
    let padded: Vec<_> = and_gate()
        .iter()
        .map(|(&k, &w)| (k, w))
        .chain([((1, 0, 0, 0), 0.0), ((7, 7, 7, 7), 0.0)])
        .collect();
    let padded = JointDistribution::new(padded).unwrap();
    let a = decompose(&and_gate(), &full_config());
    let b = decompose(&padded, &full_config());
    assert_eq!(a, b);
}

//! Property-based tests for the lazy-refinement solvers.
//!
//! Uses proptest to verify:
//! - Threshold feasibility is monotone in the edge-weight threshold
//! - Every bottleneck strategy agrees with a linear scan
//! - Cuts exclude the assignment that triggered them and keep real tours
//! - The model only ever grows across refinement steps
//! - The LP relaxation bounds the integral optimum from below

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use u_lazycut::bottleneck::{BottleneckConfig, BottleneckSolver, SearchStrategy};
use u_lazycut::graph::Graph;
use u_lazycut::hamiltonian::{HamiltonianConfig, HamiltonianResult, HamiltonianSolver};
use u_lazycut::oracle::{Engine, Oracle};
use u_lazycut::refine::{EdgeRegistry, EdgeVarKind};
use u_lazycut::tsp::{TspConfig, TspRelaxation, TspStatus};

// ============================================================================
// Generators
// ============================================================================

/// Complete graph with few distinct weights, so thresholds actually prune.
fn complete_graph_strategy() -> impl Strategy<Value = Graph> {
    (4usize..=7, any::<u64>()).prop_map(|(n, seed)| {
        let mut rng = StdRng::seed_from_u64(seed);
        Graph::random_complete(n, 1, 6, &mut rng).unwrap()
    })
}

fn hamiltonian(graph: &Graph) -> HamiltonianResult {
    HamiltonianSolver::solve(graph, &HamiltonianConfig::default()).unwrap()
}

/// Smallest threshold whose subgraph is Hamiltonian, by trying them all.
fn linear_scan(graph: &Graph) -> Option<f64> {
    graph
        .distinct_weights()
        .into_iter()
        .find(|&w| hamiltonian(&graph.with_max_weight(w)).outcome.tour().is_some())
}

// ============================================================================
// Bottleneck search
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn threshold_feasibility_is_monotone(g in complete_graph_strategy()) {
        let feasible: Vec<bool> = g
            .distinct_weights()
            .into_iter()
            .map(|w| hamiltonian(&g.with_max_weight(w)).outcome.tour().is_some())
            .collect();
        // complete graphs on 4+ nodes are Hamiltonian at the top threshold
        prop_assert_eq!(feasible.last(), Some(&true));
        let first = feasible.iter().position(|&f| f).unwrap();
        prop_assert!(feasible[first..].iter().all(|&f| f));
    }

    #[test]
    fn thresholded_edge_sets_nest(g in complete_graph_strategy()) {
        let weights = g.distinct_weights();
        for pair in weights.windows(2) {
            let lower = g.with_max_weight(pair[0]);
            let upper = g.with_max_weight(pair[1]);
            prop_assert!(lower.num_edges() < upper.num_edges());
            for e in lower.edges() {
                prop_assert!(upper.edge_between(e.u, e.v).is_some());
            }
        }
    }

    #[test]
    fn strategies_match_linear_scan(g in complete_graph_strategy()) {
        let expected = linear_scan(&g);
        prop_assert!(expected.is_some());
        for strategy in [
            SearchStrategy::BinarySearch,
            SearchStrategy::SequentialUp,
            SearchStrategy::SequentialDown,
        ] {
            let config = BottleneckConfig::default().with_strategy(strategy);
            let result = BottleneckSolver::optimize(&g, &config).unwrap();
            prop_assert_eq!(result.bottleneck, expected);
            let tour = result.tour.unwrap();
            prop_assert!(tour.is_hamiltonian_in(&g));
            prop_assert_eq!(tour.bottleneck(&g).unwrap(), expected.unwrap());
        }
    }
}

// ============================================================================
// Refinement invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn cuts_are_sound_and_exclude_their_trigger(g in complete_graph_strategy()) {
        let result = hamiltonian(&g);
        let tour = result.outcome.tour().unwrap().clone();

        // a fresh registry numbers the edge variables exactly as the solver did
        let mut oracle = Oracle::new(Engine::Sat);
        let registry = EdgeRegistry::new(&g, &mut oracle, EdgeVarKind::Boolean).unwrap();

        for step in &result.history {
            let tour_assignment = registry
                .tour_assignment(&tour, step.assignment.len())
                .unwrap();
            for cut in &step.cuts {
                prop_assert!(!cut.is_satisfied_by(&registry, &step.assignment));
                prop_assert!(cut.is_satisfied_by(&registry, &tour_assignment));
            }
        }
    }

    #[test]
    fn constraint_count_never_shrinks(g in complete_graph_strategy()) {
        let result = hamiltonian(&g);
        for step in &result.history {
            prop_assert_eq!(step.constraints_after, step.constraints_before + step.cuts.len());
        }
        for pair in result.history.windows(2) {
            prop_assert_eq!(pair[0].constraints_after, pair[1].constraints_before);
            prop_assert!(pair[0].iteration < pair[1].iteration);
        }
        prop_assert_eq!(result.iterations, result.history.len() + 1);
    }

    #[test]
    fn relaxation_bounds_optimal_tour(g in complete_graph_strategy()) {
        let mut lp = TspRelaxation::new(&g, &TspConfig::default()).unwrap();
        prop_assert_eq!(lp.solve().unwrap(), TspStatus::Optimal);
        let bound = lp.lower_bound().unwrap();

        let mut mip = TspRelaxation::new(&g, &TspConfig::default().with_engine(Engine::Mip)).unwrap();
        prop_assert_eq!(mip.solve().unwrap(), TspStatus::Optimal);
        let tour = mip.tour().unwrap();
        let optimum = tour.length(&g).unwrap();

        prop_assert!(bound <= optimum + 1e-6);
        prop_assert!((mip.objective().unwrap() - optimum).abs() < 1e-6);

        let identity: f64 = (0..g.num_nodes())
            .map(|i| g.weight(i, (i + 1) % g.num_nodes()).unwrap())
            .sum();
        prop_assert!(optimum <= identity + 1e-6);
    }
}

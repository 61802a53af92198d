//! Threshold search for the bottleneck TSP.

use super::config::{BottleneckConfig, SearchStrategy};
use crate::deadline::Deadline;
use crate::error::Result;
use crate::graph::{Graph, Tour};
use crate::hamiltonian::{HamiltonianConfig, HamiltonianOutcome, HamiltonianSolver};
use log::{debug, info};
use std::time::Duration;

/// One Hamiltonian feasibility query.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    /// Largest edge weight allowed.
    pub threshold: f64,
    /// `None` if the probe ran out of time.
    pub feasible: Option<bool>,
    /// Oracle calls spent on the probe.
    pub iterations: usize,
}

/// Result of a bottleneck search.
#[derive(Debug, Clone)]
pub struct BottleneckResult {
    /// Best tour found.
    pub tour: Option<Tour>,

    /// Largest edge weight on `tour`.
    pub bottleneck: Option<f64>,

    /// Every probe, in the order it ran.
    pub probes: Vec<Probe>,

    /// Whether the time limit cut the search short. The tour, if any, is
    /// then the best found rather than a proven optimum.
    pub timed_out: bool,

    pub elapsed: Duration,
}

/// Finds a Hamiltonian cycle minimizing its heaviest edge.
///
/// Every candidate threshold is one of the graph's distinct edge weights;
/// a threshold is feasible when the edges no heavier than it still contain
/// a Hamiltonian cycle. Feasibility is monotone in the threshold, so the
/// search may bisect.
///
/// # Examples
///
/// ```
/// use u_lazycut::bottleneck::{BottleneckConfig, BottleneckSolver};
/// use u_lazycut::graph::Graph;
///
/// let g = Graph::complete(5, |u, v| ((u + v) % 4 + 1) as f64).unwrap();
/// let result = BottleneckSolver::optimize(&g, &BottleneckConfig::default()).unwrap();
/// let tour = result.tour.unwrap();
/// assert_eq!(tour.bottleneck(&g).unwrap(), result.bottleneck.unwrap());
/// ```
pub struct BottleneckSolver;

impl BottleneckSolver {
    /// Runs the configured search strategy.
    pub fn optimize(graph: &Graph, config: &BottleneckConfig) -> Result<BottleneckResult> {
        config.validate()?;

        let mut search = Search {
            graph,
            probe_config: config.probe_config(),
            deadline: Deadline::new(config.time_limit),
            probes: Vec::new(),
            best: None,
            timed_out: false,
        };
        let weights = graph.distinct_weights();

        match config.strategy {
            SearchStrategy::BinarySearch => search.binary(&weights)?,
            SearchStrategy::SequentialUp => search.sequential_up(&weights)?,
            SearchStrategy::SequentialDown => search.sequential_down(&weights)?,
        }

        let bottleneck = search
            .best
            .as_ref()
            .map(|tour| tour.bottleneck(graph))
            .transpose()?;

        info!(
            "bottleneck search ({:?}) on {} nodes: {} probes, bottleneck {:?}{}",
            config.strategy,
            graph.num_nodes(),
            search.probes.len(),
            bottleneck,
            if search.timed_out { ", timed out" } else { "" }
        );

        Ok(BottleneckResult {
            tour: search.best,
            bottleneck,
            probes: search.probes,
            timed_out: search.timed_out,
            elapsed: search.deadline.elapsed(),
        })
    }

    /// Solves independent instances, in parallel with the `parallel`
    /// feature. Each instance gets its own time limit.
    pub fn optimize_many(
        graphs: &[Graph],
        config: &BottleneckConfig,
    ) -> Vec<Result<BottleneckResult>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            graphs
                .par_iter()
                .map(|g| Self::optimize(g, config))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            graphs.iter().map(|g| Self::optimize(g, config)).collect()
        }
    }
}

struct Search<'a> {
    graph: &'a Graph,
    probe_config: HamiltonianConfig,
    deadline: Deadline,
    probes: Vec<Probe>,
    best: Option<Tour>,
    timed_out: bool,
}

impl Search<'_> {
    /// Queries the subgraph of edges no heavier than `threshold`. A found
    /// tour becomes the new best.
    fn probe(&mut self, threshold: f64) -> Result<Option<bool>> {
        let subgraph = self.graph.with_max_weight(threshold);
        let result = HamiltonianSolver::solve_until(&subgraph, &self.probe_config, &self.deadline)?;
        let feasible = match result.outcome {
            HamiltonianOutcome::Cycle(tour) => {
                self.best = Some(tour);
                Some(true)
            }
            HamiltonianOutcome::NoCycle => Some(false),
            HamiltonianOutcome::TimedOut => {
                self.timed_out = true;
                None
            }
        };
        debug!(
            "probe threshold {threshold}: {feasible:?} after {} iterations, {} cuts",
            result.iterations, result.cuts_added
        );
        self.probes.push(Probe {
            threshold,
            feasible,
            iterations: result.iterations,
        });
        Ok(feasible)
    }

    fn binary(&mut self, weights: &[f64]) -> Result<()> {
        if weights.is_empty() {
            return Ok(());
        }
        let (mut left, mut right) = (0, weights.len() - 1);
        while left < right {
            let mid = (left + right) / 2;
            match self.probe(weights[mid])? {
                Some(true) => right = mid,
                Some(false) => left = mid + 1,
                None => return Ok(()),
            }
        }
        // the loop records a tour at `left` only if some probe succeeded
        if self.best.is_none() {
            self.probe(weights[left])?;
        }
        Ok(())
    }

    fn sequential_up(&mut self, weights: &[f64]) -> Result<()> {
        for &w in weights {
            match self.probe(w)? {
                Some(true) | None => return Ok(()),
                Some(false) => {}
            }
        }
        Ok(())
    }

    fn sequential_down(&mut self, weights: &[f64]) -> Result<()> {
        let mut candidates = weights;
        while let Some(&threshold) = candidates.last() {
            if self.probe(threshold)? != Some(true) {
                return Ok(());
            }
            let Some(bottleneck) = self.best.as_ref().map(|t| t.bottleneck(self.graph)).transpose()?
            else {
                return Ok(());
            };
            let below = candidates.partition_point(|&w| w < bottleneck);
            candidates = &candidates[..below];
        }
        Ok(())
    }
}

//! Whole-run statistics and comparisons across policies and frame counts.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::{config::SimulationConfig, driver::Simulation, policy::PageReplacementAlgorithm};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub algorithm: PageReplacementAlgorithm,
    pub frame_count: usize,
    pub references: usize,
    pub faults: usize,
    pub hits: usize,
    pub write_backs: usize,
    pub fault_rate: f64,
}

impl RunSummary {
    pub fn of(simulation: &Simulation) -> Self {
        Self {
            algorithm: simulation.algorithm(),
            frame_count: simulation.config().frame_count(),
            references: simulation.history().len(),
            faults: simulation.page_fault_count(),
            hits: simulation.page_hit_count(),
            write_backs: simulation.write_back_count(),
            fault_rate: simulation.fault_rate(),
        }
    }
}

/// Runs `config` to completion.
pub fn run(config: SimulationConfig) -> RunSummary {
    let mut simulation = Simulation::new(config);
    simulation.run_to_completion();
    RunSummary::of(&simulation)
}

/// Runs the same workload under every policy, in
/// [`PageReplacementAlgorithm::ALL`] order.
pub fn compare_algorithms(config: &SimulationConfig) -> Vec<RunSummary> {
    PageReplacementAlgorithm::ALL
        .into_iter()
        .map(|algorithm| run(config.clone().with_algorithm(algorithm)))
        .collect()
}

/// A frame count where adding one more frame produced more faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    pub frames: usize,
    pub faults: usize,
    pub faults_with_one_more: usize,
}

/// Looks for Belady's anomaly under the configured policy across `frames`.
///
/// Frame counts of zero are skipped.
pub fn belady_anomalies(
    config: &SimulationConfig,
    frames: RangeInclusive<usize>,
) -> Vec<Anomaly> {
    let faults: Vec<(usize, usize)> = frames
        .filter_map(|count| config.clone().with_frame_count(count).ok())
        .map(|config| {
            let frames = config.frame_count();
            (frames, run(config).faults)
        })
        .collect();

    faults
        .windows(2)
        .filter(|pair| pair[1].0 == pair[0].0 + 1 && pair[1].1 > pair[0].1)
        .map(|pair| Anomaly {
            frames: pair[0].0,
            faults: pair[0].1,
            faults_with_one_more: pair[1].1,
        })
        .collect()
}

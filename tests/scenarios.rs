//! Hand-checked runs of textbook reference strings.

use pagesim::{
    analysis, Outcome, PageReplacementAlgorithm, PageReplacementAlgorithm::*, Simulation,
    SimulationConfig,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const BELADY: [usize; 12] = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];
const LRU_TRACE: [usize; 12] = [0, 1, 2, 3, 0, 1, 4, 0, 1, 2, 3, 4];

fn run(
    pages: usize,
    frames: usize,
    refs: &[usize],
    algorithm: PageReplacementAlgorithm,
) -> Simulation {
    let config = SimulationConfig::from_pages(pages, frames, refs, algorithm).unwrap();
    let mut sim = Simulation::new(config);
    sim.run_to_completion();
    sim
}

#[test]
fn lru_golden_trace() {
    let sim = run(5, 3, &LRU_TRACE, Lru);

    let trace: Vec<(Outcome, usize, Option<usize>)> = sim
        .history()
        .iter()
        .map(|r| (r.outcome, r.frame, r.evicted))
        .collect();
    use Outcome::{Fault as F, Hit as H};
    assert_eq!(
        trace,
        vec![
            (F, 0, None),
            (F, 1, None),
            (F, 2, None),
            (F, 0, Some(0)),
            (F, 1, Some(1)),
            (F, 2, Some(2)),
            (F, 0, Some(3)),
            (H, 1, None),
            (H, 2, None),
            (F, 0, Some(4)),
            (F, 1, Some(0)),
            (F, 2, Some(1)),
        ]
    );
    assert_eq!(sim.page_fault_count(), 10);
    assert_eq!(sim.page_hit_count(), 2);

    let resident: Vec<_> = sim.frames().iter().map(|f| f.page_id).collect();
    assert_eq!(resident, vec![Some(2), Some(3), Some(4)]);
}

#[rstest]
#[case(Fifo, 3, 9)]
#[case(Fifo, 4, 10)]
#[case(Lru, 3, 10)]
#[case(Lru, 4, 8)]
#[case(Opt, 3, 7)]
#[case(Opt, 4, 6)]
fn belady_sequence_fault_counts(
    #[case] algorithm: PageReplacementAlgorithm,
    #[case] frames: usize,
    #[case] faults: usize,
) {
    let sim = run(6, frames, &BELADY, algorithm);
    assert_eq!(sim.page_fault_count(), faults);
    assert_eq!(sim.page_hit_count(), BELADY.len() - faults);
}

#[test]
fn fifo_is_true_insertion_order() {
    // page 0 is hit repeatedly but was loaded first, so FIFO still evicts it
    let sim = run(4, 2, &[0, 1, 0, 0, 2], Fifo);
    let last = sim.history().last().unwrap();
    assert_eq!(last.evicted, Some(0));

    let sim = run(4, 2, &[0, 1, 0, 0, 2], Lru);
    assert_eq!(sim.history().last().unwrap().evicted, Some(1));
}

#[test]
fn opt_evicts_page_never_used_again() {
    // frames hold {0, 1}; page 0 never returns, page 1 returns much later
    let sim = run(4, 2, &[0, 1, 2, 3, 3, 3, 3, 1], Opt);
    assert_eq!(sim.history()[2].evicted, Some(0));
}

#[test]
fn lfu_evicts_least_referenced() {
    let sim = run(4, 2, &[0, 0, 1, 2], Lfu);
    let last = sim.history().last().unwrap();
    assert_eq!(last.evicted, Some(1));
    assert_eq!(last.frame, 1);
}

#[test]
fn fifo_anomaly_and_opt_stability() {
    let fifo = SimulationConfig::from_pages(6, 3, &BELADY, Fifo).unwrap();
    let anomalies = analysis::belady_anomalies(&fifo, 3..=4);
    assert_eq!(anomalies.len(), 1);
    assert!(anomalies[0].faults_with_one_more >= anomalies[0].faults);

    let opt = fifo.with_algorithm(Opt);
    assert!(analysis::belady_anomalies(&opt, 1..=8).is_empty());
}

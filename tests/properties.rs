//! Invariants that hold for any workload.

use pagesim::{analysis, PageReplacementAlgorithm, Phase, Reference, Simulation, SimulationConfig};
use proptest::prelude::*;

fn algorithm() -> impl Strategy<Value = PageReplacementAlgorithm> {
    prop::sample::select(PageReplacementAlgorithm::ALL.to_vec())
}

prop_compose! {
    fn workload()(page_count in 1usize..12, frame_count in 1usize..8)
        (refs in prop::collection::vec((0..page_count, any::<bool>()), 1..40),
         page_count in Just(page_count),
         frame_count in Just(frame_count),
         tlb in 0usize..4)
        -> (usize, usize, Vec<Reference>, usize)
    {
        let refs = refs
            .into_iter()
            .map(|(page, write)| if write { Reference::write(page) } else { Reference::read(page) })
            .collect();
        (page_count, frame_count, refs, tlb)
    }
}

fn config(
    (pages, frames, refs, tlb): (usize, usize, Vec<Reference>, usize),
    algorithm: PageReplacementAlgorithm,
) -> SimulationConfig {
    SimulationConfig::new(pages, frames, refs, algorithm)
        .unwrap()
        .with_tlb_entries(tlb)
}

proptest! {
    #[test]
    fn mapping_stays_consistent(
        w in workload(),
        algorithm in algorithm(),
        resets in prop::collection::vec(prop::bool::weighted(0.2), 80),
    ) {
        let mut sim = Simulation::new(config(w, algorithm));
        for reset in resets {
            if reset {
                sim.reset();
            } else {
                sim.advance();
            }
            prop_assert!(sim.memory().is_consistent());
            if let Some(step) = sim.current_step() {
                prop_assert_eq!(sim.page_hit_count() + sim.page_fault_count(), step + 1);
            }
            let occupied = sim.frames().iter().filter(|f| f.is_occupied()).count();
            let loaded = sim.pages().iter().filter(|p| p.is_loaded()).count();
            prop_assert_eq!(occupied, loaded);
        }
    }

    #[test]
    fn reset_is_idempotent(w in workload(), algorithm in algorithm(), steps in 0usize..40) {
        let mut sim = Simulation::new(config(w, algorithm));
        for _ in 0..steps {
            sim.advance();
        }
        sim.reset();
        let once = (sim.pages().to_vec(), sim.frames().to_vec(), sim.current_step());
        sim.reset();
        prop_assert_eq!(once, (sim.pages().to_vec(), sim.frames().to_vec(), sim.current_step()));
        prop_assert_eq!(sim.phase(), Phase::NotStarted);
        prop_assert_eq!(sim.page_fault_count() + sim.page_hit_count(), 0);
    }

    #[test]
    fn replay_is_deterministic(w in workload(), algorithm in algorithm()) {
        let config = config(w, algorithm);
        let mut first = Simulation::new(config.clone());
        first.run_to_completion();
        let mut second = Simulation::new(config);
        second.run_to_completion();
        prop_assert_eq!(first.history(), second.history());

        first.reset();
        first.run_to_completion();
        prop_assert_eq!(first.history(), second.history());
    }

    #[test]
    fn step_back_matches_fresh_run(w in workload(), algorithm in algorithm(), steps in 1usize..40) {
        let config = config(w, algorithm);
        let mut sim = Simulation::new(config.clone());
        for _ in 0..steps {
            sim.advance();
        }
        sim.step_back();

        let mut fresh = Simulation::new(config);
        if let Some(step) = sim.current_step() {
            for _ in 0..=step {
                fresh.advance();
            }
        }
        prop_assert_eq!(sim.history(), fresh.history());
        prop_assert_eq!(sim.frames(), fresh.frames());
    }

    #[test]
    fn opt_is_never_worse(w in workload()) {
        let summaries = analysis::compare_algorithms(&config(w, PageReplacementAlgorithm::Opt));
        let opt = summaries
            .iter()
            .find(|s| s.algorithm == PageReplacementAlgorithm::Opt)
            .unwrap()
            .faults;
        for summary in &summaries {
            prop_assert!(opt <= summary.faults, "{} beat OPT", summary.algorithm);
        }
    }

    #[test]
    fn opt_has_no_belady_anomaly(w in workload()) {
        let config = config(w, PageReplacementAlgorithm::Opt);
        prop_assert!(analysis::belady_anomalies(&config, 1..=8).is_empty());
    }
}

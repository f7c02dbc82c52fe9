//! The step driver: a small state machine that walks the reference string
//! one access at a time.

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::{AccessKind, Reference, SimulationConfig},
    error::ConfigError,
    memory::{Frame, FrameId, MemoryModel, Page, PageId},
    policy::PageReplacementAlgorithm,
    tlb::Tlb,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    NotStarted,
    Stepping,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Hit,
    Fault,
}

/// What happened on one step, kept for history display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub page: PageId,
    pub kind: AccessKind,
    pub outcome: Outcome,
    /// Frame holding the page after the step.
    pub frame: FrameId,
    /// Page evicted to make room, if any.
    pub evicted: Option<PageId>,
    /// The evicted frame was dirty and had to be written back.
    pub write_back: bool,
    /// TLB lookup result, `None` when no TLB is configured.
    pub tlb_hit: Option<bool>,
}

impl StepRecord {
    pub fn is_fault(&self) -> bool {
        self.outcome == Outcome::Fault
    }
}

/// Serializable view of a simulation for presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub algorithm: PageReplacementAlgorithm,
    pub phase: Phase,
    pub current_step: Option<usize>,
    pub page_fault_count: usize,
    pub page_hit_count: usize,
    pub write_back_count: usize,
    /// TLB counters, `None` when no TLB is configured.
    pub tlb_hit_count: Option<usize>,
    pub tlb_miss_count: Option<usize>,
    pub fault_rate: f64,
    pub pages: Vec<Page>,
    pub frames: Vec<Frame>,
    pub history: Vec<StepRecord>,
}

/// A page replacement simulation over a fixed reference string.
///
/// State only changes through [`advance`](Self::advance),
/// [`reset`](Self::reset) and [`step_back`](Self::step_back); changing any
/// configuration parameter rebuilds and resets. Calls must be serialized by
/// the caller.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    memory: MemoryModel,
    tlb: Option<Tlb>,
    current_step: Option<usize>,
    page_fault_count: usize,
    page_hit_count: usize,
    write_back_count: usize,
    tlb_hit_count: usize,
    tlb_miss_count: usize,
    history: Vec<StepRecord>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        let memory = MemoryModel::new(config.page_count(), config.frame_count());
        let tlb = (config.tlb_entries() > 0).then(|| Tlb::new(config.tlb_entries()));
        info!(
            algorithm = %config.algorithm(),
            pages = config.page_count(),
            frames = config.frame_count(),
            references = config.reference_sequence().len(),
            "simulation built"
        );
        Self {
            memory,
            tlb,
            current_step: None,
            page_fault_count: 0,
            page_hit_count: 0,
            write_back_count: 0,
            tlb_hit_count: 0,
            tlb_miss_count: 0,
            history: Vec::with_capacity(config.reference_sequence().len()),
            config,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.current_step {
            None => Phase::NotStarted,
            Some(step) if step + 1 >= self.len() => Phase::Completed,
            Some(_) => Phase::Stepping,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.phase() == Phase::Completed
    }

    /// Processes the next reference. Returns `None` once completed.
    pub fn advance(&mut self) -> Option<StepRecord> {
        let step = self.current_step.map_or(0, |step| step + 1);
        let Reference { page, kind } = *self.config.reference_sequence().get(step)?;
        self.current_step = Some(step);

        let tlb_hit = self.tlb.as_ref().map(|tlb| tlb.contains(page));
        match tlb_hit {
            Some(true) => self.tlb_hit_count += 1,
            Some(false) => self.tlb_miss_count += 1,
            None => {}
        }

        let mut evicted = None;
        let mut write_back = false;
        let outcome = if self.memory.is_resident(page) {
            self.memory.touch_page(page, step);
            self.page_hit_count += 1;
            Outcome::Hit
        } else {
            self.page_fault_count += 1;
            let frame = match self.memory.find_free_frame() {
                Some(frame) => frame,
                None => {
                    let Some(victim) = self.config.algorithm().select_victim(
                        &self.memory,
                        step,
                        self.config.reference_sequence(),
                    ) else {
                        panic!("no occupied frame to evict at step {step}");
                    };
                    let old = self.memory.frame(victim).page_id;
                    if let Some(old) = old {
                        write_back = self.memory.frame(victim).dirty;
                        self.memory.unload_page(old);
                        if let Some(tlb) = self.tlb.as_mut() {
                            tlb.remove(old);
                        }
                    }
                    evicted = old;
                    victim
                }
            };
            self.memory.load_page(page, frame, step);
            Outcome::Fault
        };

        if write_back {
            self.write_back_count += 1;
        }
        if kind == AccessKind::Write {
            self.memory.mark_dirty(page);
        }
        if let Some(tlb) = self.tlb.as_mut() {
            tlb.push(page);
        }

        let frame = self.memory.page(page).frame_id.unwrap_or_default();
        let record = StepRecord {
            step,
            page,
            kind,
            outcome,
            frame,
            evicted,
            write_back,
            tlb_hit,
        };
        debug!(
            step,
            page,
            ?outcome,
            frame,
            ?evicted,
            write_back,
            "step"
        );
        self.history.push(record.clone());
        Some(record)
    }

    /// Returns to the initial state. Idempotent.
    pub fn reset(&mut self) {
        self.memory
            .reset(self.config.page_count(), self.config.frame_count());
        if let Some(tlb) = self.tlb.as_mut() {
            tlb.clear();
        }
        self.current_step = None;
        self.page_fault_count = 0;
        self.page_hit_count = 0;
        self.write_back_count = 0;
        self.tlb_hit_count = 0;
        self.tlb_miss_count = 0;
        self.history.clear();
    }

    /// Steps backwards by replaying from the start up to the previous step.
    ///
    /// Costs O(current step) per call.
    pub fn step_back(&mut self) {
        let Some(step) = self.current_step else {
            return;
        };
        self.reset();
        for _ in 0..step {
            self.advance();
        }
    }

    /// Advances until completed; returns the number of steps taken.
    pub fn run_to_completion(&mut self) -> usize {
        let mut steps = 0;
        while self.advance().is_some() {
            steps += 1;
        }
        steps
    }

    pub fn set_algorithm(&mut self, algorithm: PageReplacementAlgorithm) {
        self.rebuild(self.config.clone().with_algorithm(algorithm));
    }

    pub fn set_reference_sequence(
        &mut self,
        reference_sequence: Vec<Reference>,
    ) -> Result<(), ConfigError> {
        let config = self
            .config
            .clone()
            .with_reference_sequence(reference_sequence)?;
        self.rebuild(config);
        Ok(())
    }

    pub fn set_page_count(&mut self, page_count: usize) -> Result<(), ConfigError> {
        let config = self.config.clone().with_page_count(page_count)?;
        self.rebuild(config);
        Ok(())
    }

    pub fn set_frame_count(&mut self, frame_count: usize) -> Result<(), ConfigError> {
        let config = self.config.clone().with_frame_count(frame_count)?;
        self.rebuild(config);
        Ok(())
    }

    fn rebuild(&mut self, config: SimulationConfig) {
        *self = Simulation::new(config);
    }

    fn len(&self) -> usize {
        self.config.reference_sequence().len()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn algorithm(&self) -> PageReplacementAlgorithm {
        self.config.algorithm()
    }

    pub fn memory(&self) -> &MemoryModel {
        &self.memory
    }

    pub fn pages(&self) -> &[Page] {
        self.memory.pages()
    }

    pub fn frames(&self) -> &[Frame] {
        self.memory.frames()
    }

    pub fn tlb(&self) -> Option<&Tlb> {
        self.tlb.as_ref()
    }

    pub fn current_step(&self) -> Option<usize> {
        self.current_step
    }

    /// The reference processed by the next [`advance`](Self::advance).
    pub fn next_reference(&self) -> Option<Reference> {
        let next = self.current_step.map_or(0, |step| step + 1);
        self.config.reference_sequence().get(next).copied()
    }

    pub fn page_fault_count(&self) -> usize {
        self.page_fault_count
    }

    pub fn page_hit_count(&self) -> usize {
        self.page_hit_count
    }

    pub fn write_back_count(&self) -> usize {
        self.write_back_count
    }

    pub fn tlb_hit_count(&self) -> usize {
        self.tlb_hit_count
    }

    pub fn tlb_miss_count(&self) -> usize {
        self.tlb_miss_count
    }

    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    /// Faults per processed reference; 0.0 before the first step.
    pub fn fault_rate(&self) -> f64 {
        match self.current_step {
            Some(step) => self.page_fault_count as f64 / (step + 1) as f64,
            None => 0.0,
        }
    }

    pub fn hit_rate(&self) -> f64 {
        match self.current_step {
            Some(step) => self.page_hit_count as f64 / (step + 1) as f64,
            None => 0.0,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            algorithm: self.algorithm(),
            phase: self.phase(),
            current_step: self.current_step,
            page_fault_count: self.page_fault_count,
            page_hit_count: self.page_hit_count,
            write_back_count: self.write_back_count,
            tlb_hit_count: self.tlb.as_ref().map(|_| self.tlb_hit_count),
            tlb_miss_count: self.tlb.as_ref().map(|_| self.tlb_miss_count),
            fault_rate: self.fault_rate(),
            pages: self.pages().to_vec(),
            frames: self.frames().to_vec(),
            history: self.history.clone(),
        }
    }
}

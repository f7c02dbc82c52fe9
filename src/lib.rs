//! Step-by-step simulation of virtual memory page replacement.
//!
//! A [`Simulation`] owns a set of pages and frames and walks a reference
//! string one access at a time, classifying each access as a hit or a fault
//! and evicting a victim chosen by a [`PageReplacementAlgorithm`] when no
//! frame is free.
//!
//! ```
//! use pagesim::{PageReplacementAlgorithm, Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::from_pages(
//!     6,
//!     3,
//!     &[1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5],
//!     PageReplacementAlgorithm::Fifo,
//! )?;
//! let mut sim = Simulation::new(config);
//! sim.run_to_completion();
//! assert_eq!(sim.page_fault_count(), 9);
//! # Ok::<(), pagesim::ConfigError>(())
//! ```

pub mod analysis;
pub mod config;
pub mod driver;
pub mod error;
pub mod memory;
pub mod player;
pub mod policy;
pub mod tlb;

pub use config::{
    parse_references, parse_references_lenient, AccessKind, Reference, SimulationConfig,
};
pub use driver::{Outcome, Phase, Simulation, Snapshot, StepRecord};
pub use error::ConfigError;
pub use memory::{Frame, FrameId, MemoryModel, Page, PageId};
pub use player::Player;
pub use policy::PageReplacementAlgorithm;

//! Victim selection.
//!
//! Every policy is a pure function of the memory model and the reference
//! string. Ties always go to the lowest frame id, which keeps replays
//! deterministic.

use std::{fmt, str::FromStr};

use clap::{builder::PossibleValue, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    config::Reference,
    memory::{FrameId, MemoryModel},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PageReplacementAlgorithm {
    #[default]
    #[serde(alias = "Fifo", alias = "fifo")]
    Fifo,
    #[serde(alias = "Lru", alias = "lru")]
    Lru,
    #[serde(alias = "Opt", alias = "opt")]
    Opt,
    #[serde(alias = "Lfu", alias = "lfu")]
    Lfu,
}

impl PageReplacementAlgorithm {
    pub const ALL: [PageReplacementAlgorithm; 4] = [
        PageReplacementAlgorithm::Fifo,
        PageReplacementAlgorithm::Lru,
        PageReplacementAlgorithm::Opt,
        PageReplacementAlgorithm::Lfu,
    ];

    /// Chooses the occupied frame to evict at `present_idx`.
    ///
    /// Returns `None` only when no frame is occupied.
    pub fn select_victim(
        &self,
        memory: &MemoryModel,
        present_idx: usize,
        references: &[Reference],
    ) -> Option<FrameId> {
        let victim = match self {
            PageReplacementAlgorithm::Fifo => fifo(memory),
            PageReplacementAlgorithm::Lru => lru(memory),
            PageReplacementAlgorithm::Opt => opt(memory, present_idx, references),
            PageReplacementAlgorithm::Lfu => lfu(memory),
        };
        trace!(algorithm = %self, step = present_idx, ?victim, "victim selected");
        victim
    }
}

// `min_by_key` keeps the last of equal elements, so the frame id goes into
// the key to pin ties to the lowest frame.

fn fifo(memory: &MemoryModel) -> Option<FrameId> {
    memory
        .resident_pages()
        .min_by_key(|(frame, page)| (page.loaded_at, frame.id))
        .map(|(frame, _)| frame.id)
}

fn lru(memory: &MemoryModel) -> Option<FrameId> {
    memory
        .resident_pages()
        .min_by_key(|(frame, page)| (page.last_accessed, frame.id))
        .map(|(frame, _)| frame.id)
}

fn lfu(memory: &MemoryModel) -> Option<FrameId> {
    memory
        .resident_pages()
        .min_by_key(|(frame, page)| (page.reference_count, frame.id))
        .map(|(frame, _)| frame.id)
}

fn opt(memory: &MemoryModel, present_idx: usize, references: &[Reference]) -> Option<FrameId> {
    let future = references.get(present_idx + 1..).unwrap_or_default();
    memory
        .resident_pages()
        .map(|(frame, page)| {
            // Pages never used again sort after every finite distance.
            let next_use = future
                .iter()
                .position(|reference| reference.page == page.id)
                .unwrap_or(usize::MAX);
            (frame.id, next_use)
        })
        .max_by(|(a_frame, a_next), (b_frame, b_next)| {
            a_next.cmp(b_next).then_with(|| b_frame.cmp(a_frame))
        })
        .map(|(frame, _)| frame)
}

impl fmt::Display for PageReplacementAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PageReplacementAlgorithm::Fifo => "FIFO",
            PageReplacementAlgorithm::Lru => "LRU",
            PageReplacementAlgorithm::Opt => "OPT",
            PageReplacementAlgorithm::Lfu => "LFU",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PageReplacementAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown page replacement algorithm `{s}`"))
    }
}

// Strict all caps matching on the command line
impl ValueEnum for PageReplacementAlgorithm {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            PageReplacementAlgorithm::Fifo => PossibleValue::new("FIFO"),
            PageReplacementAlgorithm::Lru => PossibleValue::new("LRU"),
            PageReplacementAlgorithm::Opt => PossibleValue::new("OPT"),
            PageReplacementAlgorithm::Lfu => PossibleValue::new("LFU"),
        })
    }
}

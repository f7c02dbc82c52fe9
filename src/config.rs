//! Simulation parameters and reference-string parsing.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{error::ConfigError, policy::PageReplacementAlgorithm};

pub const DEFAULT_PAGE_COUNT: usize = 8;
pub const DEFAULT_FRAME_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    #[default]
    Read,
    Write,
}

/// One entry of the reference string: a page number and whether the access
/// modifies the page.
///
/// The textual form is the page number, optionally suffixed with `w` (or
/// `W`) for a write: `"3"` reads page 3, `"3w"` writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub page: usize,
    #[serde(default)]
    pub kind: AccessKind,
}

impl Reference {
    pub fn read(page: usize) -> Self {
        Self {
            page,
            kind: AccessKind::Read,
        }
    }

    pub fn write(page: usize) -> Self {
        Self {
            page,
            kind: AccessKind::Write,
        }
    }

    pub fn is_write(&self) -> bool {
        self.kind == AccessKind::Write
    }
}

impl From<usize> for Reference {
    fn from(page: usize) -> Self {
        Reference::read(page)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AccessKind::Read => write!(f, "{}", self.page),
            AccessKind::Write => write!(f, "{}w", self.page),
        }
    }
}

impl FromStr for Reference {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, kind) = match s.strip_suffix(['w', 'W']) {
            Some(digits) => (digits, AccessKind::Write),
            None => (s, AccessKind::Read),
        };
        // `usize::from_str` accepts a leading `+`
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(());
        }
        let page = digits.parse().map_err(|_| ())?;
        Ok(Reference { page, kind })
    }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// Parses a comma and/or whitespace separated reference string.
///
/// Any token that is not a reference is an error; nothing is dropped.
pub fn parse_references(text: &str) -> Result<Vec<Reference>, ConfigError> {
    tokens(text)
        .enumerate()
        .map(|(position, token)| {
            token.parse().map_err(|()| ConfigError::InvalidToken {
                token: token.to_string(),
                position,
            })
        })
        .collect()
}

/// Parses a reference string, silently skipping malformed tokens and pages
/// outside `0..page_count`. Each skipped token is logged.
pub fn parse_references_lenient(text: &str, page_count: usize) -> Vec<Reference> {
    tokens(text)
        .enumerate()
        .filter_map(|(position, token)| match token.parse::<Reference>() {
            Ok(reference) if reference.page < page_count => Some(reference),
            Ok(reference) => {
                warn!(position, page = reference.page, page_count, "dropping out-of-range page");
                None
            }
            Err(()) => {
                warn!(position, token, "dropping malformed reference");
                None
            }
        })
        .collect()
}

/// The exogenous parameters a simulation is built from.
///
/// Construct with [`SimulationConfig::new`] or deserialize from JSON; both
/// paths validate, so a value of this type always describes a runnable
/// simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct SimulationConfig {
    page_count: usize,
    frame_count: usize,
    reference_sequence: Vec<Reference>,
    algorithm: PageReplacementAlgorithm,
    tlb_entries: usize,
}

impl SimulationConfig {
    pub fn new(
        page_count: usize,
        frame_count: usize,
        reference_sequence: Vec<Reference>,
        algorithm: PageReplacementAlgorithm,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            page_count,
            frame_count,
            reference_sequence,
            algorithm,
            tlb_entries: 0,
        };
        config.validate()?;
        Ok(config)
    }

    /// Convenience for read-only workloads given as bare page numbers.
    pub fn from_pages(
        page_count: usize,
        frame_count: usize,
        pages: &[usize],
        algorithm: PageReplacementAlgorithm,
    ) -> Result<Self, ConfigError> {
        let references = pages.iter().copied().map(Reference::read).collect();
        Self::new(page_count, frame_count, references, algorithm)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_count == 0 {
            return Err(ConfigError::ZeroPages);
        }
        if self.frame_count == 0 {
            return Err(ConfigError::ZeroFrames);
        }
        if self.reference_sequence.is_empty() {
            return Err(ConfigError::EmptyReferenceSequence);
        }
        if let Some((position, reference)) = self
            .reference_sequence
            .iter()
            .enumerate()
            .find(|(_, reference)| reference.page >= self.page_count)
        {
            return Err(ConfigError::PageOutOfRange {
                page: reference.page,
                position,
                page_count: self.page_count,
            });
        }
        Ok(())
    }

    pub fn with_algorithm(mut self, algorithm: PageReplacementAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Enables a TLB of `entries` slots; zero disables it.
    pub fn with_tlb_entries(mut self, entries: usize) -> Self {
        self.tlb_entries = entries;
        self
    }

    pub fn with_page_count(self, page_count: usize) -> Result<Self, ConfigError> {
        let config = Self { page_count, ..self };
        config.validate()?;
        Ok(config)
    }

    pub fn with_frame_count(self, frame_count: usize) -> Result<Self, ConfigError> {
        let config = Self {
            frame_count,
            ..self
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_reference_sequence(
        self,
        reference_sequence: Vec<Reference>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            reference_sequence,
            ..self
        };
        config.validate()?;
        Ok(config)
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn reference_sequence(&self) -> &[Reference] {
        &self.reference_sequence
    }

    pub fn algorithm(&self) -> PageReplacementAlgorithm {
        self.algorithm
    }

    pub fn tlb_entries(&self) -> usize {
        self.tlb_entries
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReferences {
    Text(String),
    Pages(Vec<usize>),
    References(Vec<Reference>),
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default = "default_page_count")]
    page_count: usize,
    #[serde(default = "default_frame_count")]
    frame_count: usize,
    reference_sequence: RawReferences,
    #[serde(default)]
    algorithm: PageReplacementAlgorithm,
    #[serde(default)]
    tlb_entries: usize,
}

fn default_page_count() -> usize {
    DEFAULT_PAGE_COUNT
}

fn default_frame_count() -> usize {
    DEFAULT_FRAME_COUNT
}

impl TryFrom<RawConfig> for SimulationConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let reference_sequence = match raw.reference_sequence {
            RawReferences::Text(text) => parse_references(&text)?,
            RawReferences::Pages(pages) => pages.into_iter().map(Reference::read).collect(),
            RawReferences::References(references) => references,
        };
        Ok(Self::new(raw.page_count, raw.frame_count, reference_sequence, raw.algorithm)?
            .with_tlb_entries(raw.tlb_entries))
    }
}

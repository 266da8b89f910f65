//! Coverage of a suggested section against the decomposed requirement.
//!
//! The backend splits the expected content of a required section into
//! sub-requirements and reports, for each suggested section, which of them it
//! covers. Everything in this module is derived from that list; nothing here is
//! ever read from the backend directly.

use std::fmt;

/// One sub-requirement of a required section's expected content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decomposition {
    /// Category of the sub-requirement (skill, content, context...).
    pub kind: String,
    /// Text of the sub-requirement.
    pub text: String,
    /// Whether the suggested section covers this sub-requirement.
    pub covered: bool,
    /// Why the sub-requirement is not covered. Empty when covered.
    pub reason: String,
}

impl Decomposition {
    /// A covered sub-requirement.
    #[must_use]
    pub fn covered(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
            covered: true,
            reason: String::new(),
        }
    }

    /// A sub-requirement the suggested section does not cover.
    #[must_use]
    pub fn uncovered(
        kind: impl Into<String>,
        text: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
            covered: false,
            reason: reason.into(),
        }
    }
}

/// Tri-state classification of a coverage rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CoverageLabel {
    /// No sub-requirement is covered (or there are none).
    NotCovered,
    /// Some, but not all, sub-requirements are covered.
    PartiallyCovered,
    /// Every sub-requirement is covered.
    Covered,
}

impl CoverageLabel {
    /// The label for a coverage rate in percent.
    #[must_use]
    pub const fn from_rate(rate: u8) -> Self {
        match rate {
            0 => Self::NotCovered,
            100.. => Self::Covered,
            _ => Self::PartiallyCovered,
        }
    }

    /// Human readable form of the label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotCovered => "not covered",
            Self::PartiallyCovered => "partially covered",
            Self::Covered => "covered",
        }
    }
}

impl fmt::Display for CoverageLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coverage derived from a list of [`Decomposition`] entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    rate: u8,
    label: CoverageLabel,
    uncovered_reasons: String,
}

impl Coverage {
    /// Computes the coverage of a decomposition.
    ///
    /// The rate is `round(100 * covered / total)`, or 0 for an empty list.
    /// Rounding is half-up, computed in integers so that e.g. 2 of 3 gives 67.
    #[must_use]
    pub fn of(entries: &[Decomposition]) -> Self {
        let total = entries.len();
        let covered = entries.iter().filter(|entry| entry.covered).count();

        let rate = if total == 0 {
            0
        } else {
            // covered <= total, so the quotient never exceeds 100
            u8::try_from((200 * covered + total) / (2 * total)).unwrap_or(100)
        };

        let uncovered_reasons = entries
            .iter()
            .filter(|entry| !entry.covered)
            .map(|entry| entry.reason.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            rate,
            label: CoverageLabel::from_rate(rate),
            uncovered_reasons,
        }
    }

    /// Coverage rate in percent (0..=100).
    #[must_use]
    pub const fn rate(&self) -> u8 {
        self.rate
    }

    /// The label derived from [`Self::rate`].
    #[must_use]
    pub const fn label(&self) -> CoverageLabel {
        self.label
    }

    /// Reasons of every uncovered entry, space separated, in original order.
    #[must_use]
    pub fn uncovered_reasons(&self) -> &str {
        &self.uncovered_reasons
    }

    /// Whether every sub-requirement is covered.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.label == CoverageLabel::Covered
    }
}

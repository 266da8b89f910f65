//! Required sections, their suggested matches, and assignment.
//!
//! A [`PlanningResult`] owns the ranked suggestions for one required section
//! and at most one assignment, held as an index into that same list.
//!
//! Two different rules decide the assignment:
//!
//! - when a result is first built, the best-scoring *fully covered* suggestion
//!   is assigned, wherever it ranks ([`PlanningResult::new`]);
//! - when the similarity threshold changes, only the top-ranked suggestion is
//!   considered, and it is assigned iff it is fully covered and its score
//!   reaches the threshold ([`PlanningResult::apply_threshold`]).
//!
//! Lowering the threshold therefore never promotes a lower-ranked suggestion.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

use super::coverage::{Coverage, Decomposition};

/// A learning resource attached to a suggested section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleResource {
    /// Resource type as reported by the backend (video, document, quiz...).
    pub kind: String,
    /// Where the resource lives.
    pub url: String,
    /// Display name.
    pub name: String,
}

/// A curriculum requirement to be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequiredSection {
    /// Name of the section.
    pub name: String,
    /// The learning indicator the section is expected to develop.
    pub expected_indicator: String,
    /// Longer description of the section.
    pub description: String,
    /// Topic label, used to group sections.
    pub topic: String,
    /// Summary of the content the section should cover.
    pub content: String,
    /// Pedagogical justification for the section, if the backend gave one.
    pub justification: Option<String>,
}

/// A candidate curriculum unit proposed for a [`RequiredSection`].
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedSection {
    /// Name of the candidate section.
    pub name: String,
    /// Long profile text.
    pub profile: String,
    /// Short profile summary.
    pub profile_summary: String,
    /// Learning resources of the section.
    pub modules: Vec<ModuleResource>,
    /// Similarity to the required section, in `[0, 1]`.
    pub score: f64,
    /// Curriculum the section belongs to.
    pub curriculum_tag: String,
    /// Course the section belongs to.
    pub course_name: String,
    decomposition: Vec<Decomposition>,
    coverage: Coverage,
}

impl SuggestedSection {
    /// Creates a suggestion with the given name, score and decomposition.
    ///
    /// The remaining descriptive fields start empty.
    #[must_use]
    pub fn new(name: impl Into<String>, score: f64, decomposition: Vec<Decomposition>) -> Self {
        let coverage = Coverage::of(&decomposition);
        Self {
            name: name.into(),
            profile: String::new(),
            profile_summary: String::new(),
            modules: Vec::new(),
            score,
            curriculum_tag: String::new(),
            course_name: String::new(),
            decomposition,
            coverage,
        }
    }

    /// The sub-requirements this suggestion was checked against.
    #[must_use]
    pub fn decomposition(&self) -> &[Decomposition] {
        &self.decomposition
    }

    /// Replaces the decomposition; coverage is recomputed.
    pub fn set_decomposition(&mut self, decomposition: Vec<Decomposition>) {
        self.coverage = Coverage::of(&decomposition);
        self.decomposition = decomposition;
    }

    /// Coverage derived from [`Self::decomposition`].
    #[must_use]
    pub const fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    /// Whether this suggestion may be assigned automatically.
    #[must_use]
    pub fn is_fully_covered(&self) -> bool {
        self.coverage.is_full()
    }
}

/// Minimum similarity score for the top suggestion to be assigned when the
/// threshold is applied.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

/// Error returned when a threshold is outside `[0, 1]`.
#[derive(Debug, Error, PartialEq)]
#[error("similarity threshold must be between 0 and 1, got {0}")]
pub struct ThresholdError(f64);

impl Threshold {
    /// The threshold used until the user picks another one.
    pub const DEFAULT: Self = Self(0.595);

    /// Creates a threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not within `[0, 1]` (NaN included).
    pub fn new(value: f64) -> Result<Self, ThresholdError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ThresholdError(value))
        }
    }

    /// Creates a threshold from a whole percentage, as picked on a slider.
    ///
    /// # Errors
    ///
    /// Returns an error if `percent` is above 100.
    pub fn from_percent(percent: u8) -> Result<Self, ThresholdError> {
        Self::new(f64::from(percent) / 100.0)
    }

    /// The threshold as a fraction.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// The threshold rounded to a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(self) -> u8 {
        // bounded to [0, 100] by construction
        (self.0 * 100.0).round() as u8
    }

    /// Whether `score` reaches this threshold.
    #[must_use]
    pub fn accepts(self, score: f64) -> bool {
        score >= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Error returned when a suggestion index does not exist.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("suggestion {index} does not exist ({len} suggestions)")]
pub struct AssignError {
    index: usize,
    len: usize,
}

/// The planning outcome for one [`RequiredSection`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningResult {
    required: RequiredSection,
    suggestions: Vec<SuggestedSection>,
    assigned: Option<usize>,
}

impl PlanningResult {
    /// Ranks the suggestions and performs the initial assignment.
    ///
    /// Suggestions are sorted by descending score; the sort is stable. The
    /// assignment is the highest-scoring fully covered suggestion, the earliest
    /// one in the original order winning a tie. Because the sort is stable and
    /// descending, that is the first fully covered entry of the sorted list.
    /// Partially covered suggestions are never assigned here, whatever their
    /// score.
    #[must_use]
    pub fn new(required: RequiredSection, mut suggestions: Vec<SuggestedSection>) -> Self {
        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        let assigned = suggestions
            .iter()
            .position(SuggestedSection::is_fully_covered);

        Self {
            required,
            suggestions,
            assigned,
        }
    }

    /// The section to be satisfied.
    #[must_use]
    pub const fn required(&self) -> &RequiredSection {
        &self.required
    }

    /// Suggestions, sorted by descending score.
    #[must_use]
    pub fn suggestions(&self) -> &[SuggestedSection] {
        &self.suggestions
    }

    /// The assigned suggestion, if any.
    #[must_use]
    pub fn assigned(&self) -> Option<&SuggestedSection> {
        self.assigned.map(|index| &self.suggestions[index])
    }

    /// Position of the assigned suggestion in [`Self::suggestions`].
    #[must_use]
    pub const fn assigned_index(&self) -> Option<usize> {
        self.assigned
    }

    /// Whether the section still waits for an assignment.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.assigned.is_none()
    }

    /// Suggestions other than the assigned one, with their positions.
    pub fn other_suggestions(&self) -> impl Iterator<Item = (usize, &SuggestedSection)> + '_ {
        self.suggestions
            .iter()
            .enumerate()
            .filter(move |(index, _)| Some(*index) != self.assigned)
    }

    /// Re-derives the assignment for a new threshold.
    ///
    /// Only the top-ranked suggestion is considered: it is assigned if it is
    /// fully covered and its score reaches `threshold`, otherwise the section
    /// becomes pending. Any manual choice is discarded.
    pub fn apply_threshold(&mut self, threshold: Threshold) {
        self.assigned = self
            .suggestions
            .first()
            .filter(|top| top.is_fully_covered() && threshold.accepts(top.score))
            .map(|_| 0);
    }

    /// Assigns the suggestion at `index`, regardless of coverage or score.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no suggestion at `index`.
    pub fn choose(&mut self, index: usize) -> Result<&SuggestedSection, AssignError> {
        let len = self.suggestions.len();
        let suggestion = self
            .suggestions
            .get(index)
            .ok_or(AssignError { index, len })?;
        self.assigned = Some(index);
        Ok(suggestion)
    }

    /// Clears the assignment.
    pub const fn unassign(&mut self) {
        self.assigned = None;
    }
}

static ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^N?\d{1,2}\.\s").expect("ordinal prefix pattern is valid"));

/// Strips a leading ordinal such as `"3. "` or `"N12. "` from a section name.
#[must_use]
pub fn clean_section_name(name: &str) -> &str {
    ORDINAL_PREFIX
        .find(name)
        .map_or(name, |prefix| &name[prefix.end()..])
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::coverage::CoverageLabel;

    fn full(name: &str, score: f64) -> SuggestedSection {
        SuggestedSection::new(
            name,
            score,
            vec![
                Decomposition::covered("skill", "analyse"),
                Decomposition::covered("content", "texts"),
            ],
        )
    }

    fn partial(name: &str, score: f64) -> SuggestedSection {
        SuggestedSection::new(
            name,
            score,
            vec![
                Decomposition::covered("skill", "analyse"),
                Decomposition::uncovered("content", "essays", "no essay writing"),
            ],
        )
    }

    fn result(suggestions: Vec<SuggestedSection>) -> PlanningResult {
        PlanningResult::new(RequiredSection::default(), suggestions)
    }

    fn assigned_name(result: &PlanningResult) -> Option<&str> {
        result.assigned().map(|s| s.name.as_str())
    }

    #[test]
    fn suggestions_are_sorted_by_descending_score() {
        let result = result(vec![full("a", 0.2), partial("b", 0.9), full("c", 0.5)]);
        let names: Vec<_> = result.suggestions().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "a"]);
    }

    #[test]
    fn sort_keeps_original_order_on_ties() {
        let result = result(vec![partial("a", 0.5), partial("b", 0.7), partial("c", 0.5)]);
        let names: Vec<_> = result.suggestions().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn best_fully_covered_suggestion_is_assigned() {
        let result = result(vec![full("low", 0.3), partial("top", 0.95), full("mid", 0.6)]);
        assert_eq!(assigned_name(&result), Some("mid"));
        assert_eq!(result.assigned_index(), Some(1));
    }

    #[test]
    fn partially_covered_top_suggestion_is_never_assigned() {
        let result = result(vec![partial("top", 0.99), partial("other", 0.4)]);
        assert!(result.is_pending());
        assert_eq!(
            result.suggestions()[0].coverage().label(),
            CoverageLabel::PartiallyCovered
        );
    }

    #[test]
    fn no_suggestions_is_pending() {
        assert!(result(Vec::new()).is_pending());
    }

    #[test]
    fn earliest_candidate_wins_a_score_tie() {
        let result = result(vec![partial("p", 0.9), full("first", 0.7), full("second", 0.7)]);
        assert_eq!(assigned_name(&result), Some("first"));
    }

    #[test]
    fn assignment_ignores_threshold_on_creation() {
        let result = result(vec![full("weak", 0.1)]);
        assert_eq!(assigned_name(&result), Some("weak"));
    }

    #[test]
    fn recomputes_coverage_when_decomposition_changes() {
        let mut suggestion = partial("s", 0.5);
        assert!(!suggestion.is_fully_covered());
        suggestion.set_decomposition(vec![Decomposition::covered("skill", "x")]);
        assert!(suggestion.is_fully_covered());
        assert_eq!(suggestion.coverage().rate(), 100);
    }

    #[test_case(0.5, Some("top"); "top reaches threshold")]
    #[test_case(0.8, Some("top"); "score equal to threshold")]
    #[test_case(0.81, None; "top below threshold")]
    fn threshold_assigns_fully_covered_top(threshold: f64, expected: Option<&str>) {
        let mut result = result(vec![full("top", 0.8), full("second", 0.6)]);
        result.unassign();
        result.apply_threshold(Threshold::new(threshold).unwrap());
        assert_eq!(assigned_name(&result), expected);
    }

    #[test]
    fn threshold_never_promotes_second_ranked() {
        let mut result = result(vec![partial("top", 0.9), full("second", 0.5)]);
        assert_eq!(assigned_name(&result), Some("second"));

        for percent in [0, 10, 30, 50, 60, 90, 100] {
            result.apply_threshold(Threshold::from_percent(percent).unwrap());
            assert!(result.is_pending(), "assigned at {percent}%");
        }
    }

    #[test]
    fn threshold_discards_manual_choice() {
        let mut result = result(vec![full("top", 0.9), partial("other", 0.2)]);
        result.choose(1).unwrap();
        result.apply_threshold(Threshold::DEFAULT);
        assert_eq!(assigned_name(&result), Some("top"));
    }

    #[test]
    fn choose_bypasses_coverage_and_score() {
        let mut result = result(vec![partial("top", 0.9), partial("low", 0.01)]);
        let chosen = result.choose(1).unwrap();
        assert_eq!(chosen.name, "low");
        assert_eq!(assigned_name(&result), Some("low"));
    }

    #[test]
    fn choose_out_of_range_is_an_error() {
        let mut result = result(vec![full("only", 0.9)]);
        assert_eq!(result.choose(3), Err(AssignError { index: 3, len: 1 }));
        assert_eq!(assigned_name(&result), Some("only"));
    }

    #[test]
    fn unassign_clears_assignment() {
        let mut result = result(vec![full("only", 0.9)]);
        result.unassign();
        assert!(result.is_pending());
    }

    #[test]
    fn other_suggestions_skip_the_assigned_index() {
        let result = result(vec![full("same", 0.9), full("same", 0.4)]);
        let others: Vec<_> = result.other_suggestions().map(|(i, _)| i).collect();
        assert_eq!(others, [1]);
    }

    #[test_case(0.595, 60; "default rounds up")]
    #[test_case(0.0, 0; "zero")]
    #[test_case(1.0, 100; "one")]
    fn threshold_percent(value: f64, percent: u8) {
        assert_eq!(Threshold::new(value).unwrap().percent(), percent);
    }

    #[test_case(-0.1; "negative")]
    #[test_case(1.01; "above one")]
    #[test_case(f64::NAN; "nan")]
    fn threshold_rejects_out_of_range(value: f64) {
        assert!(Threshold::new(value).is_err());
    }

    #[test]
    fn threshold_from_percent_rejects_above_hundred() {
        assert!(Threshold::from_percent(101).is_err());
        assert_eq!(Threshold::from_percent(60).unwrap().value(), 0.6);
    }

    #[test_case("1. Reading", "Reading"; "single digit")]
    #[test_case("12. Reading", "Reading"; "two digits")]
    #[test_case("N3. Reading", "Reading"; "n prefix")]
    #[test_case("123. Reading", "123. Reading"; "three digits untouched")]
    #[test_case("Reading 1. basics", "Reading 1. basics"; "not a prefix")]
    #[test_case("", ""; "empty")]
    fn cleans_section_names(name: &str, expected: &str) {
        assert_eq!(clean_section_name(name), expected);
    }
}

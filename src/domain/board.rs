//! The confirmed planning: every required section with its assignment.

use std::fmt;

use thiserror::Error;

use super::planning::{AssignError, PlanningResult, Threshold};

/// Topic used for sections the backend left without one.
pub const UNKNOWN_TOPIC: &str = "No topic";

/// Which sections a view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every section.
    #[default]
    All,
    /// Sections with an assigned suggestion.
    Covered,
    /// Sections still waiting for one.
    Pending,
}

impl StatusFilter {
    /// Whether `result` passes the filter.
    #[must_use]
    pub const fn matches(self, result: &PlanningResult) -> bool {
        match self {
            Self::All => true,
            Self::Covered => !result.is_pending(),
            Self::Pending => result.is_pending(),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Covered => "covered",
            Self::Pending => "pending",
        })
    }
}

/// Share of required sections that have an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Sections with an assignment.
    pub covered: usize,
    /// All sections.
    pub total: usize,
}

impl Progress {
    /// Covered sections in percent, rounded half up; 0 when there are none.
    #[must_use]
    pub const fn percentage(self) -> usize {
        if self.total == 0 {
            0
        } else {
            (200 * self.covered + self.total) / (2 * self.total)
        }
    }
}

/// Sections sharing a topic, in the order they appear on the board.
#[derive(Debug)]
pub struct TopicGroup<'a> {
    /// The topic, or [`UNKNOWN_TOPIC`].
    pub topic: &'a str,
    /// Board positions and results of the sections in this topic.
    pub results: Vec<(usize, &'a PlanningResult)>,
}

/// Errors raised by board commands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// No required section at this position.
    #[error("required section {0} does not exist")]
    SectionNotFound(usize),
    /// The suggestion does not exist.
    #[error(transparent)]
    Assign(#[from] AssignError),
}

/// The planning view: results, the active threshold and the status filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanningBoard {
    results: Vec<PlanningResult>,
    threshold: Threshold,
    /// The status filter applied by [`Self::filtered`] and [`Self::by_topic`].
    pub filter: StatusFilter,
}

impl PlanningBoard {
    /// Creates a board with the default threshold and no filter.
    ///
    /// The results keep the assignment made when they were built; the
    /// threshold is only applied by [`Self::apply_threshold`].
    #[must_use]
    pub fn new(results: Vec<PlanningResult>) -> Self {
        Self::with_threshold(results, Threshold::DEFAULT)
    }

    /// Creates a board whose threshold starts at `threshold`.
    ///
    /// As with [`Self::new`], the threshold is recorded but not applied.
    #[must_use]
    pub const fn with_threshold(results: Vec<PlanningResult>, threshold: Threshold) -> Self {
        Self {
            results,
            threshold,
            filter: StatusFilter::All,
        }
    }

    /// Every result, in board order.
    #[must_use]
    pub fn results(&self) -> &[PlanningResult] {
        &self.results
    }

    /// The result at `index`.
    #[must_use]
    pub fn result(&self, index: usize) -> Option<&PlanningResult> {
        self.results.get(index)
    }

    /// The threshold last applied.
    #[must_use]
    pub const fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Sets the threshold and re-derives every assignment from it.
    pub fn apply_threshold(&mut self, threshold: Threshold) {
        self.threshold = threshold;
        for result in &mut self.results {
            result.apply_threshold(threshold);
        }
    }

    fn result_mut(&mut self, index: usize) -> Result<&mut PlanningResult, BoardError> {
        self.results
            .get_mut(index)
            .ok_or(BoardError::SectionNotFound(index))
    }

    /// Assigns suggestion `suggestion` to the section at `section`.
    ///
    /// # Errors
    ///
    /// Returns an error if either index is out of range.
    pub fn choose(&mut self, section: usize, suggestion: usize) -> Result<(), BoardError> {
        self.result_mut(section)?.choose(suggestion)?;
        Ok(())
    }

    /// Clears the assignment of the section at `section`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn unassign(&mut self, section: usize) -> Result<(), BoardError> {
        self.result_mut(section)?.unassign();
        Ok(())
    }

    /// Results passing [`Self::filter`], with their board positions.
    pub fn filtered(&self) -> impl Iterator<Item = (usize, &PlanningResult)> + '_ {
        let filter = self.filter;
        self.results
            .iter()
            .enumerate()
            .filter(move |(_, result)| filter.matches(result))
    }

    /// Filtered results grouped by topic, topics in order of first appearance.
    #[must_use]
    pub fn by_topic(&self) -> Vec<TopicGroup<'_>> {
        let mut groups: Vec<TopicGroup<'_>> = Vec::new();
        for (index, result) in self.filtered() {
            let topic = match result.required().topic.as_str() {
                "" => UNKNOWN_TOPIC,
                topic => topic,
            };
            match groups.iter_mut().find(|group| group.topic == topic) {
                Some(group) => group.results.push((index, result)),
                None => groups.push(TopicGroup {
                    topic,
                    results: vec![(index, result)],
                }),
            }
        }
        groups
    }

    /// Progress over every result, regardless of the filter.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            covered: self.results.iter().filter(|r| !r.is_pending()).count(),
            total: self.results.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::{
        coverage::Decomposition,
        planning::{RequiredSection, SuggestedSection},
    };

    fn section(topic: &str, name: &str) -> RequiredSection {
        RequiredSection {
            name: name.to_string(),
            topic: topic.to_string(),
            ..RequiredSection::default()
        }
    }

    fn covered(score: f64) -> SuggestedSection {
        SuggestedSection::new("covered", score, vec![Decomposition::covered("k", "t")])
    }

    fn partial(score: f64) -> SuggestedSection {
        SuggestedSection::new(
            "partial",
            score,
            vec![
                Decomposition::covered("k", "t"),
                Decomposition::uncovered("k", "t", "r"),
            ],
        )
    }

    fn board() -> PlanningBoard {
        PlanningBoard::new(vec![
            PlanningResult::new(section("Reading", "a"), vec![covered(0.9)]),
            PlanningResult::new(section("Writing", "b"), vec![partial(0.8)]),
            PlanningResult::new(section("Reading", "c"), vec![covered(0.4)]),
            PlanningResult::new(section("", "d"), vec![]),
        ])
    }

    #[test]
    fn progress_counts_assigned_sections() {
        let progress = board().progress();
        assert_eq!(progress, Progress { covered: 2, total: 4 });
        assert_eq!(progress.percentage(), 50);
    }

    #[test_case(0, 0, 0; "empty board")]
    #[test_case(1, 3, 33; "a third")]
    #[test_case(2, 3, 67; "two thirds")]
    #[test_case(3, 3, 100; "complete")]
    fn progress_percentage(covered: usize, total: usize, expected: usize) {
        assert_eq!(Progress { covered, total }.percentage(), expected);
    }

    #[test]
    fn applying_threshold_rederives_all_assignments() {
        let mut board = board();
        board.apply_threshold(Threshold::from_percent(50).unwrap());

        let pending: Vec<_> = board.results().iter().map(PlanningResult::is_pending).collect();
        assert_eq!(pending, [false, true, true, true]);
        assert_eq!(board.threshold().percent(), 50);
    }

    #[test_case(StatusFilter::All, &[0, 1, 2, 3]; "all")]
    #[test_case(StatusFilter::Covered, &[0, 2]; "covered")]
    #[test_case(StatusFilter::Pending, &[1, 3]; "pending")]
    fn filter_keeps_board_positions(filter: StatusFilter, expected: &[usize]) {
        let mut board = board();
        board.filter = filter;
        let positions: Vec<_> = board.filtered().map(|(index, _)| index).collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn groups_by_topic_in_first_appearance_order() {
        let board = board();
        let groups = board.by_topic();
        let summary: Vec<_> = groups
            .iter()
            .map(|group| {
                (
                    group.topic,
                    group.results.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            [
                ("Reading", vec![0, 2]),
                ("Writing", vec![1]),
                (UNKNOWN_TOPIC, vec![3]),
            ]
        );
    }

    #[test]
    fn choose_and_unassign_address_sections_by_position() {
        let mut board = board();
        board.choose(1, 0).unwrap();
        assert!(!board.result(1).unwrap().is_pending());

        board.unassign(0).unwrap();
        assert!(board.result(0).unwrap().is_pending());

        assert_eq!(board.unassign(9), Err(BoardError::SectionNotFound(9)));
        assert!(matches!(board.choose(0, 5), Err(BoardError::Assign(_))));
    }
}

//! Domain models for academic planning.
//!
//! This module contains the editable review material (indicators grouped by
//! learning outcome), the revision history, and the coverage and assignment
//! rules applied to the backend's planning suggestions.

/// Planning board: results, threshold, filters and progress.
pub mod board;
pub use board::{BoardError, PlanningBoard, Progress, StatusFilter, TopicGroup};

mod config;
pub use config::Config;

/// Conversations: a prompt and the review material generated for it.
pub mod conversation;
pub use conversation::{Conversation, EditError, IntroductionPhrase, Review};

pub mod coverage;
pub use coverage::{Coverage, CoverageLabel, Decomposition};

pub mod history;
pub use history::{Direction, History};

/// Indicators and indicator groups.
pub mod indicator;
pub use indicator::{Indicator, IndicatorBreakdown, IndicatorField, IndicatorGroup, IndicatorStatus};

pub mod planning;
pub use planning::{
    AssignError, ModuleResource, PlanningResult, RequiredSection, SuggestedSection, Threshold,
    ThresholdError, clean_section_name,
};

mod tools;
pub use tools::{Difficulty, IndicatorSize, Tools};

//! Curriculum planning review
//!
//! A prompt is decomposed by a workflow backend into learning indicators
//! grouped by outcome. The indicators are reviewed and edited across a
//! history of prompt revisions, then confirmed; the backend answers with
//! ranked section suggestions, which are assigned by coverage and score.

pub mod backend;
pub use backend::{BackendError, HttpWorkflow, Workflow};

pub mod domain;
pub use domain::{Config, Conversation, History, PlanningBoard, PlanningResult, Review};

/// The review session driving generations and confirmation.
pub mod session;
pub use session::{ReviewSession, SessionError, Ticket};

//! Access to the external workflow backend.
//!
//! The backend owns every heavy step (decomposition, similarity scoring,
//! curriculum search). This module only speaks its JSON contract and maps it
//! to and from the domain model.

mod client;
pub use client::{BackendError, HttpWorkflow, Workflow};

pub mod mapper;

pub mod wire;
pub use wire::ConfirmPayload;

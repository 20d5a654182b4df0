//! Symptom triage: severity scoring, urgency classification and the
//! canned reply for each urgency level.
//!
//! Everything here is pure. Inputs are the raw parameter strings from the
//! dialogue platform; nothing is cached or persisted.

pub mod classify;
pub mod responses;
pub mod severity;

pub use classify::*;
pub use responses::*;
pub use severity::*;

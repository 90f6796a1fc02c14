//! Read-only reporting over lead pipeline state.
//!
//! # Responsibility
//! - Expose aggregate views computed directly from the store.
//! - Keep report row shaping inside core.
//!
//! # Invariants
//! - Reports never mutate the store.

pub mod pipeline;

pub use pipeline::{
    closed_by_agent, pipeline_backlog, recently_closed, AgentClosedCount, ClosedLeadSummary,
    ReportError, ReportResult, RECENT_CLOSE_WINDOW_MS,
};

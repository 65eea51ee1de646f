//! # cohort-core
//!
//! Core types and the overlap analyzer for cohorts.
//!
//! This crate provides the foundational types shared across all cohorts crates:
//! - [`Cohort`], a named, de-duplicated set of member identifiers
//! - [`compute_overlap`], which partitions the union of all cohorts into
//!   cells keyed by membership [`Signature`]
//! - [`OverlapReport`] with query helpers for renderers
//! - Sharded accumulation ([`PartialOverlap`]) for large member volumes
//! - Cross-cutting error types
//!
//! The analyzer is a pure function of its input: no I/O, no shared state.

pub mod cohort;
pub mod errors;
pub mod overlap;
pub mod partial;
pub mod report;

pub use cohort::{Cohort, Identifier, cohorts_from_rows};
pub use errors::CoreError;
pub use overlap::{OverlapOptions, compute_overlap, compute_overlap_parallel, compute_overlap_with};
pub use partial::PartialOverlap;
pub use report::{CohortSummary, OverlapCell, OverlapReport, Signature};

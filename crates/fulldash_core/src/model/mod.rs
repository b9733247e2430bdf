//! Domain model for projects, contribution ledgers and revenue splits.
//!
//! # Responsibility
//! - Define the records shared by storage, the split engine and callers.
//! - Keep collaborator identity a closed two-member set.
//!
//! # Invariants
//! - Every project is identified by a stable `ProjectId`.
//! - At most one contribution exists per (project, collaborator).
//! - `RevenueSplit` and `Metrics` are computed values and never persisted.

pub mod contribution;
pub mod project;
pub mod split;

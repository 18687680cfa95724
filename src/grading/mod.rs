//! Course grade aggregation.
//!
//! Buckets submissions by assignment group, applies each group's
//! drop-lowest / drop-highest / never-drop rules, and combines the group
//! percentages by weight. When no group carries usable weight the grade is
//! the plain ratio of all counted points. Hypothetical scores can be layered
//! on top through [`Overrides`] for what-if projections.

pub mod aggregate;
pub mod projection;
pub mod types;
pub mod utility;

pub use aggregate::{GradeBreakdown, GradingMode, GroupResult, compute, compute_breakdown};
pub use projection::WhatIf;
pub use types::{Assignment, AssignmentGroup, GroupRules, Overrides, Submission};

//! Plain-text listings for the CLI.
//!
//! Assignment numbers printed here are 1-based positions in the snapshot and
//! are what the user types to set a what-if score.

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

use crate::courses::CourseSnapshot;
use crate::grading::{GradeBreakdown, GradingMode, WhatIf};

/// Prints any serializable value to stdout as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Formats an optional percentage with two decimals.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}%"),
        None => "n/a".to_string(),
    }
}

/// Lists every submission grouped by assignment group, in first-seen group
/// order, numbered by snapshot position.
pub fn render_assignments(snapshot: &CourseSnapshot) -> String {
    let mut order: Vec<Option<u64>> = Vec::new();
    for s in &snapshot.submissions {
        if !order.contains(&s.assignment.group_id) {
            order.push(s.assignment.group_id);
        }
    }

    let mut out = String::new();
    for group_id in order {
        let name = snapshot.group_name(group_id).unwrap_or("Unknown Group");
        let weight = group_id
            .and_then(|id| snapshot.groups.iter().find(|g| g.id == id))
            .map_or(0.0, |g| g.weight());
        let _ = writeln!(out, "\n{name} (Weight: {weight}%)");
        let _ = writeln!(out, "{}", "-".repeat(50));

        for (i, s) in snapshot.submissions.iter().enumerate() {
            if s.assignment.group_id != group_id {
                continue;
            }
            let title = s.assignment.name.as_deref().unwrap_or("Unknown Assignment");
            let possible = s.assignment.points_possible.unwrap_or(0.0);
            let omitted = if s.assignment.omit_from_final_grade { " (not counted)" } else { "" };
            match s.score {
                Some(score) => {
                    let _ = writeln!(out, "  {}. {title}: {score} / {possible} points{omitted}", i + 1);
                }
                None => {
                    let _ = writeln!(out, "  {}. {title}: Not graded / {possible} points{omitted}", i + 1);
                }
            }
        }
    }

    out
}

/// Per-group explanation of how a grade was reached.
pub fn render_breakdown(breakdown: &GradeBreakdown) -> String {
    let mut out = String::new();

    for group in &breakdown.groups {
        let Some(pct) = group.percentage else {
            continue;
        };
        let name = group.name.as_deref().unwrap_or("Unknown Group");
        let _ = writeln!(out, "\n{name}:");
        let _ = writeln!(out, "  Weight: {}%", group.weight);
        let _ = writeln!(
            out,
            "  Drop Lowest: {}, Drop Highest: {}",
            group.drop_lowest, group.drop_highest
        );
        let _ = writeln!(
            out,
            "  Assignments counted: {} (dropped: {})",
            group.counted,
            group.dropped()
        );
        let _ = writeln!(
            out,
            "  Score: {:.2} / {:.2} = {pct:.2}%",
            group.earned, group.possible
        );
        let _ = writeln!(out, "  Contribution: {:.2}%", group.contribution);
    }

    match breakdown.mode {
        GradingMode::Weighted => {
            let _ = writeln!(out, "\nTotal Weighted Grade: {:.2}%", breakdown.raw_weighted);
            let _ = writeln!(out, "Total Weight Used: {}%", breakdown.total_weight);
        }
        GradingMode::Unweighted => {
            let _ = writeln!(out, "\nNo group weights apply; all graded work counted equally.");
        }
    }

    out
}

/// Current and projected grade lines for a what-if run.
pub fn render_what_if(what_if: &WhatIf) -> String {
    let mut out = format!("Current grade: {}\n", format_percent(what_if.current));
    let _ = writeln!(out, "Projected grade: {}", format_percent(what_if.projected));
    if let Some(change) = what_if.change() {
        let _ = writeln!(out, "Change: {change:+.2}%");
    }
    out
}

use crate::grading::types::{AssignmentGroup, GroupRules, Overrides, Submission};
use crate::grading::utility::{percent, sum_points};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Group used for assignments whose `assignment_group_id` is absent or does
/// not match any known group: zero weight, no drop rules.
static UNGROUPED: AssignmentGroup = AssignmentGroup {
    id: 0,
    name: None,
    weight: None,
    rules: GroupRules {
        drop_lowest: None,
        drop_highest: None,
        never_drop: None,
    },
};

/// One submission that passed the inclusion filter.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Counted {
    pub(crate) earned: f64,
    pub(crate) possible: f64,
    pub(crate) percentage: f64,
}

/// Which branch of the algorithm produced the final grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingMode {
    /// Weighted by assignment group, normalized to the weight actually used.
    Weighted,
    /// No group carried usable weight; every counted item pooled together.
    Unweighted,
}

/// Scoring detail for one assignment group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupResult {
    pub group_id: Option<u64>,
    pub name: Option<String>,
    pub weight: f64,
    pub drop_lowest: usize,
    pub drop_highest: usize,
    /// Items that passed the inclusion filter.
    pub included: usize,
    /// Items left after drop rules.
    pub counted: usize,
    pub earned: f64,
    pub possible: f64,
    /// `None` when the counted items carry no possible points.
    pub percentage: Option<f64>,
    /// Points this group adds to the raw weighted grade.
    pub contribution: f64,
}

impl GroupResult {
    pub fn dropped(&self) -> usize {
        self.included - self.counted
    }
}

/// A computed grade together with how it was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeBreakdown {
    pub mode: GradingMode,
    pub groups: Vec<GroupResult>,
    /// Sum of weights of groups that contributed.
    pub total_weight: f64,
    /// Weighted grade before normalization.
    pub raw_weighted: f64,
    /// Final percentage; `None` when there is nothing gradable.
    pub grade: Option<f64>,
}

/// Computes the course percentage for `submissions`.
///
/// Returns `None` only when no submission can be graded: every one is
/// ungraded, omitted from the final grade, or worth no points.
pub fn compute(
    submissions: &[Submission],
    groups: &[AssignmentGroup],
    overrides: Option<&Overrides>,
) -> Option<f64> {
    compute_breakdown(submissions, groups, overrides).grade
}

/// Same as [`compute`], keeping the per-group detail.
pub fn compute_breakdown(
    submissions: &[Submission],
    groups: &[AssignmentGroup],
    overrides: Option<&Overrides>,
) -> GradeBreakdown {
    let empty = Overrides::default();
    let overrides = overrides.unwrap_or(&empty);

    let group_map: HashMap<u64, &AssignmentGroup> = groups.iter().map(|g| (g.id, g)).collect();
    let buckets = partition(submissions);

    let mut results = Vec::with_capacity(buckets.len());
    let mut weighted_grade = 0.0;
    let mut total_weight = 0.0;

    for (group_id, members) in &buckets {
        let group = group_id
            .and_then(|id| group_map.get(&id).copied())
            .unwrap_or(&UNGROUPED);

        let result = score_group(*group_id, group, members, overrides);

        if let Some(pct) = result.percentage {
            weighted_grade += result.contribution;
            total_weight += result.weight;

            debug!(
                group_id = ?group_id,
                group = group.name.as_deref().unwrap_or("Unknown Group"),
                weight = result.weight,
                drop_lowest = result.drop_lowest,
                drop_highest = result.drop_highest,
                counted = result.counted,
                dropped = result.dropped(),
                earned = result.earned,
                possible = result.possible,
                percentage = pct,
                contribution = result.contribution,
                "Group scored"
            );
        }

        results.push(result);
    }

    debug!(weighted_grade, total_weight, "Weighted pass complete");

    if total_weight == 0.0 {
        let pool: Vec<Counted> = buckets
            .iter()
            .flat_map(|(_, members)| members.iter())
            .filter_map(|(index, submission)| counted(*index, submission, overrides))
            .collect();

        let grade = if pool.is_empty() {
            None
        } else {
            let (earned, possible) = sum_points(&pool);
            Some(percent(earned, possible))
        };

        debug!(items = pool.len(), grade = ?grade, "Fell back to unweighted pool");

        return GradeBreakdown {
            mode: GradingMode::Unweighted,
            groups: results,
            total_weight,
            raw_weighted: weighted_grade,
            grade,
        };
    }

    let grade = if total_weight != 100.0 {
        weighted_grade / total_weight * 100.0
    } else {
        weighted_grade
    };

    GradeBreakdown {
        mode: GradingMode::Weighted,
        groups: results,
        total_weight,
        raw_weighted: weighted_grade,
        grade: Some(grade),
    }
}

/// Buckets submissions by group id in first-seen order, skipping anything
/// omitted from the final grade. Each entry keeps its original index.
fn partition(submissions: &[Submission]) -> Vec<(Option<u64>, Vec<(usize, &Submission)>)> {
    let mut buckets: Vec<(Option<u64>, Vec<(usize, &Submission)>)> = Vec::new();
    let mut positions: HashMap<Option<u64>, usize> = HashMap::new();

    for (index, submission) in submissions.iter().enumerate() {
        if submission.assignment.omit_from_final_grade {
            continue;
        }

        let group_id = submission.assignment.group_id;
        let slot = *positions.entry(group_id).or_insert_with(|| {
            buckets.push((group_id, Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push((index, submission));
    }

    buckets
}

/// Applies the override and inclusion filter to one submission.
fn counted(index: usize, submission: &Submission, overrides: &Overrides) -> Option<Counted> {
    let possible = submission.assignment.countable_points()?;
    let earned = overrides.effective_score(index, submission)?;

    Some(Counted {
        earned,
        possible,
        percentage: percent(earned, possible),
    })
}

fn score_group(
    group_id: Option<u64>,
    group: &AssignmentGroup,
    members: &[(usize, &Submission)],
    overrides: &Overrides,
) -> GroupResult {
    let weight = group.weight();
    let drop_lowest = group.drop_lowest();
    let drop_highest = group.drop_highest();

    let mut keep = Vec::new();
    let mut droppable = Vec::new();

    for (index, submission) in members {
        let Some(item) = counted(*index, submission, overrides) else {
            continue;
        };
        if group.never_drops(submission.assignment.id) {
            keep.push(item);
        } else {
            droppable.push(item);
        }
    }

    let included = keep.len() + droppable.len();

    // `+ 0.0` folds -0.0 into 0.0 so the two tie and keep input order.
    droppable.sort_by(|a, b| (a.percentage + 0.0).total_cmp(&(b.percentage + 0.0)));
    let survivors = apply_drop_rules(&droppable, drop_lowest, drop_highest);
    keep.extend_from_slice(survivors);

    let (earned, possible) = sum_points(&keep);
    let percentage = (!keep.is_empty() && possible > 0.0).then(|| percent(earned, possible));
    let contribution = percentage.map_or(0.0, |pct| pct * weight / 100.0);

    GroupResult {
        group_id,
        name: group.name.clone(),
        weight,
        drop_lowest,
        drop_highest,
        included,
        counted: keep.len(),
        earned,
        possible,
        percentage,
        contribution,
    }
}

/// Trims a list sorted ascending by percentage. Lowest entries go first, then
/// highest entries from what remains; a step that would empty the list is
/// skipped entirely.
pub(crate) fn apply_drop_rules(sorted: &[Counted], drop_lowest: usize, drop_highest: usize) -> &[Counted] {
    let mut remaining = sorted;

    if drop_lowest > 0 && remaining.len() > drop_lowest {
        remaining = &remaining[drop_lowest..];
    }

    if drop_highest > 0 && remaining.len() > drop_highest {
        remaining = &remaining[..remaining.len() - drop_highest];
    }

    remaining
}

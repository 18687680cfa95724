//! Data types consumed and produced by the grade aggregator.
//!
//! Field names follow the Canvas REST payloads so the same types deserialize
//! straight from `students/submissions?include[]=assignment` and
//! `assignment_groups` responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Static metadata for a gradable item.
///
/// Every field is optional on the wire; a submission whose assignment was not
/// included by Canvas deserializes to `Assignment::default()`, which never
/// contributes to a grade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "assignment_group_id")]
    pub group_id: Option<u64>,
    #[serde(default)]
    pub points_possible: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub omit_from_final_grade: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
}

impl Assignment {
    /// Points possible when strictly positive; anything else means the
    /// assignment cannot contribute.
    pub fn countable_points(&self) -> Option<f64> {
        self.points_possible.filter(|p| *p > 0.0)
    }
}

/// An observed result for one assignment, paired with its metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assignment: Assignment,
}

impl Submission {
    pub fn new(score: Option<f64>, assignment: Assignment) -> Self {
        Self { score, assignment }
    }
}

/// Drop rules attached to an assignment group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_lowest: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_highest: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub never_drop: Option<Vec<u64>>,
}

/// A weighting bucket of assignments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentGroup {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "group_weight")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: GroupRules,
}

impl AssignmentGroup {
    pub fn weight(&self) -> f64 {
        self.weight.unwrap_or(0.0)
    }

    pub fn drop_lowest(&self) -> usize {
        self.rules.drop_lowest.unwrap_or(0)
    }

    pub fn drop_highest(&self) -> usize {
        self.rules.drop_highest.unwrap_or(0)
    }

    pub fn never_drops(&self, assignment_id: Option<u64>) -> bool {
        match (assignment_id, &self.rules.never_drop) {
            (Some(id), Some(ids)) => ids.contains(&id),
            _ => false,
        }
    }
}

/// Hypothetical scores keyed by the submission's position in the input
/// sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overrides(BTreeMap<usize, f64>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, index: usize, score: f64) {
        self.0.insert(index, score);
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(&index).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Score to grade `submission` at `index` with: the override when one is
    /// set, else the recorded score.
    pub fn effective_score(&self, index: usize, submission: &Submission) -> Option<f64> {
        self.get(index).or(submission.score)
    }
}

impl FromIterator<(usize, f64)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (usize, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submission_from_canvas_payload() {
        let raw = json!({
            "id": 991,
            "score": 8.5,
            "workflow_state": "graded",
            "assignment": {
                "id": 12,
                "name": "Lab 1",
                "assignment_group_id": 3,
                "points_possible": 10.0,
                "omit_from_final_grade": false,
                "due_at": "2025-09-01T06:59:59Z"
            }
        });

        let submission: Submission = serde_json::from_value(raw).unwrap();

        assert_eq!(submission.score, Some(8.5));
        assert_eq!(submission.assignment.id, Some(12));
        assert_eq!(submission.assignment.group_id, Some(3));
        assert_eq!(submission.assignment.countable_points(), Some(10.0));
        assert!(submission.assignment.due_at.is_some());
    }

    #[test]
    fn test_missing_and_null_fields_degrade() {
        let submission: Submission =
            serde_json::from_value(json!({ "score": null, "assignment": null })).unwrap();
        assert_eq!(submission, Submission::default());

        let assignment: Assignment = serde_json::from_value(json!({
            "id": 4,
            "points_possible": null,
            "omit_from_final_grade": null
        }))
        .unwrap();
        assert_eq!(assignment.countable_points(), None);
        assert!(!assignment.omit_from_final_grade);
    }

    #[test]
    fn test_non_positive_points_are_not_countable() {
        let zero = Assignment { points_possible: Some(0.0), ..Default::default() };
        let negative = Assignment { points_possible: Some(-5.0), ..Default::default() };
        assert_eq!(zero.countable_points(), None);
        assert_eq!(negative.countable_points(), None);
    }

    #[test]
    fn test_group_rules_from_canvas_payload() {
        let group: AssignmentGroup = serde_json::from_value(json!({
            "id": 3,
            "name": "Quizzes",
            "group_weight": 25.0,
            "rules": { "drop_lowest": 2, "never_drop": [12, 13] }
        }))
        .unwrap();

        assert_eq!(group.weight(), 25.0);
        assert_eq!(group.drop_lowest(), 2);
        assert_eq!(group.drop_highest(), 0);
        assert!(group.never_drops(Some(13)));
        assert!(!group.never_drops(Some(14)));
        assert!(!group.never_drops(None));
    }

    #[test]
    fn test_group_with_empty_rules() {
        let group: AssignmentGroup =
            serde_json::from_value(json!({ "id": 1, "group_weight": null, "rules": {} }))
                .unwrap();
        assert_eq!(group.weight(), 0.0);
        assert_eq!(group.drop_lowest(), 0);
        assert!(!group.never_drops(Some(1)));
    }

    #[test]
    fn test_override_takes_precedence() {
        let graded = Submission::new(Some(4.0), Assignment::default());
        let ungraded = Submission::new(None, Assignment::default());
        let overrides: Overrides = [(1, 9.0)].into_iter().collect();

        assert_eq!(overrides.effective_score(0, &graded), Some(4.0));
        assert_eq!(overrides.effective_score(1, &ungraded), Some(9.0));
        assert_eq!(overrides.effective_score(2, &ungraded), None);
    }
}

//! Trait and types for reading grading data from a Canvas instance.

use crate::grading::{AssignmentGroup, Submission};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// An enrollment as returned with `include[]=total_scores`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Enrollment {
    #[serde(default)]
    pub computed_current_score: Option<f64>,
    #[serde(default)]
    pub computed_current_grade: Option<String>,
}

/// Raw course record from `users/{user}/courses`.
#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub enrollments: Option<Vec<Enrollment>>,
}

/// A course with the grade Canvas itself reports for the student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    pub id: u64,
    pub name: String,
    pub current_score: Option<f64>,
    pub current_grade: Option<String>,
}

impl From<Course> for CourseSummary {
    /// Takes score and letter grade from the last enrollment that reports a
    /// computed score.
    fn from(course: Course) -> Self {
        let scored = course
            .enrollments
            .unwrap_or_default()
            .into_iter()
            .filter(|e| e.computed_current_score.is_some())
            .last();

        Self {
            id: course.id,
            name: course.name.unwrap_or_else(|| "Unnamed Course".to_string()),
            current_score: scored.as_ref().and_then(|e| e.computed_current_score),
            current_grade: scored.and_then(|e| e.computed_current_grade),
        }
    }
}

/// Abstraction over the Canvas endpoints the grade calculator reads.
#[async_trait::async_trait]
pub trait CanvasApi: Send + Sync {
    /// Active courses of the session's user, with Canvas's current grade.
    async fn list_courses(&self) -> Result<Vec<CourseSummary>>;

    /// Every submission of the session's user in `course_id`, each carrying
    /// its assignment.
    async fn list_submissions(&self, course_id: u64) -> Result<Vec<Submission>>;

    /// Assignment groups of `course_id` with weights and drop rules.
    async fn list_assignment_groups(&self, course_id: u64) -> Result<Vec<AssignmentGroup>>;
}

//! Loading courses from Canvas and grading them, one or many at a time.

use crate::canvas::{CanvasApi, CourseSummary};
use crate::grading::{
    AssignmentGroup, GradeBreakdown, Overrides, Submission, WhatIf, compute, compute_breakdown,
};
use anyhow::{Result, anyhow};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{Instrument, error, info};

/// Everything fetched for one course.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CourseSnapshot {
    pub course_id: u64,
    /// Ordered by assignment due date, undated last. Override indices refer
    /// to this order.
    pub submissions: Vec<Submission>,
    pub groups: Vec<AssignmentGroup>,
}

impl CourseSnapshot {
    pub fn new(course_id: u64, mut submissions: Vec<Submission>, groups: Vec<AssignmentGroup>) -> Self {
        sort_by_due_date(&mut submissions);
        Self { course_id, submissions, groups }
    }

    pub fn grade(&self) -> Option<f64> {
        compute(&self.submissions, &self.groups, None)
    }

    pub fn breakdown(&self, overrides: Option<&Overrides>) -> GradeBreakdown {
        compute_breakdown(&self.submissions, &self.groups, overrides)
    }

    pub fn what_if(&self, overrides: &Overrides) -> WhatIf {
        WhatIf::project(&self.submissions, &self.groups, overrides)
    }

    /// Name of the group `group_id` belongs to, for listings.
    pub fn group_name(&self, group_id: Option<u64>) -> Option<&str> {
        let id = group_id?;
        self.groups
            .iter()
            .find(|g| g.id == id)
            .and_then(|g| g.name.as_deref())
    }
}

/// Stable sort by due date; submissions without one keep their relative
/// order after every dated submission.
pub fn sort_by_due_date(submissions: &mut [Submission]) {
    submissions.sort_by_key(|s| (s.assignment.due_at.is_none(), s.assignment.due_at));
}

/// Fetches submissions and assignment groups of `course_id` concurrently.
#[tracing::instrument(skip(api))]
pub async fn load_snapshot<A>(api: &A, course_id: u64) -> Result<CourseSnapshot>
where
    A: CanvasApi + ?Sized,
{
    let (submissions, groups) = tokio::try_join!(
        api.list_submissions(course_id),
        api.list_assignment_groups(course_id)
    )?;

    Ok(CourseSnapshot::new(course_id, submissions, groups))
}

/// Outcome of grading one course in [`grade_courses`].
#[derive(Debug, Serialize)]
pub struct CourseGrade {
    pub course: CourseSummary,
    /// Grade computed locally; `None` when nothing is gradable yet.
    pub grade: Option<f64>,
    /// Set when the course could not be loaded.
    pub error: Option<String>,
}

/// Loads and grades every course, at most `concurrency` at a time.
///
/// Results come back in the order of `courses`. A course that fails to load
/// is reported in its entry and does not stop the others.
#[tracing::instrument(skip(api, courses), fields(courses = courses.len()))]
pub async fn grade_courses(
    api: Arc<dyn CanvasApi>,
    courses: Vec<CourseSummary>,
    concurrency: usize,
) -> Vec<CourseGrade> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = Vec::with_capacity(courses.len());

    for course in &courses {
        let sem = semaphore.clone();
        let api = api.clone();
        let course_id = course.id;

        let course_span = tracing::info_span!(
            "grade_course",
            course_id,
            course_name = %course.name,
        );

        let task = tokio::spawn(
            async move {
                let _permit = sem.acquire_owned().await?;
                let snapshot = load_snapshot(api.as_ref(), course_id).await?;
                let grade = snapshot.grade();
                info!(grade = ?grade, submissions = snapshot.submissions.len(), "Course graded");
                Ok::<_, anyhow::Error>(grade)
            }
            .instrument(course_span),
        );

        tasks.push(task);
    }

    let mut results = Vec::with_capacity(courses.len());
    for (course, task) in courses.into_iter().zip(tasks) {
        let outcome = task
            .await
            .map_err(|e| anyhow!("Grading task failed: {e}"))
            .and_then(|inner| inner);

        match outcome {
            Ok(grade) => results.push(CourseGrade { course, grade, error: None }),
            Err(e) => {
                error!(course_id = course.id, error = %e, "Failed to grade course");
                results.push(CourseGrade { course, grade: None, error: Some(format!("{e:#}")) });
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::Assignment;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn due(id: u64, day: Option<u32>) -> Submission {
        Submission::new(
            Some(1.0),
            Assignment {
                id: Some(id),
                points_possible: Some(1.0),
                due_at: day.map(|d| Utc.with_ymd_and_hms(2025, 9, d, 12, 0, 0).unwrap()),
                ..Default::default()
            },
        )
    }

    fn ids(submissions: &[Submission]) -> Vec<u64> {
        submissions.iter().filter_map(|s| s.assignment.id).collect()
    }

    #[test]
    fn test_sort_by_due_date_puts_undated_last() {
        let mut submissions = vec![due(1, None), due(2, Some(20)), due(3, Some(5)), due(4, None), due(5, Some(5))];

        sort_by_due_date(&mut submissions);

        assert_eq!(ids(&submissions), vec![3, 5, 2, 1, 4]);
    }

    /// Serves fixed data per course and tracks how many loads overlap.
    struct FakeCanvas {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeCanvas {
        fn new() -> Self {
            Self { in_flight: AtomicUsize::new(0), peak: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl CanvasApi for FakeCanvas {
        async fn list_courses(&self) -> Result<Vec<CourseSummary>> {
            Ok(Vec::new())
        }

        async fn list_submissions(&self, course_id: u64) -> Result<Vec<Submission>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            // Later courses finish first so ordering is actually exercised.
            tokio::time::sleep(Duration::from_millis(40 - course_id * 5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if course_id == 3 {
                return Err(anyhow!("course 3 is unavailable"));
            }
            let score = course_id as f64;
            Ok(vec![Submission::new(
                Some(score),
                Assignment { points_possible: Some(10.0), ..Default::default() },
            )])
        }

        async fn list_assignment_groups(&self, _course_id: u64) -> Result<Vec<AssignmentGroup>> {
            Ok(Vec::new())
        }
    }

    fn summary(id: u64) -> CourseSummary {
        CourseSummary { id, name: format!("Course {id}"), current_score: None, current_grade: None }
    }

    #[tokio::test]
    async fn test_grade_courses_keeps_order_and_isolates_failures() {
        let fake = Arc::new(FakeCanvas::new());
        let courses = (1..=6).map(summary).collect();

        let results = grade_courses(fake.clone(), courses, 2).await;

        let order: Vec<u64> = results.iter().map(|r| r.course.id).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(results[0].grade, Some(10.0));
        assert_eq!(results[4].grade, Some(50.0));
        assert!(results[2].error.as_deref().unwrap().contains("unavailable"));
        assert!(results.iter().filter(|r| r.error.is_some()).count() == 1);
        assert!(fake.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_load_snapshot_sorts_submissions() {
        struct Fixed;

        #[async_trait]
        impl CanvasApi for Fixed {
            async fn list_courses(&self) -> Result<Vec<CourseSummary>> {
                Ok(Vec::new())
            }
            async fn list_submissions(&self, _course_id: u64) -> Result<Vec<Submission>> {
                Ok(vec![due(1, None), due(2, Some(3))])
            }
            async fn list_assignment_groups(&self, _course_id: u64) -> Result<Vec<AssignmentGroup>> {
                Ok(vec![AssignmentGroup { id: 1, name: Some("Labs".into()), ..Default::default() }])
            }
        }

        let snapshot = load_snapshot(&Fixed, 11).await.unwrap();

        assert_eq!(snapshot.course_id, 11);
        assert_eq!(ids(&snapshot.submissions), vec![2, 1]);
        assert_eq!(snapshot.group_name(Some(1)), Some("Labs"));
        assert_eq!(snapshot.group_name(None), None);
        assert_eq!(snapshot.grade(), Some(100.0));
    }
}

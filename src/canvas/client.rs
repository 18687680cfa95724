use crate::canvas::api::{CanvasApi, Course, CourseSummary};
use crate::fetch::{DEFAULT_MAX_PAGES, HttpClient, fetch_all};
use crate::grading::{AssignmentGroup, Submission};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

/// [`CanvasApi`] over the Canvas REST API (`/api/v1`).
///
/// Authentication is the transport's concern: wrap the client in
/// [`crate::fetch::BearerAuth`] before handing it over.
pub struct CanvasClient<C> {
    http: C,
    base_url: String,
    user_id: String,
}

impl<C: HttpClient> CanvasClient<C> {
    pub fn new(http: C, base_url: &str, user_id: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        }
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}/{}", self.base_url, path_and_query)
    }
}

#[async_trait]
impl<C: HttpClient> CanvasApi for CanvasClient<C> {
    async fn list_courses(&self) -> Result<Vec<CourseSummary>> {
        let url = self.url(&format!(
            "users/{}/courses?enrollment_state=active&include[]=enrollments&include[]=total_scores",
            self.user_id
        ));

        let courses: Vec<Course> = fetch_all(&self.http, &url, DEFAULT_MAX_PAGES)
            .await
            .context("Failed to list courses")?;

        info!(count = courses.len(), "Courses fetched");
        Ok(courses.into_iter().map(CourseSummary::from).collect())
    }

    async fn list_submissions(&self, course_id: u64) -> Result<Vec<Submission>> {
        let url = self.url(&format!(
            "courses/{course_id}/students/submissions?student_ids[]={}&include[]=assignment&per_page=100",
            self.user_id
        ));

        let submissions: Vec<Submission> = fetch_all(&self.http, &url, DEFAULT_MAX_PAGES)
            .await
            .with_context(|| format!("Failed to list submissions for course {course_id}"))?;

        info!(course_id, count = submissions.len(), "Submissions fetched");
        Ok(submissions)
    }

    async fn list_assignment_groups(&self, course_id: u64) -> Result<Vec<AssignmentGroup>> {
        let url = self.url(&format!("courses/{course_id}/assignment_groups?include[]=assignments"));

        let groups: Vec<AssignmentGroup> = fetch_all(&self.http, &url, DEFAULT_MAX_PAGES)
            .await
            .with_context(|| format!("Failed to list assignment groups for course {course_id}"))?;

        info!(course_id, count = groups.len(), "Assignment groups fetched");
        Ok(groups)
    }
}

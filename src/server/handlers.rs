use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::canvas::{CanvasApi, CanvasClient, CanvasSession, CourseSummary, SessionTransport};
use crate::grading::{AssignmentGroup, Overrides, Submission, compute};
use crate::server::errors::ApiError;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct TokenBody {
    #[serde(default)]
    token: Option<String>,
}

/// Body of `POST /api/calculate-grade`; also the file format read by the
/// CLI's `calc` command.
#[derive(Debug, Default, Deserialize)]
pub struct CalculateGradeRequest {
    #[serde(default)]
    pub assignments: Vec<Submission>,
    #[serde(default)]
    pub assignment_groups: Vec<AssignmentGroup>,
    /// Keys are decimal submission indices, values replacement scores.
    #[serde(default)]
    pub modifications: HashMap<String, Value>,
}

impl CalculateGradeRequest {
    /// Converts `modifications` into [`Overrides`], rejecting keys that are
    /// not non-negative integers, values that are not numbers, and keys
    /// such as `"1"` and `"01"` that name the same index.
    pub fn overrides(&self) -> Result<Overrides, String> {
        let mut overrides = Overrides::new();
        for (key, value) in &self.modifications {
            let index = key
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("Invalid modification index '{key}'"))?;
            let score = value
                .as_f64()
                .ok_or_else(|| format!("Modification for '{key}' must be a number, got {value}"))?;
            if overrides.get(index).is_some() {
                return Err(format!("Duplicate modification for index {index}"));
            }
            overrides.set(index, score);
        }
        Ok(overrides)
    }

    pub fn grade(&self) -> Result<Option<f64>, String> {
        let overrides = self.overrides()?;
        Ok(compute(&self.assignments, &self.assignment_groups, Some(&overrides)))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GradeResponse {
    grade: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

fn canvas_client(state: &AppState, body: &TokenBody) -> Result<CanvasClient<SessionTransport>, ApiError> {
    let token = body.token.as_deref().unwrap_or_default();
    if token.trim().is_empty() {
        return Err(ApiError::BadRequest("Token required".to_string()));
    }

    CanvasSession::new(state.settings(), token)
        .and_then(|session| session.client(state.http()))
        .map_err(|e| ApiError::BadRequest(format!("{e:#}")))
}

pub(crate) async fn courses(
    State(state): State<AppState>,
    Json(body): Json<TokenBody>,
) -> Result<Json<Vec<CourseSummary>>, ApiError> {
    let client = canvas_client(&state, &body)?;
    let courses = client
        .list_courses()
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to fetch courses"))?;
    Ok(Json(courses))
}

pub(crate) async fn assignments(
    State(state): State<AppState>,
    Path(course_id): Path<u64>,
    Json(body): Json<TokenBody>,
) -> Result<Json<Vec<Submission>>, ApiError> {
    let client = canvas_client(&state, &body)?;
    let submissions = client
        .list_submissions(course_id)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to fetch assignments"))?;
    Ok(Json(submissions))
}

pub(crate) async fn groups(
    State(state): State<AppState>,
    Path(course_id): Path<u64>,
    Json(body): Json<TokenBody>,
) -> Result<Json<Vec<AssignmentGroup>>, ApiError> {
    let client = canvas_client(&state, &body)?;
    let groups = client
        .list_assignment_groups(course_id)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to fetch assignment groups"))?;
    Ok(Json(groups))
}

pub(crate) async fn calculate_grade(
    Json(request): Json<CalculateGradeRequest>,
) -> Result<Json<GradeResponse>, ApiError> {
    let grade = request.grade().map_err(ApiError::BadRequest)?;
    Ok(Json(GradeResponse { grade }))
}

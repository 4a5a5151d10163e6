//! Faculty HTTP handlers

use axum::extract::State;
use axum::Json;

use crate::db::FacultyRepo;
use crate::models::{CreateFaculty, Faculty};
use crate::state::AppState;
use crate::Result;

pub async fn list_faculties(State(state): State<AppState>) -> Result<Json<Vec<Faculty>>> {
    let faculties = FacultyRepo::new(state.pool()).list().await?;

    Ok(Json(faculties))
}

pub async fn create_faculty(
    State(state): State<AppState>,
    Json(input): Json<CreateFaculty>,
) -> Result<Json<Faculty>> {
    let faculty = FacultyRepo::new(state.pool()).create(input).await?;

    Ok(Json(faculty))
}

//! Branch HTTP handlers

use axum::extract::{Path, State};
use axum::Json;

use crate::db::BranchRepo;
use crate::models::{Branch, CreateBranch};
use crate::state::AppState;
use crate::{Error, Result};

pub async fn list_branches(State(state): State<AppState>) -> Result<Json<Vec<Branch>>> {
    let branches = BranchRepo::new(state.pool()).list().await?;

    Ok(Json(branches))
}

pub async fn get_branch(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
) -> Result<Json<Branch>> {
    let branch = BranchRepo::new(state.pool())
        .get(branch_id)
        .await?
        .ok_or_else(|| Error::BranchNotFound(format!("id {branch_id}")))?;

    Ok(Json(branch))
}

pub async fn create_branch(
    State(state): State<AppState>,
    Json(input): Json<CreateBranch>,
) -> Result<Json<Branch>> {
    let branch = BranchRepo::new(state.pool()).create(input).await?;

    Ok(Json(branch))
}

/// Full-field overwrite, not a partial update.
pub async fn update_branch(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
    Json(input): Json<CreateBranch>,
) -> Result<Json<Branch>> {
    let branch = BranchRepo::new(state.pool()).update(branch_id, input).await?;

    Ok(Json(branch))
}

//! Book HTTP handlers

use axum::extract::{Path, State};
use axum::Json;

use crate::db::BookRepo;
use crate::models::{
    BookFacultiesInfo, BookWithFaculties, BranchCopiesCount, CreateBook, UpdateBook,
};
use crate::state::AppState;
use crate::{Error, Result};

pub async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<BookWithFaculties>>> {
    let books = BookRepo::new(state.pool()).list().await?;

    Ok(Json(books))
}

/// Absence from the pure repository lookup becomes a 404 at this boundary.
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> Result<Json<BookWithFaculties>> {
    let book = BookRepo::new(state.pool())
        .get(book_id)
        .await?
        .ok_or_else(|| Error::BookNotFound(format!("id {book_id}")))?;

    Ok(Json(book))
}

pub async fn create_book(
    State(state): State<AppState>,
    Json(input): Json<CreateBook>,
) -> Result<Json<BookWithFaculties>> {
    let book = BookRepo::new(state.pool()).create(input).await?;

    Ok(Json(book))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
    Json(patch): Json<UpdateBook>,
) -> Result<Json<BookWithFaculties>> {
    let book = BookRepo::new(state.pool()).update(book_id, patch).await?;

    Ok(Json(book))
}

/// Returns the deleted record snapshot.
pub async fn delete_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> Result<Json<BookWithFaculties>> {
    let book = BookRepo::new(state.pool()).delete(book_id).await?;

    Ok(Json(book))
}

pub async fn book_copies_in_branch(
    State(state): State<AppState>,
    Path((branch_name, book_title)): Path<(String, String)>,
) -> Result<Json<BranchCopiesCount>> {
    let copies_count = BookRepo::new(state.pool())
        .copies_in_branch(&branch_name, &book_title)
        .await?;

    Ok(Json(BranchCopiesCount {
        branch_name,
        book_title,
        copies_count,
    }))
}

pub async fn book_faculties_in_branch(
    State(state): State<AppState>,
    Path((book_title, branch_name)): Path<(String, String)>,
) -> Result<Json<BookFacultiesInfo>> {
    let info = BookRepo::new(state.pool())
        .faculties_in_branch(&book_title, &branch_name)
        .await?;

    Ok(Json(info))
}

//! Route handlers for the record API
//!
//! Organized by resource type:
//! - books: book CRUD plus the two derived branch queries
//! - branches: branch CRUD (no delete)
//! - faculties: faculty create/list
//! - health: liveness and welcome endpoints

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub mod books;
pub mod branches;
pub mod faculties;
pub mod health;

/// All API routes
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/{book}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Branches
        .route(
            "/branches",
            get(branches::list_branches).post(branches::create_branch),
        )
        .route(
            "/branches/{branch}",
            get(branches::get_branch).put(branches::update_branch),
        )
        // Faculties
        .route(
            "/faculties",
            get(faculties::list_faculties).post(faculties::create_faculty),
        )
        // Derived queries
        .route(
            "/branches/{branch}/books/{book}/copies",
            get(books::book_copies_in_branch),
        )
        .route(
            "/books/{book}/branches/{branch}/faculties",
            get(books::book_faculties_in_branch),
        )
}

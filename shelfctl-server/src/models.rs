//! Record data models
//!
//! Entities managed by the record API:
//! - Branches: physical library locations owning books
//! - Books: catalogued titles, each belonging to one branch
//! - Faculties: subject-area tags, many-to-many with books

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

// ============================================================================
// Branches
// ============================================================================

/// A branch is a physical library location owning a subset of books
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Branch {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a branch. Also the full-overwrite input for
/// `PUT /branches/{id}`: every field replaces the stored value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBranch {
    pub name: String,
    pub address: Option<String>,
}

// ============================================================================
// Faculties
// ============================================================================

/// A faculty is an academic subject-area tag associated with books
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Faculty {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFaculty {
    pub name: String,
}

// ============================================================================
// Books
// ============================================================================

/// A book row. The faculty associations live in a separate join table and
/// are carried by [`BookWithFaculties`] in API responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub pages: Option<i32>,
    pub illustrations: Option<i32>,
    pub price: Option<f64>,
    pub branch_id: i64,
    pub copies_available: i32,
    pub students_borrowed_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub pages: Option<i32>,
    pub illustrations: Option<i32>,
    pub price: Option<f64>,
    pub branch_id: i64,
    #[serde(default)]
    pub copies_available: i32,
    #[serde(default)]
    pub students_borrowed_count: i32,
    /// Faculty ids to associate; every id must resolve to an existing faculty
    pub faculty_ids: Option<Vec<i64>>,
}

/// Partial update for a book. A field left out of the payload is not
/// touched; for nullable columns an explicit JSON `null` clears the value,
/// which is why those fields are double-wrapped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(default, deserialize_with = "some_or_null")]
    pub publisher: Option<Option<String>>,
    #[serde(default, deserialize_with = "some_or_null")]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "some_or_null")]
    pub pages: Option<Option<i32>>,
    #[serde(default, deserialize_with = "some_or_null")]
    pub illustrations: Option<Option<i32>>,
    #[serde(default, deserialize_with = "some_or_null")]
    pub price: Option<Option<f64>>,
    pub branch_id: Option<i64>,
    pub copies_available: Option<i32>,
    pub students_borrowed_count: Option<i32>,
    /// Full replacement of the faculty set when present, not a merge
    pub faculty_ids: Option<Vec<i64>>,
}

/// Deserializes a present-but-possibly-null field into `Some(value)`, so
/// the outer `None` is reserved for keys absent from the payload.
fn some_or_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateBook {
    /// Deterministic field-by-field merge onto a stored record.
    ///
    /// Faculty ids are not handled here; the repository validates and
    /// replaces the association set separately.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(publisher) = &self.publisher {
            book.publisher = publisher.clone();
        }
        if let Some(year) = self.year {
            book.year = year;
        }
        if let Some(pages) = self.pages {
            book.pages = pages;
        }
        if let Some(illustrations) = self.illustrations {
            book.illustrations = illustrations;
        }
        if let Some(price) = self.price {
            book.price = price;
        }
        if let Some(branch_id) = self.branch_id {
            book.branch_id = branch_id;
        }
        if let Some(copies) = self.copies_available {
            book.copies_available = copies;
        }
        if let Some(borrowed) = self.students_borrowed_count {
            book.students_borrowed_count = borrowed;
        }
    }
}

// ============================================================================
// Response types
// ============================================================================

/// Book with its materialized faculty associations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookWithFaculties {
    #[serde(flatten)]
    pub book: Book,
    pub faculties: Vec<Faculty>,
}

/// Copy count for a titled book in a named branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCopiesCount {
    pub branch_name: String,
    pub book_title: String,
    pub copies_count: i32,
}

/// Faculty listing for a titled book in a named branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookFacultiesInfo {
    pub book_title: String,
    pub branch_name: String,
    pub faculties_count: i64,
    pub faculties: Vec<String>,
}

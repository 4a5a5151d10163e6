//! Book repository
//!
//! Carries the ordered validation chain for book writes:
//! branch exists -> no (title, author, branch) duplicate -> faculty ids
//! resolve. All of it runs inside the write's own transaction.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::error::{Error, Result};
use crate::models::{Book, BookFacultiesInfo, BookWithFaculties, Branch, CreateBook, Faculty, UpdateBook};

use super::{dedup_ids, is_fk_violation, is_unique_violation};

/// Book repository
pub struct BookRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> BookRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Pure lookup by id; absence is not an error.
    pub async fn get(&self, id: i64) -> Result<Option<BookWithFaculties>> {
        let book: Option<Book> = sqlx::query_as("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let Some(book) = book else {
            return Ok(None);
        };

        let faculties = sqlx::query_as(
            r#"
            SELECT f.* FROM book_faculties bf
            JOIN faculties f ON f.id = bf.faculty_id
            WHERE bf.book_id = $1
            "#,
        )
        .bind(book.id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(BookWithFaculties { book, faculties }))
    }

    /// All books with their faculty sets, store order.
    ///
    /// Associations are materialized with one batched query rather than
    /// one query per book.
    pub async fn list(&self) -> Result<Vec<BookWithFaculties>> {
        let books: Vec<Book> = sqlx::query_as("SELECT * FROM books")
            .fetch_all(self.pool)
            .await?;

        let ids: Vec<i64> = books.iter().map(|b| b.id).collect();
        let rows = sqlx::query(
            r#"
            SELECT bf.book_id, f.id, f.name, f.created_at
            FROM book_faculties bf
            JOIN faculties f ON f.id = bf.faculty_id
            WHERE bf.book_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_book: HashMap<i64, Vec<Faculty>> = HashMap::new();
        for row in rows {
            by_book
                .entry(row.get("book_id"))
                .or_default()
                .push(Faculty {
                    id: row.get("id"),
                    name: row.get("name"),
                    created_at: row.get("created_at"),
                });
        }

        Ok(books
            .into_iter()
            .map(|book| {
                let faculties = by_book.remove(&book.id).unwrap_or_default();
                BookWithFaculties { book, faculties }
            })
            .collect())
    }

    /// Create a book after the ordered validation chain passes.
    pub async fn create(&self, input: CreateBook) -> Result<BookWithFaculties> {
        let mut tx = self.pool.begin().await?;

        let branch_exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM branches WHERE id = $1)")
                .bind(input.branch_id)
                .fetch_one(&mut *tx)
                .await?;

        if !branch_exists.0 {
            return Err(Error::BranchNotFound(format!("id {}", input.branch_id)));
        }

        let duplicate: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM books WHERE title = $1 AND author = $2 AND branch_id = $3)",
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.branch_id)
        .fetch_one(&mut *tx)
        .await?;

        if duplicate.0 {
            return Err(Error::DuplicateBook(format!(
                "'{}' already exists in this branch",
                input.title
            )));
        }

        let faculties = match &input.faculty_ids {
            Some(ids) => resolve_faculties(&mut tx, ids).await?,
            None => Vec::new(),
        };

        let book: Book = sqlx::query_as(
            r#"
            INSERT INTO books (title, author, publisher, year, pages, illustrations,
                               price, branch_id, copies_available, students_borrowed_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(&input.publisher)
        .bind(input.year)
        .bind(input.pages)
        .bind(input.illustrations)
        .bind(input.price)
        .bind(input.branch_id)
        .bind(input.copies_available)
        .bind(input.students_borrowed_count)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify_book_write(e, &input.title, input.branch_id))?;

        link_faculties(&mut tx, book.id, &faculties).await?;

        tx.commit().await?;

        Ok(BookWithFaculties { book, faculties })
    }

    /// Partial update: only fields present in the patch are applied; a
    /// present faculty set is re-validated and wholesale-replaced.
    pub async fn update(&self, id: i64, patch: UpdateBook) -> Result<BookWithFaculties> {
        let mut tx = self.pool.begin().await?;

        let mut book: Book = sqlx::query_as("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::BookNotFound(format!("id {id}")))?;

        let replaced = match &patch.faculty_ids {
            Some(ids) => {
                let faculties = resolve_faculties(&mut tx, ids).await?;
                sqlx::query("DELETE FROM book_faculties WHERE book_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                link_faculties(&mut tx, id, &faculties).await?;
                Some(faculties)
            }
            None => None,
        };

        patch.apply_to(&mut book);

        let book: Book = sqlx::query_as(
            r#"
            UPDATE books SET title = $2, author = $3, publisher = $4, year = $5,
                pages = $6, illustrations = $7, price = $8, branch_id = $9,
                copies_available = $10, students_borrowed_count = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.year)
        .bind(book.pages)
        .bind(book.illustrations)
        .bind(book.price)
        .bind(book.branch_id)
        .bind(book.copies_available)
        .bind(book.students_borrowed_count)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify_book_write(e, &book.title, book.branch_id))?;

        let faculties = match replaced {
            Some(faculties) => faculties,
            None => linked_faculties(&mut tx, id).await?,
        };

        tx.commit().await?;

        Ok(BookWithFaculties { book, faculties })
    }

    /// Delete a book and return the pre-deletion snapshot. Join rows are
    /// removed by the cascade on the association table.
    pub async fn delete(&self, id: i64) -> Result<BookWithFaculties> {
        let mut tx = self.pool.begin().await?;

        let book: Book = sqlx::query_as("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::BookNotFound(format!("id {id}")))?;

        let faculties = linked_faculties(&mut tx, id).await?;

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(BookWithFaculties { book, faculties })
    }

    /// Copy count for a titled book in a named branch.
    ///
    /// A missing title in an existing branch is zero copies, not an
    /// error; a missing branch is.
    pub async fn copies_in_branch(&self, branch_name: &str, book_title: &str) -> Result<i32> {
        let branch: Branch = sqlx::query_as("SELECT * FROM branches WHERE name = $1")
            .bind(branch_name)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| Error::BranchNotFound(format!("'{branch_name}'")))?;

        let book: Option<Book> =
            sqlx::query_as("SELECT * FROM books WHERE title = $1 AND branch_id = $2")
                .bind(book_title)
                .bind(branch.id)
                .fetch_optional(self.pool)
                .await?;

        Ok(book.map(|b| b.copies_available).unwrap_or(0))
    }

    /// Faculty names for a titled book in a named branch, association
    /// order. Unlike the copies query, a missing book is an error here.
    pub async fn faculties_in_branch(
        &self,
        book_title: &str,
        branch_name: &str,
    ) -> Result<BookFacultiesInfo> {
        let branch: Branch = sqlx::query_as("SELECT * FROM branches WHERE name = $1")
            .bind(branch_name)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| Error::BranchNotFound(format!("'{branch_name}'")))?;

        let book: Book = sqlx::query_as("SELECT * FROM books WHERE title = $1 AND branch_id = $2")
            .bind(book_title)
            .bind(branch.id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| {
                Error::BookNotFound(format!("'{book_title}' in branch '{branch_name}'"))
            })?;

        let faculties: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT f.name FROM book_faculties bf
            JOIN faculties f ON f.id = bf.faculty_id
            WHERE bf.book_id = $1
            "#,
        )
        .bind(book.id)
        .fetch_all(self.pool)
        .await?;

        Ok(BookFacultiesInfo {
            book_title: book_title.to_string(),
            branch_name: branch_name.to_string(),
            faculties_count: faculties.len() as i64,
            faculties,
        })
    }
}

/// Deduplicate the requested ids and resolve them all, or fail. Comparing
/// against the deduplicated set means a repeated id is not an error.
async fn resolve_faculties(
    tx: &mut Transaction<'_, Postgres>,
    requested: &[i64],
) -> Result<Vec<Faculty>> {
    let ids = dedup_ids(requested);

    let faculties: Vec<Faculty> = sqlx::query_as("SELECT * FROM faculties WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_all(&mut **tx)
        .await?;

    if faculties.len() != ids.len() {
        return Err(Error::FacultyNotFound(
            "one or more requested faculty ids do not exist".to_string(),
        ));
    }

    Ok(faculties)
}

async fn link_faculties(
    tx: &mut Transaction<'_, Postgres>,
    book_id: i64,
    faculties: &[Faculty],
) -> Result<()> {
    for faculty in faculties {
        sqlx::query("INSERT INTO book_faculties (book_id, faculty_id) VALUES ($1, $2)")
            .bind(book_id)
            .bind(faculty.id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

async fn linked_faculties(
    tx: &mut Transaction<'_, Postgres>,
    book_id: i64,
) -> Result<Vec<Faculty>> {
    let faculties = sqlx::query_as(
        r#"
        SELECT f.* FROM book_faculties bf
        JOIN faculties f ON f.id = bf.faculty_id
        WHERE bf.book_id = $1
        "#,
    )
    .bind(book_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(faculties)
}

/// Translate constraint violations raced past the in-transaction
/// pre-checks into the same domain errors the pre-checks produce.
fn classify_book_write(err: sqlx::Error, title: &str, branch_id: i64) -> Error {
    if is_unique_violation(&err, Some("idx_books_title_author_branch")) {
        Error::DuplicateBook(format!("'{title}' already exists in this branch"))
    } else if is_fk_violation(&err, Some("books_branch_id_fkey")) {
        Error::BranchNotFound(format!("id {branch_id}"))
    } else {
        Error::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::{BranchRepo, FacultyRepo};
    use crate::db::{create_pool, migrations};
    use crate::models::{CreateBranch, CreateFaculty};

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        pool
    }

    fn unique(prefix: &str) -> String {
        format!("{prefix}-{}", std::process::id())
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_rejects_missing_branch() {
        let pool = test_pool().await;
        let repo = BookRepo::new(&pool);

        let err = repo
            .create(CreateBook {
                title: unique("orphan"),
                author: "Nobody".to_string(),
                publisher: None,
                year: None,
                pages: None,
                illustrations: None,
                price: None,
                branch_id: i64::MAX,
                copies_available: 0,
                students_borrowed_count: 0,
                faculty_ids: None,
            })
            .await
            .expect_err("create should fail");

        assert!(matches!(err, Error::BranchNotFound(_)));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn failed_faculty_validation_leaves_no_book_behind() {
        let pool = test_pool().await;
        let branch = BranchRepo::new(&pool)
            .create(CreateBranch {
                name: unique("atomic"),
                address: None,
            })
            .await
            .expect("branch create failed");

        let title = unique("phantom");
        let err = BookRepo::new(&pool)
            .create(CreateBook {
                title: title.clone(),
                author: "Ghost".to_string(),
                publisher: None,
                year: None,
                pages: None,
                illustrations: None,
                price: None,
                branch_id: branch.id,
                copies_available: 1,
                students_borrowed_count: 0,
                faculty_ids: Some(vec![i64::MAX]),
            })
            .await
            .expect_err("create should fail");

        assert!(matches!(err, Error::FacultyNotFound(_)));

        // Validation failed after the branch check; nothing was committed
        let copies = BookRepo::new(&pool)
            .copies_in_branch(&branch.name, &title)
            .await
            .expect("copies query failed");
        assert_eq!(copies, 0);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_ids_in_request_are_collapsed() {
        let pool = test_pool().await;
        let branch = BranchRepo::new(&pool)
            .create(CreateBranch {
                name: unique("dedup"),
                address: None,
            })
            .await
            .expect("branch create failed");
        let faculty = FacultyRepo::new(&pool)
            .create(CreateFaculty {
                name: unique("cs"),
            })
            .await
            .expect("faculty create failed");

        let record = BookRepo::new(&pool)
            .create(CreateBook {
                title: unique("tagged"),
                author: "Someone".to_string(),
                publisher: None,
                year: None,
                pages: None,
                illustrations: None,
                price: None,
                branch_id: branch.id,
                copies_available: 1,
                students_borrowed_count: 0,
                faculty_ids: Some(vec![faculty.id, faculty.id, faculty.id]),
            })
            .await
            .expect("create failed");

        assert_eq!(record.faculties.len(), 1);
        assert_eq!(record.faculties[0].id, faculty.id);
    }
}

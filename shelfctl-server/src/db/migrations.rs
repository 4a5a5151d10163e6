//! Database migrations for the record tables

use sqlx::PgPool;

use crate::Result;

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<()> {
    tracing::info!("Running migrations...");

    // Create branches table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS branches (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            address TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create faculties table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS faculties (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create books table. branch_id carries no ON DELETE action: a branch
    // with dependent books cannot be removed.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            publisher TEXT,
            year INTEGER,
            pages INTEGER,
            illustrations INTEGER,
            price DOUBLE PRECISION,
            branch_id BIGINT NOT NULL REFERENCES branches(id),
            copies_available INTEGER NOT NULL DEFAULT 0,
            students_borrowed_count INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create the book-faculty join table (pure association, no attributes)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS book_faculties (
            book_id BIGINT NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            faculty_id BIGINT NOT NULL REFERENCES faculties(id),
            PRIMARY KEY (book_id, faculty_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> Result<()> {
    // Store-level backstop for the duplicate-book rule. The access layer
    // pre-checks inside its transaction; concurrent creates that both pass
    // the pre-check are serialized here and the loser is translated to a
    // duplicate-book error.
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_books_title_author_branch \
         ON books(title, author, branch_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_books_branch ON books(branch_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_books_title ON books(title)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_branches_name ON branches(name)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_book_faculties_faculty ON book_faculties(faculty_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

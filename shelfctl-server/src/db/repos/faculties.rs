//! Faculty repository

use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::models::{CreateFaculty, Faculty};

use super::is_unique_violation;

/// Faculty repository
pub struct FacultyRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> FacultyRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All faculties, store order.
    pub async fn list(&self) -> Result<Vec<Faculty>> {
        let faculties = sqlx::query_as("SELECT * FROM faculties")
            .fetch_all(self.pool)
            .await?;

        Ok(faculties)
    }

    /// Insert a faculty; a unique violation on the name is reported as a
    /// duplicate-faculty error, same policy as branches.
    pub async fn create(&self, input: CreateFaculty) -> Result<Faculty> {
        let faculty = sqlx::query_as(
            r#"
            INSERT INTO faculties (name)
            VALUES ($1)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, Some("faculties_name_key")) {
                Error::DuplicateFaculty(format!("name '{}' is already taken", input.name))
            } else {
                Error::Database(e)
            }
        })?;

        Ok(faculty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use crate::db::migrations;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_name_is_a_domain_error() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        let repo = FacultyRepo::new(&pool);

        let name = format!("faculty-dup-{}", std::process::id());
        repo.create(CreateFaculty { name: name.clone() })
            .await
            .expect("first create failed");

        let err = repo
            .create(CreateFaculty { name })
            .await
            .expect_err("second create should fail");

        assert!(matches!(err, Error::DuplicateFaculty(_)));
    }
}

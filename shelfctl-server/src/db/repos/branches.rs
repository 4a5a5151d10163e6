//! Branch repository

use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::models::{Branch, CreateBranch};

use super::is_unique_violation;

/// Branch repository
pub struct BranchRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> BranchRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Pure lookup by id; absence is not an error.
    pub async fn get(&self, id: i64) -> Result<Option<Branch>> {
        let branch = sqlx::query_as("SELECT * FROM branches WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(branch)
    }

    /// All branches, store order.
    pub async fn list(&self) -> Result<Vec<Branch>> {
        let branches = sqlx::query_as("SELECT * FROM branches")
            .fetch_all(self.pool)
            .await?;

        Ok(branches)
    }

    /// Insert a branch. There is no application-level pre-check on the
    /// name; the store's unique constraint decides and its violation is
    /// reported as a duplicate-branch error.
    pub async fn create(&self, input: CreateBranch) -> Result<Branch> {
        let branch = sqlx::query_as(
            r#"
            INSERT INTO branches (name, address)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.address)
        .fetch_one(self.pool)
        .await
        .map_err(|e| duplicate_name_or(e, &input.name))?;

        Ok(branch)
    }

    /// Full-field overwrite: every field of the input replaces the stored
    /// value. Asymmetric with the partial book update on purpose.
    pub async fn update(&self, id: i64, input: CreateBranch) -> Result<Branch> {
        let mut tx = self.pool.begin().await?;

        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM branches WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if !exists.0 {
            return Err(Error::BranchNotFound(format!("id {id}")));
        }

        let branch = sqlx::query_as(
            r#"
            UPDATE branches SET name = $2, address = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.address)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| duplicate_name_or(e, &input.name))?;

        tx.commit().await?;

        Ok(branch)
    }
}

fn duplicate_name_or(err: sqlx::Error, name: &str) -> Error {
    if is_unique_violation(&err, Some("branches_name_key")) {
        Error::DuplicateBranch(format!("name '{name}' is already taken"))
    } else {
        Error::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use crate::db::migrations;

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        pool
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_then_get_roundtrip() {
        let pool = test_pool().await;
        let repo = BranchRepo::new(&pool);

        let created = repo
            .create(CreateBranch {
                name: format!("roundtrip-{}", std::process::id()),
                address: Some("12 Shelf St".to_string()),
            })
            .await
            .expect("create failed");

        let fetched = repo
            .get(created.id)
            .await
            .expect("get failed")
            .expect("branch should exist");

        assert_eq!(fetched.name, created.name);
        assert_eq!(fetched.address.as_deref(), Some("12 Shelf St"));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_name_is_a_domain_error() {
        let pool = test_pool().await;
        let repo = BranchRepo::new(&pool);

        let name = format!("dup-{}", std::process::id());
        repo.create(CreateBranch {
            name: name.clone(),
            address: None,
        })
        .await
        .expect("first create failed");

        let err = repo
            .create(CreateBranch {
                name,
                address: None,
            })
            .await
            .expect_err("second create should fail");

        assert!(matches!(err, Error::DuplicateBranch(_)));
    }
}

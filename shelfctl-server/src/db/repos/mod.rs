//! Record repositories
//!
//! One repository per entity. Each mutating operation validates in order
//! inside its own transaction, so a failed validation leaves no partial
//! write behind.

use std::collections::HashSet;

pub mod books;
pub mod branches;
pub mod faculties;

pub use books::BookRepo;
pub use branches::BranchRepo;
pub use faculties::FacultyRepo;

/// True when the error is a unique constraint violation, optionally
/// scoped to one named constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: Option<&str>) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
                && constraint.map_or(true, |name| db.constraint() == Some(name))
        }
        _ => false,
    }
}

/// True when the error is a foreign key violation, optionally scoped to
/// one named constraint.
pub(crate) fn is_fk_violation(err: &sqlx::Error, constraint: Option<&str>) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.kind(), sqlx::error::ErrorKind::ForeignKeyViolation)
                && constraint.map_or(true, |name| db.constraint() == Some(name))
        }
        _ => false,
    }
}

/// Deduplicate requested ids, preserving first-occurrence order.
pub(crate) fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_preserves_first_occurrence_order() {
        assert_eq!(dedup_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert_eq!(dedup_ids(&[]), Vec::<i64>::new());
        assert_eq!(dedup_ids(&[7, 7, 7]), vec![7]);
    }
}

//! Shared test helpers for store-backed module tests.

#[cfg(test)]
use sqlx::SqlitePool;

#[cfg(test)]
use crate::storage::ensure_schema;

/// Creates a test database pool with the schema applied.
/// Uses an in-memory database for fast test execution.
#[cfg(test)]
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    ensure_schema(&pool)
        .await
        .expect("Failed to create schema");
    pool
}

// storage/mod.rs
// Database connection and schema module

pub mod pool;
pub mod schema;
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use pool::init_db_pool_with_path;
pub use schema::ensure_schema;

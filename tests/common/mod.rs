use std::sync::Arc;

use patrimoine_core::db::{self, DbPool};
use tempfile::TempDir;

/// Creates a migrated throwaway database. The TempDir must stay alive for
/// the duration of the test.
pub fn setup_pool() -> (Arc<DbPool>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = db::init(dir.path().to_str().unwrap()).unwrap();
    let pool = db::create_pool(&db_path).unwrap();
    db::run_migrations(&pool).unwrap();
    (pool, dir)
}

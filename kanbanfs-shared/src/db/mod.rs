/// Database layer for kanbanfs
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a health check
/// - `migrations`: embedded schema migrations
///
/// Row types and their queries live in the `models` module at crate root level.

pub mod migrations;
pub mod pool;

/// Database layer
///
/// - `pool`: PostgreSQL connection pool with health check
/// - `migrations`: embedded schema migrations
///
/// Queries themselves live in [`crate::store::PgStore`].

pub mod migrations;
pub mod pool;

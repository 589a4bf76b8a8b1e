/// Database plumbing
///
/// - `pool`: PostgreSQL connection pool with a health check
/// - `migrations`: embedded schema migrations
///
/// The adapters that read and write rows live in [`crate::store::postgres`].

pub mod migrations;
pub mod pool;

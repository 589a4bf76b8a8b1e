/// Domain models
///
/// # Models
///
/// - `user`: User accounts (email + password hash)
/// - `task`: Tasks owned by a single user

pub mod task;
pub mod user;

/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`jwt`]: bearer token issuing and verification
/// - [`middleware`]: resolving a request's bearer token to an identity
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::jwt::TokenService;
/// use taskdesk_shared::auth::password::{hash_password, verify_password, HashCost};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password", HashCost::minimal())?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let tokens = TokenService::new("secret-key-at-least-32-bytes-long!");
/// let user_id = Uuid::new_v4();
/// let token = tokens.issue(user_id)?;
/// assert_eq!(tokens.verify(&token)?, user_id);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;

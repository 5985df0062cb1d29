/// Sealbox session library
///
/// Two independent pieces:
/// - scrypt password hashing in the `hexSalt:hexDerivedKey` storage format
/// - a self-contained HMAC-signed session token
///   (`base64url(payload) . base64url(signature)`)
///
/// The token is the entirety of server-side session state: no session table,
/// no revocation list. That means an issued token stays valid until its
/// 7-day expiry; a production deployment wanting early revocation would add
/// a denylist of issued-token identifiers in front of `decrypt_session`.
pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{SESSION_COOKIE_NAME, SessionManager};

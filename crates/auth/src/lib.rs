//! Registration/login service and bearer-token issuance.
//!
//! The rest of the system treats credentials as opaque: it hands a user
//! identifier to [`TokenManager::issue`] and gets a bearer token back, or
//! hands a token to [`TokenManager::verify`] and gets the user identifier
//! back. Order placement never touches this crate directly; `customer_id`
//! is assumed already authenticated at the HTTP boundary.

mod error;
mod service;
mod token;

pub use error::AuthError;
pub use service::{AuthService, RegisterInput};
pub use token::TokenManager;

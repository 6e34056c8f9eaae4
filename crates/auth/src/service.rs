use domain::{NewUser, User};
use store::UserStore;

use crate::error::AuthError;
use crate::token::TokenManager;

/// Input for registering a new account.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Registration and login over a [`UserStore`].
///
/// Passwords are bcrypt-hashed before they reach the store; the plaintext
/// never leaves this service.
pub struct AuthService<S> {
    users: S,
    tokens: TokenManager,
    bcrypt_cost: u32,
}

impl<S: UserStore> AuthService<S> {
    /// Creates an auth service with the default bcrypt cost.
    pub fn new(users: S, tokens: TokenManager) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Overrides the bcrypt cost factor. Tests lower it to stay fast.
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Returns the token manager used for issuance, for verification at
    /// the HTTP boundary.
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Registers a new account and issues a bearer token for it.
    ///
    /// Fails with [`AuthError::EmailTaken`] if the email is registered.
    #[tracing::instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<(User, String), AuthError> {
        let password_hash = bcrypt::hash(&input.password, self.bcrypt_cost)?;

        let user = self
            .users
            .create_user(NewUser::new(
                input.email,
                password_hash,
                input.first_name,
                input.last_name,
            ))
            .await?;

        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok((user, token))
    }

    /// Verifies credentials and issues a bearer token.
    ///
    /// Unknown email and wrong password both fail with
    /// [`AuthError::InvalidCredentials`].
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let user = self
            .users
            .user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !bcrypt::verify(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        Ok((user, token))
    }
}

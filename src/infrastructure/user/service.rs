//! User provisioning service

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::user::{validate_email, validate_password, NewUser, Role, User, UserRepository};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for provisioning a new user
#[derive(Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

impl std::fmt::Debug for ProvisionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

/// Errors returned by [`UserProvisioner::provision`]
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A user with this email is already registered; nothing was written
    #[error("User already exists")]
    AlreadyExists { email: String },

    /// Input rejected before touching the store
    #[error("{0}")]
    Validation(String),

    /// Store or hasher failure, passed through unchanged
    #[error(transparent)]
    Infrastructure(#[from] DomainError),
}

impl ProvisionError {
    /// Whether this is an expected, user-facing failure rather than an
    /// infrastructure fault
    pub fn is_domain(&self) -> bool {
        !matches!(self, Self::Infrastructure(_))
    }
}

/// Creates user accounts: one uniqueness read, one hash, one write
#[derive(Debug)]
pub struct UserProvisioner<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository, H: PasswordHasher> UserProvisioner<R, H> {
    /// Create a new provisioner
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Provision a user from a request
    pub async fn provision_request(
        &self,
        request: &ProvisionRequest,
    ) -> Result<User, ProvisionError> {
        self.provision(&request.email, &request.password, request.is_admin)
            .await
    }

    /// Create and persist a new user.
    ///
    /// The password is hashed before the single write, so a hasher failure
    /// leaves the store untouched.
    #[tracing::instrument(skip(self, password))]
    pub async fn provision(
        &self,
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User, ProvisionError> {
        validate_email(email).map_err(|e| ProvisionError::Validation(e.to_string()))?;
        validate_password(password).map_err(|e| ProvisionError::Validation(e.to_string()))?;

        if self.repository.find_by_email(email).await?.is_some() {
            debug!("Email already registered, skipping write");
            return Err(ProvisionError::AlreadyExists {
                email: email.to_string(),
            });
        }

        let mut user = NewUser::new(email, Role::for_admin_flag(is_admin));

        let password_hash = self.hasher.hash(password, &user)?;
        user.set_password_hash(password_hash);

        // The unique constraint is authoritative when a concurrent caller wins the race
        let user = self.repository.save(user).await.map_err(|e| {
            if e.is_conflict() {
                ProvisionError::AlreadyExists {
                    email: email.to_string(),
                }
            } else {
                ProvisionError::Infrastructure(e)
            }
        })?;

        info!(user_id = %user.id(), role = user.role_label(), "User provisioned");

        Ok(user)
    }
}

//! User repository trait

use async_trait::async_trait;

use super::entity::{NewUser, User};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository trait for user storage
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by their email (exact, case-sensitive match)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Persist a new user in a single write and return it with its assigned ID.
    ///
    /// Fails with [`DomainError::Conflict`] when the email is already taken.
    async fn save(&self, user: NewUser) -> Result<User, DomainError>;

    /// Count users stored under an email
    async fn count_by_email(&self, email: &str) -> Result<usize, DomainError>;
}

//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    /// Index for email -> user ID lookup
    email_index: HashMap<String, UserId>,
    last_id: i64,
}

/// In-memory implementation of UserRepository
///
/// IDs are assigned from a counter starting at 1. Data is lost when the
/// repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository seeded with existing users
    #[cfg(test)]
    pub fn with_users(users: Vec<User>) -> Self {
        let mut inner = Inner::default();

        for user in users {
            inner.last_id = inner.last_id.max(user.id().value());
            inner.email_index.insert(user.email().to_string(), user.id());
            inner.users.insert(user.id(), user);
        }

        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    /// Whether the repository holds no users
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let inner = self.inner.read().await;

        Ok(inner
            .email_index
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn save(&self, user: NewUser) -> Result<User, DomainError> {
        let mut inner = self.inner.write().await;

        if inner.email_index.contains_key(user.email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                user.email()
            )));
        }

        let id = UserId::new(inner.last_id + 1)
            .map_err(|e| DomainError::internal(format!("Failed to assign user ID: {}", e)))?;
        let user = user.into_user(id);

        inner.last_id = id.value();
        inner.email_index.insert(user.email().to_string(), id);
        inner.users.insert(id, user.clone());

        Ok(user)
    }

    async fn count_by_email(&self, email: &str) -> Result<usize, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().filter(|u| u.email() == email).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn new_user(email: &str) -> NewUser {
        let mut user = NewUser::new(email, Role::User);
        user.set_password_hash("hashed_password");
        user
    }

    #[tokio::test]
    async fn test_save_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.save(new_user("a@x.com")).await.unwrap();
        let second = repo.save(new_user("b@x.com")).await.unwrap();

        assert_eq!(first.id().value(), 1);
        assert_eq!(second.id().value(), 2);
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.save(new_user("a@x.com")).await.unwrap();

        let found = repo.find_by_email("a@x.com").await.unwrap();
        assert_eq!(found, Some(saved));

        assert!(repo.find_by_email("missing@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.save(new_user("a@x.com")).await.unwrap();

        assert!(repo.find_by_email("A@X.com").await.unwrap().is_none());
        assert!(repo.find_by_email("a@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_email_uniqueness() {
        let repo = InMemoryUserRepository::new();
        repo.save(new_user("a@x.com")).await.unwrap();

        let result = repo.save(new_user("a@x.com")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(repo.count_by_email("a@x.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_with_users_continues_id_sequence() {
        let seeded = new_user("a@x.com").into_user(UserId::new(10).unwrap());
        let repo = InMemoryUserRepository::with_users(vec![seeded]);

        let next = repo.save(new_user("b@x.com")).await.unwrap();
        assert_eq!(next.id().value(), 11);
        assert_eq!(repo.count_by_email("a@x.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_is_empty() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.is_empty().await);

        repo.save(new_user("a@x.com")).await.unwrap();
        assert!(!repo.is_empty().await);
    }
}

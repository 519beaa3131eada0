//! PostgreSQL user repository implementation

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::user::{NewUser, Role, User, UserId, UserRepository};
use crate::domain::DomainError;

/// PostgreSQL implementation of UserRepository
///
/// Relies on the `users.email` unique constraint created by the migrations.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, roles, is_verified, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, user: NewUser) -> Result<User, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, password_hash, roles, is_verified, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user.email())
        .bind(user.password_hash())
        .bind(roles_to_vec(user.roles()))
        .bind(user.is_verified())
        .bind(user.created_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let unique_violation = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());

            if unique_violation {
                DomainError::conflict(format!("Email '{}' already exists", user.email()))
            } else {
                DomainError::storage(format!("Failed to create user: {}", e))
            }
        })?;

        let id = UserId::new(id).map_err(|e| {
            DomainError::storage(format!("Invalid user ID returned by database: {}", e))
        })?;

        Ok(user.into_user(id))
    }

    async fn count_by_email(&self, email: &str) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count users: {}", e)))?;

        Ok(count as usize)
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: i64 = row.get("id");
    let email: String = row.get("email");
    let password_hash: String = row.get("password_hash");
    let roles: Vec<String> = row.get("roles");
    let is_verified: bool = row.get("is_verified");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

    let user_id = UserId::new(id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

    Ok(User::from_parts(
        user_id,
        email,
        password_hash,
        vec_to_roles(&roles)?,
        is_verified,
        created_at,
    ))
}

fn roles_to_vec(roles: &BTreeSet<Role>) -> Vec<String> {
    roles.iter().map(|r| r.as_str().to_string()).collect()
}

fn vec_to_roles(tags: &[String]) -> Result<BTreeSet<Role>, DomainError> {
    tags.iter()
        .map(|tag| {
            Role::parse(tag)
                .ok_or_else(|| DomainError::storage(format!("Unknown role in database: {}", tag)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_to_vec() {
        assert_eq!(roles_to_vec(&BTreeSet::from([Role::User])), vec!["ROLE_USER"]);
        assert_eq!(
            roles_to_vec(&BTreeSet::from([Role::Admin, Role::User])),
            vec!["ROLE_USER", "ROLE_ADMIN"]
        );
    }

    #[test]
    fn test_vec_to_roles() {
        let roles = vec_to_roles(&["ROLE_ADMIN".to_string()]).unwrap();
        assert_eq!(roles, BTreeSet::from([Role::Admin]));

        assert!(vec_to_roles(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_vec_to_roles_rejects_unknown_tag() {
        let result = vec_to_roles(&["ROLE_ROOT".to_string()]);
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}

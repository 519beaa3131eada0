//! User entity and related types

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_user_id, UserValidationError};

/// User identifier assigned by the store on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: i64) -> Result<Self, UserValidationError> {
        validate_user_id(id)?;
        Ok(Self(id))
    }

    /// Get the inner value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flat permission tag attached to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    /// Role assigned by provisioning for the given admin flag
    pub fn for_admin_flag(is_admin: bool) -> Self {
        if is_admin { Self::Admin } else { Self::User }
    }

    /// Stored tag, e.g. `ROLE_ADMIN`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
        }
    }

    /// Human-readable label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Admin => "Administrator user",
        }
    }

    /// Parse a stored tag
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "ROLE_USER" => Some(Self::User),
            "ROLE_ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    email: String,
    password_hash: String,
    roles: BTreeSet<Role>,
    is_verified: bool,
    created_at: DateTime<Utc>,
}

impl NewUser {
    /// Create a new, verified user holding a single role and no password hash yet
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            password_hash: String::new(),
            roles: BTreeSet::from([role]),
            is_verified: true,
            created_at: Utc::now(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Set the password hash
    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
    }

    /// Attach the identifier assigned by the store
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            roles: self.roles,
            is_verified: self.is_verified,
            created_at: self.created_at,
        }
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier assigned by the store
    id: UserId,
    /// Unique email, used as the lookup key
    email: String,
    /// One-way password hash - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: String,
    roles: BTreeSet<Role>,
    is_verified: bool,
    created_at: DateTime<Utc>,
}

impl User {
    /// Rebuild a user from stored fields
    pub fn from_parts(
        id: UserId,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        roles: BTreeSet<Role>,
        is_verified: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            password_hash: password_hash.into(),
            roles,
            is_verified,
            created_at,
        }
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Check if the user holds the given role
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Label of the highest role held, for reports
    pub fn role_label(&self) -> &'static str {
        self.roles
            .iter()
            .next_back()
            .map(Role::label)
            .unwrap_or(Role::User.label())
    }
}

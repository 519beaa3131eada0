//! Account provisioner
//!
//! Creates user accounts from the command line:
//! - Email uniqueness check against the user store
//! - Argon2id password hashing
//! - PostgreSQL persistence with schema migrations
//! - Timing and memory report for each run

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{DomainError, NewUser, Role, User, UserId, UserRepository};
pub use infrastructure::user::{
    Argon2Hasher, InMemoryUserRepository, PasswordHasher, PostgresUserRepository, ProvisionError,
    ProvisionRequest, UserProvisioner,
};

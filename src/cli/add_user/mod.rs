//! Add-user command - gathers input, provisions the account and reports stats

mod prompt;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::{AppConfig, StorageBackend};
use crate::domain::user::{
    validate_email, validate_password, User, UserRepository, UserValidationError,
};
use crate::infrastructure::stopwatch::{Stopwatch, StopwatchEvent};
use crate::infrastructure::storage;
use crate::infrastructure::user::{
    Argon2Hasher, InMemoryUserRepository, PasswordHasher, PostgresUserRepository,
    ProvisionRequest, UserProvisioner,
};

pub use prompt::{DialoguerPrompter, Prompter};

const EMAIL_QUESTION: &str = "Email";
const PASSWORD_QUESTION: &str = "Password (your type will be hidden)";
const IS_ADMIN_QUESTION: &str = "Is Admin? (1 or 0)";

/// Arguments for the add-user command
#[derive(Args, Clone, Debug, Default)]
pub struct AddUserArgs {
    /// Email of the new user
    #[arg(short, long)]
    pub email: Option<String>,

    /// Password of the new user (asked hidden when omitted)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Create the user as an administrator (1/0, true/false, yes/no, on/off)
    #[arg(
        long,
        alias = "isAdmin",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "1",
        value_parser = parse_flag
    )]
    pub is_admin: Option<bool>,

    /// Never prompt; fail if email or password is missing
    #[arg(short = 'n', long)]
    pub no_interaction: bool,
}

/// A string that is not a recognised boolean
#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid boolean value '{0}' (expected 1 or 0)")]
pub struct InvalidFlag(String);

/// Coerce a truthy/falsy string to a boolean; empty means false
pub fn parse_flag(value: &str) -> Result<bool, InvalidFlag> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(InvalidFlag(value.to_string())),
    }
}

/// Fill in values missing from the flags, asking the prompter unless
/// interaction is disabled. Empty flag values count as missing.
pub fn resolve_request<P: Prompter>(
    args: &AddUserArgs,
    prompter: &P,
) -> anyhow::Result<ProvisionRequest> {
    let email = match &args.email {
        Some(email) if !email.is_empty() => email.clone(),
        _ if args.no_interaction => anyhow::bail!("--email is required with --no-interaction"),
        _ => prompter.ask(EMAIL_QUESTION)?.trim().to_string(),
    };
    validate_email(&email)?;

    let password = match &args.password {
        Some(password) if !password.is_empty() => password.clone(),
        _ if args.no_interaction => {
            anyhow::bail!("--password is required with --no-interaction")
        }
        _ => prompter.ask_hidden(PASSWORD_QUESTION)?,
    };
    validate_password(&password)?;

    let is_admin = match args.is_admin {
        Some(is_admin) => is_admin,
        None if args.no_interaction => false,
        None => parse_flag(&prompter.ask(IS_ADMIN_QUESTION)?)?,
    };

    Ok(ProvisionRequest {
        email,
        password,
        is_admin,
    })
}

/// Run the add-user command against the configured store
pub async fn run(config_path: Option<&str>, args: AddUserArgs) -> anyhow::Result<ExitCode> {
    let config = super::bootstrap(config_path)?;
    let stopwatch = Stopwatch::start();
    let hasher = Arc::new(Argon2Hasher::from_config(&config.hashing)?);
    let mut out = std::io::stdout();

    match config.storage.backend {
        StorageBackend::Postgres => {
            let repository = Arc::new(connect_repository(&config).await?);
            let provisioner = UserProvisioner::new(repository, hasher);
            execute(&args, &provisioner, &DialoguerPrompter, &mut out, stopwatch).await
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; the user will not outlive this process");
            let repository = Arc::new(InMemoryUserRepository::new());
            let provisioner = UserProvisioner::new(repository, hasher);
            execute(&args, &provisioner, &DialoguerPrompter, &mut out, stopwatch).await
        }
    }
}

async fn connect_repository(config: &AppConfig) -> anyhow::Result<PostgresUserRepository> {
    let pool = storage::connect(&config.database).await?;

    if config.database.run_migrations {
        storage::run_storage_migrations(&pool).await?;
    }

    Ok(PostgresUserRepository::new(pool))
}

/// Gather input, provision, and write the report to `out`.
///
/// Invalid input and domain failures are reported and yield
/// [`ExitCode::FAILURE`]; infrastructure failures are returned as errors.
pub async fn execute<R, H, P, W>(
    args: &AddUserArgs,
    provisioner: &UserProvisioner<R, H>,
    prompter: &P,
    out: &mut W,
    mut stopwatch: Stopwatch,
) -> anyhow::Result<ExitCode>
where
    R: UserRepository,
    H: PasswordHasher,
    P: Prompter,
    W: Write,
{
    write_title(out, "Add User Command Wizard")?;
    writeln!(out, " Please, enter some information")?;
    writeln!(out)?;

    let request = match resolve_request(args, prompter) {
        Ok(request) => request,
        Err(e) => match e.downcast_ref::<UserValidationError>() {
            Some(invalid) => {
                write_comment(out, &invalid.to_string())?;
                return Ok(ExitCode::FAILURE);
            }
            None => return Err(e),
        },
    };
    stopwatch.sample();

    match provisioner.provision_request(&request).await {
        Ok(user) => {
            let event = stopwatch.stop();
            write_success_report(out, &user, &event)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_domain() => {
            write_comment(out, &e.to_string())?;
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            error!(error = %e, "Provisioning failed");
            Err(e.into())
        }
    }
}

fn write_title<W: Write>(out: &mut W, title: &str) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(title.chars().count()))?;
    writeln!(out)
}

fn write_comment<W: Write>(out: &mut W, message: &str) -> std::io::Result<()> {
    writeln!(out, " // {}", message)?;
    writeln!(out)
}

/// Confirmation line followed by id, elapsed time and memory stats
pub fn write_success_report<W: Write>(
    out: &mut W,
    user: &User,
    event: &StopwatchEvent,
) -> std::io::Result<()> {
    writeln!(
        out,
        " [OK] {} was successfully created: {}",
        user.role_label(),
        user.email()
    )?;
    writeln!(out)?;
    write_comment(
        out,
        &format!(
            "New user's id: {} / Elapsed time: {:.2} ms / Consumed memory: {:.2} MB",
            user.id(),
            event.duration_ms(),
            event.memory_mb()
        ),
    )
}

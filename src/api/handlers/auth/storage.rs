//! Credential store accessor: the `users` and `user_audit_log` tables.
//!
//! Emails are stored normalized (lowercased), so equality here is the
//! case-insensitive comparison the rest of the module relies on.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::lockout::FailureState;
use super::types::Role;

/// One login-capable identity.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    /// The slice of the row the lockout policy operates on.
    #[must_use]
    pub const fn failure_state(&self) -> FailureState {
        FailureState {
            failed_attempts: self.failed_login_attempts,
            locked_until: self.locked_until,
        }
    }
}

/// Outcome of the transactional account insert.
#[derive(Debug)]
pub enum RegisterOutcome {
    Created(Uuid),
    /// Unique violation on the email column (registration race).
    Conflict,
}

const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, role, is_active, \
     failed_login_attempts, locked_until, last_login";

fn account_from_row(row: &PgRow) -> Result<Account> {
    let role: String = row.get("role");
    let role = role
        .parse::<Role>()
        .map_err(|()| anyhow!("unknown role in users table: {role}"))?;

    Ok(Account {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role,
        is_active: row.get("is_active"),
        failed_login_attempts: row.get("failed_login_attempts"),
        locked_until: row.get("locked_until"),
        last_login: row.get("last_login"),
    })
}

fn query_span(operation: &str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

/// Look up an account by its normalized email.
///
/// # Errors
///
/// Returns an error on connection/query failure; a missing row is `Ok(None)`.
pub async fn find_account_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>> {
    let query = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = $1");
    let row = sqlx::query(&query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(query_span("SELECT", &query))
        .await
        .context("failed to lookup account by email")?;

    row.as_ref().map(account_from_row).transpose()
}

/// Look up an account by id (refresh flow).
///
/// # Errors
///
/// Returns an error on connection/query failure; a missing row is `Ok(None)`.
pub async fn find_account_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Account>> {
    let query = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span("SELECT", &query))
        .await
        .context("failed to lookup account by id")?;

    row.as_ref().map(account_from_row).transpose()
}

/// Duplicate check for registration.
///
/// # Errors
///
/// Returns an error on connection/query failure.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
    let query = "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)";
    let row = sqlx::query(query)
        .bind(email)
        .fetch_one(pool)
        .instrument(query_span("SELECT", query))
        .await
        .context("failed to check email existence")?;

    Ok(row.get(0))
}

/// Persist the failure state computed by the lockout policy.
///
/// Plain read-modify-write, as in the original design: two concurrent
/// failures for the same account can race on the counter.
///
/// # Errors
///
/// Returns an error on connection/query failure.
pub async fn update_failure_state(pool: &PgPool, id: Uuid, state: FailureState) -> Result<()> {
    let query = "UPDATE users SET failed_login_attempts = $1, locked_until = $2 WHERE id = $3";
    sqlx::query(query)
        .bind(state.failed_attempts)
        .bind(state.locked_until)
        .bind(id)
        .execute(pool)
        .instrument(query_span("UPDATE", query))
        .await
        .context("failed to update failure state")?;

    Ok(())
}

/// Reset counters and stamp `last_login` after a successful login.
///
/// # Errors
///
/// Returns an error on connection/query failure.
pub async fn record_successful_login(pool: &PgPool, id: Uuid) -> Result<()> {
    let query = "UPDATE users SET failed_login_attempts = 0, locked_until = NULL, \
         last_login = NOW() WHERE id = $1";
    sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(query_span("UPDATE", query))
        .await
        .context("failed to record successful login")?;

    Ok(())
}

/// Insert the account and its `REGISTER` audit entry in one transaction.
/// If the audit insert fails, the account insert rolls back with it.
///
/// # Errors
///
/// Returns an error on connection/query failure; a losing registration
/// race comes back as `RegisterOutcome::Conflict`, not an error.
pub async fn insert_account_with_audit(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
    ip_address: Option<&str>,
    user_agent: Option<&str>,
) -> Result<RegisterOutcome> {
    let mut tx = pool.begin().await.context("begin register transaction")?;

    let query = "INSERT INTO users (name, email, password_hash, role, is_active) \
         VALUES ($1, $2, $3, $4, TRUE) RETURNING id";
    let row = sqlx::query(query)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&mut *tx)
        .instrument(query_span("INSERT", query))
        .await;

    let account_id: Uuid = match row {
        Ok(row) => row.get("id"),
        Err(err) if is_unique_violation(&err) => {
            let _ = tx.rollback().await;
            return Ok(RegisterOutcome::Conflict);
        }
        Err(err) => return Err(err).context("failed to insert account"),
    };

    let query = "INSERT INTO user_audit_log (user_id, action, ip_address, user_agent) \
         VALUES ($1, $2, $3, $4)";
    sqlx::query(query)
        .bind(account_id)
        .bind("REGISTER")
        .bind(ip_address)
        .bind(user_agent)
        .execute(&mut *tx)
        .instrument(query_span("INSERT", query))
        .await
        .context("failed to insert audit log entry")?;

    tx.commit().await.context("commit register transaction")?;

    Ok(RegisterOutcome::Created(account_id))
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

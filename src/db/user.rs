use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::dto::{AccountWithUser, UserProfile};
use crate::models::Session;
use crate::PGPool;

#[derive(FromRow)]
pub struct CredentialRow {
    pub user_id: Uuid,
    pub password_hash: String,
}

#[derive(FromRow)]
struct AccountUserRow {
    id: Uuid,
    provider: String,
    created_at: DateTime<Utc>,
    user_id: Uuid,
    user_name: String,
    user_email: String,
}

impl From<AccountUserRow> for AccountWithUser {
    fn from(row: AccountUserRow) -> Self {
        AccountWithUser {
            id: row.id,
            provider: row.provider,
            user: UserProfile {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
            },
            created_at: row.created_at,
        }
    }
}

pub async fn insert(
    conn: &mut PgConnection,
    id: Uuid,
    name: &str,
    email: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO users (id, name, email) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(name)
        .bind(email)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn insert_account(
    conn: &mut PgConnection,
    id: Uuid,
    user_id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO accounts (id, user_id, provider, password_hash) \
         VALUES ($1, $2, 'credential', $3)",
    )
    .bind(id)
    .bind(user_id)
    .bind(password_hash)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn email_exists(pool: &PGPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub async fn find_credential_by_email(
    pool: &PGPool,
    email: &str,
) -> Result<Option<CredentialRow>, sqlx::Error> {
    sqlx::query_as::<_, CredentialRow>(
        "SELECT a.user_id, a.password_hash \
         FROM accounts a JOIN users u ON u.id = a.user_id \
         WHERE u.email = $1 AND a.provider = 'credential'",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn list_accounts(pool: &PGPool) -> Result<Vec<AccountWithUser>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AccountUserRow>(
        "SELECT a.id, a.provider, a.created_at, \
         u.id AS user_id, u.name AS user_name, u.email AS user_email \
         FROM accounts a JOIN users u ON u.id = a.user_id \
         ORDER BY a.created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn insert_session(conn: &mut PgConnection, session: &Session) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO sessions (id, token, user_id, expires_at) VALUES ($1, $2, $3, $4)")
        .bind(session.id)
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.expires_at)
        .execute(conn)
        .await?;
    Ok(())
}

/// Resolves a session token to the public profile of its user. Expired
/// sessions resolve to `None`; cleanup of the rows themselves is left to the
/// store.
pub async fn find_by_session(
    pool: &PGPool,
    token: &str,
) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        "SELECT u.id, u.name, u.email \
         FROM sessions s JOIN users u ON u.id = s.user_id \
         WHERE s.token = $1 AND s.expires_at > now()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}

pub async fn delete_session(pool: &PGPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

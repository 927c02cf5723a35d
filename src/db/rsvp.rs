use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::dto::{AttendeeRsvp, RsvpWithEvent, RsvpWithUser, UserProfile};
use crate::models::{Event, Rsvp, RsvpStatus};
use crate::PGPool;

#[derive(FromRow)]
struct RsvpUserRow {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    status: RsvpStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_name: String,
    user_email: String,
}

impl From<RsvpUserRow> for RsvpWithUser {
    fn from(row: RsvpUserRow) -> Self {
        RsvpWithUser {
            id: row.id,
            event_id: row.event_id,
            status: row.status,
            user: UserProfile {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct RsvpEventRow {
    id: Uuid,
    status: RsvpStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    event_id: Uuid,
    event_name: String,
    event_location: String,
    event_date: String,
    event_capacity: Option<i32>,
    event_created_by: Uuid,
    event_created_at: DateTime<Utc>,
    event_updated_at: DateTime<Utc>,
}

impl From<RsvpEventRow> for RsvpWithEvent {
    fn from(row: RsvpEventRow) -> Self {
        RsvpWithEvent {
            id: row.id,
            status: row.status,
            event: Event {
                id: row.event_id,
                name: row.event_name,
                location: row.event_location,
                date: row.event_date,
                capacity: row.event_capacity,
                created_by: row.event_created_by,
                created_at: row.event_created_at,
                updated_at: row.event_updated_at,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn list_by_event(pool: &PGPool, event_id: Uuid) -> Result<Vec<RsvpWithUser>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RsvpUserRow>(
        "SELECT r.id, r.user_id, r.event_id, r.status, r.created_at, r.updated_at, \
         u.name AS user_name, u.email AS user_email \
         FROM rsvps r JOIN users u ON u.id = r.user_id \
         WHERE r.event_id = $1 ORDER BY r.created_at",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn list_by_user(pool: &PGPool, user_id: Uuid) -> Result<Vec<RsvpWithEvent>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RsvpEventRow>(
        "SELECT r.id, r.status, r.created_at, r.updated_at, \
         e.id AS event_id, e.name AS event_name, e.location AS event_location, \
         e.date AS event_date, e.capacity AS event_capacity, e.created_by AS event_created_by, \
         e.created_at AS event_created_at, e.updated_at AS event_updated_at \
         FROM rsvps r JOIN events e ON e.id = r.event_id \
         WHERE r.user_id = $1 ORDER BY r.created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// All RSVPs under events created by `owner_id`, with responder names.
pub async fn list_for_owner(pool: &PGPool, owner_id: Uuid) -> Result<Vec<AttendeeRsvp>, sqlx::Error> {
    sqlx::query_as::<_, AttendeeRsvp>(
        "SELECT r.id, r.user_id, r.event_id, r.status, r.created_at, r.updated_at, \
         u.name AS user_name \
         FROM rsvps r \
         JOIN users u ON u.id = r.user_id \
         JOIN events e ON e.id = r.event_id \
         WHERE e.created_by = $1 ORDER BY r.created_at",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub async fn lock_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Rsvp>, sqlx::Error> {
    sqlx::query_as::<_, Rsvp>("SELECT * FROM rsvps WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn get_by_id(pool: &PGPool, id: Uuid) -> Result<Option<Rsvp>, sqlx::Error> {
    sqlx::query_as::<_, Rsvp>("SELECT * FROM rsvps WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_user_and_event(
    conn: &mut PgConnection,
    user_id: Uuid,
    event_id: Uuid,
) -> Result<Option<Rsvp>, sqlx::Error> {
    sqlx::query_as::<_, Rsvp>("SELECT * FROM rsvps WHERE user_id = $1 AND event_id = $2")
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(conn)
        .await
}

/// Live aggregate over current rows. Capacity is never tracked in a counter,
/// so this count is the single source of truth at admission time.
pub async fn count_attending(conn: &mut PgConnection, event_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM rsvps WHERE event_id = $1 AND status = $2",
    )
    .bind(event_id)
    .bind(RsvpStatus::Attending)
    .fetch_one(conn)
    .await
}

pub async fn insert(
    conn: &mut PgConnection,
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    status: RsvpStatus,
) -> Result<Option<Rsvp>, sqlx::Error> {
    sqlx::query_as::<_, Rsvp>(
        "INSERT INTO rsvps (id, user_id, event_id, status) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .bind(event_id)
    .bind(status)
    .fetch_optional(conn)
    .await
}

pub async fn set_status(
    conn: &mut PgConnection,
    id: Uuid,
    status: RsvpStatus,
) -> Result<Option<Rsvp>, sqlx::Error> {
    sqlx::query_as::<_, Rsvp>(
        "UPDATE rsvps SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(conn)
    .await
}

pub async fn delete(pool: &PGPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM rsvps WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

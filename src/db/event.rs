use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::dto::{EventWithCreator, NewEventDto, UserProfile};
use crate::models::Event;
use crate::PGPool;

#[derive(FromRow)]
struct EventCreatorRow {
    id: Uuid,
    name: String,
    location: String,
    date: String,
    capacity: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    creator_id: Uuid,
    creator_name: String,
    creator_email: String,
}

impl From<EventCreatorRow> for EventWithCreator {
    fn from(row: EventCreatorRow) -> Self {
        EventWithCreator {
            id: row.id,
            name: row.name,
            location: row.location,
            date: row.date,
            capacity: row.capacity,
            created_by: UserProfile {
                id: row.creator_id,
                name: row.creator_name,
                email: row.creator_email,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const EVENT_WITH_CREATOR: &str = "SELECT e.id, e.name, e.location, e.date, e.capacity, \
    e.created_at, e.updated_at, \
    u.id AS creator_id, u.name AS creator_name, u.email AS creator_email \
    FROM events e JOIN users u ON u.id = e.created_by";

pub async fn insert(
    pool: &PGPool,
    id: Uuid,
    event: &NewEventDto,
    created_by: Uuid,
) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        "INSERT INTO events (id, name, location, date, capacity, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(id)
    .bind(&event.name)
    .bind(&event.location)
    .bind(&event.date)
    .bind(event.capacity)
    .bind(created_by)
    .fetch_optional(pool)
    .await
}

pub async fn get_by_id(pool: &PGPool, id: Uuid) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_with_creator(
    pool: &PGPool,
    id: Uuid,
) -> Result<Option<EventWithCreator>, sqlx::Error> {
    let row = sqlx::query_as::<_, EventCreatorRow>(&format!("{} WHERE e.id = $1", EVENT_WITH_CREATOR))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Into::into))
}

pub async fn list_all(pool: &PGPool) -> Result<Vec<EventWithCreator>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EventCreatorRow>(&format!(
        "{} ORDER BY e.created_at",
        EVENT_WITH_CREATOR
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn list_created_by(pool: &PGPool, user_id: Uuid) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE created_by = $1 ORDER BY created_at")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Locks the event row for the duration of the surrounding transaction.
/// Capacity admission counts and the follow-up insert/update run under this
/// lock so concurrent RSVPs to the same event are serialized.
pub async fn lock_row(conn: &mut PgConnection, id: Uuid) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await
}

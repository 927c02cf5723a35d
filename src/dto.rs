use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::{Event, RsvpStatus};

#[derive(Debug, Deserialize, Clone)]
pub struct NewEventDto {
    pub name: String,
    pub location: String,
    pub date: String,
    pub capacity: Option<i32>,
}

/// Partial event update payload. No route exposes this yet; it is kept so
/// the shape is settled when an edit flow ships.
#[derive(Debug, Deserialize, Clone)]
pub struct UpdateEventDto {
    pub name: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewRsvpDto {
    pub status: RsvpStatus,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpdateRsvpDto {
    pub status: RsvpStatus,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SignupDto {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoginDto {
    pub email: String,
    pub password: String,
}

/// Raw event-creation form. Browsers submit `capacity` as an empty string
/// when the field is left blank, so it arrives untyped and is parsed by
/// [`EventFormData::into_new_event`].
#[derive(Debug, Deserialize, Clone)]
pub struct EventFormData {
    pub name: String,
    pub location: String,
    pub date: String,
    #[serde(default)]
    pub capacity: String,
}

impl EventFormData {
    pub fn into_new_event(self) -> Result<NewEventDto, ApiError> {
        let capacity = parse_capacity(&self.capacity)?;
        Ok(NewEventDto {
            name: self.name,
            location: self.location,
            date: self.date,
            capacity,
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RsvpFormData {
    pub status: RsvpStatus,
}

pub fn parse_capacity(raw: &str) -> Result<Option<i32>, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .ok()
        .filter(|capacity| *capacity >= 0)
        .map(Some)
        .ok_or(ApiError::BadRequest)
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct EventWithCreator {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub date: String,
    pub capacity: Option<i32>,
    pub created_by: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RsvpWithUser {
    pub id: Uuid,
    pub event_id: Uuid,
    pub status: RsvpStatus,
    pub user: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RsvpWithEvent {
    pub id: Uuid,
    pub status: RsvpStatus,
    pub event: Event,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One RSVP row under an event the caller owns, carrying just the
/// responder's display name.
#[derive(Debug, FromRow, Serialize)]
pub struct AttendeeRsvp {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub status: RsvpStatus,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct EventWithAttendees {
    #[serde(flatten)]
    pub event: Event,
    pub rsvps: Vec<AttendeeRsvp>,
}

#[derive(Debug, Serialize)]
pub struct AccountWithUser {
    pub id: Uuid,
    pub provider: String,
    pub user: UserProfile,
    pub created_at: DateTime<Utc>,
}

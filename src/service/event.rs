use uuid::Uuid;

use crate::db;
use crate::dto::{EventWithAttendees, EventWithCreator, NewEventDto};
use crate::errors::ApiError;
use crate::models::Event;
use crate::service::auth::CurrentUser;
use crate::PGPool;
use std::collections::HashMap;

pub async fn get_all(pool: &PGPool) -> Result<Vec<EventWithCreator>, ApiError> {
    Ok(db::event::list_all(pool).await?)
}

pub async fn get_by_id(pool: &PGPool, id: Uuid) -> Result<Event, ApiError> {
    db::event::get_by_id(pool, id)
        .await?
        .ok_or(ApiError::NotFound)
}

pub async fn get_with_creator(pool: &PGPool, id: Uuid) -> Result<EventWithCreator, ApiError> {
    db::event::get_with_creator(pool, id)
        .await?
        .ok_or(ApiError::NotFound)
}

/// Events owned by the caller, each carrying its RSVPs with responder names.
pub async fn get_created_by(
    pool: &PGPool,
    user: &CurrentUser,
) -> Result<Vec<EventWithAttendees>, ApiError> {
    let events = db::event::list_created_by(pool, user.id).await?;
    let mut by_event: HashMap<Uuid, Vec<_>> = HashMap::new();
    for rsvp in db::rsvp::list_for_owner(pool, user.id).await? {
        by_event.entry(rsvp.event_id).or_default().push(rsvp);
    }
    Ok(events
        .into_iter()
        .map(|event| {
            let rsvps = by_event.remove(&event.id).unwrap_or_default();
            EventWithAttendees { event, rsvps }
        })
        .collect())
}

pub async fn create(
    pool: &PGPool,
    user: &CurrentUser,
    dto: NewEventDto,
) -> Result<Event, ApiError> {
    validate(&dto)?;
    db::event::insert(pool, Uuid::new_v4(), &dto, user.id)
        .await?
        .ok_or(ApiError::Internal)
}

fn validate(dto: &NewEventDto) -> Result<(), ApiError> {
    if dto.name.trim().is_empty() || dto.location.trim().is_empty() || dto.date.trim().is_empty() {
        return Err(ApiError::BadRequest);
    }
    if matches!(dto.capacity, Some(capacity) if capacity < 0) {
        return Err(ApiError::BadRequest);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(name: &str, location: &str, date: &str, capacity: Option<i32>) -> NewEventDto {
        NewEventDto {
            name: name.to_string(),
            location: location.to_string(),
            date: date.to_string(),
            capacity,
        }
    }

    #[test]
    fn well_formed_events_pass_validation() {
        assert!(validate(&dto("Rust meetup", "Berlin", "2026-09-01", None)).is_ok());
        assert!(validate(&dto("Rust meetup", "Berlin", "2026-09-01", Some(0))).is_ok());
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        assert_eq!(
            validate(&dto("  ", "Berlin", "2026-09-01", None)),
            Err(ApiError::BadRequest)
        );
        assert_eq!(
            validate(&dto("Rust meetup", "", "2026-09-01", None)),
            Err(ApiError::BadRequest)
        );
        assert_eq!(
            validate(&dto("Rust meetup", "Berlin", "   ", None)),
            Err(ApiError::BadRequest)
        );
    }

    #[test]
    fn negative_capacity_is_rejected() {
        assert_eq!(
            validate(&dto("Rust meetup", "Berlin", "2026-09-01", Some(-1))),
            Err(ApiError::BadRequest)
        );
    }
}

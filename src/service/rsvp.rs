use uuid::Uuid;

use crate::db;
use crate::dto::{NewRsvpDto, RsvpWithEvent, RsvpWithUser, UpdateRsvpDto};
use crate::errors::{is_unique_violation, ApiError};
use crate::models::Rsvp;
use crate::service::auth::CurrentUser;
use crate::PGPool;

pub async fn get_by_event(pool: &PGPool, event_id: Uuid) -> Result<Vec<RsvpWithUser>, ApiError> {
    Ok(db::rsvp::list_by_event(pool, event_id).await?)
}

pub async fn get_my(pool: &PGPool, user: &CurrentUser) -> Result<Vec<RsvpWithEvent>, ApiError> {
    Ok(db::rsvp::list_by_user(pool, user.id).await?)
}

/// True when an event with the given capacity cannot admit another attendee.
/// `None` capacity means unlimited.
pub fn capacity_reached(capacity: Option<i32>, attending: i64) -> bool {
    match capacity {
        Some(capacity) => attending >= i64::from(capacity),
        None => false,
    }
}

/// Ownership gate for RSVP mutation: only the user who created the RSVP may
/// change or remove it.
pub fn ensure_owner(owner_id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
    if owner_id == user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Admits an RSVP for `(user, event_id)`. The event row is locked for the
/// whole check-then-insert sequence, so two concurrent admissions to the
/// same event serialize and the attending count can never overshoot the
/// capacity. The capacity gate runs before the duplicate gate; a user who
/// already holds an RSVP is turned away in either case and cannot count
/// against capacity twice.
pub async fn create(
    pool: &PGPool,
    user: &CurrentUser,
    event_id: Uuid,
    dto: NewRsvpDto,
) -> Result<Rsvp, ApiError> {
    let mut tx = pool.begin().await?;
    let event = db::event::lock_row(&mut tx, event_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if dto.status.is_attending() && event.capacity.is_some() {
        let attending = db::rsvp::count_attending(&mut tx, event_id).await?;
        if capacity_reached(event.capacity, attending) {
            return Err(ApiError::CapacityExceeded);
        }
    }

    if db::rsvp::find_by_user_and_event(&mut tx, user.id, event_id)
        .await?
        .is_some()
    {
        return Err(ApiError::DuplicateRsvp);
    }

    let rsvp = db::rsvp::insert(&mut tx, Uuid::new_v4(), user.id, event_id, dto.status)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ApiError::DuplicateRsvp
            } else {
                ApiError::from(err)
            }
        })?
        .ok_or(ApiError::Internal)?;
    tx.commit().await?;
    Ok(rsvp)
}

/// Changes an RSVP's status. The capacity count re-runs only when the RSVP
/// transitions into `attending` from a non-attending status; staying
/// attending or moving away from it is never gated.
pub async fn update(
    pool: &PGPool,
    user: &CurrentUser,
    id: Uuid,
    dto: UpdateRsvpDto,
) -> Result<Rsvp, ApiError> {
    let mut tx = pool.begin().await?;
    let rsvp = db::rsvp::lock_by_id(&mut tx, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    ensure_owner(rsvp.user_id, user.id)?;

    if dto.status.is_attending() && !rsvp.status.is_attending() {
        let event = db::event::lock_row(&mut tx, rsvp.event_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        if event.capacity.is_some() {
            let attending = db::rsvp::count_attending(&mut tx, rsvp.event_id).await?;
            if capacity_reached(event.capacity, attending) {
                return Err(ApiError::CapacityExceeded);
            }
        }
    }

    let updated = db::rsvp::set_status(&mut tx, id, dto.status)
        .await?
        .ok_or(ApiError::Internal)?;
    tx.commit().await?;
    Ok(updated)
}

/// Removes the caller's RSVP. Freed capacity needs no bookkeeping: the next
/// admission recounts the live rows.
pub async fn delete(pool: &PGPool, user: &CurrentUser, id: Uuid) -> Result<(), ApiError> {
    let rsvp = db::rsvp::get_by_id(pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    ensure_owner(rsvp.user_id, user.id)?;
    db::rsvp::delete(pool, id).await?;
    Ok(())
}

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::dto::{NewRsvpDto, UpdateRsvpDto};
use crate::errors::ApiError;
use crate::service;
use crate::PGPool;

#[get("/events/{event_id}/rsvps")]
pub async fn get_by_event(
    event_id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let rsvps = service::rsvp::get_by_event(pool_state.get_ref(), event_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rsvps))
}

#[get("/rsvps/mine")]
pub async fn get_mine(
    req: HttpRequest,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let user = service::auth::require_user(&req)?;
    let rsvps = service::rsvp::get_my(pool_state.get_ref(), &user).await?;
    Ok(HttpResponse::Ok().json(rsvps))
}

#[post("/events/{event_id}/rsvps")]
pub async fn create(
    req: HttpRequest,
    event_id: web::Path<Uuid>,
    new_rsvp_dto: web::Json<NewRsvpDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let user = service::auth::require_user(&req)?;
    let rsvp = service::rsvp::create(
        pool_state.get_ref(),
        &user,
        event_id.into_inner(),
        new_rsvp_dto.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(rsvp))
}

#[put("/rsvps/{id}")]
pub async fn update(
    req: HttpRequest,
    id: web::Path<Uuid>,
    update_rsvp_dto: web::Json<UpdateRsvpDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let user = service::auth::require_user(&req)?;
    let rsvp = service::rsvp::update(
        pool_state.get_ref(),
        &user,
        id.into_inner(),
        update_rsvp_dto.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(rsvp))
}

#[delete("/rsvps/{id}")]
pub async fn delete(
    req: HttpRequest,
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let user = service::auth::require_user(&req)?;
    service::rsvp::delete(pool_state.get_ref(), &user, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(get_by_event);
    cfg.service(get_mine);
    cfg.service(create);
    cfg.service(update);
    cfg.service(delete);
}

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::dto::NewEventDto;
use crate::errors::ApiError;
use crate::service;
use crate::PGPool;

#[get("/events")]
pub async fn get_all(pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let events = service::event::get_all(pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(events))
}

#[get("/events/mine")]
pub async fn get_mine(
    req: HttpRequest,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let user = service::auth::require_user(&req)?;
    let events = service::event::get_created_by(pool_state.get_ref(), &user).await?;
    Ok(HttpResponse::Ok().json(events))
}

#[get("/events/{id}")]
pub async fn get_by_id(
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let event = service::event::get_by_id(pool_state.get_ref(), id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(event))
}

#[post("/events")]
pub async fn create(
    req: HttpRequest,
    new_event_dto: web::Json<NewEventDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let user = service::auth::require_user(&req)?;
    let event =
        service::event::create(pool_state.get_ref(), &user, new_event_dto.into_inner()).await?;
    Ok(HttpResponse::Created().json(event))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    // `mine` registers before `{id}` so the literal segment is not captured
    // by the id pattern.
    cfg.service(get_mine);
    cfg.service(get_all);
    cfg.service(get_by_id);
    cfg.service(create);
}

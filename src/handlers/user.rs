use actix_web::{get, web, HttpRequest, HttpResponse};

use crate::errors::ApiError;
use crate::service;
use crate::PGPool;

#[get("/users")]
pub async fn get_all(
    req: HttpRequest,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    service::auth::require_user(&req)?;
    let accounts = service::user::get_accounts(pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(accounts))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(get_all);
}

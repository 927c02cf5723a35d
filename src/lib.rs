pub mod db;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod service;

use actix_web::web;
use sqlx::{postgres::Postgres, Pool};

pub type PGPool = Pool<Postgres>;

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_TTL_DAYS: i64 = 7;

/// Registers every route of the application. Shared between `main` and the
/// HTTP-level tests so both run the exact same surface.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(handlers::health)
            .configure(handlers::event::config)
            .configure(handlers::rsvp::config)
            .configure(handlers::user::config),
    );
    handlers::auth::config(cfg);
    handlers::views::config(cfg);
}

pub mod auth;
pub mod event;
pub mod rsvp;
pub mod user;
pub mod views;

use actix_web::http::header::{self, ContentType};
use actix_web::http::StatusCode;
use actix_web::{get, HttpResponse, Responder};
use askama::Template;
use log::error;

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json("OK")
}

pub(crate) fn render<T: Template>(status: StatusCode, template: &T) -> HttpResponse {
    match template.render() {
        Ok(body) => HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(body),
        Err(err) => {
            error!("template rendering failed: {}", err);
            HttpResponse::InternalServerError().body("internal error")
        }
    }
}

pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use askama::Template;
use log::error;

use super::{render, see_other};
use crate::dto::{LoginDto, SignupDto};
use crate::service;
use crate::{PGPool, SESSION_COOKIE};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate<'a> {
    user: Option<&'a service::auth::CurrentUser>,
    error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "signup.html")]
struct SignupTemplate<'a> {
    user: Option<&'a service::auth::CurrentUser>,
    error: Option<&'a str>,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .finish()
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

#[get("/auth/login")]
pub async fn login_page() -> HttpResponse {
    render(
        StatusCode::OK,
        &LoginTemplate {
            user: None,
            error: None,
        },
    )
}

#[post("/auth/login")]
pub async fn login(form: web::Form<LoginDto>, pool_state: web::Data<PGPool>) -> HttpResponse {
    match service::auth::login(pool_state.get_ref(), form.into_inner()).await {
        Ok(session) => HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/"))
            .cookie(session_cookie(session.token))
            .finish(),
        Err(err) => render(
            StatusCode::BAD_REQUEST,
            &LoginTemplate {
                user: None,
                error: Some(&err.to_string()),
            },
        ),
    }
}

#[get("/auth/signup")]
pub async fn signup_page() -> HttpResponse {
    render(
        StatusCode::OK,
        &SignupTemplate {
            user: None,
            error: None,
        },
    )
}

#[post("/auth/signup")]
pub async fn signup(form: web::Form<SignupDto>, pool_state: web::Data<PGPool>) -> HttpResponse {
    match service::auth::signup(pool_state.get_ref(), form.into_inner()).await {
        Ok(session) => HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/"))
            .cookie(session_cookie(session.token))
            .finish(),
        Err(err) => render(
            StatusCode::BAD_REQUEST,
            &SignupTemplate {
                user: None,
                error: Some(&err.to_string()),
            },
        ),
    }
}

#[get("/auth/logout")]
pub async fn logout(req: HttpRequest, pool_state: web::Data<PGPool>) -> HttpResponse {
    if let Some(token) = service::auth::session_token(&req) {
        if let Err(err) = service::auth::logout(pool_state.get_ref(), &token).await {
            error!("logout failed: {}", err);
        }
    }
    let mut response = see_other("/");
    if let Err(err) = response.add_cookie(&removal_cookie()) {
        error!("failed to clear session cookie: {}", err);
    }
    response
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(login_page);
    cfg.service(login);
    cfg.service(signup_page);
    cfg.service(signup);
    cfg.service(logout);
}

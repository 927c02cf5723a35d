use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{HttpMessage, HttpRequest};
use chrono::{Duration, Utc};
use futures_util::future::LocalBoxFuture;
use log::{info, warn};
use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use crate::db;
use crate::dto::{LoginDto, SignupDto};
use crate::errors::{is_unique_violation, ApiError};
use crate::models::Session;
use crate::service::crypto;
use crate::{PGPool, SESSION_COOKIE, SESSION_TTL_DAYS};

const SESSION_TOKEN_LEN: usize = 48;

/// The authenticated principal, resolved once per request by
/// [`SessionMiddleware`] and read back by handlers. Domain operations only
/// ever see this struct, never the session machinery behind it.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

pub fn current_user(req: &HttpRequest) -> Option<CurrentUser> {
    req.extensions().get::<CurrentUser>().cloned()
}

pub fn require_user(req: &HttpRequest) -> Result<CurrentUser, ApiError> {
    current_user(req).ok_or(ApiError::Unauthenticated)
}

/// Pulls the session token off a request: the `session` cookie for browser
/// traffic, falling back to an `Authorization: Bearer` header for API
/// clients.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

pub struct SessionMiddleware {
    pub db_pool: PGPool,
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = SessionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            db_pool: self.db_pool.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    db_pool: PGPool,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let pool = self.db_pool.clone();
        Box::pin(async move {
            if let Some(token) = session_token(req.request()) {
                match db::user::find_by_session(&pool, &token).await {
                    Ok(Some(profile)) => {
                        req.extensions_mut().insert(CurrentUser {
                            id: profile.id,
                            name: profile.name,
                            email: profile.email,
                        });
                    }
                    Ok(None) => {}
                    Err(err) => warn!("session lookup failed: {}", err),
                }
            }
            service.call(req).await
        })
    }
}

fn new_session(user_id: Uuid) -> Session {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LEN)
        .map(char::from)
        .collect();
    Session {
        id: Uuid::new_v4(),
        token,
        user_id,
        expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
        created_at: Utc::now(),
    }
}

/// Creates the user, its credential account, and a first session in one
/// transaction, so a half-registered account can never be observed.
pub async fn signup(pool: &PGPool, dto: SignupDto) -> Result<Session, ApiError> {
    let name = dto.name.trim();
    let email = dto.email.trim();
    if name.is_empty() || email.is_empty() || dto.password.is_empty() {
        return Err(ApiError::BadRequest);
    }
    if dto.password != dto.password_confirm {
        return Err(ApiError::BadRequest);
    }
    if db::user::email_exists(pool, email).await? {
        return Err(ApiError::BadRequest);
    }

    let user_id = Uuid::new_v4();
    let mut tx = pool.begin().await?;
    db::user::insert(&mut tx, user_id, name, email)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ApiError::BadRequest
            } else {
                ApiError::from(err)
            }
        })?;
    db::user::insert_account(&mut tx, Uuid::new_v4(), user_id, &crypto::sha3_hex(&dto.password))
        .await?;
    let session = new_session(user_id);
    db::user::insert_session(&mut tx, &session).await?;
    tx.commit().await?;
    info!("registered account for {}", email);
    Ok(session)
}

pub async fn login(pool: &PGPool, dto: LoginDto) -> Result<Session, ApiError> {
    let credential = db::user::find_credential_by_email(pool, dto.email.trim())
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    if !crypto::verify(&dto.password, &credential.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }
    let session = new_session(credential.user_id);
    let mut conn = pool.acquire().await?;
    db::user::insert_session(&mut conn, &session).await?;
    Ok(session)
}

pub async fn logout(pool: &PGPool, token: &str) -> Result<(), ApiError> {
    db::user::delete_session(pool, token).await?;
    Ok(())
}

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::{Display, Error};
use log::error;

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ApiError {
    #[display(fmt = "not found")]
    NotFound,

    #[display(fmt = "forbidden")]
    Forbidden,

    #[display(fmt = "authentication required")]
    Unauthenticated,

    #[display(fmt = "event is at full capacity")]
    CapacityExceeded,

    #[display(fmt = "you have already RSVPed to this event")]
    DuplicateRsvp,

    #[display(fmt = "invalid request")]
    BadRequest,

    #[display(fmt = "invalid email or password")]
    InvalidCredentials,

    #[display(fmt = "internal error")]
    Internal,
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::CapacityExceeded => StatusCode::BAD_REQUEST,
            ApiError::DuplicateRsvp => StatusCode::BAD_REQUEST,
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            err => {
                error!("database failure: {}", err);
                ApiError::Internal
            }
        }
    }
}

/// Storage-layer duplicate detection. The `(user_id, event_id)` uniqueness
/// constraint backs up the existence check when two RSVP inserts race;
/// callers map this onto [`ApiError::DuplicateRsvp`].
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::CapacityExceeded.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::DuplicateRsvp.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Internal.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert_eq!(ApiError::from(sqlx::Error::RowNotFound), ApiError::NotFound);
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}

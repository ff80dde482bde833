/// Every expected way an auth operation can fail.
///
/// Fallible operations return `Result<T, Failure>`: exactly one of the
/// success value or the failure is present, and callers `match` (or `?`)
/// before touching either. Nothing in this crate panics for these cases.
///
/// Token and credential failures are deliberately coarse. A bad signature,
/// an expired token and a garbled token are all `InvalidToken`; an unknown
/// email and a wrong password are both `InvalidCredentials`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    #[error("{0}")]
    Validation(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthenticated,
    #[error("invalid token")]
    InvalidToken,
    #[error("forbidden")]
    Forbidden,
    #[error("email already registered")]
    Conflict,
    #[error("resource not found")]
    NotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

impl Failure {
    pub fn internal(e: impl std::fmt::Display) -> Self {
        Self::Internal(e.to_string())
    }
}

#[cfg(feature = "server")]
mod response {
    use super::*;
    use actix_web::HttpResponse;
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;

    impl ResponseError for Failure {
        fn status_code(&self) -> StatusCode {
            match self {
                Self::Validation(_) => StatusCode::BAD_REQUEST,
                Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
                Self::Unauthenticated => StatusCode::UNAUTHORIZED,
                Self::InvalidToken => StatusCode::UNAUTHORIZED,
                Self::Forbidden => StatusCode::FORBIDDEN,
                Self::Conflict => StatusCode::CONFLICT,
                Self::NotFound => StatusCode::NOT_FOUND,
                Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
        fn error_response(&self) -> HttpResponse {
            let message = match self {
                Self::Internal(detail) => {
                    log::error!("[auth] internal failure: {}", detail);
                    "internal server error".to_string()
                }
                other => other.to_string(),
            };
            HttpResponse::build(self.status_code()).json(serde_json::json!({ "message": message }))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use actix_web::body::MessageBody;

        #[test]
        fn failures_map_to_fixed_statuses() {
            assert_eq!(Failure::Validation("short".into()).status_code(), StatusCode::BAD_REQUEST);
            assert_eq!(Failure::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(Failure::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(Failure::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(Failure::Forbidden.status_code(), StatusCode::FORBIDDEN);
            assert_eq!(Failure::Conflict.status_code(), StatusCode::CONFLICT);
            assert_eq!(Failure::NotFound.status_code(), StatusCode::NOT_FOUND);
            assert_eq!(Failure::internal("boom").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }

        #[test]
        fn internal_detail_stays_server_side() {
            let body = Failure::internal("connection refused on 10.0.0.3")
                .error_response()
                .into_body()
                .try_into_bytes()
                .unwrap();
            let body = String::from_utf8(body.to_vec()).unwrap();
            assert!(body.contains("internal server error"));
            assert!(!body.contains("10.0.0.3"));
        }
    }
}

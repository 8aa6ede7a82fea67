use epic_auth::CoordinationError;
use http::{Result as HttpResponse, StatusCode};

/// Helper trait for converting errors to a standard response error format
pub(crate) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Only the public message of a [`CoordinationError`] reaches the client
impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (status_for(&e), e.public_message()))
    }
}

/// Implementation for http::Error (used by Response::builder())
impl<T> IntoResponseError<T> for HttpResponse<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }
}

pub(crate) fn status_for(error: &CoordinationError) -> StatusCode {
    match error {
        CoordinationError::Unauthenticated | CoordinationError::SessionExpired => {
            StatusCode::UNAUTHORIZED
        }
        CoordinationError::InvalidCredentials
        | CoordinationError::InvalidTwoFactorCode
        | CoordinationError::Validation(_) => StatusCode::BAD_REQUEST,
        CoordinationError::Conflict(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epic_auth::{FieldError, SessionError};

    #[test]
    fn test_unauthenticated_is_401() {
        let result: Result<(), CoordinationError> = Err(CoordinationError::Unauthenticated);
        let (status, message) = result.into_response_error().unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "You must be logged in");
    }

    #[test]
    fn test_login_failures_share_a_message() {
        let result: Result<(), CoordinationError> = Err(CoordinationError::InvalidCredentials);
        let (status, message) = result.into_response_error().unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Invalid username or password");
    }

    #[test]
    fn test_validation_and_conflict() {
        let result: Result<(), CoordinationError> =
            Err(CoordinationError::Validation(vec![FieldError {
                field: "email",
                message: "Email is invalid".to_string(),
            }]));
        assert_eq!(
            result.into_response_error().unwrap_err(),
            (StatusCode::BAD_REQUEST, "Email is invalid".to_string())
        );

        let result: Result<(), CoordinationError> =
            Err(CoordinationError::Conflict("taken".to_string()));
        assert_eq!(result.into_response_error().unwrap_err().0, StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let result: Result<(), CoordinationError> = Err(CoordinationError::SessionError(
            SessionError::Storage("connection refused on 10.0.0.5".to_string()),
        ));
        let (status, message) = result.into_response_error().unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("10.0.0.5"));
    }

    #[test]
    fn test_success_case() {
        let result: Result<String, CoordinationError> = Ok("Success".to_string());
        assert_eq!(result.into_response_error().ok(), Some("Success".to_string()));
    }

    #[test]
    fn test_http_error() {
        let result: HttpResponse<String> = Err(StatusCode::from_u16(1000).unwrap_err().into());
        let (status, _) = result.into_response_error().unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

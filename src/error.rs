use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Crate-wide error type. Client-facing variants render their display
/// message as `{"message": ...}`; database faults render an opaque 500
/// and keep the detail in the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Already clocked in today")]
    AlreadyClockedIn,

    #[error("Already clocked out today")]
    AlreadyClockedOut,

    #[error("No clock-in record found for today")]
    NoClockInRecord,

    #[error("No employee profile is linked to this account")]
    UnlinkedAccount,

    #[error("Leave request already processed")]
    AlreadyProcessed,

    #[error("You cannot approve or reject your own leave request")]
    SelfApproval,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Forbidden")]
    Forbidden,

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::AlreadyClockedIn
            | ApiError::AlreadyClockedOut
            | ApiError::NoClockInRecord
            | ApiError::UnlinkedAccount
            | ApiError::AlreadyProcessed
            | ApiError::SelfApproval => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Reclassify a duplicate-key insert on the (employee_id, date) unique
    /// key as a state conflict. MySQL reports constraint violations with
    /// SQLSTATE 23000.
    pub fn from_clock_in_insert(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                return ApiError::AlreadyClockedIn;
            }
        }
        ApiError::Database(e)
    }

    pub fn is_duplicate_key(e: &sqlx::Error) -> bool {
        matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                HttpResponse::InternalServerError().json(json!({
                    "message": "Internal Server Error"
                }))
            }
            other => HttpResponse::build(other.status()).json(json!({
                "message": other.to_string()
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_conflicts_are_client_errors() {
        assert_eq!(ApiError::AlreadyClockedIn.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::AlreadyClockedOut.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NoClockInRecord.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::AlreadyProcessed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::SelfApproval.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UnlinkedAccount.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            ApiError::NotFound("Leave request").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::NotFound("Leave request").to_string(),
            "Leave request not found"
        );
    }

    #[test]
    fn storage_faults_are_opaque_server_errors() {
        let err = ApiError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_duplicate_insert_error_stays_a_server_fault() {
        let err = ApiError::from_clock_in_insert(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::Database(_)));
    }
}

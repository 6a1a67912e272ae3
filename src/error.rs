use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("{0} is required")]
    MissingRequiredField(&'static str),

    #[error("Employee shift information not found")]
    NoShiftAssigned,

    #[error("Employee is not assigned to the specified shift or shift is inactive")]
    ShiftNotAssignedOrInactive,

    #[error("Attendance record not found")]
    RecordNotFound,

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::MissingRequiredField(_)
            | AttendanceError::NoShiftAssigned
            | AttendanceError::ShiftNotAssignedOrInactive => StatusCode::BAD_REQUEST,
            AttendanceError::RecordNotFound => StatusCode::NOT_FOUND,
            AttendanceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // storage details stay in the logs
            AttendanceError::Storage(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not logged in")]
    Unauthorized,
    #[error("Role {role} cannot {action}")]
    Forbidden {
        role: &'static str,
        action: &'static str,
    },
    #[error("Student {0} not found")]
    StudentNotFound(String),
    #[error("Subject {0} not found")]
    SubjectNotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("A remark for student {0} is already being generated")]
    RemarkInFlight(String),
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::StudentNotFound(_) | Error::SubjectNotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::RemarkInFlight(_) => StatusCode::CONFLICT,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Error::Internal(e) = &self {
            tracing::error!("internal error: {:?}", e);
        }
        (self.status(), self.to_string()).into_response()
    }
}

impl From<tower_sessions::session::Error> for Error {
    fn from(e: tower_sessions::session::Error) -> Self {
        Error::Internal(anyhow::anyhow!("session store: {}", e))
    }
}

use hyper::StatusCode;
use thiserror::Error;
pub use tokio_postgres::Error as DbError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not configured")]
    Config(&'static str),
    #[error("Invalid configuration value of {0}")]
    InvalidConfig(&'static str),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid base64 data: {0}")]
    InvalidBase64(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    Database(#[from] DbError),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Hyper(#[from] hyper::Error),
    #[error("{0}")]
    Unexpected(anyhow::Error),
}

impl From<base64::DecodeError> for AppError {
    fn from(e: base64::DecodeError) -> AppError {
        AppError::InvalidBase64(e.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        use AppError::*;
        match self {
            MissingField(_) | BadRequest(_) | InvalidBase64(_) => StatusCode::BAD_REQUEST,
            NotFound(_) => StatusCode::NOT_FOUND,
            MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn missing_id() -> AppError {
        AppError::BadRequest(String::from("Missing interview id"))
    }
}

macro_rules! unexpected {
    () => {
        |e| {
            ::log::error!("Unexpected error: [{}][{}]{}", file!(), line!(), e);
            crate::error::AppError::Unexpected(e.into())
        }
    };
    ($msg: expr) => {{
        let msg = $msg.to_string();
        ::log::error!("Unexpected error: [{}][{}]{}", file!(), line!(), msg);
        crate::error::AppError::Unexpected(::anyhow::anyhow!(msg))
    }};
}

#[test]
fn error_status_and_message() {
    assert_eq!(AppError::MissingField("title").status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::MissingField("title").to_string(), "Missing required field: title");
    assert_eq!(AppError::NotFound("Interview").to_string(), "Interview not found");
    assert_eq!(AppError::NotFound("Interview").status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(AppError::Config("DATABASE_URL").to_string(), "DATABASE_URL not configured");
    assert_eq!(
        AppError::Config("DATABASE_URL").status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );

    let decode = base64::decode("@@").unwrap_err();
    let error = AppError::from(decode);
    assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    assert!(error.to_string().starts_with("Invalid base64 data: "));
}

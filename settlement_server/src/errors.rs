use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use settlement_engine::SettlementError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The request conflicts with the order's current state. {0}")]
    Conflict(String),
    #[error("The request cannot be fulfilled. {0}")]
    Rejected(String),
    #[error("A dependency of the server is unavailable. {0}")]
    TemporarilyUnavailable(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::TemporarilyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<SettlementError> for ServerError {
    fn from(e: SettlementError) -> Self {
        match &e {
            SettlementError::OrderNotFound(_) | SettlementError::UnknownOrder(_) => Self::NoRecordFound(e.to_string()),
            SettlementError::EmptyOrder |
            SettlementError::InvalidOrderItem(_) |
            SettlementError::BelowMinimumOrder { .. } => Self::Rejected(e.to_string()),
            SettlementError::IllegalTransition { .. } |
            SettlementError::ManualAcceptOfOnlineOrder |
            SettlementError::PaymentReferenceConflict { .. } => Self::Conflict(e.to_string()),
            SettlementError::MalformedNotification(_) => Self::InvalidRequestBody(e.to_string()),
            SettlementError::ConcurrentModification(_) |
            SettlementError::ProviderUnavailable(_) => Self::TemporarilyUnavailable(e.to_string()),
            SettlementError::ProviderLookupFailed(_) => Self::BackendError(e.to_string()),
            SettlementError::DatabaseError(_) => Self::BackendError(e.to_string()),
        }
    }
}

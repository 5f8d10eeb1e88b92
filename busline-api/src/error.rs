use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use busline_core::{BusType, CoreError};
use busline_ticket::TicketError;
use serde_json::json;

/// `Json` extractor whose rejections come back in the `{ "error": ... }` shape
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    CapacityExceeded {
        message: String,
        available: u32,
        route_name: String,
        route_category: BusType,
    },
    DeliveryError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::CapacityExceeded { message, available, route_name, route_category } => (
                StatusCode::CONFLICT,
                json!({
                    "error": message,
                    "available": available,
                    "route_name": route_name,
                    "route_category": route_category,
                }),
            ),
            AppError::DeliveryError(msg) => {
                tracing::warn!("Ticket delivery failed: {}", msg);
                (StatusCode::BAD_GATEWAY, json!({ "error": msg }))
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::RouteNotFound(_) | CoreError::BookingNotFound(_) => {
                AppError::NotFoundError(err.to_string())
            }
            CoreError::CapacityExceeded { available, ref route_name, route_category } => {
                AppError::CapacityExceeded {
                    message: err.to_string(),
                    available,
                    route_name: route_name.clone(),
                    route_category,
                }
            }
            CoreError::ValidationError(msg) => AppError::ValidationError(msg),
            CoreError::InvariantViolation { .. }
            | CoreError::TicketNumberExhausted(_)
            | CoreError::InternalError(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<TicketError> for AppError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::InvalidAddress(_) => AppError::ValidationError(err.to_string()),
            TicketError::Delivery(_) => AppError::DeliveryError(err.to_string()),
            TicketError::Compose(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

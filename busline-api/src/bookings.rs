use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use busline_core::{Booking, BookingRequest};
use busline_ticket::mailer::parse_recipient;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use crate::error::{AppError, AppJson};
use crate::state::AppState;
use crate::tickets::deliver_ticket;

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking: Booking,
    pub route: String,
    pub ticket_number: String,
    /// Non-fatal problems, e.g. the ticket email bounced
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BookingReportResponse {
    pub bookings: Vec<Booking>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", get(list_bookings).post(create_booking))
        .route("/v1/bookings/{id}", get(get_booking))
}

/// POST /v1/bookings
async fn create_booking(
    State(state): State<AppState>,
    AppJson(req): AppJson<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    // Reject a bad address before any seat is taken
    let recipient = req.contact_email();
    if let Some(address) = &recipient {
        parse_recipient(address)?;
    }

    let booking = state.ledger.create_booking(&req).await?;
    info!("Booking {} issued ticket {}", booking.id, booking.ticket_number);

    // The booking is committed; delivery problems only produce a warning
    let mut warnings = Vec::new();
    if let Some(address) = recipient {
        if let Err(e) = deliver_ticket(&state, &booking, &address).await {
            tracing::warn!(ticket_number = %booking.ticket_number, "Ticket email failed: {}", e);
            warnings.push(format!("Ticket email could not be delivered: {}", e));
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            route: booking.route.display_name(),
            ticket_number: booking.ticket_number.clone(),
            booking,
            warnings,
        }),
    ))
}

/// GET /v1/bookings
/// Booking report, newest first
async fn list_bookings(State(state): State<AppState>) -> Result<Json<BookingReportResponse>, AppError> {
    let bookings = state.ledger.list_bookings().await?;
    Ok(Json(BookingReportResponse { bookings }))
}

/// GET /v1/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.ledger.get_booking(booking_id).await?;
    Ok(Json(booking))
}

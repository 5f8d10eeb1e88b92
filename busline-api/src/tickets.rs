use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use busline_core::Booking;
use busline_ticket::{render_ticket, TicketDocument, TicketResult, TicketView};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::{AppError, AppJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailTicketRequest {
    pub email_to: String,
}

#[derive(Debug, Serialize)]
pub struct EmailTicketResponse {
    pub ticket_number: String,
    pub status: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/{id}/ticket.pdf", get(download_ticket))
        .route("/v1/bookings/{id}/preview", get(preview_ticket))
        .route("/v1/bookings/{id}/email", post(email_ticket))
}

/// Render the ticket and hand it to the configured mailer
pub async fn deliver_ticket(state: &AppState, booking: &Booking, recipient: &str) -> TicketResult<()> {
    let document = render_ticket(booking, state.boarding_offset());
    state.mailer.send_ticket(booking, recipient, &document).await
}

/// GET /v1/bookings/{id}/ticket.pdf
async fn download_ticket(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.ledger.get_booking(booking_id).await?;
    let document = render_ticket(&booking, state.boarding_offset());

    let headers = [
        (header::CONTENT_TYPE, TicketDocument::CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", document.file_name),
        ),
    ];
    Ok((headers, document.bytes))
}

/// GET /v1/bookings/{id}/preview
async fn preview_ticket(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<TicketView>, AppError> {
    let booking = state.ledger.get_booking(booking_id).await?;
    Ok(Json(TicketView::new(&booking, state.boarding_offset())))
}

/// POST /v1/bookings/{id}/email
/// Resend a ticket. Unlike booking creation, a delivery failure is an error here.
async fn email_ticket(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    AppJson(req): AppJson<EmailTicketRequest>,
) -> Result<Json<EmailTicketResponse>, AppError> {
    let booking = state.ledger.get_booking(booking_id).await?;
    deliver_ticket(&state, &booking, req.email_to.trim()).await?;

    Ok(Json(EmailTicketResponse {
        ticket_number: booking.ticket_number,
        status: "SENT".to_string(),
    }))
}

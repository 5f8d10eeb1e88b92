pub mod route;
pub mod booking;
pub mod fare;
pub mod availability;
pub mod validator;
pub mod ticket;
pub mod repository;

pub use route::{BusType, NewRoute, Route, RouteAvailability, RouteId, RouteRef};
pub use booking::{Booking, BookingRequest, PartySize};
pub use repository::BookingLedger;
pub use ticket::TicketNumberGenerator;

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Route not found: {0}")]
    RouteNotFound(RouteId),

    #[error("Booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error("Only {available} seats available for {route_name} ({route_category}).")]
    CapacityExceeded {
        available: u32,
        route_name: String,
        route_category: BusType,
    },

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Seat ledger inconsistent for route {route_id}: {booked} passengers booked against {total_seats} seats")]
    InvariantViolation {
        route_id: RouteId,
        booked: u64,
        total_seats: u32,
    },

    #[error("Could not allocate a unique ticket number after {0} attempts")]
    TicketNumberExhausted(u32),

    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

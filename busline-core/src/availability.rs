use crate::booking::Booking;
use crate::route::Route;
use crate::{CoreError, CoreResult};

/// Sum of adults and children over the given bookings
pub fn passengers_booked<'a, I>(bookings: I) -> u64
where
    I: IntoIterator<Item = &'a Booking>,
{
    bookings.into_iter().map(Booking::total_passengers).sum()
}

/// Remaining seats on a route given the passengers already booked on it.
///
/// More passengers than seats means the ledger was oversold; that is
/// reported as an invariant violation rather than clamped to zero.
pub fn available_seats(route: &Route, booked: u64) -> CoreResult<u32> {
    let total = u64::from(route.total_seats);
    if booked > total {
        tracing::error!(
            route_id = route.id,
            booked,
            total_seats = route.total_seats,
            "Route is oversold"
        );
        return Err(CoreError::InvariantViolation {
            route_id: route.id,
            booked,
            total_seats: route.total_seats,
        });
    }
    // booked <= total_seats, which is a u32
    Ok((total - booked) as u32)
}

use crate::availability::available_seats;
use crate::booking::PartySize;
use crate::route::Route;
use crate::{CoreError, CoreResult};

/// Admit a party onto a route given the passengers already booked on it.
///
/// Callers must hold the route's write lock (or row lock) from the moment
/// `booked` is read until the booking is persisted.
pub fn admit(route: &Route, booked: u64, party: PartySize) -> CoreResult<u32> {
    party.validate()?;

    let available = available_seats(route, booked)?;
    if party.total() > u64::from(available) {
        tracing::info!(
            route_id = route.id,
            requested = party.total(),
            available,
            "Booking rejected, not enough seats"
        );
        return Err(CoreError::CapacityExceeded {
            available,
            route_name: route.name.clone(),
            route_category: route.bus_type,
        });
    }

    Ok(available)
}

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::booking::{Booking, BookingRequest};
use crate::route::{NewRoute, Route, RouteAvailability, RouteId};
use crate::CoreResult;

/// Storage for the route catalog and the bookings made against it.
///
/// Implementations must run `create_booking` as one unit per route: the
/// passenger count is read, checked and the new booking written without
/// any other booking on the same route committing in between. Bookings on
/// different routes should not block each other.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Get-or-create each route keyed on (name, bus type). Existing routes
    /// are left as they are. Returns how many routes were created.
    async fn ensure_seeded(&self, catalog: &[NewRoute]) -> CoreResult<usize>;

    /// All routes with their remaining seats, ordered by name then class
    async fn list_routes_with_availability(&self) -> CoreResult<Vec<RouteAvailability>>;

    async fn get_route(&self, route_id: RouteId) -> CoreResult<Route>;

    /// Remaining seats computed from the bookings currently on the route
    async fn route_availability(&self, route_id: RouteId) -> CoreResult<u32>;

    /// Change a route's fare schedule. Already issued bookings keep the
    /// fare they were sold at.
    async fn update_route_fares(
        &self,
        route_id: RouteId,
        adult_fare: Decimal,
        child_fare: Decimal,
    ) -> CoreResult<Route>;

    /// Validate capacity, price, number and persist a booking atomically
    async fn create_booking(&self, request: &BookingRequest) -> CoreResult<Booking>;

    async fn get_booking(&self, booking_id: Uuid) -> CoreResult<Booking>;

    /// Every booking, newest first
    async fn list_bookings(&self) -> CoreResult<Vec<Booking>>;
}

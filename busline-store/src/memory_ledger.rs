use async_trait::async_trait;
use busline_core::availability::{available_seats, passengers_booked};
use busline_core::route::{sort_routes, validate_fares};
use busline_core::{
    validator, Booking, BookingLedger, BookingRequest, BusType, CoreError, CoreResult, NewRoute,
    Route, RouteAvailability, RouteId, TicketNumberGenerator,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

/// A route together with every booking made against it.
/// The mutex around a slot is the per-route booking lock.
struct RouteSlot {
    route: Route,
    bookings: Vec<Booking>,
}

#[derive(Default)]
struct Catalog {
    slots: BTreeMap<RouteId, Arc<Mutex<RouteSlot>>>,
    keys: HashMap<(String, BusType), RouteId>,
    next_id: RouteId,
}

/// Process-local ledger, used for development and tests
pub struct InMemoryLedger {
    catalog: RwLock<Catalog>,
    booking_index: RwLock<HashMap<Uuid, RouteId>>,
    tickets: Mutex<HashSet<String>>,
    ticket_numbers: TicketNumberGenerator,
}

impl InMemoryLedger {
    pub fn new(ticket_numbers: TicketNumberGenerator) -> Self {
        Self {
            catalog: RwLock::new(Catalog::default()),
            booking_index: RwLock::new(HashMap::new()),
            tickets: Mutex::new(HashSet::new()),
            ticket_numbers,
        }
    }

    async fn slot(&self, route_id: RouteId) -> CoreResult<Arc<Mutex<RouteSlot>>> {
        self.catalog
            .read()
            .await
            .slots
            .get(&route_id)
            .cloned()
            .ok_or(CoreError::RouteNotFound(route_id))
    }

    /// Record the ticket number, false if it is already taken
    async fn claim_ticket(&self, ticket_number: &str) -> bool {
        self.tickets.lock().await.insert(ticket_number.to_string())
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(TicketNumberGenerator::default())
    }
}

#[async_trait]
impl BookingLedger for InMemoryLedger {
    async fn ensure_seeded(&self, catalog: &[NewRoute]) -> CoreResult<usize> {
        catalog.iter().try_for_each(NewRoute::validate)?;

        let mut state = self.catalog.write().await;
        let mut created = 0;

        for entry in catalog {
            let key = (entry.name.clone(), entry.bus_type);
            if state.keys.contains_key(&key) {
                continue;
            }

            state.next_id += 1;
            let route = Route {
                id: state.next_id,
                name: entry.name.clone(),
                bus_type: entry.bus_type,
                total_seats: entry.total_seats,
                adult_fare: entry.adult_fare,
                child_fare: entry.child_fare,
            };
            state.keys.insert(key, route.id);
            state.slots.insert(
                route.id,
                Arc::new(Mutex::new(RouteSlot { route, bookings: Vec::new() })),
            );
            created += 1;
        }

        Ok(created)
    }

    async fn list_routes_with_availability(&self) -> CoreResult<Vec<RouteAvailability>> {
        let slots: Vec<Arc<Mutex<RouteSlot>>> =
            self.catalog.read().await.slots.values().cloned().collect();

        let mut routes = Vec::with_capacity(slots.len());
        for slot in slots {
            let slot = slot.lock().await;
            let available = available_seats(&slot.route, passengers_booked(&slot.bookings))?;
            routes.push(RouteAvailability {
                route: slot.route.clone(),
                available_seats: available,
            });
        }

        sort_routes(&mut routes);
        Ok(routes)
    }

    async fn get_route(&self, route_id: RouteId) -> CoreResult<Route> {
        let slot = self.slot(route_id).await?;
        let route = slot.lock().await.route.clone();
        Ok(route)
    }

    async fn route_availability(&self, route_id: RouteId) -> CoreResult<u32> {
        let slot = self.slot(route_id).await?;
        let slot = slot.lock().await;
        available_seats(&slot.route, passengers_booked(&slot.bookings))
    }

    async fn update_route_fares(
        &self,
        route_id: RouteId,
        adult_fare: Decimal,
        child_fare: Decimal,
    ) -> CoreResult<Route> {
        validate_fares(adult_fare, child_fare)?;
        let slot = self.slot(route_id).await?;
        let mut slot = slot.lock().await;
        slot.route.adult_fare = adult_fare;
        slot.route.child_fare = child_fare;
        info!(route_id, %adult_fare, %child_fare, "Route fares updated");
        Ok(slot.route.clone())
    }

    async fn create_booking(&self, request: &BookingRequest) -> CoreResult<Booking> {
        let slot = self.slot(request.route_id).await?;
        let mut slot = slot.lock().await;

        validator::admit(&slot.route, passengers_booked(&slot.bookings), request.party)?;

        let booked_at = Utc::now();
        let max_attempts = self.ticket_numbers.max_attempts();
        for attempt in 1..=max_attempts {
            let ticket_number = self.ticket_numbers.generate(slot.route.id, booked_at);
            if !self.claim_ticket(&ticket_number).await {
                warn!(attempt, ticket_number = %ticket_number, "Ticket number collision, regenerating");
                continue;
            }

            let booking = Booking::issue(request, &slot.route, ticket_number, booked_at);
            slot.bookings.push(booking.clone());
            self.booking_index.write().await.insert(booking.id, slot.route.id);

            info!(
                booking_id = %booking.id,
                ticket_number = %booking.ticket_number,
                route_id = slot.route.id,
                passengers = booking.total_passengers(),
                "Booking confirmed"
            );
            return Ok(booking);
        }

        Err(CoreError::TicketNumberExhausted(max_attempts))
    }

    async fn get_booking(&self, booking_id: Uuid) -> CoreResult<Booking> {
        let route_id = self
            .booking_index
            .read()
            .await
            .get(&booking_id)
            .copied()
            .ok_or(CoreError::BookingNotFound(booking_id))?;

        let slot = self.slot(route_id).await?;
        let slot = slot.lock().await;
        slot.bookings
            .iter()
            .find(|b| b.id == booking_id)
            .cloned()
            .ok_or(CoreError::BookingNotFound(booking_id))
    }

    async fn list_bookings(&self) -> CoreResult<Vec<Booking>> {
        let slots: Vec<Arc<Mutex<RouteSlot>>> =
            self.catalog.read().await.slots.values().cloned().collect();

        let mut bookings = Vec::new();
        for slot in slots {
            bookings.extend(slot.lock().await.bookings.iter().cloned());
        }
        bookings.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(bookings)
    }
}

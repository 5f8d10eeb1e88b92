use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::route::{Route, RouteId, RouteRef};
use crate::{CoreError, CoreResult};

pub const ANONYMOUS_PASSENGER: &str = "Anonymous";

/// Number of adults and children travelling on one ticket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PartySize {
    #[serde(default)]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
}

impl PartySize {
    pub fn new(adults: u32, children: u32) -> Self {
        Self { adults, children }
    }

    pub fn total(&self) -> u64 {
        u64::from(self.adults) + u64::from(self.children)
    }

    /// A ticket must carry at least one passenger
    pub fn validate(&self) -> CoreResult<()> {
        if self.total() == 0 {
            return Err(CoreError::ValidationError(
                "A booking needs at least one adult or child".to_string(),
            ));
        }
        Ok(())
    }
}

/// Inbound request to book seats on a route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub name: String,
    pub route_id: RouteId,
    #[serde(flatten)]
    pub party: PartySize,
    #[serde(default)]
    pub email: Option<String>,
}

impl BookingRequest {
    pub fn new(name: &str, route_id: RouteId, party: PartySize, email: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            route_id,
            party,
            email,
        }
    }

    /// Trimmed passenger name, falling back to "Anonymous"
    pub fn passenger_name(&self) -> String {
        let name = self.name.trim();
        if name.is_empty() {
            ANONYMOUS_PASSENGER.to_string()
        } else {
            name.to_string()
        }
    }

    /// Blank emails are treated as absent
    pub fn contact_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
    }
}

/// A committed booking. The ticket number and fare are fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub name: String,
    pub route: RouteRef,
    pub adults: u32,
    pub children: u32,
    pub email: Option<String>,
    pub booked_at: DateTime<Utc>,
    pub ticket_number: String,
    pub total_fare: Decimal,
}

impl Booking {
    /// Build the record for an admitted request. Fare is taken from the
    /// route's schedule as it stands now.
    pub fn issue(
        request: &BookingRequest,
        route: &Route,
        ticket_number: String,
        booked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: request.passenger_name(),
            route: route.to_ref(),
            adults: request.party.adults,
            children: request.party.children,
            email: request.contact_email(),
            booked_at,
            ticket_number,
            total_fare: crate::fare::total_fare(route, request.party),
        }
    }

    pub fn party(&self) -> PartySize {
        PartySize::new(self.adults, self.children)
    }

    pub fn total_passengers(&self) -> u64 {
        self.party().total()
    }
}

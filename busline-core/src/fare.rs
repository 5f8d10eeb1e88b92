use rust_decimal::Decimal;

use crate::booking::PartySize;
use crate::route::Route;

/// `adults * adult_fare + children * child_fare` at the route's current schedule
pub fn total_fare(route: &Route, party: PartySize) -> Decimal {
    Decimal::from(party.adults) * route.adult_fare + Decimal::from(party.children) * route.child_fare
}

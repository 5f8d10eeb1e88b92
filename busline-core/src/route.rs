use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

pub type RouteId = i32;

/// Bus class offered on a route
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BusType {
    #[serde(rename = "AC")]
    Ac,
    #[serde(rename = "Non-AC")]
    NonAc,
}

impl BusType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusType::Ac => "AC",
            BusType::NonAc => "Non-AC",
        }
    }
}

impl fmt::Display for BusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AC" => Ok(BusType::Ac),
            "Non-AC" => Ok(BusType::NonAc),
            other => Err(CoreError::ValidationError(format!("Unknown bus type: {}", other))),
        }
    }
}

/// A bus route with its seat capacity and fare schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub bus_type: BusType,
    pub total_seats: u32,
    pub adult_fare: Decimal,
    pub child_fare: Decimal,
}

impl Route {
    /// "Antop Hill to Goregaon (AC)"
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.bus_type)
    }

    pub fn to_ref(&self) -> RouteRef {
        RouteRef {
            id: self.id,
            name: self.name.clone(),
            bus_type: self.bus_type,
        }
    }
}

/// The identifying part of a route, carried on every booking.
/// Name and class are fixed once the route is seeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteRef {
    pub id: RouteId,
    pub name: String,
    pub bus_type: BusType,
}

impl RouteRef {
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.bus_type)
    }
}

/// Catalog entry used when seeding routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoute {
    pub name: String,
    pub bus_type: BusType,
    pub total_seats: u32,
    pub adult_fare: Decimal,
    pub child_fare: Decimal,
}

impl NewRoute {
    pub fn new(name: &str, bus_type: BusType, total_seats: u32, adult_fare: Decimal, child_fare: Decimal) -> Self {
        Self {
            name: name.to_string(),
            bus_type,
            total_seats,
            adult_fare,
            child_fare,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ValidationError("Route name must not be empty".to_string()));
        }
        validate_fares(self.adult_fare, self.child_fare)
    }
}

pub fn validate_fares(adult_fare: Decimal, child_fare: Decimal) -> CoreResult<()> {
    if adult_fare.is_sign_negative() || child_fare.is_sign_negative() {
        return Err(CoreError::ValidationError(format!(
            "Fares must not be negative (adult {}, child {})",
            adult_fare, child_fare
        )));
    }
    Ok(())
}

/// A route paired with its remaining seats, as shown on the booking page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteAvailability {
    #[serde(flatten)]
    pub route: Route,
    pub available_seats: u32,
}

/// Catalog ordering: by name, then by class
pub fn sort_routes(routes: &mut [RouteAvailability]) {
    routes.sort_by(|a, b| {
        a.route
            .name
            .cmp(&b.route.name)
            .then(a.route.bus_type.cmp(&b.route.bus_type))
    });
}

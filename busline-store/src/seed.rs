use busline_core::{BookingLedger, BusType, CoreResult, NewRoute};
use rust_decimal::Decimal;
use tracing::info;

/// The routes served out of the box
pub fn default_catalog() -> Vec<NewRoute> {
    let fare = |rupees: i64| Decimal::new(rupees * 100, 2);
    vec![
        NewRoute::new("Antop Hill to Goregaon", BusType::Ac, 40, fare(35), fare(20)),
        NewRoute::new("Kopar Khairane to Uran", BusType::NonAc, 35, fare(25), fare(15)),
        NewRoute::new("Kharghar Station to Vely Ship Taoja", BusType::Ac, 40, fare(30), fare(15)),
        NewRoute::new("Marol Maroshi to Worli", BusType::NonAc, 35, fare(35), fare(20)),
        NewRoute::new("Dindoshi to Kurla", BusType::Ac, 40, fare(30), fare(15)),
        NewRoute::new("Borivali to Panvel", BusType::NonAc, 40, fare(35), fare(20)),
    ]
}

/// Seed the default catalog once at startup. Safe to call repeatedly.
pub async fn ensure_catalog_seeded(ledger: &dyn BookingLedger) -> CoreResult<usize> {
    let created = ledger.ensure_seeded(&default_catalog()).await?;
    info!("Route catalog ready ({} routes created)", created);
    Ok(created)
}

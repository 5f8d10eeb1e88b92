use async_trait::async_trait;
use busline_core::availability::available_seats;
use busline_core::route::validate_fares;
use busline_core::{
    validator, Booking, BookingLedger, BookingRequest, CoreError, CoreResult, NewRoute, Route,
    RouteAvailability, RouteId, RouteRef, TicketNumberGenerator,
};
use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

/// Postgres backed ledger.
///
/// `create_booking` locks the route row with `SELECT ... FOR UPDATE` inside
/// the booking transaction, so bookings on the same route queue behind one
/// another while other routes are unaffected.
pub struct PgLedger {
    pool: PgPool,
    ticket_numbers: TicketNumberGenerator,
}

impl PgLedger {
    pub fn new(pool: PgPool, ticket_numbers: TicketNumberGenerator) -> Self {
        Self { pool, ticket_numbers }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct RouteRow {
    id: i32,
    name: String,
    bus_type: String,
    total_seats: i32,
    adult_fare: Decimal,
    child_fare: Decimal,
}

#[derive(sqlx::FromRow)]
struct RouteUsageRow {
    #[sqlx(flatten)]
    route: RouteRow,
    booked: i64,
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    name: String,
    route_id: i32,
    route_name: String,
    route_bus_type: String,
    adults: i32,
    children: i32,
    email: Option<String>,
    booked_at: DateTime<Utc>,
    ticket_number: String,
    total_fare: Decimal,
}

impl TryFrom<RouteRow> for Route {
    type Error = CoreError;

    fn try_from(row: RouteRow) -> Result<Self, Self::Error> {
        Ok(Route {
            id: row.id,
            name: row.name,
            bus_type: row.bus_type.parse()?,
            total_seats: to_count(row.total_seats, "total_seats")?,
            adult_fare: row.adult_fare,
            child_fare: row.child_fare,
        })
    }
}

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            name: row.name,
            route: RouteRef {
                id: row.route_id,
                name: row.route_name,
                bus_type: row.route_bus_type.parse()?,
            },
            adults: to_count(row.adults, "adults")?,
            children: to_count(row.children, "children")?,
            email: row.email,
            booked_at: row.booked_at,
            ticket_number: row.ticket_number,
            total_fare: row.total_fare,
        })
    }
}

fn to_count(value: i32, column: &str) -> CoreResult<u32> {
    u32::try_from(value)
        .map_err(|_| CoreError::InternalError(format!("Negative {} in storage: {}", column, value)))
}

fn to_column(value: u32, column: &str) -> CoreResult<i32> {
    i32::try_from(value)
        .map_err(|_| CoreError::ValidationError(format!("{} is too large: {}", column, value)))
}

fn db_error(err: sqlx::Error) -> CoreError {
    tracing::error!("Database error: {}", err);
    CoreError::InternalError(err.to_string())
}

const ROUTE_COLUMNS: &str = "id, name, bus_type, total_seats, adult_fare, child_fare";

const BOOKING_SELECT: &str = r#"
    SELECT b.id, b.name, b.route_id, r.name AS route_name, r.bus_type AS route_bus_type,
           b.adults, b.children, b.email, b.booked_at, b.ticket_number, b.total_fare
    FROM bookings b
    JOIN bus_routes r ON r.id = b.route_id
"#;

#[async_trait]
impl BookingLedger for PgLedger {
    async fn ensure_seeded(&self, catalog: &[NewRoute]) -> CoreResult<usize> {
        catalog.iter().try_for_each(NewRoute::validate)?;

        // All or nothing
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let mut created = 0;
        for entry in catalog {
            let result = sqlx::query(
                r#"
                INSERT INTO bus_routes (name, bus_type, total_seats, adult_fare, child_fare)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (name, bus_type) DO NOTHING
                "#,
            )
            .bind(&entry.name)
            .bind(entry.bus_type.as_str())
            .bind(to_column(entry.total_seats, "total_seats")?)
            .bind(entry.adult_fare)
            .bind(entry.child_fare)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

            created += result.rows_affected() as usize;
        }
        tx.commit().await.map_err(db_error)?;
        Ok(created)
    }

    async fn list_routes_with_availability(&self) -> CoreResult<Vec<RouteAvailability>> {
        let rows = sqlx::query_as::<_, RouteUsageRow>(
            r#"
            SELECT r.id, r.name, r.bus_type, r.total_seats, r.adult_fare, r.child_fare,
                   COALESCE(SUM(b.adults + b.children), 0)::BIGINT AS booked
            FROM bus_routes r
            LEFT JOIN bookings b ON b.route_id = r.id
            GROUP BY r.id
            ORDER BY r.name, r.bus_type
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|row| -> CoreResult<RouteAvailability> {
                let booked = u64::try_from(row.booked).unwrap_or(0);
                let route = Route::try_from(row.route)?;
                let available = available_seats(&route, booked)?;
                Ok(RouteAvailability { route, available_seats: available })
            })
            .collect()
    }

    async fn get_route(&self, route_id: RouteId) -> CoreResult<Route> {
        let row = sqlx::query_as::<_, RouteRow>(&format!(
            "SELECT {} FROM bus_routes WHERE id = $1",
            ROUTE_COLUMNS
        ))
        .bind(route_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(CoreError::RouteNotFound(route_id))?;

        Route::try_from(row)
    }

    async fn route_availability(&self, route_id: RouteId) -> CoreResult<u32> {
        let route = self.get_route(route_id).await?;
        let booked: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(adults + children), 0)::BIGINT FROM bookings WHERE route_id = $1",
        )
        .bind(route_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        available_seats(&route, u64::try_from(booked).unwrap_or(0))
    }

    async fn update_route_fares(
        &self,
        route_id: RouteId,
        adult_fare: Decimal,
        child_fare: Decimal,
    ) -> CoreResult<Route> {
        validate_fares(adult_fare, child_fare)?;
        let row = sqlx::query_as::<_, RouteRow>(&format!(
            "UPDATE bus_routes SET adult_fare = $2, child_fare = $3 WHERE id = $1 RETURNING {}",
            ROUTE_COLUMNS
        ))
        .bind(route_id)
        .bind(adult_fare)
        .bind(child_fare)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(CoreError::RouteNotFound(route_id))?;

        info!(route_id, %adult_fare, %child_fare, "Route fares updated");
        Route::try_from(row)
    }

    async fn create_booking(&self, request: &BookingRequest) -> CoreResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // Row lock held until commit or rollback
        let row = sqlx::query_as::<_, RouteRow>(&format!(
            "SELECT {} FROM bus_routes WHERE id = $1 FOR UPDATE",
            ROUTE_COLUMNS
        ))
        .bind(request.route_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?
        .ok_or(CoreError::RouteNotFound(request.route_id))?;
        let route = Route::try_from(row)?;

        let booked: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(adults + children), 0)::BIGINT FROM bookings WHERE route_id = $1",
        )
        .bind(route.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        // Dropping `tx` on error rolls the transaction back
        validator::admit(&route, u64::try_from(booked).unwrap_or(0), request.party)?;

        // TIMESTAMPTZ keeps microseconds
        let booked_at = Utc::now().trunc_subsecs(6);
        let max_attempts = self.ticket_numbers.max_attempts();
        for attempt in 1..=max_attempts {
            let ticket_number = self.ticket_numbers.generate(route.id, booked_at);
            let booking = Booking::issue(request, &route, ticket_number, booked_at);

            let inserted: Option<Uuid> = sqlx::query_scalar(
                r#"
                INSERT INTO bookings (id, name, route_id, adults, children, email, booked_at, ticket_number, total_fare)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (ticket_number) DO NOTHING
                RETURNING id
                "#,
            )
            .bind(booking.id)
            .bind(&booking.name)
            .bind(route.id)
            .bind(to_column(booking.adults, "adults")?)
            .bind(to_column(booking.children, "children")?)
            .bind(&booking.email)
            .bind(booking.booked_at)
            .bind(&booking.ticket_number)
            .bind(booking.total_fare)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error)?;

            if inserted.is_none() {
                warn!(attempt, ticket_number = %booking.ticket_number, "Ticket number collision, regenerating");
                continue;
            }

            tx.commit().await.map_err(db_error)?;

            info!(
                booking_id = %booking.id,
                ticket_number = %booking.ticket_number,
                route_id = route.id,
                passengers = booking.total_passengers(),
                "Booking confirmed"
            );
            return Ok(booking);
        }

        Err(CoreError::TicketNumberExhausted(max_attempts))
    }

    async fn get_booking(&self, booking_id: Uuid) -> CoreResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(&format!("{} WHERE b.id = $1", BOOKING_SELECT))
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(CoreError::BookingNotFound(booking_id))?;

        Booking::try_from(row)
    }

    async fn list_bookings(&self) -> CoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!("{} ORDER BY b.booked_at DESC", BOOKING_SELECT))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(Booking::try_from).collect()
    }
}

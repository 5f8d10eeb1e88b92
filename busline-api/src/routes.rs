use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use busline_core::{Route, RouteAvailability, RouteId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::error::{AppError, AppJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RouteListResponse {
    pub routes: Vec<RouteAvailability>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub route_id: RouteId,
    pub route: String,
    pub total_seats: u32,
    pub available_seats: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFaresRequest {
    pub adult_fare: Decimal,
    pub child_fare: Decimal,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/routes", get(list_routes))
        .route("/v1/routes/{id}/availability", get(route_availability))
        .route("/v1/routes/{id}/fares", put(update_fares))
}

/// GET /v1/routes
async fn list_routes(State(state): State<AppState>) -> Result<Json<RouteListResponse>, AppError> {
    let routes = state.ledger.list_routes_with_availability().await?;
    Ok(Json(RouteListResponse { routes }))
}

/// GET /v1/routes/{id}/availability
async fn route_availability(
    State(state): State<AppState>,
    Path(route_id): Path<RouteId>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let route = state.ledger.get_route(route_id).await?;
    let available_seats = state.ledger.route_availability(route_id).await?;

    Ok(Json(AvailabilityResponse {
        route_id,
        route: route.display_name(),
        total_seats: route.total_seats,
        available_seats,
    }))
}

/// PUT /v1/routes/{id}/fares
/// Issued bookings keep the fare they were sold at
async fn update_fares(
    State(state): State<AppState>,
    Path(route_id): Path<RouteId>,
    AppJson(req): AppJson<UpdateFaresRequest>,
) -> Result<Json<Route>, AppError> {
    let route = state
        .ledger
        .update_route_fares(route_id, req.adult_fare, req.child_fare)
        .await?;
    Ok(Json(route))
}

//! Trip handlers: CRUD with ownership checks.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, FieldError, Result};
use crate::models::Trip;
use crate::store::{TripFilter, TripSort};
use crate::validate;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTripsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
}

/// Fetch a trip and confirm the caller owns it.
async fn owned_trip(state: &AppState, ctx: &Ctx, trip_id: &str) -> Result<Trip> {
    let trip = state
        .store
        .get_trip(trip_id)
        .await?
        .ok_or(Error::TripNotFound)?;

    if trip.user_id != ctx.user_id() {
        return Err(Error::TripAccessDenied);
    }

    Ok(trip)
}

/// POST /api/v1/trips
pub async fn create_trip(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(req): Json<TripRequest>,
) -> Result<(StatusCode, Json<Trip>)> {
    let mut errors = Vec::new();

    let destination = req.destination.as_deref().map(str::trim).unwrap_or_default();
    if destination.is_empty() {
        errors.push(FieldError {
            field: "destination",
            message: "Destination is required",
        });
    }

    let start = match req.start_date.as_deref() {
        Some(value) => validate::parse_trip_date("startDate", value, &mut errors),
        None => {
            errors.push(FieldError {
                field: "startDate",
                message: "Start date is required",
            });
            None
        }
    };
    let end = match req.end_date.as_deref() {
        Some(value) => validate::parse_trip_date("endDate", value, &mut errors),
        None => {
            errors.push(FieldError {
                field: "endDate",
                message: "End date is required",
            });
            None
        }
    };

    if let (Some(start), Some(end)) = (start, end) {
        validate::check_date_order(start, end, &mut errors);
    }

    let (Some(start), Some(end)) = (start, end) else {
        return Err(Error::Validation(errors));
    };
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let trip = state
        .store
        .create_trip(
            ctx.user_id(),
            destination,
            start,
            end,
            req.description.as_deref(),
        )
        .await?;

    info!("Trip to {} created for {}", trip.destination, ctx.email());

    Ok((StatusCode::CREATED, Json(trip)))
}

/// GET /api/v1/trips
///
/// Plain array by default; `page`/`limit` switch the body to a paginated
/// envelope with totals.
pub async fn list_trips(
    State(state): State<AppState>,
    ctx: Ctx,
    Query(query): Query<ListTripsQuery>,
) -> Result<Json<Value>> {
    let mut errors = Vec::new();

    let start_date = query
        .start_date
        .as_deref()
        .and_then(|v| validate::parse_trip_date("startDate", v, &mut errors));
    let end_date = query
        .end_date
        .as_deref()
        .and_then(|v| validate::parse_trip_date("endDate", v, &mut errors));

    let sort = match query.sort_by.as_deref() {
        None | Some("startDate") => TripSort::StartDate,
        Some("endDate") => TripSort::EndDate,
        Some("destination") => TripSort::Destination,
        Some("createdAt") => TripSort::CreatedAt,
        Some(_) => {
            errors.push(FieldError {
                field: "sortBy",
                message: "Unknown sort field",
            });
            TripSort::StartDate
        }
    };
    let descending = matches!(query.order.as_deref(), Some("desc"));

    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let filter = TripFilter {
        start_date,
        end_date,
        sort,
        descending,
        limit: None,
        offset: None,
    };

    if query.page.is_none() && query.limit.is_none() {
        let trips = state.store.list_trips(ctx.user_id(), &filter).await?;
        return Ok(Json(json!(trips)));
    }

    let page = i64::from(query.page.unwrap_or(1).max(1));
    let limit = i64::from(query.limit.unwrap_or(10).clamp(1, 100));

    let total = state.store.count_trips(ctx.user_id(), &filter).await?;
    let paged = TripFilter {
        limit: Some(limit),
        offset: Some((page - 1) * limit),
        ..filter
    };
    let trips = state.store.list_trips(ctx.user_id(), &paged).await?;

    Ok(Json(json!({
        "trips": trips,
        "pagination": {
            "currentPage": page,
            "totalPages": (total + limit - 1) / limit,
            "totalItems": total,
        }
    })))
}

/// GET /api/v1/trips/{trip_id}
pub async fn get_trip(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(trip_id): Path<String>,
) -> Result<Json<Trip>> {
    let trip = owned_trip(&state, &ctx, &trip_id).await?;
    Ok(Json(trip))
}

/// PUT /api/v1/trips/{trip_id}
pub async fn update_trip(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(trip_id): Path<String>,
    Json(req): Json<TripRequest>,
) -> Result<Json<Trip>> {
    let mut trip = owned_trip(&state, &ctx, &trip_id).await?;
    let mut errors = Vec::new();

    if let Some(destination) = req.destination.as_deref() {
        let destination = destination.trim();
        if destination.is_empty() {
            errors.push(FieldError {
                field: "destination",
                message: "Destination is required",
            });
        } else {
            trip.destination = destination.to_owned();
        }
    }
    if let Some(value) = req.start_date.as_deref() {
        if let Some(date) = validate::parse_trip_date("startDate", value, &mut errors) {
            trip.start_date = date;
        }
    }
    if let Some(value) = req.end_date.as_deref() {
        if let Some(date) = validate::parse_trip_date("endDate", value, &mut errors) {
            trip.end_date = date;
        }
    }
    if let Some(description) = req.description {
        trip.description = Some(description);
    }

    // Date order is re-checked over the merged values.
    validate::check_date_order(trip.start_date, trip.end_date, &mut errors);

    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    trip.updated_at = Utc::now();
    state.store.update_trip(&trip).await?;

    Ok(Json(trip))
}

/// DELETE /api/v1/trips/{trip_id}
pub async fn delete_trip(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(trip_id): Path<String>,
) -> Result<Json<StatusResponse>> {
    let trip = owned_trip(&state, &ctx, &trip_id).await?;

    state.store.delete_trip(&trip.id).await?;

    info!("Trip to {} deleted by {}", trip.destination, ctx.email());

    Ok(Json(StatusResponse { message: "OK" }))
}

//! Place handlers

use crate::api::ApiError;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use seshy_common::db::models::Place;
use serde::Deserialize;
use uuid::Uuid;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Deserialize)]
pub struct PlaceListQuery {
    /// Center latitude for radius search
    pub latitude: Option<f64>,
    /// Center longitude for radius search
    pub longitude: Option<f64>,
    /// Search radius in kilometers
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Deserialize)]
pub struct PlaceCreate {
    pub name: String,
    pub details: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state_region: Option<String>,
    pub room_number: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub max_capacity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceUpdate {
    pub name: Option<String>,
    pub details: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state_region: Option<String>,
    pub room_number: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
    pub max_capacity: Option<i64>,
}

fn validate_coordinates(latitude: f64, longitude: f64, radius: f64) -> Result<(), ApiError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ApiError::BadRequest("latitude must be in [-90, 90]".to_string()));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ApiError::BadRequest("longitude must be in [-180, 180]".to_string()));
    }
    if radius < 0.0 {
        return Err(ApiError::BadRequest("radius must be non-negative".to_string()));
    }
    Ok(())
}

pub(crate) async fn fetch_place(
    db: &sqlx::SqlitePool,
    place_id: Uuid,
) -> Result<Place, ApiError> {
    sqlx::query_as::<_, Place>("SELECT * FROM places WHERE id = ? AND deleted_at IS NULL")
        .bind(place_id.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Place not found".to_string()))
}

/// Great-circle distance between two points in kilometers.
fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * a.sqrt().asin() * EARTH_RADIUS_KM
}

/// GET /places
///
/// With `latitude`, `longitude`, and `radius_km` all present, filters to
/// places within the radius; paging applies after the distance filter.
pub async fn list_places(
    State(state): State<AppState>,
    Query(query): Query<PlaceListQuery>,
) -> Result<Json<Vec<Place>>, ApiError> {
    if let (Some(latitude), Some(longitude), Some(radius_km)) =
        (query.latitude, query.longitude, query.radius_km)
    {
        validate_coordinates(latitude, longitude, radius_km)?;

        // Bounded dataset; exact distance per row beats a bounding-box
        // approximation here
        let places = sqlx::query_as::<_, Place>(
            "SELECT * FROM places WHERE deleted_at IS NULL ORDER BY name",
        )
        .fetch_all(&state.db)
        .await?;

        let matches: Vec<Place> = places
            .into_iter()
            .filter(|p| haversine_km(latitude, longitude, p.latitude, p.longitude) <= radius_km)
            .skip(query.skip)
            .take(query.limit)
            .collect();
        return Ok(Json(matches));
    }

    let places = sqlx::query_as::<_, Place>(
        "SELECT * FROM places WHERE deleted_at IS NULL ORDER BY name LIMIT ? OFFSET ?",
    )
    .bind(query.limit as i64)
    .bind(query.skip as i64)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(places))
}

/// POST /places
pub async fn create_place(
    State(state): State<AppState>,
    Json(body): Json<PlaceCreate>,
) -> Result<(StatusCode, Json<Place>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    validate_coordinates(body.latitude, body.longitude, body.radius)?;
    if body.max_capacity.is_some_and(|c| c < 0) {
        return Err(ApiError::BadRequest("max_capacity must be non-negative".to_string()));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO places (id, name, details, street_address, city, state_region,
                            room_number, latitude, longitude, radius, max_capacity)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&body.name)
    .bind(&body.details)
    .bind(&body.street_address)
    .bind(&body.city)
    .bind(&body.state_region)
    .bind(&body.room_number)
    .bind(body.latitude)
    .bind(body.longitude)
    .bind(body.radius)
    .bind(body.max_capacity)
    .execute(&state.db)
    .await?;

    let place = fetch_place(&state.db, id).await?;
    Ok((StatusCode::CREATED, Json(place)))
}

/// GET /places/:place_id
pub async fn get_place(
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
) -> Result<Json<Place>, ApiError> {
    Ok(Json(fetch_place(&state.db, place_id).await?))
}

/// PUT /places/:place_id
pub async fn update_place(
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
    Json(body): Json<PlaceUpdate>,
) -> Result<Json<Place>, ApiError> {
    let existing = fetch_place(&state.db, place_id).await?;

    let latitude = body.latitude.unwrap_or(existing.latitude);
    let longitude = body.longitude.unwrap_or(existing.longitude);
    let radius = body.radius.unwrap_or(existing.radius);
    validate_coordinates(latitude, longitude, radius)?;
    if body.max_capacity.is_some_and(|c| c < 0) {
        return Err(ApiError::BadRequest("max_capacity must be non-negative".to_string()));
    }

    sqlx::query(
        r#"
        UPDATE places
        SET name = COALESCE(?, name),
            details = COALESCE(?, details),
            street_address = COALESCE(?, street_address),
            city = COALESCE(?, city),
            state_region = COALESCE(?, state_region),
            room_number = COALESCE(?, room_number),
            latitude = ?,
            longitude = ?,
            radius = ?,
            max_capacity = COALESCE(?, max_capacity),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&body.name)
    .bind(&body.details)
    .bind(&body.street_address)
    .bind(&body.city)
    .bind(&body.state_region)
    .bind(&body.room_number)
    .bind(latitude)
    .bind(longitude)
    .bind(radius)
    .bind(body.max_capacity)
    .bind(place_id.to_string())
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_place(&state.db, place_id).await?))
}

/// DELETE /places/:place_id
pub async fn delete_place(
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    fetch_place(&state.db, place_id).await?;

    sqlx::query("UPDATE places SET deleted_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(place_id.to_string())
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::haversine_km;

    #[test]
    fn haversine_zero_for_same_point() {
        assert!(haversine_km(40.0, -88.0, 40.0, -88.0) < 1e-9);
    }

    #[test]
    fn haversine_one_degree_latitude() {
        // One degree of latitude is about 111 km everywhere
        let d = haversine_km(40.0, 0.0, 41.0, 0.0);
        assert!((d - 111.2).abs() < 1.0, "got {}", d);
    }
}

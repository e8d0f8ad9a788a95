use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;
use uuid::Uuid;

use models::car::{CarListing, NewCar};
use service::errors::ServiceError;

use super::auth::{AuthedUser, ServerState};
use crate::errors::ApiError;

pub async fn list_cars(State(state): State<ServerState>) -> Json<Vec<CarListing>> {
    Json(state.catalog.list().await)
}

/// Create a listing from a multipart form: text fields `make`, `model`,
/// `year`, `price`, `details` and any number of `photos` file fields.
/// Fields are collected and validated before any photo is written, so a
/// rejected form leaves no files behind.
pub async fn create_car(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthedUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CarListing>), ApiError> {
    let mut input = NewCar::default();
    let mut photos: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::Validation(format!("malformed multipart request: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "make" => input.make = text_field(field, "make").await?,
            "model" => input.model = text_field(field, "model").await?,
            "year" => {
                let raw = text_field(field, "year").await?;
                input.year = raw.trim().parse().map_err(|_| {
                    ServiceError::Validation(format!("year must be a number: {raw}"))
                })?;
            }
            "price" => input.price = text_field(field, "price").await?,
            "details" => input.details = text_field(field, "details").await?,
            "photos" => {
                let original = field.file_name().unwrap_or_default().to_string();
                // browsers send one empty part when no file was chosen
                if original.is_empty() {
                    continue;
                }
                let bytes = field.bytes().await.map_err(|e| {
                    ServiceError::Validation(format!("failed to read photo field: {e}"))
                })?;
                photos.push((original, bytes.to_vec()));
            }
            _ => {}
        }
    }

    input.validate().map_err(ServiceError::Model)?;

    let mut refs = Vec::with_capacity(photos.len());
    for (original, bytes) in &photos {
        refs.push(state.uploads.accept(bytes, original).await?);
    }

    let car = state.catalog.create(input, refs).await?;
    info!(uploader = %user.0, car_id = %car.id, "listing uploaded");
    Ok((StatusCode::CREATED, Json(car)))
}

/// Delete a listing and its photos. Unknown ids are a no-op; the response
/// is 204 either way.
pub async fn delete_car(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let removed = state.catalog.delete(id).await?;
    info!(uploader = %user.0, car_id = %id, removed, "delete requested");
    Ok(StatusCode::NO_CONTENT)
}

async fn text_field(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError(ServiceError::Validation(format!("failed to read field {name}: {e}"))))
}

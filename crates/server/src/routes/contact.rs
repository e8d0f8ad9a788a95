use axum::{extract::State, Json};

use models::contact::ContactMessage;

use super::auth::ServerState;
use crate::errors::ApiError;

pub async fn submit_contact(
    State(state): State<ServerState>,
    Json(message): Json<ContactMessage>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.contacts.record(message).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Message sent successfully!"
    })))
}

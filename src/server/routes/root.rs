//! Welcome endpoint

use axum::Json;

use crate::inference::WelcomeMessage;

/// GET / - Welcome message
pub async fn welcome() -> Json<WelcomeMessage> {
    Json(WelcomeMessage::default())
}

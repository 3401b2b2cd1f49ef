use crate::errors::AppError;
use crate::models::{AdminRequest, AdminResponse};
use crate::store::StateStore;
use tracing::{info, warn};

/// Applies an admin request after checking the shared secret.
///
/// The secret is compared in plain text. A mismatch leaves the state alone no
/// matter what else the payload asks for.
pub async fn apply(
    store: &StateStore,
    expected_password: &str,
    request: AdminRequest,
) -> Result<AdminResponse, AppError> {
    if request.password != expected_password {
        warn!("admin request rejected: invalid password");
        return Err(AppError::unauthorized("invalid password"));
    }

    if let Some(text) = request.event_text {
        store.set_event_text(text).await?;
        info!("event text updated");
    }

    if request.reset_count.unwrap_or(false) {
        store.reset().await?;
        info!("counter reset");
    }

    let state = store.get().await;
    Ok(AdminResponse {
        count: state.count,
        event_text: state.event_text,
    })
}

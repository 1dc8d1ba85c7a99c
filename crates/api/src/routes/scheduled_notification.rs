//! Route definitions for the `/scheduled-notifications` resource.
//!
//! All endpoints require authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::scheduled_notification;
use crate::state::AppState;

/// Routes mounted at `/scheduled-notifications`.
///
/// ```text
/// POST   /        -> schedule_notification
/// GET    /        -> list_notifications
/// GET    /{id}    -> get_notification
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(scheduled_notification::list_notifications)
                .post(scheduled_notification::schedule_notification),
        )
        .route("/{id}", get(scheduled_notification::get_notification))
}

pub mod health;
pub mod scheduled_notification;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /scheduled-notifications            schedule (POST), list (GET)
/// /scheduled-notifications/{id}       get (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest(
        "/scheduled-notifications",
        scheduled_notification::router(),
    )
}

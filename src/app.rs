use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{self, AppState};

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health))
        .merge(ticket_routes())
        .merge(link_routes())
        .merge(debug_routes())
        .fallback(handlers::root::not_found)
        .method_not_allowed_fallback(handlers::root::method_not_allowed)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn ticket_routes() -> Router<AppState> {
    use handlers::tickets;

    Router::new()
        .route("/tickets/:user_id/:year", get(tickets::all))
        .route("/tickets/aberto/:user_id/:year", get(tickets::open))
        .route("/tickets/fechado/:user_id/:year", get(tickets::closed))
}

fn link_routes() -> Router<AppState> {
    use handlers::links;

    Router::new()
        .route("/ticketvinculo/:user_id", get(links::linked_ids))
        .route("/ticketuser/:id", get(links::user_tickets))
}

fn debug_routes() -> Router<AppState> {
    use handlers::debug;

    Router::new()
        .route("/debug/ticket/:ticket_id", get(debug::ticket))
        .route("/debug/user/:user_id/tickets", get(debug::user_tickets))
}

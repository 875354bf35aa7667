// handlers/mod.rs - Endpoint handlers
//
// Each handler composes the repository, the normalizer and the status
// classifier for one URL pattern. State is injected through axum's `State`
// extractor; nothing is shared between requests except the pool.
pub mod debug;
pub mod links;
pub mod root;
pub mod tickets;

use std::sync::Arc;

use axum::extract::FromRequestParts;

use crate::database::TicketRepository;
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub tickets: Arc<dyn TicketRepository>,
}

impl AppState {
    pub fn new(tickets: Arc<dyn TicketRepository>) -> Self {
        Self { tickets }
    }
}

/// `Path` extractor whose rejection renders as `{"detail": ...}`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `Query` extractor whose rejection renders as `{"detail": ...}`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

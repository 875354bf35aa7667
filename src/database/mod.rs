pub mod manager;
pub mod models;
pub mod normalize;
pub mod query_builder;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use normalize::{normalize_row, normalize_rows, JsonRow, RawRow, RawValue};
pub use repository::{MySqlTicketRepository, TicketRepository};

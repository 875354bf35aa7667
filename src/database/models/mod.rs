pub mod status;

pub use status::{InvalidStatus, StatusClass, OPEN_STATUS_LIMIT};

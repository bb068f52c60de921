pub mod routes;
pub mod telemetry;

pub use routes::{create_router, AppState};

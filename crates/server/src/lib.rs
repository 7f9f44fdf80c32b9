pub mod api;
pub mod metrics;
pub mod state;

pub use api::create_router;
pub use state::{config_fingerprint, AppState};

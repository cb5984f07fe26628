pub mod config;
pub mod cors;
pub mod error;
pub mod routes;
pub mod state;
pub mod validation;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

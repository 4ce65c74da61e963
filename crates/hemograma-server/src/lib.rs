pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;

pub use config::{AppConfig, CallbackConfig, FhirSettings, LoggingConfig, ServerConfig};
pub use observability::init_tracing;
pub use server::{AppState, HemogramaServer, ServerBuilder, build_app};

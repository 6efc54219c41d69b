pub mod api;
pub mod client;
pub mod config;
pub mod security;
pub mod transport;
pub mod utils;

pub use client::{ApiClient, ClientError, Credentials};
pub use config::ClientConfig;

// Crate version exposed for runtime queries
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

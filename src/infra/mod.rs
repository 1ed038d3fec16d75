pub mod config;
pub mod http_client;
pub mod scheduler;
pub mod setup;

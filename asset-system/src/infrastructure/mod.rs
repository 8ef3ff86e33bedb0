mod config;
mod database;
mod repository;
mod service;
mod service_provider;

pub use config::build_config;
pub use service_provider::ServiceProvider;

pub mod app_config;
pub mod fermenter_config;
pub mod nats_config;
pub mod postgres_config;

pub mod nats_publisher;
pub mod postgres;

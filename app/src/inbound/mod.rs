pub mod model;
pub mod nats;
pub mod serial;

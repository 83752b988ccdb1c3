pub mod domain {
    pub mod command;
    pub mod error;
    pub mod frame;
    pub mod point;
}

pub mod port {
    pub mod clock;
    pub mod command;
    pub mod device;
    pub mod telemetry;
}

pub mod service {
    pub mod coordinator;
}

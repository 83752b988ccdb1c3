use std::time::Duration;

use internal::{domain::command::DesiredState, service::coordinator::DEFAULT_RECONCILE_INTERVAL};
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct FermenterConfig {
    pub target_temp: f64,
    pub brew_id: String,
}

impl FermenterConfig {
    pub fn desired_state(&self) -> DesiredState {
        DesiredState::new(self.target_temp, self.brew_id.clone())
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct SerialConfig {
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

fn default_baud_rate() -> u32 {
    115_200
}

#[derive(Deserialize, Clone, Debug)]
pub struct ControllerConfig {
    #[serde(default = "default_reconcile_interval_secs")]
    pub reconcile_interval_secs: u64,
}

impl ControllerConfig {
    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            reconcile_interval_secs: default_reconcile_interval_secs(),
        }
    }
}

fn default_reconcile_interval_secs() -> u64 {
    DEFAULT_RECONCILE_INTERVAL.as_secs()
}

use std::{fmt::Display, str::FromStr};

use super::error::ControllerError;

/// One reading as reported by the fermenter on a single serial line.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryFrame {
    pub instant: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub target: f64,
    pub ambient: f64,
    pub action: ControllerAction,
    pub rest: Option<bool>,
    pub heat: Option<bool>,
    pub cool: Option<bool>,
    pub reason_code: String,
    /// Size of the JSON document as counted by the device, diagnostics only.
    pub json_size: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerAction {
    #[default]
    NoAction,
    Rest,
    Heat,
    Cool,
    Error,
}

impl ControllerAction {
    pub fn name(&self) -> &'static str {
        match self {
            ControllerAction::NoAction => "No Action",
            ControllerAction::Rest => "Rest",
            ControllerAction::Heat => "Heat",
            ControllerAction::Cool => "Cool",
            ControllerAction::Error => "Error",
        }
    }
}

impl Display for ControllerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControllerAction {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "no action" | "noaction" | "none" => Ok(ControllerAction::NoAction),
            "rest" => Ok(ControllerAction::Rest),
            "heat" => Ok(ControllerAction::Heat),
            "cool" => Ok(ControllerAction::Cool),
            "error" => Ok(ControllerAction::Error),
            _ => Err(ControllerError::FrameDecode(format!("Unknown controller action: {s}"))),
        }
    }
}

#[cfg(test)]
impl TelemetryFrame {
    pub(crate) fn resting_at(target: f64) -> Self {
        TelemetryFrame {
            instant: target,
            average: target,
            min: target - 0.5,
            max: target + 0.5,
            target,
            ambient: 15.0,
            action: ControllerAction::Rest,
            rest: Some(true),
            heat: Some(false),
            cool: Some(false),
            reason_code: "R0".into(),
            json_size: None,
        }
    }
}

use internal::domain::{command::ControllerCommand, error::ControllerError};
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

pub const NEW_TARGET_TEMP: &str = "new-target-temp";
pub const NEW_BREW_ID: &str = "new-brew-id";

/// Operator message as it travels on the command channel.
#[derive(Serialize, Debug, Default, PartialEq)]
pub struct CommandMessage {
    #[serde(rename = "new-target-temp", skip_serializing_if = "Option::is_none")]
    pub target_temp: Option<f64>,
    #[serde(rename = "new-brew-id", skip_serializing_if = "Option::is_none")]
    pub brew_id: Option<String>,
}

impl CommandMessage {
    /// Unknown keys are ignored. The first recognised key holding an invalid value
    /// rejects the whole message.
    pub fn parse(payload: &[u8]) -> Result<Vec<ControllerCommand>, ControllerError> {
        let utf8_str = std::str::from_utf8(payload)
            .map_err(|e| ControllerError::CommandValidation(format!("UTF-8 conversion error: {e}")))?;
        let object: Map<String, Value> = serde_json::from_str(utf8_str)
            .map_err(|e| ControllerError::CommandValidation(format!("JSON deserialization error: {e}, {utf8_str}")))?;

        let mut commands = Vec::new();
        if let Some(value) = object.get(NEW_TARGET_TEMP) {
            commands.push(Self::target_temp(value)?);
        }
        if let Some(value) = object.get(NEW_BREW_ID) {
            commands.push(Self::brew_id(value)?);
        }
        object
            .keys()
            .filter(|key| key.as_str() != NEW_TARGET_TEMP && key.as_str() != NEW_BREW_ID)
            .for_each(|key| debug!("Ignoring unknown command key {key}"));
        Ok(commands)
    }

    pub fn to_payload(&self) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn target_temp(value: &Value) -> Result<ControllerCommand, ControllerError> {
        value.as_f64().map(ControllerCommand::SetTargetTemp).ok_or_else(|| {
            ControllerError::CommandValidation(format!("{NEW_TARGET_TEMP} must be a number, got {value}"))
        })
    }

    /// Kept verbatim, a blank id is rejected.
    fn brew_id(value: &Value) -> Result<ControllerCommand, ControllerError> {
        match value.as_str() {
            Some(brew_id) if !brew_id.trim().is_empty() => Ok(ControllerCommand::SetBrewId(brew_id.to_string())),
            Some(_) => Err(ControllerError::CommandValidation(format!("{NEW_BREW_ID} must not be empty"))),
            None => Err(ControllerError::CommandValidation(format!(
                "{NEW_BREW_ID} must be a string, got {value}"
            ))),
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ControllerError {
    #[error("Unable to open device link {port}: {reason}")]
    LinkUnavailable { port: String, reason: String },
    #[error("Device link closed: {0}")]
    LinkClosed(String),
    #[error("Unable to decode telemetry frame: {0}")]
    FrameDecode(String),
    #[error("Invalid command message: {0}")]
    CommandValidation(String),
    #[error("Command channel closed: {0}")]
    ChannelClosed(String),
    #[error("Unable to write telemetry point: {0}")]
    SinkWrite(String),
    #[error("Unable to write setpoint to device: {0}")]
    SetpointWrite(String),
}

impl ControllerError {
    /// Per-cycle failures: the loop that hit them logs and keeps going.
    /// Everything else ends the coordinator, including a link or command stream
    /// that closes after startup.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ControllerError::FrameDecode(_)
            | ControllerError::CommandValidation(_)
            | ControllerError::SinkWrite(_)
            | ControllerError::SetpointWrite(_) => true,
            ControllerError::LinkUnavailable { .. }
            | ControllerError::LinkClosed(_)
            | ControllerError::ChannelClosed(_) => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::ControllerError;

    #[test]
    fn should_only_recover_from_per_cycle_errors() {
        assert!(ControllerError::FrameDecode("bad json".into()).is_recoverable());
        assert!(ControllerError::CommandValidation("wrong type".into()).is_recoverable());
        assert!(ControllerError::SinkWrite("timeout".into()).is_recoverable());
        assert!(ControllerError::SetpointWrite("busy".into()).is_recoverable());
        assert!(
            !ControllerError::LinkUnavailable {
                port: "/dev/ttyACM0".into(),
                reason: "no such file".into()
            }
            .is_recoverable()
        );
        assert!(!ControllerError::LinkClosed("eof".into()).is_recoverable());
        assert!(!ControllerError::ChannelClosed("stream ended".into()).is_recoverable());
    }
}

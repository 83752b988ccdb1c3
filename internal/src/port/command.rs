use crate::domain::{command::ControllerCommand, error::ControllerError};

pub trait CommandChannelDrivenPort {
    /// Waits for the next message and returns the commands it carries, possibly none.
    /// A message failing validation yields `ControllerError::CommandValidation` and
    /// none of its commands.
    fn receive(&mut self) -> impl Future<Output = Result<Vec<ControllerCommand>, ControllerError>> + Send;
}

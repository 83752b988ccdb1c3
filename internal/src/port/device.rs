use crate::domain::{error::ControllerError, frame::TelemetryFrame};

/// Read half of the device link.
pub trait FrameReaderDrivenPort {
    /// Resolves once a full line has been read. A line that does not decode yields
    /// `ControllerError::FrameDecode` and leaves the link usable for the next call.
    fn next_frame(&mut self) -> impl Future<Output = Result<TelemetryFrame, ControllerError>> + Send;
}

/// Write half of the device link. Fire and forget, the device never acknowledges.
pub trait SetpointWriterDrivenPort {
    fn write_setpoint(&mut self, value: f64) -> impl Future<Output = Result<(), ControllerError>> + Send;
}

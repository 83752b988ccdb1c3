use internal::{
    domain::{command::encode_setpoint, error::ControllerError, frame::TelemetryFrame},
    port::device::{FrameReaderDrivenPort, SetpointWriterDrivenPort},
};
use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use super::model::frame::FrameRecord;

pub type SerialFrameReader = LineFrameReader<BufReader<ReadHalf<SerialStream>>>;
pub type SerialSetpointWriter = SetpointWriter<WriteHalf<SerialStream>>;

pub struct SerialLink;

impl SerialLink {
    /// Opens the device and splits it so reading frames and writing setpoints never
    /// contend for the same half. Dropping both halves closes the port.
    pub fn open(port: &str, baud: u32) -> Result<(SerialFrameReader, SerialSetpointWriter), ControllerError> {
        let stream = tokio_serial::new(port, baud)
            .open_native_async()
            .map_err(|e| ControllerError::LinkUnavailable {
                port: port.to_string(),
                reason: e.to_string(),
            })?;
        info!("Opened device link {port} at {baud} baud");
        let (reader, writer) = tokio::io::split(stream);
        Ok((LineFrameReader::new(BufReader::new(reader), port), SetpointWriter::new(writer)))
    }
}

/// Newline-delimited JSON frames. The first line after opening is the device's boot
/// output and is dropped.
pub struct LineFrameReader<R> {
    reader: R,
    // survives a cancelled read so no partial line is lost
    buffer: Vec<u8>,
    banner_discarded: bool,
    port: String,
}

impl<R: AsyncBufRead + Unpin + Send> LineFrameReader<R> {
    pub fn new(reader: R, port: &str) -> Self {
        LineFrameReader {
            reader,
            buffer: Vec::new(),
            banner_discarded: false,
            port: port.to_string(),
        }
    }

    async fn read_line(&mut self) -> Result<Vec<u8>, ControllerError> {
        match self.reader.read_until(b'\n', &mut self.buffer).await {
            Ok(0) => Err(ControllerError::LinkClosed(format!("{} reached end of stream", self.port))),
            Ok(_) => Ok(std::mem::take(&mut self.buffer)),
            Err(e) => Err(ControllerError::LinkClosed(format!("{}: {e}", self.port))),
        }
    }
}

impl<R: AsyncBufRead + Unpin + Send> FrameReaderDrivenPort for LineFrameReader<R> {
    async fn next_frame(&mut self) -> Result<TelemetryFrame, ControllerError> {
        if !self.banner_discarded {
            let banner = self.read_line().await?;
            self.banner_discarded = true;
            debug!("Discarded first line from {}: {:?}", self.port, String::from_utf8_lossy(&banner));
        }
        let line = self.read_line().await?;
        debug!("read {:?} from {}", String::from_utf8_lossy(&line), self.port);
        FrameRecord::decode(&line)
    }
}

pub struct SetpointWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> SetpointWriter<W> {
    pub fn new(writer: W) -> Self {
        SetpointWriter { writer }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: AsyncWrite + Unpin + Send> SetpointWriterDrivenPort for SetpointWriter<W> {
    async fn write_setpoint(&mut self, value: f64) -> Result<(), ControllerError> {
        let encoded = encode_setpoint(value);
        info!("writing {encoded} to serial");
        self.writer
            .write_all(encoded.as_bytes())
            .await
            .map_err(|e| ControllerError::SetpointWrite(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| ControllerError::SetpointWrite(e.to_string()))
    }
}

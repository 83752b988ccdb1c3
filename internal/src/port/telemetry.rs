use crate::domain::point::{LatestRecord, TelemetryPoint};

pub trait TelemetrySinkDrivenPort {
    fn write(&self, point: &TelemetryPoint) -> impl Future<Output = anyhow::Result<()>> + Send;
    fn latest(&self) -> impl Future<Output = anyhow::Result<Option<LatestRecord>>> + Send;
}

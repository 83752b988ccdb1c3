use std::{
    cell::{Cell, RefCell},
    time::Duration,
};

use log::{debug, error, info, warn};
use tokio::time::MissedTickBehavior;

use crate::{
    domain::{
        command::{ControllerCommand, DesiredState, ReconcileState},
        error::ControllerError,
        frame::TelemetryFrame,
        point::TelemetryPoint,
    },
    port::{
        clock::Clock,
        command::CommandChannelDrivenPort,
        device::{FrameReaderDrivenPort, SetpointWriterDrivenPort},
        telemetry::TelemetrySinkDrivenPort,
    },
};

pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(5);

/// Ties the device link, the command channel and the telemetry sink together.
///
/// The three loops run interleaved on a single task, so the desired state and the
/// last observed target live in plain cells: every borrow is released before the
/// next `.await`, which keeps each read-modify-write atomic with respect to the
/// other loops.
pub struct Coordinator<S: TelemetrySinkDrivenPort, C: Clock> {
    desired: RefCell<DesiredState>,
    last_observed_target: Cell<Option<f64>>,
    sink: S,
    clock: C,
    reconcile_interval: Duration,
}

impl<S: TelemetrySinkDrivenPort, C: Clock> Coordinator<S, C> {
    pub fn new(initial: DesiredState, sink: S, clock: C, reconcile_interval: Duration) -> Self {
        Coordinator {
            desired: RefCell::new(initial),
            last_observed_target: Cell::new(None),
            sink,
            clock,
            reconcile_interval,
        }
    }

    pub fn desired_state(&self) -> DesiredState {
        self.desired.borrow().clone()
    }

    pub fn last_observed_target(&self) -> Option<f64> {
        self.last_observed_target.get()
    }

    /// Runs ingest, reconcile and command loops until one of them hits a fatal error.
    /// The ports are owned by the returned future, dropping it releases them.
    pub async fn run<F, W, M>(&self, mut frames: F, mut setpoint: W, mut commands: M) -> Result<(), ControllerError>
    where
        F: FrameReaderDrivenPort,
        W: SetpointWriterDrivenPort,
        M: CommandChannelDrivenPort,
    {
        let desired = self.desired_state();
        info!(
            "Starting coordinator for brew {} with target {}, reconciling every {:?}",
            desired.brew_id, desired.target_temp, self.reconcile_interval
        );
        tokio::try_join!(
            self.ingest_loop(&mut frames),
            self.reconcile_loop(&mut setpoint),
            self.command_loop(&mut commands),
        )
        .map(|_| ())
    }

    pub async fn ingest_loop<F: FrameReaderDrivenPort>(&self, frames: &mut F) -> Result<(), ControllerError> {
        loop {
            let outcome = match frames.next_frame().await {
                Ok(frame) => self.ingest(frame).await,
                Err(e) => Err(e),
            };
            Self::recover("ingest", outcome)?;
        }
    }

    pub async fn reconcile_loop<W: SetpointWriterDrivenPort>(&self, setpoint: &mut W) -> Result<(), ControllerError> {
        let mut ticker = tokio::time::interval(self.reconcile_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let outcome = self.reconcile(setpoint).await.map(|_| ());
            Self::recover("reconcile", outcome)?;
        }
    }

    pub async fn command_loop<M: CommandChannelDrivenPort>(&self, commands: &mut M) -> Result<(), ControllerError> {
        loop {
            let outcome = commands.receive().await.map(|received| self.apply(received));
            Self::recover("command", outcome)?;
        }
    }

    /// Records what the device reports and persists it tagged with the current brew id.
    pub async fn ingest(&self, frame: TelemetryFrame) -> Result<(), ControllerError> {
        self.last_observed_target.set(Some(frame.target));
        let point = TelemetryPoint::from_frame(&frame, &self.desired.borrow().brew_id, self.clock.now());
        debug!("Ingesting frame {:?} for brew {}", frame, point.brew_id);
        self.sink
            .write(&point)
            .await
            .map_err(|e| ControllerError::SinkWrite(format!("{e:#}")))
    }

    /// One reconcile tick. Writes the desired target when the device disagrees.
    pub async fn reconcile<W: SetpointWriterDrivenPort>(
        &self,
        setpoint: &mut W,
    ) -> Result<ReconcileState, ControllerError> {
        let observed = self.last_observed_target.get();
        let (state, target) = {
            let desired = self.desired.borrow();
            (desired.reconcile_state(observed), desired.target_temp)
        };
        match state {
            ReconcileState::InSync => debug!("Device target {:?} in sync", observed),
            ReconcileState::NeedsUpdate => {
                info!("Device target {:?} differs, writing setpoint {}", observed, target);
                setpoint.write_setpoint(target).await?;
            }
        }
        Ok(state)
    }

    pub fn apply(&self, commands: Vec<ControllerCommand>) {
        if commands.is_empty() {
            debug!("Command message carried no recognised command");
        }
        let mut desired = self.desired.borrow_mut();
        for command in commands {
            info!("Applying command {} {:?}", command.name(), command);
            desired.apply(command);
        }
    }

    fn recover(loop_name: &str, outcome: Result<(), ControllerError>) -> Result<(), ControllerError> {
        match outcome {
            Err(e) if e.is_recoverable() => {
                warn!("{loop_name} cycle abandoned: {e}");
                Ok(())
            }
            Err(e) => {
                error!("{loop_name} loop stopped: {e}");
                Err(e)
            }
            Ok(()) => Ok(()),
        }
    }
}

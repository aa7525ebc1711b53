//! The driver of the derivation core.

use crate::{
    Deriver, DeriverMux, DriverConfig, DriverError, DriverResult, Emitter, Event, EventQueue,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// The Rollup Driver entrypoint.
///
/// Owns the event queue and drains it one event at a time, offering each event to the
/// [DeriverMux]. Events no deriver consumes land in the driver itself.
#[derive(Debug)]
pub struct Driver {
    /// The driver config.
    config: DriverConfig,
    /// The queue of pending events.
    queue: EventQueue,
    /// The registered derivers.
    derivers: DeriverMux,
    /// Whether the engine must be reset before derivation continues.
    reset_pending: bool,
    /// Cancellation of the driver and of every bounded call made by its derivers.
    cancel: CancellationToken,
}

impl Driver {
    /// Creates a new [Driver].
    ///
    /// Derivers emit into `queue`, which should be bounded by
    /// [DriverConfig::max_queued_events]. A reset is scheduled for the first step.
    pub const fn new(
        config: DriverConfig,
        queue: EventQueue,
        derivers: DeriverMux,
        cancel: CancellationToken,
    ) -> Self {
        Self { config, queue, derivers, reset_pending: true, cancel }
    }

    /// Returns a handle to emit events into the driver's queue.
    pub fn emitter(&self) -> EventQueue {
        self.queue.clone()
    }

    /// Returns true if a reset is scheduled for the next step.
    pub const fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Stops the driver. In-flight bounded calls are cancelled.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Performs a single tick: schedules an engine reset if one is pending, or a pipeline step
    /// otherwise, then drains the queue.
    pub async fn step(&mut self) -> DriverResult<()> {
        if self.reset_pending {
            self.reset_pending = false;
            self.queue.emit(Event::ResetEngineRequest);
        } else {
            self.queue.emit(Event::PendingSafeRequest);
        }
        self.drain().await
    }

    /// Dispatches queued events until the queue is empty.
    pub async fn drain(&mut self) -> DriverResult<()> {
        loop {
            if self.cancel.is_cancelled() {
                return Err(DriverError::Closed);
            }
            if self.queue.overflowed() {
                return Err(DriverError::TooManyEvents(self.queue.limit()));
            }
            let Some(event) = self.queue.pop() else {
                return Ok(());
            };
            if !self.derivers.on_event(&event).await {
                self.on_unhandled(event)?;
            }
        }
    }

    /// Runs the driver until it is closed or fails.
    ///
    /// Events received on `inputs` are queued and drained immediately. The driver steps every
    /// [DriverConfig::step_interval].
    pub async fn run(mut self, mut inputs: mpsc::Receiver<Event>) -> DriverResult<()> {
        info!(
            target: "driver",
            interval = ?self.config.step_interval,
            "Starting derivation driver"
        );
        let mut ticker = tokio::time::interval(self.config.step_interval);
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(target: "driver", "Derivation driver closed");
                    return Err(DriverError::Closed);
                }
                Some(event) = inputs.recv() => {
                    self.queue.emit(event);
                    self.drain().await?;
                }
                _ = ticker.tick() => self.step().await?,
            }
        }
    }

    fn on_unhandled(&mut self, event: Event) -> DriverResult<()> {
        match event {
            Event::Reset { err } => {
                warn!(target: "driver", "Derivation process needs a reset: {err}");
                self.reset_pending = true;
            }
            Event::CriticalError { err } => {
                error!(target: "driver", "Derivation process critical error: {err}");
                return Err(DriverError::Critical(err));
            }
            Event::DeriverTemporaryError { err } | Event::L1TemporaryError { err } => {
                warn!(target: "driver", "Derivation process temporary error: {err}");
            }
            Event::EngineTemporaryError { err } => {
                warn!(target: "driver", "Engine temporary error: {err}");
            }
            event => trace!(target: "driver", event = event.name(), "Unhandled event"),
        }
        Ok(())
    }
}

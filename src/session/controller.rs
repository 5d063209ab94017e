use crate::controller::event_processor::EventNormalizer;
use crate::controller::input_state::InputState;
use crate::controller::source::{InputSource, RawEvent};
use crate::output::sink::{SinkError, VirtualSink};
use crate::output::synchronizer::OutputSynchronizer;
use crate::session::error::{SessionError, TickError};
use chrono::{DateTime, Local};
use statum::{machine, state};
use std::fmt;
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Timing and device selection for one session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub device_index: usize,
    pub tick_interval: Duration,
    pub reconnect_attempts: u32,
    pub reconnect_delay: Duration,
    pub fault_backoff: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            tick_interval: Duration::from_secs(1) / 120,
            reconnect_attempts: 1,
            reconnect_delay: Duration::from_millis(500),
            fault_backoff: Duration::from_millis(100),
        }
    }
}

/// Every lifecycle phase, including the two that have no typestate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Acquiring,
    Running,
    Degraded,
    ShuttingDown,
    Stopped,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Uninitialized => "Uninitialized",
            SessionPhase::Acquiring => "Acquiring",
            SessionPhase::Running => "Running",
            SessionPhase::Degraded => "Degraded",
            SessionPhase::ShuttingDown => "ShuttingDown",
            SessionPhase::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    Failed(SessionError),
}

#[derive(Debug, Clone)]
struct SessionStats {
    ticks: u64,
    faults: u64,
    reconnects: u32,
    phases: Vec<SessionPhase>,
    started_at: DateTime<Local>,
}

impl SessionStats {
    fn new() -> Self {
        Self {
            ticks: 0,
            faults: 0,
            reconnects: 0,
            phases: vec![SessionPhase::Uninitialized],
            started_at: Local::now(),
        }
    }

    fn current(&self) -> SessionPhase {
        self.phases
            .last()
            .copied()
            .unwrap_or(SessionPhase::Uninitialized)
    }
}

/// Summary handed back once the session reached `Stopped`
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub outcome: Result<(), SessionError>,
    pub ticks: u64,
    pub faults: u64,
    pub reconnects: u32,
    pub phases: Vec<SessionPhase>,
    pub started_at: DateTime<Local>,
    pub stopped_at: DateTime<Local>,
}

impl SessionReport {
    pub fn uptime(&self) -> chrono::Duration {
        self.stopped_at - self.started_at
    }

    pub fn into_result(self) -> Result<(), SessionError> {
        self.outcome
    }
}

#[state]
#[derive(Debug, Clone)]
pub enum SessionState {
    Acquiring,
    Running,
    Degraded,
    ShuttingDown(StopReason),
}

/// Bridge session with compile-time lifecycle states via statum
///
/// Owns the source, the sink and the [`InputState`]; nothing else touches
/// them while the session is alive.
#[machine]
pub struct SessionController<S: SessionState> {
    settings: SessionSettings,
    source: Box<dyn InputSource>,
    sink: Option<Box<dyn VirtualSink>>,
    normalizer: EventNormalizer,
    synchronizer: OutputSynchronizer,
    input: InputState,
    shutdown: CancellationToken,
    stats: SessionStats,
}

impl<S: SessionState> SessionController<S> {
    pub fn phase(&self) -> SessionPhase {
        self.stats.current()
    }

    pub fn input_state(&self) -> &InputState {
        &self.input
    }

    fn enter(&mut self, phase: SessionPhase) {
        info!("Session state: {} -> {}", self.stats.current(), phase);
        self.stats.phases.push(phase);
    }
}

/// Result of the main loop
pub enum RunExit {
    Stopped(SessionController<ShuttingDown>),
    Disconnected(SessionController<Degraded>),
}

impl SessionController<Acquiring> {
    pub fn create(
        settings: SessionSettings,
        normalizer: EventNormalizer,
        synchronizer: OutputSynchronizer,
        source: Box<dyn InputSource>,
        shutdown: CancellationToken,
    ) -> Self {
        debug!("Creating session with settings: {:?}", settings);
        Self::new(
            settings,
            source,
            None,
            normalizer,
            synchronizer,
            InputState::new(),
            shutdown,
            SessionStats::new(),
        )
    }

    /// Opens the gamepad, then the virtual pad
    ///
    /// `open_sink` is only called once a gamepad is open, so a failing sink
    /// leaves nothing behind but a closed source.
    pub fn acquire<F>(
        mut self,
        open_sink: F,
    ) -> Result<SessionController<Running>, SessionController<ShuttingDown>>
    where
        F: FnOnce() -> Result<Box<dyn VirtualSink>, SinkError>,
    {
        self.enter(SessionPhase::Acquiring);

        if self.shutdown.is_cancelled() {
            info!("Stop requested before acquisition");
            return Err(self.stop());
        }

        let available = self.source.enumerate();
        if available == 0 {
            error!("No gamepads found!");
            return Err(self.fail(SessionError::NoDevices));
        }
        info!("Found {} gamepad(s)", available);

        let index = self.settings.device_index;
        if index >= available {
            error!("Gamepad {} requested but only {} connected", index, available);
            return Err(self.fail(SessionError::DeviceNotFound { index, available }));
        }

        match self.source.open(index) {
            Ok(device) => info!("Connected to {}", device),
            Err(e) => {
                error!("Failed to open gamepad {}: {}", index, e);
                return Err(self.fail(e.into()));
            }
        }

        match open_sink() {
            Ok(sink) => self.sink = Some(sink),
            Err(e) => {
                error!("Failed to initialize virtual controller: {}", e);
                return Err(self.fail(SessionError::SinkUnavailable(e)));
            }
        }

        info!("Button mapping:");
        for line in self.normalizer.mapping().legend() {
            info!("  {}", line);
        }

        self.enter(SessionPhase::Running);
        Ok(self.transition())
    }

    fn stop(mut self) -> SessionController<ShuttingDown> {
        self.enter(SessionPhase::ShuttingDown);
        self.transition_with(StopReason::Requested)
    }

    fn fail(mut self, error: SessionError) -> SessionController<ShuttingDown> {
        self.enter(SessionPhase::ShuttingDown);
        self.transition_with(StopReason::Failed(error))
    }
}

impl SessionController<Running> {
    /// Main loop: poll, normalize, publish, sleep until the next tick
    pub async fn run(mut self) -> RunExit {
        let tick = self.settings.tick_interval;
        info!("Bridge running ({:?} per tick)", tick);

        let mut events: Vec<RawEvent> = Vec::with_capacity(64);
        let mut deadline = Instant::now();

        loop {
            if self.shutdown.is_cancelled() {
                info!("Stop requested");
                return RunExit::Stopped(self.stop());
            }

            if !self.source.is_initialized() || self.source.enumerate() == 0 {
                warn!("Gamepad disconnected, attempting to reconnect...");
                return RunExit::Disconnected(self.degrade());
            }

            let backoff = match self.tick(&mut events) {
                Ok(()) => None,
                Err(TickError::Device(e)) => {
                    warn!("Gamepad fault, skipping tick: {}", e);
                    self.stats.faults += 1;
                    Some(self.settings.fault_backoff)
                }
                Err(TickError::Sink(e)) => {
                    warn!("Publish failed, retrying next tick: {}", e);
                    self.stats.faults += 1;
                    None
                }
            };
            self.stats.ticks += 1;

            let now = Instant::now();
            deadline += tick;
            if deadline < now {
                debug!("Tick overran by {:?}", now - deadline);
                deadline = now;
            }
            if let Some(backoff) = backoff {
                deadline = deadline.max(now + backoff);
            }

            let cancelled = tokio::select! {
                _ = self.shutdown.cancelled() => true,
                _ = sleep_until(deadline) => false,
            };
            if cancelled {
                debug!("Woken by stop request");
            }
        }
    }

    fn tick(&mut self, events: &mut Vec<RawEvent>) -> Result<(), TickError> {
        events.clear();
        self.source.poll(events)?;

        for event in events.drain(..) {
            self.normalizer.apply(&mut self.input, event);
        }

        let sink = self.sink.as_deref_mut().ok_or(SinkError::Closed)?;
        self.synchronizer.publish(&self.input, sink)?;
        Ok(())
    }

    fn degrade(mut self) -> SessionController<Degraded> {
        self.input.reset();
        if let Some(sink) = self.sink.as_deref_mut() {
            if let Err(e) = self.synchronizer.publish(&self.input, sink) {
                warn!("Failed to neutralize virtual controller: {}", e);
            }
        }
        self.enter(SessionPhase::Degraded);
        self.transition()
    }

    fn stop(mut self) -> SessionController<ShuttingDown> {
        self.enter(SessionPhase::ShuttingDown);
        self.transition_with(StopReason::Requested)
    }
}

impl SessionController<Degraded> {
    /// Tries to get a gamepad back, keeping the virtual pad alive meanwhile
    pub async fn reacquire(
        mut self,
    ) -> Result<SessionController<Running>, SessionController<ShuttingDown>> {
        if let Err(e) = self.source.close() {
            debug!("Closing lost gamepad failed: {}", e);
        }

        let attempts = self.settings.reconnect_attempts.max(1);
        let index = self.settings.device_index;

        for attempt in 1..=attempts {
            if attempt > 1 {
                let cancelled = tokio::select! {
                    _ = self.shutdown.cancelled() => true,
                    _ = sleep(self.settings.reconnect_delay) => false,
                };
                if cancelled {
                    info!("Stop requested while reconnecting");
                    return Err(self.stop());
                }
            } else if self.shutdown.is_cancelled() {
                return Err(self.stop());
            }

            let available = self.source.enumerate();
            if index >= available {
                warn!(
                    "Reconnect attempt {}/{}: gamepad {} not present ({} connected)",
                    attempt, attempts, index, available
                );
                continue;
            }

            match self.source.open(index) {
                Ok(device) => {
                    info!("Reconnected to {}", device);
                    self.stats.reconnects += 1;
                    self.enter(SessionPhase::Running);
                    return Ok(self.transition());
                }
                Err(e) => warn!("Reconnect attempt {}/{} failed: {}", attempt, attempts, e),
            }
        }

        error!("No gamepads found, exiting...");
        self.enter(SessionPhase::ShuttingDown);
        Err(self.transition_with(StopReason::Failed(SessionError::ReconnectExhausted {
            attempts,
        })))
    }

    fn stop(mut self) -> SessionController<ShuttingDown> {
        self.enter(SessionPhase::ShuttingDown);
        self.transition_with(StopReason::Requested)
    }
}

impl SessionController<ShuttingDown> {
    pub fn reason(&self) -> Option<&StopReason> {
        self.get_state_data()
    }

    /// Releases the virtual pad and the gamepad; every step is best effort
    pub fn shutdown(mut self) -> SessionReport {
        let reason = self
            .get_state_data()
            .cloned()
            .unwrap_or(StopReason::Requested);
        info!("Shutting down...");

        self.input.reset();
        if let Some(mut sink) = self.sink.take() {
            if let Err(e) = sink.reset() {
                warn!("Failed to reset virtual controller: {}", e);
            }
            if let Err(e) = sink.flush() {
                warn!("Failed to flush neutral state: {}", e);
            }
            if let Err(e) = sink.close() {
                warn!("Failed to release virtual controller: {}", e);
            }
        }
        if let Err(e) = self.source.close() {
            warn!("Failed to close gamepad: {}", e);
        }

        self.enter(SessionPhase::Stopped);
        info!("Shutdown complete");

        let outcome = match reason {
            StopReason::Requested => Ok(()),
            StopReason::Failed(e) => Err(e),
        };
        SessionReport {
            outcome,
            ticks: self.stats.ticks,
            faults: self.stats.faults,
            reconnects: self.stats.reconnects,
            phases: std::mem::take(&mut self.stats.phases),
            started_at: self.stats.started_at,
            stopped_at: Local::now(),
        }
    }
}

/// Drives a session from acquisition to `Stopped`
pub async fn run_session<F>(session: SessionController<Acquiring>, open_sink: F) -> SessionReport
where
    F: FnOnce() -> Result<Box<dyn VirtualSink>, SinkError>,
{
    let mut running = match session.acquire(open_sink) {
        Ok(running) => running,
        Err(stopping) => return stopping.shutdown(),
    };

    loop {
        match running.run().await {
            RunExit::Stopped(stopping) => return stopping.shutdown(),
            RunExit::Disconnected(degraded) => match degraded.reacquire().await {
                Ok(next) => running = next,
                Err(stopping) => return stopping.shutdown(),
            },
        }
    }
}

//! Periodic decay of accumulated counts.
//!
//! Without decay, counts saturate monotonically and eventually throttle
//! every client. The scheduler resets the shared counter at a fixed
//! interval, trading responsiveness (short intervals forget abuse quickly)
//! against stability (long intervals limit more smoothly and recover more
//! slowly after abuse stops).

use crate::application::gate::AdmissionGate;
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// Error returned when decay configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecayConfigError {
    /// Decay interval duration must be greater than zero
    ZeroInterval,
}

impl fmt::Display for DecayConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecayConfigError::ZeroInterval => {
                write!(f, "decay interval must be greater than 0")
            }
        }
    }
}

impl std::error::Error for DecayConfigError {}

/// Configuration for the decay scheduler.
#[derive(Debug, Clone)]
pub struct DecayConfig {
    /// Length of one decay epoch
    pub interval: Duration,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

impl DecayConfig {
    /// Create a new decay config with the specified interval.
    ///
    /// # Errors
    /// Returns `DecayConfigError::ZeroInterval` if `interval` is zero.
    pub fn new(interval: Duration) -> Result<Self, DecayConfigError> {
        if interval.is_zero() {
            return Err(DecayConfigError::ZeroInterval);
        }
        Ok(Self { interval })
    }
}

/// Error returned when the decay task fails to shut down cleanly.
#[derive(Debug)]
pub enum ShutdownError {
    /// The background task panicked before completing shutdown
    TaskPanicked,
}

impl fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownError::TaskPanicked => write!(f, "decay task panicked during shutdown"),
        }
    }
}

impl std::error::Error for ShutdownError {}

/// Periodically resets the gate's shared counter.
#[derive(Debug)]
pub struct DecayScheduler {
    gate: AdmissionGate,
    config: DecayConfig,
}

impl DecayScheduler {
    /// Create a new scheduler over the given gate.
    pub fn new(gate: AdmissionGate, config: DecayConfig) -> Self {
        Self { gate, config }
    }

    /// Get the scheduler configuration.
    pub fn config(&self) -> &DecayConfig {
        &self.config
    }

    /// Spawn the background reset task.
    ///
    /// Must be called within a tokio runtime. The task runs until the
    /// returned handle is shut down or dropped.
    pub fn start(self) -> DecayHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(());
        let join = tokio::spawn(async move {
            let mut ticker = interval(self.config.interval);
            // the first tick completes immediately; consume it so the first
            // epoch runs full length
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.gate.reset();
                        tracing::debug!("decay tick: counter reset");
                    }
                    // fires on explicit shutdown and when the handle is
                    // dropped (sender closed)
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        DecayHandle { shutdown_tx, join }
    }
}

/// Handle to a running decay task.
///
/// Dropping the handle stops the task; [`DecayHandle::shutdown`] stops it
/// and waits for it to finish.
#[derive(Debug)]
pub struct DecayHandle {
    shutdown_tx: watch::Sender<()>,
    join: JoinHandle<()>,
}

impl DecayHandle {
    /// Stop the decay task and wait for it to exit.
    ///
    /// # Errors
    /// Returns `ShutdownError::TaskPanicked` if the task did not exit
    /// cleanly.
    pub async fn shutdown(self) -> Result<(), ShutdownError> {
        // ignore send errors: the task may already have observed a closed
        // channel and exited
        let _ = self.shutdown_tx.send(());
        self.join.await.map_err(|_| ShutdownError::TaskPanicked)
    }

    /// Whether the background task has already exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

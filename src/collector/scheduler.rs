//! Sweep scheduler and receiver lifecycle.

use std::sync::Arc;
use std::time::Duration;

use strum_macros::{AsRefStr, Display};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::collector::{ProbeError, Prober};
use crate::config::{ConfigError, ReceiverConfig, Target};
use crate::metrics::{MetricBatch, MetricsConsumer, SweepAggregator};

/// Default time to wait for an in-flight sweep on shutdown (5 seconds).
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised by the receiver lifecycle.
#[derive(Debug, Error)]
pub enum ReceiverError {
    /// The configuration is invalid; the loop is never started.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// `start` was called on a running receiver.
    #[error("receiver already started")]
    AlreadyStarted,

    /// `start` was called after shutdown.
    #[error("receiver is stopped and cannot be restarted")]
    Stopped,

    /// The sweep task panicked.
    #[error("sweep task failed: {0}")]
    Task(String),
}

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ReceiverState {
    /// Built, never started.
    Idle,
    /// Sweep task running.
    Running,
    /// Cancelled; cannot be restarted.
    Stopped,
}

enum Lifecycle {
    Idle,
    Running {
        cancel: CancellationToken,
        task: JoinHandle<()>,
    },
    Stopped {
        task: Option<JoinHandle<()>>,
    },
}

/// Periodically probes every configured target and emits one metric batch
/// per sweep.
///
/// One background task runs the loop; targets are probed sequentially in
/// configured order, and the batch is handed to the consumer only once the
/// whole sweep is done.
pub struct IcmpCheckReceiver<P, C> {
    config: Arc<ReceiverConfig>,
    prober: Arc<P>,
    consumer: Arc<C>,
    lifecycle: Lifecycle,
}

impl<P, C> std::fmt::Debug for IcmpCheckReceiver<P, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IcmpCheckReceiver")
            .field("interval", &self.config.interval)
            .field("target_count", &self.config.targets.len())
            .finish_non_exhaustive()
    }
}

impl<P: Prober, C: MetricsConsumer> IcmpCheckReceiver<P, C> {
    /// Create an idle receiver.
    ///
    /// # Errors
    /// Returns `ReceiverError::Config` if the configuration does not validate.
    pub fn new(config: ReceiverConfig, prober: P, consumer: C) -> Result<Self, ReceiverError> {
        config.validate()?;

        Ok(Self {
            config: Arc::new(config),
            prober: Arc::new(prober),
            consumer: Arc::new(consumer),
            lifecycle: Lifecycle::Idle,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReceiverState {
        match &self.lifecycle {
            Lifecycle::Idle => ReceiverState::Idle,
            Lifecycle::Running { task, .. } if !task.is_finished() => ReceiverState::Running,
            Lifecycle::Running { .. } | Lifecycle::Stopped { .. } => ReceiverState::Stopped,
        }
    }

    /// Spawn the sweep loop and return immediately.
    ///
    /// The loop runs until `parent` or [`shutdown`](Self::shutdown) cancels
    /// it. The first sweep happens one full interval after this call.
    ///
    /// # Errors
    /// Returns `AlreadyStarted` or `Stopped` if the receiver is not idle.
    pub fn start(&mut self, parent: &CancellationToken) -> Result<(), ReceiverError> {
        match self.lifecycle {
            Lifecycle::Idle => {}
            Lifecycle::Running { .. } => return Err(ReceiverError::AlreadyStarted),
            Lifecycle::Stopped { .. } => return Err(ReceiverError::Stopped),
        }

        let cancel = parent.child_token();
        let task = tokio::spawn(run_sweeps(
            Arc::clone(&self.config),
            Arc::clone(&self.prober),
            Arc::clone(&self.consumer),
            cancel.clone(),
        ));

        self.lifecycle = Lifecycle::Running { cancel, task };
        tracing::info!(
            interval = ?self.config.interval,
            targets = self.config.targets.len(),
            "ICMP check receiver started"
        );
        Ok(())
    }

    /// Cancel the loop without waiting for it.
    ///
    /// An in-flight sweep still runs to completion and is emitted; no new
    /// sweep starts. Idempotent, and a no-op on an idle receiver.
    pub fn shutdown(&mut self) -> Result<(), ReceiverError> {
        self.lifecycle = match std::mem::replace(&mut self.lifecycle, Lifecycle::Idle) {
            Lifecycle::Running { cancel, task } => {
                cancel.cancel();
                tracing::info!("ICMP check receiver stopping");
                Lifecycle::Stopped { task: Some(task) }
            }
            other => other,
        };
        Ok(())
    }

    /// Cancel the loop and wait up to `timeout` for an in-flight sweep.
    ///
    /// Running out of time is logged, not returned as an error.
    ///
    /// # Errors
    /// Returns `ReceiverError::Task` if the sweep task panicked.
    pub async fn shutdown_with_timeout(&mut self, timeout: Duration) -> Result<(), ReceiverError> {
        self.shutdown()?;

        let Lifecycle::Stopped { task } = &mut self.lifecycle else {
            return Ok(());
        };
        let Some(task) = task.take() else {
            return Ok(());
        };

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(())) => {
                tracing::info!("ICMP check receiver shutdown complete");
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Sweep task failed");
                Err(ReceiverError::Task(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "ICMP check receiver shutdown timed out"
                );
                Ok(())
            }
        }
    }
}

impl<P, C> Drop for IcmpCheckReceiver<P, C> {
    fn drop(&mut self) {
        if let Lifecycle::Running { cancel, .. } = &self.lifecycle {
            cancel.cancel();
        }
    }
}

/// Tick, sweep, hand off; until cancelled.
async fn run_sweeps<P: Prober, C: MetricsConsumer>(
    config: Arc<ReceiverConfig>,
    prober: Arc<P>,
    consumer: Arc<C>,
    cancel: CancellationToken,
) {
    let period = config.interval;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    // Ticks missed during a long sweep collapse into one delayed tick.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let started = Instant::now();
        let batch = sweep(&config.targets, prober.as_ref()).await;
        let points = batch.data_point_count();

        // A consumer that stays full must not hold the task past cancellation.
        let handoff = tokio::select! {
            biased;
            result = consumer.consume(batch) => Some(result),
            () = cancel.cancelled() => None,
        };

        match handoff {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                tracing::error!(error = %e, points, "Failed to hand off metric batch");
            }
            None => {
                tracing::warn!(points, "Dropping metric batch, consumer still busy at shutdown");
                break;
            }
        }

        tracing::debug!(
            duration_ms = started.elapsed().as_millis() as u64,
            points,
            "Sweep completed"
        );
    }

    tracing::info!("Sweep loop stopped");
}

/// Probe every target once, in order, and aggregate the results.
///
/// A failing target is logged and skipped; it contributes no data points
/// and never aborts the sweep.
pub async fn sweep<P: Prober + ?Sized>(targets: &[Target], prober: &P) -> MetricBatch {
    let mut aggregator = SweepAggregator::new();

    for target in targets {
        match prober.probe(target).await {
            Ok(result) => aggregator.record(result),
            Err(e @ ProbeError::Resolution { .. }) => {
                tracing::warn!(target = %e.target(), error = %e, "Skipping target");
            }
            Err(e) => {
                tracing::error!(target = %e.target(), error = %e, "Failed to execute pinger");
            }
        }
    }

    aggregator.finish()
}

//! Refresh Worker
//!
//! Background worker that periodically rebuilds the matches of every
//! active project so scores track vendor changes without a manual rebuild.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::core::MatchEngine;
use crate::models::RefreshReport;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    #[error("Refresh interval must be greater than zero")]
    ZeroInterval,
}

/// Refresh worker for active projects
pub struct RefreshWorker {
    engine: MatchEngine,
    interval: Duration,
    last_report: Arc<RwLock<Option<RefreshReport>>>,
}

/// Handle to a running refresh worker
pub struct RefreshWorkerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshWorkerHandle {
    /// Signal the worker to stop and wait for the current run to finish
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!("Refresh worker task ended abnormally: {}", e);
        }
    }
}

impl RefreshWorker {
    pub fn new(engine: MatchEngine, interval: Duration) -> Result<Self, WorkerError> {
        if interval.is_zero() {
            return Err(WorkerError::ZeroInterval);
        }

        Ok(Self {
            engine,
            interval,
            last_report: Arc::new(RwLock::new(None)),
        })
    }

    /// Report from the most recent completed run
    pub async fn last_report(&self) -> Option<RefreshReport> {
        self.last_report.read().await.clone()
    }

    /// Start the worker
    ///
    /// The first refresh runs immediately, then once per interval.
    pub fn start(&self) -> RefreshWorkerHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let engine = self.engine.clone();
        let last_report = Arc::clone(&self.last_report);
        let period = self.interval;

        let task = tokio::spawn(async move {
            info!("Refresh worker started with interval {:?}", period);
            let mut ticker = tokio::time::interval(period);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match engine.refresh_active_projects().await {
                            Ok(report) => {
                                *last_report.write().await = Some(report);
                            }
                            Err(e) => error!("Scheduled match refresh failed: {}", e),
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            info!("Refresh worker stopping");
                            break;
                        }
                    }
                }
            }
        });

        RefreshWorkerHandle { shutdown, task }
    }
}

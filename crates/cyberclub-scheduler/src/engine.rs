//! The recurring-job engine.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::task::JoinHandle;

use cyberclub_core::error::Result;

use crate::trigger::Trigger;

/// A recurring job. One tick's failure is the job's own business to report;
/// the engine logs it and keeps the schedule alive.
#[async_trait]
pub trait Job: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn run(&self) -> Result<()>;
}

struct Registration {
    trigger: Trigger,
    job: Arc<dyn Job>,
}

/// Owns the job registry and the spawned runner tasks.
///
/// Lifecycle is Idle → Running → Idle: `register` everything at startup,
/// `start` once, `stop` on shutdown. The registry is never mutated while
/// running.
pub struct SchedulerEngine {
    registrations: Vec<Registration>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    running: AtomicBool,
}

impl SchedulerEngine {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            handles: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
        }
    }

    /// Add a job to the registry. Call before `start`.
    pub fn register(&mut self, trigger: Trigger, job: Arc<dyn Job>) {
        self.registrations.push(Registration { trigger, job });
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawn one runner task per registered job. Idempotent; a second call
    /// while running is a no-op.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut handles = self.handles.lock().expect("scheduler handle lock");
        for registration in &self.registrations {
            let trigger = registration.trigger.clone();
            let job = Arc::clone(&registration.job);
            tracing::info!("Scheduler: job '{}' registered", job.name());

            handles.push(tokio::spawn(async move {
                loop {
                    let Some(delay) = trigger.sleep_from(Utc::now()) else {
                        tracing::warn!(
                            "Scheduler: job '{}' has no next fire time, stopping it",
                            job.name()
                        );
                        return;
                    };
                    tokio::time::sleep(delay).await;

                    // Awaiting the tick inline means a job can never overlap
                    // itself; a slow tick delays the next one instead.
                    if let Err(e) = job.run().await {
                        tracing::warn!("Scheduler: job '{}' tick failed: {e}", job.name());
                    }
                }
            }));
        }
    }

    /// Tear down all runner tasks and return to Idle.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let mut handles = self.handles.lock().expect("scheduler handle lock");
        for handle in handles.drain(..) {
            handle.abort();
        }
        tracing::info!("Scheduler stopped");
    }
}

impl Default for SchedulerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SchedulerEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

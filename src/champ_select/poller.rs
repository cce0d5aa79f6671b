// Timer-driven session polling; one fetch-and-process cycle at a time

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::types::FetchOutcome;

/// Where session snapshots come from.
#[async_trait]
pub trait SessionSource: Send + Sync {
  async fn fetch_session(&self) -> FetchOutcome;
}

/// Receives every fetch outcome, in order, on the polling task.
#[async_trait]
pub trait TickHandler: Send + 'static {
  async fn on_outcome(&mut self, outcome: FetchOutcome);
}

struct PollTask {
  cancel: CancellationToken,
  handle: JoinHandle<()>,
}

pub struct SessionPoller {
  source: Arc<dyn SessionSource>,
  task: Option<PollTask>,
}

impl SessionPoller {
  pub fn new(source: Arc<dyn SessionSource>) -> Self {
    Self { source, task: None }
  }

  pub async fn fetch_once(&self) -> FetchOutcome {
    self.source.fetch_session().await
  }

  pub fn is_running(&self) -> bool {
    self
      .task
      .as_ref()
      .map_or(false, |t| !t.cancel.is_cancelled() && !t.handle.is_finished())
  }

  /// Starts polling every `interval`. Returns false and does nothing when the
  /// poller is already running. Ticks that fall due while a cycle is still
  /// running are skipped, not queued.
  pub fn start<H: TickHandler>(&mut self, interval: Duration, mut handler: H) -> bool {
    if self.is_running() {
      tracing::debug!("[Session Poller] Already running, ignoring start");
      return false;
    }

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let source = self.source.clone();

    tracing::info!(
      "[Session Poller] Polling every {} ms",
      interval.as_millis()
    );
    let handle = tokio::spawn(async move {
      let mut ticker = tokio::time::interval(interval);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

      loop {
        tokio::select! {
          biased;
          _ = token.cancelled() => break,
          _ = ticker.tick() => {}
        }

        let outcome = tokio::select! {
          biased;
          _ = token.cancelled() => break,
          outcome = source.fetch_session() => outcome,
        };

        // Once fetched, the cycle runs to completion even if stop() comes in.
        handler.on_outcome(outcome).await;
      }
      tracing::debug!("[Session Poller] Stopped");
    });

    self.task = Some(PollTask { cancel, handle });
    true
  }

  /// Stops polling. Safe to call repeatedly or before `start`.
  pub fn stop(&mut self) {
    if let Some(task) = self.task.take() {
      task.cancel.cancel();
    }
  }

  /// Stops polling and waits for an in-flight cycle to finish.
  pub async fn shutdown(&mut self) {
    if let Some(task) = self.task.take() {
      task.cancel.cancel();
      if let Err(e) = task.handle.await {
        tracing::warn!("[Session Poller] Polling task ended abnormally: {}", e);
      }
    }
  }
}

impl Drop for SessionPoller {
  fn drop(&mut self) {
    self.stop();
  }
}

// Champ select watcher: polls the session and publishes what changed

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};

use super::machine::SelectionStateMachine;
use super::poller::{SessionPoller, SessionSource, TickHandler};
use super::types::{DomainEvent, FetchOutcome, SelectionState, WatcherStatus};

const EVENT_CAPACITY: usize = 64;

/// Runs the state machine on the polling task and fans its output out.
struct MachineDriver {
  machine: Arc<Mutex<SelectionStateMachine>>,
  events_tx: broadcast::Sender<DomainEvent>,
  status_tx: Arc<watch::Sender<WatcherStatus>>,
}

#[async_trait]
impl TickHandler for MachineDriver {
  async fn on_outcome(&mut self, outcome: FetchOutcome) {
    let report = self.machine.lock().await.process(outcome).await;

    for event in report.events {
      if let Some(signal) = event.signal_name() {
        tracing::info!("[LCU Watcher] Signal: {}", signal);
      }
      // No subscribers is fine.
      let _ = self.events_tx.send(event);
    }
    if let Some(status) = report.status {
      self.status_tx.send_replace(status);
    }
  }
}

pub struct ChampSelectWatcher {
  poller: SessionPoller,
  machine: Arc<Mutex<SelectionStateMachine>>,
  events_tx: broadcast::Sender<DomainEvent>,
  status_tx: Arc<watch::Sender<WatcherStatus>>,
  interval: Duration,
}

impl ChampSelectWatcher {
  pub fn new(
    source: Arc<dyn SessionSource>,
    machine: SelectionStateMachine,
    interval: Duration,
  ) -> Self {
    let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
    let (status_tx, _) = watch::channel(WatcherStatus::default());
    Self {
      poller: SessionPoller::new(source),
      machine: Arc::new(Mutex::new(machine)),
      events_tx,
      status_tx: Arc::new(status_tx),
      interval,
    }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
    self.events_tx.subscribe()
  }

  pub fn status(&self) -> watch::Receiver<WatcherStatus> {
    self.status_tx.subscribe()
  }

  /// Shared handle for other components that report into the status indicator.
  pub fn status_sender(&self) -> Arc<watch::Sender<WatcherStatus>> {
    self.status_tx.clone()
  }

  pub fn is_running(&self) -> bool {
    self.poller.is_running()
  }

  pub fn start(&mut self) -> bool {
    let driver = MachineDriver {
      machine: self.machine.clone(),
      events_tx: self.events_tx.clone(),
      status_tx: self.status_tx.clone(),
    };
    self.poller.start(self.interval, driver)
  }

  pub fn stop(&mut self) {
    self.poller.stop();
  }

  pub async fn shutdown(&mut self) {
    self.poller.shutdown().await;
  }

  pub async fn state(&self) -> SelectionState {
    self.machine.lock().await.state().clone()
  }
}

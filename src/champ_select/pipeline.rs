// Download pipeline: one cancelable producer per champion selection

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::types::{Champion, ChampionId, GameMode, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
  pub champion: Champion,
  pub game_mode: GameMode,
  pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
  SummonerSpells {
    provider: String,
    position: String,
    payload: serde_json::Value,
  },
  PerksPage {
    provider: String,
    position: String,
    payload: serde_json::Value,
  },
  ItemSet {
    provider: String,
    position: String,
    payload: serde_json::Value,
  },
}

impl DownloadEvent {
  /// Wire name of the event as providers emit it.
  pub fn name(&self) -> &'static str {
    match self {
      Self::SummonerSpells { .. } => "summonerspells",
      Self::PerksPage { .. } => "perksPage",
      Self::ItemSet { .. } => "itemset",
    }
  }

  pub fn provider(&self) -> &str {
    match self {
      Self::SummonerSpells { provider, .. }
      | Self::PerksPage { provider, .. }
      | Self::ItemSet { provider, .. } => provider,
    }
  }

  pub fn position(&self) -> &str {
    match self {
      Self::SummonerSpells { position, .. }
      | Self::PerksPage { position, .. }
      | Self::ItemSet { position, .. } => position,
    }
  }

  pub fn payload(&self) -> &serde_json::Value {
    match self {
      Self::SummonerSpells { payload, .. }
      | Self::PerksPage { payload, .. }
      | Self::ItemSet { payload, .. } => payload,
    }
  }
}

pub type DownloadStream = BoxStream<'static, DownloadEvent>;

/// Produces customization data for a champion. Implementations own the
/// providers; the stream ends when every provider is done.
pub trait DownloadCoordinator: Send + Sync {
  fn start(&self, request: DownloadRequest) -> DownloadStream;
}

/// A download event tagged with the pipeline that produced it. Events of a
/// superseded pipeline may still arrive after a newer one started.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineEvent {
  pub pipeline_id: Uuid,
  pub champion: Champion,
  pub event: DownloadEvent,
}

struct ActivePipeline {
  id: Uuid,
  champion_id: ChampionId,
  cancel: CancellationToken,
}

/// Holds the single active pipeline of an episode. The id published on
/// `active_tx` is the only pipeline whose events may still be applied.
pub struct PipelineSlot {
  coordinator: Arc<dyn DownloadCoordinator>,
  events_tx: mpsc::UnboundedSender<PipelineEvent>,
  active_tx: watch::Sender<Option<Uuid>>,
  active: Option<ActivePipeline>,
}

impl PipelineSlot {
  pub fn new(
    coordinator: Arc<dyn DownloadCoordinator>,
    events_tx: mpsc::UnboundedSender<PipelineEvent>,
  ) -> Self {
    let (active_tx, _) = watch::channel(None);
    Self {
      coordinator,
      events_tx,
      active_tx,
      active: None,
    }
  }

  /// Follows the active pipeline id; `None` between pipelines.
  pub fn subscribe_active(&self) -> watch::Receiver<Option<Uuid>> {
    self.active_tx.subscribe()
  }

  /// Cancels the current pipeline, if any, and starts a new one.
  /// Must be called from within a Tokio runtime.
  pub fn start(&mut self, request: DownloadRequest) -> Uuid {
    self.cancel();

    let id = Uuid::new_v4();
    let cancel = CancellationToken::new();
    let champion = request.champion.clone();
    let champion_id = champion.id;
    tracing::info!(
      "[Pipeline][{}] Starting downloads for {} ({}, {})",
      id,
      champion.name,
      request.game_mode,
      request.position.map(|p| p.as_str()).unwrap_or("unresolved")
    );

    let mut stream = self.coordinator.start(request);
    let tx = self.events_tx.clone();
    let token = cancel.clone();
    // Published before the task can send its first event.
    self.active_tx.send_replace(Some(id));
    tokio::spawn(async move {
      loop {
        tokio::select! {
          biased;
          _ = token.cancelled() => {
            tracing::debug!("[Pipeline][{}] Canceled", id);
            break;
          }
          next = stream.next() => match next {
            Some(event) => {
              tracing::debug!(
                "[Pipeline][{}] {} from {} ({})",
                id,
                event.name(),
                event.provider(),
                event.position()
              );
              // Nothing produced after cancel() may reach the channel.
              if token.is_cancelled() {
                break;
              }
              let tagged = PipelineEvent {
                pipeline_id: id,
                champion: champion.clone(),
                event,
              };
              if tx.send(tagged).is_err() {
                break;
              }
            }
            None => {
              tracing::debug!("[Pipeline][{}] Completed", id);
              break;
            }
          }
        }
      }
    });

    self.active = Some(ActivePipeline {
      id,
      champion_id,
      cancel,
    });
    id
  }

  pub fn cancel(&mut self) {
    if let Some(active) = self.active.take() {
      tracing::debug!(
        "[Pipeline][{}] Superseding pipeline of champion {}",
        active.id,
        active.champion_id
      );
      active.cancel.cancel();
      self.active_tx.send_replace(None);
    }
  }

  pub fn active_id(&self) -> Option<Uuid> {
    self.active.as_ref().map(|a| a.id)
  }
}

impl Drop for PipelineSlot {
  fn drop(&mut self) {
    self.cancel();
  }
}

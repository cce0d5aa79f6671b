// Applies downloaded summoner spells, rune pages and item sets to the client

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use super::item_sets::{ItemSetRef, ItemSetStore};
use super::pipeline::{DownloadEvent, PipelineEvent};
use super::types::{position_label, Champion, WatcherStatus};
use crate::config::WatcherConfig;
use crate::error::{Result, WatcherError};

/// Client-side effects of a customization.
#[async_trait]
pub trait CustomizationTarget: Send + Sync {
  async fn update_summoner_spells(&self, payload: &serde_json::Value) -> Result<()>;

  async fn update_perks_page(
    &self,
    champion: &Champion,
    position: &str,
    payload: &serde_json::Value,
  ) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
  SummonerSpells,
  /// Runes for this position were loaded into the client.
  RunesLoaded(String),
  /// Runes for this position are available for `select_position`.
  PositionOffered(String),
  ItemSetSaved(ItemSetRef),
  /// Disabled in settings, or not from the active pipeline.
  Skipped,
}

struct OfferedPage {
  position: String,
  payload: serde_json::Value,
}

pub struct CustomizationApplier {
  enable_summoner_spells: bool,
  enable_item_sets: bool,
  load_runes_automatically: bool,
  target: Arc<dyn CustomizationTarget>,
  item_sets: Arc<dyn ItemSetStore>,
  status_tx: Option<Arc<watch::Sender<WatcherStatus>>>,
  // Only events of this pipeline are applied; `None` after a clear or exit.
  active: watch::Receiver<Option<Uuid>>,
  current: Option<(Uuid, Champion)>,
  offered: Vec<OfferedPage>,
}

impl CustomizationApplier {
  pub fn new(
    config: &WatcherConfig,
    target: Arc<dyn CustomizationTarget>,
    item_sets: Arc<dyn ItemSetStore>,
    active: watch::Receiver<Option<Uuid>>,
  ) -> Self {
    Self {
      enable_summoner_spells: config.enable_summoner_spells,
      enable_item_sets: config.enable_item_sets,
      load_runes_automatically: config.load_runes_automatically,
      target,
      item_sets,
      status_tx: None,
      active,
      current: None,
      offered: Vec::new(),
    }
  }

  pub fn with_status(mut self, status_tx: Arc<watch::Sender<WatcherStatus>>) -> Self {
    self.status_tx = Some(status_tx);
    self
  }

  /// Positions with a rune page for the current champion, in arrival order.
  pub fn positions(&self) -> Vec<String> {
    let active = *self.active.borrow();
    match &self.current {
      Some((id, _)) if Some(*id) == active => {
        self.offered.iter().map(|p| p.position.clone()).collect()
      }
      _ => Vec::new(),
    }
  }

  /// Forgets the current champion once its pipeline stopped being the active
  /// one, and returns the active id.
  fn sync_with_active(&mut self) -> Option<Uuid> {
    let active = *self.active.borrow();
    if matches!(&self.current, Some((id, _)) if Some(*id) != active) {
      self.current = None;
      self.offered.clear();
    }
    active
  }

  pub async fn handle(&mut self, event: PipelineEvent) -> Result<Applied> {
    if self.sync_with_active() != Some(event.pipeline_id) {
      return Ok(Applied::Skipped);
    }
    if self.current.is_none() {
      self.current = Some((event.pipeline_id, event.champion.clone()));
    }

    let champion = event.champion;
    match event.event {
      DownloadEvent::SummonerSpells { payload, .. } => {
        if !self.enable_summoner_spells {
          return Ok(Applied::Skipped);
        }
        self.target.update_summoner_spells(&payload).await?;
        Ok(Applied::SummonerSpells)
      }
      DownloadEvent::PerksPage {
        position, payload, ..
      } => {
        let first = self.offered.is_empty();
        if self.offered.iter().any(|p| p.position == position) {
          return Ok(Applied::Skipped);
        }
        self.offered.push(OfferedPage {
          position: position.clone(),
          payload: payload.clone(),
        });

        // The first page that comes in picks the displayed position.
        if first && self.load_runes_automatically {
          self.load_runes(&champion, &position, &payload).await?;
          return Ok(Applied::RunesLoaded(position));
        }
        Ok(Applied::PositionOffered(position))
      }
      DownloadEvent::ItemSet {
        provider,
        position,
        payload,
      } => {
        if !self.enable_item_sets {
          return Ok(Applied::Skipped);
        }
        let name = format!("{}_{}", provider, position);
        let set = self
          .item_sets
          .save_item_set(&champion.key, &name, &payload)
          .await?;
        Ok(Applied::ItemSetSaved(set))
      }
    }
  }

  /// Loads the offered rune page for `position`, the manual counterpart of
  /// automatic loading.
  pub async fn select_position(&mut self, position: &str) -> Result<()> {
    self.sync_with_active();
    let Some((_, champion)) = self.current.clone() else {
      return Err(WatcherError::Strategy("no champion selected".to_string()));
    };
    let payload = self
      .offered
      .iter()
      .find(|p| p.position == position)
      .map(|p| p.payload.clone())
      .ok_or_else(|| {
        WatcherError::Strategy(format!("no rune page offered for position {}", position))
      })?;
    self.load_runes(&champion, position, &payload).await
  }

  async fn load_runes(
    &self,
    champion: &Champion,
    position: &str,
    payload: &serde_json::Value,
  ) -> Result<()> {
    self
      .target
      .update_perks_page(champion, position, payload)
      .await?;
    tracing::info!(
      "[Customization] Runes loaded for {} ({})",
      champion.name,
      position_label(position)
    );
    if let Some(status) = &self.status_tx {
      status.send_replace(WatcherStatus::RunesLoaded {
        champion: champion.name.clone(),
        position: position_label(position),
      });
    }
    Ok(())
  }

  /// Consumes pipeline events until the sending side is gone.
  pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<PipelineEvent>) {
    while let Some(event) = events.recv().await {
      let name = event.event.name();
      match self.handle(event).await {
        Ok(Applied::Skipped) => tracing::debug!("[Customization] Skipped {}", name),
        Ok(applied) => tracing::debug!("[Customization] {} -> {:?}", name, applied),
        Err(e) => {
          tracing::error!("[Customization] Failed to apply {}: {}", name, e);
          if let Some(status) = &self.status_tx {
            status.send_replace(WatcherStatus::Error(e.to_string()));
          }
        }
      }
    }
  }
}

// Turns polled session snapshots into champ select domain events

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use super::catalog::ChampionCatalog;
use super::item_sets::ItemSetStore;
use super::pipeline::{DownloadCoordinator, DownloadRequest, PipelineEvent, PipelineSlot};
use super::session::summarize;
use super::strategy::StrategyTable;
use super::types::{
  Champion, ChampionId, DomainEvent, FetchOutcome, GameMode, Phase, SelectionState,
  SessionSnapshot, WatcherStatus,
};
use crate::error::{Result, WatcherError};

/// Tells which game mode the current session is played in.
#[async_trait]
pub trait GameModeResolver: Send + Sync {
  async fn game_mode(&self) -> Result<String>;
}

/// Collaborators the state machine works with, passed in explicitly.
#[derive(Clone)]
pub struct SessionContext {
  pub resolver: Arc<dyn GameModeResolver>,
  pub item_sets: Arc<dyn ItemSetStore>,
  pub downloads: Arc<dyn DownloadCoordinator>,
  pub catalog: Arc<ChampionCatalog>,
}

/// Everything one tick produced. Events are in emission order; they are kept
/// even when the tick failed part way.
#[derive(Debug, Default)]
pub struct TickReport {
  pub events: Vec<DomainEvent>,
  pub status: Option<WatcherStatus>,
  pub error: Option<WatcherError>,
}

pub struct SelectionStateMachine {
  state: SelectionState,
  strategies: StrategyTable,
  context: SessionContext,
  pipeline: PipelineSlot,
  // Champion whose generated artifacts may still be on disk.
  prepared_for: Option<Champion>,
  // Set when the episode's game mode has no strategy; cleared on NotFound.
  rejected_mode: Option<String>,
  // The status indicator still shows this failure.
  last_tick_failed: bool,
  verbose: bool,
}

impl SelectionStateMachine {
  pub fn new(
    strategies: StrategyTable,
    context: SessionContext,
  ) -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let pipeline = PipelineSlot::new(context.downloads.clone(), tx);
    let machine = Self {
      state: SelectionState::default(),
      strategies,
      context,
      pipeline,
      prepared_for: None,
      rejected_mode: None,
      last_tick_failed: false,
      verbose: false,
    };
    (machine, rx)
  }

  /// Dump every entry snapshot at debug level.
  pub fn with_verbose(mut self, verbose: bool) -> Self {
    self.verbose = verbose;
    self
  }

  pub fn state(&self) -> &SelectionState {
    &self.state
  }

  pub fn active_pipeline(&self) -> Option<uuid::Uuid> {
    self.pipeline.active_id()
  }

  /// Follows the id of the pipeline whose output may still be applied.
  pub fn subscribe_active_pipeline(&self) -> watch::Receiver<Option<uuid::Uuid>> {
    self.pipeline.subscribe_active()
  }

  pub async fn process(&mut self, outcome: FetchOutcome) -> TickReport {
    let mut report = TickReport::default();

    let result = match outcome {
      FetchOutcome::TransientError(err) => Err(err),
      FetchOutcome::NotFound => {
        self.exit(&mut report);
        Ok(())
      }
      FetchOutcome::Snapshot(snapshot) => self.on_snapshot(&snapshot, &mut report).await,
    };

    match result {
      Ok(()) if self.last_tick_failed => {
        if let Some(status) = self.recovered_status() {
          self.last_tick_failed = false;
          report.status.get_or_insert(status);
        }
      }
      Ok(()) => {}
      Err(err) => self.fail(err, &mut report),
    }
    report
  }

  fn fail(&mut self, err: WatcherError, report: &mut TickReport) {
    match &err {
      WatcherError::UnsupportedGameMode(mode) => tracing::error!(
        "[Champ Select] Unsupported game mode {}; ignoring this champion select",
        mode
      ),
      other => tracing::warn!("[Champ Select] Tick failed: {}", other),
    }
    report.status = Some(WatcherStatus::Error(err.to_string()));
    report.error = Some(err);
    self.last_tick_failed = true;
  }

  /// Status for the current state, shown again once ticks succeed after a
  /// failure. An ignored episode keeps its error.
  fn recovered_status(&self) -> Option<WatcherStatus> {
    if self.rejected_mode.is_some() {
      return None;
    }
    let status = match (self.state.phase, self.state.last_champion_id) {
      (Phase::Idle, _) => WatcherStatus::Waiting,
      (Phase::InChampionSelect, Some(id)) if id != 0 => {
        let name = self
          .context
          .catalog
          .get(id)
          .map(|c| c.name.clone())
          .unwrap_or_else(|_| id.to_string());
        WatcherStatus::UpdatingDisplay(name)
      }
      (Phase::InChampionSelect, _) => WatcherStatus::PickChampion,
    };
    Some(status)
  }

  async fn on_snapshot(
    &mut self,
    snapshot: &SessionSnapshot,
    report: &mut TickReport,
  ) -> Result<()> {
    if self.rejected_mode.is_some() {
      return Ok(());
    }
    if self.state.phase == Phase::Idle {
      self.enter(snapshot, report).await?;
    }

    let mode = self
      .state
      .game_mode
      .ok_or_else(|| WatcherError::Strategy("in champion select without a game mode".into()))?;

    let pick = {
      let strategy = self.strategies.get_mut(mode)?;
      strategy.on_tick(snapshot)?;
      strategy
        .player()
        .ok_or_else(|| WatcherError::Strategy("no local player after tick".into()))?
    };

    if self.state.last_champion_id == Some(pick.champion_id) {
      return Ok(());
    }

    if pick.champion_id == 0 {
      let previous = self.state.last_champion_id.replace(0);
      report.status = Some(WatcherStatus::PickChampion);
      if matches!(previous, Some(id) if id != 0) {
        tracing::info!("[Champ Select] Champion deselected");
        self.pipeline.cancel();
        report.events.push(DomainEvent::ChampionCleared);
      }
      return Ok(());
    }

    self.change_champion(pick.champion_id, mode, report).await
  }

  async fn enter(&mut self, snapshot: &SessionSnapshot, report: &mut TickReport) -> Result<()> {
    let raw_mode = self.context.resolver.game_mode().await?;
    let mode = match GameMode::parse(&raw_mode) {
      Ok(mode) if self.strategies.supports(mode) => mode,
      _ => {
        self.rejected_mode = Some(raw_mode.clone());
        return Err(WatcherError::UnsupportedGameMode(raw_mode));
      }
    };

    if self.verbose {
      tracing::debug!("[Champ Select] Entry snapshot: {}", snapshot.json());
    } else {
      tracing::debug!("[Champ Select] Entry snapshot: {}", summarize(snapshot));
    }

    self.strategies.get_mut(mode)?.on_first_tick(snapshot)?;

    self.state.phase = Phase::InChampionSelect;
    self.state.game_mode = Some(mode);
    tracing::info!("[Champ Select] Entered champion select ({})", mode);
    report.events.push(DomainEvent::PhaseEntered { game_mode: mode });
    Ok(())
  }

  async fn change_champion(
    &mut self,
    champion_id: ChampionId,
    mode: GameMode,
    report: &mut TickReport,
  ) -> Result<()> {
    let champion = self.context.catalog.get(champion_id)?.clone();

    // The outgoing pipeline must not write artifacts after they are removed.
    self.pipeline.cancel();
    self.invalidate_artifacts(&champion).await?;

    let position = {
      let strategy = self.strategies.get_mut(mode)?;
      strategy.on_champion_change(&champion)?;
      strategy.position()
    };

    // Nothing below can fail; the pick is committed from here on.
    self.state.last_champion_id = Some(champion_id);
    self.prepared_for = Some(champion.clone());
    tracing::info!(
      "[Champ Select] Champion chosen: {} ({})",
      champion.name,
      champion_id
    );
    report.events.push(DomainEvent::ChampionChosen(champion_id));
    report.status = Some(WatcherStatus::UpdatingDisplay(champion.name.clone()));

    self.pipeline.start(DownloadRequest {
      champion,
      game_mode: mode,
      position,
    });
    Ok(())
  }

  /// Removes item sets generated for the outgoing champion and stale ones
  /// left for the incoming champion.
  async fn invalidate_artifacts(&self, incoming: &Champion) -> Result<()> {
    let store = self.context.item_sets.clone();
    let mut stale = Vec::new();

    if let Some(previous) = &self.prepared_for {
      if previous.key != incoming.key {
        stale.extend(store.item_sets_for(&previous.key).await?);
      }
    }
    stale.extend(store.item_sets_for(&incoming.key).await?);

    if !stale.is_empty() {
      tracing::debug!("[Champ Select] Deleting {} stale item sets", stale.len());
      store.delete_item_sets(&stale).await?;
    }
    Ok(())
  }

  fn exit(&mut self, report: &mut TickReport) {
    if let Some(mode) = self.rejected_mode.take() {
      tracing::debug!("[Champ Select] Left unsupported champion select ({})", mode);
    }
    if self.state.phase != Phase::InChampionSelect {
      return;
    }

    self.pipeline.cancel();
    report.events.push(DomainEvent::PhaseExited);
    if let Some(mode) = self.state.game_mode {
      if let Ok(strategy) = self.strategies.get_mut(mode) {
        strategy.end();
      }
    }
    self.state = SelectionState::default();
    self.prepared_for = None;
    report.status = Some(WatcherStatus::Waiting);
    tracing::info!("[Champ Select] Exited champion select");
  }
}

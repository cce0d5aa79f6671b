// Champion select watcher for the League client

pub mod champ_select;
pub mod config;
pub mod error;
pub mod lcu;
pub mod logging;

use std::sync::Arc;

use champ_select::{
  ChampSelectWatcher, ChampionCatalog, CustomizationApplier, DownloadCoordinator,
  FileItemSetStore, SelectionStateMachine, SessionContext, StrategyTable,
};
use config::WatcherConfig;
use error::{Result, WatcherError};
use lcu::LcuClient;

/// A wired watcher and the applier that consumes its download pipeline.
/// Spawn `applier.run(pipeline_events)` and call `watcher.start()`.
pub struct WatcherParts {
  pub watcher: ChampSelectWatcher,
  pub applier: CustomizationApplier,
  pub pipeline_events: tokio::sync::mpsc::UnboundedReceiver<champ_select::PipelineEvent>,
}

/// Wires the LCU client, item set store, state machine and applier for the
/// configured game directory.
pub fn build_watcher(
  config: &WatcherConfig,
  catalog: ChampionCatalog,
  downloads: Arc<dyn DownloadCoordinator>,
) -> Result<WatcherParts> {
  let league_path = config
    .league_path
    .as_deref()
    .filter(|p| !p.trim().is_empty())
    .ok_or_else(|| WatcherError::Config("league_path is not set".to_string()))?;

  let client = Arc::new(LcuClient::new(league_path, config.request_timeout())?);
  let item_sets = Arc::new(FileItemSetStore::new(
    league_path,
    config.item_set_prefix.clone(),
  ));

  let context = SessionContext {
    resolver: client.clone(),
    item_sets: item_sets.clone(),
    downloads,
    catalog: Arc::new(catalog),
  };
  let (machine, pipeline_events) = SelectionStateMachine::new(StrategyTable::standard(), context);
  let machine = machine.with_verbose(config.verbose_logging);
  let active_pipeline = machine.subscribe_active_pipeline();

  let watcher = ChampSelectWatcher::new(client.clone(), machine, config.poll_interval());
  let applier = CustomizationApplier::new(config, client, item_sets, active_pipeline)
    .with_status(watcher.status_sender());

  tracing::info!("[LCU Watcher] Watching League at {}", league_path);
  Ok(WatcherParts {
    watcher,
    applier,
    pipeline_events,
  })
}

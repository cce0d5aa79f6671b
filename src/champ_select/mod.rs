// Champ select watcher - polls the client session and drives per-mode strategies

pub mod apply;
pub mod catalog;
pub mod game_modes;
pub mod item_sets;
pub mod machine;
pub mod pipeline;
pub mod poller;
pub mod session;
pub mod strategy;
pub mod types;
pub mod watcher;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{Applied, CustomizationApplier, CustomizationTarget};
pub use catalog::ChampionCatalog;
pub use game_modes::{AramStrategy, ClassicStrategy};
pub use item_sets::{FileItemSetStore, ItemSetRef, ItemSetStore};
pub use machine::{GameModeResolver, SelectionStateMachine, SessionContext, TickReport};
pub use pipeline::{
  DownloadCoordinator, DownloadEvent, DownloadRequest, DownloadStream, PipelineEvent, PipelineSlot,
};
pub use poller::{SessionPoller, SessionSource, TickHandler};
pub use strategy::{GameModeStrategy, StrategyTable};
pub use types::{
  Champion, ChampionId, DomainEvent, FetchOutcome, GameMode, Phase, PickInfo, Position,
  SelectionState, SessionSnapshot, WatcherStatus,
};
pub use watcher::ChampSelectWatcher;

// Item sets generated for a champion, stored as JSON files the client reads from
// <league>/Config/Champions/<key>/Recommended/

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs as async_fs;

use crate::error::{Result, WatcherError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSetRef {
  pub champion_key: String,
  pub name: String,
}

#[async_trait]
pub trait ItemSetStore: Send + Sync {
  /// Item sets previously generated for the champion.
  async fn item_sets_for(&self, champion_key: &str) -> Result<Vec<ItemSetRef>>;

  async fn delete_item_sets(&self, sets: &[ItemSetRef]) -> Result<()>;

  async fn save_item_set(
    &self,
    champion_key: &str,
    name: &str,
    payload: &serde_json::Value,
  ) -> Result<ItemSetRef>;
}

pub struct FileItemSetStore {
  league_path: PathBuf,
  prefix: String,
}

impl FileItemSetStore {
  pub fn new(league_path: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
    Self {
      league_path: league_path.into(),
      prefix: prefix.into(),
    }
  }

  fn champion_dir(&self, champion_key: &str) -> PathBuf {
    self
      .league_path
      .join("Config")
      .join("Champions")
      .join(champion_key)
      .join("Recommended")
  }

  fn file_path(&self, set: &ItemSetRef) -> PathBuf {
    self
      .champion_dir(&set.champion_key)
      .join(format!("{}{}.json", self.prefix, set.name))
  }
}

/// Keeps file names portable: anything but ASCII alphanumerics, '-' and '_'
/// becomes '_'.
fn sanitize_name(name: &str) -> String {
  let cleaned: String = name
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
        c
      } else {
        '_'
      }
    })
    .collect();
  if cleaned.is_empty() {
    "itemset".to_string()
  } else {
    cleaned
  }
}

#[async_trait]
impl ItemSetStore for FileItemSetStore {
  async fn item_sets_for(&self, champion_key: &str) -> Result<Vec<ItemSetRef>> {
    let dir = self.champion_dir(champion_key);
    let mut entries = match async_fs::read_dir(&dir).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(e.into()),
    };

    let mut sets = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if path.extension().and_then(|e| e.to_str()) != Some("json") {
        continue;
      }
      let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        continue;
      };
      // Only our own files; sets written by the player or other tools stay.
      if let Some(name) = stem.strip_prefix(&self.prefix) {
        sets.push(ItemSetRef {
          champion_key: champion_key.to_string(),
          name: name.to_string(),
        });
      }
    }
    sets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sets)
  }

  async fn delete_item_sets(&self, sets: &[ItemSetRef]) -> Result<()> {
    for set in sets {
      let path = self.file_path(set);
      match async_fs::remove_file(&path).await {
        Ok(()) => tracing::debug!("[Item Sets] Deleted {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
          return Err(WatcherError::ItemSet(format!(
            "Failed to delete {}: {}",
            path.display(),
            e
          )))
        }
      }
    }
    Ok(())
  }

  async fn save_item_set(
    &self,
    champion_key: &str,
    name: &str,
    payload: &serde_json::Value,
  ) -> Result<ItemSetRef> {
    let set = ItemSetRef {
      champion_key: champion_key.to_string(),
      name: sanitize_name(name),
    };
    let dir = self.champion_dir(champion_key);
    async_fs::create_dir_all(&dir)
      .await
      .map_err(|e| WatcherError::ItemSet(format!("Failed to create {}: {}", dir.display(), e)))?;

    let path = self.file_path(&set);
    let data = serde_json::to_string_pretty(payload)?;
    async_fs::write(&path, data)
      .await
      .map_err(|e| WatcherError::ItemSet(format!("Failed to write {}: {}", path.display(), e)))?;
    tracing::info!("[Item Sets] Saved {}", path.display());
    Ok(set)
  }
}

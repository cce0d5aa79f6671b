// Champion id -> key/name lookup, loaded from Data Dragon's champion.json

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::types::{Champion, ChampionId};
use crate::error::{Result, WatcherError};

#[derive(Debug, Clone, Default)]
pub struct ChampionCatalog {
  champions: HashMap<ChampionId, Champion>,
}

#[derive(Deserialize)]
struct DataDragonFile {
  data: HashMap<String, DataDragonChampion>,
}

#[derive(Deserialize)]
struct DataDragonChampion {
  /// Data Dragon stores the numeric id as a string under "key" and the
  /// string key under "id".
  key: String,
  id: String,
  name: String,
}

impl ChampionCatalog {
  pub fn from_champions(champions: impl IntoIterator<Item = Champion>) -> Self {
    Self {
      champions: champions.into_iter().map(|c| (c.id, c)).collect(),
    }
  }

  pub fn from_data_dragon_json(json: &str) -> Result<Self> {
    let file: DataDragonFile = serde_json::from_str(json)?;
    let mut champions = HashMap::with_capacity(file.data.len());
    for (_, champ) in file.data {
      let id: ChampionId = champ.key.parse().map_err(|_| WatcherError::InvalidResponse {
        endpoint: "champion.json".to_string(),
        reason: format!("non-numeric champion key '{}'", champ.key),
      })?;
      champions.insert(
        id,
        Champion {
          id,
          key: champ.id,
          name: champ.name,
        },
      );
    }
    Ok(Self { champions })
  }

  pub fn load(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)?;
    Self::from_data_dragon_json(&content)
  }

  pub fn get(&self, id: ChampionId) -> Result<&Champion> {
    self
      .champions
      .get(&id)
      .ok_or(WatcherError::UnknownChampion(id))
  }

  pub fn len(&self) -> usize {
    self.champions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.champions.is_empty()
  }
}

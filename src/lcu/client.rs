// Authenticated HTTPS access to the local League client

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use super::lockfile::{read_lockfile, LcuCredentials};
use crate::champ_select::apply::CustomizationTarget;
use crate::champ_select::machine::GameModeResolver;
use crate::champ_select::poller::SessionSource;
use crate::champ_select::types::{position_label, Champion, FetchOutcome};
use crate::error::{Result, WatcherError};

pub const SESSION_ENDPOINT: &str = "/lol-champ-select/v1/session";
const GAMEFLOW_ENDPOINT: &str = "/lol-gameflow/v1/session";
const MY_SELECTION_ENDPOINT: &str = "/lol-champ-select/v1/session/my-selection";
const PERKS_PAGES_ENDPOINT: &str = "/lol-perks/v1/pages";
const CURRENT_PAGE_ENDPOINT: &str = "/lol-perks/v1/currentpage";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
  Success,
  NotFound,
  Failure,
}

pub fn classify_status(status: StatusCode) -> StatusClass {
  if status.is_success() {
    StatusClass::Success
  } else if status == StatusCode::NOT_FOUND {
    StatusClass::NotFound
  } else {
    StatusClass::Failure
  }
}

pub struct LcuClient {
  league_path: PathBuf,
  http: reqwest::Client,
  credentials: Mutex<Option<LcuCredentials>>,
}

impl LcuClient {
  pub fn new(league_path: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
    // The client serves a self-signed certificate on 127.0.0.1.
    let http = reqwest::Client::builder()
      .danger_accept_invalid_certs(true)
      .timeout(timeout)
      .connect_timeout(Duration::from_secs(2))
      .pool_max_idle_per_host(2)
      .build()?;
    Ok(Self {
      league_path: league_path.into(),
      http,
      credentials: Mutex::new(None),
    })
  }

  fn credentials(&self) -> Option<LcuCredentials> {
    let mut cached = self.credentials.lock().unwrap_or_else(|e| e.into_inner());
    if cached.is_none() {
      *cached = read_lockfile(&self.league_path);
      if let Some(creds) = cached.as_ref() {
        tracing::info!(
          "[LCU Watcher] Found lockfile {} (port {})",
          creds.lockfile.display(),
          creds.port
        );
      }
    }
    cached.clone()
  }

  /// Drops cached credentials so the next request re-reads the lockfile.
  fn forget_credentials(&self) {
    let mut cached = self.credentials.lock().unwrap_or_else(|e| e.into_inner());
    *cached = None;
  }

  async fn send(
    &self,
    method: Method,
    endpoint: &str,
    body: Option<&Value>,
  ) -> Result<reqwest::Response> {
    let creds = self
      .credentials()
      .ok_or_else(|| WatcherError::ClientNotRunning(self.league_path.display().to_string()))?;

    let url = format!("https://127.0.0.1:{}{}", creds.port, endpoint);
    let auth = general_purpose::STANDARD.encode(format!("riot:{}", creds.token));
    let mut request = self
      .http
      .request(method, &url)
      .header("Authorization", format!("Basic {}", auth));
    if let Some(body) = body {
      request = request.json(body);
    }

    match request.send().await {
      Ok(resp) => Ok(resp),
      Err(e) => {
        if e.is_connect() {
          // Client restarted (new port/token) or went away.
          self.forget_credentials();
        }
        Err(e.into())
      }
    }
  }

  /// GET returning `None` when the resource does not exist.
  pub async fn get_json(&self, endpoint: &str) -> Result<Option<Value>> {
    let resp = self.send(Method::GET, endpoint, None).await?;
    match classify_status(resp.status()) {
      StatusClass::NotFound => Ok(None),
      StatusClass::Failure => Err(WatcherError::Http {
        endpoint: endpoint.to_string(),
        status: resp.status(),
      }),
      StatusClass::Success => {
        resp
          .json::<Value>()
          .await
          .map(Some)
          .map_err(|e| WatcherError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
          })
      }
    }
  }

  async fn expect_success(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<()> {
    let resp = self.send(method, endpoint, body).await?;
    if resp.status().is_success() {
      Ok(())
    } else {
      Err(WatcherError::Http {
        endpoint: endpoint.to_string(),
        status: resp.status(),
      })
    }
  }
}

#[async_trait]
impl SessionSource for LcuClient {
  async fn fetch_session(&self) -> FetchOutcome {
    match self.get_json(SESSION_ENDPOINT).await {
      Ok(Some(json)) => FetchOutcome::Snapshot(json.into()),
      Ok(None) => FetchOutcome::NotFound,
      // No client, no session.
      Err(WatcherError::ClientNotRunning(_)) => FetchOutcome::NotFound,
      Err(e) => FetchOutcome::TransientError(e),
    }
  }
}

pub(crate) fn game_mode_from_gameflow(session: &Value) -> Option<String> {
  session
    .get("gameData")
    .and_then(|d| d.get("queue"))
    .and_then(|q| q.get("gameMode"))
    .and_then(|v| v.as_str())
    .filter(|s| !s.is_empty())
    .or_else(|| {
      session
        .get("map")
        .and_then(|m| m.get("gameMode"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
    })
    .map(str::to_string)
}

#[async_trait]
impl GameModeResolver for LcuClient {
  async fn game_mode(&self) -> Result<String> {
    let session = self
      .get_json(GAMEFLOW_ENDPOINT)
      .await?
      .ok_or_else(|| WatcherError::InvalidResponse {
        endpoint: GAMEFLOW_ENDPOINT.to_string(),
        reason: "no gameflow session".to_string(),
      })?;
    game_mode_from_gameflow(&session).ok_or_else(|| WatcherError::InvalidResponse {
      endpoint: GAMEFLOW_ENDPOINT.to_string(),
      reason: "gameflow session has no game mode".to_string(),
    })
  }
}

/// Accepts `[spell1, spell2]` or `{ "spell1Id": .., "spell2Id": .. }`.
pub(crate) fn spell_ids(payload: &Value) -> Result<(i64, i64)> {
  let pair = match payload {
    Value::Array(ids) if ids.len() >= 2 => ids[0].as_i64().zip(ids[1].as_i64()),
    Value::Object(_) => payload
      .get("spell1Id")
      .and_then(|v| v.as_i64())
      .zip(payload.get("spell2Id").and_then(|v| v.as_i64())),
    _ => None,
  };
  pair.ok_or_else(|| WatcherError::InvalidResponse {
    endpoint: "summonerspells".to_string(),
    reason: format!("unexpected summoner spells payload: {}", payload),
  })
}

/// Builds the page to POST from a provider rune payload (a page, or a list of
/// pages of which the first is used).
pub(crate) fn build_perk_page(champion: &Champion, position: &str, payload: &Value) -> Result<Value> {
  let page = match payload {
    Value::Array(pages) => pages.first(),
    other => Some(other),
  };
  let invalid = |reason: &str| WatcherError::InvalidResponse {
    endpoint: "perksPage".to_string(),
    reason: reason.to_string(),
  };
  let page = page.ok_or_else(|| invalid("empty rune page list"))?;

  let primary = page
    .get("primaryStyleId")
    .and_then(|v| v.as_i64())
    .ok_or_else(|| invalid("missing primaryStyleId"))?;
  let sub = page
    .get("subStyleId")
    .and_then(|v| v.as_i64())
    .ok_or_else(|| invalid("missing subStyleId"))?;
  let perks: Vec<i64> = page
    .get("selectedPerkIds")
    .and_then(|v| v.as_array())
    .ok_or_else(|| invalid("missing selectedPerkIds"))?
    .iter()
    .filter_map(|v| v.as_i64())
    .collect();

  let name = if position.is_empty() {
    champion.name.clone()
  } else {
    format!("{} {}", champion.name, position_label(position))
  };

  Ok(json!({
    "name": name,
    "primaryStyleId": primary,
    "subStyleId": sub,
    "selectedPerkIds": perks,
    "current": true
  }))
}

#[async_trait]
impl CustomizationTarget for LcuClient {
  async fn update_summoner_spells(&self, payload: &Value) -> Result<()> {
    let (spell1, spell2) = spell_ids(payload)?;
    self
      .expect_success(
        Method::PATCH,
        MY_SELECTION_ENDPOINT,
        Some(&json!({ "spell1Id": spell1, "spell2Id": spell2 })),
      )
      .await
  }

  async fn update_perks_page(
    &self,
    champion: &Champion,
    position: &str,
    payload: &Value,
  ) -> Result<()> {
    let page = build_perk_page(champion, position, payload)?;

    // Replace the current page when the client lets us delete it.
    if let Some(current) = self.get_json(CURRENT_PAGE_ENDPOINT).await? {
      let deletable = current
        .get("isDeletable")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
      if let (true, Some(id)) = (deletable, current.get("id").and_then(|v| v.as_i64())) {
        self
          .expect_success(
            Method::DELETE,
            &format!("{}/{}", PERKS_PAGES_ENDPOINT, id),
            None,
          )
          .await?;
      }
    }

    self
      .expect_success(Method::POST, PERKS_PAGES_ENDPOINT, Some(&page))
      .await
  }
}

// League client lockfile: "<name>:<pid>:<port>:<password>:<protocol>"

use std::fs;
use std::path::{Path, PathBuf};

const LOCKFILE_NAMES: [&str; 3] = ["lockfile", "LeagueClientUx.lockfile", "LeagueClient.lockfile"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcuCredentials {
  pub port: u16,
  pub token: String,
  pub lockfile: PathBuf,
}

pub fn parse_lockfile(content: &str) -> Option<(u16, String)> {
  let parts: Vec<&str> = content.trim().split(':').collect();
  if parts.len() < 5 {
    return None;
  }
  let port = parts[2].parse().ok()?;
  let token = parts[3].to_string();
  if token.is_empty() {
    return None;
  }
  Some((port, token))
}

/// First readable lockfile in the game directory.
pub fn read_lockfile(league_path: &Path) -> Option<LcuCredentials> {
  for name in LOCKFILE_NAMES {
    let path = league_path.join(name);
    if let Ok(content) = fs::read_to_string(&path) {
      if let Some((port, token)) = parse_lockfile(&content) {
        return Some(LcuCredentials {
          port,
          token,
          lockfile: path,
        });
      }
    }
  }
  None
}

// Session JSON helpers used by the game mode strategies

use serde_json::Value;

use super::types::{ChampionId, Position, SessionSnapshot};

/// The local player's entry in `myTeam`, matched on `localPlayerCellId`.
pub fn local_player(snapshot: &SessionSnapshot) -> Option<&Value> {
  let json = snapshot.json();
  let local_cell_id = json.get("localPlayerCellId").and_then(|v| v.as_i64())?;
  json
    .get("myTeam")
    .and_then(|v| v.as_array())?
    .iter()
    .find(|player| player.get("cellId").and_then(|v| v.as_i64()) == Some(local_cell_id))
}

/// Champion currently held by the local player; 0 while nothing is selected.
pub fn local_champion_id(player: &Value) -> ChampionId {
  player
    .get("championId")
    .and_then(|v| v.as_i64())
    .filter(|id| *id > 0)
    .unwrap_or(0)
}

pub fn assigned_position(player: &Value) -> Option<Position> {
  player
    .get("assignedPosition")
    .and_then(|v| v.as_str())
    .and_then(Position::from_assigned)
}

/// True while the local player still has a pick action in progress.
pub fn has_pick_in_progress(snapshot: &SessionSnapshot) -> bool {
  let json = snapshot.json();
  let Some(local_cell_id) = json.get("localPlayerCellId").and_then(|v| v.as_i64()) else {
    return false;
  };
  let Some(groups) = json.get("actions").and_then(|v| v.as_array()) else {
    return false;
  };

  groups
    .iter()
    .filter_map(|group| group.as_array())
    .flatten()
    .any(|action| {
      action.get("actorCellId").and_then(|v| v.as_i64()) == Some(local_cell_id)
        && action.get("type").and_then(|v| v.as_str()) == Some("pick")
        && action
          .get("isInProgress")
          .and_then(|v| v.as_bool())
          .unwrap_or(false)
    })
}

/// Short one-line description of a snapshot for debug logs.
pub fn summarize(snapshot: &SessionSnapshot) -> String {
  let json = snapshot.json();
  let mut summary = Vec::new();

  if let Some(phase) = json
    .get("timer")
    .and_then(|t| t.get("phase"))
    .and_then(|v| v.as_str())
  {
    summary.push(format!("timer phase: {}", phase));
  }
  if let Some(cell) = json.get("localPlayerCellId").and_then(|v| v.as_i64()) {
    summary.push(format!("local cell: {}", cell));
  }
  if let Some(actions) = json.get("actions").and_then(|v| v.as_array()) {
    summary.push(format!("actions: [{} groups]", actions.len()));
  }

  if summary.is_empty() {
    "[session summary unavailable]".to_string()
  } else {
    summary.join(", ")
  }
}

// Tests for pick detection and champion change side effects

use super::test_helpers::*;

#[cfg(test)]
mod champion_change_tests {
    use super::*;

    /// Test: Same champion on every tick
    ///
    /// Scenario: Lee Sin stays selected for five ticks.
    /// Expected: ChampionChosen(64) once and a single pipeline.
    #[tokio::test]
    async fn test_constant_champion_fires_once() {
        let mut h = Harness::new("CLASSIC");

        let events = h
            .run(vec![snap(64), snap(64), snap(64), snap(64), snap(64)])
            .await;

        let chosen: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, DomainEvent::ChampionChosen(_)))
            .collect();
        assert_eq!(chosen, vec![&DomainEvent::ChampionChosen(64)]);
        assert_eq!(h.downloads.requests().len(), 1);
        assert_eq!(count_of(&h.log, "change:64"), 1);
    }

    /// Test: Champion 0 never counts as a pick
    ///
    /// Scenario: Only empty snapshots.
    /// Expected: No ChampionChosen, no pipeline, status asks for a pick.
    #[tokio::test]
    async fn test_zero_is_not_a_pick() {
        let mut h = Harness::new("CLASSIC");

        let report = h.tick(snap(0)).await;
        let events = h.run(vec![snap(0), snap(0)]).await;

        assert!(!report
            .events
            .iter()
            .any(|e| matches!(e, DomainEvent::ChampionChosen(_))));
        assert!(events.is_empty());
        assert_eq!(report.status, Some(WatcherStatus::PickChampion));
        assert!(h.downloads.requests().is_empty());
    }

    /// Test: Deselecting a champion
    ///
    /// Scenario: 64, then 0, then 0 again.
    /// Expected: One ChampionCleared, the pipeline is canceled.
    #[tokio::test]
    async fn test_clear_fires_once() {
        let mut h = Harness::new("CLASSIC");
        h.run(vec![snap(0), snap(64)]).await;

        let cleared = h.tick(snap(0)).await;
        let again = h.tick(snap(0)).await;

        assert_eq!(cleared.events, vec![DomainEvent::ChampionCleared]);
        assert_eq!(cleared.status, Some(WatcherStatus::PickChampion));
        assert!(again.events.is_empty());
        assert!(h.machine.active_pipeline().is_none());
        assert_eq!(h.state().last_champion_id, Some(0));
    }

    /// Test: Picking the same champion again after clearing
    ///
    /// Scenario: 64, 0, 64.
    /// Expected: ChampionChosen(64) twice, with a fresh pipeline each time.
    #[tokio::test]
    async fn test_repick_after_clear() {
        let mut h = Harness::new("CLASSIC");

        let events = h.run(vec![snap(64), snap(0), snap(64)]).await;

        assert_eq!(
            events,
            vec![
                entered(GameMode::Classic),
                DomainEvent::ChampionChosen(64),
                DomainEvent::ChampionCleared,
                DomainEvent::ChampionChosen(64),
            ]
        );
        assert_eq!(h.downloads.requests().len(), 2);
    }

    /// Test: Rejoining with a champion already locked in
    ///
    /// Scenario: The very first snapshot already has Ahri selected.
    /// Expected: PhaseEntered then ChampionChosen(103) on the same tick.
    #[tokio::test]
    async fn test_first_tick_with_pick() {
        let mut h = Harness::new("CLASSIC");

        let report = h.tick(snap(103)).await;

        assert_eq!(
            report.events,
            vec![entered(GameMode::Classic), DomainEvent::ChampionChosen(103)]
        );
        assert_eq!(
            report.status,
            Some(WatcherStatus::UpdatingDisplay("Ahri".to_string()))
        );
    }

    /// Test: Stale sets of the incoming champion
    ///
    /// Scenario: Ahri has leftover generated sets from a previous session.
    /// Expected: They are removed before Ahri's pipeline starts.
    #[tokio::test]
    async fn test_incoming_champion_stale_sets_removed() {
        let mut h = Harness::new("CLASSIC");
        h.item_sets.seed("Ahri", "ugg_middle");

        h.run(vec![snap(0), snap(103)]).await;

        let deleted = position_of(&h.log, "delete:Ahri/ugg_middle").expect("stale set deleted");
        let started = position_of(&h.log, "download:103").expect("pipeline started");
        assert!(deleted < started);
    }

    /// Test: Hovering during the pick turn
    ///
    /// Scenario: Built-in CLASSIC strategy; the local pick is in progress while hovering Ahri.
    /// Expected: No ChampionChosen until the pick is locked in.
    #[tokio::test]
    async fn test_hover_is_not_a_pick() {
        let mut h = Harness::standard("CLASSIC");
        let mut hovering = session(103);
        hovering.0["actions"][0][0]["isInProgress"] = serde_json::json!(true);

        let hover_events = h.run(vec![FetchOutcome::Snapshot(hovering)]).await;
        let locked_events = h.run(vec![snap(103)]).await;

        assert_eq!(hover_events, vec![entered(GameMode::Classic)]);
        assert_eq!(locked_events, vec![DomainEvent::ChampionChosen(103)]);
    }

    /// Test: Unknown champion id
    ///
    /// Scenario: The session reports an id the catalog does not know.
    /// Expected: The tick fails without committing the pick; a later known pick works.
    #[tokio::test]
    async fn test_unknown_champion_not_committed() {
        let mut h = Harness::new("CLASSIC");
        h.tick(snap(0)).await;

        let report = h.tick(snap(9999)).await;

        assert!(matches!(report.error, Some(WatcherError::UnknownChampion(9999))));
        assert!(report.events.is_empty());
        assert_eq!(h.state().last_champion_id, Some(0));

        let next = h.tick(snap(64)).await;
        assert_eq!(next.events, vec![DomainEvent::ChampionChosen(64)]);
    }
}

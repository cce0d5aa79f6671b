// Tests for applying pipeline output to the client

use super::test_helpers::*;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

/// Client stand-in that records what would have been sent.
#[derive(Default)]
struct FakeTarget {
    calls: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl FakeTarget {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(WatcherError::ClientNotRunning("test".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CustomizationTarget for FakeTarget {
    async fn update_summoner_spells(&self, payload: &serde_json::Value) -> Result<()> {
        self.check()?;
        self.calls.lock().unwrap().push(format!("spells:{}", payload));
        Ok(())
    }

    async fn update_perks_page(
        &self,
        champion: &Champion,
        position: &str,
        _payload: &serde_json::Value,
    ) -> Result<()> {
        self.check()?;
        self.calls
            .lock()
            .unwrap()
            .push(format!("perks:{}:{}", champion.key, position));
        Ok(())
    }
}

struct Fixture {
    applier: CustomizationApplier,
    target: Arc<FakeTarget>,
    item_sets: Arc<MemoryItemSets>,
    status: watch::Receiver<WatcherStatus>,
    // Stands in for the state machine's pipeline slot.
    active_tx: Option<watch::Sender<Option<Uuid>>>,
}

impl Fixture {
    /// Marks `id` as the active pipeline.
    fn activate(&self, id: Option<Uuid>) {
        if let Some(tx) = &self.active_tx {
            tx.send_replace(id);
        }
    }

    /// A fresh pipeline id, made active.
    fn start_pipeline(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.activate(Some(id));
        id
    }
}

fn fixture(config: WatcherConfig) -> Fixture {
    let (active_tx, active) = watch::channel(None);
    let mut f = fixture_following(config, active);
    f.active_tx = Some(active_tx);
    f
}

/// Applier that follows a real state machine's active pipeline.
fn fixture_following(config: WatcherConfig, active: watch::Receiver<Option<Uuid>>) -> Fixture {
    let target = Arc::new(FakeTarget::default());
    let item_sets = Arc::new(MemoryItemSets::new(new_log()));
    let (status_tx, status) = watch::channel(WatcherStatus::default());
    let applier = CustomizationApplier::new(&config, target.clone(), item_sets.clone(), active)
        .with_status(Arc::new(status_tx));
    Fixture {
        applier,
        target,
        item_sets,
        status,
        active_tx: None,
    }
}

fn tagged(pipeline_id: Uuid, event: DownloadEvent) -> PipelineEvent {
    PipelineEvent {
        pipeline_id,
        champion: lee_sin(),
        event,
    }
}

#[cfg(test)]
mod customization_tests {
    use super::*;

    /// Test: Summoner spells
    ///
    /// Scenario: A summonerspells event with the setting on, then off.
    /// Expected: Applied when enabled, skipped when disabled.
    #[tokio::test]
    async fn test_summoner_spells_follow_setting() {
        let mut f = fixture(WatcherConfig::default());
        let id = f.start_pipeline();
        let applied = f.applier.handle(tagged(id, spells())).await.unwrap();
        assert_eq!(applied, Applied::SummonerSpells);
        assert_eq!(f.target.calls(), vec!["spells:[11,4]"]);

        let mut off = fixture(WatcherConfig {
            enable_summoner_spells: false,
            ..WatcherConfig::default()
        });
        let id = off.start_pipeline();
        let skipped = off.applier.handle(tagged(id, spells())).await.unwrap();
        assert_eq!(skipped, Applied::Skipped);
        assert!(off.target.calls().is_empty());
    }

    /// Test: First rune page loads automatically
    ///
    /// Scenario: Pages for jungle, top, and jungle again arrive from one pipeline.
    /// Expected: Jungle is loaded, top is offered, the duplicate is skipped.
    #[tokio::test]
    async fn test_first_rune_page_autoloads() {
        let mut f = fixture(WatcherConfig::default());
        let id = f.start_pipeline();

        let first = f.applier.handle(tagged(id, perks_page("jungle"))).await.unwrap();
        let second = f.applier.handle(tagged(id, perks_page("top"))).await.unwrap();
        let duplicate = f.applier.handle(tagged(id, perks_page("jungle"))).await.unwrap();

        assert_eq!(first, Applied::RunesLoaded("jungle".to_string()));
        assert_eq!(second, Applied::PositionOffered("top".to_string()));
        assert_eq!(duplicate, Applied::Skipped);
        assert_eq!(f.applier.positions(), vec!["jungle", "top"]);
        assert_eq!(f.target.calls(), vec!["perks:LeeSin:jungle"]);
        assert_eq!(
            *f.status.borrow(),
            WatcherStatus::RunesLoaded {
                champion: "Lee Sin".to_string(),
                position: "Jungle".to_string(),
            }
        );
    }

    /// Test: Manual rune selection
    ///
    /// Scenario: Automatic loading is off; the player picks the top page.
    /// Expected: Nothing loads until select_position, which loads the top page.
    #[tokio::test]
    async fn test_manual_position_selection() {
        let mut f = fixture(WatcherConfig {
            load_runes_automatically: false,
            ..WatcherConfig::default()
        });
        let id = f.start_pipeline();

        let offered = f.applier.handle(tagged(id, perks_page("jungle"))).await.unwrap();
        f.applier.handle(tagged(id, perks_page("top"))).await.unwrap();
        assert_eq!(offered, Applied::PositionOffered("jungle".to_string()));
        assert!(f.target.calls().is_empty());

        f.applier.select_position("top").await.unwrap();
        assert_eq!(f.target.calls(), vec!["perks:LeeSin:top"]);

        assert!(f.applier.select_position("utility").await.is_err());
    }

    /// Test: Selecting a position before any pick
    ///
    /// Scenario: select_position with no pipeline output yet.
    /// Expected: An error, and nothing is sent to the client.
    #[tokio::test]
    async fn test_select_position_without_champion() {
        let mut f = fixture(WatcherConfig::default());

        assert!(f.applier.select_position("jungle").await.is_err());
        assert!(f.target.calls().is_empty());
    }

    /// Test: Item sets
    ///
    /// Scenario: An itemset event with the setting on, then off.
    /// Expected: Saved under the champion key as provider_position; skipped when off.
    #[tokio::test]
    async fn test_item_sets_follow_setting() {
        let mut f = fixture(WatcherConfig::default());
        let id = f.start_pipeline();
        let applied = f
            .applier
            .handle(tagged(id, item_set("jungle")))
            .await
            .unwrap();
        let expected = ItemSetRef {
            champion_key: "LeeSin".to_string(),
            name: "ugg_jungle".to_string(),
        };
        assert_eq!(applied, Applied::ItemSetSaved(expected.clone()));
        assert_eq!(f.item_sets.stored(), vec![expected]);

        let mut off = fixture(WatcherConfig {
            enable_item_sets: false,
            ..WatcherConfig::default()
        });
        let id = off.start_pipeline();
        let skipped = off
            .applier
            .handle(tagged(id, item_set("jungle")))
            .await
            .unwrap();
        assert_eq!(skipped, Applied::Skipped);
        assert!(off.item_sets.stored().is_empty());
    }

    /// Test: Late events from a superseded pipeline
    ///
    /// Scenario: Pipeline A delivers a page, pipeline B becomes active, then A delivers again.
    /// Expected: B resets the offered positions; A's late event is ignored.
    #[tokio::test]
    async fn test_retired_pipeline_ignored() {
        let mut f = fixture(WatcherConfig::default());
        let a = f.start_pipeline();
        f.applier.handle(tagged(a, perks_page("jungle"))).await.unwrap();

        let b = f.start_pipeline();
        let fresh = f.applier.handle(tagged(b, perks_page("top"))).await.unwrap();
        let late = f.applier.handle(tagged(a, perks_page("middle"))).await.unwrap();

        assert_eq!(fresh, Applied::RunesLoaded("top".to_string()));
        assert_eq!(late, Applied::Skipped);
        assert_eq!(f.applier.positions(), vec!["top"]);
        assert_eq!(
            f.target.calls(),
            vec!["perks:LeeSin:jungle", "perks:LeeSin:top"]
        );
    }

    /// Test: Queued output of a replaced pipeline after a champion switch
    ///
    /// Scenario: Lee Sin's pipeline has an item set queued when the player switches to Ahri;
    /// the queued event is only drained after the switch.
    /// Expected: Lee Sin's set is not written; only Ahri's set ends up stored.
    #[tokio::test]
    async fn test_switch_drops_queued_output() {
        let mut h = Harness::with_downloads("CLASSIC", vec![item_set("jungle")], true);
        let mut f = fixture_following(
            WatcherConfig::default(),
            h.machine.subscribe_active_pipeline(),
        );

        h.tick(snap(64)).await;
        let queued = h.pipeline_rx.recv().await.expect("Lee Sin item set");
        assert_eq!(queued.champion, lee_sin());

        h.tick(snap(103)).await;
        let stale = f.applier.handle(queued).await.unwrap();
        let current = h.pipeline_rx.recv().await.expect("Ahri item set");
        let applied = f.applier.handle(current).await.unwrap();

        assert_eq!(stale, Applied::Skipped);
        assert!(matches!(applied, Applied::ItemSetSaved(_)));
        assert_eq!(
            f.item_sets.stored(),
            vec![ItemSetRef {
                champion_key: "Ahri".to_string(),
                name: "ugg_jungle".to_string(),
            }]
        );
    }

    /// Test: Queued output after leaving champ select
    ///
    /// Scenario: Lee Sin's runes are applied, spells are still queued, then the session ends.
    /// Expected: The queued spells never reach the client, the offered positions are
    /// gone and select_position fails.
    #[tokio::test]
    async fn test_exit_drops_queued_output() {
        let mut h = Harness::with_downloads(
            "CLASSIC",
            vec![perks_page("jungle"), spells()],
            true,
        );
        let mut f = fixture_following(
            WatcherConfig::default(),
            h.machine.subscribe_active_pipeline(),
        );

        h.tick(snap(64)).await;
        let runes = h.pipeline_rx.recv().await.expect("perks page");
        let queued = h.pipeline_rx.recv().await.expect("summoner spells");
        let loaded = f.applier.handle(runes).await.unwrap();
        assert_eq!(loaded, Applied::RunesLoaded("jungle".to_string()));

        let exit = h.tick(FetchOutcome::NotFound).await;
        assert_eq!(exit.events, vec![DomainEvent::PhaseExited]);

        assert_eq!(f.applier.handle(queued).await.unwrap(), Applied::Skipped);
        assert!(f.applier.positions().is_empty());
        assert!(f.applier.select_position("jungle").await.is_err());
        assert_eq!(f.target.calls(), vec!["perks:LeeSin:jungle"]);
    }

    /// Test: Queued output after deselecting
    ///
    /// Scenario: Lee Sin's spells are queued when the player clears the pick.
    /// Expected: The spells are dropped.
    #[tokio::test]
    async fn test_clear_drops_queued_output() {
        let mut h = Harness::with_downloads("CLASSIC", vec![spells()], true);
        let mut f = fixture_following(
            WatcherConfig::default(),
            h.machine.subscribe_active_pipeline(),
        );

        h.run(vec![snap(0), snap(64)]).await;
        let queued = h.pipeline_rx.recv().await.expect("summoner spells");

        let cleared = h.tick(snap(0)).await;
        assert_eq!(cleared.events, vec![DomainEvent::ChampionCleared]);

        assert_eq!(f.applier.handle(queued).await.unwrap(), Applied::Skipped);
        assert!(f.target.calls().is_empty());
    }

    /// Test: Failures surface on the status indicator
    ///
    /// Scenario: The client rejects the spells update inside run().
    /// Expected: run() keeps going and the status shows the error.
    #[tokio::test]
    async fn test_run_reports_failures() {
        let f = fixture(WatcherConfig::default());
        f.target.fail.store(true, Ordering::SeqCst);
        let id = f.start_pipeline();
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(tagged(id, spells())).unwrap();
        drop(tx);

        f.applier.run(rx).await;

        assert!(matches!(*f.status.borrow(), WatcherStatus::Error(_)));
    }

    /// Test: From pick to client
    ///
    /// Scenario: Picking Lee Sin starts a pipeline that yields spells, runes and an item set.
    /// Expected: All three are applied for Lee Sin.
    #[tokio::test]
    async fn test_pipeline_output_applied() {
        let mut h = Harness::with_downloads(
            "CLASSIC",
            vec![spells(), perks_page("jungle"), item_set("jungle")],
            false,
        );
        let mut f = fixture_following(
            WatcherConfig::default(),
            h.machine.subscribe_active_pipeline(),
        );

        h.tick(snap(64)).await;

        let mut applied = Vec::new();
        for _ in 0..3 {
            let event = h.pipeline_rx.recv().await.expect("pipeline event");
            assert_eq!(event.champion, lee_sin());
            applied.push(f.applier.handle(event).await.unwrap());
        }

        assert_eq!(applied[0], Applied::SummonerSpells);
        assert_eq!(applied[1], Applied::RunesLoaded("jungle".to_string()));
        assert!(matches!(applied[2], Applied::ItemSetSaved(_)));
    }
}

//! Sessions sharing rooms through an in-process document store.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strictly_rooms::{
    DocumentPatch, DocumentStore, GameMode, InMemoryStore, PlayerNames, RoomDocument, Seat,
    Session, SessionError, StoreError,
};
use strictly_ultimate::{
    Cell, Coord, Expiry, GameState, InvariantSet, Mark, Move, TurnDuration, UltimateInvariants,
    apply_move, encode,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap()
}

fn mv(board: (u8, u8), cell: (u8, u8)) -> Move {
    Move::new(
        Coord::new(board.0, board.1).unwrap(),
        Coord::new(cell.0, cell.1).unwrap(),
    )
}

async fn join(store: &Arc<dyn DocumentStore>, name: &str) -> Session {
    Session::online(store.clone(), "room", name, TurnDuration::default(), t0())
        .await
        .unwrap()
        .with_seed(3)
}

/// A store that can be switched off, or made read-only.
#[derive(Default)]
struct FlakyStore {
    inner: InMemoryStore,
    down: AtomicBool,
    read_only: AtomicBool,
}

impl FlakyStore {
    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_write(&self) -> Result<(), StoreError> {
        self.check()?;
        if self.read_only.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("write path down".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<RoomDocument>, StoreError> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, doc: RoomDocument) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.set(key, doc).await
    }

    async fn update(&self, key: &str, patch: DocumentPatch) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.update(key, patch).await
    }
}

#[tokio::test]
async fn test_turn_passes_between_clients() {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let mut ann = join(&store, "Ann").await;
    let mut bo = join(&store, "Bo").await;

    assert_eq!(ann.snapshot(t0()).seat, Some(Seat::X));
    assert_eq!(bo.snapshot(t0()).seat, Some(Seat::O));
    assert!(!ann.is_locked());
    assert!(bo.is_locked());
    assert!(matches!(
        bo.play(mv((1, 1), (1, 1)), t0()).await,
        Err(SessionError::Locked)
    ));

    ann.play(mv((1, 1), (1, 1)), t0()).await.unwrap();
    assert!(ann.is_locked());

    let report = bo.tick(t0()).await;
    assert_eq!(report.expiry, None);
    assert!(!report.pushed);
    assert_eq!(bo.state(), ann.state());
    assert!(!bo.is_locked());

    bo.play(mv((1, 1), (0, 0)), t0()).await.unwrap();
    ann.tick(t0()).await;
    assert_eq!(ann.state().current_turn(), Mark::X);
    assert_eq!(ann.state().forced_target(), Some(Coord::TOP_LEFT));
    assert_eq!(
        ann.snapshot(t0()).names,
        PlayerNames::new("Ann".into(), "Bo".into())
    );
}

#[tokio::test]
async fn test_only_side_to_move_runs_the_clock() {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let mut ann = join(&store, "Ann").await;
    let mut bo = join(&store, "Bo").await;
    ann.play(mv((1, 1), (1, 1)), t0()).await.unwrap();

    let late = t0() + TimeDelta::seconds(31);
    let report = ann.tick(late).await;
    assert_eq!(report.expiry, None);
    assert_eq!(ann.state().current_turn(), Mark::O);

    let report = bo.tick(late).await;
    assert!(matches!(report.expiry, Some(Expiry::Forced { .. })));
    assert!(report.pushed);

    ann.tick(late).await;
    assert_eq!(ann.state(), bo.state());
    assert_eq!(ann.state().current_turn(), Mark::X);
    assert_eq!(ann.state().last_move_at(), late);
}

#[tokio::test]
async fn test_spectator_watches_without_writing() {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let mut ann = join(&store, "Ann").await;
    let _bo = join(&store, "Bo").await;
    let mut cy = join(&store, "Cy").await;

    let snap = cy.snapshot(t0());
    assert_eq!(snap.seat, Some(Seat::Spectator));
    assert!(snap.locked);
    assert!(matches!(
        cy.play(mv((0, 0), (0, 0)), t0()).await,
        Err(SessionError::Locked)
    ));

    let report = cy.tick(t0() + TimeDelta::seconds(45)).await;
    assert_eq!(report.expiry, None);
    assert!(!report.pushed);

    ann.play(mv((0, 0), (0, 0)), t0()).await.unwrap();
    cy.tick(t0()).await;
    assert_eq!(cy.state(), ann.state());
}

#[tokio::test]
async fn test_refresh_replaces_local_state_wholesale() {
    let memory = InMemoryStore::new();
    let store: Arc<dyn DocumentStore> = Arc::new(memory.clone());
    let mut ann = join(&store, "Ann").await;

    // Another writer replaces the game outright; the room copy wins.
    let mut other = GameState::new(TurnDuration::default(), t0());
    apply_move(&mut other, mv((2, 2), (2, 2))).unwrap();
    memory
        .update("room", DocumentPatch::data(encode(&other).unwrap()))
        .await
        .unwrap();

    assert!(ann.refresh().await);
    assert_eq!(ann.state(), &other);
    assert!(ann.is_locked());
}

#[tokio::test]
async fn test_unreachable_store_degrades_to_local_play() {
    let flaky = Arc::new(FlakyStore::default());
    let store: Arc<dyn DocumentStore> = flaky.clone();
    let mut ann = join(&store, "Ann").await;
    let mut bo = join(&store, "Bo").await;

    flaky.down.store(true, Ordering::SeqCst);
    ann.play(mv((1, 1), (1, 1)), t0()).await.unwrap();
    assert!(ann.notice().is_some_and(|n| n.starts_with("Offline")));
    assert_eq!(ann.state().current_turn(), Mark::O);
    assert!(matches!(
        ann.play(mv((1, 1), (0, 0)), t0()).await,
        Err(SessionError::Locked)
    ));

    assert!(!bo.refresh().await);
    assert_eq!(bo.state().current_turn(), Mark::X);
    assert!(bo.snapshot(t0()).notice.is_some());

    flaky.down.store(false, Ordering::SeqCst);
    let report = ann.tick(t0()).await;
    assert!(report.pushed);
    assert_eq!(ann.notice(), None);

    bo.tick(t0()).await;
    assert_eq!(bo.state(), ann.state());
    assert_eq!(bo.notice(), None);
}

#[tokio::test]
async fn test_failed_push_survives_a_readable_room() {
    let flaky = Arc::new(FlakyStore::default());
    let store: Arc<dyn DocumentStore> = flaky.clone();
    let mut ann = join(&store, "Ann").await;
    let mut bo = join(&store, "Bo").await;

    flaky.read_only.store(true, Ordering::SeqCst);
    ann.play(mv((1, 1), (1, 1)), t0()).await.unwrap();
    let played = ann.state().clone();

    let report = ann.tick(t0()).await;
    assert!(!report.pushed);
    assert_eq!(ann.state(), &played);
    assert!(ann.notice().is_some_and(|n| n.contains("write path down")));

    flaky.read_only.store(false, Ordering::SeqCst);
    let report = ann.tick(t0()).await;
    assert!(report.pushed);
    assert_eq!(ann.notice(), None);

    bo.tick(t0()).await;
    assert_eq!(bo.state(), &played);
}

#[tokio::test]
async fn test_unsent_move_dropped_when_room_moves_on() {
    let flaky = Arc::new(FlakyStore::default());
    let store: Arc<dyn DocumentStore> = flaky.clone();
    let mut ann = join(&store, "Ann").await;

    flaky.read_only.store(true, Ordering::SeqCst);
    ann.play(mv((1, 1), (1, 1)), t0()).await.unwrap();

    let mut other = GameState::new(TurnDuration::default(), t0());
    apply_move(&mut other, mv((2, 2), (2, 2))).unwrap();
    flaky
        .inner
        .update("room", DocumentPatch::data(encode(&other).unwrap()))
        .await
        .unwrap();

    assert!(ann.refresh().await);
    assert_eq!(ann.state(), &other);
    assert!(ann.notice().is_some_and(|n| n.contains("move dropped")));
}

#[tokio::test]
async fn test_broken_room_state_is_still_playable() {
    let memory = InMemoryStore::new();
    let store: Arc<dyn DocumentStore> = Arc::new(memory.clone());
    let mut ann = join(&store, "Ann").await;

    // Bottom-right meta cell claims a win its small board never had.
    let fresh = GameState::new(TurnDuration::default(), t0());
    let mut doc: serde_json::Value = serde_json::from_str(&encode(&fresh).unwrap()).unwrap();
    doc["meta_board"]["cells"][8] = serde_json::json!({ "Marked": "O" });
    memory
        .update("room", DocumentPatch::data(doc.to_string()))
        .await
        .unwrap();

    assert!(ann.refresh().await);
    assert!(UltimateInvariants::check_all(ann.state()).is_err());

    ann.play(mv((1, 1), (1, 1)), t0()).await.unwrap();
    assert_eq!(
        ann.state().board(Coord::CENTER).get(Coord::CENTER),
        Cell::Marked(Mark::X)
    );
    assert_eq!(ann.state().current_turn(), Mark::O);
}

#[tokio::test]
async fn test_new_game_leaves_the_room() {
    let memory = InMemoryStore::new();
    let store: Arc<dyn DocumentStore> = Arc::new(memory.clone());
    let mut ann = join(&store, "Ann").await;
    ann.play(mv((1, 1), (1, 1)), t0()).await.unwrap();

    ann.reset(t0());
    assert!(matches!(ann.mode(), GameMode::Local));
    let snap = ann.snapshot(t0());
    assert_eq!(snap.room, None);
    assert_eq!(snap.current_turn, Mark::X);
    assert_eq!(snap.notice.as_deref(), Some("Left room 'room'"));

    // Nothing is cleaned up remotely.
    assert!(memory.get("room").await.unwrap().is_some());
}

#[tokio::test]
async fn test_clock_plays_out_a_game_against_the_computer() {
    let names = PlayerNames::new("Ann".into(), "Computer".into());
    let mut session =
        Session::versus_ai(names, Mark::O, TurnDuration::default(), t0()).with_seed(42);

    let mut now = t0();
    for _ in 0..81 {
        if session.state().is_game_over() || session.state().is_stalemate() {
            break;
        }
        now += TimeDelta::seconds(30);
        let report = session.tick(now).await;
        assert!(report.expiry.is_some());
        assert!(UltimateInvariants::check_all(session.state()).is_ok());
    }

    let state = session.state();
    assert!(state.is_game_over() || state.is_stalemate());
    let snap = session.snapshot(now);
    assert_eq!(snap.stalemate, state.is_stalemate());
    let outcome = snap.outcome_line().unwrap();
    assert!(
        outcome == "You won!"
            || outcome == "The computer won!"
            || outcome == "No moves left: stalemate!"
    );
}

//! Engine loop tests on paused tokio time

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use phrase_master::core::GameSnapshot;
use phrase_master::engine::{Engine, EngineCommand, EngineHandle, EngineUpdate};
use phrase_master::services::{
    ExtractionError, GenerationError, GenerationRequest, MemoryStore, PuzzleGenerator,
    TextExtractor,
};
use phrase_master::types::{
    Difficulty, GameStatus, PuzzleAction, PuzzleData, ScoreEntry, SessionError, SessionEvent,
    MAX_TIME_SECS,
};

const SEGMENTS: [&str; 3] = ["Le noyau ", "contient ", "l'ADN."];

struct StubExtractor;

impl TextExtractor for StubExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        if path.to_string_lossy().contains("empty") {
            return Err(ExtractionError::TooShort { chars: 0, min: 50 });
        }
        Ok("Le noyau contient l'ADN. ".repeat(4))
    }
}

#[derive(Clone, Default)]
struct StubGenerator {
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl PuzzleGenerator for StubGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<PuzzleData, GenerationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        assert!(!request.text.is_empty());
        Ok(PuzzleData {
            concept: format!("Noyau {call}"),
            definition: SEGMENTS.concat(),
            segments: SEGMENTS.iter().map(|s| s.to_string()).collect(),
        })
    }
}

async fn spawn_engine(generator: StubGenerator, store: MemoryStore) -> EngineHandle {
    let (engine, updates) = Engine::new(42, StubExtractor, generator, store).await;
    engine.spawn(updates, 8)
}

async fn wait_for(
    handle: &EngineHandle,
    mut pred: impl FnMut(&GameSnapshot) -> bool,
) -> Arc<GameSnapshot> {
    let mut rx = handle.subscribe();
    let snap = tokio::time::timeout(Duration::from_secs(600), rx.wait_for(|s| pred(s)))
        .await
        .expect("timed out waiting for snapshot")
        .expect("engine stopped");
    Arc::clone(&snap)
}

/// Send a command and collect updates up to its acknowledgement.
async fn send(handle: &mut EngineHandle, cmd: EngineCommand) -> (EngineUpdate, Vec<SessionEvent>) {
    handle.send(cmd).await.unwrap();
    let mut events = Vec::new();
    loop {
        match handle.recv().await.expect("engine stopped") {
            EngineUpdate::Event(e) => events.push(e),
            ack => return (ack, events),
        }
    }
}

async fn upload(handle: &mut EngineHandle) -> Arc<GameSnapshot> {
    let (ack, _) = send(
        handle,
        EngineCommand::Upload {
            path: "cours.txt".into(),
        },
    )
    .await;
    assert!(matches!(ack, EngineUpdate::Applied { changed: true, .. }));
    wait_for(handle, |s| s.status == GameStatus::Playing).await
}

fn entry(id: &str) -> ScoreEntry {
    ScoreEntry {
        id: id.to_string(),
        concept: "Ancien".to_string(),
        difficulty: Difficulty::Easy,
        time_taken: 40,
        date: chrono::DateTime::from_timestamp_millis(0).unwrap(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_upload_starts_session_with_stored_history() {
    let store = MemoryStore::with_entries(vec![entry("old")]);
    let mut handle = spawn_engine(StubGenerator::default(), store).await;
    assert_eq!(handle.snapshot().history.len(), 1);

    let snap = upload(&mut handle).await;
    assert_eq!(snap.pool.len(), SEGMENTS.len());
    assert!(snap.response.is_empty());
    assert_eq!(snap.time_left, MAX_TIME_SECS);
    assert!(snap.has_source_text);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_win_saves_history() {
    let store = MemoryStore::with_entries(vec![entry("old")]);
    let mut handle = spawn_engine(StubGenerator::default(), store.clone()).await;
    upload(&mut handle).await;

    for segment in SEGMENTS {
        let snap = handle.snapshot();
        let index = snap.pool.iter().position(|s| s == segment).unwrap();
        let (ack, _) = send(
            &mut handle,
            EngineCommand::Action(PuzzleAction::MoveToResponse {
                segment: segment.to_string(),
                index,
            }),
        )
        .await;
        assert!(matches!(ack, EngineUpdate::Applied { changed: true, .. }));
    }

    let (_, events) = send(&mut handle, EngineCommand::Action(PuzzleAction::Check)).await;
    assert!(events.iter().any(|e| matches!(e, SessionEvent::Won { .. })));
    assert_eq!(handle.snapshot().status, GameStatus::Won);

    let saved = store.entries().await;
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].concept, "Noyau 0");
    assert_eq!(saved[1].id, "old");
    assert_eq!(store.save_count().await, 1);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_countdown_ticks_once_per_second() {
    let mut handle = spawn_engine(StubGenerator::default(), MemoryStore::new()).await;
    upload(&mut handle).await;

    let start = Instant::now();
    wait_for(&handle, |s| s.time_left == MAX_TIME_SECS - 10).await;
    assert_eq!(start.elapsed(), Duration::from_secs(10));

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_time_runs_out_and_timers_stop() {
    let mut handle = spawn_engine(StubGenerator::default(), MemoryStore::new()).await;
    upload(&mut handle).await;

    let start = Instant::now();
    let snap = wait_for(&handle, |s| s.status == GameStatus::Lost).await;
    assert_eq!(start.elapsed(), Duration::from_secs(MAX_TIME_SECS as u64));
    assert_eq!(snap.time_left, 0);

    // No timer survives the session.
    tokio::time::sleep(Duration::from_secs(30)).await;
    let later = handle.snapshot();
    assert_eq!(later.status, GameStatus::Lost);
    assert_eq!(later.time_left, 0);
    assert_eq!(later.response, snap.response);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_inactivity_auto_hint() {
    let mut handle = spawn_engine(StubGenerator::default(), MemoryStore::new()).await;
    upload(&mut handle).await;

    let start = Instant::now();
    let snap = wait_for(&handle, |s| !s.response.is_empty()).await;
    let waited = start.elapsed();
    assert!(
        waited > Duration::from_secs(20) && waited <= Duration::from_secs(22),
        "auto-hint after {waited:?}"
    );
    assert_eq!(snap.response[0], SEGMENTS[0]);
    assert!(snap.auto_hint_visible);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_reset_discards_in_flight_generation() {
    let generator = StubGenerator {
        delay: Duration::from_secs(5),
        ..StubGenerator::default()
    };
    let calls = Arc::clone(&generator.calls);
    let mut handle = spawn_engine(generator, MemoryStore::new()).await;

    send(
        &mut handle,
        EngineCommand::Upload {
            path: "cours.txt".into(),
        },
    )
    .await;
    assert_eq!(handle.snapshot().status, GameStatus::Loading);
    send(&mut handle, EngineCommand::Reset).await;

    tokio::time::sleep(Duration::from_secs(10)).await;
    let snap = handle.snapshot();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(snap.status, GameStatus::Idle);
    assert!(snap.puzzle.is_none());
    assert!(snap.pool.is_empty());

    // A fresh upload still goes through.
    let snap = upload(&mut handle).await;
    assert_eq!(snap.puzzle.as_ref().map(|p| p.concept.as_str()), Some("Noyau 1"));

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_extraction_failure_returns_to_idle() {
    let mut handle = spawn_engine(StubGenerator::default(), MemoryStore::new()).await;
    send(
        &mut handle,
        EngineCommand::Upload {
            path: "empty.txt".into(),
        },
    )
    .await;

    let snap = wait_for(&handle, |s| s.status == GameStatus::Idle && s.error.is_some()).await;
    assert!(snap.puzzle.is_none());
    assert!(!snap.has_source_text);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_settings_are_gated_by_status() {
    let mut handle = spawn_engine(StubGenerator::default(), MemoryStore::new()).await;

    let (ack, _) = send(&mut handle, EngineCommand::SetDifficulty(Difficulty::Hard)).await;
    assert!(matches!(ack, EngineUpdate::Applied { changed: true, .. }));
    upload(&mut handle).await;
    assert_eq!(handle.snapshot().difficulty, Difficulty::Hard);

    let (ack, _) = send(&mut handle, EngineCommand::SetDifficulty(Difficulty::Easy)).await;
    assert!(matches!(
        ack,
        EngineUpdate::Rejected {
            error: SessionError::NotAllowed { .. },
            ..
        }
    ));
    assert_eq!(handle.snapshot().difficulty, Difficulty::Hard);

    let (ack, _) = send(&mut handle, EngineCommand::NextPuzzle).await;
    assert!(matches!(ack, EngineUpdate::Rejected { .. }));

    handle.shutdown().await.unwrap();
}

//! Engine runtime: the single task that owns the session.
//!
//! Commands arrive over an mpsc channel, load results come back from spawned
//! tasks tagged with their session token, and the countdown and activity
//! intervals live only while a session is being played. Everything is
//! serialized through one `select!` loop, so `GameState` never needs a lock.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval};

use crate::core::{GameSnapshot, GameState, LoadTicket, LoadedPuzzle};
use crate::services::{GenerationRequest, HistoryStore, PuzzleGenerator, TextExtractor};
use crate::types::{
    Difficulty, GameStatus, Millis, PuzzleAction, SelectionMode, SessionError, SessionEvent,
    SessionToken, ACTIVITY_POLL_MS, TICK_MS,
};

/// Request to the engine task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Upload { path: PathBuf },
    NextPuzzle,
    Action(PuzzleAction),
    Reset,
    SetDifficulty(Difficulty),
    SetSelectionMode(SelectionMode),
    SetTargetConcept(String),
    Shutdown,
}

impl EngineCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineCommand::Upload { .. } => "upload",
            EngineCommand::NextPuzzle => "nextPuzzle",
            EngineCommand::Action(action) => action.as_str(),
            EngineCommand::Reset => "reset",
            EngineCommand::SetDifficulty(_) => "setDifficulty",
            EngineCommand::SetSelectionMode(_) => "setSelectionMode",
            EngineCommand::SetTargetConcept(_) => "setTargetConcept",
            EngineCommand::Shutdown => "shutdown",
        }
    }
}

/// Notification from the engine task.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineUpdate {
    /// A command was handled; `changed` is false when it was a silent no-op.
    Applied {
        command: &'static str,
        changed: bool,
    },
    /// A command was refused; the session is unchanged.
    Rejected {
        command: &'static str,
        error: SessionError,
    },
    /// A transition happened (from a command, a timer or a finished load).
    Event(SessionEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("engine is no longer running")]
pub struct EngineClosed;

/// Outcome of a spawned load, tagged with the token captured on entering Loading.
#[derive(Debug)]
struct LoadDone {
    token: SessionToken,
    result: Result<LoadedPuzzle, SessionError>,
}

/// Wall clock in milliseconds that follows tokio's (possibly paused) time.
#[derive(Debug, Clone, Copy)]
struct Clock {
    epoch_ms: Millis,
    started: Instant,
}

impl Clock {
    fn new() -> Self {
        Self {
            epoch_ms: Millis::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default(),
            started: Instant::now(),
        }
    }

    fn now(&self) -> Millis {
        let elapsed = Millis::try_from(self.started.elapsed().as_millis()).unwrap_or(Millis::MAX);
        self.epoch_ms.saturating_add(elapsed)
    }
}

/// Periodic timers of one playing session.
struct SessionTimers {
    token: SessionToken,
    countdown: Interval,
    activity: Interval,
}

impl SessionTimers {
    fn start(token: SessionToken) -> Self {
        let every = |ms| {
            let period = Duration::from_millis(ms);
            interval_at(Instant::now() + period, period)
        };
        Self {
            token,
            countdown: every(TICK_MS),
            activity: every(ACTIVITY_POLL_MS),
        }
    }
}

async fn next_tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Extract (for an upload) and generate.
async fn load_puzzle<X, G>(
    extractor: &X,
    generator: &G,
    ticket: LoadTicket,
    path: Option<&Path>,
) -> Result<LoadedPuzzle, SessionError>
where
    X: TextExtractor,
    G: PuzzleGenerator,
{
    let (text, fresh) = match (ticket.source_text, path) {
        (Some(text), _) => (text, false),
        (None, Some(path)) => (extractor.extract(path).await?, true),
        (None, None) => {
            return Err(SessionError::Extraction(
                "no document to read".to_string(),
            ))
        }
    };

    let puzzle = generator
        .generate(GenerationRequest {
            text: text.clone(),
            difficulty: ticket.difficulty,
            target_concept: ticket.target_concept,
        })
        .await?;

    Ok(LoadedPuzzle {
        puzzle,
        source_text: fresh.then_some(text),
    })
}

/// Owner of the session state and its collaborators.
pub struct Engine<X, G, S> {
    state: GameState,
    extractor: Arc<X>,
    generator: Arc<G>,
    store: Arc<S>,
    clock: Clock,
    loads_tx: mpsc::UnboundedSender<LoadDone>,
    loads_rx: Option<mpsc::UnboundedReceiver<LoadDone>>,
    updates: mpsc::UnboundedSender<EngineUpdate>,
    snapshots: watch::Sender<Arc<GameSnapshot>>,
}

impl<X, G, S> Engine<X, G, S>
where
    X: TextExtractor,
    G: PuzzleGenerator,
    S: HistoryStore,
{
    /// Build the engine, seeding the history from `store`.
    pub async fn new(seed: u32, extractor: X, generator: G, store: S) -> (Self, EngineUpdates) {
        let history = store.load().await;
        tracing::debug!(entries = history.len(), seed, "history loaded");

        let state = GameState::with_history(seed, history);
        let clock = Clock::new();
        let (loads_tx, loads_rx) = mpsc::unbounded_channel();
        let (updates, updates_rx) = mpsc::unbounded_channel();
        let (snapshots, snapshots_rx) = watch::channel(Arc::new(state.snapshot(clock.now())));

        let engine = Self {
            state,
            extractor: Arc::new(extractor),
            generator: Arc::new(generator),
            store: Arc::new(store),
            clock,
            loads_tx,
            loads_rx: Some(loads_rx),
            updates,
            snapshots,
        };
        let receivers = EngineUpdates {
            updates: updates_rx,
            snapshots: snapshots_rx,
        };
        (engine, receivers)
    }

    /// Run the loop on a new task.
    pub fn spawn(self, receivers: EngineUpdates, max_pending: usize) -> EngineHandle {
        let (commands, commands_rx) = mpsc::channel(max_pending.max(1));
        let task = tokio::spawn(self.run(commands_rx));
        EngineHandle {
            commands,
            receivers,
            task,
        }
    }

    /// Serve commands until `Shutdown` or until every sender is gone.
    pub async fn run(mut self, mut commands: mpsc::Receiver<EngineCommand>) {
        let Some(mut loads_rx) = self.loads_rx.take() else {
            tracing::warn!("engine loop already ran");
            return;
        };
        let mut timers: Option<SessionTimers> = None;
        tracing::info!("engine started");

        loop {
            self.sync_timers(&mut timers);
            let (countdown, activity) = match timers.as_mut() {
                Some(t) => (Some(&mut t.countdown), Some(&mut t.activity)),
                None => (None, None),
            };

            let mut ack = None;
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(EngineCommand::Shutdown) | None => break,
                    Some(cmd) => ack = Some(self.handle_command(cmd)),
                },
                Some(done) = loads_rx.recv() => self.handle_load(done),
                _ = next_tick(countdown) => {
                    let now = self.clock.now();
                    self.state.tick(now);
                }
                _ = next_tick(activity) => {
                    let now = self.clock.now();
                    self.state.evaluate_auto_hint(now);
                }
            }

            self.flush().await;
            // Acknowledge only once the resulting snapshot is published.
            if let Some(ack) = ack {
                self.emit(ack);
            }
        }

        tracing::info!("engine stopped");
    }

    /// Start timers on entering Playing, drop them on every exit.
    fn sync_timers(&self, timers: &mut Option<SessionTimers>) {
        let token = self.state.session_token();
        let playing = self.state.status() == GameStatus::Playing;

        match timers {
            Some(t) if playing && t.token == token => {}
            _ if playing => {
                tracing::debug!(token = token.value(), "session timers started");
                *timers = Some(SessionTimers::start(token));
            }
            _ => {
                if timers.take().is_some() {
                    tracing::debug!(token = token.value(), "session timers stopped");
                }
            }
        }
    }

    fn handle_command(&mut self, cmd: EngineCommand) -> EngineUpdate {
        let command = cmd.as_str();
        tracing::debug!(command, status = self.state.status().as_str(), "handling command");
        let now = self.clock.now();

        let result = match cmd {
            EngineCommand::Upload { path } => self
                .state
                .begin_upload()
                .map(|ticket| self.spawn_load(ticket, Some(path))),
            EngineCommand::NextPuzzle => self
                .state
                .begin_next_puzzle()
                .map(|ticket| self.spawn_load(ticket, None)),
            EngineCommand::Action(action) => Ok(self.state.apply_action(action, now)),
            EngineCommand::Reset => {
                self.state.reset(now);
                tracing::info!(token = self.state.session_token().value(), "session reset");
                Ok(true)
            }
            EngineCommand::SetDifficulty(d) => self.state.set_difficulty(d).map(|()| true),
            EngineCommand::SetSelectionMode(m) => self.state.set_selection_mode(m).map(|()| true),
            EngineCommand::SetTargetConcept(c) => self.state.set_target_concept(c).map(|()| true),
            EngineCommand::Shutdown => Ok(false),
        };

        match result {
            Ok(changed) => EngineUpdate::Applied { command, changed },
            Err(error) => {
                tracing::debug!(command, %error, "command rejected");
                EngineUpdate::Rejected { command, error }
            }
        }
    }

    fn spawn_load(&self, ticket: LoadTicket, path: Option<PathBuf>) -> bool {
        tracing::info!(
            token = ticket.token.value(),
            kind = ?ticket.kind,
            difficulty = ticket.difficulty.as_str(),
            "loading puzzle"
        );

        let extractor = Arc::clone(&self.extractor);
        let generator = Arc::clone(&self.generator);
        let tx = self.loads_tx.clone();
        tokio::spawn(async move {
            let token = ticket.token;
            let result = load_puzzle(&*extractor, &*generator, ticket, path.as_deref()).await;
            let _ = tx.send(LoadDone { token, result });
        });
        true
    }

    fn handle_load(&mut self, done: LoadDone) {
        let now = self.clock.now();
        if let Err(err) = &done.result {
            tracing::warn!(token = done.token.value(), %err, "puzzle load failed");
        }

        if !self.state.complete_load(done.token, done.result, now) {
            tracing::warn!(
                token = done.token.value(),
                current = self.state.session_token().value(),
                "discarding stale load result"
            );
        }
    }

    /// Persist history changes and publish the snapshot before forwarding
    /// the events.
    async fn flush(&mut self) {
        let events = self.state.drain_events();
        for event in &events {
            match event {
                SessionEvent::Started {
                    token,
                    concept,
                    segments,
                } => tracing::info!(token = token.value(), %concept, segments, "puzzle started"),
                SessionEvent::Won { entry } => {
                    tracing::info!(concept = %entry.concept, time_taken = entry.time_taken, "puzzle solved")
                }
                SessionEvent::Lost => tracing::info!("time is up"),
                SessionEvent::LoadFailed { message } => tracing::warn!(%message, "back to idle"),
                SessionEvent::IncorrectAttempt { attempts } => {
                    tracing::debug!(attempts, "incorrect answer")
                }
                SessionEvent::HintApplied {
                    automatic,
                    position,
                } => tracing::debug!(automatic, position, "hint applied"),
                SessionEvent::HistoryChanged => self.persist_history().await,
            }
        }

        let snapshot = self.state.snapshot(self.clock.now());
        self.snapshots.send_if_modified(|current| {
            if **current == snapshot {
                false
            } else {
                *current = Arc::new(snapshot);
                true
            }
        });

        for event in events {
            self.emit(EngineUpdate::Event(event));
        }
    }

    async fn persist_history(&self) {
        if let Err(err) = self.store.save(self.state.history()).await {
            tracing::warn!(%err, "failed to save history");
        }
    }

    fn emit(&self, update: EngineUpdate) {
        // Nobody listening is fine.
        let _ = self.updates.send(update);
    }
}

/// Receiving side of an engine: discrete updates plus the latest snapshot.
#[derive(Debug)]
pub struct EngineUpdates {
    updates: mpsc::UnboundedReceiver<EngineUpdate>,
    snapshots: watch::Receiver<Arc<GameSnapshot>>,
}

/// Client handle to a spawned engine.
#[derive(Debug)]
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
    receivers: EngineUpdates,
    task: JoinHandle<()>,
}

impl EngineHandle {
    pub async fn send(&self, command: EngineCommand) -> Result<(), EngineClosed> {
        self.commands.send(command).await.map_err(|_| EngineClosed)
    }

    /// Next update, or `None` once the engine has stopped.
    pub async fn recv(&mut self) -> Option<EngineUpdate> {
        self.receivers.updates.recv().await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<GameSnapshot> {
        Arc::clone(&self.receivers.snapshots.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<GameSnapshot>> {
        self.receivers.snapshots.clone()
    }

    pub async fn shutdown(self) -> Result<(), EngineClosed> {
        let _ = self.commands.send(EngineCommand::Shutdown).await;
        self.task.await.map_err(|_| EngineClosed)
    }
}

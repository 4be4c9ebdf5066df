use chess::{Coord, MoveNotation, MoveOracle, MoveOutcome, OracleError, PromotionKind};
use chess_client::{ChatMessage, ClientResult, GameState, GameStateUpdate, MoveAccepted};
use tokio::sync::{broadcast, mpsc};

use crate::board_cache::BoardStateCache;
use crate::context::SessionContext;
use crate::error::{SessionError, SessionResult};
use crate::events::SessionEvent;
use crate::outcome::{check_hint, OutcomeNotifier};
use crate::promotion::{PromotionContext, PROMOTION_CHOICES};
use crate::realtime::{ChannelState, ChatLine, ChatLog, MoveHistory, OWN_SENDER};
use crate::selection::{ClickOutcome, IgnoreReason, SelectionState, SelectionStep};
use crate::snapshot::SessionSnapshot;
use crate::sync::{InFlightMove, MoveResolution, PendingMove, Submission};

/// What the actor must do after a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FollowUp {
    None,
    Reload,
}

/// Internal mutable state, owned entirely by the session actor. No locks
/// beyond the processing flag.
pub(crate) struct SessionState {
    pub ctx: SessionContext,
    oracle: Box<dyn MoveOracle>,
    cache: BoardStateCache,
    selection: SelectionState,
    in_flight: Option<InFlightMove>,
    promotion: Option<PromotionContext>,
    history: MoveHistory,
    chat: ChatLog,
    channel: ChannelState,
    outcome: OutcomeNotifier,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionState {
    pub fn new(
        ctx: SessionContext,
        oracle: Box<dyn MoveOracle>,
        chat_capacity: usize,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            ctx,
            oracle,
            cache: BoardStateCache::new(),
            selection: SelectionState::default(),
            in_flight: None,
            promotion: None,
            history: MoveHistory::default(),
            chat: ChatLog::new(chat_capacity),
            channel: ChannelState::default(),
            outcome: OutcomeNotifier::default(),
            events,
        }
    }

    pub fn game_id(&self) -> &str {
        self.ctx.game_id()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            game_id: self.ctx.game_id().to_string(),
            local_color: self.ctx.local_color(),
            position: self.cache.position().to_string(),
            turn: self.cache.turn(),
            board: self.cache.board().clone(),
            selected: self.selection.selected(),
            destinations: self.selection.destinations().to_vec(),
            processing: self.ctx.lock().is_held(),
            promotion: self.promotion.map(|p| p.destination),
            check: if self.cache.is_loaded() {
                check_hint(self.oracle.as_ref())
            } else {
                None
            },
            outcome: self.outcome.outcome(),
            history: self.history.moves().to_vec(),
            chat: self.chat.lines().cloned().collect(),
            channel_open: self.channel.is_open(),
        }
    }

    /// Take the server's game state as the starting point.
    pub fn load_game(&mut self, game: &GameState) -> Result<(), OracleError> {
        if let Some(moves) = &game.move_history {
            self.history.seed(moves.iter().cloned());
        }
        self.apply_authoritative(&game.fen, None, None)
    }

    // -- board input --------------------------------------------------------

    pub fn click(&mut self, at: Coord) -> (ClickOutcome, Option<Submission>) {
        if !self.cache.is_loaded() {
            return (ClickOutcome::Ignored(IgnoreReason::NotLoaded), None);
        }
        if self.promotion.is_some() {
            return (ClickOutcome::Ignored(IgnoreReason::PromotionActive), None);
        }
        if self.ctx.lock().is_held() {
            return (ClickOutcome::Ignored(IgnoreReason::MoveInFlight), None);
        }

        let local_color = self.ctx.local_color();
        match self.selection.click(at, self.oracle.as_ref(), local_color) {
            SelectionStep::Selected => {
                self.emit_selection();
                let destinations = self.selection.destinations().to_vec();
                (ClickOutcome::Selected { at, destinations }, None)
            }
            SelectionStep::Deselected => {
                self.emit_selection();
                (ClickOutcome::Deselected, None)
            }
            SelectionStep::Unselectable => {
                (ClickOutcome::Ignored(IgnoreReason::NothingToSelect), None)
            }
            SelectionStep::Target { from, to } => {
                self.emit_selection();
                self.start_move(from, to)
            }
        }
    }

    fn emit_selection(&self) {
        self.emit(SessionEvent::SelectionChanged {
            selected: self.selection.selected(),
            destinations: self.selection.destinations().to_vec(),
        });
    }

    /// Phase 1: validate locally. The lock is held from here until the
    /// in-flight record is dropped.
    fn start_move(&mut self, from: Coord, to: Coord) -> (ClickOutcome, Option<Submission>) {
        let Some(guard) = self.ctx.lock().try_acquire() else {
            return (ClickOutcome::Ignored(IgnoreReason::MoveInFlight), None);
        };
        let notation = MoveNotation::new(from, to);

        match self.oracle.apply_move(from, to) {
            Err(e) => {
                tracing::debug!("Move {} rejected locally: {}", notation, e);
                (ClickOutcome::LocallyRejected(notation), None)
            }
            Ok(MoveOutcome::Applied) => {
                let pending = PendingMove {
                    origin: from,
                    destination: to,
                    promotion_awaited: false,
                };
                self.in_flight = Some(InFlightMove::new(pending, guard));
                self.refresh_local();
                self.emit(SessionEvent::MoveSubmitted(notation.to_string()));
                (ClickOutcome::MoveStarted(notation), Some(Submission { notation }))
            }
            Ok(MoveOutcome::PromotionPending { at }) => {
                let pending = PendingMove {
                    origin: from,
                    destination: to,
                    promotion_awaited: true,
                };
                let color = self.ctx.local_color();
                self.in_flight = Some(InFlightMove::new(pending, guard));
                self.promotion = Some(PromotionContext::new(from, to, color));
                self.refresh_local();
                tracing::debug!(square = %at, "Awaiting promotion choice");
                self.emit(SessionEvent::PromotionRequested {
                    at,
                    color,
                    choices: PROMOTION_CHOICES,
                });
                (ClickOutcome::PromotionRequested { at }, None)
            }
        }
    }

    /// Complete a pending promotion with the chosen piece.
    pub fn choose_promotion(&mut self, kind: PromotionKind) -> SessionResult<Submission> {
        let Some(mut promotion) = self.promotion.take() else {
            return Err(SessionError::NoPromotionPending);
        };

        if let Err(e) = self.oracle.apply_promotion(promotion.destination, kind) {
            tracing::warn!("Promotion to {} failed: {}", kind, e);
            self.in_flight = None;
            self.restore();
            self.emit(SessionEvent::Error(format!("Promotion failed: {}", e)));
            return Err(SessionError::LocalValidationRejection(e.to_string()));
        }

        let notation = promotion.choose(kind);
        let Some(record) = self.in_flight.as_mut() else {
            self.restore();
            return Err(SessionError::NoPromotionPending);
        };
        record.notation = notation;
        record.pending.promotion_awaited = false;

        self.refresh_local();
        self.emit(SessionEvent::MoveSubmitted(notation.to_string()));
        Ok(Submission { notation })
    }

    // -- server confirmation ------------------------------------------------

    /// Phase 3: reconcile the server's answer. The in-flight record is
    /// dropped here on every path.
    pub fn on_move_response(
        &mut self,
        notation: MoveNotation,
        result: ClientResult<MoveAccepted>,
    ) -> FollowUp {
        let Some(record) = self.in_flight.take() else {
            tracing::warn!("Response for {} arrived with no move in flight", notation);
            return FollowUp::None;
        };
        if record.notation != notation {
            tracing::warn!(
                "Response for {} does not match in-flight {}",
                notation,
                record.notation
            );
            self.in_flight = Some(record);
            return FollowUp::None;
        }

        match MoveResolution::classify(result) {
            MoveResolution::Confirmed(accepted) => {
                tracing::info!("Move {} confirmed", notation);
                if !record.recorded {
                    self.record_move(&notation.to_string());
                }
                drop(record);
                self.emit(SessionEvent::MoveConfirmed(notation.to_string()));

                if self.cache.is_current(&accepted.new_fen) {
                    tracing::debug!("Already showing the confirmed position");
                    self.cache.confirm(&accepted.new_fen);
                    self.evaluate_outcome(accepted.outcome.as_deref());
                    return FollowUp::None;
                }
                match self.apply_authoritative(&accepted.new_fen, None, accepted.outcome.as_deref())
                {
                    Ok(()) => FollowUp::None,
                    Err(e) => {
                        tracing::error!("Server confirmed {} with unreadable position: {}", notation, e);
                        self.restore();
                        self.emit(SessionEvent::Desync(
                            SessionError::ProtocolDesync(e.to_string()).to_string(),
                        ));
                        FollowUp::Reload
                    }
                }
            }
            MoveResolution::Desync(message) => {
                tracing::error!("Server rejected locally accepted move {}: {}", notation, message);
                drop(record);
                self.restore();
                self.emit(SessionEvent::Desync(
                    SessionError::ProtocolDesync(message).to_string(),
                ));
                FollowUp::Reload
            }
            MoveResolution::NetworkFailure(message) => {
                drop(record);
                self.fail(message);
                FollowUp::None
            }
        }
    }

    /// The request task vanished without an answer.
    pub fn abandon_in_flight(&mut self, reason: String) {
        if self.in_flight.take().is_some() {
            self.fail(reason);
        }
    }

    fn fail(&mut self, message: String) {
        tracing::warn!("Move failed: {}", message);
        self.restore();
        self.emit(SessionEvent::Error(
            SessionError::NetworkFailure(message).to_string(),
        ));
    }

    pub fn on_reload(&mut self, result: ClientResult<GameState>) {
        match result {
            Ok(game) => {
                tracing::info!("Reloaded game state");
                if let Err(e) = self.load_game(&game) {
                    tracing::error!("Reloaded game has unreadable position: {}", e);
                    self.emit(SessionEvent::Error(format!("Reload failed: {}", e)));
                }
            }
            Err(e) => {
                tracing::warn!("Reload failed: {}", e);
                self.emit(SessionEvent::Error(
                    SessionError::NetworkFailure(e.to_string()).to_string(),
                ));
            }
        }
    }

    // -- realtime channel ---------------------------------------------------

    pub fn on_state_update(&mut self, update: GameStateUpdate) {
        if self.cache.is_authoritative(&update.new_position) {
            tracing::debug!("Ignoring duplicate state update");
            return;
        }
        if self.cache.is_current(&update.new_position) {
            tracing::debug!("State update matches the local move");
            self.cache.confirm(&update.new_position);
            if let Some(mv) = update.last_move.as_deref() {
                self.mark_recorded(mv);
            }
            self.evaluate_outcome(update.outcome.as_deref());
            return;
        }
        if let Err(e) = self.apply_authoritative(
            &update.new_position,
            update.last_move.as_deref(),
            update.outcome.as_deref(),
        ) {
            tracing::warn!("Dropping state update with unreadable position: {}", e);
        }
    }

    pub fn on_chat(&mut self, message: ChatMessage) {
        let line = ChatLine {
            sender: message.sender,
            text: message.text,
        };
        self.chat.push(line.clone());
        self.emit(SessionEvent::Chat(line));
    }

    pub fn channel_opened(&mut self, outgoing: mpsc::Sender<String>) {
        self.channel.open(outgoing);
        self.emit(SessionEvent::ChannelStatus { open: true });
    }

    pub fn channel_closed(&mut self) {
        if self.channel.is_open() {
            tracing::info!("Realtime channel closed; chat disabled");
        }
        self.channel.close();
        self.emit(SessionEvent::ChannelStatus { open: false });
    }

    pub fn send_chat(&mut self, text: &str) -> SessionResult<()> {
        self.channel.send_chat(text)?;
        let line = ChatLine {
            sender: Some(OWN_SENDER.to_string()),
            text: text.to_string(),
        };
        self.chat.push(line.clone());
        self.emit(SessionEvent::Chat(line));
        Ok(())
    }

    // -- shared refresh paths -----------------------------------------------

    /// Load a server position, then refresh everything derived from it.
    fn apply_authoritative(
        &mut self,
        fen: &str,
        last_move: Option<&str>,
        server_result: Option<&str>,
    ) -> Result<(), OracleError> {
        self.cache.accept_authoritative(self.oracle.as_mut(), fen)?;

        if let Some(promotion) = self.promotion.take() {
            tracing::warn!(
                "Position changed on the server; promotion on {} abandoned",
                promotion.destination
            );
            self.in_flight = None;
            self.emit(SessionEvent::Error(
                "Promotion abandoned: the position changed".to_string(),
            ));
        }
        self.selection.clear();

        if let Some(mv) = last_move {
            self.mark_recorded(mv);
        }

        self.emit(SessionEvent::BoardRefreshed(self.snapshot()));
        self.evaluate_outcome(server_result);
        Ok(())
    }

    /// Show the oracle's speculative position. The restore point stays on
    /// the last authoritative position.
    fn refresh_local(&mut self) {
        self.cache.refresh_from(self.oracle.as_ref());
        self.emit(SessionEvent::BoardRefreshed(self.snapshot()));
    }

    /// Record a move announced by the server, flagging the in-flight move
    /// when it is the same one.
    fn mark_recorded(&mut self, mv: &str) {
        if let Some(record) = self.in_flight.as_mut().filter(|r| r.is_move(mv)) {
            if record.recorded {
                return;
            }
            record.recorded = true;
        }
        self.record_move(mv);
    }

    /// Put the oracle and cache back on the last known-good position.
    fn restore(&mut self) {
        self.promotion = None;
        self.selection.clear();
        if let Err(e) = self.cache.restore(self.oracle.as_mut()) {
            tracing::error!("Failed to restore last known-good position: {}", e);
        }
        self.emit(SessionEvent::BoardRefreshed(self.snapshot()));
    }

    fn record_move(&mut self, mv: &str) {
        self.history.push(mv);
        self.emit(SessionEvent::MoveRecorded(mv.trim().to_string()));
    }

    fn evaluate_outcome(&mut self, server_result: Option<&str>) {
        if let Some(king) = check_hint(self.oracle.as_ref()) {
            self.emit(SessionEvent::Check { king });
        }
        let position = self.cache.position().to_string();
        if let Some(outcome) =
            self.outcome
                .evaluate(&position, self.oracle.as_ref(), server_result)
        {
            tracing::info!("Game over: {}", outcome);
            self.emit(SessionEvent::GameOver(outcome));
        }
    }
}

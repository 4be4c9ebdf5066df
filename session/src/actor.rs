use std::sync::Arc;

use chess::MoveNotation;
use chess_client::{ChannelEvent, ChannelHandle, ClientResult, GameApi, GameState, MoveAccepted};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::Instrument;

use crate::commands::SessionCommand;
use crate::state::{FollowUp, SessionState};
use crate::sync::Submission;

/// Result of a spawned network call, fed back into the loop.
enum Completion {
    Move {
        notation: MoveNotation,
        result: ClientResult<MoveAccepted>,
    },
    Reload(ClientResult<GameState>),
}

/// The main session actor loop.
/// Owns all mutable state. Processes commands, channel events and network
/// completions sequentially; requests themselves run as separate tasks so
/// broadcasts keep flowing while a move is in flight.
pub(crate) async fn run_session_actor(
    state: SessionState,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    channel: Option<ChannelHandle>,
    api: Arc<dyn GameApi>,
) {
    let game_id = state.game_id().to_string();
    run_session_actor_inner(state, cmd_rx, channel, api)
        .instrument(tracing::info_span!("session", game_id = %game_id))
        .await;
}

async fn run_session_actor_inner(
    mut state: SessionState,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    channel: Option<ChannelHandle>,
    api: Arc<dyn GameApi>,
) {
    tracing::info!("Session actor started");

    let mut tasks: JoinSet<Completion> = JoinSet::new();
    let mut channel_rx = match channel {
        Some(ChannelHandle { events, outgoing }) => {
            state.channel_opened(outgoing);
            Some(events)
        }
        None => {
            state.channel_closed();
            None
        }
    };

    loop {
        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Shutdown) | None => {
                        tracing::info!("Session actor shutting down");
                        break;
                    }
                    Some(cmd) => handle_command(&mut state, cmd, &api, &mut tasks),
                }
            }

            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                handle_completion(&mut state, joined, &api, &mut tasks);
            }

            event = next_channel_event(&mut channel_rx), if channel_rx.is_some() => {
                match event {
                    Some(ChannelEvent::GameState(update)) => state.on_state_update(update),
                    Some(ChannelEvent::Chat(message)) => state.on_chat(message),
                    None => {
                        channel_rx = None;
                        state.channel_closed();
                    }
                }
            }
        }
    }

    tracing::info!("Session actor exited");
}

async fn next_channel_event(
    rx: &mut Option<mpsc::Receiver<ChannelEvent>>,
) -> Option<ChannelEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn handle_command(
    state: &mut SessionState,
    cmd: SessionCommand,
    api: &Arc<dyn GameApi>,
    tasks: &mut JoinSet<Completion>,
) {
    match cmd {
        SessionCommand::Click { at, reply } => {
            let (outcome, submission) = state.click(at);
            if let Some(submission) = submission {
                spawn_submit(state, submission, api, tasks);
            }
            let _ = reply.send(outcome);
        }
        SessionCommand::ChoosePromotion { kind, reply } => {
            let result = state.choose_promotion(kind).map(|submission| {
                spawn_submit(state, submission, api, tasks);
                submission.notation
            });
            let _ = reply.send(result);
        }
        SessionCommand::SendChat { text, reply } => {
            let _ = reply.send(state.send_chat(&text));
        }
        SessionCommand::Reload { reply } => {
            spawn_reload(state, api, tasks);
            let _ = reply.send(Ok(()));
        }
        SessionCommand::GetSnapshot { reply } => {
            let _ = reply.send(state.snapshot());
        }
        SessionCommand::Subscribe { reply } => {
            let _ = reply.send((state.snapshot(), state.subscribe()));
        }
        SessionCommand::Shutdown => {}
    }
}

fn handle_completion(
    state: &mut SessionState,
    joined: Result<Completion, JoinError>,
    api: &Arc<dyn GameApi>,
    tasks: &mut JoinSet<Completion>,
) {
    match joined {
        Ok(Completion::Move { notation, result }) => {
            if state.on_move_response(notation, result) == FollowUp::Reload {
                spawn_reload(state, api, tasks);
            }
        }
        Ok(Completion::Reload(result)) => state.on_reload(result),
        Err(e) => {
            tracing::error!("Network task lost: {}", e);
            state.abandon_in_flight(e.to_string());
        }
    }
}

/// Phase 3: send the move. Runs off the loop; the answer comes back as a
/// [`Completion::Move`].
fn spawn_submit(
    state: &SessionState,
    submission: Submission,
    api: &Arc<dyn GameApi>,
    tasks: &mut JoinSet<Completion>,
) {
    let api = api.clone();
    let game_id = state.game_id().to_string();
    let notation = submission.notation;
    tracing::debug!("Submitting {}", notation);
    tasks.spawn(
        async move {
            let result = api.submit_move(&game_id, &notation.to_string()).await;
            Completion::Move { notation, result }
        }
        .in_current_span(),
    );
}

fn spawn_reload(state: &SessionState, api: &Arc<dyn GameApi>, tasks: &mut JoinSet<Completion>) {
    let api = api.clone();
    let game_id = state.game_id().to_string();
    tracing::debug!("Reloading game state");
    tasks.spawn(
        async move { Completion::Reload(api.get_game(&game_id).await) }.in_current_span(),
    );
}

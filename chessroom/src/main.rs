//! chessroom: play an online chess game from the terminal.
//!
//! Logs in (with `--user`), resolves a game id (new game, join, resume or
//! matchmaking), starts a [`chess_session`] session against the server and
//! drives it from line commands on stdin. Session events are printed as they arrive; debug logs go
//! to a daily rolling file under `logs/`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chess::{CozyOracle, MoveNotation, PromotionKind};
use chess_client::{GameApi, HttpGameClient, WsChannelConnector};
use chess_session::{
    start_session, ClickOutcome, SessionConfig, SessionEvent, SessionHandle, SessionSnapshot,
};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod auth;
mod config;
mod input;
mod matchmaking;

use input::InputCommand;

#[derive(Parser)]
#[command(name = "chessroom", about = "Play online chess from the terminal")]
struct Cli {
    /// Game server REST base URL (overrides CHESSROOM_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Game server WebSocket URL (overrides CHESSROOM_WS_URL).
    #[arg(long, global = true)]
    ws_url: Option<String>,

    /// Account to log in with before playing.
    #[arg(long, short, global = true)]
    user: Option<String>,

    /// Password for --user (falls back to CHESSROOM_PASSWORD).
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new game and play it.
    New,
    /// Join a game someone else created.
    Join {
        game_id: String,
    },
    /// Resume a game you are already part of.
    Play {
        game_id: String,
    },
    /// Wait for an opponent, then play.
    Match,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_dir = config::get_log_dir();
    std::fs::create_dir_all(&log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "chessroom");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("chessroom starting up");

    let cli = Cli::parse();
    let mut session_config = SessionConfig::from_env();
    if let Some(api_url) = cli.api_url {
        session_config.api_url = api_url;
    }
    if let Some(ws_url) = cli.ws_url {
        session_config.ws_url = ws_url;
    }

    let api = Arc::new(
        HttpGameClient::new(&session_config.api_url).context("invalid API address")?,
    );
    let mut connector =
        WsChannelConnector::new(&session_config.ws_url).context("invalid WebSocket address")?;

    if let Some(user) = &cli.user {
        auth::sign_in(api.as_ref(), user, cli.password.clone()).await?;
        match api.session_cookie() {
            Some(cookie) => connector = connector.with_cookie(cookie),
            None => tracing::warn!("Login set no session cookie"),
        }
    }

    let game_id = resolve_game(&cli.command, api.as_ref()).await?;
    println!("Game {}", game_id);

    let handle = start_session(
        &game_id,
        api,
        &connector,
        Box::new(CozyOracle::new()),
        &session_config,
    )
    .await
    .context("could not start the game")?;

    run_prompt(&handle).await?;
    handle.shutdown().await;

    tracing::info!("chessroom shutting down");
    Ok(())
}

/// Turn the subcommand into the id of the game to play.
async fn resolve_game(command: &Commands, api: &dyn GameApi) -> anyhow::Result<String> {
    match command {
        Commands::New => {
            let game = api.create_game().await.context("could not create a game")?;
            Ok(game.game_id)
        }
        Commands::Join { game_id } => {
            let joined = api
                .join_game(game_id)
                .await
                .with_context(|| format!("could not join game {}", game_id))?;
            println!("Joined as {}", joined.color);
            Ok(joined.game_id)
        }
        Commands::Play { game_id } => Ok(game_id.clone()),
        Commands::Match => {
            let timeout = Duration::from_secs(config::get_match_timeout_secs());
            let poll_interval = Duration::from_millis(config::get_match_poll_interval_ms());
            println!("Looking for an opponent...");
            let game_id = matchmaking::wait_for_match(api, timeout, poll_interval).await?;
            Ok(game_id)
        }
    }
}

/// Read commands until `quit`, end of input, or the session goes away.
async fn run_prompt(handle: &SessionHandle) -> anyhow::Result<()> {
    let (snapshot, mut events) = handle.subscribe().await?;
    print_snapshot(&snapshot);
    println!("{}", input::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<InputCommand>() {
                    Ok(InputCommand::Quit) => break,
                    Ok(cmd) => {
                        if let Err(e) = run_command(handle, cmd).await {
                            println!("! {}", e);
                        }
                    }
                    Err(e) => println!("! {}", e),
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => print_event(&event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Dropped {} session events", n);
                        print_snapshot(&handle.get_snapshot().await?);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        println!("Session ended.");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

async fn run_command(handle: &SessionHandle, cmd: InputCommand) -> anyhow::Result<()> {
    match cmd {
        InputCommand::Click(at) => print_click(&handle.click(at).await?),
        InputCommand::Move(mv) => play_move(handle, mv).await?,
        InputCommand::Promote(kind) => promote(handle, kind).await?,
        InputCommand::Say(text) => handle.send_chat(text).await?,
        InputCommand::Board => print_snapshot(&handle.get_snapshot().await?),
        InputCommand::History => print_history(&handle.get_snapshot().await?),
        InputCommand::Reload => handle.reload().await?,
        InputCommand::Help => println!("{}", input::HELP),
        InputCommand::Quit => {}
    }
    Ok(())
}

/// Two clicks; a promotion suffix on `mv` answers the chooser straight away.
async fn play_move(handle: &SessionHandle, mv: MoveNotation) -> anyhow::Result<()> {
    let first = handle.click(mv.from).await?;
    if !matches!(first, ClickOutcome::Selected { .. }) {
        print_click(&first);
        return Ok(());
    }

    let second = handle.click(mv.to).await?;
    match (&second, mv.promotion) {
        (ClickOutcome::PromotionRequested { .. }, Some(kind)) => promote(handle, kind).await?,
        _ => print_click(&second),
    }
    Ok(())
}

async fn promote(handle: &SessionHandle, kind: PromotionKind) -> anyhow::Result<()> {
    let notation = handle.choose_promotion(kind).await?;
    println!("Promoting to {} ({})", kind, notation);
    Ok(())
}

fn print_click(outcome: &ClickOutcome) {
    match outcome {
        ClickOutcome::Ignored(reason) => println!("(ignored: {:?})", reason),
        ClickOutcome::Selected { at, destinations } => {
            let targets: Vec<String> = destinations.iter().map(ToString::to_string).collect();
            if targets.is_empty() {
                println!("Selected {} (no legal moves)", at);
            } else {
                println!("Selected {} -> {}", at, targets.join(" "));
            }
        }
        ClickOutcome::Deselected => println!("Selection cleared"),
        ClickOutcome::MoveStarted(mv) => println!("Sending {}...", mv),
        ClickOutcome::PromotionRequested { at } => {
            println!("Promotion on {}: promote q|r|n|b", at)
        }
        ClickOutcome::LocallyRejected(mv) => println!("Illegal move: {}", mv),
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::BoardRefreshed(snapshot) => print_snapshot(snapshot),
        SessionEvent::SelectionChanged { .. } | SessionEvent::MoveSubmitted(_) => {}
        SessionEvent::PromotionRequested { at, color, choices } => {
            let letters: Vec<String> = choices.iter().map(|k| k.suffix().to_string()).collect();
            println!("{} promotes on {}: choose {}", color, at, letters.join("|"));
        }
        SessionEvent::MoveConfirmed(mv) => println!("Server accepted {}", mv),
        SessionEvent::MoveRecorded(mv) => tracing::debug!("Recorded {}", mv),
        SessionEvent::Check { king } => println!("Check! (king on {})", king),
        SessionEvent::GameOver(outcome) => println!("Game over: {}", outcome),
        SessionEvent::Chat(line) => match &line.sender {
            Some(sender) => println!("<{}> {}", sender, line.text),
            None => println!("<chat> {}", line.text),
        },
        SessionEvent::ChannelStatus { open } => {
            if *open {
                println!("Live updates connected");
            } else {
                println!("Live updates disconnected; chat disabled");
            }
        }
        SessionEvent::Desync(message) => println!("! {}", message),
        SessionEvent::Error(message) => println!("! {}", message),
    }
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    println!();
    println!("{}", snapshot.board);
    let turn = match snapshot.turn {
        Some(_) if snapshot.is_local_turn() => "your move".to_string(),
        Some(color) => format!("{} to move", color),
        None => "waiting for position".to_string(),
    };
    println!("You play {}; {}", snapshot.local_color, turn);
    if let Some(outcome) = snapshot.outcome {
        println!("Result: {}", outcome);
    }
}

fn print_history(snapshot: &SessionSnapshot) {
    if snapshot.history.is_empty() {
        println!("No moves yet");
        return;
    }
    for (i, pair) in snapshot.history.chunks(2).enumerate() {
        println!("{:>3}. {}", i + 1, pair.join(" "));
    }
}

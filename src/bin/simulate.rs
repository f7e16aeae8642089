use std::error::Error;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Parser};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use unomatch::{
    Bot, Broadcaster, MatchBuilder, MatchDirectory, MatchSession, MatchView, RandomBot,
    SeatSpec, SessionConfig, TokioTurnClock, describe_command, encode_view, render_view,
};

const DEFAULT_SEED: u64 = 0xDEC0_1DED_5EED_F00D;
const MATCH_ID: &str = "SIM1";

#[derive(Parser, Debug)]
#[command(name = "simulate", about = "Run a bot-only match through the session layer.")]
struct Args {
    /// Number of seats (2-8)
    #[arg(short = 'n', long = "seats", default_value_t = 4)]
    seats: usize,

    /// Alternate turns between two teams (seats split even/odd)
    #[arg(long = "teams", action = ArgAction::SetTrue)]
    teams: bool,

    /// Base RNG seed for the deck and the bots
    #[arg(short = 's', long = "seed", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Safety cap on commands; the match is abandoned after this many
    #[arg(long = "max-turns", default_value_t = 2000)]
    max_turns: usize,

    /// Turn clock timeout in milliseconds
    #[arg(long = "timeout-ms", default_value_t = 30_000)]
    timeout_ms: u64,

    /// Print the acting seat's view and chosen command every turn
    #[arg(long = "visualize", action = ArgAction::SetTrue)]
    visualize: bool,
}

/// Stands in for the transport: encodes every view and logs its size.
struct LogBroadcaster;

impl Broadcaster for LogBroadcaster {
    fn deliver(&self, match_id: &str, view: MatchView) {
        match encode_view(&view) {
            Ok(bytes) => debug!(
                "match {match_id}: {} bytes to seat {}",
                bytes.len(),
                view.self_seat
            ),
            Err(err) => warn!("match {match_id}: could not encode view: {err}"),
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(err) = run(args).await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let roster: Vec<SeatSpec> = (0..args.seats)
        .map(|index| {
            let seat = SeatSpec::new(format!("seat-{index}"), format!("Bot {index}"));
            if args.teams {
                seat.with_team((index % 2) as u8)
            } else {
                seat
            }
        })
        .collect();
    let mut builder = MatchBuilder::new(roster)?.with_seed(args.seed);
    if args.teams {
        builder = builder.with_team_mode();
    }
    let state = builder.build()?;

    let (clock, expired) = TokioTurnClock::new();
    let directory = Arc::new(MatchDirectory::new());
    let session = MatchSession::new(
        MATCH_ID,
        state,
        Arc::new(clock),
        Arc::new(LogBroadcaster),
        SessionConfig {
            turn_timeout: Duration::from_millis(args.timeout_ms),
        },
    );
    directory.insert(session.clone()).await;
    let timeouts = {
        let directory = Arc::clone(&directory);
        tokio::spawn(async move { directory.run_timeouts(expired).await })
    };
    session.start().await;

    let mut bots: Vec<RandomBot<StdRng>> = (0..args.seats)
        .map(|index| RandomBot::new(StdRng::seed_from_u64(args.seed ^ ((index as u64 + 1) * 0x9E37_79B9))))
        .collect();

    let mut turns = 0usize;
    let winner = loop {
        let (current, finished, winner) = session
            .inspect(|state| {
                (
                    state.current_seat().cloned(),
                    state.is_finished(),
                    state.winner().cloned(),
                )
            })
            .await;
        if finished {
            break winner;
        }
        if turns >= args.max_turns {
            println!("Max turn limit {} reached. Stopping simulation.", args.max_turns);
            break None;
        }
        let Some(seat) = current else {
            break None;
        };
        let legal = session
            .inspect(|state| state.legal_commands(&seat))
            .await?;
        let view = session.view_for(&seat).await?;
        let index = view.seat_index;
        let bot = bots
            .get_mut(index)
            .ok_or_else(|| format!("no bot for seat index {index}"))?;
        let Some(command) = bot.select_command(&view, &legal) else {
            warn!("seat {seat} has no legal command left, stopping simulation");
            break None;
        };
        if args.visualize {
            println!("{}", render_view(&view));
            println!("Chosen command: {}\n", describe_command(&view, &command));
        }
        session.apply(&seat, &command).await?;
        turns += 1;
    };

    directory.remove(MATCH_ID).await;
    timeouts.abort();
    match winner {
        Some(winner) => info!("match finished after {turns} commands, winner {winner}"),
        None => println!("Simulation stopped before completion."),
    }
    Ok(())
}

//! Treeline - Monte Carlo tree search batch runner
//!
//! Plays a batch of complete two-player game episodes, choosing every real
//! move with UCT tree search, then reports how often player 0 won. Episode
//! transcripts go to stdout, diagnostics to tracing.

use anyhow::{anyhow, Result};
use clap::Parser;
use game_core::StateManager;
use games_ledge::LedgeStateManager;
use games_nim::NimStateManager;
use mcts::{EpisodeDriver, EpisodeRecord, StartingPlayer};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};

mod central_config;
mod config;

use crate::config::Config;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()?;

    Ok(())
}

fn print_transcript<M: StateManager>(manager: &M, record: &EpisodeRecord<M::State>) {
    for (index, state) in record.history.iter().enumerate() {
        let previous = index.checked_sub(1).map(|i| &record.history[i]);
        println!("{}", manager.describe_transition(state, previous));
    }
}

/// Play the whole batch, building a fresh manager per episode so the game
/// and the search tree agree on who moves first even with a random
/// starting player.
fn run_batch<M, F>(make_manager: F, config: &Config, rng: &mut ChaCha20Rng) -> Result<()>
where
    M: StateManager,
    F: Fn(u8) -> M,
{
    let search = config.search_config();
    let mut wins = 0u32;

    for episode in 0..config.episodes {
        let starting_player = config.starting_player.resolve(rng);
        debug!(episode, starting_player, "starting episode");

        let manager = make_manager(starting_player);
        let driver = EpisodeDriver::new(
            &manager,
            search
                .clone()
                .with_starting_player(StartingPlayer::Fixed(starting_player))
                .with_episodes(1),
        )?;
        let record = driver.run_episode(rng)?;

        if !config.quiet {
            println!("Episode {episode}");
            print_transcript(&manager, &record);
            println!();
        }
        if record.winner == Some(0) {
            wins += 1;
        }
    }

    let win_rate = f64::from(wins) / f64::from(config.episodes);
    println!(
        "Player 0 wins {} of {} ({:.1}%)",
        wins,
        config.episodes,
        win_rate * 100.0
    );
    Ok(())
}

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;
    init_tracing(&config.log_level)?;

    info!(
        game = %config.game,
        episodes = config.episodes,
        simulations = config.simulations,
        exploration = config.exploration,
        starting_player = %config.starting_player,
        seed = ?config.seed,
        "starting batch run"
    );

    let mut rng = match config.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };

    match config.game.as_str() {
        "nim" => run_batch(
            |player| NimStateManager::new(config.nim_config(player)),
            &config,
            &mut rng,
        ),
        "ledge" => run_batch(
            |player| LedgeStateManager::new(config.ledge_config(player)),
            &config,
            &mut rng,
        ),
        other => Err(anyhow!("unknown game '{other}'")),
    }
}

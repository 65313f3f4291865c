//! Pixel Survivor headless runner
//!
//! Plays one autopilot run against the saved progression, credits the score,
//! records it on the leaderboard and writes everything back to disk.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use pixel_survivor::audio::{AudioMixer, LogSink};
use pixel_survivor::consts::FRAME_DT;
use pixel_survivor::highscores::{HighScoreEntry, HighScores};
use pixel_survivor::persistence::{PermanentUpgrade, SaveData};
use pixel_survivor::settings::Settings;
use pixel_survivor::sim::{GameEvent, GameState, Snapshot, TickInput, UpgradeId, tick};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Run seed. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Stop the run after this many simulated seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = 900.0)]
    max_seconds: f32,
    /// Progression save file.
    #[arg(long, value_name = "PATH", default_value = "pixel-survivor-save.json")]
    save: PathBuf,
    /// Settings file.
    #[arg(long, value_name = "PATH", default_value = "pixel-survivor-settings.json")]
    settings: PathBuf,
    /// Leaderboard file.
    #[arg(long, value_name = "PATH", default_value = "pixel-survivor-scores.json")]
    scores: PathBuf,
    /// Buy one level of a permanent upgrade before the run. Repeatable.
    #[arg(long = "buy", value_name = "UPGRADE", value_parser = parse_upgrade)]
    buy: Vec<PermanentUpgrade>,
    /// Start the run with one extra life.
    #[arg(long)]
    immortal: bool,
    /// Write the final snapshot as JSON.
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,
}

fn parse_upgrade(s: &str) -> Result<PermanentUpgrade, String> {
    PermanentUpgrade::from_name(s).ok_or_else(|| {
        format!("unknown upgrade '{s}' (vitality, damage, crit_chance, move_speed, attack_speed, luck)")
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    let settings = Settings::load(&args.settings)?;
    let mut save = SaveData::load(&args.save)?;
    let mut scores = HighScores::load(&args.scores)?;

    for upgrade in &args.buy {
        match save.purchase(*upgrade) {
            Ok(level) => log::info!("Bought {} level {}", upgrade.item().name, level),
            Err(err) => log::warn!("Could not buy {}: {}", upgrade.item().name, err),
        }
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Pixel Survivor starting run (seed {})", seed);

    let mut state = GameState::new(seed, &save.progression);
    if args.immortal {
        state.grant_upgrade(UpgradeId::Immortal);
    }
    let mut mixer = AudioMixer::from_settings(&settings, LogSink::default());
    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    while !state.is_over() && state.elapsed < args.max_seconds {
        tick(&mut state, &input, FRAME_DT);
        let events = state.drain_events();
        mixer.handle_events(&events);
        for event in &events {
            if let GameEvent::LevelUp { level } = event {
                log::debug!("Level {} reached at {:.1}s", level, state.elapsed);
            }
        }
    }

    let stats = state.stats();
    let final_score = state.final_score.unwrap_or(state.score);
    if state.is_over() {
        log::info!("Run over after {:.1}s", stats.elapsed);
    } else {
        log::info!("Time limit reached at {:.1}s", stats.elapsed);
    }
    log::info!(
        "Score {} | wave {} | level {} | kills {} | {} sounds",
        final_score,
        stats.wave,
        stats.level,
        stats.kills,
        mixer.sink().played
    );

    if let Some(path) = &args.snapshot {
        let json = serde_json::to_string_pretty(&Snapshot::capture(&state))
            .context("failed to serialize snapshot")?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    }

    save.award_run(final_score);
    save.save(&args.save)?;

    if let Some(rank) = scores.add(HighScoreEntry::from_stats(final_score, &stats)) {
        log::info!("New high score, rank #{}", rank);
        scores.save(&args.scores)?;
    }

    Ok(())
}

//! Whole-run flows driven through `tick`

use pixel_survivor::consts::FRAME_DT;
use pixel_survivor::highscores::{HighScoreEntry, HighScores};
use pixel_survivor::persistence::{PermanentUpgrade, SaveData};
use pixel_survivor::sim::{GameEvent, GamePhase, GameState, Snapshot, TickInput, WaveState, tick};
use pixel_survivor::Progression;

fn autopilot() -> TickInput {
    TickInput {
        autopilot: true,
        ..Default::default()
    }
}

fn run_for(state: &mut GameState, seconds: f32) -> Vec<GameEvent> {
    let input = autopilot();
    let mut events = Vec::new();
    let frames = (seconds / FRAME_DT) as u32;
    for _ in 0..frames {
        if state.is_over() {
            break;
        }
        tick(state, &input, FRAME_DT);
        events.extend(state.drain_events());
    }
    events
}

#[test]
fn test_same_seed_same_run() {
    let mut a = GameState::new(42, &Progression::default());
    let mut b = GameState::new(42, &Progression::default());
    run_for(&mut a, 60.0);
    run_for(&mut b, 60.0);

    assert_eq!(a.time_ticks, b.time_ticks);
    assert_eq!(a.score, b.score);
    assert_eq!(a.kills, b.kills);
    let snap_a = serde_json::to_string(&Snapshot::capture(&a)).unwrap();
    let snap_b = serde_json::to_string(&Snapshot::capture(&b)).unwrap();
    assert_eq!(snap_a, snap_b);
}

#[test]
fn test_autopilot_fights_waves() {
    let mut state = GameState::new(7, &Progression::default());
    let events = run_for(&mut state, 120.0);

    assert!(events.contains(&GameEvent::WaveStarted { wave: 1 }));
    assert!(events.contains(&GameEvent::PlayerShot));
    assert!(state.kills > 0);
    assert_eq!(state.score % 10, 0);

    let stats = state.stats();
    assert!(stats.wave >= 1);
    assert!(stats.enemies_defeated <= stats.enemies_to_spawn);
    assert!(state.player.hp <= state.player.stats.max_hp);
    assert!(state.player.jumps_left <= state.player.stats.max_jumps);
}

#[test]
fn test_pause_freezes_run() {
    let mut state = GameState::new(3, &Progression::default());
    run_for(&mut state, 1.0);
    let ticks = state.time_ticks;

    let pause = TickInput {
        pause: true,
        ..Default::default()
    };
    tick(&mut state, &pause, FRAME_DT);
    assert_eq!(state.phase, GamePhase::Paused);
    for _ in 0..30 {
        tick(&mut state, &TickInput::default(), FRAME_DT);
    }
    assert_eq!(state.time_ticks, ticks);

    tick(&mut state, &pause, FRAME_DT);
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.time_ticks, ticks + 1);
}

#[test]
fn test_death_awards_points_and_reset_starts_over() {
    let dir = std::env::temp_dir().join(format!("pixel-survivor-flow-{}", std::process::id()));
    let save_path = dir.join("save.json");
    let scores_path = dir.join("scores.json");

    let mut state = GameState::new(11, &Progression::default());
    tick(&mut state, &autopilot(), FRAME_DT);
    state.score = 250;
    state.player.hp = 0.0;
    state.player.invincibility = 0.0;
    tick(&mut state, &autopilot(), FRAME_DT);
    assert!(state.is_over());
    assert_eq!(state.final_score, Some(250));
    assert!(state.drain_events().contains(&GameEvent::GameOver { score: 250 }));

    let mut save = SaveData::default();
    save.award_run(250);
    assert_eq!(save.purchase(PermanentUpgrade::Vitality), Ok(1));
    save.save(&save_path).unwrap();

    let mut scores = HighScores::new();
    let entry = HighScoreEntry::from_stats(250, &state.stats());
    assert_eq!(scores.add(entry), Some(1));
    scores.save(&scores_path).unwrap();

    let loaded = SaveData::load(&save_path).unwrap();
    assert_eq!(loaded.total_points, 150);
    assert_eq!(HighScores::load(&scores_path).unwrap().top_score(), Some(250));

    state.reset(&loaded.progression);
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.player.stats.max_hp, 105.0);
    assert_eq!(state.player.hp, 105.0);
    assert_eq!(state.director.state, WaveState::Inactive);

    tick(&mut state, &autopilot(), FRAME_DT);
    assert_eq!(state.director.wave, 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

//! Headless runs driven by config files on disk.

use std::io::Write;

use crawl_core::class::ClassKind;
use crawl_core::config::GameConfig;
use crawl_headless::batch::{run_batch, BatchConfig};
use crawl_headless::runner::{run_autopilot, RunResult, DEFAULT_MAX_FRAMES};
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

const EASY_DUNGEON: &str = r"(
    seed: 9,
    dungeon: (normal_rooms: 1, enemies_per_room: (min: 1, max: 1)),
    enemy: (
        normal: (health: 1, damage: 5, speed: 100),
        elite: (health: 1, damage: 10, speed: 120),
    ),
    boss: (health: 1),
)";

#[test]
fn test_loaded_easy_dungeon_is_won_by_every_class() {
    let file = write_config(EASY_DUNGEON);
    let config = GameConfig::load(file.path()).expect("valid config");
    assert_eq!(config.seed, 9);

    for class in ClassKind::ALL {
        let report = run_autopilot(&config, class, DEFAULT_MAX_FRAMES).expect("run");
        assert_eq!(report.result, RunResult::Victory, "{class} should win");
        assert_eq!(report.seed, 9);
        assert_eq!(report.rooms_cleared, 2);
    }
}

#[test]
fn test_batch_uses_loaded_config() {
    let file = write_config(EASY_DUNGEON);
    let game = GameConfig::load(file.path()).expect("valid config");
    let summary = run_batch(&BatchConfig {
        game,
        count: 2,
        seed_start: 100,
        classes: vec![ClassKind::Ranged],
        max_frames: DEFAULT_MAX_FRAMES,
    })
    .expect("batch");

    assert_eq!(summary.total_runs, 2);
    assert_eq!(summary.classes[0].victories, 2);
    assert!(summary.runs.iter().all(|r| r.seed >= 100));
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let file = write_config("(dungeon: (enemies_per_room: (min: 0, max: 2)))");
    let err = GameConfig::load(file.path()).expect_err("zero enemies per room");
    assert!(err.to_string().contains("enemies_per_room"));
}

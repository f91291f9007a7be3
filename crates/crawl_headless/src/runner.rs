//! Single autopilot-driven run.

use crawl_core::class::ClassKind;
use crawl_core::config::GameConfig;
use crawl_core::math::{ratio, Fixed};
use crawl_core::simulation::{FrameEvents, RunOutcome, RunState, Simulation};
use serde::{Deserialize, Serialize};

use crate::autopilot::Autopilot;
use crate::error::HeadlessError;

/// Simulated frames per second.
pub const FRAMES_PER_SECOND: i32 = 60;

/// Default frame cap: ten minutes of game time.
pub const DEFAULT_MAX_FRAMES: u64 = 10 * 60 * FRAMES_PER_SECOND as u64;

/// Frame delta for headless runs.
#[must_use]
pub fn frame_dt() -> Fixed {
    ratio(1, FRAMES_PER_SECOND)
}

/// How a headless run finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunResult {
    /// Boss defeated and reward taken.
    Victory,
    /// Player died.
    Defeat,
    /// Frame cap reached first.
    Timeout,
}

impl From<RunOutcome> for RunResult {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Victory => Self::Victory,
            RunOutcome::Defeat => Self::Defeat,
        }
    }
}

/// Summary of one run, printed as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Class played.
    pub class: ClassKind,
    /// Dungeon seed.
    pub seed: u64,
    /// How the run ended.
    pub result: RunResult,
    /// Frames simulated.
    pub frames: u64,
    /// Rooms completed, the boss room included.
    pub rooms_cleared: usize,
    /// Final level.
    pub level: u32,
    /// Regular enemies killed, boss adds included.
    pub enemies_killed: u32,
    /// Whether the boss died.
    pub boss_killed: bool,
    /// Total damage dealt by the player.
    pub damage_dealt: u64,
    /// Total health lost.
    pub damage_taken: u64,
    /// Skills cast.
    pub skills_cast: u32,
    /// Health at the end of the run.
    pub final_health: u32,
    /// Reward equipped on victory.
    pub reward: Option<String>,
    /// Final [`Simulation::state_hash`].
    pub final_state_hash: u64,
}

impl RunReport {
    fn new(class: ClassKind, seed: u64) -> Self {
        Self {
            class,
            seed,
            result: RunResult::Timeout,
            frames: 0,
            rooms_cleared: 0,
            level: 1,
            enemies_killed: 0,
            boss_killed: false,
            damage_dealt: 0,
            damage_taken: 0,
            skills_cast: 0,
            final_health: 0,
            reward: None,
            final_state_hash: 0,
        }
    }

    fn record(&mut self, events: &FrameEvents) {
        self.enemies_killed += events.enemies_killed;
        self.boss_killed |= events.boss_killed;
        self.damage_dealt += events.hits.iter().map(|hit| u64::from(hit.amount)).sum::<u64>();
        self.damage_taken += u64::from(events.damage_taken);
        self.skills_cast += u32::try_from(events.skills_cast.len()).unwrap_or(u32::MAX);
    }

    /// Encode as a single JSON line.
    pub fn to_json(&self) -> Result<String, HeadlessError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Play one run of `class` with `config` under the autopilot.
///
/// On victory the first reward option is taken. The run stops after
/// `max_frames` frames if it has not ended by then.
pub fn run_autopilot(
    config: &GameConfig,
    class: ClassKind,
    max_frames: u64,
) -> Result<RunReport, HeadlessError> {
    let mut sim = Simulation::new(config.clone());
    sim.select_class(class)?;
    sim.start_run()?;

    let pilot = Autopilot::new(class);
    let mut report = RunReport::new(class, config.seed);
    let dt = frame_dt();

    while sim.state() == RunState::InRun && sim.frame() < max_frames {
        let input = pilot.decide(&sim);
        let events = sim.update(dt, &input);
        report.record(&events);
        if let Some(outcome) = events.outcome {
            report.result = outcome.into();
        }
    }

    if sim.state() == RunState::RewardSelection {
        report.reward = sim.reward_options().first().map(|item| item.name.clone());
        sim.select_reward(0);
        sim.confirm_reward()?;
    }

    report.frames = sim.frame();
    report.rooms_cleared = sim.dungeon().map_or(0, |dungeon| dungeon.rooms_cleared());
    if let Some(player) = sim.player() {
        report.level = player.level;
        report.final_health = player.health.current;
    }
    report.final_state_hash = sim.state_hash();

    tracing::info!(
        class = %class,
        seed = config.seed,
        result = ?report.result,
        frames = report.frames,
        rooms = report.rooms_cleared,
        "Run finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crawl_test_utils::fixtures::config_with_seed;

    #[test]
    fn test_run_stops_at_frame_cap() {
        let report = run_autopilot(&config_with_seed(3), ClassKind::Melee, 30).expect("run");
        assert_eq!(report.frames, 30);
        assert_eq!(report.result, RunResult::Timeout);
        assert_eq!(report.seed, 3);
        assert!(report.final_health > 0);
    }

    #[test]
    fn test_same_seed_same_report() {
        let config = config_with_seed(17);
        let a = run_autopilot(&config, ClassKind::Caster, 600).expect("run");
        let b = run_autopilot(&config, ClassKind::Caster, 600).expect("run");
        assert_eq!(a, b);
    }

    #[test]
    fn test_report_json_fields() {
        let report = run_autopilot(&config_with_seed(1), ClassKind::Ranged, 10).expect("run");
        let json = report.to_json().expect("encode");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["class"], "Ranged");
        assert_eq!(value["result"], "timeout");
        assert_eq!(value["frames"], 10);
        assert!(value["reward"].is_null());
    }

    #[test]
    fn test_easy_dungeon_is_won() {
        let mut config = config_with_seed(2);
        config.dungeon.normal_rooms = 1;
        config.dungeon.enemies_per_room.min = 1;
        config.dungeon.enemies_per_room.max = 1;
        config.enemy.normal.health = 1;
        config.enemy.elite.health = 1;
        config.boss.health = 1;

        let report = run_autopilot(&config, ClassKind::Ranged, DEFAULT_MAX_FRAMES).expect("run");
        assert_eq!(report.result, RunResult::Victory);
        assert!(report.boss_killed);
        assert_eq!(report.rooms_cleared, 2);
        assert!(report.reward.is_some());
    }
}

//! Scripted player for headless runs.
//!
//! The autopilot stands in for the keyboard and mouse: each frame it looks
//! at the simulation and produces the [`InputSnapshot`] a reasonable player
//! of the chosen class would send. It never touches simulation state.

use crawl_core::class::ClassKind;
use crawl_core::combat::{can_cast, Combatant};
use crawl_core::input::InputSnapshot;
use crawl_core::math::{Fixed, Vec2Fixed};
use crawl_core::player::Player;
use crawl_core::simulation::Simulation;
use crawl_core::skills::SkillKind;

/// Frames between basic attack clicks (four per second at 60 fps).
pub const ATTACK_INTERVAL_FRAMES: u64 = 15;

/// Axis distance under which the autopilot stops steering.
const DEADZONE: i32 = 4;

/// Something worth hitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// Body center.
    pub center: Vec2Fixed,
    /// Distance from the player's center.
    pub distance: Fixed,
}

/// Per-class playing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Autopilot {
    class: ClassKind,
    /// Preferred distance band to the target, `(min, max)`.
    band: (Fixed, Fixed),
}

impl Autopilot {
    /// Autopilot tuned for `class`.
    #[must_use]
    pub fn new(class: ClassKind) -> Self {
        let band = match class {
            ClassKind::Melee => (0, 35),
            ClassKind::Ranged => (120, 190),
            ClassKind::Caster => (90, 130),
        };
        Self {
            class,
            band: (Fixed::from_num(band.0), Fixed::from_num(band.1)),
        }
    }

    /// Class this autopilot plays.
    #[must_use]
    pub const fn class(&self) -> ClassKind {
        self.class
    }

    /// Input for the current frame.
    #[must_use]
    pub fn decide(&self, sim: &Simulation) -> InputSnapshot {
        let Some(player) = sim.player() else {
            return InputSnapshot::default();
        };

        let mut input = InputSnapshot::default();
        if sim.level_up_open() {
            input.allocate = Some(self.class.spec().primary_stat);
        }

        let origin = player.body.center();
        let Some(target) = nearest_target(sim, origin) else {
            return input;
        };
        input.aim = target.center;

        self.steer(&mut input, origin, target);

        if sim.frame() % ATTACK_INTERVAL_FRAMES == 0 && self.in_attack_reach(target) {
            input.attack = true;
        }

        let nearby = |radius: i32| count_within(sim, origin, Fixed::from_num(radius));
        for (slot, skill) in player.skills.iter().enumerate() {
            if !can_cast(player, skill) {
                continue;
            }
            let wanted = match skill.kind {
                SkillKind::Dash => target.distance > Fixed::from_num(150),
                SkillKind::Whirlwind => nearby(90) >= 2,
                SkillKind::BattleCry => target.distance <= self.class.attack_range(),
                SkillKind::MultiShot | SkillKind::PoisonArrow | SkillKind::Fireball => true,
                SkillKind::RetreatRoll => target.distance < Fixed::from_num(60),
                SkillKind::ManaShield => !player.mana_shield.active && is_hurt(player),
                SkillKind::FrostNova => nearby(120) >= 1,
                SkillKind::ArcaneDrain => nearby(150) >= 1,
            };
            if wanted {
                input = input.with_skill(slot);
            }
        }

        input
    }

    /// Close in when too far, back off when too close.
    fn steer(&self, input: &mut InputSnapshot, origin: Vec2Fixed, target: Target) {
        let (near, far) = self.band;
        let toward = if target.distance > far {
            true
        } else if target.distance < near {
            false
        } else {
            return;
        };

        let delta = target.center - origin;
        let deadzone = Fixed::from_num(DEADZONE);
        let (positive_x, negative_x) = (delta.x > deadzone, delta.x < -deadzone);
        let (positive_y, negative_y) = (delta.y > deadzone, delta.y < -deadzone);

        if toward {
            input.move_right = positive_x;
            input.move_left = negative_x;
            input.move_down = positive_y;
            input.move_up = negative_y;
        } else {
            input.move_right = negative_x;
            input.move_left = positive_x;
            input.move_down = negative_y;
            input.move_up = positive_y;
            // standing on the target: any way out will do
            if !input.is_moving() {
                input.move_right = true;
            }
        }
    }

    fn in_attack_reach(&self, target: Target) -> bool {
        match self.class {
            // bolts fly until they hit something or leave the room
            ClassKind::Ranged => true,
            ClassKind::Melee | ClassKind::Caster => target.distance <= self.class.attack_range(),
        }
    }
}

/// Closest living enemy, or the boss when no enemy is left closer.
#[must_use]
pub fn nearest_target(sim: &Simulation, origin: Vec2Fixed) -> Option<Target> {
    let enemies = sim
        .enemies()
        .iter()
        .filter(|enemy| enemy.alive)
        .map(|enemy| enemy.body.center());
    let boss = sim
        .boss()
        .filter(|boss| boss.is_alive())
        .map(|boss| boss.center());

    enemies
        .chain(boss)
        .map(|center| Target {
            center,
            distance: origin.distance(center),
        })
        .min_by_key(|target| target.distance)
}

fn count_within(sim: &Simulation, origin: Vec2Fixed, radius: Fixed) -> usize {
    sim.enemies()
        .iter()
        .filter(|enemy| enemy.alive && origin.distance(enemy.body.center()) <= radius)
        .count()
}

fn is_hurt(player: &Player) -> bool {
    player.health.current * 2 < player.health.max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crawl_test_utils::fixtures::{place_enemies, player_center, point, started_run};

    #[test]
    fn test_no_target_means_no_action() {
        let mut sim = started_run(ClassKind::Melee, 1);
        sim.enemies_mut().clear();
        let input = Autopilot::new(ClassKind::Melee).decide(&sim);
        assert_eq!(input, InputSnapshot::default());
    }

    #[test]
    fn test_melee_walks_toward_far_target() {
        let mut sim = started_run(ClassKind::Melee, 1);
        place_enemies(&mut sim, &[(120, -80)]);
        let input = Autopilot::new(ClassKind::Melee).decide(&sim);

        assert!(input.move_right && input.move_up);
        assert!(!input.move_left && !input.move_down);
        assert!(!input.attack);
        assert_eq!(input.aim, sim.enemies()[0].body.center());
    }

    #[test]
    fn test_melee_swings_in_reach() {
        let mut sim = started_run(ClassKind::Melee, 1);
        place_enemies(&mut sim, &[(30, 0)]);
        // frame 0 is an attack frame
        let input = Autopilot::new(ClassKind::Melee).decide(&sim);
        assert!(input.attack);
        assert!(!input.is_moving());
        // battle cry is wanted with the target in reach
        assert!(input.skills[2]);
    }

    #[test]
    fn test_ranged_backs_off() {
        let mut sim = started_run(ClassKind::Ranged, 1);
        place_enemies(&mut sim, &[(-40, 0)]);
        let input = Autopilot::new(ClassKind::Ranged).decide(&sim);

        assert!(input.move_right);
        assert!(!input.move_left);
        assert!(input.attack);
        // retreat roll and multi-shot
        assert!(input.skills[0] && input.skills[1]);
    }

    #[test]
    fn test_allocates_primary_stat_when_menu_open() {
        let mut sim = started_run(ClassKind::Caster, 1);
        place_enemies(&mut sim, &[(0, 2000)]);
        sim.player_mut().expect("run is active").stat_points = 3;
        sim.update(crawl_test_utils::fixtures::frame_dt(), &InputSnapshot::default());
        assert!(sim.level_up_open());

        let input = Autopilot::new(ClassKind::Caster).decide(&sim);
        assert_eq!(
            input.allocate,
            Some(crawl_core::stats::StatKind::Intelligence)
        );
    }

    #[test]
    fn test_nearest_target_prefers_closest() {
        let mut sim = started_run(ClassKind::Ranged, 1);
        place_enemies(&mut sim, &[(300, 0), (0, 100), (-200, 0)]);
        let origin = player_center(&sim);
        let target = nearest_target(&sim, origin).expect("enemies placed");
        assert_eq!(target.center, origin + point(0, 100));
        assert_eq!(target.distance, Fixed::from_num(100));
    }
}

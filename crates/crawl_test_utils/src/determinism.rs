//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a run produces identical results
//! given the same seed and the same input sequence.
//!
//! # Testing Strategy
//!
//! Replays, balance batches and bug reports all rely on a run being
//! reproducible from `(seed, class, inputs)`. Sources of non-determinism
//! include:
//!
//! - **Floating-point math**: We use fixed-point arithmetic via
//!   [`crawl_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Entities live in `Vec`s and are processed
//!   in list order.
//!
//! - **System randomness**: Dungeon layout and reward rolls come from a
//!   generator seeded by the config.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual behavior determinism (movement, combat, etc.)
//! 2. **Property tests**: Random input sequences still replay exactly
//! 3. **Parallel tests**: Running N runs on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use crawl_core::input::InputSnapshot;
use crawl_core::simulation::Simulation;

use crate::fixtures::frame_dt;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of frames simulated.
    pub frames: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Frames: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.frames,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `frames` - Number of frames to simulate per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance the state by one frame, given its index
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use crawl_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 10, || 0u64, |n, _| *n += 1, |n| *n);
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    frames: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for frame in 0..frames {
            step(&mut state, frame);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !is_deterministic {
        tracing::debug!(runs, frames, ?hashes, "Final state hashes differ");
    }

    DeterminismResult {
        is_deterministic,
        hashes,
        frames,
    }
}

/// Feed `inputs` to a simulation one frame each, at [`frame_dt`].
pub fn replay(sim: &mut Simulation, inputs: &[InputSnapshot]) {
    for input in inputs {
        sim.update(frame_dt(), input);
    }
}

/// Run the same setup twice with the same inputs and compare final hashes.
///
/// # Example
///
/// ```
/// use crawl_core::class::ClassKind;
/// use crawl_core::input::InputSnapshot;
/// use crawl_test_utils::determinism::verify_simulation_determinism;
/// use crawl_test_utils::fixtures::started_run;
///
/// let inputs = vec![InputSnapshot::default(); 60];
/// assert!(verify_simulation_determinism(|| started_run(ClassKind::Melee, 3), &inputs));
/// ```
pub fn verify_simulation_determinism<F>(setup_fn: F, inputs: &[InputSnapshot]) -> bool
where
    F: Fn() -> Simulation,
{
    let frames = inputs.len() as u64;
    let result = verify_determinism(
        2,
        frames,
        &setup_fn,
        |sim, frame| {
            if let Some(input) = usize::try_from(frame).ok().and_then(|i| inputs.get(i)) {
                sim.update(frame_dt(), input);
            }
        },
        Simulation::state_hash,
    );
    result.is_deterministic
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of frames each simulation ran.
    pub frames: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Frames: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.frames,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations_scoped<F>(
    setup_fn: F,
    num_sims: usize,
    inputs: &[InputSnapshot],
) -> ParallelSimResult
where
    F: Fn() -> Simulation + Sync,
{
    let setup = &setup_fn;
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(move || {
                    let mut sim = setup();
                    replay(&mut sim, inputs);
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    ParallelSimResult {
        hashes,
        frames: inputs.len() as u64,
        num_sims,
    }
}

/// Compare two runs frame-by-frame, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs stay identical, `Some(frame)` for the first frame
/// whose hashes differ (0 is the initial state).
pub fn find_first_divergence<F>(setup_fn: F, inputs: &[InputSnapshot]) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        tracing::debug!("Simulations differ before the first frame");
        return Some(0);
    }

    for (frame, input) in (1..).zip(inputs) {
        sim1.update(frame_dt(), input);
        sim2.update(frame_dt(), input);

        let (first, second) = (sim1.state_hash(), sim2.state_hash());
        if first != second {
            tracing::debug!(frame, first, second, "Simulations diverged");
            return Some(frame);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of run determinism.
pub mod strategies {
    use crawl_core::class::ClassKind;
    use crawl_core::effects::{Effect, EffectKind};
    use crawl_core::input::{InputSnapshot, SKILL_SLOTS};
    use crawl_core::math::{Fixed, Vec2Fixed};
    use crawl_core::stats::StatKind;
    use proptest::prelude::*;

    /// Generate a world point inside the first rooms of a default dungeon.
    pub fn arb_aim() -> impl Strategy<Value = Vec2Fixed> {
        (0i32..2000, 0i32..600).prop_map(|(x, y)| Vec2Fixed::from_ints(x, y))
    }

    /// Generate a class.
    pub fn arb_class() -> impl Strategy<Value = ClassKind> {
        prop::sample::select(ClassKind::ALL.to_vec())
    }

    /// Generate a stat.
    pub fn arb_stat() -> impl Strategy<Value = StatKind> {
        prop::sample::select(StatKind::ALL.to_vec())
    }

    /// Generate a run seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Generate one frame of input.
    pub fn arb_input_snapshot() -> impl Strategy<Value = InputSnapshot> {
        (
            any::<[bool; 4]>(),
            any::<bool>(),
            proptest::option::of(0..SKILL_SLOTS),
            arb_aim(),
            proptest::option::of(arb_stat()),
        )
            .prop_map(|([up, down, left, right], attack, skill, aim, allocate)| {
                let mut input = InputSnapshot {
                    move_up: up,
                    move_down: down,
                    move_left: left,
                    move_right: right,
                    attack,
                    aim,
                    allocate,
                    ..InputSnapshot::default()
                };
                if let Some(slot) = skill {
                    input = input.with_skill(slot);
                }
                input
            })
    }

    /// Generate a sequence of inputs.
    pub fn arb_input_sequence(max_len: usize) -> impl Strategy<Value = Vec<InputSnapshot>> {
        proptest::collection::vec(arb_input_snapshot(), 0..max_len)
    }

    /// Generate health values (1-1000).
    pub fn arb_health() -> impl Strategy<Value = u32> {
        1u32..1000u32
    }

    /// Generate damage values (1-100).
    pub fn arb_damage() -> impl Strategy<Value = u32> {
        1u32..100u32
    }

    /// Generate a timed effect lasting 1 to 10 seconds.
    pub fn arb_effect() -> impl Strategy<Value = Effect> {
        (
            prop::sample::select(vec![
                EffectKind::Slow,
                EffectKind::Stun,
                EffectKind::Silence,
                EffectKind::DamageReduction,
                EffectKind::DamageBoost,
                EffectKind::MoveSpeedBoost,
            ]),
            1i32..10,
            0i32..100,
        )
            .prop_map(|(kind, seconds, percent)| {
                Effect::timed(
                    kind,
                    Fixed::from_num(seconds),
                    Fixed::from_num(percent) / Fixed::from_num(100),
                )
            })
    }
}

//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! A session must be a pure function of its rules, participants and input
//! stream, otherwise replays stop verifying. Sources of non-determinism
//! include:
//!
//! - **Hash map iteration order**: the registry indexes minions in a
//!   `BTreeMap` and hashes in uid order.
//! - **Wall-clock time**: the host passes elapsed seconds to `tick`.
//! - **System randomness**: none is used anywhere in the core.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: each module checks its own operations
//! 2. **Property tests**: random scripts must still produce identical hashes
//! 3. **Parallel tests**: running N sessions on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use skirmish_core::session::MatchSession;

use crate::fixtures::{apply_step, ScriptStep};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: usize,
}

impl DeterminismResult {
    /// All distinct hashes (one for a deterministic session).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Session is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a setup-plus-script several times and compare final hashes.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `setup` - Creates the initial state
/// * `script` - Inputs applied in order
/// * `step` - Applies one input
/// * `hash` - Computes the state hash
pub fn verify_determinism<S, I, Setup, Step, HashFn>(
    runs: usize,
    setup: Setup,
    script: &[I],
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, &I),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for input in script {
            step(&mut state, input);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps: script.len(),
    }
}

/// Run a session script twice and check the final hashes match.
pub fn verify_session_determinism<F>(setup_fn: F, script: &[ScriptStep]) -> bool
where
    F: Fn() -> MatchSession,
{
    verify_determinism(2, &setup_fn, script, apply_step, MatchSession::state_hash)
        .is_deterministic
}

/// Run `num_sessions` copies of a script on scoped threads and collect the
/// final hashes.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_sessions_scoped<F>(
    setup_fn: F,
    script: &[ScriptStep],
    num_sessions: usize,
) -> DeterminismResult
where
    F: Fn() -> MatchSession + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sessions)
            .map(|_| {
                s.spawn(|| {
                    let mut session = setup_fn();
                    for step in script {
                        apply_step(&mut session, step);
                    }
                    session.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("session thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: script.len(),
    }
}

/// Compare two runs step by step and report the first step after which
/// their hashes differ. `Some(0)` means the setups already differ.
pub fn find_first_divergence<F>(setup_fn: F, script: &[ScriptStep]) -> Option<usize>
where
    F: Fn() -> MatchSession,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for (index, step) in script.iter().enumerate() {
        apply_step(&mut first, step);
        apply_step(&mut second, step);
        if first.state_hash() != second.state_hash() {
            return Some(index + 1);
        }
    }

    None
}

/// Check that a serialize/deserialize round-trip keeps the state hash.
pub fn verify_serialization_determinism<F>(setup_fn: F, script: &[ScriptStep]) -> bool
where
    F: Fn() -> MatchSession,
{
    let mut session = setup_fn();
    for step in script {
        apply_step(&mut session, step);
    }
    let hash_before = session.state_hash();

    let Ok(bytes) = session.serialize() else {
        return false;
    };
    let Ok(restored) = MatchSession::deserialize(&bytes) else {
        return false;
    };

    restored.state_hash() == hash_before
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for match scripts.
///
/// Tiles deliberately include a few out-of-range indices and seats include
/// an empty one, so scripts exercise rejections as well as play.
pub mod strategies {
    use proptest::prelude::*;
    use skirmish_core::grid::TILE_COUNT;
    use skirmish_core::session::Command;

    use crate::fixtures::{species, ScriptStep};

    /// A tile index, occasionally off the board.
    pub fn arb_tile() -> impl Strategy<Value = usize> {
        prop_oneof![
            9 => 0..TILE_COUNT,
            1 => TILE_COUNT..TILE_COUNT + 5,
        ]
    }

    /// A species id from the default roster, occasionally an unknown one.
    pub fn arb_species() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("power".to_string()),
            Just("speed".to_string()),
            Just("technical".to_string()),
            Just("dragon".to_string()),
        ]
    }

    /// Any command.
    pub fn arb_command() -> impl Strategy<Value = Command> {
        prop_oneof![
            (arb_species(), arb_tile()).prop_map(|(s, tile)| Command::Spawn {
                species: species(&s),
                tile,
            }),
            (arb_tile(), arb_tile()).prop_map(|(from, to)| Command::Move { from, to }),
            (arb_tile(), arb_tile()).prop_map(|(from, to)| Command::Attack { from, to }),
            (arb_species(), arb_tile(), arb_tile()).prop_map(|(s, tile, to)| {
                Command::SpawnAndMove {
                    species: species(&s),
                    tile,
                    to,
                }
            }),
        ]
    }

    /// Spawn commands aimed at the two seated spawn corners, which succeed
    /// far more often than uniformly random ones.
    pub fn arb_corner_spawn() -> impl Strategy<Value = Command> {
        (arb_species(), prop_oneof![Just(0usize), Just(24usize)], 0..TILE_COUNT).prop_map(
            |(s, tile, to)| Command::SpawnAndMove {
                species: species(&s),
                tile,
                to,
            },
        )
    }

    /// One script step. Seat 2 is empty and acts as a stranger.
    pub fn arb_step() -> impl Strategy<Value = ScriptStep> {
        prop_oneof![
            6 => (0u8..3, arb_command()).prop_map(|(seat, command)| ScriptStep::Command { seat, command }),
            3 => (0u8..2, arb_corner_spawn()).prop_map(|(seat, command)| ScriptStep::Command { seat, command }),
            1 => (0u32..60).prop_map(ScriptStep::Tick),
        ]
    }

    /// A script of up to `max_len` steps.
    pub fn arb_script(max_len: usize) -> impl Strategy<Value = Vec<ScriptStep>> {
        proptest::collection::vec(arb_step(), 0..max_len)
    }
}

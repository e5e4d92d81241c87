//! Data structures for match configuration.
//!
//! Species templates and match rules are plain data, designed to be
//! deserialized from RON. Loading helpers live on [`MatchRules`].

mod rules_data;
mod species_data;

pub use rules_data::{
    MatchRules, GRAVEYARD_SIZE, INITIAL_RESOURCES, MAX_BENCH_SIZE, MAX_MOVEMENT, TIME_PER_TURN,
};
pub use species_data::{MinionData, MinionStats, SpeciesId};

//! Species templates for data-driven minion definitions.

use serde::{Deserialize, Serialize};

/// Identifier of a minion species (e.g. `"power"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(String);

impl SpeciesId {
    /// Create a species id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SpeciesId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Baseline numbers of a species, copied into every minion spawned from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinionStats {
    /// Damage dealt in combat.
    pub power: i32,
    /// Hit points.
    pub health: i32,
    /// Tiles that can be walked per turn.
    pub movement: u32,
    /// Resources spent to spawn.
    pub cost: u32,
}

/// Immutable species template.
///
/// # Example RON
///
/// ```ron
/// MinionData(
///     id: "technical",
///     power: 2,
///     health: 3,
///     movement: 2,
///     cost: 1,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinionData {
    /// Unique species identifier.
    pub id: SpeciesId,

    /// Damage dealt in combat.
    pub power: i32,

    /// Hit points.
    pub health: i32,

    /// Tiles that can be walked per turn.
    pub movement: u32,

    /// Resources spent to spawn.
    #[serde(default = "default_cost")]
    pub cost: u32,
}

/// Default spawn cost for species without an explicit cost.
const fn default_cost() -> u32 {
    1
}

impl MinionData {
    /// Create a species template.
    #[must_use]
    pub fn new(id: impl Into<String>, power: i32, health: i32, movement: u32, cost: u32) -> Self {
        Self {
            id: SpeciesId::new(id),
            power,
            health,
            movement,
            cost,
        }
    }

    /// Baseline stats for a freshly spawned minion.
    #[must_use]
    pub const fn stats(&self) -> MinionStats {
        MinionStats {
            power: self.power,
            health: self.health,
            movement: self.movement,
            cost: self.cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_copy_template() {
        let species = MinionData::new("speed", 1, 2, 3, 1);
        let stats = species.stats();
        assert_eq!(stats.power, 1);
        assert_eq!(stats.health, 2);
        assert_eq!(stats.movement, 3);
        assert_eq!(stats.cost, 1);
    }

    #[test]
    fn test_parse_ron_with_default_cost() {
        let species: MinionData =
            ron::from_str(r#"MinionData(id: "power", power: 3, health: 2, movement: 1)"#).unwrap();
        assert_eq!(species.id.as_str(), "power");
        assert_eq!(species.cost, 1);
    }

    #[test]
    fn test_species_id_display() {
        assert_eq!(SpeciesId::from("technical").to_string(), "technical");
    }
}

//! Replay system for recording and playing back matches.
//!
//! A replay stores the rules, the participants and every entry the session
//! was asked to apply. Re-running the entries on a fresh session reproduces
//! the match exactly, which the recorded final hash lets us verify.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{MatchRules, SpeciesId};
use crate::economy::PlayerId;
use crate::error::{GameError, Result};
use crate::grid::PlayerIndex;
use crate::session::{Command, MatchSession};

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// One recorded input to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayEntry {
    /// A player command, accepted or not.
    Command {
        /// Who issued it.
        actor: PlayerId,
        /// What they asked for.
        command: Command,
    },
    /// The turn clock advanced.
    Tick {
        /// Seconds elapsed.
        elapsed: u32,
    },
    /// The host placed a minion directly.
    Deploy {
        /// Owning seat.
        owner: PlayerIndex,
        /// Species placed.
        species: SpeciesId,
        /// Tile placed on.
        tile: usize,
        /// Whether it was a token.
        is_token: bool,
    },
}

/// Complete replay data structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Rules the match ran under.
    pub rules: MatchRules,
    /// Participants as supplied to the session.
    pub participants: Vec<PlayerId>,
    /// Everything applied to the session, in order.
    pub entries: Vec<ReplayEntry>,
    /// State hash after the last entry.
    pub final_hash: u64,
}

impl Replay {
    /// Capture a session's history and current hash.
    #[must_use]
    pub fn from_session(session: &MatchSession) -> Self {
        Self {
            version: REPLAY_VERSION,
            rules: session.rules().clone(),
            participants: session.participants().to_vec(),
            entries: session.history().to_vec(),
            final_hash: session.state_hash(),
        }
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-run the whole replay and check the final hash.
    ///
    /// # Errors
    ///
    /// Returns session errors from setup or any entry, and
    /// `ReplayMismatch` if the final state differs from the recording.
    pub fn play(&self) -> Result<MatchSession> {
        let mut player = ReplayPlayer::new(self.clone())?;
        player.run_to_end()?;
        let actual = player.session().state_hash();
        if actual != self.final_hash {
            return Err(GameError::ReplayMismatch {
                expected: self.final_hash,
                actual,
            });
        }
        Ok(player.into_session())
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` or `Io` on failure.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = bincode::serialize(self).map_err(|e| GameError::Serialization(e.to_string()))?;
        std::fs::write(path, bytes).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), entries = self.len(), "Replay saved");
        Ok(())
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    ///
    /// Returns `Io`, `Serialization`, or `ReplayVersion` for a file from an
    /// incompatible format.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let replay: Self =
            bincode::deserialize(&bytes).map_err(|e| GameError::Serialization(e.to_string()))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::ReplayVersion {
                expected: REPLAY_VERSION,
                found: replay.version,
            });
        }

        Ok(replay)
    }
}

/// Step-by-step playback of a replay.
#[derive(Debug)]
pub struct ReplayPlayer {
    replay: Replay,
    session: MatchSession,
    cursor: usize,
}

impl ReplayPlayer {
    /// Create a player positioned before the first entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the recorded rules or participants are invalid.
    pub fn new(replay: Replay) -> Result<Self> {
        let session = MatchSession::new(replay.rules.clone(), &replay.participants)?;
        Ok(Self {
            replay,
            session,
            cursor: 0,
        })
    }

    /// Apply the next entry. Returns false once every entry has run.
    ///
    /// # Errors
    ///
    /// Propagates session errors.
    pub fn step(&mut self) -> Result<bool> {
        let Some(entry) = self.replay.entries.get(self.cursor) else {
            return Ok(false);
        };
        self.session.apply(entry)?;
        self.cursor += 1;
        Ok(true)
    }

    /// Apply every remaining entry.
    ///
    /// # Errors
    ///
    /// Propagates session errors.
    pub fn run_to_end(&mut self) -> Result<()> {
        while self.step()? {}
        Ok(())
    }

    /// Restart and play up to (not including) entry `target`.
    ///
    /// # Errors
    ///
    /// Propagates session errors.
    pub fn seek(&mut self, target: usize) -> Result<()> {
        self.session = MatchSession::new(self.replay.rules.clone(), &self.replay.participants)?;
        self.cursor = 0;
        while self.cursor < target && self.step()? {}
        Ok(())
    }

    /// Entries applied so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor
    }

    /// Returns true once every entry has been applied.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.replay.entries.len()
    }

    /// The session being driven.
    #[must_use]
    pub const fn session(&self) -> &MatchSession {
        &self.session
    }

    /// Consume the player, keeping the session.
    #[must_use]
    pub fn into_session(self) -> MatchSession {
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded_session() -> MatchSession {
        let alice = PlayerId::from("alice");
        let bob = PlayerId::from("bob");
        let mut session =
            MatchSession::new(MatchRules::default(), &[alice.clone(), bob.clone()]).unwrap();
        session
            .deploy_token(PlayerIndex::SECOND, &SpeciesId::from("speed"), 10)
            .unwrap();
        session
            .handle_command(
                &alice,
                Command::Spawn {
                    species: SpeciesId::from("technical"),
                    tile: 0,
                },
            )
            .unwrap();
        session.tick(20);
        session
            .handle_command(
                &bob,
                Command::Spawn {
                    species: SpeciesId::from("power"),
                    tile: 24,
                },
            )
            .unwrap();
        session
            .handle_command(&alice, Command::Attack { from: 0, to: 10 })
            .unwrap();
        session
    }

    #[test]
    fn test_replay_reproduces_hash() {
        let session = recorded_session();
        let replay = Replay::from_session(&session);
        assert_eq!(replay.len(), 5);

        let replayed = replay.play().unwrap();
        assert_eq!(replayed.state_hash(), session.state_hash());
    }

    #[test]
    fn test_tampered_hash_is_mismatch() {
        let mut replay = Replay::from_session(&recorded_session());
        replay.final_hash ^= 1;
        assert!(matches!(
            replay.play(),
            Err(GameError::ReplayMismatch { .. })
        ));
    }

    #[test]
    fn test_save_load() {
        let replay = Replay::from_session(&recorded_session());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.replay");

        replay.save(&path).unwrap();
        let loaded = Replay::load(&path).unwrap();

        assert_eq!(loaded.entries, replay.entries);
        assert_eq!(loaded.final_hash, replay.final_hash);
        assert_eq!(loaded.participants, replay.participants);
    }

    #[test]
    fn test_load_rejects_other_version() {
        let mut replay = Replay::from_session(&recorded_session());
        replay.version = REPLAY_VERSION + 1;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.replay");
        replay.save(&path).unwrap();

        assert!(matches!(
            Replay::load(&path),
            Err(GameError::ReplayVersion { .. })
        ));
    }

    #[test]
    fn test_player_step_and_seek() {
        let replay = Replay::from_session(&recorded_session());
        let mut player = ReplayPlayer::new(replay).unwrap();

        assert!(player.step().unwrap());
        assert_eq!(player.position(), 1);
        assert_eq!(player.session().state().battlefield.minions().len(), 1);

        player.run_to_end().unwrap();
        assert!(player.is_finished());
        assert!(!player.step().unwrap());

        player.seek(2).unwrap();
        assert_eq!(player.position(), 2);
        assert_eq!(player.session().state().current_player, PlayerIndex::SECOND);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Replay::load(dir.path().join("absent.replay")),
            Err(GameError::Io { .. })
        ));
    }
}

//! Headless match runner implementation.
//!
//! Reads protocol commands line by line, drives a [`MatchSession`] and writes
//! exactly one response per non-blank line.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use thiserror::Error;

use skirmish_core::data::{MatchRules, SpeciesId};
use skirmish_core::economy::PlayerId;
use skirmish_core::error::GameError;
use skirmish_core::grid::PlayerIndex;
use skirmish_core::replay::Replay;
use skirmish_core::session::{CommandOutcome, MatchSession};

use crate::protocol::{Command, Response};

/// Errors that stop the runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The match could not be set up or the replay not saved.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Reading input or writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Headless runner configuration.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Rules for the match.
    pub rules: MatchRules,
    /// Participants in seat order.
    pub players: Vec<PlayerId>,
    /// Where to save the replay when the runner stops.
    pub record: Option<PathBuf>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            rules: MatchRules::default(),
            players: vec![PlayerId::from("alice"), PlayerId::from("bob")],
            record: None,
        }
    }
}

/// Drives one match from protocol commands.
#[derive(Debug)]
pub struct HeadlessRunner {
    config: HeadlessConfig,
    session: MatchSession,
}

impl HeadlessRunner {
    /// Start a match from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules or participant list are invalid.
    pub fn new(config: HeadlessConfig) -> Result<Self, RunnerError> {
        let session = MatchSession::new(config.rules.clone(), &config.players)?;
        Ok(Self { config, session })
    }

    /// The running session.
    #[must_use]
    pub const fn session(&self) -> &MatchSession {
        &self.session
    }

    /// Response announcing the runner.
    #[must_use]
    pub fn ready(&self) -> Response {
        Response::ready(self.session.participants())
    }

    /// Handle one raw input line. Blank lines produce no response.
    pub fn handle_line(&mut self, line: &str) -> Option<Response> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match Command::from_json(line) {
            Ok(command) => Some(self.handle(&command)),
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable command");
                Some(Response::error(format!("Invalid command: {e}"), None))
            }
        }
    }

    /// Handle one parsed command.
    pub fn handle(&mut self, command: &Command) -> Response {
        let name = command.name();
        tracing::debug!(cmd = name, "Processing command");

        if let Some((actor, core)) = command.to_core() {
            return match self.session.handle_command(&actor, core) {
                Ok(CommandOutcome::Rejected { reason }) => Response::InvalidAction {
                    cmd: name.to_string(),
                    reason,
                    message: reason.to_string(),
                },
                Ok(outcome) => Response::Outcome {
                    cmd: name.to_string(),
                    outcome,
                    events: self.session.events().to_vec(),
                },
                Err(e) => Response::error(e.to_string(), Some(name)),
            };
        }

        match command {
            Command::Tick { elapsed } => {
                let turn_changed = self.session.tick(*elapsed);
                let events = if turn_changed {
                    self.session.events().to_vec()
                } else {
                    Vec::new()
                };
                Response::Ticked {
                    turn_changed,
                    timer: self.session.state().timer,
                    events,
                }
            }
            Command::Query => Response::State {
                hash: self.session.state_hash(),
                snapshot: self.session.snapshot(),
            },
            Command::Hash => Response::StateHash {
                hash: self.session.state_hash(),
            },
            Command::Reach { tile } => Response::Reach {
                tile: *tile,
                tiles: self.session.reach_from(*tile),
            },
            Command::Deploy {
                owner,
                species,
                tile,
                token,
            } => {
                let owner = PlayerIndex(*owner);
                let species = SpeciesId::from(species.as_str());
                let deployed = if *token {
                    self.session.deploy_token(owner, &species, *tile)
                } else {
                    self.session.deploy_unit(owner, &species, *tile)
                };
                match deployed {
                    Ok(uid) => Response::Deployed { uid: uid.0 },
                    Err(e) => Response::error(e.to_string(), Some(name)),
                }
            }
            Command::Join { player } => {
                self.session.on_player_joined(&PlayerId::from(player.as_str()));
                Response::ack(name)
            }
            Command::Leave { player } => {
                self.session.on_player_left(&PlayerId::from(player.as_str()));
                Response::ack(name)
            }
            Command::Quit => Response::Bye,
            // Player commands were handled above.
            _ => Response::error("unhandled command", Some(name)),
        }
    }

    /// Run until `quit` or end of input, then save the replay if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, writing or saving the replay fails.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<(), RunnerError> {
        tracing::info!(players = ?self.config.players, "Headless runner started");
        write_response(&mut output, &self.ready())?;

        let mut quit = false;
        for line in input.lines() {
            let line = line?;
            let Some(response) = self.handle_line(&line) else {
                continue;
            };
            quit = matches!(response, Response::Bye);
            write_response(&mut output, &response)?;
            if quit {
                break;
            }
        }

        if !quit {
            tracing::info!("Input closed");
        }
        self.save_replay()?;
        tracing::info!(
            entries = self.session.history().len(),
            state_hash = self.session.state_hash(),
            "Headless runner stopped"
        );
        Ok(())
    }

    fn save_replay(&self) -> Result<(), RunnerError> {
        if let Some(path) = &self.config.record {
            Replay::from_session(&self.session).save(path)?;
        }
        Ok(())
    }
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> io::Result<()> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()
}

// ═══════════════════════════════════════════════════════════════════════
// Human Strategy — orders typed by a person.
//
// Lines come from a `CommandSource` (stdin in the runner, a script in
// tests). Malformed or out-of-phase text is reported back and the player
// is asked again; `commit` or end of input finishes the round.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::Strategy;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use warzone_engine::command::Command;
use warzone_engine::engine::Action;
use warzone_engine::types::*;

/// Where a human player's command lines come from.
pub trait CommandSource: Send {
    /// Next line of input, or `None` once the source is exhausted.
    fn next_line(&mut self, prompt: &str) -> Option<String>;

    /// Feedback for the last line (parse errors and the like).
    fn notify(&mut self, _message: &str) {}
}

/// Reads commands from standard input.
pub struct StdinSource;

impl CommandSource for StdinSource {
    fn next_line(&mut self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        io::stdout().flush().ok()?;
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    }

    fn notify(&mut self, message: &str) {
        println!("  ! {}", message);
    }
}

/// Replays a fixed list of lines.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    lines: VecDeque<String>,
    pub messages: Vec<String>,
}

impl ScriptedSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedSource { lines: lines.into_iter().map(Into::into).collect(), messages: Vec::new() }
    }
}

impl CommandSource for ScriptedSource {
    fn next_line(&mut self, _prompt: &str) -> Option<String> {
        self.lines.pop_front()
    }

    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

pub struct HumanStrategy<S: CommandSource> {
    player: String,
    source: S,
}

impl<S: CommandSource> HumanStrategy<S> {
    pub fn new(player: &str, source: S) -> Self {
        HumanStrategy { player: player.to_string(), source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: CommandSource> Strategy for HumanStrategy<S> {
    fn name(&self) -> &str {
        "Human"
    }

    fn player(&self) -> &str {
        &self.player
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Human
    }

    fn next_order(&mut self, state: &GameState) -> Action {
        let pool = state.player(&self.player).map_or(0, |p| p.undeployed());
        let prompt = format!("[round {}] {} ({} to deploy)> ", state.round, self.player, pool);

        loop {
            let Some(line) = self.source.next_line(&prompt) else { return Action::Done };
            if line.trim().is_empty() {
                continue;
            }
            let parsed = Command::parse(&line).and_then(|command| match command {
                Command::Commit => Ok(Action::Done),
                Command::Order(order) => order.resolve(&state.map).map(Action::Issue),
                other => Err(warzone_engine::EngineError::InvalidForPhase {
                    command: other.name().to_string(),
                    phase: state.phase,
                }),
            });
            match parsed {
                Ok(action) => return action,
                Err(e) => {
                    tracing::debug!(target: "warzone::agents", player = %self.player, input = %line.trim(), error = %e, "input rejected");
                    self.source.notify(&e.to_string());
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Game log — tagged text lines for the rendering/log collaborator.
//
// Every transition appends a `LogEntry` to `GameState::log` and mirrors it
// to `tracing`, so a subscriber sees the same audit trail a UI would.
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogTag {
    Command,
    Order,
    Phase,
    Effect,
    Start,
    End,
    Error,
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogTag::Command => "command",
            LogTag::Order => "order",
            LogTag::Phase => "phase",
            LogTag::Effect => "effect",
            LogTag::Start => "start",
            LogTag::End => "end",
            LogTag::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub tag: LogTag,
    pub round: u32,
    pub text: String,
}

impl LogEntry {
    pub fn new(tag: LogTag, round: u32, text: impl Into<String>) -> Self {
        LogEntry { tag, round, text: text.into() }
    }

    pub fn is_error(&self) -> bool {
        self.tag == LogTag::Error
    }

    /// Forward this entry to the tracing subscriber.
    pub fn emit(&self) {
        match self.tag {
            LogTag::Error => {
                tracing::warn!(target: "warzone::log", round = self.round, tag = %self.tag, "{}", self.text)
            }
            LogTag::Start | LogTag::End | LogTag::Phase => {
                tracing::info!(target: "warzone::log", round = self.round, tag = %self.tag, "{}", self.text)
            }
            _ => tracing::debug!(target: "warzone::log", round = self.round, tag = %self.tag, "{}", self.text),
        }
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] r{}: {}", self.tag, self.round, self.text)
    }
}

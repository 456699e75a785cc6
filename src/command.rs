// Copyright (c) 2026 rezky_nightky

use std::time::Instant;

use crate::glitch::GlitchEffect;
use crate::rain::Rain;

pub const PROMPT: &str = "root@portfolio:~$";

const HELP_RESPONSE: &str =
    "Available commands: help, about, skills, projects, contact, clear, matrix, glitch";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CommandAction {
    Respond(&'static str),
    Clear,
    ToggleRain,
    TriggerGlitch,
}

/// Static command table; keys are matched after trim + lowercase.
const COMMANDS: &[(&str, CommandAction)] = &[
    ("help", CommandAction::Respond(HELP_RESPONSE)),
    (
        "about",
        CommandAction::Respond("Systems developer | Terminal UI enthusiast"),
    ),
    (
        "skills",
        CommandAction::Respond("Rust, Crossterm, Linux, Docker, CI pipelines"),
    ),
    (
        "projects",
        CommandAction::Respond("cosmostrix, termfolio, nightky-dotfiles"),
    ),
    (
        "contact",
        CommandAction::Respond("Email: rezky@example.com | GitHub: oxyzenq"),
    ),
    ("clear", CommandAction::Clear),
    ("matrix", CommandAction::ToggleRain),
    ("glitch", CommandAction::TriggerGlitch),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Echo,
    Response,
    Error,
}

#[derive(Clone, Debug)]
pub struct LogLine {
    pub kind: LineKind,
    pub text: String,
}

/// The fake prompt: one input buffer, an append-only history with a
/// recall cursor, and the output log. Inert until an output log element
/// is attached.
pub struct CommandLine {
    input: String,
    history: Vec<String>,
    cursor: usize,
    log: Vec<LogLine>,
    attached: bool,
}

impl CommandLine {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            history: Vec::new(),
            cursor: 0,
            log: Vec::new(),
            attached: false,
        }
    }

    /// Wires the component to a registered output log element. Without
    /// this the whole feature stays inert.
    pub fn attach(&mut self) {
        self.attached = true;
    }

    #[allow(dead_code)]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn log(&self) -> &[LogLine] {
        &self.log
    }

    pub fn push_char(&mut self, ch: char) {
        if self.attached {
            self.input.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn append_response_lines<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) {
        if !self.attached {
            return;
        }
        for line in lines {
            self.log.push(LogLine {
                kind: LineKind::Response,
                text: line.to_string(),
            });
        }
    }

    /// Executes the current input buffer: echo, table lookup, component
    /// side effects, then clear the buffer. Status lines for component
    /// actions are derived from the component's state afterwards.
    pub fn submit(&mut self, rain: &mut Rain, glitch: &mut GlitchEffect, now: Instant) {
        if !self.attached {
            return;
        }

        let command = self.input.trim().to_lowercase();
        self.history.push(command.clone());
        self.cursor = self.history.len();
        self.input.clear();

        self.log.push(LogLine {
            kind: LineKind::Echo,
            text: format!("{} {}", PROMPT, command),
        });

        let action = COMMANDS
            .iter()
            .find(|(name, _)| *name == command)
            .map(|(_, a)| *a);

        let response = match action {
            None => {
                self.log.push(LogLine {
                    kind: LineKind::Error,
                    text: format!(
                        "Command not found: {}. Type 'help' for available commands.",
                        command
                    ),
                });
                return;
            }
            Some(CommandAction::Clear) => {
                self.log.clear();
                return;
            }
            Some(CommandAction::Respond(text)) => text.to_string(),
            Some(CommandAction::ToggleRain) => {
                rain.toggle();
                if rain.is_active() {
                    "Matrix rain activated".to_string()
                } else {
                    "Matrix rain deactivated".to_string()
                }
            }
            Some(CommandAction::TriggerGlitch) => {
                if glitch.trigger(now) {
                    "Glitch effect triggered".to_string()
                } else {
                    "Glitch effect already running".to_string()
                }
            }
        };

        self.log.push(LogLine {
            kind: LineKind::Response,
            text: response,
        });
    }

    /// History recall, one step back; clamped at the oldest entry.
    pub fn recall_previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.input = self.history.get(self.cursor).cloned().unwrap_or_default();
    }

    /// History recall, one step forward; walking past the end clears the
    /// input instead of wrapping.
    pub fn recall_next(&mut self) {
        self.cursor += 1;
        if self.cursor >= self.history.len() {
            self.cursor = self.history.len();
            self.input.clear();
            return;
        }
        self.input = self.history[self.cursor].clone();
    }
}

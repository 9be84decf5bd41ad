//! Command parsing for TUI command deck
//!
//! Parses user input in Command mode, supporting:
//! - `:q` or `:quit` → Quit command
//! - `:h` or `:help` → Help command
//! - `@filename.pdf`, `@filename.epub` or `@notes.txt` → Load file command
//! - `@@` → Load clipboard
//! - `:play`, `:stop`, `:next`, `:prev` → playback and paging
//! - `:scheme N`, `:font N`, `:voice N` → 1-based preset choice
//! - `:size PX` → font size preset
//! - `:rate X`, `:pitch X`, `:volume X` → voice parameters

use crate::app::AppEvent;

/// Commands that can be parsed from command deck input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Help,
    LoadFile(String),
    LoadClipboard,
    Play,
    Stop,
    NextPage,
    PrevPage,
    Scheme(usize),
    Size(u16),
    Font(usize),
    Voice(usize),
    Rate(f32),
    Pitch(f32),
    Volume(f32),
    Unknown(String),
}

/// Parse command deck input string into a Command
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();

    if input.is_empty() {
        return Command::Unknown(input.to_string());
    }

    if let Some(cmd) = input.strip_prefix(':') {
        let mut parts = cmd.split_whitespace();
        let name = parts.next().unwrap_or("");
        let arg = parts.next();
        if parts.next().is_some() {
            return Command::Unknown(input.to_string());
        }

        let parsed = match (name, arg) {
            ("q" | "quit", None) => Some(Command::Quit),
            ("h" | "help", None) => Some(Command::Help),
            ("play", None) => Some(Command::Play),
            ("stop", None) => Some(Command::Stop),
            ("next", None) => Some(Command::NextPage),
            ("prev", None) => Some(Command::PrevPage),
            ("scheme", Some(n)) => one_based(n).map(Command::Scheme),
            ("font", Some(n)) => one_based(n).map(Command::Font),
            ("voice", Some(n)) => one_based(n).map(Command::Voice),
            ("size", Some(px)) => px.parse().ok().map(Command::Size),
            ("rate", Some(x)) => number(x).map(Command::Rate),
            ("pitch", Some(x)) => number(x).map(Command::Pitch),
            ("volume", Some(x)) => number(x).map(Command::Volume),
            _ => None,
        };
        parsed.unwrap_or_else(|| Command::Unknown(input.to_string()))
    } else if let Some(rest) = input.strip_prefix('@') {
        let filename = rest.trim();
        if filename.is_empty() || filename == "@" {
            Command::LoadClipboard
        } else {
            Command::LoadFile(filename.to_string())
        }
    } else {
        Command::Unknown(input.to_string())
    }
}

fn one_based(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok()?.checked_sub(1)
}

fn number(arg: &str) -> Option<f32> {
    arg.parse::<f32>().ok().filter(|x| x.is_finite())
}

/// Convert a parsed command into an AppEvent
///
/// This is the translation layer between command deck input and App core.
pub fn command_to_app_event(command: Command) -> AppEvent {
    match command {
        Command::Quit => AppEvent::Quit,
        Command::Help => AppEvent::Help,
        Command::LoadFile(path) => AppEvent::LoadFile(path),
        Command::LoadClipboard => AppEvent::LoadClipboard,
        Command::Play => AppEvent::TogglePlayback,
        Command::Stop => AppEvent::Stop,
        Command::NextPage => AppEvent::NextPage,
        Command::PrevPage => AppEvent::PrevPage,
        Command::Scheme(index) => AppEvent::SetColorScheme(index),
        Command::Size(px) => AppEvent::SetFontSize(px),
        Command::Font(index) => AppEvent::SetFontFamily(index),
        Command::Voice(index) => AppEvent::SelectVoice(index),
        Command::Rate(rate) => AppEvent::SetRate(rate),
        Command::Pitch(pitch) => AppEvent::SetPitch(pitch),
        Command::Volume(volume) => AppEvent::SetVolume(volume),
        Command::Unknown(input) => AppEvent::InvalidCommand(input),
    }
}

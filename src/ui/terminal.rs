use crate::app::{App, AppEvent, AppMode, RenderState};
use crate::audio::format_duration;
use crate::speech::PlaybackState;
use crate::ui::command::{command_to_app_event, parse_command};
use crate::ui::terminal_guard::TerminalGuard;
use crate::ui::theme::reflow_width;
use crate::ui::view::{layout_surface, render_bar, render_page};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

pub struct TuiManager {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    command_input: String,
    _guard: TerminalGuard,
}

impl TuiManager {
    pub fn new() -> Result<Self, io::Error> {
        let guard = TerminalGuard::new()?;
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;

        Ok(TuiManager {
            terminal,
            command_input: String::new(),
            _guard: guard,
        })
    }

    pub fn run_event_loop(&mut self, app: &mut App) -> io::Result<()> {
        let poll_timeout = Duration::from_millis(1000 / 60);

        loop {
            if app.mode() == AppMode::Quit {
                return Ok(());
            }

            if event::poll(poll_timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(app_event) =
                            map_key(app.mode(), key, &mut self.command_input)
                        {
                            app.handle_event(app_event);
                        }
                    }
                }
            }

            app.tick(Instant::now());
            self.render_frame(app)?;
        }
    }

    pub fn render_frame(&mut self, app: &App) -> io::Result<()> {
        let state = app.render_state();
        let command_input = &self.command_input;

        self.terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Min(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                ])
                .split(frame.area());

            frame.render_widget(render_bar(title_line(&state), state.theme), chunks[0]);

            let width = reflow_width(chunks[1].width, state.theme);
            let view = layout_surface(state.surface, width);
            frame.render_widget(
                render_page(view, state.theme, chunks[1].height),
                chunks[1],
            );

            frame.render_widget(render_bar(status_line(&state), state.theme), chunks[2]);

            let deck = if state.mode == AppMode::Command {
                format!("> {}", command_input)
            } else {
                String::from(": for commands, :h for help")
            };
            frame.render_widget(render_bar(deck, state.theme), chunks[3]);
        })?;

        Ok(())
    }
}

fn title_line(state: &RenderState) -> String {
    match (state.title, state.page_label()) {
        (Some(title), Some(pages)) => format!(" {} | {}", title, pages),
        _ => String::from(" readaloud | @file to open, @@ for clipboard"),
    }
}

fn status_line(state: &RenderState) -> String {
    if let Some(status) = state.status {
        return format!(" {}", status);
    }
    let playback = match state.playback {
        PlaybackState::Idle => "Stopped",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
    };
    if let Some(audio) = state.audio {
        return format!(
            " {} {} / {} | {}, {}px, {}",
            playback,
            format_duration(audio.position),
            format_duration(audio.duration),
            state.theme.scheme_label(),
            state.theme.font_size_px,
            state.theme.family_label(),
        );
    }
    let (reached, total) = state.progress();
    format!(
        " {} {}/{} | {} | {}, {}px, {} | rate {:.1} pitch {:.1} volume {:.1}",
        playback,
        reached,
        total,
        state.voice_name.as_deref().unwrap_or("no voice"),
        state.theme.scheme_label(),
        state.theme.font_size_px,
        state.theme.family_label(),
        state.settings.rate,
        state.settings.pitch,
        state.settings.volume,
    )
}

/// Translate a key press into an app event.
///
/// In Command mode keys edit `input`; Enter submits it. In Reading mode
/// single keys drive playback and paging.
pub fn map_key(mode: AppMode, key: KeyEvent, input: &mut String) -> Option<AppEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(AppEvent::Quit);
    }

    match mode {
        AppMode::Command => match key.code {
            KeyCode::Enter => {
                let line = std::mem::take(input);
                Some(command_to_app_event(parse_command(&line)))
            }
            KeyCode::Esc => {
                input.clear();
                Some(AppEvent::LeaveCommand)
            }
            KeyCode::Backspace => {
                input.pop();
                None
            }
            KeyCode::Char(c) => {
                input.push(c);
                None
            }
            _ => None,
        },
        AppMode::Reading => match key.code {
            KeyCode::Char(' ') => Some(AppEvent::TogglePlayback),
            KeyCode::Char('s') | KeyCode::Esc => Some(AppEvent::Stop),
            KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => Some(AppEvent::NextPage),
            KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => Some(AppEvent::PrevPage),
            KeyCode::Char('q') => Some(AppEvent::Quit),
            KeyCode::Char(c @ (':' | '@')) => {
                input.clear();
                input.push(c);
                Some(AppEvent::EnterCommand)
            }
            _ => None,
        },
        AppMode::Quit => None,
    }
}

/// Application events
#[derive(Debug, PartialEq, Clone)]
pub enum AppEvent {
    LoadFile(String),
    LoadClipboard,
    Quit,
    Help,
    InvalidCommand(String),
    /// Play when idle, otherwise pause or resume.
    TogglePlayback,
    Stop,
    NextPage,
    PrevPage,
    /// 0-based index into the colour scheme presets.
    SetColorScheme(usize),
    /// Font size in px; only presets are accepted.
    SetFontSize(u16),
    /// 0-based index into the font family presets.
    SetFontFamily(usize),
    SetRate(f32),
    SetPitch(f32),
    SetVolume(f32),
    SelectVoice(usize),
    EnterCommand,
    LeaveCommand,
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Events that can occur in the monitor TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Quit the application
    Quit,
    /// Toggle help overlay
    ToggleHelp,
    /// Switch the ranking to the next preset
    NextPreset,
    /// Rank one more process
    IncreaseCount,
    /// Rank one fewer process
    DecreaseCount,
    /// Swap top and bottom ranking
    FlipDirection,
    /// No action
    None,
}

impl MonitorEvent {
    /// Map a key press to an event.
    pub fn from_key(key: KeyEvent) -> Self {
        // Raw mode swallows SIGINT, so Ctrl-C arrives as a key
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return MonitorEvent::Quit;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => MonitorEvent::Quit,
            KeyCode::Char('?') | KeyCode::Char('h') => MonitorEvent::ToggleHelp,
            KeyCode::Char('p') | KeyCode::Tab => MonitorEvent::NextPreset,
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => MonitorEvent::IncreaseCount,
            KeyCode::Char('-') | KeyCode::Down => MonitorEvent::DecreaseCount,
            KeyCode::Char('d') => MonitorEvent::FlipDirection,
            _ => MonitorEvent::None,
        }
    }
}

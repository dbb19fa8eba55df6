use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    RequestAnalysis,
    CloseAnalysis,
    ExportAnalysis,
    RefreshNow,
    PrevSymbol,
    NextSymbol,
    /// Zero-based card index.
    SelectCard(usize),
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Esc => Some(UiCommand::CloseAnalysis),
        KeyCode::Left => Some(UiCommand::PrevSymbol),
        KeyCode::Right | KeyCode::Tab => Some(UiCommand::NextSymbol),
        KeyCode::BackTab => Some(UiCommand::PrevSymbol),
        KeyCode::Char(c @ '1'..='9') => Some(UiCommand::SelectCard(*c as usize - '1' as usize)),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'q' => Some(UiCommand::Quit),
            'a' => Some(UiCommand::RequestAnalysis),
            'c' => Some(UiCommand::CloseAnalysis),
            'x' => Some(UiCommand::ExportAnalysis),
            'r' => Some(UiCommand::RefreshNow),
            'h' => Some(UiCommand::PrevSymbol),
            'l' => Some(UiCommand::NextSymbol),
            _ => None,
        },
        _ => None,
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::action::Action;
use super::mode::Mode;

/// Map a key event to a semantic action based on current mode.
pub fn map_key(key: KeyEvent, mode: &Mode) -> Action {
    if key.kind == KeyEventKind::Release {
        return Action::None;
    }
    match mode {
        Mode::Browsing => map_browsing(key),
        Mode::EditingTitle { .. } | Mode::EditingDescription { .. } => map_input(key),
        Mode::SelectingMoveTarget { .. } => map_move_target(key),
        Mode::ConfirmingDelete { .. } => map_confirm(key),
    }
}

fn map_browsing(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('h') | KeyCode::Left => Action::FocusPrevColumn,
        KeyCode::Char('l') | KeyCode::Right => Action::FocusNextColumn,
        KeyCode::Char('j') | KeyCode::Down => Action::FocusNextTask,
        KeyCode::Char('k') | KeyCode::Up => Action::FocusPrevTask,
        KeyCode::Char('a') | KeyCode::Char('n') => Action::BeginAdd,
        KeyCode::Char('e') | KeyCode::Enter => Action::BeginEditTitle,
        KeyCode::Char('E') => Action::BeginEditDescription,
        KeyCode::Char('m') => Action::BeginMove,
        KeyCode::Char('d') | KeyCode::Char('x') | KeyCode::Delete => Action::BeginDelete,
        KeyCode::Char('K') => Action::ReorderUp,
        KeyCode::Char('J') => Action::ReorderDown,
        KeyCode::Char('q') => Action::Quit,
        _ => Action::None,
    }
}

fn map_input(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::Confirm,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Tab => Action::AdvanceField,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Cancel,
        KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::InputHome,
        KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::InputEnd,
        KeyCode::Char(_) if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            Action::None
        }
        KeyCode::Char(c) => Action::InputChar(c),
        KeyCode::Backspace => Action::InputBackspace,
        KeyCode::Left => Action::InputLeft,
        KeyCode::Right => Action::InputRight,
        KeyCode::Home => Action::InputHome,
        KeyCode::End => Action::InputEnd,
        _ => Action::None,
    }
}

fn map_move_target(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => Action::TargetPrevColumn,
        KeyCode::Char('l') | KeyCode::Right => Action::TargetNextColumn,
        KeyCode::Char(c @ '1'..='9') => Action::JumpToColumn(c as usize - '1' as usize),
        KeyCode::Enter => Action::Confirm,
        KeyCode::Esc | KeyCode::Char('q') => Action::Cancel,
        _ => Action::None,
    }
}

fn map_confirm(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => Action::Confirm,
        KeyCode::Char('n') | KeyCode::Esc => Action::Cancel,
        _ => Action::None,
    }
}

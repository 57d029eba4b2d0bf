use ratatui::crossterm::event::{self, KeyCode, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::{Position, Rect};
use std::time::Instant;

use crate::app::{App, AppMode};
use crate::panel::{PanelEvent, PanelField};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

fn hit(area: Option<Rect>, pos: Position) -> bool {
  area.is_some_and(|a| a.contains(pos))
}

// --- Key Handling ---

pub fn handle_key_event(app: &mut App, key: event::KeyEvent) {
  let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
  if ctrl && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return;
  }

  if app.alert.is_some() {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
      app.dismiss_alert();
    }
    return;
  }

  if app.modal.is_open() {
    handle_modal_key(app, key);
    return;
  }

  if ctrl && key.code == KeyCode::Char('f') {
    app.panel_event(PanelEvent::Toggle);
    return;
  }

  if ctrl && key.code == KeyCode::Char('t') {
    app.next_theme();
    return;
  }

  if ctrl && key.code == KeyCode::Char('u') {
    app.clear_search();
    return;
  }

  if app.panel.is_open() {
    handle_panel_key(app, key);
    return;
  }

  match app.mode {
    AppMode::Input => handle_input_key(app, key),
    AppMode::Results => handle_results_key(app, key),
  }
}

fn handle_modal_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Esc | KeyCode::Char('q') => app.close_modal(),
    KeyCode::Down | KeyCode::Char('j') => app.modal.scroll_down(),
    KeyCode::Up | KeyCode::Char('k') => app.modal.scroll_up(),
    _ => {}
  }
}

fn handle_panel_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Esc => app.panel_event(PanelEvent::Toggle),
    KeyCode::Tab | KeyCode::Down => app.panel.focus_next(),
    KeyCode::BackTab | KeyCode::Up => app.panel.focus_prev(),
    KeyCode::Left | KeyCode::Right => app.panel.cycle_sort(),
    KeyCode::Enter => app.panel_activate(),
    KeyCode::Char(' ') if matches!(app.panel.focus, PanelField::Sort | PanelField::Apply | PanelField::Clear) => {
      app.panel_activate();
    }
    KeyCode::Char(c) => app.panel.type_char(c),
    KeyCode::Backspace => app.panel.backspace(),
    _ => {}
  }
}

fn handle_input_key(app: &mut App, key: event::KeyEvent) {
  let before = app.input.clone();
  match key.code {
    KeyCode::Enter => {
      app.search_now();
      return;
    }
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
      app.input.insert(byte_idx, c);
      app.cursor_position += 1;
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
    }
    KeyCode::Esc => {
      if !app.input.is_empty() {
        app.clear_search();
        return;
      } else if !app.cards().is_empty() {
        app.mode = AppMode::Results;
      } else {
        app.should_quit = true;
      }
    }
    KeyCode::Down | KeyCode::Tab => {
      if !app.cards().is_empty() {
        app.mode = AppMode::Results;
      }
    }
    _ => {}
  }
  if app.input != before {
    app.on_input_changed(Instant::now());
  }
}

fn handle_results_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => app.open_selected(),
    KeyCode::Down | KeyCode::Char('j') => app.select_next(),
    KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
    KeyCode::Char('f') => app.panel_event(PanelEvent::Toggle),
    KeyCode::Char('q') => app.should_quit = true,
    KeyCode::Esc | KeyCode::Tab | KeyCode::Char('/') => app.mode = AppMode::Input,
    _ => {}
  }
}

// --- Mouse Handling ---

pub fn handle_mouse_event(app: &mut App, mouse: event::MouseEvent) {
  let pos = Position::new(mouse.column, mouse.row);
  match mouse.kind {
    MouseEventKind::Down(MouseButton::Left) => handle_click(app, pos),
    MouseEventKind::ScrollDown => {
      if app.modal.is_open() {
        app.modal.scroll_down();
      } else if !app.panel.is_open() {
        app.select_next();
      }
    }
    MouseEventKind::ScrollUp => {
      if app.modal.is_open() {
        app.modal.scroll_up();
      } else if !app.panel.is_open() {
        app.select_prev();
      }
    }
    _ => {}
  }
}

fn handle_click(app: &mut App, pos: Position) {
  if app.alert.is_some() {
    app.dismiss_alert();
    return;
  }

  if app.modal.is_open() {
    // The close button sits on the dialog border, so test it first.
    if hit(app.hits.modal_close, pos) || !hit(app.hits.modal_dialog, pos) {
      app.close_modal();
    }
    return;
  }

  if hit(app.hits.filter_toggle, pos) {
    app.panel_event(PanelEvent::Toggle);
    return;
  }

  if app.panel.is_open() {
    if hit(app.hits.panel, pos) {
      app.panel_event(PanelEvent::ClickInside);
      let field = app.hits.panel_fields.iter().find(|(_, area)| area.contains(pos)).map(|(field, _)| *field);
      if let Some(field) = field {
        app.panel.focus = field;
        if matches!(field, PanelField::Sort | PanelField::Apply | PanelField::Clear) {
          app.panel_activate();
        }
      }
    } else {
      // Closing click is consumed; it does not reach what lies underneath.
      app.panel_event(PanelEvent::ClickOutside);
    }
    return;
  }

  let card = app.hits.cards.iter().find(|(_, area)| area.contains(pos)).map(|(idx, _)| *idx);
  if let Some(idx) = card {
    app.list_state.select(Some(idx));
    app.mode = AppMode::Results;
    app.open_selected();
    return;
  }

  if hit(app.hits.input, pos) {
    app.mode = AppMode::Input;
  }
}

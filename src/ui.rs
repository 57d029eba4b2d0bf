use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, AppMode, ResultsPane};
use crate::panel::PanelField;
use crate::theme::Theme;

/// Rows per result card.
const CARD_HEIGHT: u16 = 2;
const FILTER_BUTTON: &str = "[ Filters ]";
const CLOSE_BUTTON: &str = "[x]";

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect { x: area.x + (area.width - width) / 2, y: area.y + (area.height - height) / 2, width, height }
}

fn rounded(theme: &Theme) -> Block<'static> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  app.hits = Default::default();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_main(frame, app, main_area);
  render_status(frame, app, status_area);
  render_input(frame, app, input_area);
  render_footer(frame, app, footer_area);

  if app.panel.is_open() {
    render_panel(frame, app, main_area);
  }
  if app.modal.is_open() {
    render_modal(frame, app);
  }
  if app.alert.is_some() {
    render_alert(frame, app);
  }
}

fn render_header(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let left = Line::from(Span::styled(" ◉ reelscope ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let button_w = FILTER_BUTTON.len() as u16;
  let button_area = Rect { x: area.x + area.width.saturating_sub(button_w + 1), width: button_w.min(area.width), ..area };
  let button_style = if app.panel.is_open() {
    Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(theme.accent)
  };
  frame.render_widget(Line::from(Span::styled(FILTER_BUTTON, button_style)), button_area);
  app.hits.filter_toggle = Some(button_area);

  if app.loading.is_active() {
    let label = "⏳ loading ";
    let w = display_width(label, label.chars().count()) as u16;
    let loading_area = Rect { x: button_area.x.saturating_sub(w + 1), width: w, ..area };
    frame.render_widget(Line::from(Span::styled(label, Style::default().fg(theme.status))), loading_area);
  }
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  if matches!(app.pane, ResultsPane::Cards(_)) {
    render_cards(frame, app, area);
    return;
  }
  let theme = app.theme();
  match &app.pane {
    ResultsPane::Idle => render_welcome(frame, theme, area),
    ResultsPane::Notice(notice) => {
      let color = if notice.is_error() { theme.error } else { theme.muted };
      let text = vec![Line::from(""), Line::from(Span::styled(notice.message(), Style::default().fg(color)))];
      let paragraph =
        Paragraph::new(text).alignment(Alignment::Center).wrap(Wrap { trim: true }).block(rounded(theme).title(" Results "));
      frame.render_widget(paragraph, area);
    }
    ResultsPane::Cards(_) => {}
  }
}

fn render_welcome(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("◉  reelscope", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Search the Open Movie Database from your terminal.", Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled("Start typing a title below.", Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(rounded(theme));
  frame.render_widget(paragraph, area);
}

fn render_cards(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;
  let selected = app.list_state.selected();

  let items: Vec<ListItem> = app
    .cards()
    .iter()
    .enumerate()
    .map(|(i, item)| {
      let card = app.card(item);
      let is_selected = Some(i) == selected;
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let muted = if is_selected { theme.highlight_fg } else { theme.muted };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let year_w = card.year.chars().count();
      let title = truncate_str(&card.title, inner_w.saturating_sub(year_w + 2));
      let gap = inner_w.saturating_sub(title.chars().count() + year_w);
      let top = Line::from(vec![
        Span::styled(title, Style::default().fg(fg).add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(gap)),
        Span::styled(card.year, Style::default().fg(muted)),
      ]);

      let mut bottom = Vec::new();
      if !card.genre.is_empty() {
        bottom.push(Span::styled(card.genre.clone(), Style::default().fg(muted)));
        bottom.push(Span::raw("  "));
      }
      if !card.rating.is_empty() {
        let rating_fg = if is_selected { theme.highlight_fg } else { theme.rating };
        bottom.push(Span::styled(card.rating.clone(), Style::default().fg(rating_fg)));
        bottom.push(Span::raw("  "));
      }
      let used: usize = bottom.iter().map(|s| s.content.chars().count()).sum();
      bottom.push(Span::styled(
        truncate_str(&card.poster, inner_w.saturating_sub(used)),
        Style::default().fg(muted).add_modifier(Modifier::ITALIC),
      ));

      ListItem::new(vec![top, Line::from(bottom)]).bg(bg)
    })
    .collect();

  let count = items.len();
  let list = List::new(items)
    .block(
      rounded(theme)
        .title(format!(" Results ({}) ", count))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);

  // Record visible card rows for click hit-testing.
  let inner = Rect { x: area.x + 1, y: area.y + 1, width: area.width.saturating_sub(2), height: area.height.saturating_sub(2) };
  let offset = app.list_state.offset();
  let visible = (inner.height / CARD_HEIGHT) as usize;
  app.hits.cards = (offset..count.min(offset + visible))
    .map(|idx| {
      let row = inner.y + ((idx - offset) as u16) * CARD_HEIGHT;
      (idx, Rect { y: row, height: CARD_HEIGHT, ..inner })
    })
    .collect();
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if app.debouncer.is_armed() {
    (" …".to_string(), Style::default().fg(theme.muted))
  } else {
    let shown = app.cards().len();
    let criteria = app.panel.criteria();
    let mut parts = vec![format!("{} shown of {}", shown, app.last_results.len())];
    if criteria.year_active() || criteria.rating_active() {
      parts.push("filtered".to_string());
    }
    parts.push(criteria.sort.label().to_string());
    parts.push(format!("{} details cached", app.cache.len()));
    (format!(" {}", parts.join(" · ")), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.mode == AppMode::Input && !app.panel.is_open() && !app.modal.is_open();
  let border_color = if focused { theme.accent } else { theme.border };
  let input_block = Block::bordered()
    .title(" Search movies ")
    .title_style(Style::default().fg(border_color))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));
  app.hits.input = Some(area);

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  if focused && inner_w > 0 {
    let cursor_x = area.x + 2 + cursor_col.saturating_sub(app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = if app.alert.is_some() {
    vec![("Enter", "Dismiss")]
  } else if app.modal.is_open() {
    vec![("Esc", "Close"), ("j/k", "Scroll")]
  } else if app.panel.is_open() {
    vec![("Tab", "Next"), ("Enter", "Select"), ("←/→", "Sort"), ("Esc", "Close")]
  } else {
    match app.mode {
      AppMode::Input => {
        let mut k = vec![("Enter", "Search"), ("^f", "Filters"), ("^u", "Clear"), ("^t", "Theme")];
        if !app.cards().is_empty() {
          k.push(("↓", "Results"));
        }
        k
      }
      AppMode::Results => vec![("Enter", "Details"), ("j/k", "Navigate"), ("f", "Filters"), ("Esc", "Back")],
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

// --- Overlays ---

fn render_panel(frame: &mut Frame, app: &mut App, main_area: Rect) {
  let theme = app.theme();
  let width = 36.min(main_area.width);
  let height = 10.min(main_area.height);
  let area = Rect { x: main_area.x + main_area.width - width, y: main_area.y, width, height };
  app.hits.panel = Some(area);

  frame.render_widget(Clear, area);
  let block = rounded(theme)
    .title(" Filters ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_style(Style::default().fg(theme.accent))
    .style(Style::default().bg(theme.bg))
    .padding(Padding::horizontal(1));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let focus_style = Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD);
  let value_style = Style::default().fg(theme.fg);
  let label_style = Style::default().fg(theme.muted);

  let text_fields = [PanelField::Sort, PanelField::YearFrom, PanelField::YearTo, PanelField::MinRating];
  for (row, field) in text_fields.iter().enumerate() {
    let y = inner.y + row as u16 * 2;
    if y >= inner.y + inner.height {
      break;
    }
    let line_area = Rect { y, height: 1, ..inner };
    let value = app.panel.form.value(*field);
    let shown = match field {
      PanelField::Sort => format!("◂ {} ▸", value),
      _ => format!("[{:<4}]", value),
    };
    let style = if app.panel.focus == *field { focus_style } else { value_style };
    let line = Line::from(vec![Span::styled(format!("{:<12}", field.label()), label_style), Span::styled(shown, style)]);
    frame.render_widget(line, line_area);
    app.hits.panel_fields.push((*field, line_area));
  }

  let buttons_y = inner.y + inner.height.saturating_sub(1);
  let mut x = inner.x;
  for field in [PanelField::Apply, PanelField::Clear] {
    let label = format!("[ {} ]", field.label());
    let w = label.len() as u16;
    let button_area = Rect { x, y: buttons_y, width: w.min(inner.x + inner.width - x), height: 1 };
    let style = if app.panel.focus == field { focus_style } else { Style::default().fg(theme.accent) };
    frame.render_widget(Line::from(Span::styled(label, style)), button_area);
    app.hits.panel_fields.push((field, button_area));
    x = (x + w + 2).min(inner.x + inner.width);
  }
}

fn render_modal(frame: &mut Frame, app: &mut App) {
  let Some(view) = app.modal.view() else { return };
  let theme = app.theme();
  let screen = frame.area();
  let area = centered(screen, screen.width * 7 / 10, screen.height * 7 / 10);
  app.hits.modal_dialog = Some(area);

  frame.render_widget(Clear, area);
  let block = rounded(theme)
    .title(format!(" {} ({}) ", view.title, view.year))
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_style(Style::default().fg(theme.accent))
    .style(Style::default().bg(theme.bg))
    .padding(Padding::new(2, 2, 1, 0));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let close_w = CLOSE_BUTTON.len() as u16;
  let close_area = Rect { x: area.x + area.width.saturating_sub(close_w + 2), y: area.y, width: close_w, height: 1 };
  frame.render_widget(Line::from(Span::styled(CLOSE_BUTTON, Style::default().fg(theme.error))), close_area);
  app.hits.modal_close = Some(close_area);

  let label = |s: &'static str| Span::styled(format!("{:<9}", s), Style::default().fg(theme.muted));
  let lines = vec![
    Line::from(vec![label("Rating"), Span::styled(format!("★ {}", view.rating), Style::default().fg(theme.rating))]),
    Line::from(vec![label("Runtime"), Span::styled(view.runtime, Style::default().fg(theme.fg))]),
    Line::from(vec![label("Genre"), Span::styled(view.genre, Style::default().fg(theme.fg))]),
    Line::from(vec![
      label("Poster"),
      Span::styled(view.poster, Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED)),
    ]),
    Line::from(""),
    Line::from(Span::styled(view.plot, Style::default().fg(theme.fg))),
  ];
  let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).scroll((app.modal.scroll, 0));
  frame.render_widget(paragraph, inner);
}

fn render_alert(frame: &mut Frame, app: &App) {
  let Some(message) = &app.alert else { return };
  let theme = app.theme();
  let width = (message.chars().count() as u16 + 8).clamp(30, 70);
  let area = centered(frame.area(), width, 7);

  frame.render_widget(Clear, area);
  let block = rounded(theme)
    .title(" Alert ")
    .title_style(Style::default().fg(theme.error).add_modifier(Modifier::BOLD))
    .border_style(Style::default().fg(theme.error))
    .style(Style::default().bg(theme.bg));
  let text = vec![
    Line::from(""),
    Line::from(Span::styled(message.as_str(), Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled("Enter to dismiss", Style::default().fg(theme.muted))),
  ];
  frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).wrap(Wrap { trim: true }).block(block), area);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{Config, Settings};
  use crate::omdb::mock::{MockTransport, client};
  use ratatui::{Terminal, backend::TestBackend};

  #[test]
  fn truncate_keeps_short_strings() {
    assert_eq!(truncate_str("Alien", 10), "Alien");
    assert_eq!(truncate_str("Alien: Covenant", 6), "Alien…");
  }

  #[test]
  fn display_width_counts_wide_chars() {
    assert_eq!(display_width("abc", 3), 3);
    assert_eq!(display_width("日本", 2), 4);
    assert_eq!(display_width("日本", 1), 2);
  }

  #[test]
  fn centered_rect_fits_inside_area() {
    let area = Rect::new(0, 0, 100, 40);
    let r = centered(area, 50, 20);
    assert_eq!(r, Rect::new(25, 10, 50, 20));
    let clamped = centered(area, 200, 80);
    assert_eq!(clamped, area);
  }

  #[tokio::test]
  async fn draws_on_tiny_terminals_without_panicking() {
    let settings =
      Settings { api_key: Some("k".to_string()), base_url: String::new(), debounce_ms: 350, request_timeout_secs: 5 };
    let mut app = App::new(client(&MockTransport::new()), &settings, Config::default());
    app.input = "batman begins".to_string();
    app.cursor_position = app.input.chars().count();

    for (w, h) in [(80, 24), (20, 8), (4, 8), (3, 8), (2, 3), (1, 1)] {
      let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
      terminal.draw(|frame| ui(frame, &mut app)).unwrap();
    }
  }
}

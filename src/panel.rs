use crate::filter::{FilterCriteria, SortOrder, parse_year};

/// Longest accepted text in a panel field ("1999", "10.0").
const MAX_FIELD_LEN: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanelState {
  #[default]
  Closed,
  Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
  Toggle,
  Apply,
  Clear,
  /// Click landed outside the panel and outside the toggle button.
  ClickOutside,
  ClickInside,
}

/// What the caller must do after a panel transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEffect {
  Nothing,
  /// Re-run the filter pipeline with the current form.
  Rerun,
}

/// Focusable controls inside the panel, in tab order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PanelField {
  #[default]
  Sort,
  YearFrom,
  YearTo,
  MinRating,
  Apply,
  Clear,
}

impl PanelField {
  pub const ALL: [PanelField; 6] =
    [PanelField::Sort, PanelField::YearFrom, PanelField::YearTo, PanelField::MinRating, PanelField::Apply, PanelField::Clear];

  pub fn next(self) -> Self {
    let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }

  pub fn prev(self) -> Self {
    let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
    Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
  }

  pub fn label(self) -> &'static str {
    match self {
      PanelField::Sort => "Sort",
      PanelField::YearFrom => "Year from",
      PanelField::YearTo => "Year to",
      PanelField::MinRating => "Min rating",
      PanelField::Apply => "Apply",
      PanelField::Clear => "Clear",
    }
  }

  fn is_text(self) -> bool {
    matches!(self, PanelField::YearFrom | PanelField::YearTo | PanelField::MinRating)
  }
}

/// Raw form contents, kept as text the way the user typed them.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterForm {
  pub sort: SortOrder,
  pub year_from: String,
  pub year_to: String,
  pub min_rating: String,
}

impl Default for FilterForm {
  fn default() -> Self {
    Self { sort: SortOrder::TitleAsc, year_from: String::new(), year_to: String::new(), min_rating: "0".to_string() }
  }
}

impl FilterForm {
  /// Parse the form. Empty, unparseable or zero year bounds are unset; an
  /// unparseable rating means no rating filter.
  pub fn criteria(&self) -> FilterCriteria {
    let year = |raw: &str| parse_year(raw).filter(|y| *y != 0);
    let min_rating = self.min_rating.trim().parse::<f64>().ok().filter(|r| r.is_finite() && *r > 0.0).unwrap_or(0.0);
    FilterCriteria { sort: self.sort, year_from: year(&self.year_from), year_to: year(&self.year_to), min_rating }
  }

  fn buffer_mut(&mut self, field: PanelField) -> Option<&mut String> {
    match field {
      PanelField::YearFrom => Some(&mut self.year_from),
      PanelField::YearTo => Some(&mut self.year_to),
      PanelField::MinRating => Some(&mut self.min_rating),
      _ => None,
    }
  }

  pub fn value(&self, field: PanelField) -> String {
    match field {
      PanelField::Sort => self.sort.label().to_string(),
      PanelField::YearFrom => self.year_from.clone(),
      PanelField::YearTo => self.year_to.clone(),
      PanelField::MinRating => self.min_rating.clone(),
      PanelField::Apply | PanelField::Clear => String::new(),
    }
  }
}

/// Filter panel open/closed state machine plus its form.
#[derive(Debug, Default)]
pub struct FilterPanel {
  state: PanelState,
  pub focus: PanelField,
  pub form: FilterForm,
}

impl FilterPanel {
  pub fn is_open(&self) -> bool {
    self.state == PanelState::Open
  }

  pub fn criteria(&self) -> FilterCriteria {
    self.form.criteria()
  }

  pub fn handle(&mut self, event: PanelEvent) -> PanelEffect {
    match (self.state, event) {
      (PanelState::Closed, PanelEvent::Toggle) => {
        self.state = PanelState::Open;
        self.focus = PanelField::default();
        PanelEffect::Nothing
      }
      (PanelState::Open, PanelEvent::Toggle) | (PanelState::Open, PanelEvent::ClickOutside) => {
        self.state = PanelState::Closed;
        PanelEffect::Nothing
      }
      (_, PanelEvent::Apply) => {
        self.state = PanelState::Closed;
        PanelEffect::Rerun
      }
      (_, PanelEvent::Clear) => {
        self.form = FilterForm::default();
        self.state = PanelState::Closed;
        PanelEffect::Rerun
      }
      (_, PanelEvent::ClickInside) | (PanelState::Closed, PanelEvent::ClickOutside) => PanelEffect::Nothing,
    }
  }

  /// Enter/Space on the focused control.
  pub fn activate(&mut self) -> PanelEffect {
    match self.focus {
      PanelField::Sort => {
        self.form.sort = self.form.sort.toggled();
        PanelEffect::Nothing
      }
      PanelField::Clear => self.handle(PanelEvent::Clear),
      // Enter in a text field submits like the Apply button.
      PanelField::Apply | PanelField::YearFrom | PanelField::YearTo | PanelField::MinRating => self.handle(PanelEvent::Apply),
    }
  }

  pub fn focus_next(&mut self) {
    self.focus = self.focus.next();
  }

  pub fn focus_prev(&mut self) {
    self.focus = self.focus.prev();
  }

  /// Type into the focused field. Years take digits only, the rating also takes a dot.
  pub fn type_char(&mut self, c: char) {
    let field = self.focus;
    if !field.is_text() {
      return;
    }
    let allowed = c.is_ascii_digit() || (field == PanelField::MinRating && c == '.');
    if let Some(buf) = self.form.buffer_mut(field)
      && allowed
      && !(c == '.' && buf.contains('.'))
      && buf.len() < MAX_FIELD_LEN
    {
      if field == PanelField::MinRating && buf.as_str() == "0" && c != '.' {
        buf.clear();
      }
      buf.push(c);
    }
  }

  pub fn backspace(&mut self) {
    if let Some(buf) = self.form.buffer_mut(self.focus) {
      buf.pop();
    }
  }

  /// Left/Right on the sort selector.
  pub fn cycle_sort(&mut self) {
    if self.focus == PanelField::Sort {
      self.form.sort = self.form.sort.toggled();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn starts_closed_and_toggle_flips() {
    let mut panel = FilterPanel::default();
    assert_eq!(panel.state, PanelState::Closed);
    assert_eq!(panel.handle(PanelEvent::Toggle), PanelEffect::Nothing);
    assert!(panel.is_open());
    panel.handle(PanelEvent::Toggle);
    assert!(!panel.is_open());
  }

  #[test]
  fn apply_reruns_and_closes() {
    let mut panel = FilterPanel::default();
    panel.handle(PanelEvent::Toggle);
    panel.form.year_from = "1990".to_string();
    assert_eq!(panel.handle(PanelEvent::Apply), PanelEffect::Rerun);
    assert!(!panel.is_open());
    assert_eq!(panel.criteria().year_from, Some(1990));
  }

  #[test]
  fn clear_resets_form_then_closes() {
    let mut panel = FilterPanel::default();
    panel.handle(PanelEvent::Toggle);
    panel.form = FilterForm {
      sort: SortOrder::TitleDesc,
      year_from: "1990".to_string(),
      year_to: "2000".to_string(),
      min_rating: "7.5".to_string(),
    };
    assert_eq!(panel.handle(PanelEvent::Clear), PanelEffect::Rerun);
    assert!(!panel.is_open());
    assert_eq!(panel.form, FilterForm::default());
    assert_eq!(panel.criteria(), FilterCriteria::default());
  }

  #[test]
  fn clicks_inside_keep_panel_open_outside_closes() {
    let mut panel = FilterPanel::default();
    panel.handle(PanelEvent::Toggle);
    panel.handle(PanelEvent::ClickInside);
    assert!(panel.is_open());
    panel.handle(PanelEvent::ClickOutside);
    assert!(!panel.is_open());
    // No-op when already closed.
    assert_eq!(panel.handle(PanelEvent::ClickOutside), PanelEffect::Nothing);
    assert!(!panel.is_open());
  }

  #[test]
  fn form_parsing_treats_zero_and_garbage_as_unset() {
    let form = FilterForm { year_from: "0".to_string(), year_to: "abc".to_string(), min_rating: "x".to_string(), ..Default::default() };
    let criteria = form.criteria();
    assert_eq!(criteria.year_from, None);
    assert_eq!(criteria.year_to, None);
    assert_eq!(criteria.min_rating, 0.0);

    let form = FilterForm { min_rating: "7.5".to_string(), ..Default::default() };
    assert_eq!(form.criteria().min_rating, 7.5);
  }

  #[test]
  fn focus_cycles_through_controls() {
    let mut panel = FilterPanel::default();
    for _ in 0..PanelField::ALL.len() {
      panel.focus_next();
    }
    assert_eq!(panel.focus, PanelField::Sort);
    panel.focus_prev();
    assert_eq!(panel.focus, PanelField::Clear);
  }

  #[test]
  fn typing_filters_characters_per_field() {
    let mut panel = FilterPanel::default();
    panel.focus = PanelField::YearFrom;
    for c in "19a9.5".chars() {
      panel.type_char(c);
    }
    assert_eq!(panel.form.year_from, "1995");

    panel.focus = PanelField::MinRating;
    for c in "7.5".chars() {
      panel.type_char(c);
    }
    assert_eq!(panel.form.min_rating, "7.5");
    panel.backspace();
    assert_eq!(panel.form.min_rating, "7.");
  }

  #[test]
  fn rating_accepts_a_single_decimal_point() {
    let mut panel = FilterPanel::default();
    panel.focus = PanelField::MinRating;
    for c in "7..5".chars() {
      panel.type_char(c);
    }
    assert_eq!(panel.form.min_rating, "7.5");
    assert_eq!(panel.criteria().min_rating, 7.5);
  }

  #[test]
  fn activate_on_sort_toggles_order() {
    let mut panel = FilterPanel::default();
    panel.handle(PanelEvent::Toggle);
    assert_eq!(panel.activate(), PanelEffect::Nothing);
    assert_eq!(panel.form.sort, SortOrder::TitleDesc);
    assert!(panel.is_open());
  }
}

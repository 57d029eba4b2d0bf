use ratatui::style::Color;

/// Colour palette for every widget in the UI.
#[derive(Debug)]
pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub rating: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: [Theme; 3] = [
  Theme {
    name: "Matinee",
    bg: Color::Rgb(24, 22, 30),
    fg: Color::Rgb(232, 228, 240),
    accent: Color::Rgb(240, 180, 90),
    muted: Color::Rgb(140, 134, 156),
    border: Color::Rgb(70, 64, 86),
    highlight_fg: Color::Rgb(24, 22, 30),
    highlight_bg: Color::Rgb(240, 180, 90),
    stripe_bg: Color::Rgb(32, 30, 40),
    status: Color::Rgb(150, 200, 240),
    error: Color::Rgb(240, 110, 110),
    rating: Color::Rgb(250, 210, 80),
    key_fg: Color::Rgb(24, 22, 30),
    key_bg: Color::Rgb(140, 134, 156),
  },
  Theme {
    name: "Noir",
    bg: Color::Black,
    fg: Color::Gray,
    accent: Color::White,
    muted: Color::DarkGray,
    border: Color::DarkGray,
    highlight_fg: Color::Black,
    highlight_bg: Color::Gray,
    stripe_bg: Color::Rgb(18, 18, 18),
    status: Color::White,
    error: Color::Red,
    rating: Color::Yellow,
    key_fg: Color::Black,
    key_bg: Color::DarkGray,
  },
  Theme {
    name: "Technicolor",
    bg: Color::Rgb(12, 28, 40),
    fg: Color::Rgb(226, 240, 236),
    accent: Color::Rgb(255, 94, 120),
    muted: Color::Rgb(120, 150, 160),
    border: Color::Rgb(40, 80, 96),
    highlight_fg: Color::Rgb(12, 28, 40),
    highlight_bg: Color::Rgb(94, 220, 190),
    stripe_bg: Color::Rgb(18, 36, 50),
    status: Color::Rgb(94, 220, 190),
    error: Color::Rgb(255, 94, 120),
    rating: Color::Rgb(255, 214, 102),
    key_fg: Color::Rgb(12, 28, 40),
    key_bg: Color::Rgb(120, 150, 160),
  },
];

pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(n))).unwrap_or(0)
}

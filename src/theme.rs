use ratatui::style::Color;

pub const ACCENT: Color = Color::Rgb(76, 160, 207);
pub const SUCCESS: Color = Color::Green;
pub const WARNING: Color = Color::Yellow;
pub const FAILURE: Color = Color::Red;
pub const DIM: Color = Color::DarkGray;
pub const FIELD: Color = Color::Gray;
pub const EDITING_BG: Color = Color::Rgb(40, 40, 40);

pub const TOOLBAR_BG: Color = Color::Rgb(76, 160, 207);
pub const TOOLBAR_KEY_BG: Color = Color::Rgb(40, 40, 40);
pub const TOOLBAR_KEY_FG: Color = Color::Rgb(76, 160, 207);
pub const TOOLBAR_DESC: Color = Color::Black;

//! Theme Colors for Ratatui
//! Usage:
//!   let theme = Theme::dark();
//!   let primary_color = theme.primary;

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub primary: Color,
    pub primary_background: Color,
    pub accent: Color,
    pub warning: Color,
    pub error: Color,
    pub success: Color,
    pub foreground: Color,
    pub background: Color,
    pub surface: Color,
}

impl Theme {
    pub const fn dark() -> Self {
        Self {
            primary: Color::from_u32(0x4caf50),
            primary_background: Color::from_u32(0x2e5b33),
            accent: Color::from_u32(0xffb74d),
            warning: Color::from_u32(0xffa726),
            error: Color::from_u32(0xf44336),
            success: Color::from_u32(0x66bb6a),
            foreground: Color::from_u32(0xeeeeee),
            background: Color::from_u32(0x121212),
            surface: Color::from_u32(0x1f1f1f),
        }
    }
}

//! Color theme system for fora.
//!
//! A `Theme` holds named `ratatui::style::Color` fields for every UI surface.
//! Two built-in themes are provided:
//!
//! - `dark`: ANSI 16 colors so it works on any terminal.
//! - `catppuccin_mocha`: Catppuccin Mocha palette in RGB; requires truecolor.
//!
//! Data colors (theme bars, donut strip, highlights) are not part of the theme:
//! they come from `fora_core::color` and are converted with [`rgb`].

use fora_core::color::Rgb;
use fora_core::types::Status;
use ratatui::style::Color;
use tracing::warn;

/// Converts a data color into a ratatui truecolor value.
pub fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// All color values used across fora's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border color for the currently focused panel.
    pub border_active: Color,
    /// Border color for unfocused panels.
    pub border_inactive: Color,

    // Text
    pub text: Color,
    /// Secondary text: descriptions, timestamps, placeholders.
    pub muted: Color,
    /// Foreground drawn on top of pastel highlight backgrounds.
    pub on_highlight: Color,

    // Topic status badges
    pub status_pending: Color,
    pub status_busy: Color,
    pub status_failed: Color,
    pub status_editing: Color,
    pub status_completed: Color,

    // Chat
    pub chat_user: Color,
    pub chat_assistant: Color,

    /// Border of the blocking notice modal.
    pub notice_border: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode indicator color when in NORMAL mode.
    pub status_mode_normal: Color,
    /// Mode indicator color when in INSERT mode.
    pub status_mode_insert: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            text: Color::Reset,
            muted: Color::DarkGray,
            on_highlight: Color::Black,

            status_pending: Color::DarkGray,
            status_busy: Color::Yellow,
            status_failed: Color::Red,
            status_editing: Color::Blue,
            status_completed: Color::Green,

            chat_user: Color::Cyan,
            chat_assistant: Color::Reset,

            notice_border: Color::Red,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_insert: Color::Green,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let base = Color::Rgb(30, 30, 46); // #1e1e2e
        let text = Color::Rgb(205, 214, 244); // #cdd6f4
        let peach = Color::Rgb(250, 179, 135); // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            text,
            muted: overlay1,
            on_highlight: base,

            status_pending: overlay1,
            status_busy: yellow,
            status_failed: red,
            status_editing: blue,
            status_completed: green,

            chat_user: lavender,
            chat_assistant: text,

            notice_border: peach,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_insert: green,
        }
    }

    /// Resolves a theme name to a built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents startup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }

    /// Badge color for a topic status.
    pub fn status_color(&self, status: Status) -> Color {
        match status {
            Status::Pending => self.status_pending,
            Status::Running | Status::Discovering | Status::Classifying => self.status_busy,
            Status::Failed => self.status_failed,
            Status::Editing => self.status_editing,
            Status::Completed => self.status_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_fall_back_to_dark() {
        assert_eq!(Theme::from_name("solarized").border_active, Theme::dark().border_active);
        assert_eq!(
            Theme::from_name("catppuccin_mocha").border_active,
            Theme::catppuccin_mocha().border_active
        );
    }

    #[test]
    fn data_colors_convert_channel_for_channel() {
        assert_eq!(rgb(Rgb::new(209, 213, 219)), Color::Rgb(209, 213, 219));
    }
}

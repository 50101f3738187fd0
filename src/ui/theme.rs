//! Visual theme and styling.

use console::Style;

/// Styles used for the framework's own output.
///
/// Warning and error styles target stderr, so they follow the stderr color
/// setting (see [`ColorScope`](super::ColorScope)).
#[derive(Debug, Clone)]
pub struct Theme {
    /// Style for deprecation and other warnings (yellow).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for headers (cyan bold).
    pub header: Style,
    /// Style for command and group names in listings (bold).
    pub name: Style,
    /// Style for summaries (dim).
    pub dim: Style,
    colors: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            warning: Style::new().yellow().for_stderr(),
            error: Style::new().red().bold().for_stderr(),
            header: Style::new().cyan().bold(),
            name: Style::new().bold(),
            dim: Style::new().dim(),
            colors: should_use_colors(),
        }
    }

    /// Create a theme without colors (for non-TTY or `core.no_color`).
    pub fn plain() -> Self {
        Self {
            warning: Style::new(),
            error: Style::new(),
            header: Style::new(),
            name: Style::new(),
            dim: Style::new(),
            colors: false,
        }
    }

    /// Whether this theme wants colored output.
    pub fn colors_enabled(&self) -> bool {
        self.colors
    }

    /// Format a deprecation warning.
    pub fn format_deprecation(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(msg))
    }

    /// Format an error message.
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(msg))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    console::Term::stderr().is_term()
}

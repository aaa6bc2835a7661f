//! Option colors for light and dark hosts.
//!
//! Only the colors that end up inside the default chart options live here; everything else
//! about appearance belongs to the renderer.

/// Colors used for text, grid lines and tooltips in the default options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub text: &'static str,
    pub grid: &'static str,
    pub tooltip_background: &'static str,
    pub tooltip_text: &'static str,
}

pub const LIGHT: ThemeColors = ThemeColors {
    text: "#333333",
    grid: "rgba(0, 0, 0, 0.1)",
    tooltip_background: "rgba(255, 255, 255, 0.9)",
    tooltip_text: "#333333",
};

pub const DARK: ThemeColors = ThemeColors {
    text: "#e0e0e0",
    grid: "rgba(255, 255, 255, 0.1)",
    tooltip_background: "#333333",
    tooltip_text: "#ffffff",
};

pub fn theme_colors(dark_mode: bool) -> ThemeColors {
    if dark_mode {
        DARK
    } else {
        LIGHT
    }
}

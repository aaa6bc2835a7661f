/// Default series colors, assigned in order and cycled
pub const DEFAULT_COLORS: [&str; 10] = [
    "#4CAF50", "#2196F3", "#FFC107", "#F44336", "#9C27B0", "#FF9800", "#795548", "#607D8B",
    "#3F51B5", "#009688",
];

/// Ordered color palette indexed by series (or label) position
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<String>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ColorPalette {
    /// Build a palette from caller colors; blank entries are ignored and an empty list falls
    /// back to the default palette.
    pub fn new(colors: &[String]) -> Self {
        let colors: Vec<String> = colors
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        if colors.is_empty() {
            Self::default()
        } else {
            Self { colors }
        }
    }

    pub fn color(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }

    /// First `n` colors, cycling when `n` exceeds the palette size
    pub fn take(&self, n: usize) -> Vec<String> {
        (0..n).map(|i| self.color(i).to_string()).collect()
    }
}

/// Turn `#RRGGBB` (or `#RGB`) into an `rgba(...)` string with the given alpha. Anything
/// that is not a hex color is returned unchanged.
pub fn with_alpha(color: &str, alpha: f64) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => format!("rgba({}, {}, {}, {})", r, g, b, alpha),
        None => color.to_string(),
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some((
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        )),
        3 => {
            let expand = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some((expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

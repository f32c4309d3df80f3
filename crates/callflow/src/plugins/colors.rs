//! Category colour palettes
//!
//! Colours are picked by category index so the same trace always gets the same
//! colours.

/// Saturated colours for Mermaid boxes and C4 elements
pub const NAMED_COLORS: [&str; 8] = [
    "#3498db", // blue
    "#e74c3c", // red
    "#2ecc71", // green
    "#f1c40f", // yellow
    "#9b59b6", // purple
    "#1abc9c", // teal
    "#e67e22", // orange
    "#34495e", // dark blue
];

/// Light colours for PlantUML participants
pub const LIGHT_COLORS: [&str; 8] = [
    "#FFCC99", // light orange
    "#99CCFF", // light blue
    "#99FF99", // light green
    "#FF9999", // light red
    "#FF99FF", // light pink
    "#FFFF99", // light yellow
    "#CC99FF", // light purple
    "#99FFFF", // light cyan
];

/// Palette entry for a category index, wrapping around
pub fn color_for(palette: &[&'static str], index: usize) -> &'static str {
    palette[index % palette.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_wraps() {
        assert_eq!(color_for(&NAMED_COLORS, 0), "#3498db");
        assert_eq!(color_for(&NAMED_COLORS, 8), "#3498db");
        assert_eq!(color_for(&LIGHT_COLORS, 9), "#99CCFF");
    }
}

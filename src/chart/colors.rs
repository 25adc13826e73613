//! Color definitions for charts

/// Common colors
pub(super) const COLOR_BACKGROUND: &str = "#0A0A0C"; // Near black
pub(super) const COLOR_TEXT: &str = "#FFFFFF"; // White
pub(super) const COLOR_GRID: &str = "#505050"; // Grid lines
pub(super) const COLOR_OUTLIER: &str = "#FFD24A"; // Amber

/// Border (whiskers, line) and fill color for one store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColorPair {
    pub(crate) border: &'static str,
    pub(crate) fill: &'static str,
}

/// Used for any store without its own palette entry
pub(crate) const DEFAULT_COLORS: ColorPair = ColorPair {
    border: "#A0A8B8", // Slate
    fill: "#505866",
};

/// Used for the all-stores total
pub(crate) const TOTAL_COLORS: ColorPair = ColorPair {
    border: "#FFFFFF",
    fill: "#6A6A78",
};

/// Colors for a store id; total over all strings, unknown ids get [`DEFAULT_COLORS`]
pub(crate) fn store_colors(store: &str) -> ColorPair {
    match store.trim().to_ascii_lowercase().as_str() {
        // Orange family
        "amazon" => ColorPair {
            border: "#FF9F1A",
            fill: "#7A4A08",
        },
        // Red family
        "rakuten" => ColorPair {
            border: "#FF5A5A",
            fill: "#7A1C1C",
        },
        // Purple family
        "yahoo" => ColorPair {
            border: "#B07CFF",
            fill: "#4C2A80",
        },
        // Blue family
        "yodobashi" => ColorPair {
            border: "#68B4FF",
            fill: "#1C4F86",
        },
        // Green family
        "biccamera" => ColorPair {
            border: "#48F89C",
            fill: "#10683C",
        },
        // Pink family
        "kojima" => ColorPair {
            border: "#FF68A8",
            fill: "#7A1F4A",
        },
        _ => DEFAULT_COLORS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_store() {
        assert_eq!(store_colors("amazon").border, "#FF9F1A");
    }

    #[test]
    fn test_lookup_ignores_case_and_padding() {
        assert_eq!(store_colors(" Rakuten "), store_colors("rakuten"));
    }

    #[test]
    fn test_unknown_store_falls_back() {
        assert_eq!(store_colors("corner-shop"), DEFAULT_COLORS);
        assert_eq!(store_colors(""), DEFAULT_COLORS);
    }
}

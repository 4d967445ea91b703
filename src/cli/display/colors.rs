//! Color theme for CLI output

use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Color for "n of total succeeded"
    pub fn get_ratio_color(&self, succeeded: usize, total: usize) -> TableColor {
        if total == 0 {
            self.muted
        } else if succeeded == total {
            self.success
        } else if succeeded > 0 {
            self.warning
        } else {
            self.error
        }
    }

    pub fn get_outcome_color(&self, success: bool) -> TableColor {
        if success {
            self.success
        } else {
            self.error
        }
    }

    /// Highlight color for an architecture segment in a pod name
    pub fn get_arch_color(&self, arch: &str) -> colored::Color {
        match arch {
            "intel" => colored::Color::Blue,
            "arm" => colored::Color::Green,
            "amd" => colored::Color::Red,
            "multiarch" => colored::Color::Magenta,
            _ => to_colored(self.info),
        }
    }
}

/// Convert comfy_table::Color to the matching colored::Color
pub fn to_colored(color: TableColor) -> colored::Color {
    match color {
        TableColor::Green => colored::Color::Green,
        TableColor::Yellow => colored::Color::Yellow,
        TableColor::Red => colored::Color::Red,
        TableColor::Cyan => colored::Color::Cyan,
        TableColor::DarkGrey => colored::Color::BrightBlack,
        _ => colored::Color::White,
    }
}

//! Status icons for CLI output

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Every item succeeded
    pub const SUCCESS: &'static str = "✓";

    /// Some items failed
    pub const WARNING: &'static str = "⚠";

    /// Every item failed
    pub const ERROR: &'static str = "✗";

    /// Nothing matched
    pub const UNKNOWN: &'static str = "?";

    pub fn get_outcome_icon(success: bool) -> &'static str {
        if success {
            Self::SUCCESS
        } else {
            Self::ERROR
        }
    }

    /// Icon for "n of total succeeded"
    pub fn get_ratio_icon(succeeded: usize, total: usize) -> &'static str {
        if total == 0 {
            Self::UNKNOWN
        } else if succeeded == total {
            Self::SUCCESS
        } else if succeeded > 0 {
            Self::WARNING
        } else {
            Self::ERROR
        }
    }

    pub fn get_summary_text(succeeded: usize, total: usize) -> &'static str {
        if total == 0 {
            "Nothing matched"
        } else if succeeded == total {
            "Complete"
        } else if succeeded > 0 {
            "Partial"
        } else {
            "Failed"
        }
    }
}

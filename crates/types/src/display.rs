//! Styled text fragments produced by formatters

use crate::view::{FieldView, Severity};
use serde::{Deserialize, Serialize};

/// Style tag attached to a text fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayStyle {
    #[default]
    Default,
    Title,
    Ok,
    Caution,
    Warning,
    Critical,
    OkLog,
    CautionLog,
    WarningLog,
    CriticalLog,
}

impl DisplayStyle {
    /// Style for a decorated value
    pub fn from_view(view: &FieldView) -> Self {
        match (view.severity, view.logged) {
            (Severity::None, _) => DisplayStyle::Default,
            (Severity::Ok, false) => DisplayStyle::Ok,
            (Severity::Caution, false) => DisplayStyle::Caution,
            (Severity::Warning, false) => DisplayStyle::Warning,
            (Severity::Critical, false) => DisplayStyle::Critical,
            (Severity::Ok, true) => DisplayStyle::OkLog,
            (Severity::Caution, true) => DisplayStyle::CautionLog,
            (Severity::Warning, true) => DisplayStyle::WarningLog,
            (Severity::Critical, true) => DisplayStyle::CriticalLog,
        }
    }

    pub fn from_severity(severity: Severity) -> Self {
        Self::from_view(&FieldView {
            severity,
            ..FieldView::default()
        })
    }

    /// Underlying severity, if this is an alert style
    pub fn severity(&self) -> Option<Severity> {
        match self {
            DisplayStyle::Default | DisplayStyle::Title => None,
            DisplayStyle::Ok | DisplayStyle::OkLog => Some(Severity::Ok),
            DisplayStyle::Caution | DisplayStyle::CautionLog => Some(Severity::Caution),
            DisplayStyle::Warning | DisplayStyle::WarningLog => Some(Severity::Warning),
            DisplayStyle::Critical | DisplayStyle::CriticalLog => Some(Severity::Critical),
        }
    }

    pub fn is_log(&self) -> bool {
        matches!(
            self,
            DisplayStyle::OkLog
                | DisplayStyle::CautionLog
                | DisplayStyle::WarningLog
                | DisplayStyle::CriticalLog
        )
    }
}

/// One fragment of a plugin's rendered content
///
/// Line breaks are explicit `Break` entries, so the height of a panel is
/// the number of breaks plus one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DisplayLine {
    Segment {
        text: String,
        style: DisplayStyle,
        optional: bool,
    },
    Break,
}

impl DisplayLine {
    pub fn text(text: impl Into<String>) -> Self {
        DisplayLine::Segment {
            text: text.into(),
            style: DisplayStyle::Default,
            optional: false,
        }
    }

    pub fn styled(text: impl Into<String>, style: DisplayStyle) -> Self {
        DisplayLine::Segment {
            text: text.into(),
            style,
            optional: false,
        }
    }

    pub fn title(text: impl Into<String>) -> Self {
        Self::styled(text, DisplayStyle::Title)
    }

    /// Mark the fragment as optional (or not)
    pub fn with_optional(self, value: bool) -> Self {
        match self {
            DisplayLine::Segment { text, style, .. } => DisplayLine::Segment {
                text,
                style,
                optional: value,
            },
            DisplayLine::Break => DisplayLine::Break,
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, DisplayLine::Break)
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, DisplayLine::Segment { optional: true, .. })
    }

    /// Text of a segment, empty for breaks
    pub fn as_text(&self) -> &str {
        match self {
            DisplayLine::Segment { text, .. } => text,
            DisplayLine::Break => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_from_view() {
        let view = FieldView {
            severity: Severity::Critical,
            optional: false,
            logged: true,
        };
        assert_eq!(DisplayStyle::from_view(&view), DisplayStyle::CriticalLog);
        assert_eq!(DisplayStyle::CriticalLog.severity(), Some(Severity::Critical));
        assert!(DisplayStyle::CriticalLog.is_log());

        let none = FieldView::default();
        assert_eq!(DisplayStyle::from_view(&none), DisplayStyle::Default);
    }

    #[test]
    fn test_with_optional_keeps_text() {
        let line = DisplayLine::text("idle:").with_optional(true);
        assert!(line.is_optional());
        assert_eq!(line.as_text(), "idle:");
        assert!(!DisplayLine::Break.with_optional(true).is_optional());
    }
}

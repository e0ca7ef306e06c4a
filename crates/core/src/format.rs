//! Measurement and number formatting for panel content

use crate::error::FormatError;
use log::debug;
use sysglance_types::{
    DisplayLine, DisplayStyle, FieldView, PanelDescriptor, PANEL_BORDER_HEIGHT, PANEL_BORDER_WIDTH,
};
use unicode_width::UnicodeWidthStr;

const UNIT_SYMBOLS: [char; 8] = ['K', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y'];

/// Reject fragments that embed raw line breaks or control characters
pub fn validate(lines: &[DisplayLine]) -> Result<(), FormatError> {
    for line in lines {
        let text = line.as_text();
        if text.chars().any(char::is_control) {
            return Err(FormatError::Malformed(format!("{:?}", text)));
        }
    }
    Ok(())
}

/// Display width of the longest line, optionally ignoring optional
/// fragments. Malformed content measures as 0.
pub fn measure_width(lines: &[DisplayLine], without_optional: bool) -> u16 {
    if let Err(e) = validate(lines) {
        debug!("Cannot measure width: {}", e);
        return 0;
    }
    let mut widest = 0usize;
    let mut current = 0usize;
    for line in lines {
        match line {
            DisplayLine::Break => {
                widest = widest.max(current);
                current = 0;
            }
            DisplayLine::Segment { text, optional, .. } => {
                if !(without_optional && *optional) {
                    current += text.width();
                }
            }
        }
    }
    u16::try_from(widest.max(current)).unwrap_or(u16::MAX)
}

/// Number of `Break` sentinels plus one, 0 for empty or malformed content
pub fn measure_height(lines: &[DisplayLine]) -> u16 {
    if lines.is_empty() {
        return 0;
    }
    if let Err(e) = validate(lines) {
        debug!("Cannot measure height: {}", e);
        return 0;
    }
    let breaks = lines.iter().filter(|l| l.is_break()).count();
    u16::try_from(breaks + 1).unwrap_or(u16::MAX)
}

/// Wrap formatted lines into a measured panel descriptor
pub fn describe(id: &str, title: &str, lines: Vec<DisplayLine>, display: bool) -> PanelDescriptor {
    let width = measure_width(&lines, false);
    let min_width = measure_width(&lines, true);
    let height = measure_height(&lines);
    if !display || width == 0 || height == 0 {
        return PanelDescriptor::hidden(id, title);
    }
    PanelDescriptor {
        id: id.to_string(),
        title: title.to_string(),
        content: lines,
        width: width.saturating_add(PANEL_BORDER_WIDTH),
        min_width: min_width.saturating_add(PANEL_BORDER_WIDTH),
        height: height.saturating_add(PANEL_BORDER_HEIGHT),
        display: true,
    }
}

/// Human readable number on a 1024 base, e.g. `1.95K`, `24.4M`, `512`.
///
/// Precision shrinks as the mantissa grows so the text stays short.
/// `min_symbol` is the smallest unit symbol allowed.
pub fn auto_unit(number: f64, min_symbol: Option<char>) -> String {
    let start = min_symbol
        .and_then(|s| UNIT_SYMBOLS.iter().position(|c| *c == s))
        .unwrap_or(0);
    for (index, symbol) in UNIT_SYMBOLS.iter().enumerate().skip(start).rev() {
        let prefix = 1024f64.powi(index as i32 + 1);
        let value = number / prefix;
        if value.abs() > 1.0 {
            let precision = if value.abs() < 10.0 {
                2
            } else if value.abs() < 100.0 {
                1
            } else {
                0
            };
            return format!("{:.*}{}", precision, value, symbol);
        }
    }
    format!("{:.0}", number)
}

/// Left-pad or truncate text to a fixed column count
pub fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(&" ".repeat(width - used));
    out
}

/// Incremental builder for a panel's display lines
#[derive(Debug, Default)]
pub struct LineBuilder {
    lines: Vec<DisplayLine>,
}

impl LineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(DisplayLine::title(text));
        self
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(DisplayLine::text(text));
        self
    }

    /// Plain text that may be elided
    pub fn text_opt(&mut self, text: impl Into<String>, optional: bool) -> &mut Self {
        self.lines.push(DisplayLine::text(text).with_optional(optional));
        self
    }

    pub fn styled(&mut self, text: impl Into<String>, style: DisplayStyle) -> &mut Self {
        self.lines.push(DisplayLine::styled(text, style));
        self
    }

    /// Value text decorated by its field view
    pub fn value(&mut self, text: impl Into<String>, view: Option<&FieldView>) -> &mut Self {
        let line = match view {
            Some(view) => DisplayLine::styled(text, DisplayStyle::from_view(view))
                .with_optional(view.optional),
            None => DisplayLine::text(text),
        };
        self.lines.push(line);
        self
    }

    pub fn newline(&mut self) -> &mut Self {
        self.lines.push(DisplayLine::Break);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn build(self) -> Vec<DisplayLine> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysglance_types::Severity;

    fn sample_lines() -> Vec<DisplayLine> {
        let mut b = LineBuilder::new();
        b.title("CPU").text("  12.5%").newline();
        b.text("user:").text("  3.0%").text_opt("  idle: 96.0%", true);
        b.newline().text("x");
        b.build()
    }

    #[test]
    fn test_measure_width_with_and_without_optional() {
        let lines = sample_lines();
        assert_eq!(measure_width(&lines, false), 24);
        assert_eq!(measure_width(&lines, true), 11);
    }

    #[test]
    fn test_measure_height_counts_breaks() {
        assert_eq!(measure_height(&sample_lines()), 3);
        assert_eq!(measure_height(&[DisplayLine::text("x")]), 1);
        assert_eq!(measure_height(&[]), 0);
    }

    #[test]
    fn test_malformed_content_measures_zero() {
        let lines = vec![DisplayLine::text("broken\nline")];
        assert_eq!(measure_width(&lines, false), 0);
        assert_eq!(measure_height(&lines), 0);
        let panel = describe("cpu", "CPU", lines, true);
        assert!(!panel.display);
    }

    #[test]
    fn test_describe_adds_border() {
        let panel = describe("cpu", "CPU", sample_lines(), true);
        assert!(panel.display);
        assert_eq!(panel.width, 28);
        assert_eq!(panel.min_width, 15);
        assert_eq!(panel.height, 5);

        let hidden = describe("cpu", "CPU", sample_lines(), false);
        assert!(!hidden.is_renderable());
    }

    #[test]
    fn test_auto_unit() {
        assert_eq!(auto_unit(512.0, None), "512");
        assert_eq!(auto_unit(2000.0, Some('K')), "1.95K");
        assert_eq!(auto_unit(25_600_000.0, None), "24.4M");
        assert_eq!(auto_unit(300.0 * 1024.0, None), "300K");
        assert_eq!(auto_unit(2000.0, Some('M')), "2000");
    }

    #[test]
    fn test_value_style_follows_view() {
        let view = FieldView {
            severity: Severity::Warning,
            optional: true,
            logged: false,
        };
        let mut b = LineBuilder::new();
        b.value("80.0%", Some(&view));
        let lines = b.build();
        assert!(lines[0].is_optional());
        assert!(matches!(
            lines[0],
            DisplayLine::Segment { style: DisplayStyle::Warning, .. }
        ));
    }

    #[test]
    fn test_fit_pads_and_truncates() {
        assert_eq!(fit("eth0", 6), "eth0  ");
        assert_eq!(fit("wlp3s0f0u1", 6), "wlp3s0");
    }
}

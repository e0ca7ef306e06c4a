//! Renderable panel content handed to the layout engine

use crate::display::DisplayLine;
use serde::{Deserialize, Serialize};

/// Columns added around measured content for the panel border and padding
pub const PANEL_BORDER_WIDTH: u16 = 4;

/// Rows added around measured content for the panel border
pub const PANEL_BORDER_HEIGHT: u16 = 2;

/// One plugin's renderable content plus its measured size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelDescriptor {
    /// Plugin identifier
    pub id: String,
    /// Title shown on the panel border
    pub title: String,
    pub content: Vec<DisplayLine>,
    /// Outer width including border allowance
    pub width: u16,
    /// Outer width measured without optional fragments
    pub min_width: u16,
    /// Outer height including border allowance
    pub height: u16,
    /// Whether the panel takes part in the layout
    pub display: bool,
}

impl PanelDescriptor {
    /// Descriptor of a panel that is not shown this cycle
    pub fn hidden(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: Vec::new(),
            width: 0,
            min_width: 0,
            height: 0,
            display: false,
        }
    }

    /// A panel is laid out only when it is enabled and has something to show
    pub fn is_renderable(&self) -> bool {
        self.display && self.height > 0 && !self.content.is_empty()
    }

    /// Content lines split on `Break` sentinels
    pub fn rows(&self) -> Vec<Vec<&DisplayLine>> {
        let mut rows = vec![Vec::new()];
        for line in &self.content {
            if line.is_break() {
                rows.push(Vec::new());
            } else if let Some(row) = rows.last_mut() {
                row.push(line);
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_is_not_renderable() {
        let panel = PanelDescriptor::hidden("cpu", "CPU");
        assert!(!panel.is_renderable());
    }

    #[test]
    fn test_rows_split_on_breaks() {
        let panel = PanelDescriptor {
            id: "mem".into(),
            title: "MEM".into(),
            content: vec![
                DisplayLine::title("MEM"),
                DisplayLine::text(" 42.0%"),
                DisplayLine::Break,
                DisplayLine::text("total:"),
            ],
            width: 20,
            min_width: 20,
            height: 4,
            display: true,
        };
        let rows = panel.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1][0].as_text(), "total:");
        assert!(panel.is_renderable());
    }
}

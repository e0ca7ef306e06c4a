//! Painting a layout tree on the terminal with ratatui

use super::layout::{LayoutNode, LayoutTree, NodeKind, Size, Split};
use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use log::error;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use std::io::{self, Stdout};
use sysglance_core::{DisplayLine, DisplayStyle, PanelDescriptor};

/// Something a layout tree can be painted on
pub trait RenderSurface {
    /// Paint the tree; `force` repaints every cell instead of the changes
    fn paint(&mut self, tree: &LayoutTree, force: bool) -> Result<()>;
}

fn style_of(style: DisplayStyle) -> Style {
    let base = Style::default();
    match style {
        DisplayStyle::Default => base,
        DisplayStyle::Title => base.add_modifier(Modifier::BOLD),
        DisplayStyle::Ok => base.fg(Color::Green),
        DisplayStyle::Caution => base.fg(Color::Blue),
        DisplayStyle::Warning => base.fg(Color::Magenta),
        DisplayStyle::Critical => base.fg(Color::Red),
        DisplayStyle::OkLog => base.fg(Color::Black).bg(Color::Green),
        DisplayStyle::CautionLog => base.fg(Color::Black).bg(Color::Blue),
        DisplayStyle::WarningLog => base.fg(Color::Black).bg(Color::Magenta),
        DisplayStyle::CriticalLog => base.fg(Color::White).bg(Color::Red),
    }
}

/// Content lines of a panel; optional segments are dropped when the area
/// is narrower than the measured width
fn panel_lines(panel: &PanelDescriptor, area: Rect) -> Vec<Line<'static>> {
    let skip_optional = area.width < panel.width;
    panel
        .rows()
        .into_iter()
        .map(|row| {
            let spans: Vec<Span<'static>> = row
                .into_iter()
                .filter(|segment| !(skip_optional && segment.is_optional()))
                .filter_map(|segment| match segment {
                    DisplayLine::Segment { text, style, .. } => {
                        Some(Span::styled(text.clone(), style_of(*style)))
                    }
                    DisplayLine::Break => None,
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn constraint(size: Size) -> Constraint {
    match size {
        Size::Fixed(length) => Constraint::Length(length),
        Size::Flex => Constraint::Min(0),
    }
}

fn draw_node(frame: &mut Frame, node: &LayoutNode, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    match &node.kind {
        NodeKind::Padding => {}
        NodeKind::Panel(panel) => {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(panel.title.clone(), style_of(DisplayStyle::Title)));
            let paragraph = Paragraph::new(panel_lines(panel, area)).block(block);
            frame.render_widget(paragraph, area);
        }
        NodeKind::Split(split, children) => {
            let direction = match split {
                Split::Rows => Direction::Vertical,
                Split::Columns => Direction::Horizontal,
            };
            let areas = Layout::default()
                .direction(direction)
                .constraints(children.iter().map(|c| constraint(c.size)))
                .split(area);
            for (child, child_area) in children.iter().zip(areas.iter()) {
                draw_node(frame, child, *child_area);
            }
        }
    }
}

/// Draw a whole tree into a frame
pub fn draw_tree(frame: &mut Frame, tree: &LayoutTree) {
    draw_node(frame, &tree.root, frame.area());
}

/// Terminal surface over any ratatui backend
pub struct TerminalSurface<B: Backend> {
    terminal: Terminal<B>,
    alternate_screen: bool,
}

impl<B: Backend> TerminalSurface<B> {
    pub fn with_backend(backend: B) -> Result<Self> {
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;
        Ok(Self {
            terminal,
            alternate_screen: false,
        })
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }
}

impl TerminalSurface<CrosstermBackend<Stdout>> {
    /// Surface on the alternate screen of stdout
    pub fn stdout() -> Result<Self> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let mut surface = Self::with_backend(CrosstermBackend::new(stdout))?;
        surface.alternate_screen = true;
        surface.terminal.hide_cursor()?;
        Ok(surface)
    }

    /// Leave the alternate screen; failures are logged
    pub fn restore(&mut self) {
        if !self.alternate_screen {
            return;
        }
        if let Err(e) = execute!(self.terminal.backend_mut(), LeaveAlternateScreen) {
            error!("Failed to leave alternate screen: {}", e);
        }
        if let Err(e) = self.terminal.show_cursor() {
            error!("Failed to show cursor: {}", e);
        }
        self.alternate_screen = false;
    }
}

impl<B: Backend> RenderSurface for TerminalSurface<B> {
    fn paint(&mut self, tree: &LayoutTree, force: bool) -> Result<()> {
        if force {
            self.terminal.clear()?;
        }
        self.terminal.draw(|frame| draw_tree(frame, tree))?;
        Ok(())
    }
}

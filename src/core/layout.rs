//! Panel layout rebuilt from the registry every cycle
//!
//! The tree has three bands. The top band holds fixed-width columns, the
//! middle band a fixed-width left column and a flexible right column, and
//! the bottom band a single flexible region.

use crate::config::LayoutConfig;
use log::{debug, trace, warn};
use sysglance_core::{FormatContext, PanelDescriptor, PluginRegistry, SampledPlugin, Zone};

/// Columns added to the middle-left content width for borders and margins
pub const MIDDLE_LEFT_BORDER: u16 = 8;

/// Where the engine is within one refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePhase {
    #[default]
    Idle,
    Sampling,
    Composing,
    Published,
}

/// Size of a node along its parent's split direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Fixed(u16),
    /// Takes whatever space is left
    Flex,
}

/// How a node lays out its children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// Stacked top to bottom
    Rows,
    /// Side by side, left to right
    Columns,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Panel(PanelDescriptor),
    /// Empty space
    Padding,
    Split(Split, Vec<LayoutNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub name: String,
    pub size: Size,
    pub kind: NodeKind,
}

impl LayoutNode {
    fn panel(descriptor: PanelDescriptor, size: Size) -> Self {
        Self {
            name: descriptor.id.clone(),
            size,
            kind: NodeKind::Panel(descriptor),
        }
    }

    fn padding(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: Size::Flex,
            kind: NodeKind::Padding,
        }
    }

    fn split(name: &str, size: Size, split: Split, children: Vec<LayoutNode>) -> Self {
        Self {
            name: name.to_string(),
            size,
            kind: NodeKind::Split(split, children),
        }
    }

    pub fn children(&self) -> &[LayoutNode] {
        match &self.kind {
            NodeKind::Split(_, children) => children,
            _ => &[],
        }
    }

    /// Depth-first search by name
    pub fn find(&self, name: &str) -> Option<&LayoutNode> {
        if self.name == name {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(name))
    }

    fn collect_panels<'a>(&'a self, out: &mut Vec<&'a PanelDescriptor>) {
        match &self.kind {
            NodeKind::Panel(descriptor) => out.push(descriptor),
            NodeKind::Padding => {}
            NodeKind::Split(_, children) => {
                for child in children {
                    child.collect_panels(out);
                }
            }
        }
    }
}

/// Composed layout of one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTree {
    pub root: LayoutNode,
}

impl LayoutTree {
    /// Layout with no panels
    pub fn empty() -> Self {
        Self {
            root: LayoutNode::padding("root"),
        }
    }

    pub fn find(&self, name: &str) -> Option<&LayoutNode> {
        self.root.find(name)
    }

    /// Every panel, in paint order
    pub fn panels(&self) -> Vec<&PanelDescriptor> {
        let mut panels = Vec::new();
        self.root.collect_panels(&mut panels);
        panels
    }

    pub fn panel_ids(&self) -> Vec<&str> {
        self.panels().iter().map(|p| p.id.as_str()).collect()
    }
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSettings {
    /// Content width of the middle-left column
    pub middle_left_width: u16,
    /// Middle-right panel that takes the remaining height
    pub flexible_panel: String,
}

impl From<&LayoutConfig> for LayoutSettings {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            middle_left_width: config.middle_left_width,
            flexible_panel: config.flexible_panel.clone(),
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self::from(&LayoutConfig::default())
    }
}

/// Descriptor of a plugin, or `None` when it has nothing to lay out
fn fetch(plugin: &dyn SampledPlugin, ctx: &FormatContext) -> Option<PanelDescriptor> {
    match plugin.describe(ctx) {
        Ok(descriptor) if descriptor.is_renderable() => Some(descriptor),
        Ok(descriptor) => {
            trace!("{}: nothing to display", descriptor.id);
            None
        }
        Err(e) => {
            warn!("{}: excluded from layout: {}", plugin.metadata().id, e);
            None
        }
    }
}

pub struct LayoutEngine {
    settings: LayoutSettings,
    phase: CyclePhase,
    tree: LayoutTree,
}

impl LayoutEngine {
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            settings,
            phase: CyclePhase::Idle,
            tree: LayoutTree::empty(),
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn begin_sampling(&mut self) {
        self.phase = CyclePhase::Sampling;
    }

    pub fn finish_cycle(&mut self) {
        self.phase = CyclePhase::Idle;
    }

    fn zone_panels(registry: &PluginRegistry, zone: Zone, ctx: &FormatContext) -> Vec<PanelDescriptor> {
        registry.zone(zone).filter_map(|plugin| fetch(plugin, ctx)).collect()
    }

    /// Compose a fresh tree from the current plugin data
    pub fn rebuild(&mut self, registry: &PluginRegistry, ctx: &FormatContext) -> &LayoutTree {
        self.phase = CyclePhase::Composing;
        let tree = self.compose(registry, ctx);
        debug!("Layout rebuilt with panels {:?}", tree.panel_ids());
        self.tree = tree;
        self.phase = CyclePhase::Published;
        &self.tree
    }

    fn compose(&self, registry: &PluginRegistry, ctx: &FormatContext) -> LayoutTree {
        let top = Self::zone_panels(registry, Zone::Top, ctx);
        let middle_left = Self::zone_panels(
            registry,
            Zone::MiddleLeft,
            &ctx.with_max_width(self.settings.middle_left_width),
        );
        let middle_right = Self::zone_panels(registry, Zone::MiddleRight, ctx);
        let bottom = Self::zone_panels(registry, Zone::Bottom, ctx);

        let top_height = top.first().map_or(0, |p| p.height);
        let mut top_columns: Vec<LayoutNode> = top
            .into_iter()
            .map(|p| {
                let width = p.width;
                LayoutNode::panel(p, Size::Fixed(width))
            })
            .collect();
        top_columns.push(LayoutNode::padding("top_padding"));

        let mut left_rows: Vec<LayoutNode> = middle_left
            .into_iter()
            .map(|p| {
                let height = p.height;
                LayoutNode::panel(p, Size::Fixed(height))
            })
            .collect();
        left_rows.push(LayoutNode::padding("middle_left_padding"));

        let mut has_flexible = false;
        let mut right_rows: Vec<LayoutNode> = middle_right
            .into_iter()
            .map(|p| {
                if p.id == self.settings.flexible_panel {
                    has_flexible = true;
                    LayoutNode::panel(p, Size::Flex)
                } else {
                    let height = p.height;
                    LayoutNode::panel(p, Size::Fixed(height))
                }
            })
            .collect();
        if !has_flexible {
            right_rows.push(LayoutNode::padding("middle_right_padding"));
        }

        let (bottom_height, bottom_node) = match bottom.into_iter().next() {
            Some(p) => (p.height, LayoutNode::panel(p, Size::Flex)),
            None => (0, LayoutNode::padding("bottom_padding")),
        };

        let middle = LayoutNode::split(
            "middle",
            Size::Flex,
            Split::Columns,
            vec![
                LayoutNode::split(
                    "middle_left",
                    Size::Fixed(self.settings.middle_left_width + MIDDLE_LEFT_BORDER),
                    Split::Rows,
                    left_rows,
                ),
                LayoutNode::split("middle_right", Size::Flex, Split::Rows, right_rows),
            ],
        );

        LayoutTree {
            root: LayoutNode::split(
                "root",
                Size::Flex,
                Split::Rows,
                vec![
                    LayoutNode::split("top", Size::Fixed(top_height), Split::Columns, top_columns),
                    middle,
                    LayoutNode::split(
                        "bottom",
                        Size::Fixed(bottom_height),
                        Split::Columns,
                        vec![bottom_node],
                    ),
                ],
            ),
        }
    }
}

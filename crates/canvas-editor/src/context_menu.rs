//! Right-click menu anchoring and dismissal.
//!
//! The anchor is a screen point, so the menu stays put while the canvas
//! zooms or pans underneath it.

use canvas_core::kurbo::Point;
use canvas_core::{EdgeId, GraphModel, NodeId};
use canvas_render::{MenuItemView, MenuView};
use serde::{Deserialize, Serialize};
use smallvec::smallvec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    Edit,
    Delete,
}

impl MenuAction {
    pub fn name(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::Delete => "Delete",
        }
    }
}

/// What the right-click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    Node(NodeId),
    Edge(EdgeId),
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenu {
    pub anchor: Point,
    pub target: MenuTarget,
}

#[derive(Debug, Clone, Default)]
pub struct ContextMenuController {
    open: Option<ContextMenu>,
}

impl ContextMenuController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ContextMenu> {
        self.open.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Open (or move) the menu.
    pub fn open(&mut self, anchor: Point, target: MenuTarget) {
        log::debug!("menu: open at ({:.0}, {:.0}) for {target:?}", anchor.x, anchor.y);
        self.open = Some(ContextMenu { anchor, target });
    }

    /// Close the menu. Returns `true` if one was open.
    pub fn dismiss(&mut self) -> bool {
        self.open.take().is_some()
    }

    /// Close the menu and hand back the chosen action with its target.
    /// `None` when no menu is open or it was the empty-area placeholder.
    pub fn choose(&mut self, action: MenuAction) -> Option<(MenuAction, MenuTarget)> {
        let menu = self.open.take()?;
        match menu.target {
            MenuTarget::Empty => None,
            target => Some((action, target)),
        }
    }

    /// Close the menu if its target has left the model.
    pub fn retain_existing(&mut self, model: &GraphModel) -> bool {
        let stale = match self.open.map(|m| m.target) {
            Some(MenuTarget::Node(id)) => !model.contains_node(id),
            Some(MenuTarget::Edge(id)) => !model.contains_edge(id),
            _ => false,
        };
        stale && self.dismiss()
    }

    /// Paint-ready description of the open menu.
    pub fn view(&self) -> Option<MenuView> {
        let menu = self.open?;
        let items = match menu.target {
            MenuTarget::Empty => smallvec![MenuItemView {
                action: "none",
                label: "Empty area",
                enabled: false,
            }],
            MenuTarget::Node(_) | MenuTarget::Edge(_) => [MenuAction::Edit, MenuAction::Delete]
                .into_iter()
                .map(|action| MenuItemView {
                    action: action.name(),
                    label: action.label(),
                    enabled: true,
                })
                .collect(),
        };
        Some(MenuView {
            anchor: menu.anchor,
            items,
        })
    }
}
